// Image tag tests

use cloudinary::constants::BLANK_PLACEHOLDER;
use cloudinary::*;
use std::collections::BTreeMap;

#[test]
fn test_image_tag_with_html_dimensions() {
    let mut attributes = BTreeMap::new();
    attributes.insert("alt".to_string(), "my image".to_string());

    let tag = Url::new(&Configuration::new("test123"))
        .transformation(Transformation::new().width(100).height(101).crop("crop"))
        .image_tag("test", &attributes)
        .unwrap();
    assert_eq!(
        tag.as_deref(),
        Some("<img src='http://res.cloudinary.com/test123/image/upload/c_crop,h_101,w_100/test' alt='my image' height='101' width='100'/>")
    );
}

#[test]
fn test_responsive_tag_with_blank_placeholder() {
    let mut attributes = BTreeMap::new();
    attributes.insert("responsive_placeholder".to_string(), "blank".to_string());

    let tag = Url::new(&Configuration::new("test123"))
        .transformation(Transformation::new().width("auto"))
        .image_tag("test", &attributes)
        .unwrap()
        .unwrap();
    assert_eq!(
        tag,
        format!(
            "<img src='{}' class='cld-responsive' data-src='http://res.cloudinary.com/test123/image/upload/w_auto/test'/>",
            BLANK_PLACEHOLDER
        )
    );
}

#[test]
fn test_caller_dimensions_win() {
    let mut attributes = BTreeMap::new();
    attributes.insert("width".to_string(), "50".to_string());

    let tag = Url::new(&Configuration::new("test123"))
        .transformation(Transformation::new().width(100))
        .image_tag("test", &attributes)
        .unwrap()
        .unwrap();
    assert!(tag.ends_with(" width='50'/>"));
}
