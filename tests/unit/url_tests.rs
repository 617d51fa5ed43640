// Delivery URL tests

use cloudinary::*;

fn config() -> Configuration {
    let mut config = Configuration::new("test123");
    config.api_key = Some("a".to_string());
    config.api_secret = Some("b".to_string());
    config
}

#[test]
fn test_default_delivery_url() {
    let url = Url::new(&config()).generate("test").unwrap();
    assert_eq!(
        url.as_deref(),
        Some("http://res.cloudinary.com/test123/image/upload/test")
    );
}

// `test123-res` already names the cloud; only shared-domain URLs put the
// cloud name in the path, so `/test123/` must not appear here.
#[test]
fn test_secure_private_cdn_omits_cloud_name() {
    let url = Url::new(&config())
        .secure(true)
        .private_cdn(true)
        .generate("test")
        .unwrap();
    assert_eq!(
        url.as_deref(),
        Some("https://test123-res.cloudinary.com/image/upload/test")
    );
}

#[test]
fn test_signed_transformed_url() {
    let url = Url::new(&config())
        .sign_url(true)
        .version(1234)
        .transformation(Transformation::new().crop("crop").width(10).height(20))
        .generate("image.jpg")
        .unwrap();
    assert_eq!(
        url.as_deref(),
        Some("http://res.cloudinary.com/test123/image/upload/s--Ai4Znfl3--/c_crop,h_20,w_10/v1234/image.jpg")
    );
}

#[test]
fn test_signature_ignores_version() {
    let with_version = Url::new(&config())
        .sign_url(true)
        .version(1)
        .generate("image.jpg")
        .unwrap()
        .unwrap();
    let other_version = Url::new(&config())
        .sign_url(true)
        .version(2)
        .generate("image.jpg")
        .unwrap()
        .unwrap();
    assert!(with_version.contains("/s----SjmNDA--/"));
    assert!(other_version.contains("/s----SjmNDA--/"));
}

#[test]
fn test_background_color_in_url() {
    let url = Url::new(&config())
        .transformation(Transformation::new().background("#112233"))
        .generate("test")
        .unwrap();
    assert_eq!(
        url.as_deref(),
        Some("http://res.cloudinary.com/test123/image/upload/b_rgb:112233/test")
    );
}

#[test]
fn test_url_suffix_on_shared_cdn() {
    let err = Url::new(&config())
        .url_suffix("hello")
        .generate("test")
        .unwrap_err();
    assert_eq!(err.to_string(), "URL Suffix only supported in private CDN");
}

#[test]
fn test_secure_url_never_loses_scheme_slashes() {
    let url = Url::new(&config())
        .secure(true)
        .transformation(Transformation::new().chain().chain())
        .generate("//folder//test")
        .unwrap()
        .unwrap();
    assert!(url.starts_with("https://res.cloudinary.com/"));
    assert!(!url["https://".len()..].contains("//"));
}

#[test]
fn test_url_from_connection_string() {
    let config =
        Configuration::from_url("cloudinary://a:b@test123?secure=true&cdn_subdomain=true")
            .unwrap();
    let url = Url::new(&config).generate("sample").unwrap();
    assert_eq!(
        url.as_deref(),
        Some("https://res.cloudinary.com/test123/image/upload/sample")
    );
}

#[test]
fn test_video_url_with_offsets() {
    let url = Url::new(&config())
        .resource_type("video")
        .format("mp4")
        .transformation(Transformation::new().start_offset("10%").duration(5))
        .generate("dog")
        .unwrap();
    assert_eq!(
        url.as_deref(),
        Some("http://res.cloudinary.com/test123/video/upload/du_5,so_10p/dog.mp4")
    );
}

#[test]
fn test_generate_with_meta_reports_responsive() {
    let generated = Url::new(&config())
        .transformation(Transformation::new().width("auto").crop("scale"))
        .generate_with_meta("test")
        .unwrap()
        .unwrap();
    assert_eq!(
        generated.url,
        "http://res.cloudinary.com/test123/image/upload/c_scale,w_auto/test"
    );
    assert!(generated.meta.is_responsive);
    assert!(!generated.meta.hi_dpi);
}
