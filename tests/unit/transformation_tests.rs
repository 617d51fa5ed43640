// Transformation compiler tests

use cloudinary::transformation::short_code;
use cloudinary::*;
use rstest::rstest;
use std::collections::BTreeMap;

#[rstest]
#[case("angle", ParamValue::from(vec!["auto_right", "hflip"]), "a_auto_right.hflip")]
#[case("audio_codec", ParamValue::from("aac"), "ac_aac")]
#[case("audio_frequency", ParamValue::from(44100), "af_44100")]
#[case("aspect_ratio", ParamValue::from("16:9"), "ar_16:9")]
#[case("background", ParamValue::from("#112233"), "b_rgb:112233")]
#[case("bit_rate", ParamValue::from("1m"), "br_1m")]
#[case("crop", ParamValue::from("fill"), "c_fill")]
#[case("color", ParamValue::from("red"), "co_red")]
#[case("color_space", ParamValue::from("srgb"), "cs_srgb")]
#[case("default_image", ParamValue::from("avatar.png"), "d_avatar.png")]
#[case("delay", ParamValue::from(20), "dl_20")]
#[case("density", ParamValue::from(150), "dn_150")]
#[case("dpr", ParamValue::from(2.0), "dpr_2.0")]
#[case("duration", ParamValue::from("30%"), "du_30p")]
#[case("effect", ParamValue::from(vec!["sepia", "20"]), "e_sepia:20")]
#[case("end_offset", ParamValue::from(2.5), "eo_2.5")]
#[case("fetch_format", ParamValue::from("auto"), "f_auto")]
#[case("flags", ParamValue::from(vec!["attachment", "png8"]), "fl_attachment.png8")]
#[case("fps", ParamValue::from(vec!["24", "29.97"]), "fps_24-29.97")]
#[case("gravity", ParamValue::from("face"), "g_face")]
#[case("height", ParamValue::from(100), "h_100")]
#[case("keyframe_interval", ParamValue::from(10), "ki_10")]
#[case("overlay", ParamValue::from("text:hello"), "l_text:hello")]
#[case("opacity", ParamValue::from(50), "o_50")]
#[case("prefix", ParamValue::from("a"), "p_a")]
#[case("page", ParamValue::from(2), "pg_2")]
#[case("quality", ParamValue::from("auto:good"), "q_auto:good")]
#[case("radius", ParamValue::from(vec!["10", "20"]), "r_10:20")]
#[case("start_offset", ParamValue::from("2p"), "so_2p")]
#[case("streaming_profile", ParamValue::from("full_hd"), "sp_full_hd")]
#[case("underlay", ParamValue::from("logo"), "u_logo")]
#[case("video_codec", ParamValue::from("h264"), "vc_h264")]
#[case("video_sampling", ParamValue::from(20), "vs_20")]
#[case("width", ParamValue::from(1.0), "w_1.0")]
#[case("x", ParamValue::from(-10), "x_-10")]
#[case("y", ParamValue::from(15), "y_15")]
#[case("zoom", ParamValue::from(1.5), "z_1.5")]
fn test_short_code_rendering(
    #[case] name: &str,
    #[case] value: ParamValue,
    #[case] expected: &str,
) {
    let rendered = Transformation::new().param(name, value).generate().unwrap();
    assert_eq!(rendered, expected);
}

#[rstest]
#[case("width", Some("w"))]
#[case("overlay", Some("l"))]
#[case("transformation", Some("t"))]
#[case("responsive_width", None)]
fn test_short_code_lookup(#[case] name: &str, #[case] expected: Option<&str>) {
    assert_eq!(short_code(name), expected);
}

#[test]
fn test_omitted_parameters_leave_no_trace() {
    let rendered = Transformation::new()
        .width(100)
        .param("effect", "")
        .generate()
        .unwrap();
    assert_eq!(rendered, "w_100");
}

#[test]
fn test_html_dimensions() {
    let rendered = Transformation::new()
        .width(100)
        .height(101)
        .render(&RenderOptions::default())
        .unwrap();
    assert_eq!(rendered.path, "h_101,w_100");
    assert_eq!(rendered.meta.html_width.as_deref(), Some("100"));
    assert_eq!(rendered.meta.html_height.as_deref(), Some("101"));
}

#[test]
fn test_overlay_suppresses_html_dimensions() {
    let rendered = Transformation::new()
        .overlay("text:hello")
        .width(100)
        .height(100)
        .render(&RenderOptions::default())
        .unwrap();
    assert_eq!(rendered.path, "h_100,l_text:hello,w_100");
    assert_eq!(rendered.meta.html_width, None);
    assert_eq!(rendered.meta.html_height, None);
}

#[test]
fn test_fit_crop_suppresses_html_dimensions() {
    let rendered = Transformation::new()
        .width(100)
        .height(100)
        .crop("fit")
        .render(&RenderOptions::default())
        .unwrap();
    assert_eq!(rendered.meta.html_width, None);
    assert_eq!(rendered.meta.html_height, None);
}

#[test]
fn test_chained_stages() {
    let rendered = Transformation::new()
        .width(100)
        .crop("fill")
        .chain()
        .effect("sepia")
        .generate()
        .unwrap();
    assert_eq!(rendered, "c_fill,w_100/e_sepia");
}

#[test]
fn test_layer_descriptors() {
    let rendered = Transformation::new()
        .overlay(Layer::text("Hello World", TextStyle::new("Arial", 18)))
        .chain()
        .underlay(Layer::asset("folder/logo").with_format("png"))
        .generate()
        .unwrap();
    assert_eq!(
        rendered,
        "l_text:Arial_18:Hello%20World/u_folder:logo.png"
    );
}

#[test]
fn test_invalid_layer_is_error() {
    let result = Transformation::new().overlay(Layer::asset("")).generate();
    assert!(result.is_err());
}

#[test]
fn test_named_transformations_joined() {
    let rendered = Transformation::new()
        .named(&["blip", "blop"])
        .generate()
        .unwrap();
    assert_eq!(rendered, "t_blip.blop");
}

#[test]
fn test_nested_stages_precede_own_parameters() {
    let mut nested = Stage::new();
    nested.insert("crop".to_string(), "fill".into());
    nested.insert("width".to_string(), 10.into());

    let rendered = Transformation::new()
        .nested(vec![ParamValue::Stage(nested), "blip".into()])
        .width(20)
        .generate()
        .unwrap();
    assert_eq!(rendered, "c_fill,w_10/t_blip/w_20");
}

#[test]
fn test_conditional_transformation() {
    let rendered = Transformation::new()
        .if_condition("width > 300")
        .width(100)
        .end_if_condition()
        .generate()
        .unwrap();
    assert_eq!(rendered, "if_w_gt_300,w_100/if_end");
}

#[test]
fn test_condition_builder() {
    let condition = Expression::condition().face_count().gt(2);
    let rendered = Transformation::new()
        .if_condition(condition)
        .effect("blur")
        .generate()
        .unwrap();
    assert_eq!(rendered, "if_fc_gt_2,e_blur");
}

#[test]
fn test_user_variables_sorted_after_if() {
    let rendered = Transformation::new()
        .variable("zoom", 2)
        .variable("$aspect", "initial_width / initial_height")
        .if_condition("face_count > 0")
        .width("$zoom * 10")
        .generate()
        .unwrap();
    assert_eq!(
        rendered,
        "if_fc_gt_0,$aspect_iw_div_ih,$zoom_2,w_$zoom_mul_10"
    );
}

#[test]
fn test_offset_pair() {
    let rendered = Transformation::new()
        .offset(vec!["2.5", "30%"])
        .generate()
        .unwrap();
    assert_eq!(rendered, "eo_30p,so_2.5");
}

#[test]
fn test_offset_range_string() {
    let rendered = Transformation::new().offset("2..3").generate().unwrap();
    assert_eq!(rendered, "eo_3,so_2");
}

#[test]
fn test_short_offset_array_is_error() {
    let result = Transformation::new().offset(vec!["2"]).generate();
    assert!(matches!(
        result,
        Err(CloudinaryError::InvalidParameter { .. })
    ));
}

#[test]
fn test_malformed_range_is_dropped() {
    let rendered = Transformation::new()
        .duration("abc")
        .width(10)
        .generate()
        .unwrap();
    assert_eq!(rendered, "w_10");
}

#[test]
fn test_video_codec_struct() {
    let rendered = Transformation::new()
        .video_codec(VideoCodec::new("h264").profile("basic").level("3.1"))
        .generate()
        .unwrap();
    assert_eq!(rendered, "vc_h264:basic:3.1");
}

#[test]
fn test_default_dpr_option() {
    let options = RenderOptions {
        default_dpr: Some("auto".into()),
        ..Default::default()
    };
    let rendered = Transformation::new()
        .width(100)
        .render(&options)
        .unwrap();
    assert_eq!(rendered.path, "dpr_auto,w_100");
    assert!(rendered.meta.hi_dpi);
}

#[test]
fn test_custom_responsive_width_transformation() {
    let mut template = BTreeMap::new();
    template.insert("width".to_string(), ParamValue::from("auto:breakpoints"));
    template.insert("crop".to_string(), ParamValue::from("pad"));
    let options = RenderOptions {
        responsive_width_transformation: template,
        ..Default::default()
    };
    let rendered = Transformation::new()
        .width(100)
        .responsive_width(true)
        .render(&options)
        .unwrap();
    assert_eq!(rendered.path, "w_100/c_pad,w_auto:breakpoints");
    assert!(rendered.meta.is_responsive);
}

#[test]
fn test_raw_transformation_appended_last() {
    let rendered = Transformation::new()
        .width(100)
        .raw_transformation("g_north_west,x_10")
        .generate()
        .unwrap();
    assert_eq!(rendered, "w_100,g_north_west,x_10");
}

#[test]
fn test_render_transformation_function_matches_method() {
    let t = Transformation::new().width(10).chain().height(20);
    let options = RenderOptions::default();
    assert_eq!(
        render_transformation(&t, &options).unwrap(),
        t.render(&options).unwrap()
    );
}
