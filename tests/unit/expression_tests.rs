// Expression normalization tests

use cloudinary::*;

#[test]
fn test_symbolic_operators() {
    assert_eq!(normalize("width > 100 && faceCount < 2"), "w_gt_100_and_fc_lt_2");
    assert_eq!(normalize("page_count != 1 || faceCount = 0"), "pc_ne_1_or_fc_eq_0");
}

#[test]
fn test_longer_operator_wins() {
    assert_eq!(normalize("w >= 5"), "w_gte_5");
    assert_eq!(normalize("w <= 5"), "w_lte_5");
}

#[test]
fn test_arithmetic_in_width() {
    let rendered = Transformation::new()
        .width("initial_width * 2")
        .generate()
        .unwrap();
    assert_eq!(rendered, "w_iw_mul_2");
}

#[test]
fn test_builder_terms_joined_with_underscore() {
    let expr = Expression::new().gt(5).and().lt(10);
    assert_eq!(expr.to_string(), "gt_5_and_lt_10");
    assert_eq!(expr.kind(), ExpressionKind::Expression);
}

#[test]
fn test_condition_kind() {
    let condition = Expression::condition().width().gt(100);
    assert_eq!(condition.kind(), ExpressionKind::Condition);
    assert_eq!(condition.to_string(), "w_gt_100");
}

#[test]
fn test_user_variable_does_not_absorb_following_names() {
    assert_eq!(normalize("$foo > width"), "$foo_gt_w");
    assert_eq!(normalize("$foo_gt_width"), "$foo_gt_w");
    assert_eq!(normalize("$x and width > 5"), "$x_and_w_gt_5");
}
