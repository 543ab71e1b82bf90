use super::*;

#[test]
fn no_overrides_compile_to_no_rule() {
    assert!(ResponsiveStyleBuilder::new("element:0").compile(1096.0).is_none());
}

#[test]
fn overrides_collect_into_one_media_rule() {
    let rule = ResponsiveStyleBuilder::new("element:3")
        .mobile_px("width", 350.0)
        .mobile_px("height", 350.0)
        .mobile_px("left", 120.5)
        .compile(1096.0)
        .unwrap();

    assert_eq!(rule.media_condition(), "max-width: 1096px");
    assert_eq!(rule.declarations.len(), 3);
    let css = rule.to_css();
    assert!(css.starts_with("@media (max-width: 1096px) {"));
    assert!(css.contains(&format!(".{} {{", rule.class_name)));
    assert!(css.contains("\t\twidth: 350px !important;\n"));
    assert!(css.contains("left: 120.5px !important;"));
}

#[test]
fn later_values_replace_earlier_ones() {
    let rule = ResponsiveStyleBuilder::new("n")
        .mobile_px("left", 1.0)
        .mobile_px("left", 2.0)
        .compile(800.0)
        .unwrap();
    assert_eq!(rule.declarations, [("left".to_string(), "2px".to_string())]);
}

#[test]
fn class_names_are_stable_per_identity() {
    let a = ResponsiveStyleBuilder::new("avatar:hannah");
    let b = ResponsiveStyleBuilder::new("avatar:hannah");
    let c = ResponsiveStyleBuilder::new("avatar:joseph");
    assert_eq!(a.class_name(), b.class_name());
    assert_ne!(a.class_name(), c.class_name());
    assert!(a.class_name().starts_with("sp-"));
}

#[test]
fn optional_px_skips_missing_values() {
    assert!(
        ResponsiveStyleBuilder::new("n")
            .mobile_px_opt("top", None)
            .compile(1096.0)
            .is_none()
    );
}
