use super::*;
use crate::render::responsive::ResponsiveStyleBuilder;

fn element(name: &str) -> NodeKind {
    NodeKind::Element {
        name: name.to_string(),
    }
}

#[test]
fn nodes_are_created_visible_in_order() {
    let mut stage = Stage::new();
    let a = stage.create(element("a"), Layer::BehindAvatars, Origin::TopLeft);
    let b = stage.create(element("b"), Layer::InFrontOfAvatars, Origin::TopLeft);
    assert_eq!(a.as_u32(), 0);
    assert_eq!(b.as_u32(), 1);
    assert!(stage.node(a).visible);
    assert_eq!(stage.nodes_in_layer(Layer::InFrontOfAvatars).count(), 1);
}

#[test]
fn set_visible_reports_changes_only() {
    let mut stage = Stage::new();
    let a = stage.create(element("a"), Layer::BehindAvatars, Origin::TopLeft);
    assert!(!stage.set_visible(a, true));
    assert!(stage.set_visible(a, false));
    assert!(!stage.set_visible(a, false));
}

#[test]
fn top_center_origin_centers_horizontally() {
    let mut stage = Stage::new();
    let id = stage.create(
        NodeKind::Avatar {
            avatar: "bus".to_string(),
        },
        Layer::Avatars,
        Origin::TopCenter,
    );
    stage.set_position(id, Point::new(300.0, 40.0));
    assert_eq!(stage.node(id).left(100.0), 250.0);
}

#[test]
fn attaching_a_rule_replaces_the_previous_one() {
    let mut stage = Stage::new();
    let id = stage.create(element("a"), Layer::BehindAvatars, Origin::TopLeft);

    let rule = ResponsiveStyleBuilder::new("a")
        .mobile_px("left", 10.0)
        .compile(1096.0);
    stage.attach_style(id, rule);
    assert_eq!(stage.style_count(), 1);

    let rule = ResponsiveStyleBuilder::new("a")
        .mobile_px("left", 20.0)
        .compile(1096.0);
    stage.attach_style(id, rule);
    assert_eq!(stage.style_count(), 1);
    assert!(stage.stylesheet().contains("left: 20px"));

    stage.attach_style(id, None);
    assert_eq!(stage.style_count(), 0);
    assert!(stage.node(id).class_name.is_none());
}
