use super::*;
use std::{cell::RefCell, rc::Rc};

use crate::{
    assets::prefetch::RecordingLoader,
    geometry::svg::SvgGeometry,
    scene::{
        dsl::{AvatarOptions, ElementOptions, SceneBuilder},
        model::SceneOptions,
    },
    sync::{state::AvatarPhase, tween::RecordingScheduler},
};

const DRAWING: &[u8] = include_bytes!("../../data/paths.svg");

type Session = StorySession<SvgGeometry, RecordingScheduler, RecordingLoader>;

fn session(mode: ScrollMode) -> Session {
    let scene = SceneBuilder::new(SceneOptions {
        scroll_mode: mode,
        ..SceneOptions::default()
    })
    .add_avatar("hannah", AvatarOptions::default())
    .unwrap()
    .add_avatar("joseph", AvatarOptions::default())
    .unwrap()
    .add_costume_change("joseph", "hat", "50%")
    .unwrap()
    .add_element("cap", ElementOptions::new("hannah", "50%"))
    .unwrap()
    .build()
    .unwrap();
    StorySession::new(
        scene,
        SvgGeometry::from_data(DRAWING).unwrap(),
        SessionConfig::default(),
        RecordingScheduler::new(),
        RecordingLoader::default(),
    )
    .unwrap()
}

#[test]
fn wires_scene_geometry_and_scroll() {
    let mut s = session(ScrollMode::Native);
    assert_eq!(s.stage().nodes().len(), 3);
    assert_eq!(
        s.prefetcher().loader().requested,
        ["images/avatars/joseph/costumes/hat.png"]
    );
    assert!((s.scroll_extent() - 2001.0).abs() < 1e-3);

    let report = s.on_scroll(500.0).unwrap();
    let hannah = report.frame("hannah").unwrap();
    assert_eq!(hannah.phase, AvatarPhase::Active);
    assert!((hannah.progress - 0.5).abs() < 1e-3);
    assert_eq!(
        report.frame("joseph").unwrap().phase,
        AvatarPhase::BeforeStart
    );
    assert_eq!(s.offset(), 500.0);
}

#[test]
fn resize_rescales_spans_and_reevaluates() {
    let mut s = session(ScrollMode::Native);
    let before = s.on_scroll(250.0).unwrap();
    assert!((before.frame("hannah").unwrap().progress - 0.25).abs() < 1e-3);

    let after = s.on_resize(500.0).unwrap().unwrap();
    assert!((after.frame("hannah").unwrap().progress - 0.5).abs() < 1e-3);
    assert!((s.scroll_extent() - 1001.0).abs() < 1e-3);
    assert_eq!(s.synchronizer().scheduler().refreshes, 1);

    let cap = s.synchronizer().scene().avatars[0].elements[0].node;
    assert!((s.stage().node(cap).position.y - 250.0).abs() < 1e-3);
}

#[test]
fn failed_resize_keeps_previous_geometry() {
    let mut s = session(ScrollMode::Native);
    s.on_scroll(250.0).unwrap();
    assert!(s.on_resize(-1.0).is_err());
    assert_eq!(s.geometry().render_width(), 1000.0);
    assert!((s.synchronizer().spans()[0].bottom - 1000.0).abs() < 1e-3);
}

#[test]
fn delegated_mode_moves_the_offset_itself() {
    let mut s = session(ScrollMode::Delegated);
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    s.add_user_scroll_listener(move |e| sink.borrow_mut().push(e.offset));

    let report = s.on_user_scroll(300.0).unwrap().unwrap();
    assert_eq!(report.offset, 300.0);
    assert!(s.on_user_scroll(-1000.0).unwrap().is_some());
    assert_eq!(s.offset(), 0.0);
    assert!(s.on_user_scroll(-5.0).unwrap().is_none());

    assert_eq!(*seen.borrow(), [300.0, 0.0, 0.0]);
}

#[test]
fn native_mode_only_notifies_listeners() {
    let mut s = session(ScrollMode::Native);
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = s.add_user_scroll_listener(move |_| *sink.borrow_mut() += 1);

    assert!(s.on_user_scroll(120.0).unwrap().is_none());
    assert_eq!(s.offset(), 0.0);
    assert!(s.remove_user_scroll_listener(id));
    s.on_user_scroll(120.0).unwrap();
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn scroll_to_bottom_passes_every_span() {
    let mut s = session(ScrollMode::Delegated);
    let report = s.scroll_to_bottom().unwrap();
    assert!(
        report
            .frames
            .iter()
            .all(|f| f.phase == AvatarPhase::AfterEnd)
    );
    assert_eq!(
        report.frame("joseph").unwrap().image,
        crate::assets::resolve::ImageRef::costume("joseph", "hat")
    );

    s.set_scroll_extent(1500.0).unwrap();
    let capped = s.scroll_to_bottom().unwrap();
    assert_eq!(capped.offset, 1500.0);
    assert_eq!(
        capped.frame("joseph").unwrap().phase,
        AvatarPhase::Active
    );
}
