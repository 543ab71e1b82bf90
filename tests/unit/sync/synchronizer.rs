use super::*;
use crate::{
    assets::prefetch::{Prefetcher, RecordingLoader},
    geometry::curve::StaticGeometry,
    scene::{
        dsl::{AvatarOptions, ElementOptions, LocationOptions, SceneBuilder},
        model::Scene,
    },
    sync::tween::RecordingScheduler,
};

struct Rig {
    index: SceneIndex,
    geometry: StaticGeometry,
    stage: Stage,
    sync: ScrollSynchronizer<RecordingScheduler>,
}

fn rig_with(scene: Scene, geometry: StaticGeometry, options: SyncOptions) -> StorypathResult<Rig> {
    let index = SceneIndex::new(scene)?;
    let mut stage = Stage::new();
    let mut prefetcher = Prefetcher::new(RecordingLoader::default());
    let composed = Materializer::default().compose(&index, &geometry, &mut stage, &mut prefetcher)?;
    let sync = ScrollSynchronizer::new(
        composed,
        AssetResolver::default(),
        options,
        RecordingScheduler::new(),
    )?;
    Ok(Rig {
        index,
        geometry,
        stage,
        sync,
    })
}

fn rig(scene: Scene, geometry: StaticGeometry) -> Rig {
    rig_with(scene, geometry, SyncOptions::default()).unwrap()
}

fn paths(list: &[(&str, &str)]) -> StaticGeometry {
    list.iter().fold(StaticGeometry::new(), |g, (id, d)| {
        g.with_path_data(*id, d).unwrap()
    })
}

fn hide_on_exit() -> AvatarOptions {
    AvatarOptions {
        hide_on_exit: true,
        ..AvatarOptions::default()
    }
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

impl Rig {
    fn tick(&mut self, offset: f64) -> TickReport {
        self.sync.on_scroll(offset, &mut self.stage).unwrap()
    }
}

#[test]
fn avatar_follows_its_path_with_scroll() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M300 0 L300 1000")]));

    let report = r.tick(500.0);
    let frame = report.frame("hannah").unwrap();
    assert_eq!(frame.phase, AvatarPhase::Active);
    assert!(approx(frame.progress, 0.5));
    assert!(approx(frame.position.x, 300.0) && approx(frame.position.y, 500.0));

    let node = r.stage.node(r.sync.scene().avatars[0].node);
    assert_eq!(node.position, frame.position);
    assert!(node.visible);
}

#[test]
fn offsets_bias_the_scroll_position() {
    let scene = SceneBuilder::default()
        .offset_top(100.0)
        .add_avatar(
            "hannah",
            AvatarOptions {
                offset_top: 50.0,
                ..AvatarOptions::default()
            },
        )
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    assert!(approx(r.tick(350.0).frames[0].progress, 0.5));
    assert!(approx(r.sync.completion_offset(), 851.0));
}

#[test]
fn repeated_offset_is_idempotent() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .add_costume_change("hannah", "graduate", "30%")
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 C400 300 -400 700 0 1000")]));

    let first = r.tick(640.0);
    let second = r.tick(640.0);
    assert_eq!(first.frames, second.frames);
    assert_eq!(first.costume_swaps.len(), 1);
    assert!(second.transitions.is_empty());
    assert!(second.costume_swaps.is_empty());
}

#[test]
fn phase_edges_fire_once_each() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));

    let edges = |report: TickReport| -> Vec<PhaseTransition> {
        report.transitions.into_iter().map(|t| t.transition).collect()
    };
    assert!(edges(r.tick(-10.0)).is_empty());
    assert_eq!(edges(r.tick(10.0)), [PhaseTransition::Enter]);
    assert!(edges(r.tick(20.0)).is_empty());
    assert_eq!(edges(r.tick(1500.0)), [PhaseTransition::Leave]);
    assert_eq!(edges(r.tick(500.0)), [PhaseTransition::EnterBack]);
    assert_eq!(edges(r.tick(-5.0)), [PhaseTransition::LeaveBack]);
    assert_eq!(r.sync.phase("hannah"), Some(AvatarPhase::BeforeStart));
}

#[test]
fn visibility_flags_apply_outside_the_span() {
    let scene = SceneBuilder::default()
        .add_avatar(
            "hannah",
            AvatarOptions {
                initially_hidden: true,
                hide_on_exit: true,
                ..AvatarOptions::default()
            },
        )
        .unwrap()
        .add_avatar("joseph", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(
        scene,
        paths(&[("hannah", "M0 100 L0 200"), ("joseph", "M0 100 L0 200")]),
    );

    let before = r.tick(0.0);
    assert!(before.is_hidden("hannah"));
    assert!(!before.is_hidden("joseph"));

    assert!(r.tick(150.0).hidden.is_empty());

    let after = r.tick(300.0);
    assert!(after.is_hidden("hannah"));
    assert!(!after.is_hidden("joseph"));
    // Joseph stays parked at the end of his path.
    assert!(approx(after.frame("joseph").unwrap().position.y, 200.0));

    assert!(r.tick(0.0).is_hidden("hannah"));
}

#[test]
fn upward_path_inverts_progress() {
    let scene = SceneBuilder::default()
        .add_avatar("bus", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("bus", "M0 1000 L0 0")]));
    assert!(r.sync.spans()[0].inverted);

    let top = r.tick(0.0);
    assert!(approx(top.frames[0].progress, 1.0));
    let quarter = r.tick(250.0);
    assert!(approx(quarter.frames[0].progress, 0.75));
    assert!(approx(quarter.frames[0].position.y, 250.0));
    assert!(approx(r.tick(1000.0).frames[0].progress, 0.0));
}

#[test]
fn costumes_swap_forward_and_back() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .add_costume_change("hannah", "first", "20%")
        .unwrap()
        .add_costume_change("hannah", "second", "50%")
        .unwrap()
        .add_costume_change("hannah", "third", "80%")
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    let node = r.sync.scene().avatars[0].node;

    assert_eq!(r.tick(100.0).frames[0].image, ImageRef::avatar("hannah"));

    let forward = r.tick(600.0);
    assert_eq!(forward.frames[0].image, ImageRef::costume("hannah", "second"));
    assert_eq!(
        forward
            .costume_swaps
            .iter()
            .map(|s| (s.costume, s.crossing))
            .collect::<Vec<_>>(),
        [(0, Crossing::Forward), (1, Crossing::Forward)]
    );
    assert_eq!(
        r.stage.node(node).image_uri.as_deref(),
        Some("images/avatars/hannah/costumes/second.png")
    );

    let back = r.tick(400.0);
    assert_eq!(back.frames[0].image, ImageRef::costume("hannah", "first"));
    assert_eq!(back.costume_swaps[0].crossing, Crossing::Backward);

    assert_eq!(r.tick(-50.0).frames[0].image, ImageRef::avatar("hannah"));
    assert_eq!(
        r.stage.node(node).image_uri.as_deref(),
        Some("images/avatars/hannah.png")
    );
}

#[test]
fn upward_path_applies_costumes_in_scroll_order() {
    let scene = SceneBuilder::default()
        .add_avatar("bus", AvatarOptions::default())
        .unwrap()
        .add_costume_change("bus", "first", "20%")
        .unwrap()
        .add_costume_change("bus", "second", "80%")
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("bus", "M0 1000 L0 0")]));

    let above = r.tick(-100.0);
    assert_eq!(above.frames[0].phase, AvatarPhase::BeforeStart);
    assert_eq!(above.frames[0].image, ImageRef::avatar("bus"));
    assert_eq!(r.tick(500.0).frames[0].image, ImageRef::costume("bus", "first"));
    assert_eq!(r.tick(900.0).frames[0].image, ImageRef::costume("bus", "second"));

    let back = r.tick(300.0);
    assert_eq!(back.costume_swaps[0].crossing, Crossing::Backward);
    assert_eq!(back.frames[0].image, ImageRef::costume("bus", "first"));
}

#[test]
fn fast_scroll_past_the_span_applies_every_costume_in_order() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .add_costume_change("hannah", "first", "20%")
        .unwrap()
        .add_costume_change("hannah", "second", "50%")
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    r.tick(-100.0);

    let jump = r.tick(5000.0);
    assert_eq!(jump.costume_swaps.len(), 2);
    assert_eq!(jump.frames[0].image, ImageRef::costume("hannah", "second"));

    let back = r.tick(-100.0);
    assert_eq!(
        back.costume_swaps.iter().map(|s| s.costume).collect::<Vec<_>>(),
        [1, 0]
    );
    assert_eq!(back.frames[0].image, ImageRef::avatar("hannah"));
}

#[test]
fn shows_with_hides_together_with_peer() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", hide_on_exit())
        .unwrap()
        .add_avatar(
            "hannah_joseph",
            AvatarOptions {
                shows_with: vec!["hannah".into()],
                ..AvatarOptions::default()
            },
        )
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(
        scene,
        paths(&[("hannah", "M0 0 L0 100"), ("hannah_joseph", "M0 0 L0 1000")]),
    );

    let inside = r.tick(50.0);
    assert!(inside.hidden.is_empty());

    let report = r.tick(500.0);
    assert_eq!(
        report.frame("hannah_joseph").unwrap().phase,
        AvatarPhase::Active
    );
    assert!(report.is_hidden("hannah"));
    assert!(report.is_hidden("hannah_joseph"));
    let node = r.sync.scene().avatars[1].node;
    assert!(!r.stage.node(node).visible);
}

#[test]
fn shows_after_waits_for_every_peer() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", hide_on_exit())
        .unwrap()
        .add_avatar("joseph", hide_on_exit())
        .unwrap()
        .add_avatar(
            "hannah_joseph",
            AvatarOptions {
                shows_after: vec!["hannah".into(), "joseph".into()],
                ..AvatarOptions::default()
            },
        )
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(
        scene,
        paths(&[
            ("hannah", "M0 0 L0 100"),
            ("joseph", "M0 0 L0 200"),
            ("hannah_joseph", "M0 0 L0 1000"),
        ]),
    );

    assert!(r.tick(50.0).is_hidden("hannah_joseph"));
    let one_gone = r.tick(150.0);
    assert!(one_gone.is_hidden("hannah"));
    assert!(one_gone.is_hidden("hannah_joseph"));
    let both_gone = r.tick(250.0);
    assert_eq!(both_gone.hidden, ["hannah", "joseph"]);
}

#[test]
fn later_declared_peers_count_in_the_same_tick() {
    let scene = SceneBuilder::default()
        .add_avatar(
            "hannah_joseph",
            AvatarOptions {
                shows_with: vec!["hannah".into()],
                ..AvatarOptions::default()
            },
        )
        .unwrap()
        .add_avatar("hannah", hide_on_exit())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(
        scene,
        paths(&[("hannah", "M0 0 L0 100"), ("hannah_joseph", "M0 0 L0 1000")]),
    );

    let first = r.tick(500.0);
    assert_eq!(first.hidden, ["hannah_joseph", "hannah"]);
    let second = r.tick(500.0);
    assert_eq!(first.frames, second.frames);

    assert!(r.tick(50.0).hidden.is_empty());
}

#[test]
fn mutual_shows_with_recovers_after_both_hide() {
    let paired = |peer: &str| AvatarOptions {
        shows_with: vec![peer.into()],
        ..hide_on_exit()
    };
    let scene = SceneBuilder::default()
        .add_avatar("hannah", paired("joseph"))
        .unwrap()
        .add_avatar("joseph", paired("hannah"))
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(
        scene,
        paths(&[("hannah", "M0 0 L0 1000"), ("joseph", "M0 0 L0 1000")]),
    );

    assert!(r.tick(500.0).hidden.is_empty());
    assert_eq!(r.tick(2000.0).hidden, ["hannah", "joseph"]);
    for _ in 0..3 {
        let back = r.tick(500.0);
        assert!(back.hidden.is_empty());
        assert!(back.frames.iter().all(|f| f.visible));
    }
}

#[test]
fn unknown_coupling_peers_are_ignored_unless_strict() {
    let scene = || {
        SceneBuilder::default()
            .add_avatar(
                "hannah",
                AvatarOptions {
                    shows_with: vec!["ghost".into()],
                    shows_after: vec!["ghost".into()],
                    ..AvatarOptions::default()
                },
            )
            .unwrap()
            .build()
            .unwrap()
    };
    let geometry = || paths(&[("hannah", "M0 0 L0 100")]);

    let mut r = rig(scene(), geometry());
    assert!(r.tick(50.0).hidden.is_empty());

    let strict = SyncOptions {
        strict_coupling: true,
        ..SyncOptions::default()
    };
    let err = rig_with(scene(), geometry(), strict).err().unwrap();
    assert!(matches!(err, StorypathError::Coupling(msg) if msg.contains("ghost")));
}

#[test]
fn one_entrance_tween_per_eligible_node() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .add_element("cap", ElementOptions::new("hannah", "10%"))
        .unwrap()
        .add_element(
            "gown",
            ElementOptions {
                disable_animation: true,
                ..ElementOptions::new("hannah", "20%")
            },
        )
        .unwrap()
        .add_location("Biola University", LocationOptions::new("hannah", "40%"))
        .unwrap()
        .build()
        .unwrap();
    let r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    let composed = &r.sync.scene().avatars[0];
    let scheduler = r.sync.scheduler();

    assert_eq!(scheduler.len(), 2);
    assert_eq!(scheduler.for_node(composed.elements[0].node).len(), 1);
    assert!(scheduler.for_node(composed.elements[1].node).is_empty());
    let caption = scheduler.for_node(composed.locations[0].node);
    assert_eq!(caption.len(), 1);
    assert!(approx(caption[0].trigger.end, 400.0));
    assert!(approx(caption[0].trigger.start, 400.0 - DEFAULT_ENTRANCE_LEAD_PX));
}

#[test]
fn resync_rederives_spans_and_replaces_tweens() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .add_element("cap", ElementOptions::new("hannah", "50%"))
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    assert!(approx(r.tick(250.0).frames[0].progress, 0.25));
    let old = r.sync.entrance_tweens().to_vec();

    r.geometry
        .map_paths(|_, p| p.apply_affine(kurbo::Affine::scale(0.5)));
    let report = r
        .sync
        .resync(&Materializer::default(), &r.index, &r.geometry, &mut r.stage)
        .unwrap()
        .unwrap();

    assert!(approx(report.frames[0].progress, 0.5));
    assert!(approx(r.sync.spans()[0].bottom, 500.0));
    let scheduler = r.sync.scheduler();
    assert_eq!(scheduler.kills, old.len());
    assert_eq!(scheduler.refreshes, 1);
    assert_eq!(scheduler.len(), 1);
    assert!(old.iter().all(|id| scheduler.get(*id).is_none()));
    let cap = r.sync.scene().avatars[0].elements[0].node;
    assert!(approx(scheduler.for_node(cap)[0].trigger.end, 250.0));
}

#[test]
fn resync_before_the_first_tick_reports_nothing() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    let report = r
        .sync
        .resync(&Materializer::default(), &r.index, &r.geometry, &mut r.stage)
        .unwrap();
    assert!(report.is_none());
}

#[test]
fn non_finite_offsets_are_rejected() {
    let scene = SceneBuilder::default()
        .add_avatar("hannah", AvatarOptions::default())
        .unwrap()
        .build()
        .unwrap();
    let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 1000")]));
    let err = r.sync.on_scroll(f64::NAN, &mut r.stage).unwrap_err();
    assert!(matches!(err, StorypathError::Validation(_)));
    assert!(r.sync.last_offset().is_none());
}

#[derive(Clone, Default)]
struct LogBuffer(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn unknown_peer_is_logged_once_per_pair() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();

    tracing::subscriber::with_default(subscriber, || {
        let scene = SceneBuilder::default()
            .add_avatar(
                "hannah",
                AvatarOptions {
                    shows_with: vec!["ghost".into()],
                    shows_after: vec!["ghost".into()],
                    ..AvatarOptions::default()
                },
            )
            .unwrap()
            .build()
            .unwrap();
        let mut r = rig(scene, paths(&[("hannah", "M0 0 L0 100")]));
        r.tick(10.0);
        r.tick(20.0);
    });

    let out = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert_eq!(out.matches("ignoring coupling to unknown avatar").count(), 1);
    assert!(out.contains("ghost"));
}
