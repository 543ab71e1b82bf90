use std::collections::{HashMap, HashSet};

use crate::{
    assets::resolve::{AssetResolver, ImageRef},
    compose::materializer::{ComposedAvatar, ComposedScene, Materializer},
    foundation::{
        core::{Point, validate_finite},
        error::{StorypathError, StorypathResult},
    },
    geometry::curve::GeometryProvider,
    render::stage::Stage,
    scene::index::SceneIndex,
    sync::{
        span::PathSpan,
        state::{AvatarPhase, PhaseTransition},
        trigger::{Crossing, PointTrigger},
        tween::{Tween, TweenId, TweenScheduler},
    },
};

/// Default distance over which an entrance tween plays, in pixels.
pub const DEFAULT_ENTRANCE_LEAD_PX: f64 = 200.0;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
/// Runtime knobs of a [`ScrollSynchronizer`].
pub struct SyncOptions {
    /// Treat coupling references to unknown avatars as errors instead of ignoring them.
    #[serde(default)]
    pub strict_coupling: bool,
    /// Scroll distance entrance tweens play over, ending at the node's top edge.
    #[serde(default = "default_entrance_lead_px")]
    pub entrance_lead_px: f64,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            strict_coupling: false,
            entrance_lead_px: DEFAULT_ENTRANCE_LEAD_PX,
        }
    }
}

fn default_entrance_lead_px() -> f64 {
    DEFAULT_ENTRANCE_LEAD_PX
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Per-avatar outcome of one tick.
pub struct AvatarFrame {
    /// Avatar name.
    pub avatar: String,
    /// Phase after the tick.
    pub phase: AvatarPhase,
    /// Clamped path progress.
    pub progress: f64,
    /// Node anchor on the path.
    pub position: Point,
    /// Final visibility after coupling.
    pub visible: bool,
    /// Displayed image.
    pub image: ImageRef,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Phase edge fired during a tick.
pub struct TransitionEvent {
    /// Avatar name.
    pub avatar: String,
    /// Edge.
    pub transition: PhaseTransition,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Costume trigger crossed during a tick.
pub struct CostumeSwap {
    /// Avatar name.
    pub avatar: String,
    /// Index into the avatar's costume changes.
    pub costume: usize,
    /// Crossing direction.
    pub crossing: Crossing,
    /// Image displayed after the swap.
    pub image: ImageRef,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize)]
/// Everything one tick changed or decided.
pub struct TickReport {
    /// Raw scroll offset of the tick.
    pub offset: f64,
    /// One frame per avatar, in declaration order.
    pub frames: Vec<AvatarFrame>,
    /// Phase edges in evaluation order.
    pub transitions: Vec<TransitionEvent>,
    /// Costume swaps in evaluation order.
    pub costume_swaps: Vec<CostumeSwap>,
    /// Avatars hidden this frame, in declaration order.
    pub hidden: Vec<String>,
}

impl TickReport {
    /// Frame of `avatar`.
    pub fn frame(&self, avatar: &str) -> Option<&AvatarFrame> {
        self.frames.iter().find(|f| f.avatar == avatar)
    }

    /// `true` if `avatar` is hidden this frame.
    pub fn is_hidden(&self, avatar: &str) -> bool {
        self.hidden.iter().any(|h| h == avatar)
    }
}

#[derive(Clone, Debug, Default)]
struct Coupling {
    shows_with: Vec<usize>,
    shows_after: Vec<usize>,
}

#[derive(Clone, Debug)]
struct AvatarState {
    phase: AvatarPhase,
    scroll_fraction: Option<f64>,
    costume: Option<usize>,
}

/// Drives avatar nodes from the scroll offset.
///
/// Positions and visibility are a pure function of the offset. Phase edges and costume swaps are
/// reported against the previous tick. Geometry is only re-read through
/// [`ScrollSynchronizer::resync`].
pub struct ScrollSynchronizer<S> {
    scene: ComposedScene,
    options: SyncOptions,
    resolver: AssetResolver,
    scheduler: S,
    spans: Vec<PathSpan>,
    coupling: Vec<Coupling>,
    states: Vec<AvatarState>,
    tweens: Vec<TweenId>,
    last_offset: Option<f64>,
}

impl<S: TweenScheduler> ScrollSynchronizer<S> {
    /// Take over `scene`, resolving coupling names and registering entrance tweens on `scheduler`.
    pub fn new(
        scene: ComposedScene,
        resolver: AssetResolver,
        options: SyncOptions,
        scheduler: S,
    ) -> StorypathResult<Self> {
        let coupling = resolve_coupling(&scene, options.strict_coupling)?;
        let spans = scene
            .avatars
            .iter()
            .map(|a| PathSpan::from_meta(&a.meta))
            .collect();
        let states = scene
            .avatars
            .iter()
            .map(|_| AvatarState {
                phase: AvatarPhase::BeforeStart,
                scroll_fraction: None,
                costume: None,
            })
            .collect();

        let mut sync = Self {
            scene,
            options,
            resolver,
            scheduler,
            spans,
            coupling,
            states,
            tweens: Vec::new(),
            last_offset: None,
        };
        sync.register_entrances();
        Ok(sync)
    }

    /// Composed scene being driven.
    pub fn scene(&self) -> &ComposedScene {
        &self.scene
    }

    /// Options in use.
    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Tween scheduler.
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// Tween scheduler, mutably.
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Spans in declaration order.
    pub fn spans(&self) -> &[PathSpan] {
        &self.spans
    }

    /// Span of `avatar`.
    pub fn span(&self, avatar: &str) -> Option<PathSpan> {
        self.position_of(avatar).map(|i| self.spans[i])
    }

    /// Phase of `avatar` after the last tick.
    pub fn phase(&self, avatar: &str) -> Option<AvatarPhase> {
        self.position_of(avatar).map(|i| self.states[i].phase)
    }

    /// Offset of the last tick.
    pub fn last_offset(&self) -> Option<f64> {
        self.last_offset
    }

    /// Entrance tweens currently registered.
    pub fn entrance_tweens(&self) -> &[TweenId] {
        &self.tweens
    }

    /// Smallest offset at which every avatar is past the end of its span.
    pub fn completion_offset(&self) -> f64 {
        let base = self.scene.options.offset_top;
        self.scene
            .avatars
            .iter()
            .zip(&self.spans)
            .map(|(a, span)| span.bottom - base - a.avatar.offset_top + 1.0)
            .fold(0.0, f64::max)
    }

    /// Evaluate every avatar at scroll `offset` and apply the result to `stage`.
    pub fn on_scroll(&mut self, offset: f64, stage: &mut Stage) -> StorypathResult<TickReport> {
        validate_finite(offset, "scroll offset")?;
        let mut report = TickReport {
            offset,
            ..TickReport::default()
        };
        let placements: Vec<_> = self
            .scene
            .avatars
            .iter()
            .zip(&self.spans)
            .map(|(composed, span)| {
                let avatar = &composed.avatar;
                let placement =
                    span.place(offset + self.scene.options.offset_top + avatar.offset_top);
                let own = placement
                    .phase
                    .own_visibility(avatar.initially_hidden, avatar.hide_on_exit);
                (placement, own)
            })
            .collect();
        let mut hidden_now = Vec::with_capacity(placements.len());

        for (i, &(placement, own_visible)) in placements.iter().enumerate() {
            let composed = &self.scene.avatars[i];
            let avatar = &composed.avatar;

            let position = composed.curve.point_at_fraction(placement.progress);
            stage.set_position(composed.node, position);

            // Earlier peers are already final; later ones contribute their own visibility.
            let peer_hidden = |j: usize| {
                if j < i {
                    hidden_now[j]
                } else {
                    !placements[j].1
                }
            };
            let coupling = &self.coupling[i];
            let forced = coupling.shows_with.iter().any(|&j| peer_hidden(j))
                || !coupling.shows_after.iter().all(|&j| peer_hidden(j));
            let visible = own_visible && !forced;
            stage.set_visible(composed.node, visible);
            hidden_now.push(!visible);

            let state = &self.states[i];
            for &transition in state.phase.transitions_to(placement.phase) {
                tracing::debug!(avatar = %avatar.name, ?transition, offset, "avatar phase transition");
                report.transitions.push(TransitionEvent {
                    avatar: avatar.name.clone(),
                    transition,
                });
            }

            let (costume, swaps) = apply_costumes(
                composed,
                state.costume,
                state.scroll_fraction,
                placement.scroll_fraction,
            );
            let image = image_for(composed, costume);
            if costume != state.costume {
                stage.set_image(composed.node, image.clone(), self.resolver.uri(&image));
            }
            for (k, crossing) in swaps {
                let image = image_for(composed, costume_after(k, crossing));
                tracing::debug!(avatar = %avatar.name, costume = k, ?crossing, "costume swap");
                report.costume_swaps.push(CostumeSwap {
                    avatar: avatar.name.clone(),
                    costume: k,
                    crossing,
                    image,
                });
            }

            if !visible {
                report.hidden.push(avatar.name.clone());
            }
            report.frames.push(AvatarFrame {
                avatar: avatar.name.clone(),
                phase: placement.phase,
                progress: placement.progress,
                position,
                visible,
                image,
            });

            self.states[i] = AvatarState {
                phase: placement.phase,
                scroll_fraction: Some(placement.scroll_fraction),
                costume,
            };
        }

        self.last_offset = Some(offset);
        Ok(report)
    }

    #[tracing::instrument(skip(self, materializer, index, geometry, stage))]
    /// Re-read path geometry after a viewport resize.
    ///
    /// Anchors, spans and narrow-viewport rules are recomputed, every entrance tween is replaced,
    /// and the last offset is evaluated again. Nodes are kept. On error nothing changes.
    pub fn resync(
        &mut self,
        materializer: &Materializer,
        index: &SceneIndex,
        geometry: &dyn GeometryProvider,
        stage: &mut Stage,
    ) -> StorypathResult<Option<TickReport>> {
        materializer.relayout(&mut self.scene, index, geometry, stage)?;
        self.spans = self
            .scene
            .avatars
            .iter()
            .map(|a| PathSpan::from_meta(&a.meta))
            .collect();

        for id in std::mem::take(&mut self.tweens) {
            self.scheduler.kill(id);
        }
        self.register_entrances();
        self.scheduler.refresh();
        tracing::debug!(tweens = self.tweens.len(), "resynced scroll triggers");

        match self.last_offset {
            Some(offset) => self.on_scroll(offset, stage).map(Some),
            None => Ok(None),
        }
    }

    fn register_entrances(&mut self) {
        let lead = self.options.entrance_lead_px;
        for composed in &self.scene.avatars {
            let elements = composed
                .elements
                .iter()
                .filter(|e| !e.element.disable_animation)
                .map(|e| (e.node, e.anchor.y));
            let locations = composed.locations.iter().map(|l| (l.node, l.anchor.y));
            let events = composed.events.iter().map(|e| (e.node, e.anchor.y));
            for (node, top) in elements.chain(locations).chain(events) {
                let id = self.scheduler.register(Tween::entrance(node, top, lead));
                self.tweens.push(id);
            }
        }
    }

    fn position_of(&self, avatar: &str) -> Option<usize> {
        self.scene
            .avatars
            .iter()
            .position(|a| a.avatar.name == avatar)
    }
}

fn resolve_coupling(scene: &ComposedScene, strict: bool) -> StorypathResult<Vec<Coupling>> {
    let by_name: HashMap<&str, usize> = scene
        .avatars
        .iter()
        .enumerate()
        .map(|(i, a)| (a.avatar.name.as_str(), i))
        .collect();

    let mut out = Vec::with_capacity(scene.avatars.len());
    for composed in &scene.avatars {
        let owner = composed.avatar.name.as_str();
        let mut unknown: HashSet<String> = HashSet::new();
        let mut resolve = |names: &[String]| -> StorypathResult<Vec<usize>> {
            let mut peers = Vec::with_capacity(names.len());
            for name in names {
                if let Some(&j) = by_name.get(name.as_str()) {
                    peers.push(j);
                } else if strict {
                    return Err(StorypathError::coupling(format!(
                        "avatar '{owner}' is coupled to unknown avatar '{name}'"
                    )));
                } else if unknown.insert(name.clone()) {
                    tracing::warn!(avatar = owner, peer = %name, "ignoring coupling to unknown avatar");
                }
            }
            Ok(peers)
        };
        let shows_with = resolve(&composed.avatar.shows_with)?;
        let shows_after = resolve(&composed.avatar.shows_after)?;
        out.push(Coupling {
            shows_with,
            shows_after,
        });
    }
    Ok(out)
}

/// Process costume triggers crossed between scroll fractions `prev` and `now`.
///
/// Triggers follow the offset, not the path direction, so upward paths apply costumes in the
/// same order. Forward crossings apply in ascending position, backward ones in descending position.
fn apply_costumes(
    composed: &ComposedAvatar,
    mut current: Option<usize>,
    prev: Option<f64>,
    now: f64,
) -> (Option<usize>, Vec<(usize, Crossing)>) {
    let mut forward = Vec::new();
    let mut backward = Vec::new();
    for (k, costume) in composed.costumes.iter().enumerate() {
        let at = costume.change.position.fraction();
        match PointTrigger::new(at).crossing(prev, now) {
            Some(Crossing::Forward) => forward.push((at, k)),
            Some(Crossing::Backward) => backward.push((at, k)),
            None => {}
        }
    }
    forward.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));
    backward.sort_by(|a, b| b.0.total_cmp(&a.0).then(b.1.cmp(&a.1)));

    let mut swaps = Vec::with_capacity(forward.len() + backward.len());
    for (_, k) in forward {
        current = costume_after(k, Crossing::Forward);
        swaps.push((k, Crossing::Forward));
    }
    for (_, k) in backward {
        current = costume_after(k, Crossing::Backward);
        swaps.push((k, Crossing::Backward));
    }
    (current, swaps)
}

fn costume_after(k: usize, crossing: Crossing) -> Option<usize> {
    match crossing {
        Crossing::Forward => Some(k),
        Crossing::Backward => k.checked_sub(1),
    }
}

fn image_for(composed: &ComposedAvatar, costume: Option<usize>) -> ImageRef {
    costume
        .and_then(|k| composed.costumes.get(k))
        .map_or_else(|| composed.base_image.clone(), |c| c.image.clone())
}

#[cfg(test)]
#[path = "../../tests/unit/sync/synchronizer.rs"]
mod tests;
