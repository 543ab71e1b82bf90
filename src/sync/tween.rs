use std::collections::BTreeMap;

use crate::{foundation::math::lerp, render::stage::NodeId};

/// Distance an entrance slides up while it fades in, in pixels.
pub const ENTRANCE_SLIDE_PX: f64 = 40.0;

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Range of biased scroll positions a tween is driven by. `start == end` is point-sized.
pub struct ScrollTrigger {
    /// Position where the tween begins.
    pub start: f64,
    /// Position where the tween completes.
    pub end: f64,
}

impl ScrollTrigger {
    /// Progress of `y` through the range, clamped to `[0, 1]`.
    pub fn progress(&self, y: f64) -> f64 {
        let len = self.end - self.start;
        if len <= 0.0 {
            return if y >= self.start { 1.0 } else { 0.0 };
        }
        ((y - self.start) / len).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Interpolated node property.
pub enum TweenProp {
    /// Opacity in `[0, 1]`.
    Opacity,
    /// Vertical translation from the laid-out position, in pixels.
    TranslateY,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// Start and end value of one property.
pub struct PropRange {
    /// Property.
    pub prop: TweenProp,
    /// Value at trigger start.
    pub from: f64,
    /// Value at trigger end.
    pub to: f64,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Scroll-driven interpolation handed to a [`TweenScheduler`].
pub struct Tween {
    /// Target node.
    pub node: NodeId,
    /// Interpolated properties.
    pub props: Vec<PropRange>,
    /// Driving scroll range.
    pub trigger: ScrollTrigger,
    /// Play once and stay at the end value, even when scrolling back.
    pub once: bool,
}

impl Tween {
    /// One-shot fade and slide in, completing when the scroll position reaches `top`.
    pub fn entrance(node: NodeId, top: f64, lead_px: f64) -> Self {
        Self {
            node,
            props: vec![
                PropRange {
                    prop: TweenProp::Opacity,
                    from: 0.0,
                    to: 1.0,
                },
                PropRange {
                    prop: TweenProp::TranslateY,
                    from: ENTRANCE_SLIDE_PX,
                    to: 0.0,
                },
            ],
            trigger: ScrollTrigger {
                start: top - lead_px,
                end: top,
            },
            once: true,
        }
    }

    /// Value of `prop` at scroll position `y`, if the tween drives it.
    pub fn value_at(&self, prop: TweenProp, y: f64) -> Option<f64> {
        let t = self.trigger.progress(y);
        self.props
            .iter()
            .find(|r| r.prop == prop)
            .map(|r| lerp(r.from, r.to, t))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
/// Handle to a registered tween.
pub struct TweenId(pub u64);

/// External interpolation engine.
///
/// Registered tweens stay live until killed; [`TweenScheduler::refresh`] asks the engine to
/// recompute trigger boundaries after geometry changed.
pub trait TweenScheduler {
    /// Start driving `tween`.
    fn register(&mut self, tween: Tween) -> TweenId;
    /// Stop `id` immediately. Unknown ids are ignored.
    fn kill(&mut self, id: TweenId);
    /// Recompute every live trigger boundary.
    fn refresh(&mut self);
}

#[derive(Clone, Debug, Default)]
/// Scheduler that keeps live tweens in memory and counts calls.
pub struct RecordingScheduler {
    live: BTreeMap<TweenId, Tween>,
    next: u64,
    /// Number of successful kills.
    pub kills: usize,
    /// Number of refresh requests.
    pub refreshes: usize,
}

impl RecordingScheduler {
    /// Empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Live tweens in registration order.
    pub fn live(&self) -> impl Iterator<Item = (TweenId, &Tween)> {
        self.live.iter().map(|(id, t)| (*id, t))
    }

    /// Live tween `id`.
    pub fn get(&self, id: TweenId) -> Option<&Tween> {
        self.live.get(&id)
    }

    /// Live tweens targeting `node`.
    pub fn for_node(&self, node: NodeId) -> Vec<&Tween> {
        self.live.values().filter(|t| t.node == node).collect()
    }

    /// Number of live tweens.
    pub fn len(&self) -> usize {
        self.live.len()
    }

    /// `true` if no tween is live.
    pub fn is_empty(&self) -> bool {
        self.live.is_empty()
    }
}

impl TweenScheduler for RecordingScheduler {
    fn register(&mut self, tween: Tween) -> TweenId {
        let id = TweenId(self.next);
        self.next += 1;
        self.live.insert(id, tween);
        id
    }

    fn kill(&mut self, id: TweenId) {
        if self.live.remove(&id).is_some() {
            self.kills += 1;
        }
    }

    fn refresh(&mut self) {
        self.refreshes += 1;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sync/tween.rs"]
mod tests;
