//! Storypath drives illustrated characters ("avatars") along vector paths as a page scrolls.
//!
//! A story is declared once as a [`Scene`]: avatars that each follow the path curve sharing
//! their name, decorative elements and captions pinned at percentages along those paths, and
//! costume changes that swap an avatar's image mid-path. The runtime turns every scroll offset
//! into node positions, visibility and images on a retained [`Stage`].
//!
//! # Pipeline overview
//!
//! 1. **Declare**: [`SceneBuilder`] (or a JSON file via [`Scene::from_path`]) produces a validated
//!    [`Scene`], which is indexed once into a [`SceneIndex`].
//! 2. **Materialize**: [`Materializer::compose`] binds each avatar to its [`PathCurve`] from a
//!    [`GeometryProvider`], measures it once, and creates the visual nodes and responsive rules.
//! 3. **Synchronize**: [`ScrollSynchronizer::on_scroll`] evaluates every avatar in declaration
//!    order at each scroll offset; [`ScrollSynchronizer::resync`] re-reads geometry after a
//!    resize.
//!
//! [`StorySession`] wires the three stages together with a scroll position and user-scroll
//! listeners.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic ticks**: positions and visibility depend only on the offset; phase edges and
//!   costume swaps are reported against the previous tick.
//! - **Geometry off the hot path**: path length and height are measured at materialization and
//!   resync, never per tick.
//!
//! For a walkthrough of the concepts, see [`crate::guide`].
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod compose;
mod foundation;
mod geometry;
mod render;
mod scene;
mod session;
mod sync;

/// Standalone walkthrough of Storypath's concepts and runtime.
pub mod guide;

pub use assets::prefetch::{ImageLoader, Prefetcher, RecordingLoader};
pub use assets::resolve::{AssetResolver, ImageRef};
pub use compose::materializer::{
    ComposedAvatar, ComposedCostume, ComposedElement, ComposedEvent, ComposedLocation,
    ComposedScene, Materializer, PathMeta,
};
pub use foundation::core::{BezPath, Point, Rect, Size, Vec2};
pub use foundation::error::{StorypathError, StorypathResult};
pub use foundation::position::{PathPosition, parse_percentage};
pub use geometry::curve::{
    ARCLEN_ACCURACY, GeometryProvider, NamedCurve, PathCurve, StaticGeometry, ViewportGeometry,
};
pub use geometry::svg::SvgGeometry;
pub use render::responsive::{ResponsiveStyleBuilder, StyleRule};
pub use render::stage::{Layer, NodeId, NodeKind, Origin, Stage, VisualNode};
pub use scene::dsl::{AvatarOptions, ElementOptions, EventOptions, LocationOptions, SceneBuilder};
pub use scene::index::{AvatarIdx, SceneIndex};
pub use scene::model::{
    Avatar, CostumeChange, DEFAULT_NARROW_VIEWPORT_MAX_WIDTH_PX, Element, Event, Location,
    NarrowOverrides, Scene, SceneOptions, ScrollMode,
};
pub use session::runtime::{SessionConfig, StorySession};
pub use session::scroll::{ListenerId, ScrollPosition, UserScrollEvent, UserScrollListeners};
pub use sync::span::{PathSpan, Placement};
pub use sync::state::{AvatarPhase, PhaseTransition};
pub use sync::synchronizer::{
    AvatarFrame, CostumeSwap, DEFAULT_ENTRANCE_LEAD_PX, ScrollSynchronizer, SyncOptions,
    TickReport, TransitionEvent,
};
pub use sync::trigger::{Crossing, PointTrigger};
pub use sync::tween::{
    ENTRANCE_SLIDE_PX, PropRange, RecordingScheduler, ScrollTrigger, Tween, TweenId, TweenProp,
    TweenScheduler,
};
