//! # Storypath guide
//!
//! This module walks through Storypath's model and runtime end to end. It has no items; it only
//! documents how the pieces fit.
//!
//! ---
//!
//! ## Core concepts
//!
//! - [`Scene`](crate::Scene): the declared story (avatars, elements, locations, events, costume
//!   changes) plus scene-wide [`SceneOptions`](crate::SceneOptions)
//! - [`SceneIndex`](crate::SceneIndex): the validated scene with per-avatar lookup tables, built
//!   once and borrowed by every later stage
//! - [`PathCurve`](crate::PathCurve): a measured path with `length`, `signed_height` and
//!   `point_at_distance`
//! - [`Stage`](crate::Stage): the nodes the host presents, with positions, images, visibility
//!   and a responsive stylesheet
//! - [`ScrollSynchronizer`](crate::ScrollSynchronizer): turns scroll offsets into node updates
//!
//! ## Declaring a scene
//!
//! ```
//! use storypath::{AvatarOptions, ElementOptions, SceneBuilder, Size};
//!
//! let scene = SceneBuilder::default()
//!     .offset_top(200.0)
//!     .add_avatar(
//!         "hannah",
//!         AvatarOptions {
//!             size: Some(Size::square(105.0)),
//!             hide_on_exit: true,
//!             ..AvatarOptions::default()
//!         },
//!     )?
//!     .add_element(
//!         "beach",
//!         ElementOptions {
//!             x_offset: -330.0,
//!             ..ElementOptions::new("hannah", "25%")
//!         },
//!     )?
//!     .add_costume_change("hannah", "graduate", "80%")?
//!     .build()?;
//! assert_eq!(scene.elements("hannah").len(), 1);
//! # Ok::<(), storypath::StorypathError>(())
//! ```
//!
//! Positions are percentage strings. Every position-bearing record goes through the same parser,
//! [`parse_percentage`](crate::parse_percentage): the first `<number>%` in the string wins, and a
//! negative or above-100 value is rejected.
//!
//! Avatar name uniqueness is checked in `add_avatar`, costume targets in `add_costume_change`,
//! and every other avatar reference in `build`.
//!
//! ## Materializing
//!
//! [`Materializer::compose`](crate::Materializer::compose) reads all named curves from a
//! [`GeometryProvider`](crate::GeometryProvider). Two curves with the same id fail with
//! `IdConflict`; an avatar without a curve fails with `MissingPath`. Both are detected before any
//! node is created.
//!
//! For every avatar, in declaration order:
//!
//! - the curve is measured once into [`PathMeta`](crate::PathMeta)
//! - the avatar node is created at the path start with origin
//!   [`Origin::TopCenter`](crate::Origin::TopCenter)
//! - each element, location and event gets a node at `point(position) + (x_offset, 0)`
//! - each costume image URI is prefetched once through a [`Prefetcher`](crate::Prefetcher)
//!
//! Mobile overrides become one [`StyleRule`](crate::StyleRule) per node, gated by
//! `max-width: 1096px` by default. Nodes without overrides get no rule.
//!
//! ## Scroll ticks
//!
//! For each avatar the tick computes `y = offset + scene.offset_top + avatar.offset_top` and
//! places it against the avatar's [`PathSpan`](crate::PathSpan):
//!
//! - above the span: [`AvatarPhase::BeforeStart`](crate::AvatarPhase::BeforeStart), visible unless
//!   `initially_hidden`
//! - inside: `Active`, visible, moved to `point(progress * length)`
//! - below: `AfterEnd`, visible unless `hide_on_exit`
//!
//! Upward paths (negative signed height) invert progress. Coupling is applied afterwards:
//! `shows_with` hides an avatar when any peer is hidden, and `shows_after` keeps it hidden until
//! every peer is. Peers declared earlier contribute their final decision for this tick and later
//! ones their own visibility at the same offset, so visibility depends on the offset alone.
//!
//! Costume changes are [`PointTrigger`](crate::PointTrigger)s on the span's scroll fraction, so
//! they apply in declaration order as the offset grows, whichever way the path runs. They fire on
//! edges only, so a tick that stays on one side of a trigger never re-swaps the image.
//!
//! ## Resizing
//!
//! Curves are in viewport pixels. After a resize call
//! [`ScrollSynchronizer::resync`](crate::ScrollSynchronizer::resync) (or
//! [`StorySession::on_resize`](crate::StorySession::on_resize)): anchors, spans, rules and
//! entrance tweens are rebuilt from fresh geometry, and the last offset is evaluated again.
