pub(crate) mod span;
pub(crate) mod state;
pub(crate) mod synchronizer;
pub(crate) mod trigger;
pub(crate) mod tween;
