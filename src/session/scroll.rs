use crate::{
    foundation::{
        core::validate_finite,
        error::{StorypathError, StorypathResult},
    },
    scene::model::ScrollMode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
/// Handle returned by [`UserScrollListeners::add`].
pub struct ListenerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// A scroll gesture made by the user (wheel, touch or keyboard), as opposed to a programmatic
/// scroll.
pub struct UserScrollEvent {
    /// Requested offset change in pixels, positive downward.
    pub delta: f64,
    /// Offset after the gesture was applied.
    pub offset: f64,
}

type Listener = Box<dyn FnMut(&UserScrollEvent)>;

/// Subscribers to user scroll gestures.
#[derive(Default)]
pub struct UserScrollListeners {
    listeners: Vec<(ListenerId, Listener)>,
    next: u64,
}

impl std::fmt::Debug for UserScrollListeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserScrollListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

impl UserScrollListeners {
    /// No listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `listener`.
    pub fn add(&mut self, listener: impl FnMut(&UserScrollEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next);
        self.next += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Unsubscribe `id`. Returns `false` if it was not subscribed.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    /// Call every listener in subscription order.
    pub fn notify(&mut self, event: &UserScrollEvent) {
        for (_, listener) in &mut self.listeners {
            listener(event);
        }
    }

    /// Number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    /// `true` if nobody listens.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
/// The single scroll offset of a session.
///
/// In [`ScrollMode::Native`] the host reports offsets and they are taken as-is. In
/// [`ScrollMode::Delegated`] the session moves the offset itself and keeps it inside
/// `[0, extent]`.
pub struct ScrollPosition {
    mode: ScrollMode,
    offset: f64,
    extent: f64,
}

impl ScrollPosition {
    /// Offset 0 in a document scrollable up to `extent`.
    pub fn new(mode: ScrollMode, extent: f64) -> StorypathResult<Self> {
        let mut pos = Self {
            mode,
            offset: 0.0,
            extent: 0.0,
        };
        pos.set_extent(extent)?;
        Ok(pos)
    }

    /// Current mode.
    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    /// Current offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Largest reachable offset.
    pub fn extent(&self) -> f64 {
        self.extent
    }

    /// Change the reachable range, pulling a delegated offset back inside it.
    pub fn set_extent(&mut self, extent: f64) -> StorypathResult<()> {
        if !extent.is_finite() || extent < 0.0 {
            return Err(StorypathError::validation(
                "scroll extent must be finite and >= 0",
            ));
        }
        self.extent = extent;
        if self.mode == ScrollMode::Delegated {
            self.offset = self.offset.clamp(0.0, extent);
        }
        Ok(())
    }

    /// Jump to `offset`. Returns the offset actually applied.
    pub fn set(&mut self, offset: f64) -> StorypathResult<f64> {
        validate_finite(offset, "scroll offset")?;
        self.offset = match self.mode {
            ScrollMode::Native => offset,
            ScrollMode::Delegated => offset.clamp(0.0, self.extent),
        };
        Ok(self.offset)
    }

    /// Apply a user gesture. Returns the new offset; a native offset is left for the host to move.
    pub fn apply_delta(&mut self, delta: f64) -> StorypathResult<f64> {
        validate_finite(delta, "scroll delta")?;
        if self.mode == ScrollMode::Delegated {
            self.offset = (self.offset + delta).clamp(0.0, self.extent);
        }
        Ok(self.offset)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/scroll.rs"]
mod tests;
