#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Direction a [`PointTrigger`] was crossed in.
pub enum Crossing {
    /// Progress grew past the trigger.
    Forward,
    /// Progress fell back below the trigger.
    Backward,
}

#[derive(Clone, Copy, Debug, PartialEq)]
/// Point-sized trigger region at a progress fraction.
///
/// Fires only on edges, never while progress stays on one side.
pub struct PointTrigger {
    /// Progress fraction of the trigger.
    pub at: f64,
}

impl PointTrigger {
    /// Trigger at `at`.
    pub fn new(at: f64) -> Self {
        Self { at }
    }

    /// `true` once `progress` has reached the trigger.
    pub fn is_passed(&self, progress: f64) -> bool {
        progress >= self.at
    }

    /// Edge between `prev` and `now`. With no previous sample the trigger counts as unpassed.
    pub fn crossing(&self, prev: Option<f64>, now: f64) -> Option<Crossing> {
        let was = prev.is_some_and(|p| self.is_passed(p));
        match (was, self.is_passed(now)) {
            (false, true) => Some(Crossing::Forward),
            (true, false) => Some(Crossing::Backward),
            _ => None,
        }
    }
}
