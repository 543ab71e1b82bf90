#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Where an avatar is relative to its path span.
pub enum AvatarPhase {
    /// Scroll position is above the span.
    #[default]
    BeforeStart,
    /// Scroll position is inside the span.
    Active,
    /// Scroll position is below the span.
    AfterEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
/// Edge of the phase machine, named after the scroll-trigger callbacks.
pub enum PhaseTransition {
    /// `BeforeStart -> Active`, scrolling down.
    Enter,
    /// `Active -> AfterEnd`, scrolling down.
    Leave,
    /// `AfterEnd -> Active`, scrolling up.
    EnterBack,
    /// `Active -> BeforeStart`, scrolling up. Resets the avatar to its initial state.
    LeaveBack,
}

impl AvatarPhase {
    /// Edges crossed going from `self` to `next`, in order.
    ///
    /// A jump across the whole span passes through `Active`, so it yields two edges.
    pub fn transitions_to(self, next: Self) -> &'static [PhaseTransition] {
        use AvatarPhase::*;
        use PhaseTransition::*;
        match (self, next) {
            (BeforeStart, Active) => &[Enter],
            (BeforeStart, AfterEnd) => &[Enter, Leave],
            (Active, AfterEnd) => &[Leave],
            (Active, BeforeStart) => &[LeaveBack],
            (AfterEnd, Active) => &[EnterBack],
            (AfterEnd, BeforeStart) => &[EnterBack, LeaveBack],
            _ => &[],
        }
    }

    /// Whether an avatar in this phase shows itself, before coupling is applied.
    pub fn own_visibility(self, initially_hidden: bool, hide_on_exit: bool) -> bool {
        match self {
            AvatarPhase::Active => true,
            AvatarPhase::AfterEnd => !hide_on_exit,
            AvatarPhase::BeforeStart => !initially_hidden,
        }
    }
}
