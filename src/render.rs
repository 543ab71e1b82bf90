pub(crate) mod responsive;
pub(crate) mod stage;
