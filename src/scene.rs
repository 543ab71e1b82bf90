pub(crate) mod dsl;
pub(crate) mod index;
pub(crate) mod model;
