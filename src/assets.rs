pub(crate) mod prefetch;
pub(crate) mod resolve;
