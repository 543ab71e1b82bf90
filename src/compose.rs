pub(crate) mod materializer;
