pub(crate) mod config;
pub(crate) mod layer;
pub(crate) mod resolve;
pub(crate) mod sampler;
pub(crate) mod selection;
