pub(crate) mod backend;
pub(crate) mod blend;
pub(crate) mod compositor;
pub(crate) mod image;
pub(crate) mod thumbnail;
