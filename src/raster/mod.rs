pub(crate) mod entry;
pub(crate) mod image;
pub(crate) mod key;
pub(crate) mod opts;
pub(crate) mod pending;
pub(crate) mod rasterizer;
