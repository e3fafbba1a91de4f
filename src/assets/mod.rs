pub(crate) mod drawable;
pub(crate) mod svg_raster;
