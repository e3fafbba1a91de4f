pub(crate) mod filter;
pub(crate) mod layout;
pub(crate) mod opacity;
pub(crate) mod paint;
pub(crate) mod vector_graphic;
pub(crate) mod visibility;
