use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use crate::foundation::core::Size;
use crate::foundation::error::{RasterError, RasterResult};

static NEXT_DRAWABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a [`VectorDrawable`] instance.
///
/// Ids are minted once per drawable, so two drawables decoded from identical bytes still
/// compare unequal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DrawableId(u64);

impl DrawableId {
    fn next() -> Self {
        Self(NEXT_DRAWABLE_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value, for logging.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// A decoded vector scene plus its intrinsic size.
///
/// Drawables are shared between nodes behind an `Arc` and never mutated after construction.
pub struct VectorDrawable {
    id: DrawableId,
    tree: usvg::Tree,
    intrinsic_size: Size,
}

impl std::fmt::Debug for VectorDrawable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorDrawable")
            .field("id", &self.id)
            .field("intrinsic_size", &self.intrinsic_size)
            .finish_non_exhaustive()
    }
}

impl VectorDrawable {
    /// Wrap an already parsed `usvg` tree.
    pub fn from_tree(tree: usvg::Tree) -> Self {
        let size = tree.size();
        Self {
            id: DrawableId::next(),
            intrinsic_size: Size::new(f64::from(size.width()), f64::from(size.height())),
            tree,
        }
    }

    /// Parse SVG bytes with default `usvg` options.
    pub fn from_svg_data(bytes: &[u8]) -> RasterResult<Self> {
        let opts = usvg::Options::default();
        let tree = usvg::Tree::from_data(bytes, &opts).context("parse svg tree")?;
        let drawable = Self::from_tree(tree);
        if !drawable.intrinsic_size.is_finite() {
            return Err(RasterError::validation("svg has non-finite intrinsic size"));
        }
        Ok(drawable)
    }

    /// Identity token used in raster keys.
    pub fn id(&self) -> DrawableId {
        self.id
    }

    /// Size declared by the vector scene, in logical units.
    pub fn intrinsic_size(&self) -> Size {
        self.intrinsic_size
    }

    /// Underlying scene graph.
    pub fn tree(&self) -> &usvg::Tree {
        &self.tree
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/drawable.rs"]
mod tests;
