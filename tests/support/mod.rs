#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use vgraster::{
    DEFAULT_MAX_DIMENSION, RasterCompletion, RasterError, RasterImage, RasterKey, RasterRequest,
    Rasterizer, RenderHost, VectorDrawable,
};

pub const RED_SQUARE: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16">
<rect width="16" height="16" fill="red"/>
</svg>"#;

pub const BLUE_WIDE: &[u8] = br#"<svg xmlns="http://www.w3.org/2000/svg" width="32" height="8">
<rect width="32" height="8" fill="blue"/>
</svg>"#;

pub fn drawable(svg: &[u8]) -> Arc<VectorDrawable> {
    Arc::new(VectorDrawable::from_svg_data(svg).unwrap())
}

/// Rasterizer whose requests complete only when the test says so.
#[derive(Default)]
pub struct ManualRasterizer {
    queue: Mutex<VecDeque<(RasterRequest, RasterCompletion)>>,
}

impl ManualRasterizer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn pending_count(&self) -> usize {
        self.queue.lock().unwrap().len()
    }

    pub fn keys(&self) -> Vec<RasterKey> {
        self.queue
            .lock()
            .unwrap()
            .iter()
            .map(|(req, _)| *req.key())
            .collect()
    }

    fn take(&self, newest: bool) -> (RasterRequest, RasterCompletion) {
        let mut q = self.queue.lock().unwrap();
        let job = if newest { q.pop_back() } else { q.pop_front() };
        job.expect("no queued raster request")
    }

    /// Complete the oldest request; returns the image handed to the node.
    pub fn complete_next(&self) -> RasterImage {
        let (req, done) = self.take(false);
        let image = req.run(DEFAULT_MAX_DIMENSION).unwrap();
        done.complete(Ok(image.clone()));
        image
    }

    /// Complete the newest request first.
    pub fn complete_newest(&self) -> RasterImage {
        let (req, done) = self.take(true);
        let image = req.run(DEFAULT_MAX_DIMENSION).unwrap();
        done.complete(Ok(image.clone()));
        image
    }

    pub fn fail_next(&self, msg: &str) {
        let (_, done) = self.take(false);
        done.complete(Err(RasterError::rasterize(msg)));
    }

    pub fn complete_all(&self) -> Vec<RasterImage> {
        let mut out = Vec::new();
        while self.pending_count() > 0 {
            out.push(self.complete_next());
        }
        out
    }
}

impl Rasterizer for ManualRasterizer {
    fn rasterize(&self, request: RasterRequest, completion: RasterCompletion) {
        self.queue.lock().unwrap().push_back((request, completion));
    }
}

/// Host counting repaint requests.
#[derive(Default)]
pub struct CountingHost {
    marks: AtomicUsize,
}

impl CountingHost {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn marks(&self) -> usize {
        self.marks.load(Ordering::SeqCst)
    }
}

impl RenderHost for CountingHost {
    fn mark_needs_paint(&self) {
        self.marks.fetch_add(1, Ordering::SeqCst);
    }
}
