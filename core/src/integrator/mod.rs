//! Integrator

mod common;

use crate::camera::Camera;
use crate::error::RenderError;
use crate::film::Film;
use crate::options::Options;

// Re-export.
pub use common::*;

/// Capability interface of a render backend. A backend is created once per
/// session for a fixed scene.
pub trait Renderer: Send {
    /// Returns a short name of the backend for logging.
    fn name(&self) -> &'static str;

    /// (Re)allocates per-pixel state for a resolution. Must be called before
    /// the first `render` and after every resolution change.
    ///
    /// * `width`  - Image width.
    /// * `height` - Image height.
    fn init(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Adds one batch of `options.samples_per_batch` samples to every pixel
    /// of `film`. Never overwrites accumulated data.
    ///
    /// * `camera`  - The camera.
    /// * `options` - Render options.
    /// * `film`    - The accumulation buffer.
    fn render(&mut self, camera: &Camera, options: &Options, film: &mut Film) -> Result<(), RenderError>;
}

/// Boxed `Renderer`.
pub type BoxRenderer = Box<dyn Renderer>;
