//! Render Session

use crate::*;
use std::sync::Arc;
use tinsel_core::camera::Camera;
use tinsel_core::error::RenderError;
use tinsel_core::film::Film;
use tinsel_core::integrator::BoxRenderer;
use tinsel_core::options::Options;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::Spectrum;

/// Owns the accumulation buffer of a progressive render and keeps it
/// consistent with the camera and options. Any change that alters the
/// estimate discards the accumulated samples.
pub struct RenderSession {
    /// The scene.
    scene: Arc<Scene>,

    /// Current camera.
    camera: Camera,

    /// Current options.
    options: Options,

    /// The accumulation buffer.
    film: Film,

    /// The render backend.
    renderer: BoxRenderer,
}

impl RenderSession {
    /// Create a new `RenderSession` using the scene camera.
    ///
    /// * `scene`   - The scene.
    /// * `options` - Render options.
    /// * `backend` - The render backend.
    pub fn new(scene: Arc<Scene>, options: Options, backend: Backend) -> Result<Self, RenderError> {
        let mut renderer = create_renderer(backend, Arc::clone(&scene))?;
        renderer.init(options.width, options.height)?;
        Ok(Self {
            camera: scene.camera,
            scene,
            options,
            film: Film::new(options.width, options.height),
            renderer,
        })
    }

    /// Returns the scene.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Returns the current camera.
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Returns the current options.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the accumulation buffer.
    pub fn film(&self) -> &Film {
        &self.film
    }

    /// Returns the number of samples per pixel accumulated so far.
    pub fn samples(&self) -> u64 {
        self.film.samples()
    }

    /// Returns true once the sample budget is reached.
    pub fn is_complete(&self) -> bool {
        self.options.is_complete(self.film.samples())
    }

    /// Moves the camera. Accumulated samples are discarded if it changed.
    ///
    /// * `camera` - The new camera.
    pub fn set_camera(&mut self, camera: Camera) {
        if camera != self.camera {
            debug!("Camera changed, resetting accumulation");
            self.camera = camera;
            self.film.reset();
        }
    }

    /// Replaces the options. A new resolution reallocates the buffer; any
    /// other change that alters the estimate resets it.
    ///
    /// * `options` - The new options.
    pub fn set_options(&mut self, options: Options) -> Result<(), RenderError> {
        if (options.width, options.height) != (self.options.width, self.options.height) {
            self.resize(options.width, options.height)?;
        } else if self.options.invalidates(&options) {
            debug!("Options changed, resetting accumulation");
            self.film.reset();
        }
        self.options = options;
        Ok(())
    }

    /// Changes the resolution and discards accumulated samples.
    ///
    /// * `width`  - Image width.
    /// * `height` - Image height.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.renderer.init(width, height)?;
        self.film.resize(width, height);
        self.options.width = width;
        self.options.height = height;
        info!("Resized to {}x{}", width, height);
        Ok(())
    }

    /// Discards accumulated samples.
    pub fn reset(&mut self) {
        self.film.reset();
    }

    /// Renders one batch unless the sample budget is reached. Returns true if
    /// samples were added.
    pub fn render_batch(&mut self) -> Result<bool, RenderError> {
        if self.is_complete() {
            return Ok(false);
        }
        let before = self.film.samples();
        self.renderer.render(&self.camera, &self.options, &mut self.film)?;
        Ok(self.film.samples() > before)
    }

    /// Returns the current per-pixel radiance estimates in row-major order.
    pub fn resolve(&self) -> Vec<Spectrum> {
        self.film.resolve()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::test_scenes::*;
    use super::*;
    use tinsel_core::geometry::*;

    fn session() -> RenderSession {
        let options = Options {
            width: 8,
            height: 6,
            samples_per_batch: 2,
            max_samples: Some(6),
            ..Options::default()
        };
        let backend = Backend::Cpu {
            threads: 2,
            tile_size: 2,
        };
        RenderSession::new(Arc::new(light_over_floor()), options, backend).expect("session")
    }

    #[test]
    fn batches_stop_at_sample_budget() {
        let mut session = session();
        assert_eq!(session.render_batch(), Ok(true));
        assert_eq!(session.render_batch(), Ok(true));
        assert_eq!(session.render_batch(), Ok(true));
        assert!(session.is_complete());
        assert_eq!(session.render_batch(), Ok(false));
        assert_eq!(session.samples(), 6);
    }

    #[test]
    fn camera_change_resets_accumulation() {
        let mut session = session();
        session.render_batch().expect("render");
        assert_eq!(session.samples(), 2);

        // Same camera keeps samples.
        session.set_camera(*session.camera());
        assert_eq!(session.samples(), 2);

        let moved = Camera::look_at(
            Point3f::new(0.5, 0.6, 3.0),
            Point3f::new(0.0, 0.0, 0.0),
            Vector3f::new(0.0, 1.0, 0.0),
            60.0,
        )
        .expect("camera");
        session.set_camera(moved);
        assert_eq!(session.samples(), 0);
        assert!(session.film().pixels().iter().all(|p| p.weight == 0.0));

        // The next batch starts from a clean buffer.
        session.render_batch().expect("render");
        assert_eq!(session.samples(), 2);
    }

    #[test]
    fn reset_then_render_matches_fresh_session() {
        let mut a = session();
        a.render_batch().expect("render");
        a.render_batch().expect("render");
        a.reset();
        a.render_batch().expect("render");

        let mut b = session();
        b.render_batch().expect("render");
        assert_eq!(a.resolve(), b.resolve());
    }

    #[test]
    fn display_options_keep_accumulation() {
        let mut session = session();
        session.render_batch().expect("render");

        let mut options = *session.options();
        options.exposure = 2.0;
        options.limit = 4.0;
        session.set_options(options).expect("options");
        assert_eq!(session.samples(), 2);

        options.max_depth += 1;
        session.set_options(options).expect("options");
        assert_eq!(session.samples(), 0);
    }

    #[test]
    fn resize_reallocates() {
        let mut session = session();
        session.render_batch().expect("render");

        let mut options = *session.options();
        options.width = 5;
        options.height = 3;
        session.set_options(options).expect("options");
        assert_eq!(session.film().resolution(), (5, 3));
        assert_eq!(session.samples(), 0);
        assert_eq!(session.render_batch(), Ok(true));
        assert_eq!(session.resolve().len(), 15);

        assert!(matches!(session.resize(0, 3), Err(RenderError::Backend(_))));
    }
}
