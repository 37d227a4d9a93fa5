//! Camera

use crate::geometry::*;
use crate::sampling::concentric_sample_disk;

/// Perspective camera with an optional thin lens for depth of field.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Camera {
    /// Camera position.
    pub position: Point3f,

    /// Unit viewing direction.
    pub forward: Vector3f,

    /// Unit right vector.
    pub right: Vector3f,

    /// Unit up vector.
    pub up: Vector3f,

    /// Vertical field of view in degrees.
    pub fov: Float,

    /// Radius of the lens aperture; 0 gives a pinhole camera.
    pub lens_radius: Float,

    /// Distance to the plane in focus.
    pub focal_distance: Float,
}

impl Camera {
    /// Creates a pinhole camera looking from `position` at `target`. Returns
    /// `None` if the view direction is degenerate or parallel to `up`.
    ///
    /// * `position` - Camera position.
    /// * `target`   - Point to look at.
    /// * `up`       - Approximate up direction.
    /// * `fov`      - Vertical field of view in degrees.
    pub fn look_at(position: Point3f, target: Point3f, up: Vector3f, fov: Float) -> Option<Self> {
        let forward = (target - position).try_normalize()?;
        let right = forward.cross(&up).try_normalize()?;
        let up = right.cross(&forward);
        Some(Self {
            position,
            forward,
            right,
            up,
            fov: clamp(fov, 1e-3, 179.0),
            lens_radius: 0.0,
            focal_distance: (target - position).length(),
        })
    }

    /// Returns the camera with a thin lens.
    ///
    /// * `lens_radius`    - Radius of the aperture.
    /// * `focal_distance` - Distance to the plane in focus.
    pub fn with_lens(mut self, lens_radius: Float, focal_distance: Float) -> Self {
        self.lens_radius = max(lens_radius, 0.0);
        self.focal_distance = max(focal_distance, 1e-3);
        self
    }

    /// Generates a primary ray through a continuous film position, where
    /// `(0, 0)` is the top-left corner of the image.
    ///
    /// * `film`   - Film position in pixels.
    /// * `width`  - Image width.
    /// * `height` - Image height.
    /// * `u_lens` - Uniform variates for the lens position.
    pub fn generate_ray(&self, film: &Point2f, width: u32, height: u32, u_lens: &Point2f) -> Ray {
        let tan_half = (self.fov.to_radians() * 0.5).tan();
        let aspect = width as Float / max(height, 1) as Float;
        let sx = (2.0 * film.x / max(width, 1) as Float - 1.0) * tan_half * aspect;
        let sy = (1.0 - 2.0 * film.y / max(height, 1) as Float) * tan_half;
        let dir = (self.forward + self.right * sx + self.up * sy).normalize();

        if self.lens_radius <= 0.0 {
            return Ray::new(self.position, dir);
        }

        // Point on the plane of focus that the pinhole ray passes through.
        let ft = self.focal_distance / dir.dot(&self.forward);
        let p_focus = self.position + dir * ft;
        let lens = concentric_sample_disk(u_lens) * self.lens_radius;
        let o = self.position + self.right * lens.x + self.up * lens.y;
        Ray::new(o, (p_focus - o).normalize())
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
