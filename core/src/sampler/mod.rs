//! Sampler

use crate::geometry::*;
use crate::microfacet::*;
use crate::rng::*;
use crate::sampling::*;

/// Stream index used for primary ray generation; bounce streams count up
/// from 0.
pub const CAMERA_STREAM: u32 = u32::MAX;

/// Supplies a reproducible pseudo-random stream for each
/// (seed, pixel, sample index, bounce) tuple. The stream only depends on the
/// tuple, never on the order in which pixels or paths are processed, so a
/// fixed seed yields the same image regardless of scheduling.
#[derive(Copy, Clone, Debug)]
pub struct Sampler {
    /// Global seed.
    seed: u64,

    /// Pixel coordinates.
    pixel: (u32, u32),

    /// Sample index within the pixel.
    sample_index: u64,

    /// Generator for the current stream.
    rng: RNG,
}

impl Sampler {
    /// Create a new `Sampler` positioned at the camera stream of pixel
    /// `(0, 0)`, sample 0.
    ///
    /// * `seed` - Global seed.
    pub fn new(seed: u64) -> Self {
        let mut sampler = Self {
            seed,
            pixel: (0, 0),
            sample_index: 0,
            rng: RNG::default(),
        };
        sampler.start_stream(CAMERA_STREAM);
        sampler
    }

    /// Positions the sampler at the camera stream of a pixel sample.
    ///
    /// * `pixel`        - Pixel coordinates.
    /// * `sample_index` - Sample index within the pixel.
    pub fn start_pixel_sample(&mut self, pixel: (u32, u32), sample_index: u64) {
        self.pixel = pixel;
        self.sample_index = sample_index;
        self.start_stream(CAMERA_STREAM);
    }

    /// Switches to the stream of a path vertex.
    ///
    /// * `bounce` - Bounce depth; 0 is the first surface hit.
    pub fn start_bounce(&mut self, bounce: u32) {
        self.start_stream(bounce);
    }

    /// Reseeds the generator from the key of the current stream.
    ///
    /// * `stream` - Stream index.
    fn start_stream(&mut self, stream: u32) {
        let key = hash_keys(&[
            self.seed,
            self.pixel.0 as u64,
            self.pixel.1 as u64,
            self.sample_index,
            stream as u64,
        ]);
        self.rng = RNG::with_state(key, mix_bits(key ^ self.seed));
    }

    /// Returns the pixel of the current sample.
    pub fn pixel(&self) -> (u32, u32) {
        self.pixel
    }

    /// Returns the index of the current sample.
    pub fn sample_index(&self) -> u64 {
        self.sample_index
    }

    /// Returns a uniform variate in [0, 1).
    pub fn get_1d(&mut self) -> Float {
        self.rng.uniform_float()
    }

    /// Returns two uniform variates in [0, 1).
    pub fn get_2d(&mut self) -> Point2f {
        let x = self.rng.uniform_float();
        let y = self.rng.uniform_float();
        Point2f::new(x, y)
    }

    /// Returns an integer uniformly distributed in `[0, n)`.
    ///
    /// * `n` - Exclusive upper bound; must be positive.
    pub fn get_index(&mut self, n: usize) -> usize {
        self.rng.bounded_uniform_u32(n as u32) as usize
    }

    /// Samples a cosine-weighted direction on the `+z` hemisphere and
    /// returns it with its pdf `cos θ / π`.
    pub fn sample_cosine_hemisphere(&mut self) -> (Vector3f, Float) {
        let w = cosine_sample_hemisphere(&self.get_2d());
        (w, cosine_hemisphere_pdf(w.z))
    }

    /// Samples a microfacet normal from a distribution given the outgoing
    /// direction and returns it with its pdf. With the GGX distribution the
    /// pdf depends on roughness and anisotropy through the distribution's
    /// alpha values.
    ///
    /// * `distribution` - The microfacet distribution.
    /// * `wo`           - Outgoing direction in the local shading frame.
    pub fn sample_microfacet_normal<D: MicrofacetDistribution>(
        &mut self,
        distribution: &D,
        wo: &Vector3f,
    ) -> (Vector3f, Float) {
        let u = self.get_2d();
        let wh = distribution.sample_wh(wo, &u);
        (wh, distribution.pdf(wo, &wh))
    }

    /// Samples a point uniformly on a triangle and returns it with its pdf
    /// with respect to area.
    ///
    /// * `p` - Triangle vertices.
    pub fn sample_triangle(&mut self, p: &[Point3f; 3]) -> (Point3f, Float) {
        let b = uniform_sample_triangle(&self.get_2d());
        let point = p[0] * b.x + p[1] * b.y + p[2] * (1.0 - b.x - b.y);
        let area = 0.5 * (p[1] - p[0]).cross(&(p[2] - p[0])).length();
        let pdf = if area > 0.0 { 1.0 / area } else { 0.0 };
        (point, pdf)
    }

    /// Samples a point uniformly on a triangle as seen from `p_ref` and
    /// returns it with its pdf converted to solid angle at `p_ref`.
    ///
    /// * `p`     - Triangle vertices.
    /// * `n`     - Unit normal of the triangle.
    /// * `p_ref` - The point the triangle is seen from.
    pub fn sample_light_point(
        &mut self,
        p: &[Point3f; 3],
        n: &Vector3f,
        p_ref: &Point3f,
    ) -> (Point3f, Float) {
        let (point, pdf_area) = self.sample_triangle(p);
        (point, area_to_solid_angle_pdf(pdf_area, p_ref, &point, n))
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn streams_are_reproducible(
            seed in 0..1000u64,
            x in 0..64u32,
            y in 0..64u32,
            s in 0..1000u64,
            bounce in 0..8u32,
        ) {
            let mut a = Sampler::new(seed);
            let mut b = Sampler::new(seed);
            a.start_pixel_sample((x, y), s);
            b.start_pixel_sample((x, y), s);
            prop_assert_eq!(a.get_1d(), b.get_1d());
            a.start_bounce(bounce);
            let _ = b.get_2d();
            b.start_bounce(bounce);
            prop_assert_eq!(a.get_2d(), b.get_2d());
        }
    }

    #[test]
    fn streams_differ_between_keys() {
        let mut a = Sampler::new(1);
        let mut b = Sampler::new(1);
        a.start_pixel_sample((3, 4), 0);
        b.start_pixel_sample((3, 4), 1);
        assert_ne!(a.get_1d(), b.get_1d());
        a.start_bounce(2);
        b.start_pixel_sample((3, 4), 0);
        b.start_bounce(3);
        assert_ne!(a.get_1d(), b.get_1d());
        let mut c = Sampler::new(2);
        c.start_pixel_sample((3, 4), 0);
        c.start_bounce(2);
        let mut d = Sampler::new(1);
        d.start_pixel_sample((3, 4), 0);
        d.start_bounce(2);
        assert_ne!(c.get_1d(), d.get_1d());
    }

    #[test]
    fn cosine_sample_pdf_matches() {
        let mut s = Sampler::new(0);
        for _ in 0..100 {
            let (w, pdf) = s.sample_cosine_hemisphere();
            assert!(approx_eq!(Float, pdf, w.z * INV_PI, epsilon = 1e-6));
        }
    }

    #[test]
    fn triangle_samples_lie_on_triangle() {
        let tri = [
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(2.0, 0.0, 0.0),
            Point3f::new(0.0, 2.0, 0.0),
        ];
        let mut s = Sampler::new(3);
        for _ in 0..100 {
            let (p, pdf) = s.sample_triangle(&tri);
            assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 2.0 + 1e-5);
            assert_eq!(p.z, 0.0);
            assert!(approx_eq!(Float, pdf, 0.5));
        }
    }

    #[test]
    fn light_point_pdf_is_solid_angle() {
        let tri = [
            Point3f::new(-1.0, 1.0, -1.0),
            Point3f::new(1.0, 1.0, -1.0),
            Point3f::new(0.0, 1.0, 1.0),
        ];
        let n = Vector3f::new(0.0, -1.0, 0.0);
        let p_ref = Point3f::new(0.0, 0.0, 0.0);
        let mut s = Sampler::new(5);
        let (p, pdf) = s.sample_light_point(&tri, &n, &p_ref);
        let d = p - p_ref;
        let expected = 0.5 * d.length_squared() / (d.y / d.length());
        assert!(approx_eq!(Float, pdf, expected, epsilon = 1e-4));
    }
}
