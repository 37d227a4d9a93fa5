//! Film

use crate::geometry::*;
use crate::spectrum::*;
use crate::{stat_inc, stat_memory_counter, stat_register_fns};
use std::mem::size_of;

stat_memory_counter!("Memory/Film pixels", FILM_PIXEL_MEMORY, film_stats_pixels);

stat_register_fns!(film_stats_pixels);

/// Accumulated pixel data.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Pixel {
    /// Running filter-weighted sum of radiance.
    pub rgb: Spectrum,

    /// Running sum of filter weights.
    pub weight: Float,
}

impl Pixel {
    /// Adds a weighted radiance sample.
    ///
    /// * `l`      - Radiance.
    /// * `weight` - Filter weight.
    pub fn add(&mut self, l: Spectrum, weight: Float) {
        self.rgb += l * weight;
        self.weight += weight;
    }

    /// Returns the weighted mean, or black if no weight was accumulated.
    pub fn mean(&self) -> Spectrum {
        if self.weight > 0.0 {
            self.rgb / self.weight
        } else {
            Spectrum::ZERO
        }
    }
}

/// Accumulation buffer holding per-pixel running sums. Renderers only ever
/// add to it; the host resets it when the estimate is invalidated.
#[derive(Clone, Debug)]
pub struct Film {
    /// Width in pixels.
    width: u32,

    /// Height in pixels.
    height: u32,

    /// Row-major pixel data.
    pixels: Vec<Pixel>,

    /// Samples per pixel accumulated so far.
    samples: u64,
}

impl Film {
    /// Create a new zeroed `Film`.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    pub fn new(width: u32, height: u32) -> Self {
        register_stats();

        let n = width as usize * height as usize;
        stat_inc!(FILM_PIXEL_MEMORY, (n * size_of::<Pixel>()) as u64);

        Self {
            width,
            height,
            pixels: vec![Pixel::default(); n],
            samples: 0,
        }
    }

    /// Returns the width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the resolution as `(width, height)`.
    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Returns the samples per pixel accumulated so far.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Records that a batch of samples per pixel was added.
    ///
    /// * `n` - Samples per pixel in the batch.
    pub fn add_samples(&mut self, n: u64) {
        self.samples += n;
    }

    /// Zeroes every sum and the sample count.
    pub fn reset(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = Pixel::default());
        self.samples = 0;
    }

    /// Reallocates the buffer for a new resolution and zeroes it.
    ///
    /// * `width`  - Width in pixels.
    /// * `height` - Height in pixels.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = Self::new(width, height);
    }

    /// Returns a pixel.
    ///
    /// * `x` - Column.
    /// * `y` - Row.
    pub fn pixel(&self, x: u32, y: u32) -> &Pixel {
        &self.pixels[(y * self.width + x) as usize]
    }

    /// Adds a weighted sample to a pixel.
    ///
    /// * `x`      - Column.
    /// * `y`      - Row.
    /// * `l`      - Radiance.
    /// * `weight` - Filter weight.
    pub fn add_sample(&mut self, x: u32, y: u32, l: Spectrum, weight: Float) {
        let w = self.width;
        self.pixels[(y * w + x) as usize].add(l, weight);
    }

    /// Returns all pixels in row-major order.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Returns the pixels in row-major order for writing.
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Splits the pixels into disjoint blocks of whole rows so that workers
    /// can write without synchronization. Each block is paired with its
    /// first row.
    ///
    /// * `rows` - Rows per block; must be positive.
    pub fn row_blocks_mut(&mut self, rows: u32) -> impl Iterator<Item = (u32, &mut [Pixel])> + '_ {
        let chunk = (rows.max(1) * self.width).max(1) as usize;
        let rows = rows.max(1);
        self.pixels
            .chunks_mut(chunk)
            .enumerate()
            .map(move |(i, block)| (i as u32 * rows, block))
    }

    /// Returns the per-pixel means in row-major order.
    pub fn resolve(&self) -> Vec<Spectrum> {
        self.pixels.iter().map(Pixel::mean).collect()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accumulates_weighted_mean() {
        let mut film = Film::new(2, 2);
        film.add_sample(1, 0, Spectrum::new(2.0), 1.0);
        film.add_sample(1, 0, Spectrum::new(4.0), 3.0);
        assert_eq!(film.pixel(1, 0).mean(), Spectrum::new(3.5));
        assert_eq!(film.resolve()[0], Spectrum::ZERO);
    }

    #[test]
    fn reset_zeroes_everything() {
        let mut film = Film::new(3, 2);
        film.add_sample(2, 1, Spectrum::ONE, 1.0);
        film.add_samples(16);
        film.reset();
        assert_eq!(film.samples(), 0);
        assert!(film.pixels().iter().all(|p| *p == Pixel::default()));
    }

    #[test]
    fn row_blocks_cover_film() {
        let mut film = Film::new(4, 5);
        let starts: Vec<(u32, usize)> = film
            .row_blocks_mut(2)
            .map(|(row, block)| (row, block.len()))
            .collect();
        assert_eq!(starts, vec![(0, 8), (2, 8), (4, 4)]);
    }
}
