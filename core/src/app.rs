//! Application command line

use crate::filter::Filter;
use crate::options::{Options, RenderMode};
use crate::pbrt::{Float, INFINITY};
use clap::{Parser, ValueEnum};

/// Built-in scenes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SceneName {
    /// A box with colored walls, 2 blocks and a ceiling light.
    Cornell,

    /// A row of spheres showing off the material parameters.
    Materials,
}

/// Render modes.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Full global illumination.
    Pathtrace,

    /// Shading normals of the first hit.
    Normals,

    /// Heat map of BVH traversal cost.
    Complexity,
}

/// Render backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// Tiles of rows on a worker pool.
    Cpu,

    /// Breadth-first waves of paths.
    Wavefront,
}

/// Pixel reconstruction filters.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum FilterKind {
    /// Box filter of radius 0.5.
    Box,

    /// Gaussian filter of radius 0.75.
    Gaussian,
}

/// Command line arguments.
#[derive(Parser, Clone, Debug)]
#[command(name = "tinsel", author, version, about, long_about = None)]
pub struct Args {
    /// Image width.
    #[arg(long, value_name = "NUM", default_value_t = 512, help = "Image width in pixels.")]
    pub width: u32,

    /// Image height.
    #[arg(long, value_name = "NUM", default_value_t = 256, help = "Image height in pixels.")]
    pub height: u32,

    /// Total samples per pixel.
    #[arg(
        long,
        value_name = "NUM",
        default_value_t = 64,
        value_parser = clap::value_parser!(u64).range(1..),
        help = "Samples per pixel to render."
    )]
    pub spp: u64,

    /// Samples per pixel per batch.
    #[arg(long, value_name = "NUM", default_value_t = 16, help = "Samples per pixel added by each batch.")]
    pub batch: u32,

    /// Exposure multiplier.
    #[arg(long, value_name = "FLOAT", default_value_t = 1.0, help = "Exposure multiplier.")]
    pub exposure: Float,

    /// White point of the tone map.
    #[arg(long, value_name = "FLOAT", default_value_t = 1.5, help = "Luminance mapped to white.")]
    pub limit: Float,

    /// Maximum path depth.
    #[arg(long = "maxdepth", value_name = "NUM", default_value_t = 4, help = "Maximum number of bounces.")]
    pub max_depth: u32,

    /// Render mode.
    #[arg(long, value_enum, default_value_t = Mode::Pathtrace, help = "What to render.")]
    pub mode: Mode,

    /// Built-in scene.
    #[arg(long, value_enum, default_value_t = SceneName::Cornell, help = "Built-in scene to render.")]
    pub scene: SceneName,

    /// Number of threads.
    #[arg(
        long,
        short = 't',
        value_name = "NUM",
        default_value_t = 0,
        help = "Use specified number of threads for rendering; 0 uses all logical CPUs."
    )]
    pub threads: usize,

    /// Tile size.
    #[arg(long = "tile-size", value_name = "NUM", default_value_t = 16, help = "Rows per tile rendered by a thread.")]
    pub tile_size: u32,

    /// Render backend.
    #[arg(long, value_enum, default_value_t = BackendKind::Cpu, help = "Render backend.")]
    pub backend: BackendKind,

    /// Reconstruction filter.
    #[arg(long, value_enum, default_value_t = FilterKind::Gaussian, help = "Pixel reconstruction filter.")]
    pub filter: FilterKind,

    /// Sampler seed.
    #[arg(long, value_name = "NUM", default_value_t = 0, help = "Seed of the sample streams.")]
    pub seed: u64,

    /// Per-sample radiance clamp.
    #[arg(long, value_name = "FLOAT", help = "Clamp the radiance of each sample to this value.")]
    pub clamp: Option<Float>,

    /// Output image.
    #[arg(
        long,
        short = 'o',
        value_name = "FILE",
        default_value = "render.png",
        help = "Write the final image to the given PNG file."
    )]
    pub outfile: String,

    /// Suppress progress and statistics.
    #[arg(long, help = "Suppress all text output other than error messages.")]
    pub quiet: bool,
}

impl Args {
    /// Returns the render options.
    pub fn options(&self) -> Options {
        Options {
            width: self.width,
            height: self.height,
            max_depth: self.max_depth,
            max_samples: Some(self.spp),
            samples_per_batch: self.batch.max(1),
            exposure: self.exposure,
            limit: self.limit,
            clamp: self.clamp.unwrap_or(INFINITY),
            mode: match self.mode {
                Mode::Pathtrace => RenderMode::PathTrace,
                Mode::Normals => RenderMode::Normals,
                Mode::Complexity => RenderMode::Complexity,
            },
            filter: match self.filter {
                FilterKind::Box => Filter::Box { radius: 0.5 },
                FilterKind::Gaussian => Filter::default(),
            },
            seed: self.seed,
            ..Options::default()
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
