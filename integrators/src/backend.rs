//! Backend Selection

use crate::*;
use std::fmt;
use std::sync::Arc;
use tinsel_core::error::RenderError;
use tinsel_core::integrator::BoxRenderer;
use tinsel_core::scene::Scene;

/// Available render backends.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Backend {
    /// Tiles of rows rendered depth first on a thread pool.
    Cpu {
        /// Worker threads; 0 selects one per CPU.
        threads: usize,

        /// Rows per tile.
        tile_size: u32,
    },

    /// Waves of paths advanced breadth first.
    Wavefront {
        /// Worker threads; 0 selects one per CPU.
        threads: usize,

        /// Maximum number of paths in flight.
        wave_size: usize,
    },
}

impl Default for Backend {
    fn default() -> Self {
        Self::Cpu {
            threads: 0,
            tile_size: 16,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cpu { threads, tile_size } => write!(f, "cpu (threads = {threads}, tile size = {tile_size})"),
            Self::Wavefront { threads, wave_size } => {
                write!(f, "wavefront (threads = {threads}, wave size = {wave_size})")
            }
        }
    }
}

/// Creates a renderer for a scene. The renderer still needs to be
/// initialized with `Renderer::init()`.
///
/// * `backend` - The backend.
/// * `scene`   - The scene.
pub fn create_renderer(backend: Backend, scene: Arc<Scene>) -> Result<BoxRenderer, RenderError> {
    info!("Creating {} renderer", backend);
    let renderer: BoxRenderer = match backend {
        Backend::Cpu { threads, tile_size } => Box::new(TileRenderer::new(scene, threads, tile_size)?),
        Backend::Wavefront { threads, wave_size } => Box::new(WavefrontRenderer::new(scene, threads, wave_size)?),
    };
    Ok(renderer)
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
