//! CPU Tile Renderer

use crate::*;
use std::sync::Arc;
use tinsel_core::camera::Camera;
use tinsel_core::error::RenderError;
use tinsel_core::film::{Film, Pixel};
use tinsel_core::integrator::*;
use tinsel_core::options::Options;
use tinsel_core::report_stats;
use tinsel_core::scene::Scene;

/// Renders batches on a pool of worker threads. The film is split into
/// blocks of whole rows that are handed to workers over a channel; each
/// worker renders every sample of the batch for the pixels of its block.
pub struct TileRenderer {
    /// The scene.
    scene: Arc<Scene>,

    /// Number of worker threads.
    threads: usize,

    /// Rows per tile.
    tile_size: u32,

    /// Resolution passed to `init()`.
    resolution: Option<(u32, u32)>,
}

impl TileRenderer {
    /// Create a new `TileRenderer`.
    ///
    /// * `scene`     - The scene.
    /// * `threads`   - Number of worker threads; 0 selects one per CPU.
    /// * `tile_size` - Rows per tile; must be positive.
    pub fn new(scene: Arc<Scene>, threads: usize, tile_size: u32) -> Result<Self, RenderError> {
        if tile_size == 0 {
            return Err(RenderError::Backend("tile size must be positive".to_string()));
        }
        register_integrator_stats();
        Ok(Self {
            scene,
            threads: worker_count(threads),
            tile_size,
            resolution: None,
        })
    }
}

impl Renderer for TileRenderer {
    fn name(&self) -> &'static str {
        "cpu"
    }

    fn init(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.resolution = Some(check_init(width, height)?);
        Ok(())
    }

    fn render(&mut self, camera: &Camera, options: &Options, film: &mut Film) -> Result<(), RenderError> {
        let resolution = check_resolution(self.resolution, film)?;
        check_options(options)?;
        let spp = batch_samples(options, film);
        if spp == 0 {
            return Ok(());
        }

        let first_sample = film.samples();
        let integrator = PathIntegrator::from(options);
        let scene: &Scene = &self.scene;
        let threads = self.threads;
        let tile_size = self.tile_size;

        info!(
            "Rendering {}x{} samples {}..{} on {} threads",
            resolution.0,
            resolution.1,
            first_sample,
            first_sample + spp,
            threads
        );

        let result = crossbeam::scope(|scope| -> Result<(), RenderError> {
            let (tx, rx) = crossbeam_channel::bounded::<(u32, &mut [Pixel])>(threads);

            // Spawn worker threads.
            for _ in 0..threads {
                let rxc = rx.clone();
                scope.spawn(move |_| {
                    for (first_row, block) in rxc.iter() {
                        let tile = Tile {
                            integrator: &integrator,
                            scene,
                            camera,
                            options,
                            resolution,
                        };
                        tile.render(first_row, block, first_sample, spp);
                    }
                    report_stats!();
                });
            }
            drop(rx);

            // Send work.
            for block in film.row_blocks_mut(tile_size) {
                tx.send(block)
                    .map_err(|_| RenderError::Backend("render workers exited early".to_string()))?;
            }
            Ok(())
        });

        result.map_err(|_| RenderError::Backend("a render worker panicked".to_string()))??;
        film.add_samples(spp);
        Ok(())
    }
}

/// Everything a worker needs to render a block of rows.
struct Tile<'a> {
    integrator: &'a PathIntegrator,
    scene: &'a Scene,
    camera: &'a Camera,
    options: &'a Options,
    resolution: (u32, u32),
}

impl<'a> Tile<'a> {
    /// Adds `spp` samples starting at `first_sample` to each pixel of a block.
    ///
    /// * `first_row`    - Row of the first pixel in `block`.
    /// * `block`        - Pixels of whole rows.
    /// * `first_sample` - Index of the first sample.
    /// * `spp`          - Samples per pixel.
    fn render(&self, first_row: u32, block: &mut [Pixel], first_sample: u64, spp: u64) {
        let width = self.resolution.0;
        debug!("Starting rows {}..{}", first_row, first_row + block.len() as u32 / width);

        for (i, pixel) in block.iter_mut().enumerate() {
            let p = (i as u32 % width, first_row + i as u32 / width);
            for sample_index in first_sample..first_sample + spp {
                let (l, weight) = sample_pixel(
                    self.integrator,
                    self.scene,
                    self.camera,
                    self.options,
                    self.resolution,
                    p,
                    sample_index,
                );
                pixel.add(l, weight);
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::test_scenes::*;
    use super::*;
    use tinsel_core::pbrt::Float;

    fn options(width: u32, height: u32) -> Options {
        Options {
            width,
            height,
            samples_per_batch: 2,
            ..Options::default()
        }
    }

    #[test]
    fn render_requires_init() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = TileRenderer::new(Arc::clone(&scene), 2, 4).expect("renderer");
        let options = options(8, 8);
        let mut film = Film::new(8, 8);
        assert_eq!(
            renderer.render(&scene.camera, &options, &mut film),
            Err(RenderError::NotInitialized)
        );
    }

    #[test]
    fn render_rejects_mismatched_film() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = TileRenderer::new(Arc::clone(&scene), 2, 4).expect("renderer");
        renderer.init(8, 8).expect("init");
        let options = options(8, 8);
        let mut film = Film::new(8, 4);
        assert_eq!(
            renderer.render(&scene.camera, &options, &mut film),
            Err(RenderError::SizeMismatch {
                expected: (8, 8),
                actual: (8, 4)
            })
        );
    }

    #[test]
    fn invalid_configuration_is_rejected() {
        let scene = Arc::new(light_over_floor());
        assert!(matches!(
            TileRenderer::new(Arc::clone(&scene), 1, 0),
            Err(RenderError::Backend(_))
        ));
        let mut renderer = TileRenderer::new(scene, 1, 1).expect("renderer");
        assert!(matches!(renderer.init(0, 4), Err(RenderError::Backend(_))));
    }

    #[test]
    fn degenerate_filter_is_rejected() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = TileRenderer::new(Arc::clone(&scene), 1, 4).expect("renderer");
        renderer.init(4, 4).expect("init");
        let options = Options {
            filter: tinsel_core::filter::Filter::Box { radius: -1.0 },
            ..options(4, 4)
        };
        let mut film = Film::new(4, 4);
        assert!(matches!(
            renderer.render(&scene.camera, &options, &mut film),
            Err(RenderError::Backend(_))
        ));
        assert_eq!(film.samples(), 0);
    }

    #[test]
    fn batches_accumulate() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = TileRenderer::new(Arc::clone(&scene), 3, 3).expect("renderer");
        renderer.init(10, 7).expect("init");
        let options = options(10, 7);
        let mut film = Film::new(10, 7);

        renderer.render(&scene.camera, &options, &mut film).expect("render");
        assert_eq!(film.samples(), 2);
        let first: Vec<Float> = film.pixels().iter().map(|p| p.weight).collect();

        renderer.render(&scene.camera, &options, &mut film).expect("render");
        assert_eq!(film.samples(), 4);
        for (p, w) in film.pixels().iter().zip(first.iter()) {
            assert!(p.weight > *w);
        }
    }

    #[test]
    fn thread_count_does_not_change_the_image() {
        let scene = Arc::new(light_over_floor());
        let options = options(12, 9);

        let mut images = vec![];
        for (threads, tile_size) in [(1, 9), (4, 1), (3, 2)] {
            let mut renderer = TileRenderer::new(Arc::clone(&scene), threads, tile_size).expect("renderer");
            renderer.init(12, 9).expect("init");
            let mut film = Film::new(12, 9);
            renderer.render(&scene.camera, &options, &mut film).expect("render");
            images.push(film.resolve());
        }
        assert_eq!(images[0], images[1]);
        assert_eq!(images[0], images[2]);
    }

    #[test]
    fn sample_budget_is_honoured() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = TileRenderer::new(Arc::clone(&scene), 2, 2).expect("renderer");
        renderer.init(4, 4).expect("init");
        let options = Options {
            max_samples: Some(5),
            ..options(4, 4)
        };
        let mut film = Film::new(4, 4);
        for _ in 0..4 {
            renderer.render(&scene.camera, &options, &mut film).expect("render");
        }
        assert_eq!(film.samples(), 5);
    }
}
