//! Wavefront Renderer

use crate::*;
use crossbeam_channel::{Receiver, Sender};
use std::ops::Range;
use std::sync::Arc;
use tinsel_core::camera::Camera;
use tinsel_core::error::RenderError;
use tinsel_core::film::Film;
use tinsel_core::geometry::*;
use tinsel_core::integrator::*;
use tinsel_core::options::{Options, RenderMode};
use tinsel_core::primitive::Intersection;
use tinsel_core::scene::Scene;
use tinsel_core::spectrum::Spectrum;
use tinsel_core::{report_stats, stat_counter, stat_inc, stat_register_fns};

stat_counter!("Wavefront/Waves", WAVES, wavefront_stats_waves);
stat_counter!("Wavefront/Path extensions", EXTENSIONS, wavefront_stats_extensions);

stat_register_fns!(wavefront_stats_waves, wavefront_stats_extensions);

/// Default number of paths in flight.
pub const DEFAULT_WAVE_SIZE: usize = 1 << 16;

/// A path in flight together with its pixel and pending hit.
#[derive(Clone)]
struct WavefrontPath {
    /// Index of the pixel in row-major order.
    pixel: usize,

    /// Filter weight of the camera sample.
    weight: Float,

    /// Path state.
    state: PathState,

    /// Closest hit of `state.ray` from the last intersection stage.
    hit: Option<Intersection>,
}

/// A stage a worker runs over its share of the wave.
#[derive(Clone, Debug)]
enum Stage {
    /// Start one path per pixel in the range for a sample index.
    Generate(Range<usize>, u64),

    /// Find the closest hit of every active path.
    Intersect,

    /// Shade the pending hits and extend the paths.
    Shade,

    /// Return the sanitized radiance of every path.
    Collect,
}

/// What a worker reports back after a stage.
#[derive(Default)]
struct StageResult {
    /// Number of paths still active.
    active: usize,

    /// `(pixel, radiance, filter weight)` per path; only filled by
    /// `Stage::Collect`.
    samples: Vec<(usize, Spectrum, Float)>,
}

/// The main thread's end of a worker's channels.
struct WorkerHandle {
    stages: Sender<Stage>,
    results: Receiver<StageResult>,
}

/// Renders batches breadth first. A wave of paths, one per pixel, is
/// generated for one sample index and then advanced in stages: all active
/// paths are intersected, then all hits are shaded, until every path has
/// terminated. Workers are started once per batch; each owns a contiguous
/// share of the wave and runs the stages it receives over a channel. Results
/// are identical to `TileRenderer` for the same seed.
pub struct WavefrontRenderer {
    /// The scene.
    scene: Arc<Scene>,

    /// Number of worker threads.
    threads: usize,

    /// Maximum number of paths in flight.
    wave_size: usize,

    /// Resolution passed to `init()`.
    resolution: Option<(u32, u32)>,
}

impl WavefrontRenderer {
    /// Create a new `WavefrontRenderer`.
    ///
    /// * `scene`     - The scene.
    /// * `threads`   - Number of worker threads; 0 selects one per CPU.
    /// * `wave_size` - Maximum number of paths in flight; must be positive.
    pub fn new(scene: Arc<Scene>, threads: usize, wave_size: usize) -> Result<Self, RenderError> {
        if wave_size == 0 {
            return Err(RenderError::Backend("wave size must be positive".to_string()));
        }
        register_integrator_stats();
        register_stats();
        Ok(Self {
            scene,
            threads: worker_count(threads),
            wave_size,
            resolution: None,
        })
    }
}

impl Renderer for WavefrontRenderer {
    fn name(&self) -> &'static str {
        "wavefront"
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
        let n_pixels = resolution.0 as usize * resolution.1 as usize;
        let threads = self.threads;
        let wave_size = self.wave_size;
        let ctx = WaveContext {
            integrator: PathIntegrator::from(options),
            scene: &self.scene,
            camera,
            options,
            resolution,
        };

        info!(
            "Rendering {}x{} samples {}..{} in waves of {} paths on {} threads",
            resolution.0,
            resolution.1,
            first_sample,
            first_sample + spp,
            wave_size,
            threads
        );

        let result = crossbeam::scope(|scope| -> Result<(), RenderError> {
            let ctx = &ctx;
            let mut workers = Vec::with_capacity(threads);
            for _ in 0..threads {
                let (stage_tx, stage_rx) = crossbeam_channel::bounded::<Stage>(1);
                let (result_tx, result_rx) = crossbeam_channel::bounded::<StageResult>(1);
                scope.spawn(move |_| {
                    let mut paths = vec![];
                    for stage in stage_rx.iter() {
                        let result = ctx.run(stage, &mut paths);
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    report_stats!();
                });
                workers.push(WorkerHandle {
                    stages: stage_tx,
                    results: result_rx,
                });
            }

            let pixels = film.pixels_mut();
            let mut start = 0;
            while start < n_pixels {
                let end = min(start + wave_size, n_pixels);
                for sample_index in first_sample..first_sample + spp {
                    stat_inc!(WAVES, 1);
                    let shares = split_range(start..end, workers.len());
                    let mut active = run_stage(&workers, |w| Stage::Generate(shares[w].clone(), sample_index))?
                        .iter()
                        .map(|r| r.active)
                        .sum::<usize>();

                    while active > 0 {
                        stat_inc!(EXTENSIONS, active as i64);
                        run_stage(&workers, |_| Stage::Intersect)?;
                        active = run_stage(&workers, |_| Stage::Shade)?
                            .iter()
                            .map(|r| r.active)
                            .sum();
                    }

                    // Accumulation stage. Each pixel belongs to one worker
                    // so samples land in sample index order.
                    for result in run_stage(&workers, |_| Stage::Collect)? {
                        for (pixel, l, weight) in result.samples {
                            pixels[pixel].add(l, weight);
                        }
                    }
                }
                start = end;
            }
            Ok(())
        });

        result.map_err(|_| RenderError::Backend("a wavefront worker panicked".to_string()))??;
        report_stats!();
        film.add_samples(spp);
        Ok(())
    }
}

/// Sends a stage to every worker and waits for all of them to finish it.
/// Returns the results in worker order.
///
/// * `workers` - The workers.
/// * `stage`   - Returns the stage for a worker index.
fn run_stage<F>(workers: &[WorkerHandle], stage: F) -> Result<Vec<StageResult>, RenderError>
where
    F: Fn(usize) -> Stage,
{
    let lost = || RenderError::Backend("a wavefront worker exited early".to_string());
    for (w, worker) in workers.iter().enumerate() {
        worker.stages.send(stage(w)).map_err(|_| lost())?;
    }
    workers
        .iter()
        .map(|worker| worker.results.recv().map_err(|_| lost()))
        .collect()
}

/// Splits a range into `n` contiguous parts whose lengths differ by at most
/// one.
///
/// * `range` - The range.
/// * `n`     - Number of parts.
fn split_range(range: Range<usize>, n: usize) -> Vec<Range<usize>> {
    let n = n.max(1);
    let len = range.end.saturating_sub(range.start);
    (0..n)
        .map(|i| range.start + i * len / n..range.start + (i + 1) * len / n)
        .collect()
}

/// Everything a worker needs to run the stages of a batch.
struct WaveContext<'a> {
    integrator: PathIntegrator,
    scene: &'a Scene,
    camera: &'a Camera,
    options: &'a Options,
    resolution: (u32, u32),
}

impl<'a> WaveContext<'a> {
    /// Runs a stage over a worker's paths.
    ///
    /// * `stage` - The stage.
    /// * `paths` - The worker's share of the wave.
    fn run(&self, stage: Stage, paths: &mut Vec<WavefrontPath>) -> StageResult {
        match stage {
            Stage::Generate(pixels, sample_index) => self.generate(pixels, sample_index, paths),
            Stage::Intersect => {
                for path in paths.iter_mut().filter(|p| p.state.active) {
                    path.hit = self.scene.intersect(&path.state.ray);
                }
            }
            Stage::Shade => {
                for path in paths.iter_mut().filter(|p| p.state.active) {
                    let hit = path.hit.take();
                    self.integrator.shade(self.scene, &mut path.state, hit.as_ref());
                }
            }
            Stage::Collect => {
                return StageResult {
                    active: 0,
                    samples: paths
                        .iter()
                        .map(|p| (p.pixel, sanitize_radiance(p.state.l, self.options.clamp), p.weight))
                        .collect(),
                };
            }
        }
        StageResult {
            active: paths.iter().filter(|p| p.state.active).count(),
            samples: vec![],
        }
    }

    /// Starts one path per pixel for a sample index. Paths in the debug
    /// modes are resolved immediately.
    ///
    /// * `pixels`       - Row-major pixel indices.
    /// * `sample_index` - The sample index.
    /// * `paths`        - Receives the paths.
    fn generate(&self, pixels: Range<usize>, sample_index: u64, paths: &mut Vec<WavefrontPath>) {
        let width = self.resolution.0 as usize;
        let first = pixels.start;

        paths.clear();
        paths.extend(pixels.map(|pixel| {
            let p = ((pixel % width) as u32, (pixel / width) as u32);
            let (ray, weight, sampler) = start_sample(self.camera, self.options, self.resolution, p, sample_index);
            let mut state = PathState::new(ray, sampler);
            if self.options.mode != RenderMode::PathTrace {
                state.l = visualize(self.scene, self.options.mode, &ray);
                state.active = false;
            }
            WavefrontPath {
                pixel,
                weight,
                state,
                hit: None,
            }
        }));
        debug!("Generated {} paths from pixel {}", paths.len(), first);
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use crate::test_scenes::*;
    use super::*;

    fn render(renderer: &mut dyn Renderer, scene: &Scene, options: &Options) -> Film {
        renderer.init(options.width, options.height).expect("init");
        let mut film = Film::new(options.width, options.height);
        renderer.render(&scene.camera, options, &mut film).expect("render");
        film
    }

    #[test]
    fn matches_tile_renderer() {
        let scene = Arc::new(closed_box());
        for mode in [RenderMode::PathTrace, RenderMode::Normals, RenderMode::Complexity] {
            let options = Options {
                width: 11,
                height: 7,
                samples_per_batch: 3,
                mode,
                ..Options::default()
            };

            let mut cpu = TileRenderer::new(Arc::clone(&scene), 2, 3).expect("cpu");
            let mut wavefront = WavefrontRenderer::new(Arc::clone(&scene), 3, 16).expect("wavefront");
            let a = render(&mut cpu, &scene, &options);
            let b = render(&mut wavefront, &scene, &options);

            assert_eq!(a.samples(), b.samples());
            assert_eq!(a.pixels(), b.pixels(), "mode {:?}", mode);
        }
    }

    #[test]
    fn more_workers_than_pixels() {
        let scene = Arc::new(closed_box());
        let options = Options {
            width: 2,
            height: 1,
            samples_per_batch: 2,
            ..Options::default()
        };
        let mut cpu = TileRenderer::new(Arc::clone(&scene), 1, 1).expect("cpu");
        let mut wavefront = WavefrontRenderer::new(Arc::clone(&scene), 4, 1).expect("wavefront");
        let a = render(&mut cpu, &scene, &options);
        let b = render(&mut wavefront, &scene, &options);
        assert_eq!(a.pixels(), b.pixels());
    }

    #[test]
    fn render_requires_init() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = WavefrontRenderer::new(Arc::clone(&scene), 1, DEFAULT_WAVE_SIZE).expect("wavefront");
        let mut film = Film::new(4, 4);
        assert_eq!(
            renderer.render(&scene.camera, &Options::default(), &mut film),
            Err(RenderError::NotInitialized)
        );
    }

    #[test]
    fn zero_wave_size_is_rejected() {
        let scene = Arc::new(light_over_floor());
        assert!(matches!(
            WavefrontRenderer::new(scene, 1, 0),
            Err(RenderError::Backend(_))
        ));
    }

    #[test]
    fn degenerate_filter_is_rejected() {
        let scene = Arc::new(light_over_floor());
        let mut renderer = WavefrontRenderer::new(Arc::clone(&scene), 2, 8).expect("wavefront");
        renderer.init(4, 4).expect("init");
        let options = Options {
            width: 4,
            height: 4,
            filter: tinsel_core::filter::Filter::Gaussian {
                radius: Float::NAN,
                falloff: 1.0,
            },
            ..Options::default()
        };
        let mut film = Film::new(4, 4);
        assert!(matches!(
            renderer.render(&scene.camera, &options, &mut film),
            Err(RenderError::Backend(_))
        ));
        assert_eq!(film.samples(), 0);
    }

    #[test]
    fn split_range_covers_every_index_once() {
        for (range, n) in [(0..101, 4), (5..7, 4), (3..3, 2), (0..9, 1)] {
            let parts = split_range(range.clone(), n);
            assert_eq!(parts.len(), n);
            assert_eq!(parts[0].start, range.start);
            assert_eq!(parts[n - 1].end, range.end);
            for pair in parts.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
                assert!(pair[0].len().abs_diff(pair[1].len()) <= 1);
            }
        }
    }
}
