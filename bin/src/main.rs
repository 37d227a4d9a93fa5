//! tinsel: a progressive path tracer over built-in scenes.

#[macro_use]
extern crate log;

mod image_io;
mod scenes;

use accelerators::BVHOptions;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use integrators::{Backend, RenderSession, DEFAULT_WAVE_SIZE};
use std::sync::Arc;
use std::time::Instant;
use tinsel_core::app::{Args, BackendKind};
use tinsel_core::{clear_stats, print_stats, report_stats};

fn main() {
    // Initialize `env_logger`.
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = render(&args) {
        error!("{e}");
        std::process::exit(1);
    }
}

/// Returns the render backend selected on the command line.
///
/// * `args` - Command line arguments.
fn backend(args: &Args) -> Backend {
    match args.backend {
        BackendKind::Cpu => Backend::Cpu {
            threads: args.threads,
            tile_size: args.tile_size,
        },
        BackendKind::Wavefront => Backend::Wavefront {
            threads: args.threads,
            wave_size: DEFAULT_WAVE_SIZE,
        },
    }
}

fn render(args: &Args) -> Result<(), String> {
    clear_stats!();

    // Build the scene.
    let start = Instant::now();
    let description = scenes::load(args.scene)?;
    let scene = description.build(BVHOptions::default()).map_err(|e| e.to_string())?;
    info!("Built scene {:?} in {:.2?}", args.scene, start.elapsed());

    let options = args.options();
    let mut session = RenderSession::new(Arc::new(scene), options, backend(args)).map_err(|e| e.to_string())?;

    let progress = if args.quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(args.spp)
    };
    progress.set_style(
        ProgressStyle::with_template("[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} spp {eta_precise}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    // Render batches until the sample budget is reached.
    let start = Instant::now();
    while session.render_batch().map_err(|e| e.to_string())? {
        progress.set_position(session.samples());
        debug!("Batch complete at {} spp", session.samples());
    }
    progress.finish_and_clear();
    info!("Rendered {} spp in {:.2?}", session.samples(), start.elapsed());

    image_io::write_png(
        &args.outfile,
        &session.resolve(),
        options.width,
        options.height,
        options.exposure,
        options.limit,
    )?;

    report_stats!();
    if !args.quiet {
        print_stats!();
    }
    Ok(())
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_follows_flags() {
        let args = Args::parse_from(["tinsel"]);
        assert_eq!(
            backend(&args),
            Backend::Cpu {
                threads: 0,
                tile_size: 16
            }
        );

        let args = Args::parse_from(["tinsel", "--backend", "wavefront", "-t", "3"]);
        assert_eq!(
            backend(&args),
            Backend::Wavefront {
                threads: 3,
                wave_size: DEFAULT_WAVE_SIZE
            }
        );
    }
}
