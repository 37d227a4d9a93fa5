//! Integrators

#[macro_use]
extern crate log;

mod backend;
mod common;
mod cpu;
mod path;
mod session;
mod wavefront;

#[cfg(test)]
mod test_scenes;

// Re-export.
pub use backend::*;
pub use common::*;
pub use cpu::*;
pub use path::*;
pub use session::*;
pub use wavefront::*;
