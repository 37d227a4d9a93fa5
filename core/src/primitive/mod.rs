//! Primitives

mod aggregate;
mod intersection;
mod triangle;

// Re-export
pub use aggregate::*;
pub use intersection::*;
pub use triangle::*;
