//! Errors

use thiserror::Error;

/// Errors raised while building a scene or its acceleration structure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// The scene has no primitives.
    #[error("scene contains no primitives")]
    EmptyScene,

    /// A primitive has non-finite vertices or zero area and degenerate
    /// primitives are not being dropped.
    #[error("primitive {index} is degenerate")]
    DegeneratePrimitive { index: usize },

    /// Every primitive was degenerate.
    #[error("no valid primitives remain after dropping {dropped} degenerate ones")]
    NoValidPrimitives { dropped: usize },

    /// A primitive references a material that does not exist.
    #[error("primitive {primitive} references missing material {material}")]
    InvalidMaterial { primitive: usize, material: u32 },
}

/// Errors raised by renderers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer could not be created or failed while rendering.
    #[error("render backend failure: {0}")]
    Backend(String),

    /// `render` was called before `init`.
    #[error("renderer is not initialized")]
    NotInitialized,

    /// The accumulation buffer does not match the initialized resolution.
    #[error("film is {actual:?} but renderer was initialized for {expected:?}")]
    SizeMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// The scene could not be built.
    #[error(transparent)]
    Build(#[from] BuildError),
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            BuildError::DegeneratePrimitive { index: 3 }.to_string(),
            "primitive 3 is degenerate"
        );
        let err: RenderError = BuildError::EmptyScene.into();
        assert_eq!(err.to_string(), "scene contains no primitives");
    }
}
