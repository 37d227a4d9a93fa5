//! Random Number Generator.

use crate::pbrt::*;

/// 32-bit precision value for 1 - epsilon.
pub const FLOAT_ONE_MINUS_EPSILON: f32 = hexf32!("0x1.fffffep-1"); // 0.99999994

/// 1 - epsilon in the precision we've selected for `Float`.
pub const ONE_MINUS_EPSILON: Float = FLOAT_ONE_MINUS_EPSILON;

const PCG32_DEFAULT_STATE: u64 = 0x853c49e6748fea9b;
const PCG32_DEFAULT_STREAM: u64 = 0xda3e39cb94b95bdb;
const PCG32_MULT: u64 = 0x5851f42d4c957f2d;

/// Implements the PCG32 pseudo-random number generator.
#[derive(Copy, Clone, Debug)]
pub struct RNG {
    state: u64,
    inc: u64,
}

impl Default for RNG {
    /// Return a new instance of `RNG` with default state and stream.
    fn default() -> Self {
        Self {
            state: PCG32_DEFAULT_STATE,
            inc: PCG32_DEFAULT_STREAM,
        }
    }
}

impl RNG {
    /// Create a new `RNG` by seeding it with the given starting sequence.
    ///
    /// * `sequence_index` - The starting sequence to seed with.
    pub fn new(sequence_index: u64) -> Self {
        Self::with_state(PCG32_DEFAULT_STATE, sequence_index)
    }

    /// Create a new `RNG` with both the initial state and the stream chosen
    /// by the caller. Different streams never overlap.
    ///
    /// * `init_state` - Initial state.
    /// * `init_seq`   - Stream selector.
    pub fn with_state(init_state: u64, init_seq: u64) -> Self {
        let mut ret = Self {
            state: 0,
            inc: init_seq.wrapping_shl(1) | 1,
        };
        let _ = ret.uniform_u32();
        ret.state = ret.state.wrapping_add(init_state);
        let _ = ret.uniform_u32();
        ret
    }

    /// Returns a uniformly distributed u32 value.
    #[inline(always)]
    pub fn uniform_u32(&mut self) -> u32 {
        let old_state = self.state;
        self.state = old_state.wrapping_mul(PCG32_MULT).wrapping_add(self.inc);

        let xor_shifted = (((old_state >> 18) ^ old_state) >> 27) as u32;
        let rot = (old_state >> 59) as u32;
        xor_shifted.rotate_right(rot)
    }

    /// Returns a uniformly distributed value in `[0, bound)`.
    ///
    /// * `bound` - Exclusive upper bound; must be positive.
    pub fn bounded_uniform_u32(&mut self, bound: u32) -> u32 {
        let threshold = bound.wrapping_neg() % bound;
        loop {
            let r = self.uniform_u32();
            if r >= threshold {
                return r % bound;
            }
        }
    }

    /// Returns a uniformly distributed value over the half open interval [0.0, 1.0).
    #[inline(always)]
    pub fn uniform_float(&mut self) -> Float {
        min(
            self.uniform_u32() as Float * hexf32!("0x1.0p-32") as Float,
            ONE_MINUS_EPSILON,
        )
    }
}

/// Scrambles the bits of a 64-bit value so that nearby inputs produce
/// unrelated outputs (the 64-bit finalizer of MurmurHash3).
///
/// * `v` - The value.
#[inline(always)]
pub fn mix_bits(mut v: u64) -> u64 {
    v ^= v >> 31;
    v = v.wrapping_mul(0x7fb5d329728ea185);
    v ^= v >> 27;
    v = v.wrapping_mul(0x81dadef4bc2dd44d);
    v ^= v >> 33;
    v
}

/// Hashes a list of keys into a single 64-bit value.
///
/// * `keys` - The keys.
pub fn hash_keys(keys: &[u64]) -> u64 {
    keys.iter()
        .fold(0x9e3779b97f4a7c15_u64, |h, &k| mix_bits(h ^ mix_bits(k.wrapping_add(h))))
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
