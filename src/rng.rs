// The 48-bit linear congruential generator behind java.util.Random.
//
// Multi-step advance is based on https://github.com/rust-random/rand/blob/master/rand_pcg/src/pcg64.rs,
// which is
//
// Copyright 2018 Developers of the Rand project.
// Copyright 2017 Paul Dicker.
// Copyright 2014-2017 Melissa O'Neill and PCG Project contributors
//
// and licensed under the MIT license.

use core::fmt;
use rand_core::{impls, Error, RngCore, SeedableRng};

pub const MULTIPLIER: u64 = 0x5DEECE66D;
pub const ADDEND: u64 = 0xB;
pub const MASK: u64 = (1 << 48) - 1;
/// Number of steps before the generator repeats itself.
pub const PERIOD: u64 = 1 << 48;

/// One-time initialization applied to a user supplied seed.
#[inline]
pub const fn scramble(seed: u64) -> u64 {
    (seed ^ MULTIPLIER) & MASK
}

/// Recovers the (48-bit) seed that `scramble`s to `state`.
#[inline]
pub const fn unscramble(state: u64) -> u64 {
    (state ^ MULTIPLIER) & MASK
}

/// The transition function. The multiply may overflow the 64-bit container;
/// only the low 48 bits survive the mask, so wrapping is exact.
#[inline]
pub const fn advance(state: u64) -> u64 {
    state.wrapping_mul(MULTIPLIER).wrapping_add(ADDEND) & MASK
}

/// Affine coefficients `(mult, plus)` such that `(state * mult + plus) & MASK`
/// equals `delta` calls to [`advance`].
///
/// The method used here is based on Brown, "Random Number Generation
/// with Arbitrary Stride,", Transactions of the American Nuclear
/// Society (Nov. 1994).  The algorithm is very similar to fast
/// exponentiation.
///
/// `delta` is taken modulo [`PERIOD`], so `PERIOD - k` steps backwards by
/// `k`, it just goes "the long way round".
pub fn jump_coefficients(delta: u64) -> (u64, u64) {
    let mut acc_mult: u64 = 1;
    let mut acc_plus: u64 = 0;
    let mut cur_mult = MULTIPLIER;
    let mut cur_plus = ADDEND;
    let mut mdelta = delta & MASK;

    while mdelta > 0 {
        if (mdelta & 1) != 0 {
            acc_mult = acc_mult.wrapping_mul(cur_mult);
            acc_plus = acc_plus.wrapping_mul(cur_mult).wrapping_add(cur_plus);
        }
        cur_plus = cur_mult.wrapping_add(1).wrapping_mul(cur_plus);
        cur_mult = cur_mult.wrapping_mul(cur_mult);
        mdelta /= 2;
    }
    (acc_mult & MASK, acc_plus & MASK)
}

/// A `java.util.Random` compatible generator.
///
/// `next_u32` is Java's `next(32)`: the state is advanced first and the
/// top 32 of its 48 bits are returned.
#[derive(Clone, PartialEq, Eq)]
pub struct JavaRandom {
    state: u64
}

impl JavaRandom {
    pub fn new(seed: u64) -> Self {
        JavaRandom {
            state: scramble(seed)
        }
    }

    pub fn set_seed(&mut self, seed: u64) {
        self.state = scramble(seed);
    }

    pub fn state(&self) -> u64 {
        self.state
    }

    /// Equivalent to calling `next_bits` `delta` times and discarding the output.
    #[inline]
    pub fn jump(&mut self, delta: u64) {
        let (mult, plus) = jump_coefficients(delta);
        self.state = self.state.wrapping_mul(mult).wrapping_add(plus) & MASK;
    }

    /// Java's `next(bits)`, for `bits` in `1..=32`.
    #[inline]
    pub fn next_bits(&mut self, bits: u32) -> u32 {
        debug_assert!((1..=32).contains(&bits));
        self.state = advance(self.state);
        (self.state >> (48 - bits)) as u32
    }

    #[inline]
    pub fn next_int(&mut self) -> i32 {
        self.next_bits(32) as i32
    }
}

// Custom Debug implementation that does not expose the internal state
impl fmt::Debug for JavaRandom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "JavaRandom {{}}")
    }
}

impl RngCore for JavaRandom {
    #[inline]
    fn next_u32(&mut self) -> u32 {
        self.next_bits(32)
    }

    #[inline]
    fn next_u64(&mut self) -> u64 {
        impls::next_u64_via_u32(self)
    }

    #[inline]
    fn fill_bytes(&mut self, dest: &mut [u8]) {
        impls::fill_bytes_via_next(self, dest)
    }

    #[inline]
    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for JavaRandom {
    type Seed = [u8; 8];

    fn from_seed(seed: Self::Seed) -> Self {
        JavaRandom::new(u64::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        JavaRandom::new(state)
    }
}
