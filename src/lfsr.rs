//! 16-bit Fibonacci LFSR
//!
//! Lightweight deterministic pseudo-random source. The feedback bit is
//! `bit1 ^ bit2` of the current register, the register shifts right and the
//! feedback is inserted at bit 15 (`x^15 + x^14 + 1` in right-shift order).
//!
//! Bit 0 of the seed falls off on the first step, after which the upper 15
//! bits walk a maximal-length sequence of 32767 states.

/// Seed the candle firmware has always started from
pub const DEFAULT_SEED: u16 = 0x5AD3;

/// Length of the sequence once the generator is on its cycle
pub const PERIOD: u16 = 0x7FFF;

/// Seed rejected because the register would lock at zero
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidSeed(pub u16);

/// Pseudo-random sequence generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lfsr16 {
    state: u16,
}

impl Lfsr16 {
    /// Generator seeded with [`DEFAULT_SEED`]
    pub const DEFAULT: Self = Self {
        state: DEFAULT_SEED,
    };

    /// Create a generator from a saved state or a fresh seed
    ///
    /// Seeds `0` and `1` are rejected: both collapse into the all-zero
    /// register, which the feedback can never leave.
    pub const fn new(seed: u16) -> Result<Self, InvalidSeed> {
        if seed <= 1 {
            return Err(InvalidSeed(seed));
        }
        Ok(Self { state: seed })
    }

    /// Current register value
    ///
    /// Feeding it back into [`Lfsr16::new`] restarts the stream from here.
    pub const fn state(self) -> u16 {
        self.state
    }

    /// Advance the register and return the new value
    #[allow(clippy::should_implement_trait)]
    pub const fn next(&mut self) -> u16 {
        let feedback = ((self.state >> 1) ^ (self.state >> 2)) & 1;
        self.state = (self.state >> 1) | (feedback << 15);
        self.state
    }
}

impl Default for Lfsr16 {
    fn default() -> Self {
        Self::DEFAULT
    }
}
