//! Flicker state machine
//!
//! Picks pseudo-random brightness targets and walks the primary channel one
//! step per tick toward them. The time between ticks (`length`) is what makes
//! the flame look organic: the step size never changes, only the pace.
//!
//! A nested burst machine models gusts. While a burst is running both channels
//! move together and the targets alternate between a low and a high level at
//! a fast pace, then the flame recovers to mid brightness.

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::lfsr::{InvalidSeed, Lfsr16};
use crate::output::ChannelLevels;

/// Mid brightness the flame returns to after a burst
pub const RECOVERY_TARGET: u8 = 128;

/// Low level visited on odd burst steps
pub const BURST_LOW_TARGET: u8 = 96;

/// Tick length used while a burst is running
pub const BURST_LENGTH: u8 = 5;

/// Draws below this value may start a burst (16 chances in 256)
const BURST_DRAW_LIMIT: u8 = 16;

/// Longest burst the draw can produce
pub const MAX_BURST_COUNT: u8 = 31;

/// Normal target reaches required before another burst is allowed
const QUIET_THRESHOLD: u8 = 8;

// Tuning masks, kept as found on the original candle.
const BURST_COUNT_MASK: u16 = 0x1F00;
const BURST_COUNT_FLOOR: u8 = 0x08;
const LENGTH_MASK: u16 = 0x7F00;
const LENGTH_FLOOR: u8 = 0x20;

/// Initial values of the flicker state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlickerConfig {
    /// LFSR seed
    pub seed: u16,
    /// First target for the primary channel
    pub target: u8,
    /// First tick length
    pub length: u8,
    /// Bursts pending at start-up
    ///
    /// The default of 2 makes the candle light up through a recovery to mid
    /// brightness before the first random target.
    pub burst_count: u8,
}

impl FlickerConfig {
    pub const DEFAULT: Self = Self {
        seed: crate::lfsr::DEFAULT_SEED,
        target: 127,
        length: 127,
        burst_count: 2,
    };

    /// Check that the configuration produces a live generator
    pub const fn validate(&self) -> Result<(), InvalidSeed> {
        match Lfsr16::new(self.seed) {
            Ok(_) => Ok(()),
            Err(err) => Err(err),
        }
    }
}

impl Default for FlickerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Which machine drives the next target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Normal,
    /// Burst with `n` target reaches left
    Burst(u8),
}

/// What happened to the target on a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// Still walking toward the current target
    None,
    /// A new random target was drawn
    Retargeted,
    /// A burst was triggered with `count` steps
    BurstStarted { count: u8 },
    /// A burst step picked an alternating target
    BurstStep { remaining: u8 },
    /// A burst is winding down toward mid brightness
    Recovery { remaining: u8 },
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    /// Levels to publish
    pub levels: ChannelLevels,
    /// Target after this tick
    pub target: u8,
    /// Length of the next tick period
    pub length: u8,
    /// Burst counter after this tick
    pub burst_count: u8,
    pub event: TickEvent,
}

/// Flame state, owned by the periodic task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlickerState {
    rng: Lfsr16,
    left: u8,
    right: u8,
    target: u8,
    length: u8,
    burst_count: u8,
    quiet_ticks: u8,
    recovering: bool,
}

impl FlickerState {
    /// Create the state from a configuration
    pub const fn new(config: &FlickerConfig) -> Result<Self, InvalidSeed> {
        let rng = match Lfsr16::new(config.seed) {
            Ok(rng) => rng,
            Err(err) => return Err(err),
        };
        Ok(Self {
            rng,
            left: 0,
            right: 0,
            target: config.target,
            length: config.length,
            burst_count: clamp_burst(config.burst_count),
            quiet_ticks: 0,
            recovering: false,
        })
    }

    /// Put everything back to the initial values
    pub const fn reset(&mut self, config: &FlickerConfig) -> Result<(), InvalidSeed> {
        match Self::new(config) {
            Ok(state) => {
                *self = state;
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Advance the flame by one tick
    pub fn tick(&mut self) -> TickReport {
        let event = if self.left == self.target {
            self.retarget()
        } else {
            TickEvent::None
        };

        // One step toward the target. A fresh target equal to `left` steps
        // down; equality is only checked on the next tick.
        self.left = if self.left < self.target {
            self.left + 1
        } else {
            self.left.saturating_sub(1)
        };

        self.right = if self.burst_count > 0 && !self.recovering {
            self.left
        } else {
            !self.left
        };

        TickReport {
            levels: self.levels(),
            target: self.target,
            length: self.length,
            burst_count: self.burst_count,
            event,
        }
    }

    fn retarget(&mut self) -> TickEvent {
        if self.burst_count > 0 {
            self.burst_step()
        } else {
            self.draw_target()
        }
    }

    fn burst_step(&mut self) -> TickEvent {
        self.burst_count -= 1;
        self.recovering = false;
        let remaining = self.burst_count;

        if remaining < 2 {
            self.target = RECOVERY_TARGET;
            self.recovering = true;
            return TickEvent::Recovery { remaining };
        }

        if remaining % 2 == 1 {
            self.target = BURST_LOW_TARGET;
        } else {
            self.target = 224 - (32 - remaining) * 2;
            // Rough compensation for the intensity change between high steps
            self.length = self.length.saturating_add(1);
        }
        TickEvent::BurstStep { remaining }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn draw_target(&mut self) -> TickEvent {
        let r = self.rng.next();
        self.target = (r & 0x00FF) as u8;

        if self.target < BURST_DRAW_LIMIT && self.quiet_ticks > QUIET_THRESHOLD {
            self.burst_count = ((r & BURST_COUNT_MASK) >> 8) as u8 | BURST_COUNT_FLOOR;
            self.length = BURST_LENGTH;
            self.target = RECOVERY_TARGET;
            self.quiet_ticks = 0;
            self.recovering = true;
            #[cfg(feature = "esp32-log")]
            println!("[flicker] burst of {}", self.burst_count);
            return TickEvent::BurstStarted {
                count: self.burst_count,
            };
        }

        self.length = ((r & LENGTH_MASK) >> 8) as u8 | LENGTH_FLOOR;
        self.quiet_ticks = self.quiet_ticks.saturating_add(1);
        self.recovering = false;
        TickEvent::Retargeted
    }

    /// Current channel levels
    pub const fn levels(&self) -> ChannelLevels {
        ChannelLevels {
            left: self.left,
            right: self.right,
        }
    }

    pub const fn mode(&self) -> Mode {
        if self.burst_count > 0 {
            Mode::Burst(self.burst_count)
        } else {
            Mode::Normal
        }
    }

    pub const fn left(&self) -> u8 {
        self.left
    }

    pub const fn right(&self) -> u8 {
        self.right
    }

    pub const fn target(&self) -> u8 {
        self.target
    }

    pub const fn length(&self) -> u8 {
        self.length
    }

    pub const fn burst_count(&self) -> u8 {
        self.burst_count
    }

    pub const fn quiet_ticks(&self) -> u8 {
        self.quiet_ticks
    }

    pub const fn is_recovering(&self) -> bool {
        self.recovering
    }

    /// Generator as it stands, for restarting the stream elsewhere
    pub const fn rng(&self) -> Lfsr16 {
        self.rng
    }

    /// Rebuild a state from raw parts
    ///
    /// Meant for replaying a captured state; the seed rules of
    /// [`Lfsr16::new`] still apply to `rng`.
    pub const fn from_parts(
        rng: Lfsr16,
        left: u8,
        target: u8,
        length: u8,
        burst_count: u8,
        quiet_ticks: u8,
        recovering: bool,
    ) -> Self {
        Self {
            rng,
            left,
            right: !left,
            target,
            length,
            burst_count: clamp_burst(burst_count),
            quiet_ticks,
            recovering,
        }
    }
}

const fn clamp_burst(count: u8) -> u8 {
    if count > MAX_BURST_COUNT {
        MAX_BURST_COUNT
    } else {
        count
    }
}

impl Default for FlickerState {
    fn default() -> Self {
        Self {
            rng: Lfsr16::DEFAULT,
            left: 0,
            right: 0,
            target: FlickerConfig::DEFAULT.target,
            length: FlickerConfig::DEFAULT.length,
            burst_count: FlickerConfig::DEFAULT.burst_count,
            quiet_ticks: 0,
            recovering: false,
        }
    }
}
