//! Output mapping
//!
//! The two flame channels go to the PWM stage untouched. There is no gamma
//! or clamping step: the 8-bit duty range is the channel range.

use crate::PwmOutput;

/// Duty levels of both flame channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChannelLevels {
    /// Primary (intensity) channel
    pub left: u8,
    /// Secondary (mirrored or opposite) channel
    pub right: u8,
}

impl ChannelLevels {
    pub const fn new(left: u8, right: u8) -> Self {
        Self { left, right }
    }

    /// True when both channels carry the same level
    pub const fn is_mirrored(self) -> bool {
        self.left == self.right
    }

    /// True when the secondary channel is the complement of the primary
    pub const fn is_opposed(self) -> bool {
        self.right == !self.left
    }
}

/// Write both levels to the output stage
#[inline]
pub fn publish<O: PwmOutput>(output: &mut O, levels: ChannelLevels) {
    output.set_levels(levels);
}
