#![no_std]

pub mod flicker;
pub mod history;
pub mod lfsr;
pub mod output;
pub mod shared;
pub mod supervisor;
pub mod tick_scheduler;
pub mod watchdog;

pub use flicker::{FlickerConfig, FlickerState, Mode, TickEvent, TickReport};
pub use history::{TickHistory, TickRecord};
pub use lfsr::{InvalidSeed, Lfsr16};
pub use output::ChannelLevels;
pub use shared::InterruptCell;
pub use supervisor::{
    AmbientSupervisor, Decision, LightSensor, LowPower, OutputGate, SupervisorConfig,
};
pub use tick_scheduler::{TickResult, TickScheduler, TimerConfig};
pub use watchdog::{SoftWatchdog, WatchdogConfig};

pub use embassy_time::{Duration, Instant};

/// Abstract two-channel PWM stage
///
/// Implement this trait to support different hardware platforms.
/// The tick scheduler is generic over this trait.
pub trait PwmOutput {
    /// Write both duty levels (0-255 each)
    fn set_levels(&mut self, levels: ChannelLevels);
}

/// 8-bit count-up timer that raises an overflow flag when it wraps
pub trait CountUpTimer {
    /// Load the counter register
    fn load(&mut self, value: u8);

    /// Acknowledge the pending overflow
    fn clear_overflow(&mut self);
}

/// Liveness watchdog
pub trait Watchdog {
    /// Refresh the watchdog before it times out
    fn feed(&mut self);
}
