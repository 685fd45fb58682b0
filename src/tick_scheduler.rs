//! Adaptive tick scheduling
//!
//! The flame re-times itself: every tick ends by loading the complement of
//! `length` into an 8-bit count-up timer, so the next overflow (and the next
//! tick) comes `256 - !length` timer counts later.
//!
//! The same scheduler serves the interrupt handler on hardware and synthetic
//! time on the host. Deadlines are accumulated from the previous deadline,
//! matching a timer that is re-armed right after it overflows.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::flicker::{FlickerConfig, FlickerState, TickReport};
use crate::lfsr::InvalidSeed;
use crate::output::publish;
use crate::{CountUpTimer, PwmOutput};

/// Backlog after which the host scheduler drops missed ticks instead of
/// replaying them.
pub const MAX_DRIFT: Duration = Duration::from_millis(500);

/// Count-up timer clocking
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerConfig {
    /// Timer input clock before the prescaler
    pub input_clock_hz: u32,
    /// Prescaler ratio
    pub prescaler: u16,
}

impl TimerConfig {
    /// 8 MHz core, timer on Fosc/4 with a 1:256 prescaler (128 µs per count)
    pub const DEFAULT: Self = Self {
        input_clock_hz: 2_000_000,
        prescaler: 256,
    };

    /// Duration of `counts` timer counts
    pub fn counts_duration(&self, counts: u16) -> Duration {
        let micros = (u64::from(counts) * u64::from(self.prescaler) * 1_000_000)
            .checked_div(u64::from(self.input_clock_hz))
            .unwrap_or(0);
        Duration::from_micros(micros)
    }

    /// Time between two ticks for a given `length`
    pub fn period(&self, length: u8) -> Duration {
        self.counts_duration(counts_until_overflow(reload_value(length)))
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Value written into the timer register for a tick length
#[inline]
pub const fn reload_value(length: u8) -> u8 {
    !length
}

/// Timer counts from `reload` until the register wraps
#[inline]
pub const fn counts_until_overflow(reload: u8) -> u16 {
    256 - reload as u16
}

/// Result of a tick
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// What the flame did
    pub report: TickReport,
    /// Value loaded into the timer
    pub reload: u8,
    /// Time until the next tick
    pub period: Duration,
    /// When the next tick is due
    pub next_deadline: Instant,
}

/// Self-rescheduling flicker task
///
/// Owns the flame state, the PWM stage and the tick timer. On hardware, call
/// [`TickScheduler::on_overflow`] from the timer interrupt. On the host, call
/// [`TickScheduler::catch_up`] with the current synthetic time.
pub struct TickScheduler<O: PwmOutput, T: CountUpTimer> {
    output: O,
    timer: T,
    timer_config: TimerConfig,
    initial: FlickerState,
    state: FlickerState,
    next_tick: Instant,
}

impl<O: PwmOutput, T: CountUpTimer> TickScheduler<O, T> {
    /// Create the scheduler and arm the first tick
    pub fn new(
        config: &FlickerConfig,
        timer_config: TimerConfig,
        output: O,
        timer: T,
    ) -> Result<Self, InvalidSeed> {
        let initial = FlickerState::new(config)?;
        let mut scheduler = Self {
            output,
            timer,
            timer_config,
            state: initial.clone(),
            initial,
            next_tick: Instant::from_millis(0),
        };
        scheduler.arm(Instant::from_millis(0));
        Ok(scheduler)
    }

    /// Service one timer overflow
    ///
    /// Steps the flame, publishes both channels, reloads the timer with the
    /// new length and clears the overflow flag.
    pub fn on_overflow(&mut self) -> TickResult {
        let report = self.state.tick();
        publish(&mut self.output, report.levels);

        let reload = reload_value(report.length);
        self.timer.load(reload);
        self.timer.clear_overflow();

        let period = self.timer_config.period(report.length);
        self.next_tick += period;

        TickResult {
            report,
            reload,
            period,
            next_deadline: self.next_tick,
        }
    }

    /// Fire every tick that is due at `now`
    ///
    /// `on_tick` sees each tick with the deadline it fired at. Returns the
    /// last tick fired, if any. A backlog longer than [`MAX_DRIFT`] is
    /// dropped and the schedule restarts from `now`.
    pub fn catch_up(
        &mut self,
        now: Instant,
        mut on_tick: impl FnMut(Instant, &TickResult),
    ) -> Option<TickResult> {
        if now > self.next_tick + MAX_DRIFT {
            self.next_tick = now;
        }

        let mut last = None;
        while self.next_tick <= now {
            let at = self.next_tick;
            let result = self.on_overflow();
            on_tick(at, &result);
            last = Some(result);
            if result.period.as_ticks() == 0 {
                // Degenerate clocking, the schedule cannot advance
                break;
            }
        }
        last
    }

    /// Re-arm the timer for the current length, counting from `now`
    ///
    /// Used after a low-power wait, when the timer was stopped.
    pub fn arm(&mut self, now: Instant) {
        let length = self.state.length();
        self.timer.load(reload_value(length));
        self.timer.clear_overflow();
        self.next_tick = now + self.timer_config.period(length);
    }

    /// Throw away the flame state and start over, as after a watchdog reset
    pub fn restart(&mut self, now: Instant) {
        self.state = self.initial.clone();
        publish(&mut self.output, self.state.levels());
        self.arm(now);
        #[cfg(feature = "esp32-log")]
        println!("[tick] restarted");
    }

    pub const fn state(&self) -> &FlickerState {
        &self.state
    }

    pub const fn output(&self) -> &O {
        &self.output
    }

    pub const fn timer(&self) -> &T {
        &self.timer
    }

    pub const fn timer_config(&self) -> TimerConfig {
        self.timer_config
    }

    /// When the next tick is due
    pub const fn next_deadline(&self) -> Instant {
        self.next_tick
    }
}
