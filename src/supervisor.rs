//! Ambient light supervisor
//!
//! Foreground loop of the candle. Each iteration samples the light sensor;
//! in daylight the output stage goes high-impedance and the device waits in
//! low power, in the dark the outputs are driven. The watchdog is fed once
//! per iteration whatever the branch.
//!
//! The supervisor never touches the flame state. It only owns the
//! output-enable lines, so the flicker task keeps running undisturbed (or
//! stays frozen while the core sleeps).

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::Watchdog;

/// Ambient light input
pub trait LightSensor {
    /// Take one ambient sample; higher is brighter
    fn sample(&mut self) -> u8;
}

/// Output stage enable lines
pub trait OutputGate {
    /// Drive the PWM pins, or release them to high impedance
    fn set_enabled(&mut self, enabled: bool);
}

/// Low-power wait
pub trait LowPower {
    /// Block in low power until a wake condition
    ///
    /// On the original board the wake source is the watchdog time-out,
    /// which wakes a sleeping core instead of resetting it.
    fn wait_for_wake(&mut self);
}

/// Supervisor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SupervisorConfig {
    /// Samples strictly above this are daylight
    pub threshold: u8,
}

impl SupervisorConfig {
    pub const DEFAULT: Self = Self { threshold: 0xB0 };
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Outcome of one supervisor iteration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Dark enough, outputs driven
    Lit,
    /// Too bright, outputs released and the device slept
    Slept,
}

/// Ambient gate for the flame outputs
pub struct AmbientSupervisor<S, G, P, W> {
    sensor: S,
    gate: G,
    power: P,
    watchdog: W,
    config: SupervisorConfig,
    last: Option<Decision>,
    last_sample: u8,
}

impl<S, G, P, W> AmbientSupervisor<S, G, P, W>
where
    S: LightSensor,
    G: OutputGate,
    P: LowPower,
    W: Watchdog,
{
    pub const fn new(config: SupervisorConfig, sensor: S, gate: G, power: P, watchdog: W) -> Self {
        Self {
            sensor,
            gate,
            power,
            watchdog,
            config,
            last: None,
            last_sample: 0,
        }
    }

    /// Run one iteration of the ambient loop
    pub fn step(&mut self) -> Decision {
        let sample = self.sensor.sample();
        self.last_sample = sample;

        let decision = if sample > self.config.threshold {
            self.gate.set_enabled(false);
            self.log_transition(Decision::Slept, sample);
            self.power.wait_for_wake();
            Decision::Slept
        } else {
            self.gate.set_enabled(true);
            self.log_transition(Decision::Lit, sample);
            Decision::Lit
        };

        self.watchdog.feed();
        self.last = Some(decision);
        decision
    }

    /// Supervise forever
    pub fn run(&mut self) -> ! {
        loop {
            self.step();
        }
    }

    #[cfg_attr(not(feature = "esp32-log"), allow(unused_variables))]
    fn log_transition(&self, decision: Decision, sample: u8) {
        if self.last != Some(decision) {
            #[cfg(feature = "esp32-log")]
            println!(
                "[ambient] sample {} threshold {}: {:?}",
                sample, self.config.threshold, decision
            );
        }
    }

    /// Decision of the latest iteration
    pub const fn last_decision(&self) -> Option<Decision> {
        self.last
    }

    /// Sample read by the latest iteration
    pub const fn last_sample(&self) -> u8 {
        self.last_sample
    }

    pub const fn config(&self) -> SupervisorConfig {
        self.config
    }

    pub fn set_threshold(&mut self, threshold: u8) {
        self.config.threshold = threshold;
    }

    pub const fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    pub const fn gate(&self) -> &G {
        &self.gate
    }

    pub const fn power(&self) -> &P {
        &self.power
    }

    pub const fn watchdog(&self) -> &W {
        &self.watchdog
    }

    pub const fn watchdog_mut(&mut self) -> &mut W {
        &mut self.watchdog
    }
}
