//! Desktop preview app for candle-flicker
//!
//! Runs the flicker task, the ambient supervisor and the watchdog on synthetic
//! time and draws both flame channels with a short trace.

use std::time::Instant as StdInstant;

use candle_flicker::supervisor::{LightSensor, LowPower, OutputGate};
use candle_flicker::{
    AmbientSupervisor, ChannelLevels, CountUpTimer, Decision, Duration, FlickerConfig, Instant,
    Mode, PwmOutput, SoftWatchdog, SupervisorConfig, TickHistory, TickScheduler, TimerConfig,
    WatchdogConfig,
};
use eframe::egui::{self};

/// Number of ticks kept for the trace
const HISTORY_SIZE: usize = 512;

/// Pace of the supervisor loop while awake
const SUPERVISOR_PERIOD: Duration = Duration::from_millis(20);

/// Diameter of a flame disc in pixels
const FLAME_SIZE: f32 = 120.0;

/// Height of the trace plot in pixels
const TRACE_HEIGHT: f32 = 160.0;

/// PWM stage that remembers the last duty levels
#[derive(Default)]
struct PreviewPwm {
    levels: ChannelLevels,
}

impl PwmOutput for PreviewPwm {
    fn set_levels(&mut self, levels: ChannelLevels) {
        self.levels = levels;
    }
}

/// Timer register stand-in
#[derive(Default)]
struct PreviewTimer {
    reload: u8,
}

impl CountUpTimer for PreviewTimer {
    fn load(&mut self, value: u8) {
        self.reload = value;
    }

    fn clear_overflow(&mut self) {}
}

/// Light sensor driven by a UI slider
struct SliderSensor {
    value: u8,
}

impl LightSensor for SliderSensor {
    fn sample(&mut self) -> u8 {
        self.value
    }
}

/// Output enable lines
struct PreviewGate {
    enabled: bool,
}

impl OutputGate for PreviewGate {
    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

/// Low-power wait; the preview cannot block, it only counts sleeps
#[derive(Default)]
struct PreviewSleep {
    sleeps: u32,
}

impl LowPower for PreviewSleep {
    fn wait_for_wake(&mut self) {
        self.sleeps += 1;
    }
}

type Supervisor = AmbientSupervisor<SliderSensor, PreviewGate, PreviewSleep, SoftWatchdog>;

fn main() -> eframe::Result<()> {
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([720.0, 560.0])
            .with_title("Candle Flicker Preview"),
        ..Default::default()
    };

    eframe::run_native(
        "candle-flicker-preview",
        options,
        Box::new(|_cc| Ok(Box::new(PreviewApp::new()))),
    )
}

struct PreviewApp {
    /// The flicker task
    scheduler: TickScheduler<PreviewPwm, PreviewTimer>,
    /// Ambient gate
    supervisor: Supervisor,
    /// Recent ticks for the trace
    history: TickHistory<HISTORY_SIZE>,

    /// Synthetic time in microseconds
    t_us: u64,
    /// Wall-clock reference for delta time
    last_frame: StdInstant,
    /// Whether the simulation is running
    playing: bool,
    /// Time scale multiplier (1.0 = realtime)
    time_scale: f32,
    /// Next supervisor iteration
    next_supervision: Instant,
    /// True while the core sleeps and the flame is frozen
    asleep: bool,
    /// Simulated supervisor hang
    hung: bool,
    /// Watchdog restarts so far
    restarts: u32,
    /// Ambient sample fed to the sensor
    ambient: u8,
}

impl PreviewApp {
    fn new() -> Self {
        let scheduler = TickScheduler::new(
            &FlickerConfig::DEFAULT,
            TimerConfig::DEFAULT,
            PreviewPwm::default(),
            PreviewTimer::default(),
        )
        .expect("default seed is valid");

        let supervisor = AmbientSupervisor::new(
            SupervisorConfig::DEFAULT,
            SliderSensor { value: 0x40 },
            PreviewGate { enabled: false },
            PreviewSleep::default(),
            SoftWatchdog::new(WatchdogConfig::DEFAULT),
        );

        Self {
            scheduler,
            supervisor,
            history: TickHistory::new(),
            t_us: 0,
            last_frame: StdInstant::now(),
            playing: true,
            time_scale: 1.0,
            next_supervision: Instant::from_micros(0),
            asleep: false,
            hung: false,
            restarts: 0,
            ambient: 0x40,
        }
    }

    /// Power-on reset: everything back to the initial state
    fn reset(&mut self) {
        *self = Self::new();
    }

    /// Update synthetic time based on wall clock and time scale
    fn update_time(&mut self) {
        let now = StdInstant::now();
        let delta = now.duration_since(self.last_frame);
        self.last_frame = now;

        if self.playing {
            let delta_us_f64 = delta.as_secs_f64() * 1_000_000.0 * f64::from(self.time_scale);
            #[allow(clippy::cast_precision_loss)]
            let delta_us_f64 = if delta_us_f64.is_finite() {
                delta_us_f64.clamp(0.0, u64::MAX as f64)
            } else {
                0.0
            };
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let delta_us = delta_us_f64 as u64;
            self.t_us = self.t_us.wrapping_add(delta_us);
        }
    }

    /// Run everything that is due at the current synthetic time
    fn simulate(&mut self) {
        let now = Instant::from_micros(self.t_us);
        self.supervisor.sensor_mut().value = self.ambient;
        self.supervisor.watchdog_mut().set_now(now);

        if !self.hung && now >= self.next_supervision {
            let decision = self.supervisor.step();
            match decision {
                Decision::Lit => {
                    if self.asleep {
                        self.scheduler.arm(now);
                        self.asleep = false;
                    }
                    self.next_supervision = now + SUPERVISOR_PERIOD;
                }
                Decision::Slept => {
                    // The watchdog time-out is the wake source
                    self.asleep = true;
                    self.next_supervision = now + self.supervisor.watchdog().timeout();
                }
            }
        }

        if self.supervisor.watchdog_mut().poll() {
            self.restarts += 1;
            self.scheduler.restart(now);
            self.history.clear();
            self.asleep = false;
            self.next_supervision = now;
        }

        if self.asleep {
            return;
        }

        let history = &mut self.history;
        self.scheduler.catch_up(now, |at, result| history.record(at, result));
    }

    fn flame_color(level: u8, enabled: bool) -> egui::Color32 {
        if !enabled {
            return egui::Color32::from_gray(24);
        }
        let l = u16::from(level);
        #[allow(clippy::cast_possible_truncation)]
        let (g, b) = ((l * 150 / 255) as u8, (l * 40 / 255) as u8);
        egui::Color32::from_rgb(level, g, b)
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_time();
        self.simulate();

        // Request continuous repaint for animation
        ctx.request_repaint();

        let state = self.scheduler.state().clone();
        let levels = self.scheduler.output().levels;
        let enabled = self.supervisor.gate().enabled && !self.asleep;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                // <PlaybackControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        if ui.button("⏮ Reset").clicked() {
                            self.reset();
                        }
                        if ui
                            .button(if self.playing { "⏸ Pause" } else { "▶ Play" })
                            .clicked()
                        {
                            self.playing = !self.playing;
                        }
                    });

                    ui.add_space(4.0);

                    let secs = self.t_us / 1_000_000;
                    let ms = (self.t_us / 1_000) % 1000;
                    ui.label(format!("Time: {secs}.{ms:03}s"));

                    ui.add_space(4.0);

                    ui.horizontal(|ui| {
                        ui.label("Speed:");
                        ui.add(egui::Slider::new(&mut self.time_scale, 0.1..=10.0).logarithmic(true));
                    });
                });
                // </PlaybackControls>
                ui.add_space(16.0);
                // <EnvironmentControls>
                ui.vertical(|ui| {
                    ui.horizontal(|ui| {
                        ui.label("Ambient:");
                        ui.add(egui::Slider::new(&mut self.ambient, 0u8..=255u8));
                    });
                    ui.label(format!(
                        "Threshold: {:#04X} ({})",
                        self.supervisor.config().threshold,
                        if self.asleep { "asleep" } else { "lit" }
                    ));

                    ui.add_space(4.0);

                    ui.checkbox(&mut self.hung, "Hang supervisor");
                    ui.label(format!(
                        "Watchdog feeds: {}, restarts: {}, sleeps: {}",
                        self.supervisor.watchdog().feeds(),
                        self.restarts,
                        self.supervisor.power().sleeps
                    ));
                });
                // </EnvironmentControls>
            });

            ui.add_space(16.0);

            // === Flames ===
            ui.horizontal(|ui| {
                let (response, painter) = ui.allocate_painter(
                    egui::vec2(FLAME_SIZE * 2.0 + 48.0, FLAME_SIZE),
                    egui::Sense::hover(),
                );
                let origin = response.rect.min;
                let radius = FLAME_SIZE / 2.0;
                painter.circle_filled(
                    origin + egui::vec2(radius, radius),
                    radius,
                    Self::flame_color(levels.left, enabled),
                );
                painter.circle_filled(
                    origin + egui::vec2(FLAME_SIZE + 48.0 + radius, radius),
                    radius,
                    Self::flame_color(levels.right, enabled),
                );

                ui.add_space(16.0);

                ui.vertical(|ui| {
                    ui.label(format!("Left: {}  Right: {}", levels.left, levels.right));
                    ui.label(format!("Target: {}", state.target()));
                    let period = self.scheduler.timer_config().period(state.length());
                    ui.label(format!(
                        "Length: {} ({} µs, reload {:#04X})",
                        state.length(),
                        period.as_micros(),
                        self.scheduler.timer().reload
                    ));
                    ui.label(match state.mode() {
                        Mode::Normal => format!("Normal, quiet {}", state.quiet_ticks()),
                        Mode::Burst(n) if state.is_recovering() => format!("Burst {n}, recovering"),
                        Mode::Burst(n) => format!("Burst {n}"),
                    });
                    ui.label(format!("Bursts in trace: {}", self.history.bursts_started()));
                });
            });

            ui.add_space(16.0);

            // === Trace ===
            let width = ui.available_width();
            let (response, painter) =
                ui.allocate_painter(egui::vec2(width, TRACE_HEIGHT), egui::Sense::hover());
            let rect = response.rect;
            painter.rect_filled(rect, 2.0, egui::Color32::from_gray(16));

            #[allow(clippy::cast_precision_loss)]
            let step = width / HISTORY_SIZE as f32;
            let point = |i: usize, level: u8| {
                #[allow(clippy::cast_precision_loss)]
                let x = rect.min.x + i as f32 * step;
                let y = rect.max.y - f32::from(level) / 255.0 * TRACE_HEIGHT;
                egui::pos2(x, y)
            };
            let left: Vec<egui::Pos2> = self
                .history
                .iter()
                .enumerate()
                .map(|(i, record)| point(i, record.report.levels.left))
                .collect();
            let right: Vec<egui::Pos2> = self
                .history
                .iter()
                .enumerate()
                .map(|(i, record)| point(i, record.report.levels.right))
                .collect();
            painter.add(egui::Shape::line(
                left,
                egui::Stroke::new(1.5, egui::Color32::from_rgb(255, 170, 60)),
            ));
            painter.add(egui::Shape::line(
                right,
                egui::Stroke::new(1.0, egui::Color32::from_rgb(200, 90, 40)),
            ));
        });
    }
}
