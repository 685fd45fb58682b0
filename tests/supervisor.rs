mod tests {
    use candle_flicker::supervisor::{LightSensor, LowPower, OutputGate};
    use candle_flicker::{AmbientSupervisor, Decision, SupervisorConfig, Watchdog};

    struct ScriptedSensor {
        samples: Vec<u8>,
        index: usize,
    }

    impl LightSensor for ScriptedSensor {
        fn sample(&mut self) -> u8 {
            let sample = self.samples[self.index % self.samples.len()];
            self.index += 1;
            sample
        }
    }

    #[derive(Default)]
    struct Pins {
        enabled: Option<bool>,
        writes: usize,
    }

    impl OutputGate for Pins {
        fn set_enabled(&mut self, enabled: bool) {
            self.enabled = Some(enabled);
            self.writes += 1;
        }
    }

    #[derive(Default)]
    struct Sleeper {
        sleeps: usize,
    }

    impl LowPower for Sleeper {
        fn wait_for_wake(&mut self) {
            self.sleeps += 1;
        }
    }

    #[derive(Default)]
    struct CountingWatchdog {
        feeds: usize,
    }

    impl Watchdog for CountingWatchdog {
        fn feed(&mut self) {
            self.feeds += 1;
        }
    }

    fn supervisor(
        samples: &[u8],
    ) -> AmbientSupervisor<ScriptedSensor, Pins, Sleeper, CountingWatchdog> {
        AmbientSupervisor::new(
            SupervisorConfig::DEFAULT,
            ScriptedSensor {
                samples: samples.to_vec(),
                index: 0,
            },
            Pins::default(),
            Sleeper::default(),
            CountingWatchdog::default(),
        )
    }

    #[test]
    fn test_bright_disables_and_sleeps() {
        let mut supervisor = supervisor(&[0xB1]);
        assert_eq!(supervisor.step(), Decision::Slept);
        assert_eq!(supervisor.gate().enabled, Some(false));
        assert_eq!(supervisor.power().sleeps, 1);
        assert_eq!(supervisor.watchdog().feeds, 1);
        assert_eq!(supervisor.last_sample(), 0xB1);
    }

    #[test]
    fn test_threshold_is_inclusive_for_dark() {
        let mut supervisor = supervisor(&[0xB0]);
        assert_eq!(supervisor.step(), Decision::Lit);
        assert_eq!(supervisor.gate().enabled, Some(true));
        assert_eq!(supervisor.power().sleeps, 0);
        assert_eq!(supervisor.watchdog().feeds, 1);
    }

    #[test]
    fn test_watchdog_fed_once_per_iteration() {
        let samples = [0x00, 0xFF, 0xB0, 0xB1, 0x10];
        let mut supervisor = supervisor(&samples);
        let decisions: Vec<Decision> = (0..samples.len()).map(|_| supervisor.step()).collect();

        assert_eq!(
            decisions,
            vec![
                Decision::Lit,
                Decision::Slept,
                Decision::Lit,
                Decision::Slept,
                Decision::Lit,
            ]
        );
        assert_eq!(supervisor.watchdog().feeds, samples.len());
        assert_eq!(supervisor.gate().writes, samples.len());
        assert_eq!(supervisor.power().sleeps, 2);
        assert_eq!(supervisor.last_decision(), Some(Decision::Lit));
    }

    #[test]
    fn test_custom_threshold() {
        let mut supervisor = supervisor(&[0x80]);
        supervisor.set_threshold(0x40);
        assert_eq!(supervisor.step(), Decision::Slept);
        assert_eq!(supervisor.config().threshold, 0x40);
    }
}
