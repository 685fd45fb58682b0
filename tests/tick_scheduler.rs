mod tests {
    use candle_flicker::tick_scheduler::{counts_until_overflow, reload_value};
    use candle_flicker::{
        ChannelLevels, CountUpTimer, Duration, FlickerConfig, FlickerState, Instant, PwmOutput,
        TickScheduler, TimerConfig,
    };

    #[derive(Default)]
    struct RecordingOutput {
        writes: Vec<ChannelLevels>,
    }

    impl PwmOutput for RecordingOutput {
        fn set_levels(&mut self, levels: ChannelLevels) {
            self.writes.push(levels);
        }
    }

    #[derive(Default)]
    struct FakeTimer {
        loads: Vec<u8>,
        cleared: usize,
    }

    impl CountUpTimer for FakeTimer {
        fn load(&mut self, value: u8) {
            self.loads.push(value);
        }

        fn clear_overflow(&mut self) {
            self.cleared += 1;
        }
    }

    fn scheduler() -> TickScheduler<RecordingOutput, FakeTimer> {
        TickScheduler::new(
            &FlickerConfig::DEFAULT,
            TimerConfig::DEFAULT,
            RecordingOutput::default(),
            FakeTimer::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_reload_arithmetic() {
        assert_eq!(reload_value(127), 128);
        assert_eq!(reload_value(5), 250);
        assert_eq!(counts_until_overflow(128), 128);
        assert_eq!(counts_until_overflow(250), 6);
        assert_eq!(counts_until_overflow(0), 256);
    }

    #[test]
    fn test_period_scales_with_length() {
        let timer = TimerConfig::DEFAULT;
        assert_eq!(timer.counts_duration(1), Duration::from_micros(128));
        assert_eq!(timer.period(127), Duration::from_micros(128 * 128));
        assert_eq!(timer.period(5), Duration::from_micros(6 * 128));
        assert!(timer.period(100) > timer.period(50));
    }

    #[test]
    fn test_new_arms_timer() {
        let scheduler = scheduler();
        assert_eq!(scheduler.timer().loads, vec![128]);
        assert_eq!(
            scheduler.next_deadline(),
            Instant::from_micros(128 * 128)
        );
    }

    #[test]
    fn test_overflow_publishes_and_reloads() {
        let mut scheduler = scheduler();
        let result = scheduler.on_overflow();

        // Start-up recovery burst keeps the channels together
        assert_eq!(result.report.levels, ChannelLevels::new(1, 1));
        assert_eq!(scheduler.output().writes, vec![ChannelLevels::new(1, 1)]);
        assert_eq!(result.reload, 128);
        assert_eq!(scheduler.timer().loads, vec![128, 128]);
        assert_eq!(scheduler.timer().cleared, 2);
        assert_eq!(result.period, Duration::from_micros(128 * 128));
        assert_eq!(result.next_deadline, Instant::from_micros(2 * 128 * 128));
    }

    #[test]
    fn test_reload_follows_new_length() {
        let mut scheduler = scheduler();
        let mut result = scheduler.on_overflow();
        while result.report.length == 127 {
            result = scheduler.on_overflow();
        }
        assert_eq!(result.report.length, 45);
        assert_eq!(result.reload, !45);
        assert_eq!(result.period, Duration::from_micros(46 * 128));
    }

    #[test]
    fn test_catch_up_fires_due_ticks() {
        let mut scheduler = scheduler();
        assert!(scheduler.catch_up(Instant::from_micros(100), |_, _| {}).is_none());

        let mut fired = Vec::new();
        let last = scheduler
            .catch_up(Instant::from_micros(3 * 128 * 128), |at, result| {
                fired.push((at.as_micros(), result.report.levels.left));
            })
            .unwrap();
        assert_eq!(scheduler.output().writes.len(), 3);
        assert_eq!(
            fired,
            vec![(128 * 128, 1), (2 * 128 * 128, 2), (3 * 128 * 128, 3)]
        );
        assert_eq!(last.report.levels.left, 3);
        assert_eq!(last.next_deadline, Instant::from_micros(4 * 128 * 128));
    }

    #[test]
    fn test_catch_up_drops_long_backlog() {
        let mut scheduler = scheduler();
        let now = Instant::from_secs(10);
        let mut fired = Vec::new();
        let last = scheduler.catch_up(now, |at, _| fired.push(at)).unwrap();
        assert_eq!(scheduler.output().writes.len(), 1);
        assert_eq!(fired, vec![now]);
        assert_eq!(last.next_deadline, now + Duration::from_micros(128 * 128));
    }

    #[test]
    fn test_restart() {
        let mut scheduler = scheduler();
        for _ in 0..1_000 {
            scheduler.on_overflow();
        }
        let now = Instant::from_secs(3);
        scheduler.restart(now);

        assert_eq!(
            scheduler.state(),
            &FlickerState::new(&FlickerConfig::DEFAULT).unwrap()
        );
        assert_eq!(scheduler.output().writes.last(), Some(&ChannelLevels::new(0, 0)));
        assert_eq!(scheduler.timer().loads.last(), Some(&128));
        assert_eq!(
            scheduler.next_deadline(),
            now + Duration::from_micros(128 * 128)
        );
    }

    #[test]
    fn test_arm_after_wait() {
        let mut scheduler = scheduler();
        scheduler.on_overflow();
        let state = scheduler.state().clone();

        let wake = Instant::from_secs(60);
        scheduler.arm(wake);
        assert_eq!(scheduler.state(), &state);
        assert_eq!(
            scheduler.next_deadline(),
            wake + Duration::from_micros(128 * 128)
        );
    }

    #[test]
    fn test_invalid_seed() {
        let config = FlickerConfig {
            seed: 1,
            ..FlickerConfig::DEFAULT
        };
        let scheduler = TickScheduler::new(
            &config,
            TimerConfig::DEFAULT,
            RecordingOutput::default(),
            FakeTimer::default(),
        );
        assert!(scheduler.is_err());
    }
}
