use hear_here::audio::{DeviceRole, EndpointDirectory};
use hear_here::{Direction, FakeAudioSystem, SwitchEngine};

mod test_utils;
use test_utils::{capture_logs, enabled, lines_at, AudioSystemBuilder};

const E_FAIL: u32 = 0x8000_4005;

fn engine(system: &FakeAudioSystem) -> SwitchEngine<FakeAudioSystem, FakeAudioSystem> {
    SwitchEngine::new(system.clone(), system.clone())
}

/// Empty enabled list never touches the controller
#[cfg(test)]
mod no_enabled_devices {
    use super::*;

    #[test]
    fn test_both_directions_are_absent() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
            .build();
        let engine = engine(&system);

        assert!(engine.switch_directional(&[], Direction::Next).is_none());
        assert!(engine.switch_directional(&[], Direction::Previous).is_none());
        assert!(system.set_default_calls().is_empty());
        assert_eq!(system.current_default_id().as_deref(), Some("a"));
    }

    #[test]
    fn test_no_enabled_device_active() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .default_device("a")
            .build();
        let engine = engine(&system);

        let result = engine.switch_directional(&enabled(&["x", "y"]), Direction::Next);
        assert!(result.is_none());
        assert!(system.set_default_calls().is_empty());
    }
}

/// Ordered cycling through enabled-and-active devices
#[cfg(test)]
mod directional_cycling {
    use super::*;

    fn abc(default: &str) -> FakeAudioSystem {
        AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .endpoint("c")
            .default_device(default)
            .build()
    }

    #[test]
    fn test_forward_steps_to_next() {
        let system = abc("a");
        let result = engine(&system).switch_directional(&enabled(&["a", "b", "c"]), Direction::Next);

        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
        assert_eq!(system.current_default_id().as_deref(), Some("b"));
    }

    #[test]
    fn test_forward_wraps_from_last() {
        let system = abc("c");
        let result = engine(&system).switch_directional(&enabled(&["a", "b", "c"]), Direction::Next);

        assert_eq!(result.map(|e| e.id), Some("a".to_string()));
    }

    #[test]
    fn test_backward_wraps_from_first() {
        let system = abc("a");
        let result =
            engine(&system).switch_directional(&enabled(&["a", "b", "c"]), Direction::Previous);

        assert_eq!(result.map(|e| e.id), Some("c".to_string()));
    }

    #[test]
    fn test_enabled_order_beats_enumeration_order() {
        let system = abc("c");
        let result = engine(&system).switch_directional(&enabled(&["c", "a", "b"]), Direction::Next);

        assert_eq!(result.map(|e| e.id), Some("a".to_string()));
    }

    #[test]
    fn test_current_outside_set_targets_first() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .endpoint("z")
            .default_device("z")
            .build();
        let engine = engine(&system);
        let list = enabled(&["a", "b"]);

        assert_eq!(
            engine.switch_directional(&list, Direction::Next).map(|e| e.id),
            Some("a".to_string())
        );

        system.set_current_default(Some("z"));
        assert_eq!(
            engine
                .switch_directional(&list, Direction::Previous)
                .map(|e| e.id),
            Some("a".to_string())
        );
    }

    #[test]
    fn test_no_default_targets_first() {
        let system = AudioSystemBuilder::new().endpoint("a").endpoint("b").build();
        let result = engine(&system).switch_directional(&enabled(&["b", "a"]), Direction::Previous);

        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
    }

    #[test]
    fn test_single_device_reselects_itself() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .default_device("a")
            .build();
        let result = engine(&system).switch_directional(&enabled(&["a"]), Direction::Next);

        assert_eq!(result.map(|e| e.id), Some("a".to_string()));
        assert_eq!(system.set_default_calls(), vec!["a".to_string()]);
    }

    #[test]
    fn test_returns_display_name() {
        let system = AudioSystemBuilder::new()
            .named_endpoint("{0.0.0.00000000}.{1}", "Speakers (Realtek Audio)")
            .named_endpoint("{0.0.0.00000000}.{2}", "Speakers (Realtek Audio)")
            .default_device("{0.0.0.00000000}.{1}")
            .build();
        let list = enabled(&["{0.0.0.00000000}.{1}", "{0.0.0.00000000}.{2}"]);

        let result = engine(&system).switch_directional(&list, Direction::Next).unwrap();
        assert_eq!(result.id, "{0.0.0.00000000}.{2}");
        assert_eq!(result.display_name, "Speakers (Realtek Audio)");
    }
}

/// The available list is the live intersection, recomputed on every switch
#[cfg(test)]
mod filtering {
    use super::*;

    #[test]
    fn test_inactive_enabled_device_is_skipped() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("c")
            .default_device("a")
            .build();
        let engine = engine(&system);
        let list = enabled(&["a", "b", "c"]);

        let mut visited = Vec::new();
        for _ in 0..4 {
            visited.push(engine.switch_directional(&list, Direction::Next).unwrap().id);
        }

        assert_eq!(visited, vec!["c", "a", "c", "a"]);
        assert!(!system.set_default_calls().contains(&"b".to_string()));
    }

    #[test]
    fn test_topology_change_between_switches() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("c")
            .default_device("a")
            .build();
        let engine = engine(&system);
        let list = enabled(&["a", "b", "c"]);

        system.add_endpoint("b", "B");
        assert_eq!(
            engine.switch_directional(&list, Direction::Next).map(|e| e.id),
            Some("b".to_string())
        );

        system.remove_endpoint("c");
        assert_eq!(
            engine.switch_directional(&list, Direction::Next).map(|e| e.id),
            Some("a".to_string())
        );
        assert_eq!(system.enumeration_calls(), 2);
    }

    #[test]
    fn test_directory_unavailable_is_absent() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .enumeration_failure()
            .build();

        let result = engine(&system).switch_directional(&enabled(&["a"]), Direction::Next);
        assert!(result.is_none());
        assert!(system.set_default_calls().is_empty());
    }
}

/// Direct jump by 1-based position in the enabled list
#[cfg(test)]
mod index_addressing {
    use super::*;

    #[test]
    fn test_targets_configured_position() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .endpoint("c")
            .default_device("c")
            .build();

        let result = engine(&system).switch_to_index(&enabled(&["a", "b", "c"]), 2);
        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
        assert_eq!(system.current_default_id().as_deref(), Some("b"));
    }

    #[test]
    fn test_independent_of_current_default() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .endpoint("c")
            .default_device("b")
            .build();

        let result = engine(&system).switch_to_index(&enabled(&["a", "b", "c"]), 2);
        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
    }

    #[test]
    fn test_inactive_target_does_not_fall_back() {
        // Unlike directional switching, an inactive entry is not skipped.
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("c")
            .default_device("a")
            .build();

        let result = engine(&system).switch_to_index(&enabled(&["a", "b", "c"]), 2);
        assert!(result.is_none());
        assert!(system.set_default_calls().is_empty());
        assert_eq!(system.current_default_id().as_deref(), Some("a"));
    }

    #[test]
    fn test_out_of_range_is_absent() {
        let system = AudioSystemBuilder::new().endpoint("a").endpoint("b").build();
        let engine = engine(&system);
        let list = enabled(&["a", "b"]);

        assert!(engine.switch_to_index(&list, 0).is_none());
        assert!(engine.switch_to_index(&list, 3).is_none());
        assert!(engine.switch_to_index(&[], 1).is_none());
        assert!(system.set_default_calls().is_empty());
        assert_eq!(system.enumeration_calls(), 0);
    }
}

/// Tri-role set with partial failure
#[cfg(test)]
mod role_failures {
    use super::*;

    #[test]
    fn test_console_failure_still_reports_switch() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
            .failing_role(DeviceRole::Console, E_FAIL)
            .build();

        let result = engine(&system).switch_directional(&enabled(&["a", "b"]), Direction::Next);
        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
        assert_eq!(system.current_default_id().as_deref(), Some("b"));
    }

    #[test]
    fn test_communications_failure_still_reports_switch() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .failing_role(DeviceRole::Communications, E_FAIL)
            .build();

        let result = engine(&system).switch_to_index(&enabled(&["a", "b"]), 2);
        assert_eq!(result.map(|e| e.id), Some("b".to_string()));
    }

    #[test]
    fn test_multimedia_failure_is_absent() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
            .failing_role(DeviceRole::Multimedia, E_FAIL)
            .build();

        let result = engine(&system).switch_directional(&enabled(&["a", "b"]), Direction::Next);
        assert!(result.is_none());
        assert_eq!(system.set_default_calls(), vec!["b".to_string()]);
        assert_eq!(system.current_default_id().as_deref(), Some("a"));
    }

    #[test]
    fn test_device_vanishing_mid_switch_is_absent() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
            .build();
        let directory = UnplugAfterSnapshot {
            inner: system.clone(),
            victim: "b",
        };
        let engine = SwitchEngine::new(directory, system.clone());

        let result = engine.switch_directional(&enabled(&["a", "b"]), Direction::Next);
        assert!(result.is_none());
        assert_eq!(system.set_default_calls(), vec!["b".to_string()]);
        assert_eq!(system.current_default_id().as_deref(), Some("a"));
    }

    /// Directory that unplugs one device right after handing out a snapshot.
    struct UnplugAfterSnapshot {
        inner: FakeAudioSystem,
        victim: &'static str,
    }

    impl EndpointDirectory for UnplugAfterSnapshot {
        fn list_active_endpoints(
            &self,
        ) -> Result<Vec<hear_here::AudioEndpoint>, hear_here::audio::AudioError> {
            let snapshot = self.inner.list_active_endpoints();
            self.inner.remove_endpoint(self.victim);
            snapshot
        }

        fn current_default_id(&self) -> Option<String> {
            self.inner.current_default_id()
        }
    }
}

/// Per-role HRESULTs reach the log on every failed role set
#[cfg(test)]
mod role_failure_logging {
    use super::*;

    fn two_devices() -> AudioSystemBuilder {
        AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
    }

    #[test]
    fn test_partial_failure_warns_with_role_codes() {
        let system = two_devices()
            .failing_role(DeviceRole::Console, E_FAIL)
            .build();
        let engine = engine(&system);

        let mut result = None;
        let logs = capture_logs(|| {
            result = engine.switch_directional(&enabled(&["a", "b"]), Direction::Next);
        });

        assert!(result.is_some());
        let warnings = lines_at(&logs, "WARN");
        assert_eq!(warnings.len(), 1, "logs: {logs}");
        assert!(warnings[0].contains("console=0x80004005"), "logs: {logs}");
        assert!(warnings[0].contains("multimedia=0x00000000"), "logs: {logs}");
        assert!(lines_at(&logs, "ERROR").is_empty(), "logs: {logs}");
    }

    #[test]
    fn test_multimedia_failure_logs_error_with_role_codes() {
        let system = two_devices()
            .failing_role(DeviceRole::Multimedia, E_FAIL)
            .build();
        let engine = engine(&system);

        let mut result = None;
        let logs = capture_logs(|| {
            result = engine.switch_to_index(&enabled(&["a", "b"]), 2);
        });

        assert!(result.is_none());
        let errors = lines_at(&logs, "ERROR");
        assert_eq!(errors.len(), 1, "logs: {logs}");
        assert!(errors[0].contains("multimedia=0x80004005"), "logs: {logs}");
        assert!(errors[0].contains("endpoint_id=b"), "logs: {logs}");
    }

    #[test]
    fn test_clean_switch_logs_no_failure() {
        let system = two_devices().build();
        let engine = engine(&system);

        let logs = capture_logs(|| {
            engine.switch_directional(&enabled(&["a", "b"]), Direction::Next);
        });

        assert!(lines_at(&logs, "WARN").is_empty(), "logs: {logs}");
        assert!(lines_at(&logs, "ERROR").is_empty(), "logs: {logs}");
        assert!(logs.contains("Switched default device"), "logs: {logs}");
    }
}

/// Round-trip through the fake directory
#[cfg(test)]
mod round_trip {
    use super::*;

    #[test]
    fn test_default_visible_after_switch() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .default_device("a")
            .build();

        let result = engine(&system)
            .switch_directional(&enabled(&["a", "b"]), Direction::Next)
            .unwrap();

        assert_eq!(system.current_default_id(), Some(result.id.clone()));
        let snapshot = system.list_active_endpoints().unwrap();
        let defaults: Vec<_> = snapshot.iter().filter(|e| e.is_current_default).collect();
        assert_eq!(defaults.len(), 1);
        assert_eq!(defaults[0].id, "b");
    }

    #[test]
    fn test_concurrent_switches_stay_consistent() {
        let system = AudioSystemBuilder::new()
            .endpoint("a")
            .endpoint("b")
            .endpoint("c")
            .default_device("a")
            .build();
        let engine = std::sync::Arc::new(engine(&system));
        let list = std::sync::Arc::new(enabled(&["a", "b", "c"]));

        let handles: Vec<_> = (0..6)
            .map(|_| {
                let engine = std::sync::Arc::clone(&engine);
                let list = std::sync::Arc::clone(&list);
                std::thread::spawn(move || engine.switch_directional(&list, Direction::Next))
            })
            .collect();

        for handle in handles {
            assert!(handle.join().unwrap().is_some());
        }

        // Six serialized steps through three devices land back on the start.
        assert_eq!(system.current_default_id().as_deref(), Some("a"));
        assert_eq!(
            system.set_default_calls(),
            vec!["b", "c", "a", "b", "c", "a"]
        );
    }
}
