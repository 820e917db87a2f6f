use plugwire::{Config, LogEvent, LogViewer, PartitionViewer, SharedPartitionViewer};
use plugwire::frontend::PartitionConfig;
use proptest::prelude::*;
use std::collections::HashSet;
use std::time::SystemTime;

#[test]
fn test_short_name_unchanged() {
    let mut viewer = PartitionViewer::new();
    assert_eq!(viewer.short("short"), "short");
}

#[test]
fn test_same_long_name_same_short() {
    let mut viewer = PartitionViewer::new();
    let a = viewer.short("deployment/01HZX4Q9W3KJ7");
    let b = viewer.short("deployment/01HZX4Q9W3KJ7");
    assert_eq!(a, b);
    assert_eq!(a.len(), 7);
}

#[test]
fn test_independent_viewers_agree() {
    let names = ["instance-0001-aaaa", "instance-0002-bbbb", "instance-0003-cccc"];
    let mut first = PartitionViewer::new();
    let mut second = PartitionViewer::new();

    for name in names {
        assert_eq!(first.short(name), second.short(name));
    }
}

#[test]
fn test_tiny_prefix_forces_extension() {
    // With a single-character prefix there are only 32 first symbols, so 40
    // names must collide and be extended.
    let config = PartitionConfig { min_length: 10, prefix_length: 1 };
    let mut viewer = PartitionViewer::with_config(&config);

    let shorts: Vec<String> = (0..40)
        .map(|i| viewer.short(&format!("partition-number-{}", i)))
        .collect();

    let unique: HashSet<_> = shorts.iter().collect();
    assert_eq!(unique.len(), shorts.len());
    assert!(shorts.iter().any(|s| s.len() > 1));
}

#[test]
fn test_assignments_are_stable_after_later_lookups() {
    let mut viewer = PartitionViewer::new();
    let first = viewer.short("build-runner-alpha");
    for i in 0..100 {
        viewer.short(&format!("build-runner-{}", i));
    }
    assert_eq!(viewer.short("build-runner-alpha"), first);
}

#[test]
fn test_viewer_from_config() {
    let config = Config::parse("[partitions]\nmin_length = 3\nprefix_length = 5\n").unwrap();
    let mut viewer = PartitionViewer::with_config(&config.partitions);
    assert_eq!(viewer.short("ab"), "ab");
    assert_eq!(viewer.short("abc").len(), 5);
}

struct Batches(Vec<Vec<LogEvent>>);

impl LogViewer for Batches {
    fn next_batch(&mut self) -> anyhow::Result<Vec<LogEvent>> {
        if self.0.is_empty() {
            anyhow::bail!("stream closed");
        }
        Ok(self.0.remove(0))
    }
}

#[test]
fn test_render_batches() {
    let event = |partition: &str, message: &str| LogEvent {
        partition: partition.to_string(),
        timestamp: SystemTime::now(),
        message: message.to_string(),
    };
    let mut source = Batches(vec![
        vec![event("app-7d9f8b6c5-x2k4p", "ready"), event("db", "ok")],
        vec![event("app-7d9f8b6c5-x2k4p", "request served")],
    ]);

    let mut viewer = PartitionViewer::new();
    let first = viewer.render_batch(&mut source).unwrap();
    let second = viewer.render_batch(&mut source).unwrap();
    let short = viewer.short("app-7d9f8b6c5-x2k4p");

    assert_eq!(first, vec![format!("[{}] ready", short), "[db] ok".to_string()]);
    assert_eq!(second, vec![format!("[{}] request served", short)]);
    assert!(viewer.render_batch(&mut source).is_err());
}

#[test]
fn test_shared_viewer_across_threads() {
    let shared = SharedPartitionViewer::default();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let shared = shared.clone();
            std::thread::spawn(move || {
                (0..50usize)
                    .map(|i| (i, shared.short(&format!("worker-partition-{}", i))))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let results: Vec<Vec<(usize, String)>> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    for other in &results[1..] {
        assert_eq!(other, &results[0]);
    }
    let unique: HashSet<_> = results[0].iter().map(|(_, s)| s).collect();
    assert_eq!(unique.len(), 50);
}

proptest! {
    #[test]
    fn prop_distinct_names_get_distinct_shorts(
        names in proptest::collection::hash_set("[a-z0-9-]{10,40}", 1..200)
    ) {
        let mut viewer = PartitionViewer::new();
        let shorts: HashSet<String> = names.iter().map(|n| viewer.short(n)).collect();
        prop_assert_eq!(shorts.len(), names.len());
    }

    #[test]
    fn prop_lookups_are_memoized(name in "[a-z]{10,30}", others in proptest::collection::vec("[a-z]{10,30}", 0..20)) {
        let mut viewer = PartitionViewer::new();
        let first = viewer.short(&name);
        for other in &others {
            viewer.short(other);
        }
        prop_assert_eq!(viewer.short(&name), first);
    }

    #[test]
    fn prop_short_inputs_pass_through(name in "[a-z]{0,9}") {
        let mut viewer = PartitionViewer::new();
        prop_assert_eq!(viewer.short(&name), name);
    }
}
