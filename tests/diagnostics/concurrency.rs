use kasm_error::Severity;
use kasm_shared::DiagnosticContext;
use std::thread;

const WRITERS: usize = 4;
const PER_WRITER: usize = 100;

#[test]
fn test_concurrent_writes_are_all_observed() {
    let context = DiagnosticContext::new("main.kasm");

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let context = &context;
            scope.spawn(move || {
                for i in 0..PER_WRITER {
                    context.record(
                        Severity::Info,
                        context.loc(i + 1, 0),
                        format!("w{}-{}", writer, i),
                    );
                }
            });
        }
    });

    assert_eq!(context.count(), WRITERS * PER_WRITER);
}

#[test]
fn test_per_thread_order_survives_interleaving() {
    let context = DiagnosticContext::new("main.kasm");

    thread::scope(|scope| {
        for writer in 0..WRITERS {
            let context = &context;
            scope.spawn(move || {
                for i in 0..PER_WRITER {
                    context.record(
                        Severity::Info,
                        context.loc(i + 1, 0),
                        format!("w{}-{}", writer, i),
                    );
                }
            });
        }
    });

    // The global interleaving is arbitrary, but each writer's entries must
    // appear in its own happens-before order
    let entries = context.entries();
    for writer in 0..WRITERS {
        let prefix = format!("w{}-", writer);
        let sequence: Vec<usize> = entries
            .iter()
            .filter_map(|e| e.message.strip_prefix(&prefix))
            .map(|suffix| suffix.parse().unwrap())
            .collect();
        assert_eq!(sequence.len(), PER_WRITER);
        assert!(sequence.windows(2).all(|w| w[0] < w[1]), "writer {}", writer);
    }
}

#[test]
fn test_readers_see_consistent_snapshots_during_writes() {
    let context = DiagnosticContext::new("main.kasm");

    thread::scope(|scope| {
        let writer_context = &context;
        scope.spawn(move || {
            for i in 0..PER_WRITER {
                writer_context.record(
                    Severity::Warning,
                    writer_context.loc(i + 1, 0),
                    format!("entry {}", i),
                );
            }
        });

        let reader_context = &context;
        scope.spawn(move || {
            for _ in 0..PER_WRITER {
                let snapshot = reader_context.entries();
                // A snapshot never shrinks relative to its own length and
                // stays internally ordered
                for (i, entry) in snapshot.iter().enumerate() {
                    assert_eq!(entry.message, format!("entry {}", i));
                }
            }
        });
    });

    assert_eq!(context.count(), PER_WRITER);
}

#[test]
fn test_phase_changes_are_atomic_under_contention() {
    let context = DiagnosticContext::new("main.kasm");

    thread::scope(|scope| {
        let phase_context = &context;
        scope.spawn(move || {
            for i in 0..PER_WRITER {
                phase_context.set_phase(format!("phase-{}", i % 3));
            }
        });

        let record_context = &context;
        scope.spawn(move || {
            for i in 0..PER_WRITER {
                record_context.record(Severity::Info, record_context.loc(i + 1, 0), "tick");
            }
        });
    });

    // Every entry observed some fully-written phase value
    for entry in context.entries() {
        assert!(entry.phase.is_empty() || entry.phase.starts_with("phase-"));
    }
}
