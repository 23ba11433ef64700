//! Example showing registry logging during startup.
//!
//! Run with: cargo run --example log_integration --features log

use initall::{InitAllOnce, InitError, InitRegistrant};
use log::{Level, LevelFilter, Log, Metadata, Record, info};
use std::{thread, time::Duration};

struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Debug
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

initall::initializer!(config, priority: 100, || {
    thread::sleep(Duration::from_millis(50));
    Ok(())
});

fn main() {
    log::set_logger(&LOGGER).expect("logger already set");
    log::set_max_level(LevelFilter::Debug);

    info!("Starting application");

    // Modules register from their own threads during startup
    let handles: Vec<_> = ["cache", "database", "metrics"]
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            thread::spawn(move || {
                initall::registry().register_entry(
                    initall::InitializerEntry::from_fn(move || {
                        thread::sleep(Duration::from_millis(100));
                        if name == "metrics" {
                            Err(InitError::msg("metrics endpoint unreachable"))
                        } else {
                            Ok(())
                        }
                    })
                    .name(name)
                    .priority(10 * i as i64),
                )
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let errors = initall::registry().run_all_once();
    for err in &errors {
        log::error!("startup failure: {err}");
    }

    for outcome in initall::registry().outcomes() {
        info!("{} took {:?}", outcome.name, outcome.elapsed);
    }

    info!("Application ready with {} failure(s)", errors.len());
}
