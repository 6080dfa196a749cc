use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

static LOGGER: StderrLogger = StderrLogger;
static TICK: OnceLock<Arc<AtomicU64>> = OnceLock::new();

/// Writes every record to stderr, prefixed with the current simulation tick.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let tick = TICK.get().map_or(0, |tick| tick.load(Ordering::Relaxed));
        let _ = writeln!(std::io::stderr().lock(), "{}", format_line(tick, record));
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn format_line(tick: u64, record: &Record) -> String {
    format!("[T{:04}] {:<5} {}", tick, record.level(), record.args())
}

pub fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// Lines logged from now on carry the value of `counter`.
pub fn attach_tick_counter(counter: Arc<AtomicU64>) {
    let _ = TICK.set(counter);
}
