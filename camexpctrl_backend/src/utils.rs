use std::sync::Once;
use std::time::{Duration, Instant};

static LOG_INIT: Once = Once::new();

// Console logger setup for host binaries and tests. Guarded so repeated
// calls (same process, multiple components) add handlers only once.
pub fn init_logging() {
    LOG_INIT.call_once(|| {
        let _ = env_logger::Builder::from_env(
            env_logger::Env::default().default_filter_or("debug"),
        )
        .format_timestamp_millis()
        .try_init();
    });
}

/// Measures the elapsed time between successive `tick` calls.
pub struct TickTimer {
    last: Instant,
}

impl TickTimer {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
        }
    }

    /// Time elapsed since construction or the previous tick, whichever came
    /// later.
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let diff = now - self.last;
        self.last = now;
        diff
    }

    pub fn tick_log(&mut self, msg: &str) -> Duration {
        let diff = self.tick();
        log::debug!("{}: {:.3} ms", msg, diff.as_secs_f64() * 1e3);
        diff
    }
}
