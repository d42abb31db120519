use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::LevelFilter;
use reqwest::StatusCode;

/// Set while the keyboard listener holds the terminal in raw mode, where a
/// bare `\n` no longer returns the cursor to the first column.
static RAW_TERMINAL: AtomicBool = AtomicBool::new(false);

pub fn set_raw_terminal(raw: bool) {
    RAW_TERMINAL.store(raw, Ordering::SeqCst);
}

fn line_ending() -> &'static str {
    if RAW_TERMINAL.load(Ordering::SeqCst) {
        "\r\n"
    } else {
        "\n"
    }
}

pub fn level(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the global logger. `RUST_LOG` still wins over `verbosity`.
pub fn init(verbosity: u8) {
    let _ = env_logger::Builder::new()
        .filter_module(env!("CARGO_PKG_NAME"), level(verbosity))
        .parse_default_env()
        .format(|buf, record| {
            write!(
                buf,
                "[{}] {:<5} {}{}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.args(),
                line_ending()
            )
        })
        .try_init();
}

pub struct ResponseLogger;

impl ResponseLogger {
    pub fn log_error(status: StatusCode, body: &str) {
        log::debug!("[{status}] {}", body.replace('\n', ""));
    }
}
