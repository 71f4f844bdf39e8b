//! Logger setup on top of `env_logger`.
//!
//! `RUST_LOG` overrides the CLI flags. Without it, `--quiet` shows errors
//! only, the default is info, `-v` is debug and `-vv` is trace. Verbose
//! runs stamp each line with the time and the emitting module.

use env_logger::Builder;
use log::LevelFilter;
use std::io::Write;

/// Dependencies whose debug output drowns the scan log.
const NOISY_MODULES: [&str; 2] = ["globset", "ignore"];

/// Install the global logger for the given CLI verbosity.
///
/// Only the first call in a process installs a logger; later calls are
/// ignored.
pub fn init_logging(verbose: u8, quiet: bool) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let level = determine_level(verbose, quiet);

    let mut builder = Builder::new();
    match rust_log {
        Some(ref filters) => {
            builder.parse_filters(filters);
        }
        None => {
            builder.filter_level(level);
            for module in NOISY_MODULES {
                builder.filter_module(module, dependency_level(level));
            }
        }
    }

    let detailed = verbose >= 1;
    builder.format(move |buf, record| {
        let level_style = buf.default_level_style(record.level());
        if detailed {
            writeln!(
                buf,
                "{} {level_style}{:<5}{level_style:#} [{}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.module_path().unwrap_or("unknown"),
                record.args()
            )
        } else {
            writeln!(
                buf,
                "{level_style}{:<5}{level_style:#} {}",
                record.level(),
                record.args()
            )
        }
    });

    if builder.try_init().is_ok() {
        log::debug!("Logging at {:?} (RUST_LOG: {:?})", level, rust_log);
    }
}

fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    match (quiet, verbose) {
        (true, _) => LevelFilter::Error,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    }
}

/// The ignore/globset matchers log every compiled pattern at debug.
fn dependency_level(level: LevelFilter) -> LevelFilter {
    level.min(LevelFilter::Warn)
}
