//! Tracing setup. Logs go to a daily file so they never interleave with
//! command output.

use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "pawhome=info";

/// Directory holding the log files: $XDG_DATA_HOME/pawhome/logs
pub fn log_dir() -> PathBuf {
  dirs::data_dir()
    .unwrap_or_else(std::env::temp_dir)
    .join("pawhome")
    .join("logs")
}

/// Install the global subscriber. Keep the guard alive until exit or
/// buffered lines are lost.
///
/// Falls back to stderr when the log directory cannot be created.
pub fn init(json: bool) -> WorkerGuard {
  let appender = RollingFileAppender::builder()
    .rotation(Rotation::DAILY)
    .filename_prefix("pawhome")
    .filename_suffix("log")
    .build(log_dir());

  let (writer, guard) = match appender {
    Ok(appender) => tracing_appender::non_blocking(appender),
    Err(e) => {
      eprintln!("pawhome: cannot write log files ({}), logging to stderr", e);
      tracing_appender::non_blocking(std::io::stderr())
    }
  };

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
  let layer = fmt::layer().with_writer(writer).with_ansi(false);

  if json {
    tracing_subscriber::registry().with(filter).with(layer.json()).init();
  } else {
    tracing_subscriber::registry().with(filter).with(layer).init();
  }

  guard
}
