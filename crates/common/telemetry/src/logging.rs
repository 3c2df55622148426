// Copyright 2025 Crrow
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{
    env,
    io::IsTerminal,
    sync::{Arc, Mutex, Once},
};

use bon::Builder;
use once_cell::sync::{Lazy, OnceCell};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracing::Subscriber;
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_log::LogTracer;
use tracing_subscriber::{
    EnvFilter, Layer, Registry,
    filter::{self, LevelFilter},
    fmt::MakeWriter,
    layer::SubscriberExt,
    registry::LookupSpan,
    reload,
};

/// Directory used for log files when a host enables file logging without
/// choosing a location.
pub const DEFAULT_LOGGING_DIR: &str = "logs";

/// Fallback filter when neither `LoggingOptions::level` nor `RUST_LOG` is
/// set.
const DEFAULT_LOG_TARGETS: &str = "info";

/// Handle for swapping the active level filter after initialization.
///
/// Populated by [`init_global_logging`]; `None` before that.
pub static RELOAD_HANDLE: OnceCell<reload::Handle<filter::Targets, Registry>> = OnceCell::new();

/// Logging configuration.
///
/// Deserializes with defaults for every missing field, so a host may embed it
/// in its own configuration file and only spell out what it overrides.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, SmartDefault, Builder)]
#[serde(default)]
#[builder(on(String, into))]
pub struct LoggingOptions {
    /// Directory for rotated log files. Empty disables file logging.
    #[default = ""]
    #[builder(default)]
    pub dir: String,

    /// Filter string such as `"info"` or `"debug,mixdeck_player=trace"`.
    /// Falls back to `RUST_LOG`, then to `info`.
    pub level: Option<String>,

    #[builder(default)]
    pub log_format: LogFormat,

    /// Number of hourly files kept per log stream. Default keeps one week.
    #[default = 168]
    #[builder(default = 168)]
    pub max_log_files: usize,

    #[default = true]
    #[builder(default = true)]
    pub append_stdout: bool,
}

#[derive(
    Clone, Debug, Copy, PartialEq, Eq, Serialize, Deserialize, Default, derive_more::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// One JSON object per event, including the current span list.
    #[display("json")]
    Json,
    #[default]
    #[display("text")]
    Text,
}

/// Error returned by [`set_level`].
#[derive(Debug, derive_more::Display, derive_more::Error)]
pub enum LevelError {
    #[display("logging has not been initialized")]
    NotInitialized,
    #[display("invalid level filter {filter:?}")]
    InvalidFilter {
        filter: String,
        source: filter::ParseError,
    },
    #[display("failed to swap level filter")]
    Reload { source: reload::Error },
}

/// Initializes stdout-only text logging with default options.
#[must_use]
pub fn init_tracing_subscriber(app_name: &str) -> Vec<WorkerGuard> {
    init_global_logging(app_name, &LoggingOptions::default())
}

/// Initializes logging for unit and integration tests.
///
/// Logs go to `UNITTEST_LOG_DIR` (default `/tmp/__mixdeck_unittest_logs`) at
/// `UNITTEST_LOG_LEVEL` (default `debug`). Safe to call from every test; only
/// the first call has an effect.
pub fn init_default_ut_logging() {
    static START: Once = Once::new();

    START.call_once(|| {
        let mut g = GLOBAL_UT_LOG_GUARD
            .as_ref()
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let dir = env::var("UNITTEST_LOG_DIR")
            .unwrap_or_else(|_| "/tmp/__mixdeck_unittest_logs".to_string());
        let level = env::var("UNITTEST_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());

        let opts = LoggingOptions {
            dir: dir.clone(),
            level: Some(level),
            append_stdout: false,
            ..Default::default()
        };
        *g = Some(init_global_logging("unittest", &opts));

        tracing::info!("logs dir = {}", dir);
    });
}

static GLOBAL_UT_LOG_GUARD: Lazy<Arc<Mutex<Option<Vec<WorkerGuard>>>>> =
    Lazy::new(|| Arc::new(Mutex::new(None)));

/// Installs the global subscriber.
///
/// Layers, each present only when configured:
///
/// - stdout, when `append_stdout` is set
/// - hourly rotated `<app_name>.*` files under `dir`
/// - hourly rotated `<app_name>-err.*` files under `dir`, errors only
///
/// The returned guards flush the non-blocking writers on drop and must be kept
/// alive for as long as logging is wanted. Only the first call installs
/// anything; later calls return no guards.
///
/// # Panics
///
/// Panics if the log directory cannot be created or the level filter does not
/// parse, so a misconfigured host fails at startup rather than running blind.
pub fn init_global_logging(app_name: &str, opts: &LoggingOptions) -> Vec<WorkerGuard> {
    static START: Once = Once::new();
    let mut guards = vec![];

    START.call_once(|| {
        // Reported once the subscriber below is installed.
        let log_bridge = LogTracer::init();

        let stdout_layer = if opts.append_stdout {
            let (writer, guard) = tracing_appender::non_blocking(std::io::stdout());
            guards.push(guard);
            Some(fmt_layer(
                writer,
                opts.log_format,
                std::io::stdout().is_terminal(),
            ))
        } else {
            None
        };

        let file_layer = if opts.dir.is_empty() {
            None
        } else {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(app_name, "", opts));
            guards.push(guard);
            Some(fmt_layer(writer, opts.log_format, false))
        };

        let err_file_layer = if opts.dir.is_empty() {
            None
        } else {
            let (writer, guard) =
                tracing_appender::non_blocking(rolling_appender(app_name, "-err", opts));
            guards.push(guard);
            Some(
                fmt_layer(writer, opts.log_format, false)
                    .with_filter(LevelFilter::ERROR)
                    .boxed(),
            )
        };

        let env_level = env::var(EnvFilter::DEFAULT_ENV).ok();
        let filter = opts
            .level
            .as_deref()
            .or(env_level.as_deref())
            .unwrap_or(DEFAULT_LOG_TARGETS)
            .parse::<filter::Targets>()
            .unwrap_or_else(|e| panic!("error parsing log level string: {e}"));

        let (dyn_filter, reload_handle) = reload::Layer::new(filter);
        let _ = RELOAD_HANDLE.set(reload_handle);

        let subscriber = Registry::default()
            .with(dyn_filter)
            .with(stdout_layer)
            .with(file_layer)
            .with(err_file_layer);

        tracing::subscriber::set_global_default(subscriber)
            .unwrap_or_else(|e| panic!("global tracing subscriber already installed: {e}"));

        if let Err(err) = log_bridge {
            tracing::warn!(%err, "`log` records are not forwarded, another logger owns the facade");
        }
        tracing::debug!(app_name, format = %opts.log_format, dir = %opts.dir, "logging initialized");
    });

    guards
}

/// Replaces the active level filter, e.g. to turn on `trace` for
/// `mixdeck_player` while chasing a dispatch problem.
pub fn set_level(level: &str) -> Result<(), LevelError> {
    let handle = RELOAD_HANDLE.get().ok_or(LevelError::NotInitialized)?;
    let targets = level
        .parse::<filter::Targets>()
        .map_err(|source| LevelError::InvalidFilter {
            filter: level.to_string(),
            source,
        })?;
    handle
        .reload(targets)
        .map_err(|source| LevelError::Reload { source })
}

fn rolling_appender(app_name: &str, suffix: &str, opts: &LoggingOptions) -> RollingFileAppender {
    RollingFileAppender::builder()
        .rotation(Rotation::HOURLY)
        .filename_prefix(format!("{app_name}{suffix}"))
        .max_log_files(opts.max_log_files)
        .build(&opts.dir)
        .unwrap_or_else(|e| {
            panic!(
                "initializing rolling file appender at {} failed: {}",
                &opts.dir, e
            )
        })
}

fn fmt_layer<S, W>(writer: W, format: LogFormat, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    match format {
        LogFormat::Json => tracing_subscriber::fmt::Layer::new()
            .json()
            .with_writer(writer)
            .with_ansi(ansi)
            .with_current_span(true)
            .with_span_list(true)
            .boxed(),
        LogFormat::Text => tracing_subscriber::fmt::Layer::new()
            .with_writer(writer)
            .with_ansi(ansi)
            .boxed(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_log_text_to_stdout_only() {
        let opts = LoggingOptions::default();
        assert!(opts.dir.is_empty());
        assert!(opts.append_stdout);
        assert_eq!(opts.log_format, LogFormat::Text);
        assert_eq!(opts.max_log_files, 168);
        assert_eq!(opts, LoggingOptions::builder().build());
    }

    #[test]
    fn missing_fields_deserialize_to_defaults() {
        let opts: LoggingOptions =
            serde_json::from_str(r#"{"dir":"/var/log/mixdeck","log_format":"json"}"#).unwrap();
        assert_eq!(opts.dir, "/var/log/mixdeck");
        assert_eq!(opts.log_format, LogFormat::Json);
        assert!(opts.append_stdout);
        assert!(opts.level.is_none());
    }

    #[test]
    fn builder_accepts_str_arguments() {
        let opts = LoggingOptions::builder()
            .dir("logs")
            .level("debug".to_string())
            .append_stdout(false)
            .build();
        assert_eq!(opts.dir, DEFAULT_LOGGING_DIR);
        assert_eq!(opts.level.as_deref(), Some("debug"));
        assert!(!opts.append_stdout);
    }

    #[test]
    fn set_level_rejects_garbage_after_init() {
        init_default_ut_logging();
        assert!(matches!(
            set_level("debug,mixdeck_player=loudest"),
            Err(LevelError::InvalidFilter { .. })
        ));
        assert!(set_level("debug").is_ok());
    }

    #[test]
    fn log_records_are_bridged_after_init() {
        init_default_ut_logging();
        assert!(LogTracer::init().is_err());
    }
}
