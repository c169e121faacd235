use anyhow::{Context, Result};
use camino::Utf8Path;
use chrono::{DateTime, Local};
use std::fmt;
use std::fs;
use tracing::{Event, Subscriber};
use tracing_appender::rolling;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Log prefix used by the feed check
pub const CHECK_LOG: &str = "yt-cache";

/// Log prefix used by the explorer and channel registration
pub const CHANNELS_LOG: &str = "yt-channels";

/// Formats events as `LEVEL :: [timestamp]  message`
#[derive(Debug, Clone, Copy, Default)]
pub struct LineFormat;

impl<S, N> FormatEvent<S, N> for LineFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        write!(
            writer,
            "{:<5} :: [{}]  ",
            event.metadata().level().as_str(),
            Local::now().format("%Y-%m-%d %H:%M:%S,%3f")
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// File name for a log written during the ISO week containing `now`.
///
/// Every process opens the file for the current week in append mode, so a new
/// file starts each week and older weeks are left untouched.
pub fn weekly_file_name(prefix: &str, now: DateTime<Local>) -> String {
    format!("{}.log.{}", prefix, now.format("%G-W%V"))
}

fn env_filter(debug_mode: bool) -> EnvFilter {
    if debug_mode {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    }
}

/// Build a subscriber writing [`LineFormat`] lines to `writer`.
///
/// Used by [`setup_logging`] and by tests that need to capture log output
/// with `tracing::subscriber::with_default`.
pub fn line_subscriber<W>(writer: W, debug_mode: bool) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(env_filter(debug_mode)).with(
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_writer(writer)
            .with_ansi(false),
    )
}

/// Setup logging with a weekly log file under `log_dir`.
///
/// Call once at process start. The subscriber is installed globally and is
/// never reconfigured afterwards.
///
/// # Arguments
/// * `log_dir` - Directory for log files (the library root)
/// * `log_prefix` - Prefix for log files (e.g. [`CHECK_LOG`])
/// * `debug_mode` - If true, use debug level; otherwise use info level
/// * `console_output` - If true, also log to the console
///
/// # Returns
/// A guard that must be held for the duration of the program to keep logging active
pub fn setup_logging(
    log_dir: &Utf8Path,
    log_prefix: &str,
    debug_mode: bool,
    console_output: bool,
) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    if !log_dir.exists() {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory: {}", log_dir))?;
    }

    let file_name = weekly_file_name(log_prefix, Local::now());
    let file_appender = rolling::never(log_dir, &file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .event_format(LineFormat)
        .with_writer(non_blocking)
        .with_ansi(false);

    if console_output {
        let console_layer = tracing_subscriber::fmt::layer()
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(env_filter(debug_mode))
            .with(file_layer)
            .with(console_layer)
            .try_init()
            .context("Logging was already initialized")?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter(debug_mode))
            .with(file_layer)
            .try_init()
            .context("Logging was already initialized")?;
    }

    tracing::info!(
        "Logging initialized: file={}/{}, debug={}, console={}",
        log_dir,
        file_name,
        debug_mode,
        console_output
    );

    Ok(guard)
}
