//! Diagnostic log file. Each event becomes one line:
//! `[<RFC3339 timestamp>] [<LEVEL>]: <message>`.

use std::{fmt, fs::OpenOptions, path::Path, sync::Mutex};

use anyhow::Context;
use chrono::{Local, SecondsFormat};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{FmtContext, FormatEvent, FormatFields, format::Writer},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

use crate::config::LogConfig;

pub fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN => "WARNING",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "TRACE",
    }
}

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
            "[{}] [{}]: ",
            Local::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            level_label(event.metadata().level())
        )?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

fn file_subscriber(
    path: &Path,
    directive: &str,
) -> anyhow::Result<impl Subscriber + Send + Sync + 'static> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))?;
    let filter = EnvFilter::try_new(directive)
        .with_context(|| format!("parsing log level {directive:?}"))?;
    Ok(tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .event_format(LineFormat)
            .with_ansi(false)
            .with_writer(Mutex::new(file)),
    ))
}

/// Installs the global file logger.
pub fn init(config: &LogConfig) -> anyhow::Result<()> {
    file_subscriber(&config.path, &config.level)?
        .try_init()
        .context("installing the log subscriber")?;
    Ok(())
}
