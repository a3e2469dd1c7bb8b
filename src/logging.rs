// Logging setup: runtime log levels, optional JSON file output, span timing
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use std::time::{Duration, Instant};

use eyre::{Result, WrapErr};
use tracing::{Id, Subscriber, debug, field::Field, field::Visit, span};
use tracing_subscriber::{
    EnvFilter, fmt,
    layer::{Context, Layer, SubscriberExt},
    util::SubscriberInitExt,
};

static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();

/// Directives: everything at `warn`, this crate and HTTP request traces at `level`
fn filter_directives(level: &str) -> String {
    format!("warn,hptu_portafolio={level},tower_http={level}")
}

fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_new(filter_directives(level))
        .unwrap_or_else(|_| EnvFilter::new("warn,hptu_portafolio=info"))
}

pub fn init_logging(bin_name: String) -> Result<()> {
    let console_log_level = env::var("CONSOLE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let file_log_level = env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
    let log_to_file = env::var("LOG_TO_FILE").map(|v| v == "true").unwrap_or(false);

    let console_layer = fmt::Layer::new()
        .pretty()
        .with_filter(build_filter(&console_log_level));

    if log_to_file {
        let timestamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let log_dir = Path::new("logs");
        fs::create_dir_all(log_dir).wrap_err("Failed to create log directory")?;
        let log_file_name = format!("{bin_name}_{timestamp}.log");

        let file_appender = tracing_appender::rolling::never(log_dir, log_file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        FILE_GUARD.set(guard).ok();

        // Structured JSON with UTC timestamps
        let file_layer = fmt::Layer::new()
            .json()
            .with_writer(non_blocking)
            .with_timer(fmt::time::UtcTime::rfc_3339())
            .with_filter(build_filter(&file_log_level));

        tracing_subscriber::registry()
            .with(console_layer)
            .with(file_layer)
            .with(SpanTimingLayer)
            .try_init()
            .wrap_err("Failed to set global tracing subscriber")?;
    } else {
        tracing_subscriber::registry()
            .with(console_layer)
            .with(SpanTimingLayer)
            .try_init()
            .wrap_err("Failed to set global tracing subscriber")?;
    }

    Ok(())
}

// Reports busy/idle time for spans declared with `on_close = true`
struct SpanTimingLayer;

struct StartInstant(Instant);
struct LastInstant(Instant);
struct BusyTime(Duration);
struct IdleTime(Duration);

struct OnCloseVisitor<'a> {
    on_close: &'a mut bool,
}

impl Visit for OnCloseVisitor<'_> {
    fn record_bool(&mut self, field: &Field, value: bool) {
        if field.name() == "on_close" {
            *self.on_close = value;
        }
    }

    fn record_debug(&mut self, _field: &Field, _value: &dyn std::fmt::Debug) {}
}

impl<S> Layer<S> for SpanTimingLayer
where
    S: Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &span::Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut on_close = false;
        attrs.record(&mut OnCloseVisitor { on_close: &mut on_close });
        if on_close {
            let mut extensions = span.extensions_mut();
            let now = Instant::now();
            extensions.insert(StartInstant(now));
            extensions.insert(LastInstant(now));
            extensions.insert(BusyTime(Duration::ZERO));
            extensions.insert(IdleTime(Duration::ZERO));
        }
    }

    // Time between exit and the next enter counts as idle, enter to exit as busy
    fn on_enter(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut exts = span.extensions_mut();
        if exts.get_mut::<StartInstant>().is_none() {
            return;
        }
        let last = exts.remove::<LastInstant>().map(|li| li.0).unwrap_or_else(Instant::now);
        let idle = exts.remove::<IdleTime>().map(|it| it.0).unwrap_or(Duration::ZERO);
        exts.insert(IdleTime(idle + last.elapsed()));
        exts.insert(LastInstant(Instant::now()));
    }

    fn on_exit(&self, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else { return };
        let mut exts = span.extensions_mut();
        if exts.get_mut::<StartInstant>().is_none() {
            return;
        }
        let last = exts.remove::<LastInstant>().map(|li| li.0).unwrap_or_else(Instant::now);
        let busy = exts.remove::<BusyTime>().map(|bt| bt.0).unwrap_or(Duration::ZERO);
        exts.insert(BusyTime(busy + last.elapsed()));
        exts.insert(LastInstant(Instant::now()));
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else { return };
        let mut exts = span.extensions_mut();
        if let Some(StartInstant(start)) = exts.remove::<StartInstant>() {
            let busy_time = exts.remove::<BusyTime>().map(|bt| bt.0).unwrap_or(Duration::ZERO);
            let idle_time = exts.remove::<IdleTime>().map(|it| it.0).unwrap_or(Duration::ZERO);
            debug!(
                span = span.name(),
                busy_time = ?busy_time,
                idle_time = ?idle_time,
                total_time = ?start.elapsed(),
                "span closed"
            );
        }
    }
}
