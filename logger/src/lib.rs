//! Synapse's logging utilities.

use std::{
    fmt::{self, Debug},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, OnceLock,
    },
};

use color_eyre::{eyre::eyre, Report, Result};
pub use synapse_config::logger::{Config, Format, Level, UserLayer as UserConfigLayer};
use synapse_config::{logger::into_tracing_level, Complete as _};
use tracing::subscriber::set_global_default;
pub use tracing::{
    debug, debug_span, error, error_span, info, info_span, instrument as log, trace, trace_span,
    warn, warn_span, Instrument,
};
pub use tracing_subscriber::reload::Error as ReloadError;
use tracing_subscriber::{
    filter::LevelFilter,
    fmt::{format::DefaultFields, MakeWriter},
    layer::SubscriberExt,
    registry::Registry,
    reload,
};

static LOGGER_SET: AtomicBool = AtomicBool::new(false);

fn try_set_logger() -> Result<()> {
    if LOGGER_SET
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(eyre!("Logger is already set."));
    }
    Ok(())
}

type ReloadFn = dyn Fn(LevelFilter) -> Result<(), ReloadError> + Send + Sync;

/// Handle to the global logger, used to change the level at run time.
#[derive(Clone)]
pub struct LoggerHandle {
    reload: Arc<ReloadFn>,
}

impl Debug for LoggerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerHandle").finish_non_exhaustive()
    }
}

impl LoggerHandle {
    /// Reload the log level filter.
    ///
    /// # Errors
    /// If the subscriber the filter belongs to is gone.
    pub fn reload_level(&self, new_value: Level) -> Result<(), Error> {
        let filter = LevelFilter::from_level(into_tracing_level(new_value));
        (self.reload)(filter).map_err(Error::LevelReload)
    }
}

/// Possible errors that might occur while interacting with the logger.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// If dynamic log level reloading failed
    #[error("cannot dynamically reload the log level")]
    LevelReload(#[source] ReloadError),
}

/// Initializes the logger globally with given [`Config`].
///
/// Returns [`LoggerHandle`] to interact with the logger instance
///
/// Works only once per process, all subsequent invocations will fail.
///
/// For usage in tests consider [`test_logger`].
///
/// # Errors
/// If the logger is already set, raises a generic error.
pub fn init_global(configuration: &Config, terminal_colors: bool) -> Result<LoggerHandle> {
    try_set_logger()?;
    step1(configuration, stdout_layer(terminal_colors))
}

/// Returns once lazily initialised global logger for testing purposes.
///
/// # Panics
/// If [`init_global`] or [`disable_global`] were called first.
pub fn test_logger() -> LoggerHandle {
    static LOGGER: OnceLock<LoggerHandle> = OnceLock::new();

    LOGGER
        .get_or_init(|| {
            let config = UserConfigLayer {
                level: Some(Level::DEBUG),
                format: Some(Format::Pretty),
            }
            .complete()
            .expect("should not fail because other fields have defaults");

            try_set_logger()
                .and_then(|()| {
                    let layer = tracing_subscriber::fmt::layer()
                        .with_ansi(true)
                        .with_test_writer();
                    step1(&config, layer)
                })
                .expect(
                    "`init_global()` or `disable_global()` should not be called before `test_logger()`",
                )
        })
        .clone()
}

/// Disables the logger globally, so that subsequent calls to [`init_global`] will fail.
///
/// # Errors
/// If global logger was already initialised/disabled.
pub fn disable_global() -> Result<()> {
    try_set_logger()
}

type FmtLayer<W> =
    tracing_subscriber::fmt::Layer<Registry, DefaultFields, tracing_subscriber::fmt::format::Format, W>;

fn stdout_layer(terminal_colors: bool) -> FmtLayer<fn() -> std::io::Stdout> {
    tracing_subscriber::fmt::layer().with_ansi(terminal_colors)
}

fn step1<W>(configuration: &Config, layer: FmtLayer<W>) -> Result<LoggerHandle>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    match configuration.format {
        Format::Full => step2(configuration, layer),
        Format::Compact => step2(configuration, layer.compact()),
        Format::Pretty => step2(configuration, layer.pretty()),
        Format::Json => step2(configuration, layer.json()),
    }
}

fn step2<L>(configuration: &Config, layer: L) -> Result<LoggerHandle>
where
    L: tracing_subscriber::Layer<Registry> + Send + Sync + 'static,
{
    let level_filter = LevelFilter::from_level(into_tracing_level(configuration.level));
    let (level_filter, level_filter_handle) = reload::Layer::new(level_filter);
    let subscriber = Registry::default()
        .with(layer)
        .with(level_filter)
        .with(tracing_error::ErrorLayer::default());
    set_global_default(subscriber)?;

    Ok(LoggerHandle {
        reload: Arc::new(move |filter: LevelFilter| level_filter_handle.reload(filter)),
    })
}

/// Installs the panic hook with [`color_eyre::install`] if it isn't installed yet
///
/// # Errors
/// Fails if [`color_eyre::install`] fails
pub fn install_panic_hook() -> Result<(), Report> {
    static INSTALLED: AtomicBool = AtomicBool::new(false);
    if INSTALLED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_ok()
    {
        color_eyre::install()
    } else {
        Ok(())
    }
}

pub mod prelude {
    //! Module with most used items. Crates using the `log` attribute still need `tracing` as a dependency

    pub use tracing::{self, debug, error, info, instrument as log, span, trace, warn, Span};
}
