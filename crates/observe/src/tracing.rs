use {
    crate::config::Config,
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes the global tracing subscriber and routes panics through it.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    set_tracing_subscriber(config);
    std::panic::set_hook(Box::new(tracing_panic_hook));
}

/// Like [`initialize`], but can be called multiple times in a row. Later calls
/// are ignored.
///
/// Useful for tests.
pub fn initialize_reentrant(env_filter: &str) {
    // The subscriber is a global object so initializing it again in the same
    // process would fail.
    static ONCE: Once = Once::new();
    ONCE.call_once(|| {
        initialize(&Config::default().with_env_filter(env_filter));
    });
}

fn set_tracing_subscriber(config: &Config) {
    // Events at least as severe as the threshold go to stderr, the rest to
    // stdout.
    let writer = std::io::stderr
        .with_max_level(
            config
                .stderr_threshold
                .into_level()
                .unwrap_or(tracing::Level::ERROR),
        )
        .or_else(std::io::stdout);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_timer(UtcTime::new(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )));
    let env_filter = EnvFilter::new(&config.env_filter);

    let layer = if config.use_json_format {
        layer.json().with_filter(env_filter).boxed()
    } else {
        layer
            .with_ansi(std::io::stdout().is_terminal())
            .with_filter(env_filter)
            .boxed()
    };

    // `try_init` so that a subscriber installed by a test harness wins.
    if tracing_subscriber::registry().with(layer).try_init().is_ok() {
        tracing::debug!(
            filter = %config.env_filter,
            json = config.use_json_format,
            "initialized logging"
        );
    }
}

/// Reports panics as `error` events so they end up in the configured log
/// format and destination.
fn tracing_panic_hook(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let name = thread.name().unwrap_or("<unnamed>");
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!("thread '{name}' {panic}\nstack backtrace:\n{backtrace}");
}

#[cfg(test)]
mod tests {
    use {super::*, tracing::level_filters::LevelFilter};

    #[test]
    fn reentrant_initialization() {
        initialize_reentrant("debug");
        initialize_reentrant("trace");
        tracing::info!("still logging after repeated initialization");
    }

    #[test]
    fn level_filter_maps_to_stderr_level() {
        assert_eq!(LevelFilter::WARN.into_level(), Some(tracing::Level::WARN));
        assert_eq!(LevelFilter::OFF.into_level(), None);
    }
}
