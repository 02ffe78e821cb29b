use tracing::Level;
use tracing_subscriber::FmtSubscriber;
use tracing_subscriber::fmt::time::ChronoLocal;

/// Install a stderr subscriber: 0 = warnings, 1 = info, 2 = debug, 3+ = trace.
pub fn init(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_timer(ChronoLocal::new("%x - %I:%M.%S%p".to_string()))
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}
