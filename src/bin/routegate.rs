use routegate::{cli, config};

fn init_tracing() {
    use tracing_subscriber::{
        filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt as _, Registry,
    };

    Registry::default()
        .with(
            fmt::Layer::new()
                .with_ansi(true)
                .with_target(true)
                .with_timer(fmt::time::ChronoLocal::rfc_3339())
                .with_writer(std::io::stderr),
        )
        .with(
            EnvFilter::try_from_env(config::env::LOG_DIRECTIVE)
                .or_else(|_| EnvFilter::try_new("info"))
                .unwrap(),
        )
        .init();
}

fn main() {
    init_tracing();

    // Navigation runs on a single event loop.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .on_thread_start(|| tracing::trace!("thread start"))
        .on_thread_stop(|| tracing::trace!("thread stop"))
        .enable_time()
        .build()
        .unwrap();

    runtime.block_on(async {
        if let Err(err) = cli::parse().run().await {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    })
}
