use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), eden::Error> {
    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Setting up logging: {e}");
    }

    let config_path = std::env::args_os()
        .nth(1)
        .or_else(|| std::env::var_os("EDEN_CONFIG"))
        .map(PathBuf::from);

    let config = eden::Config::load(config_path.as_deref())?;
    let addr = config.socket_addr()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| eden::Error::Serve(e.into()))?;

    tracing::info!("Starting");

    let registry = prometheus::Registry::new();
    let state = eden::server::AppState::new(&config, registry)?;
    let app = eden::server::router(state, config.cors);

    runtime.block_on(async move {
        tracing::info!("Server listening at http://{}", addr);

        axum::Server::try_bind(&addr)
            .map_err(|e| eden::Error::Serve(e.into()))?
            .serve(app.into_make_service())
            .with_graceful_shutdown(async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    tracing::error!("Waiting for Ctrl-C {:?}", e);
                }
                tracing::info!("Shutting down");
            })
            .await
            .map_err(|e| eden::Error::Serve(e.into()))
    })
}
