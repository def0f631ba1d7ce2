mod api;
mod middleware;
mod session;

use katalog_core::CategorySet;
use katalog_upstream::UpstreamClient;
use tracing_subscriber::EnvFilter;

use crate::{
    api::{build_app, AppState},
    session::TokenStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = katalog_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let categories = match &config.categories_path {
        Some(path) => katalog_core::load_categories(path)?,
        None => CategorySet::builtin(),
    };

    let upstream = UpstreamClient::new(
        &config.upstream_base_url,
        config.upstream_timeout_secs,
        &config.upstream_user_agent,
    )?;

    tracing::info!(
        env = %config.env,
        upstream = %config.upstream_base_url,
        categories = categories.len(),
        "starting katalog server"
    );

    let app = build_app(AppState::new(upstream, TokenStore::default(), categories));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
