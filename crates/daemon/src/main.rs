use std::net::SocketAddr;
use std::sync::Arc;

use relayci_core::config::ClientConfig;
use relayci_exec::api::ExecClient;
use relayci_hooks::registry::HookRegistry;
use relayci_pipeline::dispatcher::{event_queue, Dispatcher};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod listener;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "relayci=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path =
        std::env::var("RELAYCI_CONFIG").unwrap_or_else(|_| "clientconfig.json".into());
    let config = ClientConfig::from_file(&config_path).expect("Failed to load client config");
    tracing::info!(path = %config_path, "Client config loaded");

    let registry = Arc::new(HookRegistry::new());
    relayci_hooks::builtin::register_builtin(&registry)
        .expect("Failed to register builtin hooks");

    let backend = ExecClient::new(config.server_addr.clone());
    let dispatcher = Dispatcher::new(Arc::clone(&registry), backend, config);

    let (queue, events) = event_queue();
    let cancel = CancellationToken::new();

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8000".into())
        .parse()
        .expect("PORT must be a number");
    let addr = SocketAddr::new(host.parse().expect("Invalid HOST"), port);

    let app = listener::router(queue);
    let tcp = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind webhook listener");
    tracing::info!("Listening for webhook deliveries on {addr}");

    let server_cancel = cancel.clone();
    let server = tokio::spawn(async move {
        axum::serve(tcp, app)
            .with_graceful_shutdown(async move { server_cancel.cancelled().await })
            .await
            .expect("Webhook listener failed");
    });

    let dispatch_cancel = cancel.clone();
    let dispatch = tokio::spawn(async move {
        dispatcher.serve(events, dispatch_cancel).await;
    });

    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    tracing::info!("Shutdown signal received, draining");
    cancel.cancel();

    let _ = tokio::join!(server, dispatch);
    tracing::info!("Shutdown complete");
}
