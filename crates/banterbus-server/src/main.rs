use std::sync::Arc;

use banterbus_management::ManagementClient;
use banterbus_server::config::Settings;
use banterbus_server::store::MongoStore;
use banterbus_server::transport::WsTransport;
use banterbus_server::{AppState, build_app};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let settings = Settings::from_env();
    let listen_addr = format!("{}:{}", settings.web_host, settings.web_port);

    let client = mongodb::Client::with_uri_str(&settings.db_uri)
        .await
        .unwrap_or_else(|e| panic!("Failed to connect to {}: {e}", settings.db_uri));
    let db = client.database(&settings.db_name);
    let store = Arc::new(MongoStore::new(&db));
    if let Err(e) = store.ensure_indexes().await {
        tracing::error!(error = %e, "failed to create store indexes");
        std::process::exit(1);
    }

    let management = Arc::new(ManagementClient::new(settings.management_url()));
    let transport = Arc::new(WsTransport::new());

    let state = AppState::new(
        settings,
        Arc::clone(&store) as _,
        Arc::clone(&store) as _,
        store as _,
        Arc::clone(&management) as _,
        management as _,
        transport as _,
    );

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {listen_addr}: {e}"));

    tracing::info!("banterbus core API listening on {listen_addr}");

    axum::serve(listener, app).await.expect("Server error");
}
