use std::net::SocketAddr;

use tower_http::cors::{Any, CorsLayer};
use tracing::{info, Level};

use fluid_budget_backend::rest::{create_router, AppState};
use fluid_budget_backend::{Backend, DbConnection};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .init();

    info!("Setting up database");
    let connection = DbConnection::init().await?;
    let backend = Backend::new(connection)?;
    let state = AppState::new(backend);

    // CORS setup to allow a local frontend to make requests
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state).layer(cors);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
