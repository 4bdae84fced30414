use user_service_axum::{ServiceConfig, UserService, user_service_router};

mod server;

use crate::server::{init_tracing, listen_addr, serve};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ServiceConfig::from_env()?;
    tracing::info!(
        "Starting user service: database={}, max_connections={}",
        config.storage.database_url,
        config.storage.max_connections
    );

    let service = UserService::new(config).await?;
    let app = user_service_router(service.clone());

    serve(listen_addr()?, app, service).await
}
