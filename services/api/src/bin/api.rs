//! services/api/src/bin/api.rs

use api_lib::{
    adapters::{HttpPublisher, MemoryPublisher},
    config::Config,
    error::ApiError,
    web::{
        apply_action_handler, create_wizard_handler, delete_wizard_handler, get_wizard_handler,
        publish_wizard_handler, rest::ApiDoc, state::AppState,
    },
};
use axum::http::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Method,
};
use axum::{
    routing::{get, post},
    Router,
};
use course_wizard_core::ports::CoursePublisher;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Publisher Adapter ---
    let publisher: Arc<dyn CoursePublisher> = match &config.publish_url {
        Some(url) => {
            info!("Publishing courses to {}", url);
            let client = reqwest::Client::builder().build()?;
            Arc::new(HttpPublisher::new(
                client,
                url.clone(),
                config.publish_token.clone(),
            ))
        }
        None => {
            warn!("PUBLISH_URL is not set; published courses are kept in memory only.");
            Arc::new(MemoryPublisher::new())
        }
    };

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), publisher));

    let cors = CorsLayer::new()
        .allow_origin(config.cors_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    let api_router = Router::new()
        .route("/wizards", post(create_wizard_handler))
        .route(
            "/wizards/{wizard_id}",
            get(get_wizard_handler).delete(delete_wizard_handler),
        )
        .route("/wizards/{wizard_id}/actions", post(apply_action_handler))
        .route("/wizards/{wizard_id}/publish", post(publish_wizard_handler))
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
