//! HTTP API over the fleet registry.
//!
//! Endpoints:
//!   GET  /cars                              → available cars (JSON array)
//!   POST /cars                              → register a car (201)
//!   POST /cars/{registration}/rentals       → rent a car
//!   POST /cars/{registration}/returns       → return a car
//!
//! Rent and return are strict: renting a rented car or returning an
//! available one is a 409, an unknown registration is a 404.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

use crate::error::{ErrorKind, FleetError, Result};
use crate::registry::{Car, FleetRegistry, NewCar};

/// Shared state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<FleetRegistry>,
}

impl AppState {
    pub fn new(registry: FleetRegistry) -> Self {
        Self { registry: Arc::new(registry) }
    }
}

// ──────────────── errors ──────────────────────────────────────────────────

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::BadRequest => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for FleetError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        match kind {
            ErrorKind::Internal => error!(error = %self, "Request failed"),
            _ => warn!(error = %self, "Request rejected"),
        }
        (
            kind.status_code(),
            Json(serde_json::json!({"error": self.to_string()})),
        )
            .into_response()
    }
}

// ──────────────── router ──────────────────────────────────────────────────

/// Build the axum router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/cars", get(handle_list_available).post(handle_add_car))
        .route("/cars/{registration}/rentals", post(handle_rent_car))
        .route("/cars/{registration}/returns", post(handle_return_car))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the HTTP server and run until CTRL+C.
pub async fn start_server(state: AppState, bind: &str, port: u16) -> Result<()> {
    let app = build_router(state);
    let addr = format!("{bind}:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(port, "HTTP API listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received CTRL+C, shutting down…"),
        Err(e) => error!(error = %e, "Signal error"),
    }
}

/// Run a store call off the async workers.
async fn with_registry<T, F>(state: &AppState, op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce(&FleetRegistry) -> Result<T> + Send + 'static,
{
    let registry = Arc::clone(&state.registry);
    tokio::task::spawn_blocking(move || op(&registry))
        .await
        .map_err(|e| FleetError::Worker(e.to_string()))?
}

// ──────────────── handlers ────────────────────────────────────────────────

async fn handle_list_available(State(state): State<AppState>) -> Result<Json<Vec<Car>>> {
    let cars = with_registry(&state, |r| r.list_available()).await?;
    Ok(Json(cars))
}

/// The body is decoded here rather than by the `Json` extractor so every
/// malformed payload maps to 400.
async fn handle_add_car(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Car>)> {
    let new_car: NewCar = serde_json::from_slice(&body)
        .map_err(|e| FleetError::BadRequest(format!("Invalid car payload: {e}")))?;

    let car = with_registry(&state, move |r| r.add_car(&new_car)).await?;
    info!(id = car.id, registration = %car.registration, model = %car.model, "Car added");
    Ok((StatusCode::CREATED, Json(car)))
}

async fn handle_rent_car(
    State(state): State<AppState>,
    Path(registration): Path<String>,
) -> Result<Json<Car>> {
    let car = with_registry(&state, move |r| r.rent_car(&registration)).await?;
    info!(id = car.id, registration = %car.registration, "Car rented");
    Ok(Json(car))
}

async fn handle_return_car(
    State(state): State<AppState>,
    Path(registration): Path<String>,
) -> Result<Json<Car>> {
    let car = with_registry(&state, move |r| r.return_car(&registration)).await?;
    info!(id = car.id, registration = %car.registration, "Car returned");
    Ok(Json(car))
}
