// src/transport/rest.rs - REST API Transport Layer
//! HTTP/JSON endpoints for order intake, status transitions, and the
//! dashboard aggregates.
//!
//! Every listing and dashboard endpoint resolves its query parameters into a
//! [`TimeWindow`] before touching the store, so the civil-day semantics are
//! identical across the surface. Handlers return [`crate::Error`] and let
//! the `IntoResponse` mapping below pick the status code.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, services::ServeFile, trace::TraceLayer,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    core::{
        order::{Order, OrderStatus, PlaceOrder},
        window::{TimeWindow, WindowParams},
    },
    engine::analytics::{DishCount, PeakHour, RepeatCustomer, SalesTotals},
    AppState, Error,
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Status transition request body.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

/// Query parameters for the repeat-customers endpoint. `month` accepts
/// `YYYY-MM` or a full date inside the month of interest.
#[derive(Debug, Default, Deserialize)]
pub struct RepeatParams {
    pub month: Option<String>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
    pub name: Option<String>,
}

impl RepeatParams {
    fn resolve_window(&self) -> crate::Result<TimeWindow> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            return TimeWindow::from_range(from, to);
        }

        let date = match &self.month {
            Some(month) => parse_month(month)?,
            None => Utc::now()
                .with_timezone(&crate::core::window::ist())
                .date_naive(),
        };
        TimeWindow::month_of(date)
    }
}

fn parse_month(s: &str) -> crate::Result<NaiveDate> {
    let candidate = if s.len() == 7 {
        format!("{s}-01")
    } else {
        s.to_string()
    };
    candidate
        .parse()
        .map_err(|_| Error::Validation(format!("invalid month: {s}")))
}

/// Build the service router.
pub fn create_router(state: AppState) -> Router {
    let menu = ServeFile::new(&state.config.server.menu_path);

    Router::new()
        // Order endpoints
        .route("/api/orders", get(list_orders).post(place_order))
        .route("/api/orders/:id/status", patch(update_status))
        // Dashboard endpoints
        .route("/api/dashboard/sales", get(dashboard_sales))
        .route("/api/dashboard/topdish", get(dashboard_top_dish))
        .route("/api/dashboard/repeatcustomers", get(dashboard_repeat_customers))
        .route("/api/dashboard/peakhour", get(dashboard_peak_hour))
        // System endpoints
        .route("/health", get(health_check))
        .route("/ws", get(super::ws::ws_handler))
        // Static catalog, served verbatim
        .route_service("/menu.json", menu)
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(CorsLayer::permissive()),
        )
}

/// Non-deleted orders in the requested window, newest first. With no
/// parameters this is the current civil day.
#[instrument(skip(state))]
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Vec<Order>>, Error> {
    let window = TimeWindow::resolve(&params, Utc::now())?;
    let orders = state.store.list_in_window(&window).await?;
    Ok(Json(orders))
}

/// Accept a new order and return the persisted record.
#[instrument(skip(state, request))]
async fn place_order(
    State(state): State<AppState>,
    Json(request): Json<PlaceOrder>,
) -> Result<Json<Order>, Error> {
    let order = state.engine.place_order(request).await?;
    Ok(Json(order))
}

/// Apply a status transition to an existing order.
#[instrument(skip(state, update))]
async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<Order>, Error> {
    let id = Uuid::parse_str(&id).map_err(|_| Error::Validation(format!("invalid order id: {id}")))?;
    let order = state
        .engine
        .transition_status(id, OrderStatus::from(update.status))
        .await?;
    Ok(Json(order))
}

#[instrument(skip(state))]
async fn dashboard_sales(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<SalesTotals>, Error> {
    let window = TimeWindow::resolve(&params, Utc::now())?;
    Ok(Json(state.analytics.sales_totals(&window).await?))
}

#[instrument(skip(state))]
async fn dashboard_top_dish(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<Option<DishCount>>, Error> {
    let window = TimeWindow::resolve(&params, Utc::now())?;
    Ok(Json(state.analytics.top_dish(&window).await?))
}

#[instrument(skip(state))]
async fn dashboard_repeat_customers(
    State(state): State<AppState>,
    Query(params): Query<RepeatParams>,
) -> Result<Json<Vec<RepeatCustomer>>, Error> {
    let window = params.resolve_window()?;
    let repeats = state
        .analytics
        .repeat_customers(&window, params.name.as_deref())
        .await?;
    Ok(Json(repeats))
}

#[instrument(skip(state))]
async fn dashboard_peak_hour(
    State(state): State<AppState>,
    Query(params): Query<WindowParams>,
) -> Result<Json<PeakHour>, Error> {
    let window = TimeWindow::resolve(&params, Utc::now())?;
    Ok(Json(state.analytics.peak_hour(&window).await?))
}

async fn health_check() -> &'static str {
    "OK"
}
