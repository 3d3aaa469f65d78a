use std::sync::Arc;

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use shared::{ApiJson, ApiPath, ApiResult, DeleteResponse, SetupResponse};
use tower_http::trace::TraceLayer;

use crate::models::*;
use crate::store::RepairOrderStore;
use crate::validation::{validate_references, IdentifierValidator};
use crate::MIGRATIONS;

#[derive(Clone)]
pub struct AppState {
    pub store: RepairOrderStore,
    pub validator: Arc<dyn IdentifierValidator>,
    pub database_url: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/setup", post(setup_database))
        .route("/repair-orders", post(create_repair_order).get(list_repair_orders))
        .route(
            "/repair-orders/:id",
            get(get_repair_order)
                .put(update_repair_order)
                .delete(delete_repair_order),
        )
        .route("/health", get(health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
}

pub async fn setup_database(State(state): State<AppState>) -> ApiResult<Json<SetupResponse>> {
    let applied = shared::run_migrations(state.database_url.clone(), MIGRATIONS).await?;
    Ok(Json(SetupResponse::new(applied)))
}

/// Validates every referenced id against the reference data service before
/// anything is written.
pub async fn create_repair_order(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateRepairOrderRequest>,
) -> ApiResult<Json<RepairOrderResponse>> {
    validate_references(state.validator.as_ref(), &request.service_ids, request.employee_id).await?;

    let (new_order, service_ids) = request.into_new_order(chrono::Utc::now());
    let aggregate = state.store.create(new_order, service_ids).await?;
    Ok(Json(aggregate.try_into()?))
}

pub async fn list_repair_orders(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<RepairOrderResponse>>> {
    let orders = state
        .store
        .list()
        .await?
        .into_iter()
        .map(RepairOrderResponse::try_from)
        .collect::<ApiResult<Vec<_>>>()?;
    Ok(Json(orders))
}

pub async fn get_repair_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<RepairOrderResponse>> {
    let aggregate = state.store.get(id).await?;
    Ok(Json(aggregate.try_into()?))
}

pub async fn update_repair_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(request): ApiJson<UpdateRepairOrderRequest>,
) -> ApiResult<Json<RepairOrderResponse>> {
    let aggregate = state.store.update(id, request.into()).await?;
    Ok(Json(aggregate.try_into()?))
}

pub async fn delete_repair_order(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<DeleteResponse>> {
    state.store.delete(id).await?;
    Ok(Json(DeleteResponse::deleted("Repair order deleted")))
}

pub async fn health_check() -> &'static str {
    "OK"
}
