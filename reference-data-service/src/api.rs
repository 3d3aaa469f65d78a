use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use shared::{ApiJson, ApiPath, ApiResult, DeleteResponse, SetupResponse};
use tower_http::trace::TraceLayer;

use crate::models::*;
use crate::store::ReferenceStore;
use crate::MIGRATIONS;

#[derive(Clone)]
pub struct AppState {
    pub store: ReferenceStore,
    pub database_url: String,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/setup", post(setup_database))
        .route("/services", post(create_service).get(list_services))
        .route("/services/:id", get(get_service).delete(delete_service))
        .route("/employees", post(create_employee).get(list_employees))
        .route("/employees/:id", get(get_employee).delete(delete_employee))
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

pub async fn create_service(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateServiceRequest>,
) -> ApiResult<Json<ServiceResponse>> {
    let new_service = NewService::try_from(request)?;
    let service = state.store.create_service(new_service).await?;
    Ok(Json(service.into()))
}

pub async fn list_services(State(state): State<AppState>) -> ApiResult<Json<Vec<ServiceResponse>>> {
    let services = state.store.list_services().await?;
    Ok(Json(services.into_iter().map(ServiceResponse::from).collect()))
}

pub async fn get_service(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<ServiceResponse>> {
    let service = state.store.get_service(id).await?;
    Ok(Json(service.into()))
}

pub async fn delete_service(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<DeleteResponse>> {
    state.store.delete_service(id).await?;
    Ok(Json(DeleteResponse::deleted("Service deleted")))
}

pub async fn create_employee(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<NewEmployee>,
) -> ApiResult<Json<Employee>> {
    let employee = state.store.create_employee(request).await?;
    Ok(Json(employee))
}

pub async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<Employee>>> {
    Ok(Json(state.store.list_employees().await?))
}

pub async fn get_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<Employee>> {
    Ok(Json(state.store.get_employee(id).await?))
}

pub async fn delete_employee(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> ApiResult<Json<DeleteResponse>> {
    state.store.delete_employee(id).await?;
    Ok(Json(DeleteResponse::deleted("Employee deleted")))
}

pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    // Database-backed tests only run when TEST_DATABASE_URL points at a
    // scratch Postgres database.
    async fn test_app() -> Option<Router> {
        let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
        shared::run_migrations(database_url.clone(), MIGRATIONS)
            .await
            .expect("migrations");
        let pool = shared::build_pool(&database_url).await.expect("pool");
        Some(create_router(AppState {
            store: ReferenceStore::new(pool),
            database_url,
        }))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    // Never connects: only usable by requests that fail before touching
    // storage.
    fn offline_app() -> Router {
        let pool = diesel_async::pooled_connection::bb8::Pool::builder().build_unchecked(
            diesel_async::pooled_connection::AsyncDieselConnectionManager::new(
                "postgres://127.0.0.1:1/unused",
            ),
        );
        create_router(AppState {
            store: ReferenceStore::new(pool),
            database_url: String::new(),
        })
    }

    #[tokio::test]
    async fn health_check_needs_no_database() {
        let response = offline_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn malformed_id_gets_json_error_body() {
        let app = offline_app();

        let (status, body) = send(&app, "GET", "/services/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());

        let (status, body) = send(&app, "DELETE", "/employees/1.5", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn incomplete_body_gets_json_error_body() {
        let (status, body) = send(
            &offline_app(),
            "POST",
            "/services",
            Some(json!({"name": "Oil Change", "price": 29.99})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("duration_minutes"));
    }

    #[tokio::test]
    async fn created_service_reads_back_identically() {
        let Some(app) = test_app().await else { return };

        let (status, created) = send(
            &app,
            "POST",
            "/services",
            Some(json!({"name": "Oil Change", "price": 29.99, "duration_minutes": 20})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, "GET", &format!("/services/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched, created);
        assert_eq!(fetched["name"], "Oil Change");
        assert_eq!(fetched["price"], 29.99);
        assert_eq!(fetched["duration_minutes"], 20);

        let (_, listed) = send(&app, "GET", "/services", None).await;
        assert!(listed.as_array().unwrap().iter().any(|s| s["id"] == created["id"]));
    }

    #[tokio::test]
    async fn created_employee_reads_back_identically() {
        let Some(app) = test_app().await else { return };

        let (status, created) = send(
            &app,
            "POST",
            "/employees",
            Some(json!({"full_name": "Jane Doe", "position": "Mechanic"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let id = created["id"].as_i64().unwrap();

        let (status, fetched) = send(&app, "GET", &format!("/employees/{}", id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["full_name"], "Jane Doe");
        assert_eq!(fetched["position"], "Mechanic");
        assert_eq!(fetched["id"], created["id"]);
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let Some(app) = test_app().await else { return };

        let (_, created) = send(
            &app,
            "POST",
            "/employees",
            Some(json!({"full_name": "John Roe", "position": "Painter"})),
        )
        .await;
        let uri = format!("/employees/{}", created["id"]);

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);

        let (status, body) = send(&app, "DELETE", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Employee not found");

        let (status, _) = send(&app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn missing_service_is_not_found() {
        let Some(app) = test_app().await else { return };

        let (status, body) = send(&app, "DELETE", "/services/2147483647", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Service not found");

        let (status, _) = send(&app, "GET", "/services/2147483647", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn prices_are_stored_without_rounding() {
        let Some(app) = test_app().await else { return };

        for price in [12.345, 0.005, 123456789.5] {
            let (status, created) = send(
                &app,
                "POST",
                "/services",
                Some(json!({"name": "Precise Service", "price": price, "duration_minutes": 15})),
            )
            .await;
            assert_eq!(status, StatusCode::OK, "creating service priced {}", price);
            assert_eq!(created["price"], price);

            let (status, fetched) = send(&app, "GET", &format!("/services/{}", created["id"]), None).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(fetched["price"], price);
        }
    }
}
