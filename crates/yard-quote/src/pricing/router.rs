use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::business::BusinessConfig;
use super::domain::BusinessId;
use super::provider::{ConfigStore, ConfigStoreError};
use super::request::QuoteRequest;
use super::service::{QuoteService, QuoteServiceError};

/// Router builder exposing quoting and tenant configuration endpoints.
pub fn quote_router<S>(service: Arc<QuoteService<S>>) -> Router
where
    S: ConfigStore + 'static,
{
    Router::new()
        .route("/api/v1/quotes/calculate", post(calculate_handler::<S>))
        .route("/api/v1/quotes/validate", post(validate_handler::<S>))
        .route(
            "/api/v1/businesses/:business_id/config",
            get(config_handler::<S>).put(replace_config_handler::<S>),
        )
        .route(
            "/api/v1/businesses/:business_id/add-ons",
            get(add_ons_handler::<S>),
        )
        .with_state(service)
}

/// Run a service call on the blocking pool; stores may read from disk.
async fn on_blocking_pool<S, T, F>(service: Arc<QuoteService<S>>, call: F) -> Result<T, Response>
where
    S: ConfigStore + 'static,
    T: Send + 'static,
    F: FnOnce(&QuoteService<S>) -> T + Send + 'static,
{
    tokio::task::spawn_blocking(move || call(&service))
        .await
        .map_err(|err| {
            tracing::error!(error = %err, "quote service task did not complete");
            let payload = json!({
                "error": "request could not be completed",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        })
}

pub(crate) async fn calculate_handler<S>(
    State(service): State<Arc<QuoteService<S>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    S: ConfigStore + 'static,
{
    let outcome = match on_blocking_pool(service, move |service| service.quote(&request)).await {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };
    match outcome {
        Ok(quote) => (StatusCode::OK, axum::Json(quote)).into_response(),
        Err(QuoteServiceError::Validation(errors)) => {
            let payload = json!({
                "error": "quote request is invalid",
                "fields": errors.errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        Err(other) => {
            // Operators see the detail in the logs; the caller gets a generic message.
            tracing::error!(error = %other, "quote could not be priced");
            let payload = json!({
                "error": "quote could not be priced",
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn validate_handler<S>(
    State(service): State<Arc<QuoteService<S>>>,
    axum::Json(request): axum::Json<QuoteRequest>,
) -> Response
where
    S: ConfigStore + 'static,
{
    let report = match on_blocking_pool(service, move |service| service.validate(&request)).await {
        Ok(report) => report,
        Err(response) => return response,
    };
    let payload = json!({
        "valid": report.is_valid(),
        "errors": report.errors,
        "warnings": report.warnings,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}

pub(crate) async fn config_handler<S>(
    State(service): State<Arc<QuoteService<S>>>,
    Path(business_id): Path<String>,
) -> Response
where
    S: ConfigStore + 'static,
{
    let business_id = BusinessId::new(business_id);
    match on_blocking_pool(service, move |service| service.config(&business_id)).await {
        Ok(resolved) => (StatusCode::OK, axum::Json(resolved)).into_response(),
        Err(response) => response,
    }
}

pub(crate) async fn replace_config_handler<S>(
    State(service): State<Arc<QuoteService<S>>>,
    Path(business_id): Path<String>,
    axum::Json(config): axum::Json<BusinessConfig>,
) -> Response
where
    S: ConfigStore + 'static,
{
    let business_id = BusinessId::new(business_id);
    let outcome = match on_blocking_pool(service, move |service| {
        service.replace_config(&business_id, config)
    })
    .await
    {
        Ok(outcome) => outcome,
        Err(response) => return response,
    };
    match outcome {
        Ok(config) => (StatusCode::OK, axum::Json(config)).into_response(),
        Err(QuoteServiceError::Configuration(error)) => {
            let payload = json!({
                "error": error.to_string(),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(QuoteServiceError::Store(ConfigStoreError::InvalidKey(key))) => {
            let payload = json!({
                "error": format!("business id '{key}' is not allowed"),
            });
            (StatusCode::BAD_REQUEST, axum::Json(payload)).into_response()
        }
        Err(QuoteServiceError::Store(ConfigStoreError::Unavailable(reason))) => {
            let payload = json!({
                "error": format!("configuration store unavailable: {reason}"),
            });
            (StatusCode::SERVICE_UNAVAILABLE, axum::Json(payload)).into_response()
        }
        Err(other) => {
            let payload = json!({
                "error": other.to_string(),
            });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn add_ons_handler<S>(
    State(service): State<Arc<QuoteService<S>>>,
    Path(business_id): Path<String>,
) -> Response
where
    S: ConfigStore + 'static,
{
    let business_id = BusinessId::new(business_id);
    let lookup_id = business_id.clone();
    let add_ons = match on_blocking_pool(service, move |service| {
        service.available_add_ons(&lookup_id)
    })
    .await
    {
        Ok(add_ons) => add_ons,
        Err(response) => return response,
    };
    let payload = json!({
        "businessId": business_id,
        "addOns": add_ons,
    });
    (StatusCode::OK, axum::Json(payload)).into_response()
}
