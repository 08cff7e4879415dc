//! HTTP surface of the address inventory.

use axum::extract::rejection::PathRejection;
use axum::extract::{OriginalUri, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch};
use axum::{middleware, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::address::{codec, AddressRecord, AddressService};
use crate::error::AddressError;
use crate::logger::{log_requests, Logger};
use crate::store::AddressStore;

pub const ADDRESS_API: &str = "/api/address";

/// Wire form of an address record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressDto {
    pub address: String,
    pub acquired: bool,
}

impl From<AddressRecord> for AddressDto {
    fn from(record: AddressRecord) -> Self {
        Self { address: codec::encode(record.address), acquired: record.acquired }
    }
}

/// Body of every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "errorMessage")]
    pub error_message: String,
    #[serde(rename = "requestedURI")]
    pub requested_uri: String,
}

/// An [`AddressError`] tied to the request that caused it.
#[derive(Debug)]
pub struct ApiError {
    error: AddressError,
    requested_uri: String,
}

impl ApiError {
    fn new(error: AddressError, uri: &OriginalUri) -> Self {
        Self { error, requested_uri: uri.0.path().to_string() }
    }

    fn status(&self) -> StatusCode {
        match self.error {
            AddressError::InvalidAddress(_) | AddressError::InvalidCidr(_) | AddressError::InvalidPage(_) => {
                StatusCode::BAD_REQUEST
            }
            AddressError::NotFound(_) => StatusCode::NOT_FOUND,
            AddressError::Overlap(_) => StatusCode::CONFLICT,
            AddressError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = if status.is_server_error() {
            error!(uri = %self.requested_uri, "request failed: {}", self.error);
            "internal server error".to_string()
        } else {
            warn!(uri = %self.requested_uri, status = status.as_u16(), "request rejected: {}", self.error);
            self.error.to_string()
        };
        let body = ErrorResponse { error_message, requested_uri: self.requested_uri };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

/// Builds the address API router around `service`.
pub fn create_router<S>(service: AddressService<S>) -> Router
where
    S: AddressStore + ?Sized + 'static,
{
    // `/:first/:second` serves both block registration (POST) and paging (GET).
    // A POST to `acquire/..` or `release/..` is a block registration whose network
    // address is not an address at all.
    Router::new()
        .route(ADDRESS_API, get(list_all::<S>).delete(delete_all::<S>))
        .route(&format!("{ADDRESS_API}/count"), get(count::<S>))
        .route(
            &format!("{ADDRESS_API}/acquire/:address"),
            patch(acquire::<S>).post(reject_reserved_block),
        )
        .route(
            &format!("{ADDRESS_API}/release/:address"),
            patch(release::<S>).post(reject_reserved_block),
        )
        .route(
            &format!("{ADDRESS_API}/:first/:second"),
            get(list_page::<S>).post(add_block::<S>),
        )
        .with_state(service)
}

/// Appends a line per request to the request log.
pub fn with_request_log(router: Router, logger: Logger) -> Router {
    router.layer(middleware::from_fn_with_state(logger, log_requests))
}

fn address_param(path: Result<Path<String>, PathRejection>, uri: &OriginalUri) -> ApiResult<String> {
    match path {
        Ok(Path(address)) => Ok(address),
        Err(rejection) => {
            let reason = format!("invalid address: {}", rejection.body_text());
            Err(ApiError::new(AddressError::InvalidAddress(reason), uri))
        }
    }
}

fn pair_params(
    path: Result<Path<(String, String)>, PathRejection>,
    uri: &OriginalUri,
    invalid: fn(String) -> AddressError,
) -> ApiResult<(String, String)> {
    match path {
        Ok(Path(pair)) => Ok(pair),
        Err(rejection) => Err(ApiError::new(invalid(rejection.body_text()), uri)),
    }
}

async fn acquire<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<AddressDto>> {
    let address = address_param(path, &uri)?;
    let record = service.acquire(&address).await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(Json(record.into()))
}

async fn release<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
    path: Result<Path<String>, PathRejection>,
) -> ApiResult<Json<AddressDto>> {
    let address = address_param(path, &uri)?;
    let record = service.release(&address).await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(Json(record.into()))
}

async fn add_block<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<String> {
    let (network_address, cidr_mask) = pair_params(path, &uri, AddressError::InvalidCidr)?;
    let mask_bits: i64 = cidr_mask.parse().map_err(|_| {
        let reason = format!("CIDR block {network_address}/{cidr_mask} has a non-numeric mask");
        ApiError::new(AddressError::InvalidCidr(reason), &uri)
    })?;
    let count = service
        .add_block(&network_address, mask_bits)
        .await
        .map_err(|e| ApiError::new(e, &uri))?;
    Ok(count.to_string())
}

async fn reject_reserved_block(uri: OriginalUri) -> ApiError {
    let block = uri.0.path().trim_start_matches(ADDRESS_API).trim_start_matches('/').to_string();
    let reason = format!("CIDR block {block} does not start with an IPv4 network address");
    ApiError::new(AddressError::InvalidCidr(reason), &uri)
}

async fn list_all<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
) -> ApiResult<Json<Vec<AddressDto>>> {
    let records = service.list_all().await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(Json(records.into_iter().map(AddressDto::from).collect()))
}

async fn list_page<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Json<Vec<AddressDto>>> {
    let (page_num, page_size) = pair_params(path, &uri, AddressError::InvalidPage)?;
    let (Ok(number), Ok(size)) = (page_num.parse::<u64>(), page_size.parse::<u64>()) else {
        let reason = format!("page {page_num} of size {page_size} is not a valid page");
        return Err(ApiError::new(AddressError::InvalidPage(reason), &uri));
    };
    let records = service.list_page(number, size).await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(Json(records.into_iter().map(AddressDto::from).collect()))
}

async fn count<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
) -> ApiResult<String> {
    let count = service.count().await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(count.to_string())
}

async fn delete_all<S: AddressStore + ?Sized + 'static>(
    State(service): State<AddressService<S>>,
    uri: OriginalUri,
) -> ApiResult<StatusCode> {
    service.delete_all().await.map_err(|e| ApiError::new(e, &uri))?;
    Ok(StatusCode::OK)
}
