use crate::{
    api::{
        error::ApiError,
        response::{flash_redirect, ApiResponse},
    },
    models::{FlashMessage, MessageLevel},
    service::AddOutcome,
    state::AppState,
    validation::AddAddressForm,
};
use axum::{
    extract::{rejection::FormRejection, rejection::QueryRejection, Path, Query, RawQuery, State},
    http::Uri,
    response::{Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

// GET /wallets/ query parameters, set by the redirect after an add
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    level: Option<MessageLevel>,
    message: Option<String>,
}

impl FlashQuery {
    fn into_message(self) -> Option<FlashMessage> {
        match (self.level, self.message) {
            (Some(level), Some(message)) => Some(FlashMessage { level, message }),
            _ => None,
        }
    }
}

// GET /wallets/{id}/ query parameters
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    page: Option<String>,
}

// Create router with all routes
pub fn create_router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/wallets/", get(list_addresses))
        .route("/wallets/add/", get(add_address_wrong_method).post(add_address))
        .route("/wallets/{id}/", get(address_detail))
        .route("/wallets", get(append_slash))
        .route("/wallets/add", get(append_slash).post(append_slash))
        .route("/wallets/{id}", get(append_slash))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

// GET /wallets/ handler
async fn list_addresses(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FlashQuery>, QueryRejection>,
) -> Result<ApiResponse<crate::models::AddressList>, ApiError> {
    let mut list = state.wallets().list().await?;
    list.message = query.ok().and_then(|Query(flash)| flash.into_message());
    Ok(ApiResponse::new(list))
}

// Slashless paths redirect to their canonical form; 308 keeps POST bodies
async fn append_slash(uri: Uri, RawQuery(query): RawQuery) -> Redirect {
    let target = match query {
        Some(query) => format!("{}/?{}", uri.path(), query),
        None => format!("{}/", uri.path()),
    };
    Redirect::permanent(&target)
}

// GET /wallets/{id}/ handler
async fn address_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DetailQuery>,
) -> Result<ApiResponse<crate::models::AddressDetail>, ApiError> {
    // Only integer ids name an address
    let id: i64 = id
        .parse()
        .map_err(|_| ApiError::NotFound(format!("address {}", id)))?;

    info!("Processing detail request for address id {}, page {:?}", id, params.page);
    let detail = state.wallets().detail(id, params.page.as_deref()).await?;
    Ok(ApiResponse::new(detail))
}

// POST /wallets/add/ handler
async fn add_address(
    State(state): State<Arc<AppState>>,
    form: Result<Form<AddAddressForm>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => {
            warn!("Unreadable add form: {}", rejection);
            AddAddressForm::default()
        }
    };

    let outcome = state.wallets().add(&form).await;
    flash_redirect(&outcome.message)
}

// GET /wallets/add/ handler
async fn add_address_wrong_method() -> Response {
    flash_redirect(&AddOutcome::wrong_method())
}
