//! # API REST
//!
//! REST API implementation for RaktMap.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, bearer tokens)
//!
//! Uses `api-shared` for wire types and token handling, and `raktmap-core` for everything else.

#![warn(rust_2018_idioms)]

pub mod auth;
pub mod error;
mod handlers;

use api_shared::AuthConfig;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use raktmap_core::{
    AccountService, BloodRequestService, CoreConfig, Dispatcher, DonorRegistry, DonorService,
    RequestStore, SmsGateway, UserStore,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across REST handlers.
#[derive(Clone)]
pub struct AppState {
    pub(crate) accounts: AccountService,
    pub(crate) donors: DonorService,
    pub(crate) requests: BloodRequestService,
    pub(crate) auth: Arc<AuthConfig>,
}

impl AppState {
    /// Wires every service to one backing store and SMS gateway.
    pub fn new<S>(
        cfg: &CoreConfig,
        store: Arc<S>,
        gateway: Arc<dyn SmsGateway>,
        auth: AuthConfig,
    ) -> Self
    where
        S: DonorRegistry + RequestStore + UserStore + 'static,
    {
        let dispatcher = Arc::new(Dispatcher::from_config(cfg, gateway));
        tracing::info!(
            "dispatching with {} matching, up to {} concurrent send(s)",
            dispatcher.policy(),
            cfg.max_concurrent_sends()
        );

        Self {
            accounts: AccountService::new(store.clone()),
            donors: DonorService::new(store.clone()),
            requests: BloodRequestService::new(store.clone(), store, dispatcher),
            auth: Arc::new(auth),
        }
    }
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::register,
        handlers::login,
        handlers::dashboard,
        handlers::create_blood_request,
        handlers::list_blood_requests,
        handlers::get_blood_request,
        handlers::list_donors,
        handlers::create_donor,
    ),
    components(schemas(
        api_shared::HealthRes,
        api_shared::MessageRes,
        api_shared::ErrorRes,
        api_shared::RegisterReq,
        api_shared::LoginReq,
        api_shared::LoginRes,
        api_shared::DashboardRes,
        api_shared::CreateBloodRequestReq,
        api_shared::CreateBloodRequestRes,
        api_shared::SmsStatus,
        api_shared::BloodRequestRes,
        api_shared::ListBloodRequestsRes,
        api_shared::DonorRes,
        api_shared::ListDonorsRes,
        api_shared::CreateDonorReq,
    )),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// CORS for the browser frontend. Permissive when no origin is configured.
///
/// # Errors
/// Returns an error if `origin` is not a valid header value.
pub fn cors_layer(origin: Option<&str>) -> Result<CorsLayer, header::InvalidHeaderValue> {
    let Some(origin) = origin else {
        return Ok(CorsLayer::permissive());
    };

    Ok(CorsLayer::new()
        .allow_origin(HeaderValue::from_str(origin)?)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

/// Builds the full REST router, including Swagger UI at `/swagger-ui`.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/register", post(handlers::register))
        .route("/login", post(handlers::login))
        .route("/dashboard", get(handlers::dashboard))
        .route(
            "/blood-requests",
            get(handlers::list_blood_requests).post(handlers::create_blood_request),
        )
        .route("/blood-requests/:id", get(handlers::get_blood_request))
        .route(
            "/donors",
            get(handlers::list_donors).post(handlers::create_donor),
        )
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .with_state(state)
}
