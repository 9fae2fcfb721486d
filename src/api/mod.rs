//! HTTP surface over the session store, the training modules and the
//! stateless tools.

mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::advisories::AdvisorySource;
use crate::generation::TextGenerator;
use crate::password::{StrengthEstimator, ZxcvbnEstimator};
use crate::session::SessionRegistry;

pub use middleware::RateLimiter;

/// Shared handler state. Cloning is cheap; every field is a handle.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionRegistry,
    /// `None` when no generation service is configured.
    pub generator: Option<Arc<dyn TextGenerator>>,
    pub advisories: Arc<dyn AdvisorySource>,
    pub strength: Arc<dyn StrengthEstimator>,
    pub limiter: Option<RateLimiter>,
    pub api_key: Option<String>,
    pub cors_origins: Vec<String>,
}

impl AppState {
    pub fn new(sessions: SessionRegistry, advisories: Arc<dyn AdvisorySource>) -> Self {
        Self {
            sessions,
            generator: None,
            advisories,
            strength: Arc::new(ZxcvbnEstimator),
            limiter: None,
            api_key: None,
            cors_origins: Vec::new(),
        }
    }

    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn with_strength_estimator(mut self, strength: Arc<dyn StrengthEstimator>) -> Self {
        self.strength = strength;
        self
    }

    /// Limit generation calls per session per minute. Zero disables the limit.
    pub fn with_generation_rate_limit(mut self, max_per_minute: u32) -> Self {
        self.limiter = RateLimiter::per_minute(max_per_minute);
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = origins;
        self
    }
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        // Catalogue and static material
        .route("/modules", get(handlers::list_modules))
        .route("/content/{topic}", get(handlers::get_content))
        // Sessions
        .route("/sessions", post(handlers::create_session))
        .route("/sessions/{id}", get(handlers::get_session))
        .route("/sessions/{id}", delete(handlers::end_session))
        .route("/sessions/{id}/modules/{module}", delete(handlers::clear_module))
        .route("/sessions/{id}/slots/{module}/{slot}", get(handlers::get_slot))
        .route("/sessions/{id}/slots/{module}/{slot}", delete(handlers::clear_slot))
        .route(
            "/sessions/{id}/slots/{module}/{slot}/response",
            post(handlers::record_response),
        )
        // Phishing
        .route("/sessions/{id}/phishing/sample", post(handlers::generate_phishing_sample))
        .route(
            "/sessions/{id}/phishing/sample/explanation",
            post(handlers::evaluate_phishing_explanation),
        )
        .route("/sessions/{id}/phishing/analysis", post(handlers::analyse_email))
        // Scenarios
        .route("/sessions/{id}/scenario", post(handlers::generate_scenario))
        .route("/sessions/{id}/scenario/response", post(handlers::evaluate_scenario_response))
        // Quiz
        .route("/sessions/{id}/quiz", get(handlers::get_quiz))
        .route("/sessions/{id}/quiz", post(handlers::generate_quiz))
        .route("/sessions/{id}/quiz/answers", post(handlers::submit_quiz_answers))
        // Incident response, compliance and references
        .route("/sessions/{id}/incident_response/guide", post(handlers::generate_incident_guide))
        .route("/sessions/{id}/compliance/ask", post(handlers::ask_compliance))
        .route("/sessions/{id}/reference/ask", post(handlers::ask_reference))
        // Stateless tools
        .route("/advisories", get(handlers::list_advisories))
        .route("/password/generate", post(handlers::generate_password))
        .route("/password/strength", post(handlers::check_password_strength))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let api = Router::new()
        .route("/health", get(handlers::health))
        .merge(protected);

    let cors = cors_layer(&state.cors_origins);

    Router::new()
        .nest("/api/v1", api)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
