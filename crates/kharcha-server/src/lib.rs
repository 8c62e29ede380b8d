//! Kharcha Web Server
//!
//! Axum-based REST API for the Kharcha spending assistant.
//!
//! Security features:
//! - Bearer API-key authentication (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Upload size limits
//! - `Cache-Control: no-store` on every response so dashboards never show stale data
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer, services::ServeDir, set_header::SetResponseHeaderLayer, trace::TraceLayer,
};
use tracing::{error, info, warn};

use kharcha_core::config::ServerSettings;
use kharcha_core::db::Database;
use kharcha_core::{Config, DatasetVersion, ImportError, Transaction};

mod handlers;

/// Default maximum file upload size (10 MB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Maximum `limit` accepted by ranked summary endpoints
pub const MAX_RESULT_LIMIT: usize = 100;

/// Environment variable holding comma-separated API keys
pub const API_KEYS_ENV: &str = "KHARCHA_API_KEYS";

/// Authorization header for API key auth
const AUTHORIZATION_HEADER: &str = "authorization";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether authentication is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
    /// Accepted bearer tokens, sent as "Bearer <key>" in the Authorization header
    pub api_keys: Vec<String>,
    /// Largest accepted request body, in bytes
    pub max_upload_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
            api_keys: vec![],
            max_upload_bytes: MAX_UPLOAD_SIZE,
        }
    }
}

impl ServerConfig {
    /// Build from the `[server]` config section plus `KHARCHA_API_KEYS`
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let api_keys = std::env::var(API_KEYS_ENV)
            .map(|keys| parse_api_keys(&keys))
            .unwrap_or_default();

        Self {
            require_auth: true,
            allowed_origins: settings.allowed_origins.clone(),
            api_keys,
            max_upload_bytes: settings.max_upload_bytes,
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    /// Query and classifier tuning
    pub settings: Config,
}

impl AppState {
    /// The shared dataset with the version it was read at
    ///
    /// The version is read first, so a concurrent replace can only make the
    /// reported version older than the rows, never newer.
    pub(crate) fn shared_dataset(&self) -> Result<(Vec<Transaction>, DatasetVersion), AppError> {
        let version = self.db.dataset_version()?;
        let transactions = self.db.list_transactions(None)?;
        Ok((transactions, version))
    }
}

/// Authentication middleware - validates bearer API keys
///
/// Keys are compared in constant time to prevent timing attacks. With auth
/// enabled and no keys configured, every request is rejected.
async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    if !state.config.require_auth {
        return next.run(request).await;
    }

    let api_key_valid = request
        .headers()
        .get(AUTHORIZATION_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(|key| validate_api_key(key, &state.config.api_keys))
        .unwrap_or(false);

    if api_key_valid {
        tracing::debug!(path = %request.uri().path(), "Authenticated via API key");
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Unauthorized request - no valid auth");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Authentication required"
        })),
    )
        .into_response()
}

/// Validate an API key against the configured keys using constant-time comparison
fn validate_api_key(provided: &str, valid_keys: &[String]) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();
    valid_keys.iter().any(|key| {
        let key_bytes = key.as_bytes();
        // Only compare if lengths match (constant-time for same-length keys)
        provided_bytes.len() == key_bytes.len() && bool::from(provided_bytes.ct_eq(key_bytes))
    })
}

/// Parse a comma-separated list of API keys, skipping blanks
pub fn parse_api_keys(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router with default query settings
pub fn create_router(db: Database, static_dir: Option<&str>, config: ServerConfig) -> Router {
    create_router_with_settings(db, static_dir, config, Config::default())
}

/// Create the application router
pub fn create_router_with_settings(
    db: Database,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: Config,
) -> Router {
    let body_limit = config.max_upload_bytes;

    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        settings,
    });

    let api_routes = Router::new()
        .route("/status", get(handlers::get_status))
        // Shared dataset
        .route("/upload_csv", post(handlers::upload_csv))
        .route("/chat", post(handlers::chat))
        // Summaries
        .route("/summary/by_category", get(handlers::summary_by_category))
        .route("/summary/top_merchants", get(handlers::summary_top_merchants))
        .route("/summary/monthly_totals", get(handlers::summary_monthly_totals))
        // Dashboard charts
        .route("/visualization/category_pie", get(handlers::category_pie))
        .route("/visualization/monthly_trend", get(handlers::monthly_trend))
        .route(
            "/visualization/top_merchants_by_total_spending",
            get(handlers::top_merchants_by_total_spending),
        )
        .route(
            "/visualization/top_merchants_by_single_payment",
            get(handlers::top_merchants_by_single_payment),
        )
        .route(
            "/visualization/income_vs_expenses",
            get(handlers::income_vs_expenses),
        )
        // Budgets and alerts
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::set_budget),
        )
        .route("/budgets/:category", delete(handlers::delete_budget))
        .route("/spending-alerts", get(handlers::spending_alerts))
        // Sessions
        .route(
            "/sessions",
            get(handlers::list_sessions).post(handlers::create_session),
        )
        .route("/sessions/:id", delete(handlers::delete_session))
        .route("/sessions/:id/upload", post(handlers::upload_session_csv))
        .route("/sessions/:id/analytics", get(handlers::session_analytics))
        .route("/sessions/:id/chat", post(handlers::session_chat))
        .layer(DefaultBodyLimit::max(body_limit));

    // Build CORS layer
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    };

    let csp_value = HeaderValue::from_static(
        "default-src 'self'; script-src 'self'; style-src 'self' 'unsafe-inline'; img-src 'self' data:; connect-src 'self'; frame-ancestors 'none'",
    );

    let mut app = Router::new()
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Analytics change with every upload; never let a browser cache them
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store, no-cache, must-revalidate"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_SECURITY_POLICY,
            csp_value,
        ));

    // Serve static files if directory provided
    if let Some(dir) = static_dir {
        app = app.fallback_service(ServeDir::new(dir));
    }

    app
}

/// Start the server
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    static_dir: Option<&str>,
    config: ServerConfig,
    settings: Config,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("⚠️  Authentication disabled - do not expose to network!");
    } else if config.api_keys.is_empty() {
        warn!(
            "⚠️  Authentication enabled but {} is empty - every request will be rejected",
            API_KEYS_ENV
        );
    }

    let version = db.dataset_version()?;
    info!(
        version = version.version,
        transactions = db.count_transactions()?,
        "Loaded shared dataset"
    );

    let app = create_router_with_settings(db, static_dir, config, settings);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
pub struct AppError {
    status: StatusCode,
    message: String,
    /// Stable code for import failures, rendered as `{ok: false, reason, error}`
    reason: Option<&'static str>,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            reason: None,
            internal: None,
        }
    }

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            reason: None,
            internal: None,
        }
    }

    /// Map a core error, keeping client mistakes out of the 500 bucket
    pub fn from_core(err: kharcha_core::Error) -> Self {
        match err {
            kharcha_core::Error::NotFound(what) => Self::not_found(&format!("{} not found", what)),
            kharcha_core::Error::InvalidData(msg) => Self::bad_request(&msg),
            other => other.into(),
        }
    }

    /// Rejected upload
    ///
    /// Storage failures are ours and stay opaque; everything else is the
    /// upload's fault and is explained to the client.
    pub fn import(err: ImportError) -> Self {
        let reason = Some(err.reason());
        match err {
            ImportError::Storage(_) => Self {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "Failed to store transactions".to_string(),
                reason,
                internal: Some(err.into()),
            },
            _ => Self {
                status: StatusCode::BAD_REQUEST,
                message: err.to_string(),
                reason,
                internal: None,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = match self.reason {
            Some(reason) => Json(serde_json::json!({
                "ok": false,
                "reason": reason,
                "error": self.message
            })),
            None => Json(serde_json::json!({
                "error": self.message
            })),
        };

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            reason: None,
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
