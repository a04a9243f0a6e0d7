use crate::adapters::pages::{error_page, MAINTENANCE_PAGE};
use crate::adapters::storage::TemplateLibrary;
use crate::core::injector::TemplateInjector;
use crate::domain::model::non_empty;
use crate::domain::ports::{RecordStore, TemplateSource};
use crate::utils::error::{FolioError, Result};
use crate::utils::validation::is_valid_handle;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// 每個請求共用的唯讀狀態
pub struct AppState {
    pub records: Arc<dyn RecordStore>,
    pub templates: TemplateLibrary,
    pub injector: TemplateInjector,
    pub default_template: String,
}

impl AppState {
    pub fn new(
        records: Arc<dyn RecordStore>,
        templates: TemplateLibrary,
        default_template: impl Into<String>,
    ) -> Self {
        Self {
            records,
            templates,
            injector: TemplateInjector::new(),
            default_template: default_template.into(),
        }
    }
}

/// 回應時轉成標示狀態碼的錯誤頁，不附帶任何渲染到一半的內容
#[derive(Debug)]
pub struct AppError(FolioError);

impl From<FolioError> for AppError {
    fn from(error: FolioError) -> Self {
        AppError(error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(
                "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                self.0,
                self.0.category(),
                self.0.severity()
            );
            tracing::error!("💡 Recovery suggestion: {}", self.0.recovery_suggestion());
        } else {
            tracing::debug!("Request rejected: {}", self.0);
        }

        let page = error_page(status.as_u16(), &self.0.user_friendly_message());
        (status, Html(page)).into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PortfolioQuery {
    pub download: Option<String>,
}

impl PortfolioQuery {
    fn wants_download(&self) -> bool {
        matches!(
            self.download.as_deref().map(str::to_ascii_lowercase).as_deref(),
            Some("true" | "1" | "yes")
        )
    }
}

pub fn router(state: Arc<AppState>, cors: bool) -> Router {
    let app = Router::new()
        .route("/healthz", get(health_handler))
        .route("/api/portfolio/{handle}", get(portfolio_handler))
        .route("/u/{handle}", get(portfolio_handler))
        .route("/api/templates/{template_id}", get(template_preview_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    if cors {
        let cors = CorsLayer::new()
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_origin(Any)
            .allow_headers([header::CONTENT_TYPE])
            .max_age(Duration::from_secs(60 * 60));
        app.layer(cors)
    } else {
        app
    }
}

pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "ok")
}

pub async fn portfolio_handler(
    State(state): State<Arc<AppState>>,
    Path(handle): Path<String>,
    Query(query): Query<PortfolioQuery>,
) -> std::result::Result<Response, AppError> {
    if !is_valid_handle(&handle) {
        return Err(FolioError::not_found("portfolio", &handle).into());
    }

    let record = state
        .records
        .fetch(&handle)
        .await?
        .ok_or_else(|| FolioError::not_found("portfolio", &handle))?;

    // 停用的作品集不進入渲染流程
    if !record.is_active() {
        tracing::info!("🚧 Portfolio {} is inactive, serving maintenance page", handle);
        return Ok((StatusCode::SERVICE_UNAVAILABLE, Html(MAINTENANCE_PAGE)).into_response());
    }

    let template_id = non_empty(&record.template_id).unwrap_or(state.default_template.as_str());
    let template = state.templates.load(template_id).await?;
    let markup = state.injector.render(&record, &template)?;
    tracing::info!("✅ Rendered {} with {}", handle, template_id);

    let mut response = Html(markup.into_string()).into_response();
    let headers = response.headers_mut();

    if query.wants_download() {
        if let Ok(value) =
            HeaderValue::from_str(&format!("attachment; filename=\"{}.html\"", handle))
        {
            headers.insert(header::CONTENT_DISPOSITION, value);
        }
    }
    if let Some(updated_at) = record.updated_at {
        let http_date = updated_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        if let Ok(value) = HeaderValue::from_str(&http_date) {
            headers.insert(header::LAST_MODIFIED, value);
        }
    }

    Ok(response)
}

/// 原始模板預覽，不套用任何資料
pub async fn template_preview_handler(
    State(state): State<Arc<AppState>>,
    Path(template_id): Path<String>,
) -> std::result::Result<Response, AppError> {
    let (_, markup) = state.templates.load_markup(&template_id).await?;
    Ok(Html(markup).into_response())
}

pub async fn serve(listener: TcpListener, app: Router) -> Result<()> {
    if let Ok(address) = listener.local_addr() {
        tracing::info!("🚀 Server running on {}", address);
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutting down...");
    Ok(())
}

pub async fn bind(address: &str) -> Result<TcpListener> {
    tracing::info!("Binding to {}", address);
    Ok(TcpListener::bind(address).await?)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_download_flag() {
        let query = |value: &str| PortfolioQuery {
            download: Some(value.to_string()),
        };
        assert!(query("true").wants_download());
        assert!(query("TRUE").wants_download());
        assert!(query("1").wants_download());
        assert!(!query("false").wants_download());
        assert!(!PortfolioQuery::default().wants_download());
    }

    #[test]
    fn test_error_status_mapping() {
        let response = AppError::from(FolioError::InvalidTemplateId {
            id: "x".to_string(),
        })
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = AppError::from(FolioError::template_parse("template01", "empty"))
            .into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
