//! Picstore API 서버 진입점.
//!
//! 시작 순서: 설정 로드/검증 → 로깅 → 메트릭 → 토큰 코덱 → DB 연결 및 스키마 → 라우터 → 서빙.
//! 설정 오류와 DB 연결 실패는 요청을 받기 전에 프로세스를 종료시킵니다.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method, StatusCode};
use clap::Parser;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use picstore_api::auth::{CredentialVerifier, TokenCodec};
use picstore_api::metrics::setup_metrics_recorder;
use picstore_api::repository::{bootstrap_schema, PgImageStore, PgUserStore};
use picstore_api::storage::LocalBlobStore;
use picstore_api::{create_router, AppState};
use picstore_core::{init_logging, AppConfig, LogConfig, ServiceError};

/// Picstore API 서버.
#[derive(Debug, Parser)]
#[command(name = "picstore-api", version, about = "Authenticated image storage API server")]
struct Args {
    /// 설정 파일 경로 (기본: PICSTORE_CONFIG 또는 config/default.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// OpenAPI 스펙을 stdout으로 출력하고 종료
    #[arg(long)]
    export_openapi: bool,
}

/// CORS 레이어 생성.
///
/// `CORS_ORIGINS`(쉼표 구분)가 설정되면 해당 origin만 허용하고,
/// 없으면 개발 모드로 모든 origin을 허용합니다.
fn cors_layer() -> CorsLayer {
    let configured: Option<Vec<_>> = std::env::var("CORS_ORIGINS")
        .ok()
        .filter(|origins| !origins.is_empty())
        .map(|origins| {
            origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect()
        });

    let (allow_origin, credentials) = match configured {
        Some(origins) if !origins.is_empty() => {
            info!("CORS configured with {} allowed origins", origins.len());
            (AllowOrigin::list(origins), true)
        }
        Some(_) => {
            warn!("CORS_ORIGINS is set but contains no valid origins, allowing any");
            (AllowOrigin::any(), false)
        }
        None => {
            warn!("CORS_ORIGINS not set, allowing any origin (development mode)");
            (AllowOrigin::any(), false)
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .allow_credentials(credentials)
        .max_age(Duration::from_secs(3600))
}

fn export_openapi() -> Result<(), Box<dyn std::error::Error>> {
    use picstore_api::openapi::ApiDoc;
    use utoipa::OpenApi as _;

    println!("{}", ApiDoc::openapi().to_pretty_json()?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.export_openapi {
        return export_openapi();
    }

    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::load_default()?,
    };
    config.validate()?;

    init_logging(LogConfig::from_settings(&config.logging))?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Picstore API server...");

    let metrics_handle = setup_metrics_recorder()?;
    info!("Prometheus metrics recorder initialized");

    let codec = TokenCodec::new(&config.auth).map_err(|e| {
        error!(error = %e, "Token codec configuration invalid");
        e
    })?;

    let database_url = config
        .database
        .url
        .as_deref()
        .ok_or_else(|| ServiceError::configuration("database.url is required"))?;
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(database_url)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to connect to database");
            ServiceError::configuration(format!("database connection failed: {}", e))
        })?;
    info!("Database connected");

    bootstrap_schema(&pool).await?;

    let blobs = LocalBlobStore::open(&config.storage.image_dir).await?;
    info!(dir = %blobs.root().display(), "Image storage ready");

    let state = AppState::new(
        Arc::new(PgUserStore::new(pool.clone())),
        Arc::new(PgImageStore::new(pool.clone())),
        Arc::new(blobs),
        codec,
        CredentialVerifier::new(),
    )?
    .with_public_base_url(config.server.public_base_url())
    .with_max_upload_bytes(config.storage.max_upload_bytes)
    .with_metrics(metrics_handle);

    let app = create_router(Arc::new(state))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.server.request_timeout_secs),
        ))
        .layer(cors_layer());

    let addr: SocketAddr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!(%addr, "API server listening");
    info!("Swagger UI available at http://{}/swagger-ui", addr);
    info!("Metrics available at http://{}/metrics", addr);

    let shutdown_token = CancellationToken::new();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, closing database pool...");
    pool.close().await;
    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
        _ = shutdown_token.cancelled() => {}
    }

    shutdown_token.cancel();
}
