//! 规则管理服务
//!
//! 提供规则创建、组合、校验与评估的 REST API。

use std::path::Path;

use axum::http::HeaderValue;
use rule_admin_service::{routes, seed, state::AppState};
use rule_shared::{config::AppConfig, observability};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load("rule-admin-service").unwrap_or_else(|e| {
        eprintln!("配置加载失败，使用默认配置: {}", e);
        AppConfig {
            service_name: "rule-admin-service".to_string(),
            ..Default::default()
        }
    });

    observability::init(&config.observability, &config.service_name)?;

    info!("Starting rule-admin-service on {}", config.server_addr());

    let state = AppState::in_memory();

    // 种子文件加载失败不阻止服务启动
    if let Some(seed_path) = &config.store.seed_path {
        if let Err(e) = seed::load_seed_file(&state.rule_service, Path::new(seed_path)).await {
            warn!(error = %e, "Failed to load seed rules");
        }
    }

    let app = routes::app(state).layer(cors_layer(&config));

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");

    Ok(())
}

/// CORS 配置：allowed_origins 为逗号分隔的来源列表，"*" 表示全部放行
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let allowed_origins = &config.cors.allowed_origins;

    if allowed_origins == "*" {
        if config.is_production() {
            warn!("cors.allowed_origins=\"*\" 在生产环境中不安全，请设置为具体域名");
        }
        info!("CORS allowed_origins: * (all origins)");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        info!("CORS allowed_origins: {}", allowed_origins);
        let origins: Vec<_> = allowed_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// 监听关闭信号
///
/// 收到 SIGTERM 或 Ctrl+C 后返回，触发 axum 的优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
