//! 路由配置模块
//!
//! 定义所有 REST API 端点的路由映射

use axum::{
    Router, middleware,
    routing::{get, post},
};
use rule_shared::observability::middleware as obs_middleware;

use crate::{handlers, state::AppState};

/// 构建规则相关的路由
pub fn rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(handlers::rule::list_rules).post(handlers::rule::create_rule),
        )
        .route("/rules/combine", post(handlers::rule::combine_rules))
        .route("/rules/validate", post(handlers::rule::validate_rule))
        .route(
            "/rules/{id}",
            get(handlers::rule::get_rule).put(handlers::rule::update_rule),
        )
        .route("/rules/{id}/evaluate", post(handlers::rule::evaluate_rule))
}

/// 构建完整的应用路由
///
/// 包含业务路由、健康检查以及请求追踪中间件；CORS 由启动入口按配置叠加。
pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api", rule_routes())
        .route("/health", get(handlers::health::health_check))
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}
