//! 路由配置模块

use std::time::Duration;

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    routing::{get, post},
};
use cart_shared::observability::middleware as obs_middleware;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{handlers, state::AppState};

/// 店铺前台调用的路由
///
/// 由主题脚本跨域请求，CORS 放开所有来源。
fn storefront_routes() -> Router<AppState> {
    Router::new().route("/evaluate-cart", post(handlers::evaluate::evaluate_cart))
}

/// 商家后台的规则管理路由
fn rule_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/rules",
            get(handlers::rule::list_rules).post(handlers::rule::create_rule),
        )
        .route("/rules/preview", post(handlers::preview::preview_rules))
        .route(
            "/rules/{id}",
            get(handlers::rule::get_rule)
                .put(handlers::rule::update_rule)
                .delete(handlers::rule::delete_rule),
        )
}

/// 订单回写路由
fn order_routes() -> Router<AppState> {
    Router::new().route("/save-order-note", post(handlers::order_note::save_order_note))
}

/// 所有 `/api` 下的路由
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(storefront_routes())
        .merge(rule_routes())
        .merge(order_routes())
}

/// 请求超时层，超时返回 408
pub fn timeout_layer(request_timeout: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout)
}

/// 构建完整应用：API、健康检查以及公共中间件
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api", api_routes())
        .route("/health", get(health_check))
        .layer(timeout_layer(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(middleware::from_fn(obs_middleware::http_tracing))
        .layer(middleware::from_fn(obs_middleware::request_id))
        .with_state(state)
}

/// 存活探针
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
