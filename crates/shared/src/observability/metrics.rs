//! Prometheus 指标模块
//!
//! 基于 metrics crate 和 metrics-exporter-prometheus 实现指标收集与导出。
//! 指标通过独立的 HTTP 端口暴露，供 Prometheus 抓取。

use anyhow::Result;
use axum::{Router, routing::get};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::ObservabilityConfig;

/// Metrics 资源守卫
pub struct MetricsHandle {
    _server_handle: tokio::task::JoinHandle<()>,
}

/// 初始化 Prometheus 指标导出
///
/// 启动一个独立的 HTTP 服务器在指定端口暴露 `/metrics` 端点。
pub async fn init(config: &ObservabilityConfig) -> Result<MetricsHandle> {
    let handle = PrometheusBuilder::new().install_recorder()?;

    register_common_metrics(&config.service_name);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.metrics_port));
    let server_handle = start_metrics_server(addr, handle).await?;

    Ok(MetricsHandle {
        _server_handle: server_handle,
    })
}

/// 注册通用指标描述，出现在 /metrics 端点的 HELP 注释中
fn register_common_metrics(service_name: &str) {
    metrics::describe_counter!("http_requests_total", "Total number of HTTP requests");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );

    metrics::describe_counter!(
        "cart_evaluations_total",
        "Total number of storefront cart evaluations"
    );
    metrics::describe_histogram!(
        "cart_evaluation_duration_seconds",
        "Cart evaluation duration in seconds"
    );

    metrics::describe_counter!("rule_mutations_total", "Total number of rule writes");
    metrics::describe_counter!(
        "order_note_writes_total",
        "Total number of order note write-backs"
    );

    metrics::counter!("service_starts_total", "service" => service_name.to_string()).increment(1);
}

/// 启动指标 HTTP 服务器
async fn start_metrics_server(
    addr: SocketAddr,
    handle: PrometheusHandle,
) -> Result<tokio::task::JoinHandle<()>> {
    let app = Router::new()
        .route("/metrics", get(move || std::future::ready(handle.render())))
        .route("/health", get(|| async { "OK" }));

    let listener = TcpListener::bind(addr).await?;
    info!("Metrics server listening on {}", addr);

    let server_handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            error!("Metrics server error: {}", e);
        }
    });

    Ok(server_handle)
}

// ============================================================================
// 便捷的指标记录函数
// ============================================================================

/// 记录 HTTP 请求
#[inline]
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let status_str = status.to_string();
    metrics::counter!(
        "http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str.clone()
    )
    .increment(1);

    metrics::histogram!(
        "http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status_str
    )
    .record(duration_secs);
}

/// 记录购物车评估
///
/// `matched` 区分展示了消息和没有消息两种结果。
#[inline]
pub fn record_cart_evaluation(matched: bool, rules: usize, duration_secs: f64) {
    let outcome = if matched { "matched" } else { "no_message" };
    metrics::counter!("cart_evaluations_total", "outcome" => outcome).increment(1);

    metrics::histogram!("cart_evaluation_duration_seconds").record(duration_secs);
    metrics::histogram!("cart_evaluation_rules").record(rules as f64);
}

/// 记录规则写操作（create / update / delete）
#[inline]
pub fn record_rule_mutation(operation: &str) {
    metrics::counter!("rule_mutations_total", "op" => operation.to_string()).increment(1);
}

/// 记录订单备注回写
#[inline]
pub fn record_order_note_write(status: &str) {
    metrics::counter!("order_note_writes_total", "status" => status.to_string()).increment(1);
}
