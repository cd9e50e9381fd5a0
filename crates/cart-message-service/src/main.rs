//! 购物车消息服务

use std::sync::Arc;
use std::time::Duration;

use cart_message_service::{AppState, ShopifyOrderClient, routes};
use cart_shared::{config::AppConfig, observability};
use rule_engine::RuleStore;
use tokio::net::TcpListener;
use tracing::{info, warn};

const SERVICE_NAME: &str = "cart-message-service";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 日志依赖配置初始化，加载失败的原因要等日志就绪后再输出
    let (config, load_error) = AppConfig::load_or_default(SERVICE_NAME);

    let _guard = observability::init(&config.observability_config()).await?;

    if let Some(e) = load_error {
        warn!("Failed to load config, using defaults: {}", e);
    }

    info!("Starting {} on {}", SERVICE_NAME, config.server_addr());

    let store = RuleStore::new();
    if let Some(path) = &config.rules.seed_file {
        seed_rules(&store, path).await?;
    }

    let order_notes = Arc::new(ShopifyOrderClient::new(&config.shopify)?);
    let state = AppState::new(store, order_notes);

    let app = routes::build_router(
        state,
        Duration::from_secs(config.server.request_timeout_seconds),
    );

    let listener = TcpListener::bind(config.server_addr()).await?;
    info!("Listening on {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// 从 JSON 文件加载初始规则
async fn seed_rules(store: &RuleStore, path: &str) -> anyhow::Result<()> {
    let content = tokio::fs::read_to_string(path).await?;
    let ids = store.load_from_json(&content)?;
    let stats = store.stats();
    info!(
        path,
        loaded = ids.len(),
        shops = stats.shops_count,
        active = stats.active_count,
        "Seed rules loaded"
    );
    if stats.active_count == 0 {
        warn!("No active rules loaded, storefront will show no messages");
    }
    Ok(())
}

/// 监听关闭信号
///
/// 同时监听 Ctrl+C 和 SIGTERM（Unix），任一触发即开始优雅关闭。
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("注册 Ctrl+C 处理器失败: {}", e);
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
                warn!("注册 SIGTERM 处理器失败: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
