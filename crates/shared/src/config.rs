//! 配置管理模块
//!
//! 支持多格式配置文件加载，环境变量覆盖，以及类型安全的配置访问。

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

use crate::observability::ObservabilityConfig;

/// 服务配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// 单个请求的超时时间
    pub request_timeout_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_seconds: 30,
        }
    }
}

/// Shopify Admin REST API 配置
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShopifyConfig {
    pub api_version: String,
    pub request_timeout_seconds: u64,
    /// 订单元字段命名空间
    pub metafield_namespace: String,
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        Self {
            api_version: "2024-01".to_string(),
            request_timeout_seconds: 10,
            metafield_namespace: "cart_note_replacer".to_string(),
        }
    }
}

/// 规则初始数据配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RulesConfig {
    /// 启动时加载的规则 JSON 文件（规则数组），为空则从空规则集启动
    pub seed_file: Option<String>,
}

/// 应用配置
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub environment: String,
    pub server: ServerConfig,
    pub shopify: ShopifyConfig,
    pub rules: RulesConfig,
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// 从配置文件和环境变量加载配置
    ///
    /// 加载顺序（后加载的会覆盖先加载的同名配置项）：
    /// 1. .env 文件（如存在，写入进程环境变量）
    /// 2. config/default.toml（默认配置）
    /// 3. config/{environment}.toml（环境特定配置）
    /// 4. config/{service_name}.toml（服务特定配置）
    /// 5. 环境变量（CART_ 前缀，双下划线分隔层级，如 CART_SERVER__PORT -> server.port）
    /// 6. 服务特定端口环境变量（如 CART_MESSAGE_SERVICE_PORT）
    pub fn load(service_name: &str) -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();

        let config_dir = std::env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string());
        Self::load_from_dir(service_name, Path::new(&config_dir))
    }

    /// 从指定配置目录加载，其余规则同 [`load`](Self::load)
    pub fn load_from_dir(service_name: &str, config_dir: &Path) -> Result<Self, ConfigError> {
        let env = std::env::var("CART_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = Config::builder()
            .set_default("service_name", service_name)?
            .set_default("environment", env.clone())?
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            .add_source(File::from(config_dir.join(format!("{}.toml", env))).required(false))
            .add_source(
                File::from(config_dir.join(format!("{}.toml", service_name))).required(false),
            )
            .add_source(
                Environment::with_prefix("CART")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: Self = builder.build()?.try_deserialize()?;

        if let Some(port) = Self::get_service_port_from_env(service_name) {
            config.server.port = port;
        }

        Ok(config)
    }

    /// 加载配置，失败时回退到默认值
    ///
    /// 回退配置保留服务名；失败原因一并返回，由调用方在日志初始化后输出。
    pub fn load_or_default(service_name: &str) -> (Self, Option<ConfigError>) {
        Self::or_default(service_name, Self::load(service_name))
    }

    fn or_default(
        service_name: &str,
        result: Result<Self, ConfigError>,
    ) -> (Self, Option<ConfigError>) {
        match result {
            Ok(config) => (config, None),
            Err(e) => (
                Self {
                    service_name: service_name.to_string(),
                    ..Self::default()
                },
                Some(e),
            ),
        }
    }

    /// 从环境变量获取服务特定端口
    ///
    /// 将 "cart-message-service" 转换为 "CART_MESSAGE_SERVICE_PORT"
    fn get_service_port_from_env(service_name: &str) -> Option<u16> {
        std::env::var(Self::service_port_env_var(service_name))
            .ok()
            .and_then(|v| v.parse().ok())
    }

    fn service_port_env_var(service_name: &str) -> String {
        format!("{}_PORT", service_name.to_uppercase().replace('-', "_"))
    }

    /// 获取服务地址
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// 是否为生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 带服务名的可观测性配置
    pub fn observability_config(&self) -> ObservabilityConfig {
        self.observability.clone().with_service_name(&self.service_name)
    }
}
