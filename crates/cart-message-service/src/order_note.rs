//! 订单备注回写
//!
//! 结账完成后，把展示给顾客的购物车消息写回订单：一份写进订单备注，
//! 一份写进订单元字段，供后台和履约流程读取。

use std::time::Duration;

use async_trait::async_trait;
use cart_shared::config::ShopifyConfig;
use serde::Serialize;
use serde_json::Value;
use tracing::{info, instrument};

use crate::error::Result;

/// 写入订单的元字段 key
pub const DISPLAYED_MESSAGE_KEY: &str = "displayed_message";
/// 元字段类型
pub const METAFIELD_TYPE: &str = "single_line_text_field";
/// 订单备注前缀
pub const NOTE_PREFIX: &str = "Cart Message: ";

/// 要写入的订单
#[derive(Debug, Clone, PartialEq)]
pub struct OrderTarget {
    pub shop_domain: String,
    pub access_token: String,
    pub order_id: String,
}

/// 订单备注写入接口
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OrderNoteWriter: Send + Sync {
    /// 把消息写入订单备注和元字段
    async fn write(&self, target: &OrderTarget, message: &str) -> Result<()>;
}

/// `PUT orders/{id}.json` 请求体
#[derive(Debug, Serialize)]
pub struct OrderUpdatePayload {
    pub order: OrderNote,
}

#[derive(Debug, Serialize)]
pub struct OrderNote {
    pub id: Value,
    pub note: String,
}

/// `POST orders/{id}/metafields.json` 请求体
#[derive(Debug, Serialize)]
pub struct MetafieldPayload {
    pub metafield: Metafield,
}

#[derive(Debug, Serialize)]
pub struct Metafield {
    pub namespace: String,
    pub key: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

impl OrderUpdatePayload {
    pub fn new(order_id: &str, message: &str) -> Self {
        Self {
            order: OrderNote {
                id: order_id_value(order_id),
                note: format!("{}{}", NOTE_PREFIX, message),
            },
        }
    }
}

impl MetafieldPayload {
    pub fn new(namespace: &str, message: &str) -> Self {
        Self {
            metafield: Metafield {
                namespace: namespace.to_string(),
                key: DISPLAYED_MESSAGE_KEY.to_string(),
                value: message.to_string(),
                value_type: METAFIELD_TYPE.to_string(),
            },
        }
    }
}

/// 纯数字的订单 ID 按数字发送，其余原样作为字符串
fn order_id_value(order_id: &str) -> Value {
    order_id
        .parse::<u64>()
        .map(Value::from)
        .unwrap_or_else(|_| Value::from(order_id))
}

/// 基于 Admin REST API 的订单备注写入
pub struct ShopifyOrderClient {
    http: reqwest::Client,
    api_version: String,
    namespace: String,
    /// 覆盖 `https://{shop_domain}`，用于本地联调
    base_url: Option<String>,
}

impl ShopifyOrderClient {
    pub fn new(config: &ShopifyConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()?;

        Ok(Self {
            http,
            api_version: config.api_version.clone(),
            namespace: config.metafield_namespace.clone(),
            base_url: None,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into().trim_end_matches('/').to_string());
        self
    }

    fn admin_url(&self, target: &OrderTarget, path: &str) -> String {
        let base = match &self.base_url {
            Some(base) => base.clone(),
            None => format!("https://{}", target.shop_domain),
        };
        format!("{}/admin/api/{}/{}", base, self.api_version, path)
    }

    pub fn order_url(&self, target: &OrderTarget) -> String {
        self.admin_url(target, &format!("orders/{}.json", target.order_id))
    }

    pub fn metafields_url(&self, target: &OrderTarget) -> String {
        self.admin_url(target, &format!("orders/{}/metafields.json", target.order_id))
    }
}

#[async_trait]
impl OrderNoteWriter for ShopifyOrderClient {
    #[instrument(skip(self, target, message), fields(shop = %target.shop_domain, order_id = %target.order_id))]
    async fn write(&self, target: &OrderTarget, message: &str) -> Result<()> {
        self.http
            .put(self.order_url(target))
            .header("X-Shopify-Access-Token", &target.access_token)
            .json(&OrderUpdatePayload::new(&target.order_id, message))
            .send()
            .await?
            .error_for_status()?;

        self.http
            .post(self.metafields_url(target))
            .header("X-Shopify-Access-Token", &target.access_token)
            .json(&MetafieldPayload::new(&self.namespace, message))
            .send()
            .await?
            .error_for_status()?;

        info!("订单备注已写入");
        Ok(())
    }
}
