//! 规则引擎领域模型

use crate::operators::ComparisonOperator;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

/// 规则类型
///
/// 线上以字符串保存。无法识别的类型原样保留在 `Other` 中，评估时视为不匹配，
/// 以兼容尚未支持的新规则类型。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleType {
    CartTotal,
    Collection,
    CustomerTag,
    Country,
    Other(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::CartTotal => "cart_total",
            Self::Collection => "collection",
            Self::CustomerTag => "customer_tag",
            Self::Country => "country",
            Self::Other(s) => s,
        }
    }

    /// 是否为引擎认识的类型
    pub fn is_known(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl From<String> for RuleType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "cart_total" => Self::CartTotal,
            "collection" => Self::Collection,
            "customer_tag" => Self::CustomerTag,
            "country" => Self::Country,
            _ => Self::Other(s),
        }
    }
}

impl From<&str> for RuleType {
    fn from(s: &str) -> Self {
        Self::from(s.to_string())
    }
}

impl From<RuleType> for String {
    fn from(t: RuleType) -> Self {
        match t {
            RuleType::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_active() -> bool {
    true
}

/// 商家规则
///
/// `condition` 保留原始 JSON 载荷，具体形状由 `rule_type` 决定；
/// 构建引擎时再解析为强类型的 [`RuleCondition`]。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub shop_id: String,
    #[serde(rename = "type")]
    pub rule_type: RuleType,
    #[serde(default)]
    pub condition: Value,
    pub message: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Rule {
    pub fn new(
        shop_id: impl Into<String>,
        rule_type: impl Into<RuleType>,
        condition: Value,
        message: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            shop_id: shop_id.into(),
            rule_type: rule_type.into(),
            condition,
            message: message.into(),
            is_active: true,
            priority: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// 购物车金额条件载荷
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CartTotalCondition {
    pub operator: ComparisonOperator,
    pub value: f64,
}

/// 强类型规则条件
///
/// 每种规则类型对应一个变体。载荷缺字段、字段类型不符、操作符未知或规则类型
/// 未知时得到 `Unsupported`，它永远不匹配。
#[derive(Debug, Clone, PartialEq)]
pub enum RuleCondition {
    CartTotal(CartTotalCondition),
    Collection { collection_id: String },
    CustomerTag { tag: String },
    Country { country: String },
    Unsupported,
}

impl RuleCondition {
    /// 按规则类型解析条件载荷
    pub fn parse(rule_type: &RuleType, payload: &Value) -> Self {
        let parsed = match rule_type {
            RuleType::CartTotal => Self::parse_cart_total(payload),
            RuleType::Collection => string_field(payload, "collectionId")
                .map(|collection_id| Self::Collection { collection_id }),
            RuleType::CustomerTag => {
                string_field(payload, "tag").map(|tag| Self::CustomerTag { tag })
            }
            RuleType::Country => {
                string_field(payload, "country").map(|country| Self::Country { country })
            }
            RuleType::Other(_) => None,
        };

        parsed.unwrap_or(Self::Unsupported)
    }

    fn parse_cart_total(payload: &Value) -> Option<Self> {
        let operator = payload.get("operator")?.as_str()?.parse().ok()?;
        let value = payload.get("value")?.as_f64()?;
        Some(Self::CartTotal(CartTotalCondition { operator, value }))
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unsupported)
    }
}

impl fmt::Display for RuleCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CartTotal(c) => write!(f, "cart.total {} {}", c.operator, c.value),
            Self::Collection { collection_id } => write!(f, "collection contains {}", collection_id),
            Self::CustomerTag { tag } => write!(f, "customer tag {}", tag),
            Self::Country { country } => write!(f, "country {}", country),
            Self::Unsupported => write!(f, "unsupported"),
        }
    }
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    payload.get(key)?.as_str().map(str::to_string)
}

/// 显式的 `null` 与缺失字段一样取默认值
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// 店面 cart.js 给出的商品 / 变体 ID 是数字，统一转成字符串
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None => Ok(String::new()),
        Some(Value::String(s)) => Ok(s),
        Some(Value::Number(n)) => Ok(n.to_string()),
        Some(other) => Err(serde::de::Error::custom(format!(
            "ID 必须是字符串或数字，实际为 {}",
            other
        ))),
    }
}

/// 购物车商品行
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartItem {
    #[serde(deserialize_with = "id_string")]
    pub product_id: String,
    #[serde(deserialize_with = "id_string")]
    pub variant_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub quantity: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub collection_ids: Vec<String>,
}

impl CartItem {
    pub fn new(product_id: impl Into<String>, variant_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            variant_id: variant_id.into(),
            quantity,
            collection_ids: Vec::new(),
        }
    }

    pub fn with_collections<I, S>(mut self, collection_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.collection_ids = collection_ids.into_iter().map(Into::into).collect();
        self
    }
}

/// 购物车快照 - 每次评估时由店面侧构造
///
/// 金额为主货币单位（如美元），由调用方从平台的最小货币单位换算而来。
/// 缺失或为 `null` 的字段按空集合 / 0 处理。
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CartSnapshot {
    #[serde(deserialize_with = "null_as_default")]
    pub total: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub items: Vec<CartItem>,
    #[serde(deserialize_with = "null_as_default")]
    pub customer_tags: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub country_code: String,
}

impl CartSnapshot {
    /// 顾客标签和国家由边界层显式传入，不从全局上下文读取
    pub fn new(
        total: f64,
        items: Vec<CartItem>,
        customer_tags: Vec<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            total,
            items,
            customer_tags,
            country_code: country_code.into(),
        }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// 带追踪的评估结果
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationResult {
    pub matched: bool,
    pub rule_id: Option<String>,
    pub message: Option<String>,
    /// 实际检查过条件的规则数
    pub evaluated_rules: usize,
    pub skipped_inactive: usize,
    pub trace: Vec<String>,
}
