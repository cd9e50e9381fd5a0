//! 请求与响应 DTO

use rule_engine::{NewRule, PreviewInput, Rule, RulePatch};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError};

/// 统一 API 响应格式
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: Some(data),
        }
    }

    /// 创建成功响应（无数据）
    pub fn success_empty() -> ApiResponse<()> {
        ApiResponse {
            success: true,
            code: "SUCCESS".to_string(),
            message: "操作成功".to_string(),
            data: None,
        }
    }
}

/// 店铺前台评估请求的查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateCartQuery {
    pub shop_id: Option<String>,
}

/// 店铺前台评估响应
///
/// 前台脚本只认 `{"message": ...}`，不套统一响应格式。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EvaluateCartResponse {
    pub message: Option<String>,
}

/// 规则列表查询参数
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListRulesQuery {
    pub shop_id: Option<String>,
}

fn default_active() -> bool {
    true
}

/// 创建规则请求
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRuleRequest {
    #[validate(length(min = 1, message = "店铺 ID 不能为空"))]
    pub shop_id: String,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "规则类型不能为空"))]
    pub rule_type: String,
    #[serde(default)]
    pub condition: Value,
    #[validate(length(min = 1, message = "消息内容不能为空"))]
    pub message: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub priority: i32,
}

impl From<CreateRuleRequest> for NewRule {
    fn from(req: CreateRuleRequest) -> Self {
        Self {
            shop_id: req.shop_id,
            rule_type: req.rule_type.into(),
            condition: req.condition,
            message: req.message,
            is_active: req.is_active,
            priority: req.priority,
        }
    }
}

/// 更新规则请求，未提供的字段保持原值
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleRequest {
    #[validate(length(min = 1, message = "店铺 ID 不能为空"))]
    pub shop_id: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(min = 1, message = "规则类型不能为空"))]
    pub rule_type: Option<String>,
    pub condition: Option<Value>,
    #[validate(length(min = 1, message = "消息内容不能为空"))]
    pub message: Option<String>,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
}

impl From<UpdateRuleRequest> for RulePatch {
    fn from(req: UpdateRuleRequest) -> Self {
        Self {
            shop_id: req.shop_id,
            rule_type: req.rule_type.map(Into::into),
            condition: req.condition,
            message: req.message,
            is_active: req.is_active,
            priority: req.priority,
        }
    }
}

/// 规则预览请求
///
/// `rules` 优先；否则取 `shopId` 对应店铺的规则；两者都没有时预览全部规则。
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewRequest {
    pub rules: Option<Vec<Rule>>,
    pub shop_id: Option<String>,
    #[serde(flatten)]
    pub input: PreviewInput,
}

/// 订单备注回写请求
///
/// 字段缺失时按空串处理，由校验统一返回 400。
#[derive(Debug, Default, Deserialize, Validate)]
pub struct SaveOrderNoteRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "shop_id 不能为空"))]
    pub shop_id: String,
    #[serde(default)]
    #[validate(
        length(min = 1, message = "shop_domain 不能为空"),
        custom(function = "validate_shop_domain")
    )]
    pub shop_domain: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "access_token 不能为空"))]
    pub access_token: String,
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(
        length(min = 1, message = "order_id 不能为空"),
        custom(function = "validate_order_id")
    )]
    pub order_id: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "message 不能为空"))]
    pub message: String,
}

/// 店铺域名只允许 `{handle}.myshopify.com`，access token 只会发往平台域名
fn validate_shop_domain(domain: &str) -> Result<(), ValidationError> {
    let valid = domain
        .strip_suffix(".myshopify.com")
        .is_some_and(|handle| {
            !handle.is_empty()
                && !handle.starts_with('-')
                && handle
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-')
        });

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("shop_domain");
        err.message = Some("shop_domain 必须是 *.myshopify.com 域名".into());
        Err(err)
    }
}

/// 订单 ID 只能是数字，拼进请求路径前不允许出现其他字符
fn validate_order_id(order_id: &str) -> Result<(), ValidationError> {
    if order_id.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("order_id");
        err.message = Some("order_id 必须是数字".into());
        Err(err)
    }
}

/// 订单 ID 在 webhook 中是数字，在前端表单里是字符串，两种都接受
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "order_id 必须是字符串或数字，实际为 {}",
            other
        ))),
    }
}
