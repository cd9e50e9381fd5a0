//! 购物车消息服务错误类型定义

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use rule_engine::RuleError;
use serde_json::json;

/// 服务错误类型
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    // 请求错误
    #[error("参数验证失败: {0}")]
    Validation(String),
    #[error("请求体无效: {0}")]
    InvalidBody(String),
    #[error("缺少店铺 ID")]
    MissingShopId,
    #[error("规则格式无效: {0}")]
    InvalidRule(String),

    // 资源不存在
    #[error("规则不存在: {0}")]
    RuleNotFound(String),

    // 外部调用错误
    #[error("订单备注写入失败: {0}")]
    OrderNote(String),

    // 系统错误
    #[error("内部错误: {0}")]
    Internal(String),
}

impl ServiceError {
    /// 返回对应的 HTTP 状态码
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::InvalidBody(_)
            | Self::MissingShopId
            | Self::InvalidRule(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::RuleNotFound(_) => StatusCode::NOT_FOUND,
            Self::OrderNote(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回错误码（用于 API 响应）
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::InvalidBody(_) => "INVALID_BODY",
            Self::MissingShopId => "MISSING_SHOP_ID",
            Self::InvalidRule(_) => "INVALID_RULE",
            Self::RuleNotFound(_) => "RULE_NOT_FOUND",
            Self::OrderNote(_) => "ORDER_NOTE_FAILED",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // 外部调用和系统错误只返回通用提示，详细信息仅记录日志
        let message = match &self {
            Self::OrderNote(e) => {
                tracing::error!(error = %e, "订单备注写入失败");
                "订单备注保存失败，请稍后重试".to_string()
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, "内部错误");
                "服务内部错误，请稍后重试".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "success": false,
            "code": self.error_code(),
            "message": message,
            "data": serde_json::Value::Null
        });

        (status, axum::Json(body)).into_response()
    }
}

/// 从 validator 错误转换
impl From<validator::ValidationErrors> for ServiceError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::Validation(errors.to_string())
    }
}

/// 从 JSON 请求体解析失败转换
impl From<JsonRejection> for ServiceError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection.body_text())
    }
}

/// 从规则引擎错误转换
impl From<RuleError> for ServiceError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::RuleNotFound(id) => Self::RuleNotFound(id),
            RuleError::ParseError(msg) => Self::InvalidRule(msg),
            RuleError::JsonError(e) => Self::InvalidRule(e.to_string()),
        }
    }
}

/// 从 HTTP 客户端错误转换
impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::OrderNote(err.to_string())
    }
}

/// 服务层 Result 类型别名
pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            ServiceError::MissingShopId.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ServiceError::RuleNotFound("r1".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::OrderNote("timeout".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_from_rule_error() {
        let err: ServiceError = RuleError::RuleNotFound("r1".into()).into();
        assert!(matches!(err, ServiceError::RuleNotFound(ref id) if id == "r1"));

        let err: ServiceError = RuleError::ParseError("bad".into()).into();
        assert_eq!(err.error_code(), "INVALID_RULE");
    }

    #[tokio::test]
    async fn test_internal_error_hides_details() {
        let response = ServiceError::Internal("token=secret".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("secret"));
        assert!(text.contains("INTERNAL_ERROR"));
    }
}
