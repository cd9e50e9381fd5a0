//! 规则预览 API 处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use rule_engine::{EvaluationResult, RulesEngine};
use tracing::debug;

use crate::{
    dto::{ApiResponse, PreviewRequest},
    error::ServiceError,
    state::AppState,
};

/// 预览规则命中结果
///
/// POST /api/rules/preview
///
/// 返回带逐条追踪的评估结果，停用的规则也会出现在追踪里。
pub async fn preview_rules(
    State(state): State<AppState>,
    payload: Result<Json<PreviewRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<EvaluationResult>>, ServiceError> {
    let Json(req) = payload?;
    let rules = match (req.rules, req.shop_id.as_deref()) {
        (Some(rules), _) => rules,
        (None, Some(shop_id)) if !shop_id.is_empty() => state.store.list_for_shop(shop_id),
        _ => state.store.list(),
    };

    let engine = RulesEngine::new(rules);
    let result = req.input.run(&engine);

    debug!(
        rules = engine.len(),
        matched = result.matched,
        "规则预览完成"
    );
    Ok(Json(ApiResponse::success(result)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rule_engine::{NewRule, RuleStore, RuleType};
    use serde_json::json;

    use crate::handlers::test_support::{app, body_json, send};

    #[tokio::test]
    async fn test_preview_with_inline_rules() {
        let response = send(
            app(RuleStore::new()),
            "POST",
            "/api/rules/preview",
            Some(json!({
                "rules": [
                    {"id": "r1", "shopId": "s", "type": "collection",
                     "condition": {"collectionId": "summer"}, "message": "Summer sale",
                     "isActive": true, "priority": 1},
                    {"id": "r2", "shopId": "s", "type": "country",
                     "condition": {"country": "us"}, "message": "Hello US",
                     "isActive": true, "priority": 0}
                ],
                "total": 10.0,
                "collections": ["summer"]
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["matched"], true);
        assert_eq!(body["data"]["ruleId"], "r1");
        assert_eq!(body["data"]["message"], "Summer sale");
    }

    #[tokio::test]
    async fn test_preview_uses_shop_rules_and_default_country() {
        let store = RuleStore::new();
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::Country,
            condition: json!({"country": "US"}),
            message: "Hello US".to_string(),
            is_active: true,
            priority: 0,
        });
        store.create(NewRule {
            shop_id: "shop-2".to_string(),
            rule_type: RuleType::CartTotal,
            condition: json!({"operator": ">=", "value": 0}),
            message: "Other shop".to_string(),
            is_active: true,
            priority: 10,
        });

        let response = send(
            app(store),
            "POST",
            "/api/rules/preview",
            Some(json!({"shopId": "shop-1", "total": 5.0})),
        )
        .await;

        let body = body_json(response).await;
        assert_eq!(body["data"]["message"], "Hello US");
        assert_eq!(body["data"]["evaluatedRules"], 1);
    }

    #[tokio::test]
    async fn test_preview_no_match_has_trace() {
        let store = RuleStore::new();
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::CustomerTag,
            condition: json!({"tag": "VIP"}),
            message: "VIP".to_string(),
            is_active: false,
            priority: 0,
        });

        let response = send(
            app(store),
            "POST",
            "/api/rules/preview",
            Some(json!({"shopId": "shop-1", "customerTags": ["VIP"]})),
        )
        .await;

        let body = body_json(response).await;
        assert_eq!(body["data"]["matched"], false);
        assert!(body["data"]["message"].is_null());
        assert_eq!(body["data"]["skippedInactive"], 1);
        assert!(!body["data"]["trace"].as_array().unwrap().is_empty());
    }
}
