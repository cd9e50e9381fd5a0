//! 店铺前台购物车评估
//!
//! 主题脚本在购物车变化时提交当前购物车快照，拿到应当展示的消息。

use std::time::Instant;

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use cart_shared::observability::metrics;
use rule_engine::CartSnapshot;
use tracing::{debug, instrument};

use crate::{
    dto::{EvaluateCartQuery, EvaluateCartResponse},
    error::ServiceError,
    state::AppState,
};

/// 评估购物车
///
/// POST /api/evaluate-cart?shopId=
///
/// 只使用该店铺已启用的规则；没有规则命中时返回 `{"message": null}`。
#[instrument(skip_all, fields(shop_id = tracing::field::Empty))]
pub async fn evaluate_cart(
    State(state): State<AppState>,
    Query(query): Query<EvaluateCartQuery>,
    payload: Result<Json<CartSnapshot>, JsonRejection>,
) -> Result<Json<EvaluateCartResponse>, ServiceError> {
    let shop_id = query
        .shop_id
        .filter(|id| !id.is_empty())
        .ok_or(ServiceError::MissingShopId)?;
    tracing::Span::current().record("shop_id", shop_id.as_str());
    let Json(cart) = payload?;

    let start = Instant::now();
    let engine = state.store.engine_for_shop(&shop_id);
    let message = engine.evaluate(&cart).map(str::to_string);

    metrics::record_cart_evaluation(
        message.is_some(),
        engine.len(),
        start.elapsed().as_secs_f64(),
    );
    debug!(rules = engine.len(), matched = message.is_some(), "购物车评估完成");

    Ok(Json(EvaluateCartResponse { message }))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use rule_engine::{NewRule, RuleStore, RuleType};
    use serde_json::json;

    use crate::handlers::test_support::{app, body_json, send};

    fn seed() -> RuleStore {
        let store = RuleStore::new();
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::CartTotal,
            condition: json!({"operator": ">", "value": 100}),
            message: "Free Shipping".to_string(),
            is_active: true,
            priority: 10,
        });
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::CustomerTag,
            condition: json!({"tag": "VIP"}),
            message: "VIP Discount".to_string(),
            is_active: true,
            priority: 5,
        });
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::Country,
            condition: json!({"country": "us"}),
            message: "Hidden".to_string(),
            is_active: false,
            priority: 100,
        });
        store.create(NewRule {
            shop_id: "shop-2".to_string(),
            rule_type: RuleType::Country,
            condition: json!({"country": "US"}),
            message: "Other shop".to_string(),
            is_active: true,
            priority: 100,
        });
        store
    }

    #[tokio::test]
    async fn test_evaluate_cart_first_match() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({
                "total": 150.0,
                "items": [],
                "customerTags": ["VIP"],
                "countryCode": "US"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": "Free Shipping"}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_falls_through_to_lower_priority() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({"total": 50.0, "customerTags": ["VIP"], "countryCode": "US"})),
        )
        .await;

        assert_eq!(body_json(response).await, json!({"message": "VIP Discount"}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_no_match_returns_null() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({"total": 50.0, "countryCode": "US"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": null}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_unknown_shop_returns_null() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart?shopId=shop-404",
            Some(json!({"total": 500.0})),
        )
        .await;

        assert_eq!(body_json(response).await, json!({"message": null}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_requires_shop_id() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart",
            Some(json!({"total": 150.0})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "MISSING_SHOP_ID");
    }

    #[tokio::test]
    async fn test_evaluate_cart_empty_shop_id_rejected() {
        let response = send(
            app(seed()),
            "POST",
            "/api/evaluate-cart?shopId=",
            Some(json!({"total": 150.0})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    fn collection_store() -> RuleStore {
        let store = RuleStore::new();
        store.create(NewRule {
            shop_id: "shop-1".to_string(),
            rule_type: RuleType::Collection,
            condition: json!({"collectionId": "C1"}),
            message: "Summer collection".to_string(),
            is_active: true,
            priority: 0,
        });
        store
    }

    #[tokio::test]
    async fn test_evaluate_cart_accepts_numeric_item_ids() {
        let response = send(
            app(collection_store()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({
                "total": 29.99,
                "items": [{
                    "productId": 632910392,
                    "variantId": 808950810,
                    "quantity": 1,
                    "collectionIds": ["C1"]
                }],
                "customerTags": [],
                "countryCode": "US"
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": "Summer collection"}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_null_fields_are_defaults() {
        let response = send(
            app(collection_store()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({
                "total": 60,
                "items": [{"collectionIds": ["C1"]}],
                "customerTags": null,
                "countryCode": null
            })),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"message": "Summer collection"}));
    }

    #[tokio::test]
    async fn test_evaluate_cart_malformed_body_uses_error_body() {
        let response = send(
            app(collection_store()),
            "POST",
            "/api/evaluate-cart?shopId=shop-1",
            Some(json!({"items": "not-a-list"})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INVALID_BODY");
    }
}
