//! 条件评估器
//!
//! 每种条件变体对应一个匹配谓词。

use crate::models::{CartItem, CartSnapshot, CartTotalCondition, RuleCondition};

/// 条件评估器
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// 判断条件是否命中购物车
    pub fn matches(condition: &RuleCondition, cart: &CartSnapshot) -> bool {
        match condition {
            RuleCondition::CartTotal(c) => Self::cart_total(cart.total, c),
            RuleCondition::Collection { collection_id } => {
                Self::collection(&cart.items, collection_id)
            }
            RuleCondition::CustomerTag { tag } => Self::customer_tag(&cart.customer_tags, tag),
            RuleCondition::Country { country } => Self::country(&cart.country_code, country),
            RuleCondition::Unsupported => false,
        }
    }

    fn cart_total(total: f64, condition: &CartTotalCondition) -> bool {
        condition.operator.compare(total, condition.value)
    }

    /// 任一商品属于该集合即命中
    fn collection(items: &[CartItem], collection_id: &str) -> bool {
        items
            .iter()
            .any(|item| item.collection_ids.iter().any(|id| id == collection_id))
    }

    /// 大小写敏感
    fn customer_tag(tags: &[String], tag: &str) -> bool {
        tags.iter().any(|t| t == tag)
    }

    /// 两边都转大写后比较
    fn country(country_code: &str, expected: &str) -> bool {
        country_code.to_uppercase() == expected.to_uppercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RuleType;
    use crate::operators::ComparisonOperator;
    use serde_json::json;

    fn cart_with_total(total: f64) -> CartSnapshot {
        CartSnapshot {
            total,
            ..Default::default()
        }
    }

    fn total_condition(operator: ComparisonOperator, value: f64) -> RuleCondition {
        RuleCondition::CartTotal(CartTotalCondition { operator, value })
    }

    #[test]
    fn test_cart_total_strict_gt() {
        let cond = total_condition(ComparisonOperator::Gt, 100.0);
        assert!(ConditionEvaluator::matches(&cond, &cart_with_total(150.0)));
        assert!(!ConditionEvaluator::matches(&cond, &cart_with_total(100.0)));
    }

    #[test]
    fn test_cart_total_gte() {
        let cond = total_condition(ComparisonOperator::Gte, 100.0);
        assert!(ConditionEvaluator::matches(&cond, &cart_with_total(100.0)));
        assert!(!ConditionEvaluator::matches(&cond, &cart_with_total(99.99)));
    }

    #[test]
    fn test_cart_total_lt_lte_eq() {
        assert!(ConditionEvaluator::matches(
            &total_condition(ComparisonOperator::Lt, 50.0),
            &cart_with_total(49.0)
        ));
        assert!(ConditionEvaluator::matches(
            &total_condition(ComparisonOperator::Lte, 50.0),
            &cart_with_total(50.0)
        ));
        assert!(ConditionEvaluator::matches(
            &total_condition(ComparisonOperator::Eq, 50.0),
            &cart_with_total(50.0)
        ));
        assert!(!ConditionEvaluator::matches(
            &total_condition(ComparisonOperator::Eq, 50.0),
            &cart_with_total(50.01)
        ));
    }

    #[test]
    fn test_collection_any_item() {
        let cond = RuleCondition::Collection {
            collection_id: "C1".to_string(),
        };
        let cart = CartSnapshot {
            items: vec![
                CartItem::new("p1", "v1", 1).with_collections(["C2"]),
                CartItem::new("p2", "v2", 1).with_collections(["C1", "C3"]),
            ],
            ..Default::default()
        };

        assert!(ConditionEvaluator::matches(&cond, &cart));

        let other = CartSnapshot {
            items: vec![CartItem::new("p1", "v1", 1).with_collections(["C2"])],
            ..Default::default()
        };
        assert!(!ConditionEvaluator::matches(&cond, &other));
        assert!(!ConditionEvaluator::matches(&cond, &CartSnapshot::default()));
    }

    #[test]
    fn test_customer_tag_case_sensitive() {
        let cond = RuleCondition::CustomerTag {
            tag: "VIP".to_string(),
        };

        let lower = CartSnapshot {
            customer_tags: vec!["vip".to_string()],
            ..Default::default()
        };
        assert!(!ConditionEvaluator::matches(&cond, &lower));

        let exact = CartSnapshot {
            customer_tags: vec!["wholesale".to_string(), "VIP".to_string()],
            ..Default::default()
        };
        assert!(ConditionEvaluator::matches(&cond, &exact));
    }

    #[test]
    fn test_country_case_insensitive() {
        let cond = RuleCondition::Country {
            country: "us".to_string(),
        };

        let us = CartSnapshot {
            country_code: "US".to_string(),
            ..Default::default()
        };
        let ca = CartSnapshot {
            country_code: "CA".to_string(),
            ..Default::default()
        };

        assert!(ConditionEvaluator::matches(&cond, &us));
        assert!(!ConditionEvaluator::matches(&cond, &ca));
    }

    #[test]
    fn test_unsupported_never_matches() {
        let cond = RuleCondition::parse(&RuleType::CartTotal, &json!({"operator": "~", "value": 0}));
        assert!(!ConditionEvaluator::matches(&cond, &cart_with_total(0.0)));
        assert!(!ConditionEvaluator::matches(
            &RuleCondition::Unsupported,
            &cart_with_total(1000.0)
        ));
    }
}
