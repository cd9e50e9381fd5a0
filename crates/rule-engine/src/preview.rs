//! 规则预览
//!
//! 商家后台用一组测试数据（金额、集合、标签、国家）构造一个单商品购物车，
//! 用来预览当前规则会展示哪条消息。

use crate::engine::RulesEngine;
use crate::models::{CartItem, CartSnapshot, EvaluationResult};
use serde::{Deserialize, Serialize};

fn default_country() -> String {
    "US".to_string()
}

/// 预览输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewInput {
    #[serde(default)]
    pub total: f64,
    #[serde(default)]
    pub collections: Vec<String>,
    #[serde(default)]
    pub customer_tags: Vec<String>,
    #[serde(default = "default_country")]
    pub country_code: String,
}

impl Default for PreviewInput {
    fn default() -> Self {
        Self {
            total: 0.0,
            collections: Vec::new(),
            customer_tags: Vec::new(),
            country_code: default_country(),
        }
    }
}

impl PreviewInput {
    /// 从后台表单的逗号分隔文本构造
    pub fn from_form(total: f64, collections: &str, customer_tags: &str, country_code: &str) -> Self {
        Self {
            total,
            collections: split_list(collections),
            customer_tags: split_list(customer_tags),
            country_code: country_code.to_string(),
        }
    }

    /// 构造预览用购物车：一件商品，挂上全部测试集合
    pub fn to_cart(&self) -> CartSnapshot {
        CartSnapshot::new(
            self.total,
            vec![CartItem::new("1", "1", 1).with_collections(self.collections.iter().cloned())],
            self.customer_tags.clone(),
            self.country_code.clone(),
        )
    }

    pub fn run(&self, engine: &RulesEngine) -> EvaluationResult {
        engine.evaluate_with_trace(&self.to_cart())
    }
}

/// 逗号分隔并去除首尾空白，丢弃空项
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
