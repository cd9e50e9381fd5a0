//! 购物车消息规则引擎
//!
//! 根据商家配置的规则（购物车金额、商品集合、顾客标签、国家）决定店面购物车上展示哪条消息：
//! - 规则按优先级降序稳定排序
//! - 首个启用且命中的规则获胜，短路返回
//! - 未知规则类型和无效条件静默视为不匹配
//! - 后台预览与线程安全的内存规则存储

pub mod compiler;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod models;
pub mod operators;
pub mod preview;
pub mod store;

pub use compiler::{CompiledRule, RuleCompiler};
pub use engine::RulesEngine;
pub use error::{Result, RuleError};
pub use evaluator::ConditionEvaluator;
pub use models::{
    CartItem, CartSnapshot, CartTotalCondition, EvaluationResult, Rule, RuleCondition, RuleType,
};
pub use operators::ComparisonOperator;
pub use preview::PreviewInput;
pub use store::{NewRule, RulePatch, RuleStore, RuleStoreStats};
