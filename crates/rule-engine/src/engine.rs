//! 规则引擎
//!
//! 持有单个店铺的规则集（按优先级降序稳定排序），对购物车快照做首个命中即返回的评估。
//! 构建后只读，可在多个线程间共享并发评估；规则变更时由调用方重新构建。

use crate::compiler::{CompiledRule, RuleCompiler};
use crate::evaluator::ConditionEvaluator;
use crate::models::{CartSnapshot, EvaluationResult, Rule};
use std::cmp::Reverse;
use tracing::debug;

/// 规则引擎
#[derive(Debug, Clone, Default)]
pub struct RulesEngine {
    rules: Vec<CompiledRule>,
}

impl RulesEngine {
    /// 用一个店铺的规则构建引擎
    ///
    /// 按 `priority` 降序排列，同优先级保持输入顺序（`sort_by_key` 是稳定排序）。
    pub fn new(rules: impl IntoIterator<Item = Rule>) -> Self {
        let mut rules: Vec<CompiledRule> = rules.into_iter().map(RuleCompiler::compile).collect();
        rules.sort_by_key(|r| Reverse(r.priority()));
        Self { rules }
    }

    /// 从规则切片构建，不消费调用方的列表
    pub fn from_slice(rules: &[Rule]) -> Self {
        Self::new(rules.iter().cloned())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 评估顺序中的规则
    pub fn rules(&self) -> &[CompiledRule] {
        &self.rules
    }

    /// 评估购物车，返回第一条启用且命中的规则的消息
    pub fn evaluate(&self, cart: &CartSnapshot) -> Option<&str> {
        self.first_match(cart).map(CompiledRule::message)
    }

    /// 返回第一条启用且命中的规则
    pub fn first_match(&self, cart: &CartSnapshot) -> Option<&CompiledRule> {
        let matched = self
            .rules
            .iter()
            .filter(|r| r.is_active())
            .find(|r| ConditionEvaluator::matches(&r.condition, cart));

        if let Some(rule) = matched {
            debug!(rule_id = %rule.id(), priority = rule.priority(), "规则命中");
        }

        matched
    }

    /// 带追踪的评估，命中结果与 [`evaluate`](Self::evaluate) 一致
    pub fn evaluate_with_trace(&self, cart: &CartSnapshot) -> EvaluationResult {
        let mut result = EvaluationResult::default();

        for (i, rule) in self.rules.iter().enumerate() {
            if !rule.is_active() {
                result.skipped_inactive += 1;
                result
                    .trace
                    .push(format!("rules[{}] {}: 未启用，跳过", i, rule.id()));
                continue;
            }

            result.evaluated_rules += 1;
            let matched = ConditionEvaluator::matches(&rule.condition, cart);

            result.trace.push(format!(
                "rules[{}] {} (priority {}): {} => {}",
                i,
                rule.id(),
                rule.priority(),
                rule.condition,
                if matched { "MATCHED" } else { "NOT_MATCHED" }
            ));

            if matched {
                result.matched = true;
                result.rule_id = Some(rule.id().to_string());
                result.message = Some(rule.message().to_string());
                return result;
            }
        }

        result.trace.push("无规则命中".to_string());
        result
    }
}
