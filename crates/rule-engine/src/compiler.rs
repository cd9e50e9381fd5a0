//! 规则编译器
//!
//! 把原始规则记录中的 JSON 条件解析为强类型的 [`RuleCondition`]，供引擎直接匹配。

use crate::error::{Result, RuleError};
use crate::models::{Rule, RuleCondition, RuleType};

/// 编译后的规则
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// 原始规则
    pub rule: Rule,
    /// 解析后的条件
    pub condition: RuleCondition,
}

impl CompiledRule {
    pub fn id(&self) -> &str {
        &self.rule.id
    }

    pub fn message(&self) -> &str {
        &self.rule.message
    }

    pub fn priority(&self) -> i32 {
        self.rule.priority
    }

    pub fn is_active(&self) -> bool {
        self.rule.is_active
    }
}

/// 规则编译器
pub struct RuleCompiler;

impl RuleCompiler {
    /// 编译规则
    ///
    /// 永不失败：无法解析的条件编译为 `RuleCondition::Unsupported`。
    pub fn compile(rule: Rule) -> CompiledRule {
        let condition = RuleCondition::parse(&rule.rule_type, &rule.condition);
        CompiledRule { rule, condition }
    }

    /// 严格校验规则
    ///
    /// 引擎本身对坏规则静默跳过；写入方可以用它提前发现永远不会匹配的规则。
    pub fn validate(rule: &Rule) -> Result<()> {
        if let RuleType::Other(t) = &rule.rule_type {
            return Err(RuleError::ParseError(format!("未知的规则类型: {}", t)));
        }

        if !RuleCondition::parse(&rule.rule_type, &rule.condition).is_supported() {
            return Err(RuleError::ParseError(format!(
                "规则 '{}' 的 {} 条件无效: {}",
                rule.id, rule.rule_type, rule.condition
            )));
        }

        Ok(())
    }
}
