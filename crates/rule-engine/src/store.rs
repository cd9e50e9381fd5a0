//! 规则存储管理
//!
//! 使用 DashMap 提供线程安全的规则缓存，支持规则的创建、更新、删除和按店铺构建引擎。

use crate::engine::RulesEngine;
use crate::error::{Result, RuleError};
use crate::models::{Rule, RuleType};
use chrono::Utc;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, instrument, warn};
use uuid::Uuid;

fn default_active() -> bool {
    true
}

/// 新建规则的输入
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRule {
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
}

/// 部分更新，`None` 字段保持原值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulePatch {
    pub shop_id: Option<String>,
    #[serde(rename = "type")]
    pub rule_type: Option<RuleType>,
    pub condition: Option<Value>,
    pub message: Option<String>,
    pub is_active: Option<bool>,
    pub priority: Option<i32>,
}

impl RulePatch {
    fn apply(self, rule: &mut Rule) {
        if let Some(shop_id) = self.shop_id {
            rule.shop_id = shop_id;
        }
        if let Some(rule_type) = self.rule_type {
            rule.rule_type = rule_type;
        }
        if let Some(condition) = self.condition {
            rule.condition = condition;
        }
        if let Some(message) = self.message {
            rule.message = message;
        }
        if let Some(is_active) = self.is_active {
            rule.is_active = is_active;
        }
        if let Some(priority) = self.priority {
            rule.priority = priority;
        }
        rule.updated_at = Utc::now();
    }
}

/// 带插入序号的规则，序号决定同优先级规则的先后
#[derive(Debug, Clone)]
struct StoredRule {
    seq: u64,
    rule: Rule,
}

/// 规则存储
#[derive(Clone, Default)]
pub struct RuleStore {
    rules: Arc<DashMap<String, StoredRule>>,
    next_seq: Arc<AtomicU64>,
}

impl RuleStore {
    /// 创建新的规则存储
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn insert(&self, rule: Rule) {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        self.rules.insert(rule.id.clone(), StoredRule { seq, rule });
    }

    /// 创建规则，分配 ID 和时间戳
    #[instrument(skip(self, new_rule), fields(shop_id = %new_rule.shop_id, rule_type = %new_rule.rule_type))]
    pub fn create(&self, new_rule: NewRule) -> Rule {
        let now = Utc::now();
        let rule = Rule {
            id: Uuid::new_v4().to_string(),
            shop_id: new_rule.shop_id,
            rule_type: new_rule.rule_type,
            condition: new_rule.condition,
            message: new_rule.message,
            is_active: new_rule.is_active,
            priority: new_rule.priority,
            created_at: now,
            updated_at: now,
        };

        self.insert(rule.clone());
        info!("规则已创建: {}", rule.id);
        rule
    }

    /// 从 JSON 规则数组加载（如启动时的初始规则文件），保留其中的 ID
    ///
    /// 整个数组解析成功才写入，格式错误时存储保持不变。
    #[instrument(skip(self, json))]
    pub fn load_from_json(&self, json: &str) -> Result<Vec<String>> {
        let rules: Vec<Rule> = serde_json::from_str(json)?;
        Ok(self.load_batch(rules))
    }

    /// 批量加载规则，按给定顺序分配插入序号
    #[instrument(skip(self, rules))]
    pub fn load_batch(&self, rules: Vec<Rule>) -> Vec<String> {
        let mut loaded_ids = Vec::with_capacity(rules.len());
        for rule in rules {
            loaded_ids.push(rule.id.clone());
            self.insert(rule);
        }

        info!("批量加载完成: {} 条规则", loaded_ids.len());
        loaded_ids
    }

    /// 更新规则
    #[instrument(skip(self, patch))]
    pub fn update(&self, rule_id: &str, patch: RulePatch) -> Result<Rule> {
        match self.rules.get_mut(rule_id) {
            Some(mut stored) => {
                patch.apply(&mut stored.rule);
                info!("规则已更新: {}", rule_id);
                Ok(stored.rule.clone())
            }
            None => {
                warn!("更新不存在的规则: {}", rule_id);
                Err(RuleError::RuleNotFound(rule_id.to_string()))
            }
        }
    }

    /// 删除规则
    #[instrument(skip(self))]
    pub fn delete(&self, rule_id: &str) -> Result<()> {
        if self.rules.remove(rule_id).is_some() {
            info!("规则已删除: {}", rule_id);
            Ok(())
        } else {
            warn!("删除不存在的规则: {}", rule_id);
            Err(RuleError::RuleNotFound(rule_id.to_string()))
        }
    }

    pub fn get(&self, rule_id: &str) -> Option<Rule> {
        self.rules.get(rule_id).map(|r| r.rule.clone())
    }

    pub fn contains(&self, rule_id: &str) -> bool {
        self.rules.contains_key(rule_id)
    }

    fn collect_sorted<F>(&self, keep: F) -> Vec<StoredRule>
    where
        F: Fn(&Rule) -> bool,
    {
        let mut rules: Vec<StoredRule> = self
            .rules
            .iter()
            .filter(|r| keep(&r.rule))
            .map(|r| r.value().clone())
            .collect();
        rules.sort_by_key(|r| r.seq);
        rules
    }

    /// 获取所有规则，按优先级降序，同优先级按创建顺序
    pub fn list(&self) -> Vec<Rule> {
        let mut rules: Vec<Rule> = self.collect_sorted(|_| true).into_iter().map(|r| r.rule).collect();
        rules.sort_by_key(|r| std::cmp::Reverse(r.priority));
        rules
    }

    /// 获取店铺的规则，按创建顺序
    pub fn list_for_shop(&self, shop_id: &str) -> Vec<Rule> {
        self.collect_sorted(|r| r.shop_id == shop_id)
            .into_iter()
            .map(|r| r.rule)
            .collect()
    }

    /// 用店铺当前启用的规则构建引擎
    ///
    /// 引擎是构建时刻的快照，之后的规则变更需要重新调用。
    #[instrument(skip(self))]
    pub fn engine_for_shop(&self, shop_id: &str) -> RulesEngine {
        let rules = self
            .collect_sorted(|r| r.shop_id == shop_id && r.is_active)
            .into_iter()
            .map(|r| r.rule);
        RulesEngine::new(rules)
    }

    /// 获取规则统计信息
    pub fn stats(&self) -> RuleStoreStats {
        let mut shops = HashSet::new();
        let mut active_count = 0;
        for entry in self.rules.iter() {
            shops.insert(entry.rule.shop_id.clone());
            if entry.rule.is_active {
                active_count += 1;
            }
        }

        RuleStoreStats {
            rules_count: self.rules.len(),
            active_count,
            shops_count: shops.len(),
        }
    }
}

/// 规则存储统计信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleStoreStats {
    /// 规则总数
    pub rules_count: usize,
    /// 启用的规则数
    pub active_count: usize,
    /// 涉及的店铺数
    pub shops_count: usize,
}
