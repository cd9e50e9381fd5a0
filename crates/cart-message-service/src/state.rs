//! 应用状态定义

use std::sync::Arc;

use rule_engine::RuleStore;

use crate::order_note::OrderNoteWriter;

/// Axum 应用共享状态
#[derive(Clone)]
pub struct AppState {
    /// 规则存储
    pub store: RuleStore,
    /// 订单备注回写
    pub order_notes: Arc<dyn OrderNoteWriter>,
}

impl AppState {
    pub fn new(store: RuleStore, order_notes: Arc<dyn OrderNoteWriter>) -> Self {
        Self { store, order_notes }
    }
}
