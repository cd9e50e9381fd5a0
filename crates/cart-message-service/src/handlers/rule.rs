//! 规则管理 API 处理器
//!
//! 商家后台的规则 CRUD。未知类型或格式不对的条件允许保存（评估时永远不命中），
//! 只记录告警，方便商家先存草稿再补全。

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use cart_shared::observability::metrics;
use rule_engine::{Rule, RuleCompiler};
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    dto::{ApiResponse, CreateRuleRequest, ListRulesQuery, UpdateRuleRequest},
    error::ServiceError,
    state::AppState,
};

/// 规则无法命中时记录告警
fn warn_if_inert(rule: &Rule) {
    if let Err(e) = RuleCompiler::validate(rule) {
        warn!(rule_id = %rule.id, error = %e, "规则已保存，但评估时不会命中");
    }
}

/// 获取规则列表
///
/// GET /api/rules
///
/// 不带 `shopId` 时返回全部规则（优先级降序）；带 `shopId` 时按创建顺序返回该店铺的规则。
pub async fn list_rules(
    State(state): State<AppState>,
    Query(query): Query<ListRulesQuery>,
) -> Json<ApiResponse<Vec<Rule>>> {
    let rules = match query.shop_id.as_deref() {
        Some(shop_id) if !shop_id.is_empty() => state.store.list_for_shop(shop_id),
        _ => state.store.list(),
    };
    Json(ApiResponse::success(rules))
}

/// 获取规则详情
///
/// GET /api/rules/{id}
pub async fn get_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<Rule>>, ServiceError> {
    let rule = state
        .store
        .get(&id)
        .ok_or(ServiceError::RuleNotFound(id))?;
    Ok(Json(ApiResponse::success(rule)))
}

/// 创建规则
///
/// POST /api/rules
#[instrument(skip_all)]
pub async fn create_rule(
    State(state): State<AppState>,
    payload: Result<Json<CreateRuleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Rule>>), ServiceError> {
    let Json(req) = payload?;
    req.validate()?;

    let rule = state.store.create(req.into());
    warn_if_inert(&rule);
    metrics::record_rule_mutation("create");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(rule))))
}

/// 更新规则
///
/// PUT /api/rules/{id}
#[instrument(skip(state, payload))]
pub async fn update_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateRuleRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<Rule>>, ServiceError> {
    let Json(req) = payload?;
    req.validate()?;

    let rule = state.store.update(&id, req.into())?;
    warn_if_inert(&rule);
    metrics::record_rule_mutation("update");

    info!(rule_id = %rule.id, "Rule updated");
    Ok(Json(ApiResponse::success(rule)))
}

/// 删除规则
///
/// DELETE /api/rules/{id}
#[instrument(skip(state))]
pub async fn delete_rule(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ServiceError> {
    state.store.delete(&id)?;
    metrics::record_rule_mutation("delete");

    info!(rule_id = %id, "Rule deleted");
    Ok(StatusCode::NO_CONTENT)
}
