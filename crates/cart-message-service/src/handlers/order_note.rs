//! 订单备注回写 API 处理器

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use cart_shared::observability::metrics;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::{
    dto::{ApiResponse, SaveOrderNoteRequest},
    error::ServiceError,
    order_note::OrderTarget,
    state::AppState,
};

/// 保存订单备注
///
/// POST /api/save-order-note
///
/// 五个字段都必填，任何一个缺失返回 400。
#[instrument(skip_all)]
pub async fn save_order_note(
    State(state): State<AppState>,
    payload: Result<Json<SaveOrderNoteRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<()>>, ServiceError> {
    let Json(req) = payload?;
    req.validate()?;

    let shop_id = req.shop_id;
    let target = OrderTarget {
        shop_domain: req.shop_domain,
        access_token: req.access_token,
        order_id: req.order_id,
    };

    match state.order_notes.write(&target, &req.message).await {
        Ok(()) => {
            metrics::record_order_note_write("success");
            info!(shop_id = %shop_id, order_id = %target.order_id, "Order note saved");
            Ok(Json(ApiResponse::<()>::success_empty()))
        }
        Err(e) => {
            metrics::record_order_note_write("failure");
            warn!(shop_id = %shop_id, order_id = %target.order_id, "Order note write failed");
            Err(e)
        }
    }
}
