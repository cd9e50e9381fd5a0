//! 购物车消息服务
//!
//! 店铺前台提交购物车快照，服务按店铺规则返回应当展示的消息；
//! 商家后台通过同一服务管理规则、预览命中结果，并在下单后把消息回写到订单。
//!
//! ## 模块结构
//!
//! - `dto`: 请求和响应的数据传输对象
//! - `error`: 错误类型定义
//! - `handlers`: HTTP 请求处理器
//! - `order_note`: 订单备注回写客户端
//! - `routes`: 路由配置
//! - `state`: 应用状态

pub mod dto;
pub mod error;
pub mod handlers;
pub mod order_note;
pub mod routes;
pub mod state;

pub use dto::ApiResponse;
pub use error::{Result, ServiceError};
pub use order_note::{OrderNoteWriter, OrderTarget, ShopifyOrderClient};
pub use state::AppState;
