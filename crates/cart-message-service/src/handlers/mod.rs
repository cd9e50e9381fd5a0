//! HTTP 请求处理器

pub mod evaluate;
pub mod order_note;
pub mod preview;
pub mod rule;
