//! HTTP 服务层辅助 - 中间件与提取器

pub mod extractor;
pub mod middleware;

pub use extractor::ValidJson;
