//! 通用类型定义模块
//!
//! 提供跨模块共享的数据值、查询条件和缓存配置类型

pub mod cache_config;
pub mod data_value;
pub mod query;

pub use cache_config::{CacheableConfig, CacheableConfigBuilder};
pub use data_value::DataValue;
pub use query::{
    PaginationConfig, QueryCondition, QueryOperator, QueryOptions, SortConfig, SortDirection,
};
