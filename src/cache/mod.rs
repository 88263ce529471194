//! 缓存管理模块
//!
//! 提供缓存键派生、范围注册表和查询结果存取功能，
//! 以及尽力而为的按范围批量失效。

// 导出所有子模块
pub mod cache_manager;
pub mod key_generator;
pub mod query_cache;
pub mod registry;
pub mod stats;

// 重新导出主要的公共类型和结构体
pub use cache_manager::CacheManager;
pub use stats::{CachePerformanceStats, CacheStats};
