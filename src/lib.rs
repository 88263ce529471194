//! rat_cacheable - 透明查询缓存层
//!
//! 在应用与关系型查询执行路径之间插入一层透明缓存：拦截读查询
//! 并在可用时返回缓存结果，写操作发生时按表或按配置的分组范围
//! 自动失效受影响的缓存条目。底层SQL引擎和键值存储均以trait
//! 形式注入，本库不持有进程内锁，依赖存储端的单操作原子性。

// 导出所有公共模块
pub mod cache;
pub mod error;
pub mod executor;
pub mod store;
pub mod types;

// 重新导出常用类型和函数
pub use cache::{CacheManager, CachePerformanceStats, CacheStats};
pub use error::{CacheableError, CacheableResult};
pub use executor::{CachedExecutor, QueryExecutor};
#[cfg(feature = "redis-support")]
pub use store::RedisStore;
pub use store::{CacheStore, MemoryStore};
pub use types::*;

// 条件编译调试宏 - 只有在 debug 模式下才输出调试信息
#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        rat_logger::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        // 在 release 模式下不输出调试信息
    };
}

/// 库版本信息
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// 库名称
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// 获取库信息
pub fn get_info() -> String {
    format!("{} v{}", NAME, VERSION)
}
