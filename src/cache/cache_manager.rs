//! 缓存管理器核心模块
//!
//! 提供CacheManager的结构定义和构造函数

use super::stats::CachePerformanceStats;
use crate::store::CacheStore;
use crate::types::CacheableConfig;
use rat_logger::info;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use tokio::sync::RwLock;

/// 缓存管理器
///
/// 持有存储客户端和缓存策略配置，键派生、范围注册与失效
/// 的实现分布在 `key_generator`、`registry` 和 `query_cache` 模块中。
#[derive(Clone)]
pub struct CacheManager {
    /// 键值存储客户端
    pub(crate) store: Arc<dyn CacheStore>,
    /// 缓存配置
    pub(crate) config: CacheableConfig,
    /// 性能统计
    pub(crate) stats: Arc<RwLock<CachePerformanceStats>>,
    /// 原子计数器用于高频统计
    pub(crate) hits_counter: Arc<AtomicU64>,
    pub(crate) misses_counter: Arc<AtomicU64>,
    pub(crate) writes_counter: Arc<AtomicU64>,
    pub(crate) deletes_counter: Arc<AtomicU64>,
}

impl CacheManager {
    /// 创建新的缓存管理器
    pub fn new(store: Arc<dyn CacheStore>, config: CacheableConfig) -> Self {
        info!(
            "缓存管理器初始化 - 启用: {}, TTL: {}s, 前缀: {}, 分组表数量: {}",
            config.enabled,
            config.ttl_secs,
            config.prefix,
            config.group_fields.len()
        );

        Self {
            store,
            config,
            stats: Arc::new(RwLock::new(CachePerformanceStats::new())),
            hits_counter: Arc::new(AtomicU64::new(0)),
            misses_counter: Arc::new(AtomicU64::new(0)),
            writes_counter: Arc::new(AtomicU64::new(0)),
            deletes_counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 获取缓存配置
    pub fn config(&self) -> &CacheableConfig {
        &self.config
    }
}
