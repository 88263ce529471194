//! 键值存储客户端抽象模块
//!
//! 缓存层不直接依赖具体的存储实现，所有存取和集合操作
//! 通过 `CacheStore` trait 进行。单个操作的原子性由存储端保证，
//! 本层不在多个操作之间维持事务。

use crate::error::CacheableResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::HashSet;

mod memory;
#[cfg(feature = "redis-support")]
mod redis;

pub use memory::MemoryStore;
#[cfg(feature = "redis-support")]
pub use redis::RedisStore;

/// 键值存储客户端trait，定义缓存层需要的最小操作集
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// 读取键对应的值，键不存在时返回 None
    async fn get(&self, key: &str) -> CacheableResult<Option<Bytes>>;

    /// 写入键值并设置 TTL（秒）
    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> CacheableResult<()>;

    /// 删除单个键（键不存在视为成功）
    async fn delete(&self, key: &str) -> CacheableResult<()>;

    /// 批量删除键（不存在的键静默跳过）
    async fn delete_multiple(&self, keys: &[String]) -> CacheableResult<()>;

    /// 向集合添加成员（集合不存在时自动创建），并刷新集合容器的 TTL
    async fn set_add(&self, set_key: &str, member: &str, ttl_secs: u64) -> CacheableResult<()>;

    /// 读取集合全部成员，集合不存在时返回空集合
    async fn set_members(&self, set_key: &str) -> CacheableResult<HashSet<String>>;

    /// 从集合移除成员（成员或集合不存在视为成功）
    async fn set_remove(&self, set_key: &str, members: &[String]) -> CacheableResult<()>;
}
