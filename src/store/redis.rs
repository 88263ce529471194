//! Redis 存储实现
//!
//! 基于 `redis` crate 的异步连接管理器实现 `CacheStore`，
//! 值操作映射到 GET/SET EX/DEL，集合操作映射到 SADD/SMEMBERS/SREM。

use super::CacheStore;
use crate::error::CacheableResult;
use async_trait::async_trait;
use bytes::Bytes;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client};
use std::collections::HashSet;

/// Redis 存储客户端
#[derive(Clone)]
pub struct RedisStore {
    manager: ConnectionManager,
}

impl RedisStore {
    /// 连接到 Redis 服务器
    ///
    /// # 参数
    ///
    /// * `url` - 连接地址，例如 `redis://127.0.0.1:6379/0`
    pub async fn connect(url: &str) -> CacheableResult<Self> {
        let client = Client::open(url)
            .map_err(|e| crate::cacheable_error!(cache, format!("Redis 连接地址无效: {}", e)))?;
        let manager = client
            .get_connection_manager()
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("Redis 连接失败: {}", e)))?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheableResult<Option<Bytes>> {
        let mut con = self.manager.clone();
        let value: Option<Vec<u8>> = con
            .get(key)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("GET 失败: {}", e)))?;
        Ok(value.map(Bytes::from))
    }

    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> CacheableResult<()> {
        let mut con = self.manager.clone();
        con.set_ex::<_, _, ()>(key, value.as_ref(), ttl_secs)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("SET EX 失败: {}", e)))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheableResult<()> {
        let mut con = self.manager.clone();
        con.del::<_, ()>(key)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("DEL 失败: {}", e)))?;
        Ok(())
    }

    async fn delete_multiple(&self, keys: &[String]) -> CacheableResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut con = self.manager.clone();
        con.del::<_, ()>(keys.to_vec())
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("批量 DEL 失败: {}", e)))?;
        Ok(())
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl_secs: u64) -> CacheableResult<()> {
        let mut con = self.manager.clone();
        con.sadd::<_, _, ()>(set_key, member)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("SADD 失败: {}", e)))?;
        // 集合容器的 TTL 与成员值对齐，每次注册时刷新
        con.expire::<_, ()>(set_key, ttl_secs as i64)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("EXPIRE 失败: {}", e)))?;
        Ok(())
    }

    async fn set_members(&self, set_key: &str) -> CacheableResult<HashSet<String>> {
        let mut con = self.manager.clone();
        let members: HashSet<String> = con
            .smembers(set_key)
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("SMEMBERS 失败: {}", e)))?;
        Ok(members)
    }

    async fn set_remove(&self, set_key: &str, members: &[String]) -> CacheableResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut con = self.manager.clone();
        con.srem::<_, _, ()>(set_key, members.to_vec())
            .await
            .map_err(|e| crate::cacheable_error!(cache, format!("SREM 失败: {}", e)))?;
        Ok(())
    }
}
