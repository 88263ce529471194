//! 范围注册表模块
//!
//! 维护每个失效范围（整表或表+分组值）当前已缓存的键集合，
//! 支持按范围批量失效。注册与失效相对于主查询结果都是
//! 尽力而为的：调用方在失败时记录日志并继续，绝不因注册表
//! 故障而使读写本身失败。

use crate::types::DataValue;
use anyhow::{anyhow, Result};
use rat_logger::debug;
use std::collections::HashSet;
use std::sync::atomic::Ordering;

// 从 cache_manager.rs 中引入 CacheManager
use super::cache_manager::CacheManager;

impl CacheManager {
    /// 将缓存键注册到范围容器中（幂等，容器不存在时自动创建）
    pub async fn register_cache_key(&self, scope_key: &str, cache_key: &str) -> Result<()> {
        self.store
            .set_add(scope_key, cache_key, self.config.ttl_secs)
            .await
            .map_err(|e| anyhow!("注册缓存键失败: {}", e))?;
        debug!("已注册缓存键: scope={}, key={}", scope_key, cache_key);
        Ok(())
    }

    /// 读取范围容器的全部成员，容器不存在时返回空集合
    pub async fn scope_members(&self, scope_key: &str) -> Result<HashSet<String>> {
        self.store
            .set_members(scope_key)
            .await
            .map_err(|e| anyhow!("读取范围成员失败: {}", e))
    }

    /// 失效一个范围：删除全部成员的缓存值，再删除容器本身
    ///
    /// 已过期或不存在的成员键删除为无操作。重复调用是幂等的。
    /// 返回本次清除的成员数量。
    pub async fn invalidate_scope(&self, scope_key: &str) -> Result<usize> {
        let members = self.scope_members(scope_key).await?;
        let keys: Vec<String> = members.into_iter().collect();

        if !keys.is_empty() {
            self.store
                .delete_multiple(&keys)
                .await
                .map_err(|e| anyhow!("批量删除缓存值失败: {}", e))?;
        }
        self.store
            .delete(scope_key)
            .await
            .map_err(|e| anyhow!("删除范围容器失败: {}", e))?;

        self.deletes_counter
            .fetch_add(keys.len() as u64, Ordering::Relaxed);
        {
            let mut stats = self.stats.write().await;
            stats.deletes += keys.len() as u64;
        }

        debug!("已失效范围: scope={}, 清除键数量={}", scope_key, keys.len());
        Ok(keys.len())
    }

    /// 失效一个分组范围
    ///
    /// 除删除成员值和分组容器外，还要将同一批成员从表级容器中
    /// 移除，避免表级容器中积累指向已删除值的过期指针。
    /// （目标已不存在的残留指针是允许的，后续失效时会被跳过。）
    pub async fn invalidate_group_scope(
        &self,
        table: &str,
        group_field: &str,
        group_value: &DataValue,
    ) -> Result<usize> {
        let group_key = self.group_scope_key(table, group_field, group_value);
        let members = self.scope_members(&group_key).await?;
        let keys: Vec<String> = members.into_iter().collect();

        if !keys.is_empty() {
            self.store
                .delete_multiple(&keys)
                .await
                .map_err(|e| anyhow!("批量删除缓存值失败: {}", e))?;
        }
        self.store
            .delete(&group_key)
            .await
            .map_err(|e| anyhow!("删除分组容器失败: {}", e))?;

        let table_key = self.table_scope_key(table);
        self.store
            .set_remove(&table_key, &keys)
            .await
            .map_err(|e| anyhow!("移除表级容器成员失败: {}", e))?;

        self.deletes_counter
            .fetch_add(keys.len() as u64, Ordering::Relaxed);
        {
            let mut stats = self.stats.write().await;
            stats.deletes += keys.len() as u64;
        }

        debug!(
            "已失效分组范围: scope={}, 清除键数量={}",
            group_key,
            keys.len()
        );
        Ok(keys.len())
    }

    /// 表级失效：无条件清除该表曾缓存过的所有条目，不区分分组
    pub async fn invalidate_table(&self, table: &str) -> Result<usize> {
        let table_key = self.table_scope_key(table);
        self.invalidate_scope(&table_key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{CacheStore, MemoryStore};
    use crate::types::CacheableConfig;
    use bytes::Bytes;
    use std::sync::Arc;

    fn manager() -> (CacheManager, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let config = CacheableConfig::builder()
            .enabled(true)
            .ttl_secs(300)
            .prefix("cacheable")
            .build()
            .unwrap();
        (CacheManager::new(store.clone(), config), store)
    }

    #[tokio::test]
    async fn test_invalidate_scope_idempotent() {
        let (cm, store) = manager();
        store
            .set("cacheable:users:aaaa", Bytes::from("[]"), 300)
            .await
            .unwrap();
        cm.register_cache_key("cacheable:users", "cacheable:users:aaaa")
            .await
            .unwrap();

        let removed = cm.invalidate_scope("cacheable:users").await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get("cacheable:users:aaaa").await.unwrap().is_none());
        assert!(cm.scope_members("cacheable:users").await.unwrap().is_empty());

        // 第二次失效同一范围不报错，范围保持为空
        let removed = cm.invalidate_scope("cacheable:users").await.unwrap();
        assert_eq!(removed, 0);
        assert!(cm.scope_members("cacheable:users").await.unwrap().is_empty());
    }

    /// 注册表中指向已过期值的残留指针在失效时被静默跳过
    #[tokio::test]
    async fn test_orphaned_members_tolerated() {
        let (cm, _store) = manager();
        cm.register_cache_key("cacheable:users", "cacheable:users:gone")
            .await
            .unwrap();

        let removed = cm.invalidate_scope("cacheable:users").await.unwrap();
        assert_eq!(removed, 1);
    }

    #[tokio::test]
    async fn test_group_invalidation_prunes_table_scope() {
        let (cm, store) = manager();
        let group_value = DataValue::Int(1);
        let cache_key = "cacheable:orders:company_id1:abcd";
        store.set(cache_key, Bytes::from("[]"), 300).await.unwrap();
        cm.register_cache_key("cacheable:orders", cache_key)
            .await
            .unwrap();
        cm.register_cache_key("cacheable:orders:company_id1", cache_key)
            .await
            .unwrap();

        cm.invalidate_group_scope("orders", "company_id", &group_value)
            .await
            .unwrap();

        assert!(store.get(cache_key).await.unwrap().is_none());
        assert!(cm
            .scope_members("cacheable:orders:company_id1")
            .await
            .unwrap()
            .is_empty());
        // 表级容器中的同名成员也被修剪
        assert!(cm.scope_members("cacheable:orders").await.unwrap().is_empty());
    }
}
