//! 进程内内存存储实现
//!
//! 不依赖外部服务的 `CacheStore` 实现，使用惰性过期策略：
//! 过期条目在下一次访问时被清除。适用于测试和单进程部署。

use super::CacheStore;
use crate::error::CacheableResult;
use async_trait::async_trait;
use bytes::Bytes;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// 带过期时间的值条目
struct ValueEntry {
    data: Bytes,
    expires_at: Option<Instant>,
}

/// 带过期时间的集合条目
struct SetEntry {
    members: HashSet<String>,
    expires_at: Option<Instant>,
}

/// 进程内内存存储
pub struct MemoryStore {
    values: RwLock<HashMap<String, ValueEntry>>,
    sets: RwLock<HashMap<String, SetEntry>>,
}

/// ttl_secs 为 0 表示永不过期
fn deadline(ttl_secs: u64) -> Option<Instant> {
    if ttl_secs == 0 {
        None
    } else {
        Some(Instant::now() + Duration::from_secs(ttl_secs))
    }
}

fn is_expired(expires_at: &Option<Instant>) -> bool {
    matches!(expires_at, Some(at) if *at <= Instant::now())
}

impl MemoryStore {
    /// 创建新的内存存储
    pub fn new() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            sets: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheableResult<Option<Bytes>> {
        let mut values = self.values.write().await;
        match values.get(key) {
            Some(entry) if is_expired(&entry.expires_at) => {
                crate::debug_log!("惰性清除过期缓存条目: key={}", key);
                values.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.data.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> CacheableResult<()> {
        let mut values = self.values.write().await;
        values.insert(
            key.to_string(),
            ValueEntry {
                data: value,
                expires_at: deadline(ttl_secs),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheableResult<()> {
        self.values.write().await.remove(key);
        self.sets.write().await.remove(key);
        Ok(())
    }

    async fn delete_multiple(&self, keys: &[String]) -> CacheableResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut values = self.values.write().await;
        let mut sets = self.sets.write().await;
        for key in keys {
            values.remove(key);
            sets.remove(key);
        }
        Ok(())
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl_secs: u64) -> CacheableResult<()> {
        let mut sets = self.sets.write().await;
        let entry = sets.entry(set_key.to_string()).or_insert_with(|| SetEntry {
            members: HashSet::new(),
            expires_at: None,
        });
        if is_expired(&entry.expires_at) {
            entry.members.clear();
        }
        entry.members.insert(member.to_string());
        // 每次添加成员时刷新容器 TTL，与成员值的 TTL 对齐
        entry.expires_at = deadline(ttl_secs);
        Ok(())
    }

    async fn set_members(&self, set_key: &str) -> CacheableResult<HashSet<String>> {
        let mut sets = self.sets.write().await;
        match sets.get(set_key) {
            Some(entry) if is_expired(&entry.expires_at) => {
                sets.remove(set_key);
                Ok(HashSet::new())
            }
            Some(entry) => Ok(entry.members.clone()),
            None => Ok(HashSet::new()),
        }
    }

    async fn set_remove(&self, set_key: &str, members: &[String]) -> CacheableResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let mut sets = self.sets.write().await;
        if let Some(entry) = sets.get_mut(set_key) {
            for member in members {
                entry.members.remove(member);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_delete() {
        let store = MemoryStore::new();
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", Bytes::from("v"), 300).await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), Some(Bytes::from("v")));

        store.delete("k").await.unwrap();
        assert_eq!(store.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_operations() {
        let store = MemoryStore::new();
        assert!(store.set_members("s").await.unwrap().is_empty());

        store.set_add("s", "a", 300).await.unwrap();
        store.set_add("s", "b", 300).await.unwrap();
        // 重复添加是幂等的
        store.set_add("s", "a", 300).await.unwrap();

        let members = store.set_members("s").await.unwrap();
        assert_eq!(members.len(), 2);
        assert!(members.contains("a"));

        store.set_remove("s", &["a".to_string()]).await.unwrap();
        let members = store.set_members("s").await.unwrap();
        assert_eq!(members.len(), 1);
        assert!(!members.contains("a"));
    }

    #[tokio::test]
    async fn test_ttl_expiry() {
        let store = MemoryStore::new();
        store.set("k", Bytes::from("v"), 1).await.unwrap();
        assert!(store.get("k").await.unwrap().is_some());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
