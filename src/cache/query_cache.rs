//! 查询结果缓存模块
//!
//! 提供查询结果的序列化存取。空结果集同样会被缓存：
//! "未命中"的定义是存储中不存在该键，而不是值为空。

use crate::types::DataValue;
use anyhow::{anyhow, Result};
use bytes::Bytes;
use rat_logger::{debug, warn};
use std::sync::atomic::Ordering;
use std::time::Instant;

// 从 cache_manager.rs 中引入 CacheManager
use super::cache_manager::CacheManager;

/// 超过该行数的结果集不进入缓存，避免内存浪费
const MAX_CACHEABLE_ROWS: usize = 1000;

impl CacheManager {
    /// 缓存查询结果并注册到所属范围
    ///
    /// 先写入值，再注册到表级容器，启用分组时同时注册到分组容器。
    pub async fn cache_query_result(
        &self,
        table: &str,
        cache_key: &str,
        group_scope_key: Option<&str>,
        results: &[DataValue],
    ) -> Result<()> {
        let start_time = Instant::now();

        if results.len() > MAX_CACHEABLE_ROWS {
            debug!(
                "跳过缓存过大查询结果: table={}, count={}",
                table,
                results.len()
            );
            return Ok(());
        }

        let serialized =
            serde_json::to_vec(results).map_err(|e| anyhow!("序列化查询结果失败: {}", e))?;

        self.store
            .set(cache_key, Bytes::from(serialized), self.config.ttl_secs)
            .await
            .map_err(|e| anyhow!("写入缓存失败: {}", e))?;

        // 记录缓存键到所属范围
        self.register_cache_key(&self.table_scope_key(table), cache_key)
            .await?;
        if let Some(group_key) = group_scope_key {
            self.register_cache_key(group_key, cache_key).await?;
        }

        // 更新统计信息
        let elapsed = start_time.elapsed();
        self.writes_counter.fetch_add(1, Ordering::Relaxed);
        {
            let mut stats = self.stats.write().await;
            stats.writes += 1;
            stats.write_count += 1;
            stats.total_write_latency_ns += elapsed.as_nanos() as u64;
        }

        debug!(
            "已缓存查询结果: table={}, key={}, count={}",
            table,
            cache_key,
            results.len()
        );
        Ok(())
    }

    /// 获取缓存的查询结果
    ///
    /// 存储读取失败降级为未命中；反序列化失败同样按未命中处理，
    /// 由调用方重新执行查询并覆盖损坏的条目。
    pub async fn get_cached_query_result(
        &self,
        table: &str,
        cache_key: &str,
    ) -> Result<Option<Vec<DataValue>>> {
        let start_time = Instant::now();

        match self.store.get(cache_key).await {
            Ok(Some(data)) => match serde_json::from_slice::<Vec<DataValue>>(&data) {
                Ok(rows) => {
                    let elapsed = start_time.elapsed();
                    self.hits_counter.fetch_add(1, Ordering::Relaxed);
                    {
                        let mut stats = self.stats.write().await;
                        stats.hits += 1;
                        stats.query_count += 1;
                        stats.total_query_latency_ns += elapsed.as_nanos() as u64;
                    }

                    debug!(
                        "查询缓存命中: table={}, key={}, count={}",
                        table,
                        cache_key,
                        rows.len()
                    );
                    Ok(Some(rows))
                }
                Err(e) => {
                    // 损坏的条目按未命中处理，重新计算后覆盖
                    self.record_miss(start_time).await;
                    warn!(
                        "缓存条目反序列化失败，按未命中处理: table={}, key={}, error={}",
                        table, cache_key, e
                    );
                    Ok(None)
                }
            },
            Ok(None) => {
                self.record_miss(start_time).await;
                debug!("查询缓存未命中: table={}, key={}", table, cache_key);
                Ok(None)
            }
            Err(e) => {
                // 存储故障也算作未命中，调用方降级为直接执行查询
                self.record_miss(start_time).await;
                warn!(
                    "查询缓存读取失败: table={}, key={}, error={}",
                    table, cache_key, e
                );
                Ok(None)
            }
        }
    }

    async fn record_miss(&self, start_time: Instant) {
        let elapsed = start_time.elapsed();
        self.misses_counter.fetch_add(1, Ordering::Relaxed);
        let mut stats = self.stats.write().await;
        stats.misses += 1;
        stats.query_count += 1;
        stats.total_query_latency_ns += elapsed.as_nanos() as u64;
    }
}
