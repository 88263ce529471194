//! 缓存键生成模块
//!
//! 提供查询缓存键和范围容器键的生成策略。同一逻辑查询
//! （相同 SQL 文本、相同顺序的绑定值、相同分组范围）在任意
//! 进程、任意时刻都必须生成相同的键。

use crate::types::DataValue;
use rat_logger::debug;

// 从 cache_manager.rs 中引入 CacheManager
use super::cache_manager::CacheManager;

impl CacheManager {
    /// 生成查询缓存键
    ///
    /// 将 SQL 文本与按顺序渲染的绑定值用 `_` 拼接后做 seahash，
    /// 取 16 位十六进制定宽摘要，拼接在范围前缀之后：
    /// `{prefix}:{table}:{hash16}`，启用分组时为
    /// `{prefix}:{table}:{group_field}{group_value}:{hash16}`。
    pub fn generate_query_cache_key(
        &self,
        table: &str,
        sql: &str,
        bindings: &[DataValue],
        group: Option<(&str, &DataValue)>,
    ) -> String {
        let mut payload = sql.to_string();
        if !bindings.is_empty() {
            let joined = bindings
                .iter()
                .map(|b| b.to_string())
                .collect::<Vec<_>>()
                .join("_");
            payload.push('_');
            payload.push_str(&joined);
        }
        let digest = seahash::hash(payload.as_bytes());

        let key = match group {
            Some((field, value)) => format!(
                "{}:{}:{}{}:{:016x}",
                self.config.prefix, table, field, value, digest
            ),
            None => format!("{}:{}:{:016x}", self.config.prefix, table, digest),
        };
        debug!("生成查询缓存键: table={}, key={}", table, key);
        key
    }

    /// 生成表级范围容器键: `{prefix}:{table}`
    pub fn table_scope_key(&self, table: &str) -> String {
        format!("{}:{}", self.config.prefix, table)
    }

    /// 生成分组级范围容器键: `{prefix}:{table}:{group_field}{group_value}`
    pub fn group_scope_key(&self, table: &str, group_field: &str, group_value: &DataValue) -> String {
        format!(
            "{}:{}:{}{}",
            self.config.prefix, table, group_field, group_value
        )
    }
}
