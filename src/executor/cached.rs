//! 缓存查询执行器
//!
//! 提供带缓存功能的查询执行器包装器，以组合方式拦截读写路径：
//! 读路径按策略检查、范围解析、键派生、缓存查找的顺序处理，
//! 未命中时执行底层查询并回填；写路径在执行写操作**之前**
//! 失效受影响范围的缓存（悲观顺序），缩小脏读窗口。

use super::QueryExecutor;
use crate::cache::CacheManager;
use crate::error::CacheableResult;
use crate::types::{DataValue, QueryCondition, QueryOperator, QueryOptions};
use async_trait::async_trait;
use rat_logger::{debug, warn};
use std::collections::HashMap;
use std::sync::Arc;

/// 带缓存功能的查询执行器包装器
pub struct CachedExecutor {
    /// 内部真实的查询执行器
    inner: Box<dyn QueryExecutor>,
    /// 缓存管理器
    cache_manager: Arc<CacheManager>,
}

impl CachedExecutor {
    /// 创建新的缓存执行器
    pub fn new(inner: Box<dyn QueryExecutor>, cache_manager: Arc<CacheManager>) -> Self {
        Self {
            inner,
            cache_manager,
        }
    }

    /// 从读查询的条件中解析分组值：取第一个命中分组字段的等值谓词
    fn resolve_read_group<'a>(
        &self,
        group_field: &str,
        conditions: &'a [QueryCondition],
    ) -> Option<&'a DataValue> {
        conditions
            .iter()
            .find(|c| c.field == group_field && c.operator == QueryOperator::Eq)
            .map(|c| &c.value)
    }

    /// 解析写操作的分组值
    ///
    /// 解析顺序：调用方显式覆盖值 → 写入数据中分组列的值 →
    /// 过滤条件中分组字段的等值谓词。表启用了分组但三者都无法
    /// 给出值时返回 `GroupValueUnresolved`，调用方必须在执行任何
    /// 数据变更之前返回该错误（不允许静默退化为表级失效）。
    fn resolve_write_group(
        &self,
        table: &str,
        group_override: Option<&DataValue>,
        payload: Option<&HashMap<String, DataValue>>,
        conditions: &[QueryCondition],
    ) -> CacheableResult<Option<DataValue>> {
        let Some(field) = self.cache_manager.config().group_field(table) else {
            return Ok(None);
        };

        if let Some(value) = group_override {
            return Ok(Some(value.clone()));
        }
        if let Some(data) = payload {
            if let Some(value) = data.get(field) {
                if !value.is_null() {
                    return Ok(Some(value.clone()));
                }
            }
        }
        if let Some(value) = self.resolve_read_group(field, conditions) {
            return Ok(Some(value.clone()));
        }

        Err(crate::cacheable_error!(group_unresolved, table, field))
    }

    /// 写前失效：分组值已解析时失效分组范围，否则失效整表
    ///
    /// 失效失败只记录日志，绝不阻塞写操作本身；代价是在 TTL
    /// 到期之前可能残留过期缓存。
    async fn invalidate_for_write(&self, table: &str, group: Option<&DataValue>) {
        let result = match group {
            Some(value) => {
                // resolve_write_group 已确认该表配置了分组字段
                let field = self
                    .cache_manager
                    .config()
                    .group_field(table)
                    .unwrap_or_default()
                    .to_string();
                self.cache_manager
                    .invalidate_group_scope(table, &field, value)
                    .await
            }
            None => self.cache_manager.invalidate_table(table).await,
        };

        match result {
            Ok(removed) => {
                debug!("写前失效完成: table={}, 清除键数量={}", table, removed);
            }
            Err(e) => {
                warn!("写前失效缓存失败，写操作继续执行: table={}, error={}", table, e);
            }
        }
    }

    async fn insert_resolved(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
        group_override: Option<&DataValue>,
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            let group = self.resolve_write_group(table, group_override, Some(data), &[])?;
            self.invalidate_for_write(table, group.as_ref()).await;
        }
        self.inner.insert(table, data).await
    }

    async fn insert_many_resolved(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
        group_override: Option<&DataValue>,
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            match self.cache_manager.config().group_field(table) {
                Some(field) => {
                    // 收集批次中出现的分组值，每个不同的值只失效一次
                    let mut groups: Vec<DataValue> = Vec::new();
                    match group_override {
                        Some(value) => groups.push(value.clone()),
                        None => {
                            let field = field.to_string();
                            for row in rows {
                                let value = row
                                    .get(&field)
                                    .filter(|v| !v.is_null())
                                    .ok_or_else(|| {
                                        crate::cacheable_error!(group_unresolved, table, field)
                                    })?;
                                if !groups.contains(value) {
                                    groups.push(value.clone());
                                }
                            }
                        }
                    }
                    for value in &groups {
                        self.invalidate_for_write(table, Some(value)).await;
                    }
                }
                None => {
                    self.invalidate_for_write(table, None).await;
                }
            }
        }
        self.inner.insert_many(table, rows).await
    }

    async fn insert_get_id_resolved(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
        group_override: Option<&DataValue>,
    ) -> CacheableResult<DataValue> {
        if self.cache_manager.config().enabled {
            let group = self.resolve_write_group(table, group_override, Some(data), &[])?;
            self.invalidate_for_write(table, group.as_ref()).await;
        }
        self.inner.insert_get_id(table, data).await
    }

    async fn update_resolved(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        data: &HashMap<String, DataValue>,
        group_override: Option<&DataValue>,
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            let group = self.resolve_write_group(table, group_override, Some(data), conditions)?;
            self.invalidate_for_write(table, group.as_ref()).await;
        }
        self.inner.update(table, conditions, data).await
    }

    async fn delete_resolved(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        group_override: Option<&DataValue>,
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            let group = self.resolve_write_group(table, group_override, None, conditions)?;
            self.invalidate_for_write(table, group.as_ref()).await;
        }
        self.inner.delete(table, conditions).await
    }

    /// 插入单条记录（显式指定分组值）
    pub async fn insert_with_group(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
        group_value: &DataValue,
    ) -> CacheableResult<u64> {
        self.insert_resolved(table, data, Some(group_value)).await
    }

    /// 批量插入记录（显式指定分组值，整个批次按该值失效一次）
    pub async fn insert_many_with_group(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
        group_value: &DataValue,
    ) -> CacheableResult<u64> {
        self.insert_many_resolved(table, rows, Some(group_value))
            .await
    }

    /// 插入单条记录并返回生成的ID（显式指定分组值）
    pub async fn insert_get_id_with_group(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
        group_value: &DataValue,
    ) -> CacheableResult<DataValue> {
        self.insert_get_id_resolved(table, data, Some(group_value))
            .await
    }

    /// 更新记录（显式指定分组值）
    pub async fn update_with_group(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        data: &HashMap<String, DataValue>,
        group_value: &DataValue,
    ) -> CacheableResult<u64> {
        self.update_resolved(table, conditions, data, Some(group_value))
            .await
    }

    /// 删除记录（显式指定分组值）
    pub async fn delete_with_group(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        group_value: &DataValue,
    ) -> CacheableResult<u64> {
        self.delete_resolved(table, conditions, Some(group_value))
            .await
    }
}

#[async_trait]
impl QueryExecutor for CachedExecutor {
    /// 生成SQL - 直接委托内部执行器
    fn to_sql(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> CacheableResult<(String, Vec<DataValue>)> {
        self.inner.to_sql(table, conditions, options)
    }

    /// 读查询 - 先检查缓存，未命中时执行底层查询并回填
    async fn select_with_cache_control(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
        cache_override: Option<bool>,
    ) -> CacheableResult<Vec<DataValue>> {
        let config = self.cache_manager.config();

        // 策略检查：单次调用覆盖值优先于全局开关
        let enabled = cache_override.unwrap_or(config.enabled);
        if !enabled {
            return self
                .inner
                .select_with_cache_control(table, conditions, options, cache_override)
                .await;
        }

        // 含模式匹配谓词的查询完全绕过缓存，不读也不写
        if conditions
            .iter()
            .any(|c| config.is_excluded_operator(&c.operator))
        {
            debug!("查询含排除操作符，绕过缓存: table={}", table);
            return self
                .inner
                .select_with_cache_control(table, conditions, options, cache_override)
                .await;
        }

        // 范围解析：已配置分组的表必须带分组字段的等值谓词才可缓存
        let group = match config.group_field(table) {
            Some(field) => match self.resolve_read_group(field, conditions) {
                Some(value) => Some((field, value)),
                None => {
                    debug!(
                        "已配置分组但查询缺少分组字段的等值谓词，绕过缓存: table={}, field={}",
                        table, field
                    );
                    return self
                        .inner
                        .select_with_cache_control(table, conditions, options, cache_override)
                        .await;
                }
            },
            None => None,
        };

        let (sql, bindings) = self.inner.to_sql(table, conditions, options)?;
        let cache_key = self
            .cache_manager
            .generate_query_cache_key(table, &sql, &bindings, group);

        // 先检查缓存
        match self
            .cache_manager
            .get_cached_query_result(table, &cache_key)
            .await
        {
            Ok(Some(rows)) => {
                debug!("查询缓存命中: table={}, key={}", table, cache_key);
                return Ok(rows);
            }
            Ok(None) => {
                debug!("查询缓存未命中: table={}, key={}", table, cache_key);
            }
            Err(e) => {
                warn!("获取查询缓存失败: {}", e);
            }
        }

        // 缓存未命中，执行底层查询
        let rows = self
            .inner
            .select_with_cache_control(table, conditions, options, cache_override)
            .await?;

        // 回填缓存并注册范围；结果已经算出，失败只记录不上抛
        let group_scope = group.map(|(field, value)| {
            self.cache_manager.group_scope_key(table, field, value)
        });
        if let Err(e) = self
            .cache_manager
            .cache_query_result(table, &cache_key, group_scope.as_deref(), &rows)
            .await
        {
            warn!("缓存查询结果失败: table={}, error={}", table, e);
        }

        Ok(rows)
    }

    /// 插入记录 - 写前按解析出的范围失效缓存
    async fn insert(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64> {
        self.insert_resolved(table, data, None).await
    }

    /// 批量插入记录 - 按批次中不同的分组值逐一失效，每个值一次
    async fn insert_many(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64> {
        self.insert_many_resolved(table, rows, None).await
    }

    /// 插入并返回ID - 写前按解析出的范围失效缓存
    async fn insert_get_id(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<DataValue> {
        self.insert_get_id_resolved(table, data, None).await
    }

    /// 冲突忽略插入 - 影响范围不可确定，始终整表失效
    async fn insert_or_ignore(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            self.invalidate_for_write(table, None).await;
        }
        self.inner.insert_or_ignore(table, rows).await
    }

    /// 子查询插入 - 影响范围不可确定，始终整表失效
    async fn insert_using(
        &self,
        table: &str,
        columns: &[String],
        source_table: &str,
        conditions: &[QueryCondition],
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            self.invalidate_for_write(table, None).await;
        }
        self.inner
            .insert_using(table, columns, source_table, conditions)
            .await
    }

    /// 更新记录 - 写前按解析出的范围失效缓存
    async fn update(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64> {
        self.update_resolved(table, conditions, data, None).await
    }

    /// 插入或更新 - 影响范围不可确定，始终整表失效
    async fn upsert(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
        unique_by: &[String],
        update_columns: &[String],
    ) -> CacheableResult<u64> {
        if self.cache_manager.config().enabled {
            self.invalidate_for_write(table, None).await;
        }
        self.inner
            .upsert(table, rows, unique_by, update_columns)
            .await
    }

    /// 删除记录 - 写前按解析出的范围失效缓存
    async fn delete(&self, table: &str, conditions: &[QueryCondition]) -> CacheableResult<u64> {
        self.delete_resolved(table, conditions, None).await
    }

    /// 清空整张表 - 始终整表失效，不区分分组
    async fn truncate(&self, table: &str) -> CacheableResult<()> {
        if self.cache_manager.config().enabled {
            self.invalidate_for_write(table, None).await;
        }
        self.inner.truncate(table).await
    }
}
