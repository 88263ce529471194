//! 查询执行器模块
//!
//! 提供统一的查询执行接口，屏蔽具体SQL引擎的实现差异。
//! 底层执行器负责生成最终SQL文本和绑定值、执行读写操作；
//! `CachedExecutor` 在其上以组合方式叠加透明缓存。

use crate::error::CacheableResult;
use crate::types::{DataValue, QueryCondition, QueryOptions};
use async_trait::async_trait;
use std::collections::HashMap;

mod cached;

pub use cached::CachedExecutor;

/// 查询执行器trait，定义统一的查询执行接口
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    /// 生成查询的最终SQL文本和按顺序排列的绑定值
    fn to_sql(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> CacheableResult<(String, Vec<DataValue>)>;

    /// 执行读查询，返回有序的行序列
    async fn select(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> CacheableResult<Vec<DataValue>> {
        self.select_with_cache_control(table, conditions, options, None)
            .await
    }

    /// 执行读查询（支持单次调用的缓存开关覆盖）
    ///
    /// `cache_override` 为 None 时沿用全局缓存开关。
    /// 不带缓存的底层执行器实现应忽略该参数。
    async fn select_with_cache_control(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
        cache_override: Option<bool>,
    ) -> CacheableResult<Vec<DataValue>>;

    /// 插入单条记录，返回受影响的行数
    async fn insert(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64>;

    /// 批量插入记录，返回受影响的行数
    async fn insert_many(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64>;

    /// 插入单条记录并返回生成的ID
    async fn insert_get_id(
        &self,
        table: &str,
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<DataValue>;

    /// 插入记录，冲突时忽略，返回实际插入的行数
    async fn insert_or_ignore(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64>;

    /// 使用子查询结果插入记录，返回受影响的行数
    async fn insert_using(
        &self,
        table: &str,
        columns: &[String],
        source_table: &str,
        conditions: &[QueryCondition],
    ) -> CacheableResult<u64>;

    /// 更新符合条件的记录，返回受影响的行数
    async fn update(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64>;

    /// 插入或更新记录（按唯一键去重），返回受影响的行数
    async fn upsert(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
        unique_by: &[String],
        update_columns: &[String],
    ) -> CacheableResult<u64>;

    /// 删除符合条件的记录，返回受影响的行数
    async fn delete(&self, table: &str, conditions: &[QueryCondition]) -> CacheableResult<u64>;

    /// 清空整张表
    async fn truncate(&self, table: &str) -> CacheableResult<()>;
}
