//! 集成测试共享工具
//!
//! 提供记录调用的模拟执行器和存储包装器
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use rat_cacheable::{
    CacheStore, CacheableError, CacheableResult, DataValue, MemoryStore, QueryCondition,
    QueryExecutor, QueryOptions,
};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// 共享事件日志，用于跨协作者断言调用顺序
pub type EventLog = Arc<Mutex<Vec<String>>>;

pub fn new_event_log() -> EventLog {
    Arc::new(Mutex::new(Vec::new()))
}

fn record(events: &Option<EventLog>, entry: String) {
    if let Some(log) = events {
        log.lock().unwrap().push(entry);
    }
}

/// 模拟查询执行器：返回固定行数据并记录每次调用
///
/// 执行器本体会被装箱进 `CachedExecutor`，测试侧通过
/// `MockHandle` 保留对计数器的访问。
pub struct MockExecutor {
    rows: Vec<DataValue>,
    select_count: Arc<AtomicU64>,
    write_log: Arc<Mutex<Vec<String>>>,
    events: Option<EventLog>,
}

/// 模拟执行器的观察句柄
pub struct MockHandle {
    select_count: Arc<AtomicU64>,
    write_log: Arc<Mutex<Vec<String>>>,
}

impl MockHandle {
    pub fn selects(&self) -> u64 {
        self.select_count.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> Vec<String> {
        self.write_log.lock().unwrap().clone()
    }
}

impl MockExecutor {
    pub fn new(rows: Vec<DataValue>) -> (Self, MockHandle) {
        Self::build(rows, None)
    }

    pub fn with_events(rows: Vec<DataValue>, events: EventLog) -> (Self, MockHandle) {
        Self::build(rows, Some(events))
    }

    fn build(rows: Vec<DataValue>, events: Option<EventLog>) -> (Self, MockHandle) {
        let select_count = Arc::new(AtomicU64::new(0));
        let write_log = Arc::new(Mutex::new(Vec::new()));
        let handle = MockHandle {
            select_count: select_count.clone(),
            write_log: write_log.clone(),
        };
        (
            Self {
                rows,
                select_count,
                write_log,
                events,
            },
            handle,
        )
    }

    fn record_write(&self, entry: String) {
        record(&self.events, format!("executor:{}", entry));
        self.write_log.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl QueryExecutor for MockExecutor {
    fn to_sql(
        &self,
        table: &str,
        conditions: &[QueryCondition],
        options: &QueryOptions,
    ) -> CacheableResult<(String, Vec<DataValue>)> {
        let mut sql = format!("SELECT * FROM {}", table);
        let mut bindings = Vec::new();
        if !conditions.is_empty() {
            let mut clauses = Vec::new();
            for condition in conditions {
                clauses.push(format!("{} {:?} ?", condition.field, condition.operator));
                bindings.push(condition.value.clone());
            }
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        if let Some(pagination) = &options.pagination {
            sql.push_str(&format!(" LIMIT {} OFFSET {}", pagination.limit, pagination.skip));
        }
        Ok((sql, bindings))
    }

    async fn select_with_cache_control(
        &self,
        table: &str,
        _conditions: &[QueryCondition],
        _options: &QueryOptions,
        _cache_override: Option<bool>,
    ) -> CacheableResult<Vec<DataValue>> {
        self.select_count.fetch_add(1, Ordering::SeqCst);
        record(&self.events, format!("executor:select:{}", table));
        Ok(self.rows.clone())
    }

    async fn insert(
        &self,
        table: &str,
        _data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64> {
        self.record_write(format!("insert:{}", table));
        Ok(1)
    }

    async fn insert_many(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64> {
        self.record_write(format!("insert_many:{}", table));
        Ok(rows.len() as u64)
    }

    async fn insert_get_id(
        &self,
        table: &str,
        _data: &HashMap<String, DataValue>,
    ) -> CacheableResult<DataValue> {
        self.record_write(format!("insert_get_id:{}", table));
        Ok(DataValue::Int(1))
    }

    async fn insert_or_ignore(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
    ) -> CacheableResult<u64> {
        self.record_write(format!("insert_or_ignore:{}", table));
        Ok(rows.len() as u64)
    }

    async fn insert_using(
        &self,
        table: &str,
        _columns: &[String],
        _source_table: &str,
        _conditions: &[QueryCondition],
    ) -> CacheableResult<u64> {
        self.record_write(format!("insert_using:{}", table));
        Ok(1)
    }

    async fn update(
        &self,
        table: &str,
        _conditions: &[QueryCondition],
        _data: &HashMap<String, DataValue>,
    ) -> CacheableResult<u64> {
        self.record_write(format!("update:{}", table));
        Ok(1)
    }

    async fn upsert(
        &self,
        table: &str,
        rows: &[HashMap<String, DataValue>],
        _unique_by: &[String],
        _update_columns: &[String],
    ) -> CacheableResult<u64> {
        self.record_write(format!("upsert:{}", table));
        Ok(rows.len() as u64)
    }

    async fn delete(&self, table: &str, _conditions: &[QueryCondition]) -> CacheableResult<u64> {
        self.record_write(format!("delete:{}", table));
        Ok(1)
    }

    async fn truncate(&self, table: &str) -> CacheableResult<()> {
        self.record_write(format!("truncate:{}", table));
        Ok(())
    }
}

/// 记录每次存储调用的包装器，委托给内存存储
pub struct CountingStore {
    inner: MemoryStore,
    pub calls: Mutex<Vec<String>>,
    events: Option<EventLog>,
}

impl CountingStore {
    pub fn new() -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: Mutex::new(Vec::new()),
            events: None,
        }
    }

    pub fn with_events(events: EventLog) -> Self {
        Self {
            inner: MemoryStore::new(),
            calls: Mutex::new(Vec::new()),
            events: Some(events),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record_call(&self, entry: String) {
        record(&self.events, format!("store:{}", entry));
        self.calls.lock().unwrap().push(entry);
    }
}

#[async_trait]
impl CacheStore for CountingStore {
    async fn get(&self, key: &str) -> CacheableResult<Option<Bytes>> {
        self.record_call(format!("get:{}", key));
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: Bytes, ttl_secs: u64) -> CacheableResult<()> {
        self.record_call(format!("set:{}", key));
        self.inner.set(key, value, ttl_secs).await
    }

    async fn delete(&self, key: &str) -> CacheableResult<()> {
        self.record_call(format!("delete:{}", key));
        self.inner.delete(key).await
    }

    async fn delete_multiple(&self, keys: &[String]) -> CacheableResult<()> {
        self.record_call(format!("delete_multiple:{}", keys.len()));
        self.inner.delete_multiple(keys).await
    }

    async fn set_add(&self, set_key: &str, member: &str, ttl_secs: u64) -> CacheableResult<()> {
        self.record_call(format!("set_add:{}", set_key));
        self.inner.set_add(set_key, member, ttl_secs).await
    }

    async fn set_members(&self, set_key: &str) -> CacheableResult<HashSet<String>> {
        self.record_call(format!("set_members:{}", set_key));
        self.inner.set_members(set_key).await
    }

    async fn set_remove(&self, set_key: &str, members: &[String]) -> CacheableResult<()> {
        self.record_call(format!("set_remove:{}", set_key));
        self.inner.set_remove(set_key, members).await
    }
}

/// 所有操作都失败的存储，用于验证缓存故障时的降级行为
pub struct FailingStore;

fn store_down() -> CacheableError {
    CacheableError::CacheError {
        message: "存储不可用".to_string(),
    }
}

#[async_trait]
impl CacheStore for FailingStore {
    async fn get(&self, _key: &str) -> CacheableResult<Option<Bytes>> {
        Err(store_down())
    }

    async fn set(&self, _key: &str, _value: Bytes, _ttl_secs: u64) -> CacheableResult<()> {
        Err(store_down())
    }

    async fn delete(&self, _key: &str) -> CacheableResult<()> {
        Err(store_down())
    }

    async fn delete_multiple(&self, _keys: &[String]) -> CacheableResult<()> {
        Err(store_down())
    }

    async fn set_add(&self, _set_key: &str, _member: &str, _ttl_secs: u64) -> CacheableResult<()> {
        Err(store_down())
    }

    async fn set_members(&self, _set_key: &str) -> CacheableResult<HashSet<String>> {
        Err(store_down())
    }

    async fn set_remove(&self, _set_key: &str, _members: &[String]) -> CacheableResult<()> {
        Err(store_down())
    }
}

/// 构造一行 Object 类型的行数据
pub fn row(pairs: &[(&str, DataValue)]) -> DataValue {
    let mut map = HashMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), value.clone());
    }
    DataValue::Object(map)
}

/// 构造写入数据
pub fn payload(pairs: &[(&str, DataValue)]) -> HashMap<String, DataValue> {
    let mut map = HashMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), value.clone());
    }
    map
}
