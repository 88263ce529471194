use crate::error::CacheableResult;
use crate::types::query::QueryOperator;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 缓存策略配置
///
/// 控制缓存的全局开关、TTL、键前缀、按表分组字段以及
/// 被排除在缓存之外的操作符列表。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheableConfig {
    /// 是否启用缓存（全局开关，单次调用可覆盖）
    pub enabled: bool,
    /// 缓存时长（秒）
    pub ttl_secs: u64,
    /// 缓存键前缀
    pub prefix: String,
    /// 分组字段映射（表名 -> 分组列名）
    ///
    /// 表出现在该映射中即视为启用了分组缓存，
    /// 该表的缓存空间按分组列的值切分为独立的失效范围。
    #[serde(default)]
    pub group_fields: HashMap<String, String>,
    /// 被排除在缓存之外的操作符列表
    #[serde(default = "default_excluded_operators")]
    pub excluded_operators: Vec<QueryOperator>,
}

/// 默认排除的操作符：全部模式匹配类操作符
fn default_excluded_operators() -> Vec<QueryOperator> {
    vec![
        QueryOperator::Like,
        QueryOperator::Contains,
        QueryOperator::StartsWith,
        QueryOperator::EndsWith,
        QueryOperator::Regex,
    ]
}

impl CacheableConfig {
    /// 创建缓存配置构建器
    pub fn builder() -> CacheableConfigBuilder {
        CacheableConfigBuilder::new()
    }

    /// 获取表的分组字段（未配置分组时返回 None）
    pub fn group_field(&self, table: &str) -> Option<&str> {
        self.group_fields.get(table).map(|s| s.as_str())
    }

    /// 判断操作符是否被排除在缓存之外
    pub fn is_excluded_operator(&self, operator: &QueryOperator) -> bool {
        self.excluded_operators.contains(operator)
    }
}

/// 缓存配置构建器
///
/// 严格要求所有必选配置项必须显式设置，严禁使用默认值
#[derive(Debug)]
pub struct CacheableConfigBuilder {
    enabled: Option<bool>,
    ttl_secs: Option<u64>,
    prefix: Option<String>,
    group_fields: HashMap<String, String>,
    excluded_operators: Option<Vec<QueryOperator>>,
}

impl CacheableConfigBuilder {
    /// 创建新的构建器
    pub fn new() -> Self {
        Self {
            enabled: None,
            ttl_secs: None,
            prefix: None,
            group_fields: HashMap::new(),
            excluded_operators: None,
        }
    }

    /// 设置是否启用缓存
    ///
    /// # 参数
    ///
    /// * `enabled` - 全局缓存开关
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    /// 设置缓存时长
    ///
    /// # 参数
    ///
    /// * `ttl_secs` - 缓存时长（秒），必须大于 0
    pub fn ttl_secs(mut self, ttl_secs: u64) -> Self {
        self.ttl_secs = Some(ttl_secs);
        self
    }

    /// 设置缓存键前缀
    ///
    /// # 参数
    ///
    /// * `prefix` - 缓存键前缀，不能为空
    pub fn prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// 为表配置分组字段
    ///
    /// # 参数
    ///
    /// * `table` - 表名
    /// * `field` - 分组列名
    pub fn group_field<T: Into<String>, F: Into<String>>(mut self, table: T, field: F) -> Self {
        self.group_fields.insert(table.into(), field.into());
        self
    }

    /// 覆盖默认的排除操作符列表
    ///
    /// # 参数
    ///
    /// * `operators` - 被排除在缓存之外的操作符
    pub fn excluded_operators(mut self, operators: Vec<QueryOperator>) -> Self {
        self.excluded_operators = Some(operators);
        self
    }

    /// 构建缓存配置
    ///
    /// # 错误
    ///
    /// 必选项缺失、前缀为空或 TTL 为 0 时返回 `ConfigError`
    pub fn build(self) -> CacheableResult<CacheableConfig> {
        let enabled = self
            .enabled
            .ok_or_else(|| crate::cacheable_error!(config, "必须显式设置 enabled"))?;
        let ttl_secs = self
            .ttl_secs
            .ok_or_else(|| crate::cacheable_error!(config, "必须显式设置 ttl_secs"))?;
        let prefix = self
            .prefix
            .ok_or_else(|| crate::cacheable_error!(config, "必须显式设置 prefix"))?;

        if ttl_secs == 0 {
            return Err(crate::cacheable_error!(config, "ttl_secs 必须大于 0"));
        }
        if prefix.is_empty() {
            return Err(crate::cacheable_error!(config, "缓存键前缀不能为空"));
        }
        if prefix.contains(':') {
            return Err(crate::cacheable_error!(config, "缓存键前缀不能包含 ':'"));
        }

        Ok(CacheableConfig {
            enabled,
            ttl_secs,
            prefix,
            group_fields: self.group_fields,
            excluded_operators: self
                .excluded_operators
                .unwrap_or_else(default_excluded_operators),
        })
    }
}

impl Default for CacheableConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
