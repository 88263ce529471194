//! 错误类型定义模块
//!
//! 提供统一的错误类型和便捷的错误构造宏

use thiserror::Error;

/// rat_cacheable 统一错误类型
#[derive(Error, Debug)]
pub enum CacheableError {
    /// 配置错误
    #[error("配置错误: {message}")]
    ConfigError {
        /// 错误消息
        message: String,
    },

    /// 分组值解析失败
    ///
    /// 表启用了分组缓存，但写操作无法从调用方覆盖值、写入数据
    /// 或过滤条件中解析出分组字段的值。该错误在任何数据变更之前抛出。
    #[error("无法解析分组值: 表 '{table}' 的分组字段 '{field}'")]
    GroupValueUnresolved {
        /// 表名
        table: String,
        /// 分组字段名
        field: String,
    },

    /// 缓存操作失败
    #[error("缓存操作失败: {message}")]
    CacheError {
        /// 错误消息
        message: String,
    },

    /// 数据序列化失败
    #[error("数据序列化失败: {message}")]
    SerializationError {
        /// 错误消息
        message: String,
    },

    /// 查询执行失败
    #[error("查询执行失败: {message}")]
    QueryError {
        /// 错误消息
        message: String,
    },
}

/// rat_cacheable 统一结果类型
pub type CacheableResult<T> = Result<T, CacheableError>;

/// 便捷的错误构造宏
///
/// # 示例
///
/// ```ignore
/// return Err(cacheable_error!(config, "缓存键前缀不能为空"));
/// return Err(cacheable_error!(group_unresolved, "orders", "company_id"));
/// ```
#[macro_export]
macro_rules! cacheable_error {
    (config, $msg:expr) => {
        $crate::error::CacheableError::ConfigError {
            message: $msg.to_string(),
        }
    };
    (cache, $msg:expr) => {
        $crate::error::CacheableError::CacheError {
            message: $msg.to_string(),
        }
    };
    (serialization, $msg:expr) => {
        $crate::error::CacheableError::SerializationError {
            message: $msg.to_string(),
        }
    };
    (query, $msg:expr) => {
        $crate::error::CacheableError::QueryError {
            message: $msg.to_string(),
        }
    };
    (group_unresolved, $table:expr, $field:expr) => {
        $crate::error::CacheableError::GroupValueUnresolved {
            table: $table.to_string(),
            field: $field.to_string(),
        }
    };
}
