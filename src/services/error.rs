// 列表引擎错误类型定义
//
// 查询、偏好存储和列表控制器各自的错误类型

use thiserror::Error;

use crate::models::CriterionError;

/// 后端查询错误
///
/// 需要保存在视图状态中，因此只携带可克隆的信息。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("网络错误: {0}")]
    Transport(String),

    #[error("请求超时")]
    Timeout,

    #[error("HTTP 错误: 状态码 {0}")]
    Status(u16),

    #[error("GraphQL 错误: {0}")]
    Graphql(String),

    #[error("响应解析失败: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Decode(err.to_string())
    }
}

/// 偏好存储错误
#[derive(Debug, Error)]
pub enum PreferenceError {
    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON 序列化错误: {0}")]
    Json(#[from] serde_json::Error),

    #[error("存储错误: {0}")]
    Storage(String),
}

/// 列表控制器错误
#[derive(Debug, Error)]
pub enum ListError {
    #[error("列表尚未初始化")]
    NotReady,

    #[error("列表已经初始化")]
    AlreadyInitialized,

    #[error("无效的每页条数: {0}")]
    InvalidPageSize(u32),

    #[error("{domain} 不支持排序字段 {sort_by}")]
    UnknownSortKey { sort_by: String, domain: &'static str },

    #[error("{domain} 不支持该展示模式")]
    UnsupportedDisplayMode { domain: &'static str },

    #[error("条件错误: {0}")]
    Criterion(#[from] CriterionError),
}
