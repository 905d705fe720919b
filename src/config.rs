// 运行配置
//
// 从环境变量（可由 .env 提供）读取，缺失或格式错误时使用默认值

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::models::DEFAULT_ITEMS_PER_PAGE;
use crate::services::debounce::DEFAULT_SEARCH_DELAY;
use crate::services::preferences::JsonFilePreferenceStore;

/// 默认 GraphQL 端点
pub const DEFAULT_GRAPHQL_URL: &str = "http://localhost:9999/graphql";

/// 默认视口宽度（桌面）
pub const DEFAULT_VIEWPORT_WIDTH: u32 = 1280;

/// 默认 GraphQL 请求超时
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// GraphQL 端点地址
    pub graphql_url: String,
    /// 可选的 ApiKey 请求头
    pub api_key: Option<String>,
    /// 偏好文件路径
    pub preferences_path: PathBuf,
    /// 搜索防抖延迟
    pub search_delay: Duration,
    /// 没有保存偏好时的每页条数
    pub items_per_page: u32,
    /// 用于计算分页按钮数量
    pub viewport_width: u32,
    /// GraphQL 请求超时
    pub request_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            graphql_url: DEFAULT_GRAPHQL_URL.to_string(),
            api_key: None,
            preferences_path: PathBuf::from(JsonFilePreferenceStore::DEFAULT_PATH),
            search_delay: DEFAULT_SEARCH_DELAY,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl EngineConfig {
    /// 从进程环境变量读取
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 从任意键值来源读取
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let search_delay = parse_or(value("LIST_SEARCH_DEBOUNCE_MS"), "LIST_SEARCH_DEBOUNCE_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.search_delay);
        let items_per_page = parse_or::<u32>(value("LIST_ITEMS_PER_PAGE"), "LIST_ITEMS_PER_PAGE")
            .filter(|n| *n > 0)
            .unwrap_or(defaults.items_per_page);
        let viewport_width = parse_or(value("LIST_VIEWPORT_WIDTH"), "LIST_VIEWPORT_WIDTH")
            .unwrap_or(defaults.viewport_width);
        let request_timeout = parse_or::<u64>(value("STASH_REQUEST_TIMEOUT_SECS"), "STASH_REQUEST_TIMEOUT_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            graphql_url: value("STASH_GRAPHQL_URL").unwrap_or(defaults.graphql_url),
            api_key: value("STASH_API_KEY"),
            preferences_path: value("LIST_PREFERENCES_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.preferences_path),
            search_delay,
            items_per_page,
            viewport_width,
            request_timeout,
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str) -> Option<T> {
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Invalid value {:?} for {}, using default", raw, key);
            None
        }
    }
}
