pub mod graphql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use graphql::GraphqlClient;

use crate::models::{FindFilter, ListDomain, ObjectFilter};
use crate::services::error::FetchError;

/// 一页查询结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_count: 0,
        }
    }
}

/// 带稳定标识的列表条目
pub trait Identified {
    fn id(&self) -> &str;
}

/// 通用实体：`id` 加上任意其余字段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(flatten)]
    pub fields: serde_json::Map<String, serde_json::Value>,
}

impl Identified for Entity {
    fn id(&self) -> &str {
        &self.id
    }
}

/// 分页查询接口
#[async_trait]
pub trait PagedQuery: Send + Sync {
    type Item: Identified + Send;

    async fn find(
        &self,
        domain: ListDomain,
        find_filter: &FindFilter,
        object_filter: &ObjectFilter,
    ) -> Result<Page<Self::Item>, FetchError>;
}
