// 媒体库列表引擎
//
// 本库提供媒体库列表页面的核心逻辑，包括：
// - 筛选条件与查询字符串编码
// - 后端查询对象
// - 分页窗口与多选
// - 列表控制器（偏好合并、地址栏同步、过期结果丢弃）

pub mod config;
pub mod external;
pub mod models;
pub mod services;

pub use config::EngineConfig;
pub use external::{Entity, GraphqlClient, Identified, Page, PagedQuery};
pub use services::{ListController, ListOptions};
