// 列表控制器
//
// 每个列表页面持有一个控制器，负责：
// - 初始化时合并 URL 参数与保存的偏好
// - 每次修改筛选后同步地址栏、保存偏好，并发起新的查询
// - 丢弃过期的查询结果，维护选择状态与分页窗口

use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::external::{Identified, Page, PagedQuery};
use crate::models::{
    Criterion, DisplayMode, FindFilter, ListDomain, ListFilter, ObjectFilter, SortDirection,
    DEFAULT_ITEMS_PER_PAGE,
};
use crate::services::debounce::{PendingSearch, SearchDebouncer, DEFAULT_SEARCH_DELAY};
use crate::services::error::{FetchError, ListError};
use crate::services::history::HistoryLocation;
use crate::services::pagination::{pages_to_display, PaginationWindow};
use crate::services::preferences::PreferenceStore;
use crate::services::selection::SelectionManager;

/// 可缩放网格的最大缩放级别
pub const MAX_ZOOM_INDEX: usize = 3;

/// 控制器选项
#[derive(Debug, Clone)]
pub struct ListOptions {
    /// 嵌入在其他页面中的列表：不读写地址栏，也不保存偏好
    pub sub_component: bool,
    /// 没有保存偏好时的每页条数
    pub items_per_page: u32,
    /// 分页按钮数量
    pub pagination_budget: usize,
    pub search_delay: Duration,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            sub_component: false,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            pagination_budget: 10,
            search_delay: DEFAULT_SEARCH_DELAY,
        }
    }
}

impl ListOptions {
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            sub_component: false,
            items_per_page: config.items_per_page,
            pagination_budget: pages_to_display(config.viewport_width),
            search_delay: config.search_delay,
        }
    }

    pub fn sub_component(mut self) -> Self {
        self.sub_component = true;
        self
    }
}

/// 控制器生命周期
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPhase {
    Uninitialized,
    Initializing,
    Ready,
}

/// 查询签名：发出查询时的后端参数
///
/// 结果返回时签名与当前筛选不一致，说明筛选已经变化，结果作废。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySignature(String);

impl QuerySignature {
    pub fn of(find_filter: &FindFilter, object_filter: &ObjectFilter) -> Self {
        Self(serde_json::to_string(&(find_filter, object_filter)).unwrap_or_default())
    }
}

/// 待执行的查询
///
/// 由控制器的修改操作返回；调用方执行后把结果交回 `ListController::apply`。
pub struct PendingFetch<Q: PagedQuery> {
    query: Arc<Q>,
    domain: ListDomain,
    find_filter: FindFilter,
    object_filter: ObjectFilter,
    signature: QuerySignature,
}

impl<Q: PagedQuery> PendingFetch<Q> {
    pub fn signature(&self) -> &QuerySignature {
        &self.signature
    }

    pub fn find_filter(&self) -> &FindFilter {
        &self.find_filter
    }

    pub fn object_filter(&self) -> &ObjectFilter {
        &self.object_filter
    }

    pub async fn run(self) -> FetchOutcome<Q::Item> {
        let result = self
            .query
            .find(self.domain, &self.find_filter, &self.object_filter)
            .await;
        FetchOutcome {
            signature: self.signature,
            result,
        }
    }
}

/// 查询结果及其签名
#[derive(Debug)]
pub struct FetchOutcome<T> {
    signature: QuerySignature,
    result: Result<Page<T>, FetchError>,
}

impl<T> FetchOutcome<T> {
    pub fn new(signature: QuerySignature, result: Result<Page<T>, FetchError>) -> Self {
        Self { signature, result }
    }

    pub fn signature(&self) -> &QuerySignature {
        &self.signature
    }

    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// 渲染所需的列表状态
#[derive(Debug, Serialize)]
pub struct ListView<'a, T> {
    pub phase: ListPhase,
    pub domain: ListDomain,
    #[serde(skip)]
    pub filter: &'a ListFilter,
    pub query_string: String,
    pub criteria: Vec<String>,
    pub display_mode: DisplayMode,
    pub zoom_index: usize,
    pub items: &'a [T],
    pub total_count: u64,
    pub pagination: &'a PaginationWindow,
    pub selected_ids: Vec<&'a str>,
    pub loading: bool,
    pub error: Option<String>,
}

/// 列表控制器
pub struct ListController<Q: PagedQuery, L: HistoryLocation> {
    domain: ListDomain,
    options: ListOptions,
    phase: ListPhase,
    filter: ListFilter,
    /// 每次查询前追加的固定条件（不写入地址栏）
    scope: Vec<Criterion>,
    query: Arc<Q>,
    store: Arc<dyn PreferenceStore>,
    location: L,
    debouncer: SearchDebouncer,
    items: Vec<Q::Item>,
    total_count: u64,
    window: PaginationWindow,
    selection: SelectionManager,
    loading: bool,
    error: Option<FetchError>,
    zoom_index: usize,
}

impl<Q: PagedQuery, L: HistoryLocation> ListController<Q, L> {
    pub fn new(
        domain: ListDomain,
        query: Arc<Q>,
        store: Arc<dyn PreferenceStore>,
        location: L,
        options: ListOptions,
    ) -> Self {
        Self {
            domain,
            debouncer: SearchDebouncer::new(options.search_delay),
            options,
            phase: ListPhase::Uninitialized,
            filter: ListFilter::new(domain),
            scope: Vec::new(),
            query,
            store,
            location,
            items: Vec::new(),
            total_count: 0,
            window: PaginationWindow::default(),
            selection: SelectionManager::new(),
            // 偏好读取完成并拿到首个结果前都处于加载中
            loading: true,
            error: None,
            zoom_index: 1,
        }
    }

    /// 限定查询范围，例如某个演员的场景列表
    pub fn with_scope(mut self, criteria: Vec<Criterion>) -> Self {
        self.scope = criteria;
        self
    }

    // ============ 状态访问 ============

    pub fn domain(&self) -> ListDomain {
        self.domain
    }

    pub fn phase(&self) -> ListPhase {
        self.phase
    }

    pub fn filter(&self) -> &ListFilter {
        &self.filter
    }

    pub fn items(&self) -> &[Q::Item] {
        &self.items
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn pagination(&self) -> &PaginationWindow {
        &self.window
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    pub fn zoom_index(&self) -> usize {
        self.zoom_index
    }

    pub fn location(&self) -> &L {
        &self.location
    }

    pub fn location_mut(&mut self) -> &mut L {
        &mut self.location
    }

    pub fn view(&self) -> ListView<'_, Q::Item> {
        ListView {
            phase: self.phase,
            domain: self.domain,
            filter: &self.filter,
            query_string: self.filter.to_query_string(),
            criteria: self.filter.criteria().iter().map(Criterion::label).collect(),
            display_mode: self.filter.display_mode(),
            zoom_index: self.zoom_index,
            items: &self.items,
            total_count: self.total_count,
            pagination: &self.window,
            selected_ids: self.selection.selected_ids(),
            loading: self.loading,
            error: self.error.as_ref().map(ToString::to_string),
        }
    }

    // ============ 生命周期 ============

    /// 合并地址栏与保存的偏好，返回首次查询
    ///
    /// 只能调用一次。读取偏好失败时按没有偏好处理。
    pub async fn initialize(&mut self) -> Result<PendingFetch<Q>, ListError> {
        if self.phase != ListPhase::Uninitialized {
            return Err(ListError::AlreadyInitialized);
        }
        self.phase = ListPhase::Initializing;

        let mut filter = ListFilter::new(self.domain);
        filter.set_items_per_page(self.options.items_per_page);

        if self.options.sub_component {
            filter.merge_preferences("", None);
        } else {
            let stored = match self.store.get(self.domain).await {
                Ok(stored) => stored,
                Err(e) => {
                    tracing::warn!("读取 {} 列表偏好失败: {}", self.domain, e);
                    None
                }
            };
            filter.merge_preferences(&self.location.search(), stored.as_ref());
        }

        self.filter = filter;
        self.phase = ListPhase::Ready;
        tracing::info!("Initialized {} list: {}", self.domain, self.filter.to_query_string());

        self.sync().await;
        Ok(self.begin_fetch())
    }

    /// 以当前筛选查询，直到结果稳定（包括页码被夹回后的补充查询）
    pub async fn refresh(&mut self) -> Result<(), ListError> {
        self.ensure_ready()?;
        let pending = self.begin_fetch();
        self.complete(pending).await;
        Ok(())
    }

    /// 执行查询并应用结果，包括由此产生的补充查询
    pub async fn complete(&mut self, pending: PendingFetch<Q>) {
        let mut next = Some(pending);
        while let Some(pending) = next {
            let outcome = pending.run().await;
            next = self.apply(outcome).await;
        }
    }

    /// 应用查询结果
    ///
    /// 过期结果直接丢弃。页码超出范围时夹回最后一页并返回补充查询。
    pub async fn apply(&mut self, outcome: FetchOutcome<Q::Item>) -> Option<PendingFetch<Q>> {
        if outcome.signature != self.current_signature() {
            tracing::debug!("Discarding stale {} list response", self.domain);
            return None;
        }
        self.loading = false;

        let page = match outcome.result {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("查询 {} 列表失败: {}", self.domain, e);
                self.error = Some(e);
                return None;
            }
        };

        self.error = None;
        self.total_count = page.total_count;
        self.selection
            .replace_items(page.items.iter().map(|item| item.id().to_string()).collect());
        self.items = page.items;
        self.window = PaginationWindow::compute(
            self.total_count,
            self.filter.current_page(),
            self.filter.items_per_page(),
            self.options.pagination_budget,
        );

        if self.window.current_page != self.filter.current_page() {
            tracing::debug!(
                "Clamping {} list page {} to {}",
                self.domain,
                self.filter.current_page(),
                self.window.current_page
            );
            let mut next = self.filter.clone();
            next.set_current_page(self.window.current_page);
            self.filter = next;
            self.sync().await;
            return Some(self.begin_fetch());
        }

        None
    }

    /// 地址栏被外部改变（前进、后退）后重新读取筛选
    ///
    /// 以新筛选为基础解析地址栏，只保留每页条数；地址栏没有的条件和搜索词会被清除。
    /// 与当前筛选一致时返回 `None`。
    pub async fn on_location_change(&mut self) -> Result<Option<PendingFetch<Q>>, ListError> {
        self.ensure_ready()?;
        if self.options.sub_component {
            return Ok(None);
        }

        let mut next = ListFilter::new(self.domain);
        next.set_items_per_page(self.filter.items_per_page());
        next.apply_query_string(&self.location.search());
        if next == self.filter {
            return Ok(None);
        }

        self.filter = next;
        self.sync().await;
        Ok(Some(self.begin_fetch()))
    }

    // ============ 筛选修改 ============

    /// 排队一次搜索框输入；返回值 settle 后再调用 `set_search_term`
    pub fn queue_search(&self, term: impl Into<String>) -> PendingSearch {
        self.debouncer.queue(term)
    }

    pub async fn set_search_term(&mut self, term: Option<String>) -> Result<PendingFetch<Q>, ListError> {
        self.debouncer.cancel();
        self.update(|filter| {
            filter.set_search_term(term);
            Ok(())
        })
        .await
    }

    pub async fn set_current_page(&mut self, page: u32) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            filter.set_current_page(page);
            Ok(())
        })
        .await
    }

    pub async fn set_items_per_page(&mut self, items_per_page: u32) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            if filter.set_items_per_page(items_per_page) {
                Ok(())
            } else {
                Err(ListError::InvalidPageSize(items_per_page))
            }
        })
        .await
    }

    pub async fn set_sort_by(&mut self, sort_by: &str) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            if filter.set_sort_by(sort_by) {
                Ok(())
            } else {
                Err(ListError::UnknownSortKey {
                    sort_by: sort_by.to_string(),
                    domain: filter.domain().as_str(),
                })
            }
        })
        .await
    }

    pub async fn set_sort_direction(&mut self, direction: SortDirection) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            filter.set_sort_direction(direction);
            Ok(())
        })
        .await
    }

    pub async fn toggle_sort_direction(&mut self) -> Result<PendingFetch<Q>, ListError> {
        let direction = self.filter.sort_direction().toggled();
        self.set_sort_direction(direction).await
    }

    /// 添加条件，或通过 `replacing`（旧条件标识）原位编辑
    pub async fn add_criterion(
        &mut self,
        criterion: Criterion,
        replacing: Option<&str>,
    ) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| Ok(filter.add_criterion(criterion, replacing)?))
            .await
    }

    pub async fn remove_criterion(&mut self, id: &str) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            if !filter.remove_criterion(id) {
                tracing::debug!("No criterion {} to remove", id);
            }
            Ok(())
        })
        .await
    }

    pub async fn clear_criteria(&mut self) -> Result<PendingFetch<Q>, ListError> {
        self.update(|filter| {
            filter.clear_criteria();
            Ok(())
        })
        .await
    }

    /// 切换展示模式；结果集不变，因此不发起查询
    pub async fn set_display_mode(&mut self, mode: DisplayMode) -> Result<(), ListError> {
        self.ensure_ready()?;
        let mut next = self.filter.clone();
        if !next.set_display_mode(mode) {
            return Err(ListError::UnsupportedDisplayMode {
                domain: self.domain.as_str(),
            });
        }
        self.filter = next;
        self.sync().await;
        Ok(())
    }

    pub fn set_zoom_index(&mut self, zoom_index: usize) {
        self.zoom_index = zoom_index.min(MAX_ZOOM_INDEX);
    }

    // ============ 选择 ============

    pub fn on_select_change(&mut self, id: &str, selected: bool, shift_key: bool) {
        self.selection.on_select_change(id, selected, shift_key);
    }

    pub fn select_all(&mut self) {
        self.selection.select_all();
    }

    pub fn select_none(&mut self) {
        self.selection.select_none();
    }

    // ============ 内部 ============

    fn ensure_ready(&self) -> Result<(), ListError> {
        if self.phase == ListPhase::Ready {
            Ok(())
        } else {
            Err(ListError::NotReady)
        }
    }

    /// 在筛选副本上修改，成功后替换当前筛选
    async fn update<F>(&mut self, mutate: F) -> Result<PendingFetch<Q>, ListError>
    where
        F: FnOnce(&mut ListFilter) -> Result<(), ListError>,
    {
        self.ensure_ready()?;
        let mut next = self.filter.clone();
        mutate(&mut next)?;
        self.filter = next;
        self.sync().await;
        Ok(self.begin_fetch())
    }

    /// 当前筛选加上固定范围条件
    fn query_filter(&self) -> ListFilter {
        let mut filter = self.filter.clone();
        for criterion in &self.scope {
            if let Err(e) = filter.add_criterion(criterion.clone(), None) {
                tracing::debug!("Skipping scope criterion {}: {}", criterion.id(), e);
            }
        }
        filter.set_current_page(self.filter.current_page());
        filter
    }

    fn current_signature(&self) -> QuerySignature {
        let filter = self.query_filter();
        QuerySignature::of(&filter.make_find_filter(), &filter.object_filter())
    }

    fn begin_fetch(&mut self) -> PendingFetch<Q> {
        let filter = self.query_filter();
        let find_filter = filter.make_find_filter();
        let object_filter = filter.object_filter();
        let signature = QuerySignature::of(&find_filter, &object_filter);

        self.loading = true;
        PendingFetch {
            query: Arc::clone(&self.query),
            domain: self.domain,
            find_filter,
            object_filter,
            signature,
        }
    }

    /// 同步地址栏并保存偏好；写入失败只记录警告
    async fn sync(&mut self) {
        if self.options.sub_component || self.phase != ListPhase::Ready {
            return;
        }

        let query_string = self.filter.to_query_string();
        if self.location.search().trim_start_matches('?') != query_string {
            self.location.replace(&query_string);
        }

        if let Err(e) = self.store.set(self.domain, self.filter.snapshot()).await {
            tracing::warn!("保存 {} 列表偏好失败: {}", self.domain, e);
        }
    }
}
