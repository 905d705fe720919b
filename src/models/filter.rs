// 列表筛选聚合
//
// 每个列表视图持有一个 ListFilter：搜索词、排序、展示模式、分页和条件列表。
// 它负责：
// - 生成后端查询对象（FindFilter + ObjectFilter）
// - 与 URL 查询字符串互相转换
// - 与持久化的偏好快照合并

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::criterion::{Criterion, CriterionError};
use super::domain::{DisplayMode, ListDomain, SortDirection};
use super::query::{FindFilter, ObjectFilter};
use super::registry;

/// 默认每页条数
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 40;

/// 每页条数的可选值
pub const PAGE_SIZE_OPTIONS: [u32; 4] = [20, 40, 60, 120];

/// 持久化的列表偏好（按领域保存）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub query_string: String,
    pub items_per_page: u32,
    pub current_page: u32,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

/// 从查询字符串中解析出的参数，只保留格式合法的值
#[derive(Debug, Default)]
struct QueryParams {
    sort_by: Option<String>,
    sort_direction: Option<SortDirection>,
    display_mode: Option<DisplayMode>,
    search_term: Option<String>,
    page: Option<u32>,
    criteria: Option<Vec<String>>,
}

impl QueryParams {
    fn parse(query: &str) -> Self {
        let query = query.trim_start_matches('?');
        let mut params = QueryParams::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match &*key {
                "sortby" => params.sort_by = Some(value.into_owned()),
                "sortdir" => {
                    if let Some(direction) = SortDirection::from_str(&value) {
                        params.sort_direction = Some(direction);
                    }
                }
                "disp" => {
                    if let Some(mode) = value.parse().ok().and_then(DisplayMode::from_ordinal) {
                        params.display_mode = Some(mode);
                    }
                }
                "q" => params.search_term = Some(value.into_owned()),
                "p" => {
                    if let Ok(page) = value.parse::<u32>() {
                        if page >= 1 {
                            params.page = Some(page);
                        }
                    }
                }
                "c" => params
                    .criteria
                    .get_or_insert_with(Vec::new)
                    .push(value.into_owned()),
                other => tracing::trace!("Ignoring unknown query parameter {:?}", other),
            }
        }

        params
    }

    /// 只保留偏好合并时使用的字段
    fn preference_fields(self) -> Self {
        Self {
            sort_by: self.sort_by,
            sort_direction: self.sort_direction,
            display_mode: self.display_mode,
            ..Self::default()
        }
    }
}

/// 列表筛选聚合
#[derive(Debug, Clone, PartialEq)]
pub struct ListFilter {
    domain: ListDomain,
    search_term: Option<String>,
    current_page: u32,
    items_per_page: u32,
    sort_by: String,
    sort_direction: SortDirection,
    display_mode: DisplayMode,
    criteria: Vec<Criterion>,
}

impl ListFilter {
    pub fn new(domain: ListDomain) -> Self {
        Self {
            domain,
            search_term: None,
            current_page: 1,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            sort_by: domain.default_sort_by().to_string(),
            sort_direction: SortDirection::Asc,
            display_mode: domain.default_display_mode(),
            criteria: Vec::new(),
        }
    }

    pub fn domain(&self) -> ListDomain {
        self.domain
    }

    pub fn search_term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn items_per_page(&self) -> u32 {
        self.items_per_page
    }

    pub fn sort_by(&self) -> &str {
        &self.sort_by
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn display_mode(&self) -> DisplayMode {
        self.display_mode
    }

    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    // ============ 变更操作 ============

    /// 空白搜索词视为清除；会回到第一页
    pub fn set_search_term(&mut self, term: Option<String>) {
        self.search_term = term.filter(|t| !t.trim().is_empty());
        self.current_page = 1;
    }

    /// 页码至少为 1
    pub fn set_current_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    /// 返回 false 表示页大小为 0，未做修改
    pub fn set_items_per_page(&mut self, items_per_page: u32) -> bool {
        if items_per_page == 0 {
            return false;
        }
        self.items_per_page = items_per_page;
        self.current_page = 1;
        true
    }

    /// 返回 false 表示该领域没有此排序字段
    pub fn set_sort_by(&mut self, sort_by: &str) -> bool {
        if !self.domain.is_sort_option(sort_by) {
            return false;
        }
        self.sort_by = sort_by.to_string();
        self.current_page = 1;
        true
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort_direction = direction;
    }

    /// 返回 false 表示该领域不支持此展示模式
    pub fn set_display_mode(&mut self, mode: DisplayMode) -> bool {
        if !self.domain.supports_display_mode(mode) {
            return false;
        }
        self.display_mode = mode;
        true
    }

    /// 添加或原位编辑条件
    ///
    /// `replacing` 为被编辑条件的旧标识；没有时按新条件自身的标识查找。
    /// 找到则替换，否则追加；随后按标识去重，保留刚写入的条件。
    pub fn add_criterion(
        &mut self,
        criterion: Criterion,
        replacing: Option<&str>,
    ) -> Result<(), CriterionError> {
        if !registry::is_legal(self.domain, criterion.criterion_type()) {
            return Err(CriterionError::IllegalForDomain {
                criterion: criterion.criterion_type().as_str(),
                domain: self.domain.as_str(),
            });
        }

        let target_id = replacing.map(str::to_string).unwrap_or_else(|| criterion.id());
        let new_id = criterion.id();
        let written = match self.criteria.iter().position(|c| c.id() == target_id) {
            Some(index) => {
                self.criteria[index] = criterion;
                index
            }
            None => {
                self.criteria.push(criterion);
                self.criteria.len() - 1
            }
        };

        // 原位编辑可能让新标识与另一个已有条件冲突，新写入的条件胜出
        let mut index = 0;
        self.criteria.retain(|c| {
            let keep = index == written || c.id() != new_id;
            index += 1;
            keep
        });

        self.current_page = 1;
        Ok(())
    }

    /// 返回是否有条件被移除
    pub fn remove_criterion(&mut self, id: &str) -> bool {
        let before = self.criteria.len();
        self.criteria.retain(|c| c.id() != id);
        let removed = self.criteria.len() != before;
        if removed {
            self.current_page = 1;
        }
        removed
    }

    pub fn clear_criteria(&mut self) {
        self.criteria.clear();
        self.current_page = 1;
    }

    // ============ 后端查询 ============

    pub fn make_find_filter(&self) -> FindFilter {
        FindFilter {
            q: self.search_term.clone(),
            page: self.current_page,
            per_page: self.items_per_page,
            sort: self.sort_by.clone(),
            direction: self.sort_direction.into(),
        }
    }

    /// 把条件列表翻译为 `domain` 的后端筛选对象
    ///
    /// 对该领域不合法或尚未填写完整的条件直接跳过（旧版本保存的偏好可能包含这类条件）。
    pub fn make_object_filter(&self, domain: ListDomain) -> ObjectFilter {
        let mut filter = ObjectFilter::empty(domain);
        for criterion in &self.criteria {
            if !criterion.is_valid() {
                continue;
            }
            if !registry::is_legal(domain, criterion.criterion_type()) {
                tracing::debug!(
                    "Skipping criterion {} not available for {}",
                    criterion.id(),
                    domain
                );
                continue;
            }
            filter.apply(criterion);
        }
        filter
    }

    pub fn object_filter(&self) -> ObjectFilter {
        self.make_object_filter(self.domain)
    }

    // ============ 查询字符串 ============

    /// 规范编码：`c`（可重复）、`disp`、`p`、`q`、`sortby`、`sortdir`
    pub fn to_query_string(&self) -> String {
        let mut pairs: Vec<(&str, String)> = self
            .criteria
            .iter()
            .map(|criterion| ("c", criterion.to_json()))
            .collect();
        pairs.push(("disp", self.display_mode.ordinal().to_string()));
        pairs.push(("p", self.current_page.to_string()));
        if let Some(ref term) = self.search_term {
            pairs.push(("q", term.clone()));
        }
        pairs.push(("sortby", self.sort_by.clone()));
        pairs.push(("sortdir", self.sort_direction.as_str().to_string()));

        pairs
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// 应用查询字符串
    ///
    /// 未知参数忽略；格式错误的 `c` 单独丢弃，不影响其余条件。
    pub fn apply_query_string(&mut self, query: &str) {
        self.apply_params(QueryParams::parse(query));
    }

    pub fn from_query_string(domain: ListDomain, query: &str) -> Self {
        let mut filter = Self::new(domain);
        filter.apply_query_string(query);
        filter
    }

    fn apply_params(&mut self, params: QueryParams) {
        if let Some(sort_by) = params.sort_by {
            if !self.set_sort_by_raw(&sort_by) {
                tracing::debug!("Ignoring unknown sort key {:?} for {}", sort_by, self.domain);
            }
        }
        if let Some(direction) = params.sort_direction {
            self.sort_direction = direction;
        }
        if let Some(mode) = params.display_mode {
            if !self.set_display_mode(mode) {
                tracing::debug!("Ignoring display mode {:?} for {}", mode, self.domain);
            }
        }
        if let Some(term) = params.search_term {
            self.search_term = Some(term).filter(|t| !t.trim().is_empty());
        }
        if let Some(page) = params.page {
            self.current_page = page;
        }
        if let Some(encoded) = params.criteria {
            self.criteria = self.decode_criteria(&encoded);
        }
    }

    /// 不重置页码的排序字段设置，用于还原状态
    fn set_sort_by_raw(&mut self, sort_by: &str) -> bool {
        if !self.domain.is_sort_option(sort_by) {
            return false;
        }
        self.sort_by = sort_by.to_string();
        true
    }

    fn decode_criteria(&self, encoded: &[String]) -> Vec<Criterion> {
        let mut criteria: Vec<Criterion> = Vec::with_capacity(encoded.len());
        for json in encoded {
            match Criterion::from_json(json) {
                Ok(criterion) if criterion.is_none() => {}
                Ok(criterion) => {
                    // 同一标识后出现者覆盖先出现者
                    let id = criterion.id();
                    match criteria.iter().position(|c| c.id() == id) {
                        Some(index) => criteria[index] = criterion,
                        None => criteria.push(criterion),
                    }
                }
                Err(e) => tracing::debug!("Dropping malformed criterion {:?}: {}", json, e),
            }
        }
        criteria
    }

    // ============ 偏好 ============

    /// 合并持久化偏好与 URL 状态
    ///
    /// 偏好中的展示模式、每页条数、排序字段和方向先写入，URL 参数随后覆盖。
    pub fn merge_preferences(&mut self, url_query: &str, stored: Option<&PreferenceSnapshot>) {
        if let Some(snapshot) = stored {
            self.apply_params(QueryParams::parse(&snapshot.query_string).preference_fields());
            if snapshot.items_per_page > 0 {
                self.items_per_page = snapshot.items_per_page;
            }
        }
        self.apply_query_string(url_query);
    }

    pub fn snapshot(&self) -> PreferenceSnapshot {
        PreferenceSnapshot {
            query_string: self.to_query_string(),
            items_per_page: self.items_per_page,
            current_page: self.current_page,
            updated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::criterion::{CriterionModifier, CriterionValue, LabeledId};
    use crate::models::query::SceneFilter;
    use crate::models::registry::make_criterion;
    use proptest::prelude::*;

    fn rating(modifier: CriterionModifier, value: i64) -> Criterion {
        make_criterion("rating")
            .with_modifier(modifier)
            .unwrap()
            .with_value(CriterionValue::Number(value))
            .unwrap()
    }

    fn tags(ids: &[&str]) -> Criterion {
        make_criterion("tags")
            .with_value(CriterionValue::Labeled(
                ids.iter().map(|id| LabeledId::new(*id, format!("tag {}", id))).collect(),
            ))
            .unwrap()
    }

    #[test]
    fn test_domain_defaults() {
        let filter = ListFilter::new(ListDomain::Galleries);
        assert_eq!(filter.sort_by(), "path");
        assert_eq!(filter.display_mode(), DisplayMode::List);
        assert_eq!(filter.current_page(), 1);
        assert_eq!(filter.items_per_page(), DEFAULT_ITEMS_PER_PAGE);
    }

    #[test]
    fn test_query_string_format() {
        let mut filter = ListFilter::new(ListDomain::Scenes);
        filter.add_criterion(rating(CriterionModifier::GreaterThan, 3), None).unwrap();
        filter.set_search_term(Some("beach day".to_string()));
        filter.set_current_page(2);
        filter.set_sort_direction(SortDirection::Desc);

        assert_eq!(
            filter.to_query_string(),
            "c=%7B%22type%22%3A%22rating%22%2C%22value%22%3A3%2C%22modifier%22%3A%22GREATER_THAN%22%7D\
             &disp=0&p=2&q=beach%20day&sortby=date&sortdir=desc"
        );
    }

    #[test]
    fn test_round_trip() {
        let mut filter = ListFilter::new(ListDomain::Scenes);
        filter.add_criterion(rating(CriterionModifier::Equals, 5), None).unwrap();
        filter.add_criterion(tags(&["1", "2"]), None).unwrap();
        filter.set_search_term(Some("a&b=c".to_string()));
        filter.set_sort_by("rating");
        filter.set_display_mode(DisplayMode::Wall);
        filter.set_current_page(7);

        let parsed = ListFilter::from_query_string(ListDomain::Scenes, &filter.to_query_string());
        assert_eq!(parsed, filter);
    }

    #[test]
    fn test_add_criterion_replaces_same_identity() {
        let mut filter = ListFilter::new(ListDomain::Scenes);
        filter.add_criterion(rating(CriterionModifier::GreaterThan, 2), None).unwrap();
        filter.add_criterion(tags(&["1"]), None).unwrap();
        filter.add_criterion(rating(CriterionModifier::GreaterThan, 4), None).unwrap();

        assert_eq!(filter.criteria().len(), 2);
        assert_eq!(filter.criteria()[0].number(), Some(4));
    }

    #[test]
    fn test_edit_in_place_by_old_identity() {
        let mut filter = ListFilter::new(ListDomain::Scenes);
        filter.add_criterion(rating(CriterionModifier::LessThan, 2), None).unwrap();
        filter.add_criterion(tags(&["1"]), None).unwrap();
        filter.add_criterion(rating(CriterionModifier::GreaterThan, 2), None).unwrap();

        // GREATER_THAN 改成 LESS_THAN，与第一个条件冲突
        filter
            .add_criterion(rating(CriterionModifier::LessThan, 5), Some("rating:GREATER_THAN"))
            .unwrap();

        let ids: Vec<String> = filter.criteria().iter().map(Criterion::id).collect();
        assert_eq!(ids, vec!["tags:INCLUDES", "rating:LESS_THAN"]);
        assert_eq!(filter.criteria()[1].number(), Some(5));
    }

    #[test]
    fn test_add_illegal_criterion_rejected() {
        let mut filter = ListFilter::new(ListDomain::Studios);
        let err = filter.add_criterion(rating(CriterionModifier::Equals, 1), None).unwrap_err();
        assert!(matches!(err, CriterionError::IllegalForDomain { .. }));
        assert!(filter.criteria().is_empty());
    }

    #[test]
    fn test_mutations_reset_page() {
        let mut filter = ListFilter::new(ListDomain::Performers);
        filter.set_current_page(4);
        filter.set_sort_direction(SortDirection::Desc);
        assert_eq!(filter.current_page(), 4);

        filter.set_sort_by("height");
        assert_eq!(filter.current_page(), 1);

        filter.set_current_page(4);
        assert!(!filter.set_items_per_page(0));
        assert_eq!(filter.current_page(), 4);
        assert!(filter.set_items_per_page(60));
        assert_eq!(filter.current_page(), 1);
    }

    #[test]
    fn test_malformed_criterion_dropped() {
        let good = rating(CriterionModifier::Equals, 3).to_json();
        let query = format!(
            "c={}&c={}&c={}&p=3",
            urlencoding::encode(&good),
            urlencoding::encode("{broken"),
            urlencoding::encode(r#"{"type":"rating","value":"high","modifier":"EQUALS"}"#),
        );

        let filter = ListFilter::from_query_string(ListDomain::Scenes, &query);
        assert_eq!(filter.criteria().len(), 1);
        assert_eq!(filter.criteria()[0].id(), "rating:EQUALS");
        assert_eq!(filter.current_page(), 3);
    }

    #[test]
    fn test_unknown_and_invalid_params_ignored() {
        let filter =
            ListFilter::from_query_string(ListDomain::Studios, "?zoom=3&sortdir=up&disp=2&p=0&sortby=rating");
        assert_eq!(filter, ListFilter::new(ListDomain::Studios));
    }

    #[test]
    fn test_duplicate_criteria_in_url_last_wins() {
        let query = format!(
            "c={}&c={}",
            urlencoding::encode(&rating(CriterionModifier::Equals, 1).to_json()),
            urlencoding::encode(&rating(CriterionModifier::Equals, 4).to_json()),
        );
        let filter = ListFilter::from_query_string(ListDomain::Scenes, &query);
        assert_eq!(filter.criteria().len(), 1);
        assert_eq!(filter.criteria()[0].number(), Some(4));
    }

    #[test]
    fn test_object_filter_skips_illegal_and_incomplete() {
        // 场景标记列表的状态里混入了场景评分条件
        let query = format!(
            "c={}&c={}",
            urlencoding::encode(&rating(CriterionModifier::Equals, 2).to_json()),
            urlencoding::encode(&tags(&["8"]).to_json()),
        );
        let markers = ListFilter::from_query_string(ListDomain::SceneMarkers, &query);
        let scenes = ListFilter::from_query_string(ListDomain::Scenes, &query);

        let ObjectFilter::SceneMarkers(marker_filter) = markers.object_filter() else {
            panic!("expected scene marker filter");
        };
        assert!(marker_filter.tags.is_some());

        let ObjectFilter::Scenes(SceneFilter { rating, tags, .. }) = scenes.object_filter() else {
            panic!("expected scene filter");
        };
        assert_eq!(rating.map(|r| r.value), Some(2));
        assert_eq!(tags.map(|t| t.value), Some(vec!["8".to_string()]));

        let mut incomplete = ListFilter::new(ListDomain::Scenes);
        incomplete.add_criterion(make_criterion("performers"), None).unwrap();
        assert_eq!(incomplete.object_filter(), ObjectFilter::empty(ListDomain::Scenes));
    }

    #[test]
    fn test_find_filter() {
        let mut filter = ListFilter::new(ListDomain::Movies);
        filter.set_search_term(Some("  ".to_string()));
        let find = filter.make_find_filter();
        assert_eq!(find.q, None);
        assert_eq!(find.sort, "name");
        assert_eq!(find.per_page, 40);
    }

    #[test]
    fn test_url_sort_beats_stored_sort() {
        let mut stored = ListFilter::new(ListDomain::Scenes);
        stored.set_sort_by("title");
        stored.set_display_mode(DisplayMode::List);
        stored.set_items_per_page(120);
        let snapshot = stored.snapshot();

        let mut merged = ListFilter::new(ListDomain::Scenes);
        merged.merge_preferences("sortby=rating", Some(&snapshot));

        assert_eq!(merged.sort_by(), "rating");
        assert_eq!(merged.display_mode(), DisplayMode::List);
        assert_eq!(merged.items_per_page(), 120);
    }

    #[test]
    fn test_stored_criteria_and_page_not_seeded() {
        let mut stored = ListFilter::new(ListDomain::Scenes);
        stored.add_criterion(rating(CriterionModifier::Equals, 3), None).unwrap();
        stored.set_current_page(9);
        let snapshot = stored.snapshot();

        let mut merged = ListFilter::new(ListDomain::Scenes);
        merged.merge_preferences("", Some(&snapshot));
        assert!(merged.criteria().is_empty());
        assert_eq!(merged.current_page(), 1);
    }

    #[test]
    fn test_merge_without_stored_preferences() {
        let mut merged = ListFilter::new(ListDomain::Performers);
        merged.merge_preferences("?disp=1&q=anna", None);
        assert_eq!(merged.display_mode(), DisplayMode::List);
        assert_eq!(merged.search_term(), Some("anna"));
    }

    fn arb_criterion() -> impl Strategy<Value = Criterion> {
        prop_oneof![
            (1i64..=5, 0usize..4).prop_map(|(value, m)| {
                let modifier = [
                    CriterionModifier::Equals,
                    CriterionModifier::NotEquals,
                    CriterionModifier::GreaterThan,
                    CriterionModifier::LessThan,
                ][m];
                rating(modifier, value)
            }),
            proptest::collection::vec("[a-z0-9]{1,6}", 1..4).prop_map(|ids| {
                let ids: Vec<&str> = ids.iter().map(String::as_str).collect();
                tags(&ids)
            }),
            prop::sample::select(vec!["240p", "480p", "720p", "1080p", "4k"]).prop_map(|v| {
                make_criterion("resolution")
                    .with_value(CriterionValue::Text(v.to_string()))
                    .unwrap()
            }),
            Just(make_criterion("movies").with_modifier(CriterionModifier::Excludes).unwrap()),
        ]
    }

    proptest! {
        #[test]
        fn test_query_string_round_trip(
            criteria in proptest::collection::vec(arb_criterion(), 0..6),
            term in proptest::option::of("[ -~]{1,20}"),
            page in 1u32..500,
            sort in prop::sample::select(ListDomain::Scenes.sort_options()),
            desc in any::<bool>(),
            mode in 0u32..3,
        ) {
            let mut filter = ListFilter::new(ListDomain::Scenes);
            for criterion in criteria {
                filter.add_criterion(criterion, None).unwrap();
            }
            filter.set_search_term(term);
            filter.set_sort_by(sort);
            filter.set_sort_direction(if desc { SortDirection::Desc } else { SortDirection::Asc });
            filter.set_display_mode(DisplayMode::from_ordinal(mode).unwrap());
            filter.set_current_page(page);

            let parsed = ListFilter::from_query_string(ListDomain::Scenes, &filter.to_query_string());
            prop_assert_eq!(parsed, filter);
        }
    }
}
