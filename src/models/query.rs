// 后端查询对象
//
// 与远端 GraphQL 接口约定的输入结构：
// - FindFilterType（分页、排序、搜索词）
// - 各领域的 *FilterType（由条件列表翻译而来）

use serde::Serialize;

use super::criterion::{Criterion, CriterionModifier, CriterionType};
use super::domain::{ListDomain, SortDirection};

/// 后端排序方向枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SortDirectionEnum {
    Asc,
    Desc,
}

impl From<SortDirection> for SortDirectionEnum {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => SortDirectionEnum::Asc,
            SortDirection::Desc => SortDirectionEnum::Desc,
        }
    }
}

/// 分页与排序参数
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FindFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    pub page: u32,
    pub per_page: u32,
    pub sort: String,
    pub direction: SortDirectionEnum,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IntCriterionInput {
    pub value: i64,
    pub modifier: CriterionModifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StringCriterionInput {
    pub value: String,
    pub modifier: CriterionModifier,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultiCriterionInput {
    pub value: Vec<String>,
    pub modifier: CriterionModifier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolutionEnum {
    Low,
    Standard,
    StandardHd,
    FullHd,
    FourK,
}

impl ResolutionEnum {
    pub fn from_option(option: &str) -> Option<Self> {
        match option {
            "240p" => Some(ResolutionEnum::Low),
            "480p" => Some(ResolutionEnum::Standard),
            "720p" => Some(ResolutionEnum::StandardHd),
            "1080p" => Some(ResolutionEnum::FullHd),
            "4k" => Some(ResolutionEnum::FourK),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<IntCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<ResolutionEnum>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_markers: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_missing: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<MultiCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performers: Option<MultiCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studios: Option<MultiCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movies: Option<MultiCriterionInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_favorites: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_year: Option<IntCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<IntCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethnicity: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurements: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fake_tits: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_length: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tattoos: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub piercings: Option<StringCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aliases: Option<StringCriterionInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SceneMarkerFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<MultiCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_tags: Option<MultiCriterionInput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performers: Option<MultiCriterionInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MovieFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub studios: Option<MultiCriterionInput>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StudioFilter {}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GalleryFilter {}

/// 领域对应的后端筛选对象
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ObjectFilter {
    Scenes(SceneFilter),
    Performers(PerformerFilter),
    Studios(StudioFilter),
    Movies(MovieFilter),
    Galleries(GalleryFilter),
    SceneMarkers(SceneMarkerFilter),
}

impl ObjectFilter {
    pub fn empty(domain: ListDomain) -> Self {
        match domain {
            ListDomain::Scenes => ObjectFilter::Scenes(SceneFilter::default()),
            ListDomain::Performers => ObjectFilter::Performers(PerformerFilter::default()),
            ListDomain::Studios => ObjectFilter::Studios(StudioFilter::default()),
            ListDomain::Movies => ObjectFilter::Movies(MovieFilter::default()),
            ListDomain::Galleries => ObjectFilter::Galleries(GalleryFilter::default()),
            ListDomain::SceneMarkers => ObjectFilter::SceneMarkers(SceneMarkerFilter::default()),
        }
    }

    pub fn domain(&self) -> ListDomain {
        match self {
            ObjectFilter::Scenes(_) => ListDomain::Scenes,
            ObjectFilter::Performers(_) => ListDomain::Performers,
            ObjectFilter::Studios(_) => ListDomain::Studios,
            ObjectFilter::Movies(_) => ListDomain::Movies,
            ObjectFilter::Galleries(_) => ListDomain::Galleries,
            ObjectFilter::SceneMarkers(_) => ListDomain::SceneMarkers,
        }
    }

    /// 把单个条件写入对应字段；领域没有该字段时忽略
    ///
    /// 每种条件类型只有一条翻译规则，新增类型只需在这里加一个分支。
    pub fn apply(&mut self, criterion: &Criterion) {
        use CriterionType as T;

        match (self, criterion.criterion_type()) {
            (ObjectFilter::Scenes(f), T::Rating) => f.rating = Some(int_input(criterion)),
            (ObjectFilter::Scenes(f), T::Resolution) => {
                f.resolution = criterion.text().and_then(ResolutionEnum::from_option)
            }
            (ObjectFilter::Scenes(f), T::HasMarkers) => f.has_markers = text_value(criterion),
            (ObjectFilter::Scenes(f), T::IsMissing) => f.is_missing = text_value(criterion),
            (ObjectFilter::Scenes(f), T::Tags) => f.tags = Some(multi_input(criterion)),
            (ObjectFilter::Scenes(f), T::Performers) => f.performers = Some(multi_input(criterion)),
            (ObjectFilter::Scenes(f), T::Studios) => f.studios = Some(multi_input(criterion)),
            (ObjectFilter::Scenes(f), T::Movies) => f.movies = Some(multi_input(criterion)),

            (ObjectFilter::Performers(f), T::Favorite) => {
                f.filter_favorites = criterion.text().map(|v| v == "true")
            }
            (ObjectFilter::Performers(f), T::BirthYear) => f.birth_year = Some(int_input(criterion)),
            (ObjectFilter::Performers(f), T::Age) => f.age = Some(int_input(criterion)),
            (ObjectFilter::Performers(f), T::Ethnicity) => f.ethnicity = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::Country) => f.country = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::EyeColor) => f.eye_color = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::Height) => f.height = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::Measurements) => {
                f.measurements = Some(string_input(criterion))
            }
            (ObjectFilter::Performers(f), T::FakeTits) => f.fake_tits = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::CareerLength) => {
                f.career_length = Some(string_input(criterion))
            }
            (ObjectFilter::Performers(f), T::Tattoos) => f.tattoos = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::Piercings) => f.piercings = Some(string_input(criterion)),
            (ObjectFilter::Performers(f), T::Aliases) => f.aliases = Some(string_input(criterion)),

            (ObjectFilter::SceneMarkers(f), T::Tags) => f.tags = Some(multi_input(criterion)),
            (ObjectFilter::SceneMarkers(f), T::SceneTags) => f.scene_tags = Some(multi_input(criterion)),
            (ObjectFilter::SceneMarkers(f), T::Performers) => {
                f.performers = Some(multi_input(criterion))
            }

            (ObjectFilter::Movies(f), T::Studios) => f.studios = Some(multi_input(criterion)),

            _ => {}
        }
    }
}

fn int_input(criterion: &Criterion) -> IntCriterionInput {
    IntCriterionInput {
        value: criterion.number().unwrap_or(0),
        modifier: criterion.modifier(),
    }
}

fn string_input(criterion: &Criterion) -> StringCriterionInput {
    StringCriterionInput {
        value: criterion.text().unwrap_or_default().to_string(),
        modifier: criterion.modifier(),
    }
}

fn multi_input(criterion: &Criterion) -> MultiCriterionInput {
    MultiCriterionInput {
        value: criterion.ids(),
        modifier: criterion.modifier(),
    }
}

fn text_value(criterion: &Criterion) -> Option<String> {
    criterion.text().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::criterion::{CriterionValue, LabeledId};
    use crate::models::registry::make_criterion;
    use serde_json::json;

    #[test]
    fn test_reference_criterion_translation() {
        let studios = make_criterion("studios")
            .with_modifier(CriterionModifier::Excludes)
            .unwrap()
            .with_value(CriterionValue::Labeled(vec![
                LabeledId::new("4", "Acme"),
                LabeledId::new("9", "Globex"),
            ]))
            .unwrap();

        let mut filter = ObjectFilter::empty(ListDomain::Scenes);
        filter.apply(&studios);

        assert_eq!(
            serde_json::to_value(&filter).unwrap(),
            json!({ "studios": { "value": ["4", "9"], "modifier": "EXCLUDES" } })
        );
    }

    #[test]
    fn test_resolution_and_favorite_translation() {
        let resolution = make_criterion("resolution")
            .with_value(CriterionValue::Text("1080p".to_string()))
            .unwrap();
        let mut scenes = ObjectFilter::empty(ListDomain::Scenes);
        scenes.apply(&resolution);
        assert_eq!(serde_json::to_value(&scenes).unwrap(), json!({ "resolution": "FULL_HD" }));

        let favorite = make_criterion("favorite")
            .with_value(CriterionValue::Text("false".to_string()))
            .unwrap();
        let mut performers = ObjectFilter::empty(ListDomain::Performers);
        performers.apply(&favorite);
        assert_eq!(
            serde_json::to_value(&performers).unwrap(),
            json!({ "filter_favorites": false })
        );
    }

    #[test]
    fn test_scene_tags_only_apply_to_markers() {
        let scene_tags = make_criterion("sceneTags")
            .with_value(CriterionValue::Labeled(vec![LabeledId::new("3", "Indoor")]))
            .unwrap();

        let mut scenes = ObjectFilter::empty(ListDomain::Scenes);
        scenes.apply(&scene_tags);
        assert_eq!(scenes, ObjectFilter::empty(ListDomain::Scenes));

        let mut markers = ObjectFilter::empty(ListDomain::SceneMarkers);
        markers.apply(&scene_tags);
        assert_eq!(
            serde_json::to_value(&markers).unwrap(),
            json!({ "scene_tags": { "value": ["3"], "modifier": "INCLUDES" } })
        );
    }

    #[test]
    fn test_find_filter_serialization() {
        let find = FindFilter {
            q: None,
            page: 2,
            per_page: 40,
            sort: "date".to_string(),
            direction: SortDirection::Desc.into(),
        };
        assert_eq!(
            serde_json::to_value(&find).unwrap(),
            json!({ "page": 2, "per_page": 40, "sort": "date", "direction": "DESC" })
        );
    }
}
