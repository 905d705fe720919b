// 条件注册表
//
// 按类型标识创建条件，并列出每个列表领域可用的条件类型

use serde::Serialize;

use super::criterion::{Criterion, CriterionType};
use super::domain::ListDomain;

/// 筛选器下拉框中的一项
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CriterionOption {
    pub criterion_type: CriterionType,
    pub label: &'static str,
}

const SCENE_CRITERIA: &[CriterionType] = &[
    CriterionType::Rating,
    CriterionType::Resolution,
    CriterionType::HasMarkers,
    CriterionType::IsMissing,
    CriterionType::Tags,
    CriterionType::Performers,
    CriterionType::Studios,
    CriterionType::Movies,
];

const PERFORMER_CRITERIA: &[CriterionType] = &[
    CriterionType::Favorite,
    CriterionType::BirthYear,
    CriterionType::Age,
    CriterionType::Ethnicity,
    CriterionType::Country,
    CriterionType::EyeColor,
    CriterionType::Height,
    CriterionType::Measurements,
    CriterionType::FakeTits,
    CriterionType::CareerLength,
    CriterionType::Tattoos,
    CriterionType::Piercings,
    CriterionType::Aliases,
];

const MOVIE_CRITERIA: &[CriterionType] = &[CriterionType::Studios];

const SCENE_MARKER_CRITERIA: &[CriterionType] = &[
    CriterionType::Tags,
    CriterionType::SceneTags,
    CriterionType::Performers,
];

/// 按类型标识创建条件
///
/// 未知标识返回 `none` 条件，界面总能拿到一个可渲染但不生效的条件。
pub fn make_criterion(type_id: &str) -> Criterion {
    match CriterionType::from_str(type_id) {
        Some(criterion_type) => Criterion::new(criterion_type),
        None => {
            tracing::debug!("Unknown criterion type {:?}, using none", type_id);
            Criterion::new(CriterionType::None)
        }
    }
}

/// 领域可用的条件类型（不含 `none`）
pub fn legal_criterion_types(domain: ListDomain) -> &'static [CriterionType] {
    match domain {
        ListDomain::Scenes => SCENE_CRITERIA,
        ListDomain::Performers => PERFORMER_CRITERIA,
        ListDomain::Movies => MOVIE_CRITERIA,
        ListDomain::SceneMarkers => SCENE_MARKER_CRITERIA,
        ListDomain::Studios | ListDomain::Galleries => &[],
    }
}

pub fn is_legal(domain: ListDomain, criterion_type: CriterionType) -> bool {
    legal_criterion_types(domain).contains(&criterion_type)
}

/// 筛选器选项列表，以 `none` 开头
pub fn criterion_options(domain: ListDomain) -> Vec<CriterionOption> {
    std::iter::once(CriterionType::None)
        .chain(legal_criterion_types(domain).iter().copied())
        .map(|criterion_type| CriterionOption {
            criterion_type,
            label: criterion_type.label(),
        })
        .collect()
}
