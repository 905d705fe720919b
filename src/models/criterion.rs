use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// 筛选条件解析/校验错误
#[derive(Debug, Error)]
pub enum CriterionError {
    #[error("Invalid criterion JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown criterion type: {0}")]
    UnknownType(String),

    #[error("Modifier {modifier} is not allowed for criterion {criterion}")]
    IllegalModifier {
        criterion: &'static str,
        modifier: &'static str,
    },

    #[error("Criterion {criterion} expects a {expected} value")]
    WrongValueKind {
        criterion: &'static str,
        expected: &'static str,
    },

    #[error("Value {value} is not an option of criterion {criterion}")]
    UnknownOption {
        criterion: &'static str,
        value: String,
    },

    #[error("Criterion {criterion} is not available for the {domain} list")]
    IllegalForDomain {
        criterion: &'static str,
        domain: &'static str,
    },
}

/// 条件类型（封闭集合）
///
/// 序列化名称与查询字符串中 `c` 参数的 `type` 字段一致
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CriterionType {
    #[serde(rename = "none")]
    None,
    #[serde(rename = "rating")]
    Rating,
    #[serde(rename = "resolution")]
    Resolution,
    #[serde(rename = "hasMarkers")]
    HasMarkers,
    #[serde(rename = "isMissing")]
    IsMissing,
    #[serde(rename = "tags")]
    Tags,
    #[serde(rename = "sceneTags")]
    SceneTags,
    #[serde(rename = "performers")]
    Performers,
    #[serde(rename = "studios")]
    Studios,
    #[serde(rename = "movies")]
    Movies,
    #[serde(rename = "favorite")]
    Favorite,
    #[serde(rename = "birth_year")]
    BirthYear,
    #[serde(rename = "age")]
    Age,
    #[serde(rename = "ethnicity")]
    Ethnicity,
    #[serde(rename = "country")]
    Country,
    #[serde(rename = "eye_color")]
    EyeColor,
    #[serde(rename = "height")]
    Height,
    #[serde(rename = "measurements")]
    Measurements,
    #[serde(rename = "fake_tits")]
    FakeTits,
    #[serde(rename = "career_length")]
    CareerLength,
    #[serde(rename = "tattoos")]
    Tattoos,
    #[serde(rename = "piercings")]
    Piercings,
    #[serde(rename = "aliases")]
    Aliases,
}

/// 比较修饰符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CriterionModifier {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    Includes,
    Excludes,
    IsNull,
    NotNull,
}

/// 条件值的形态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Text,
    Labeled,
}

/// 引用型条件的值项（标签、演员、厂商、影片）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LabeledId {
    pub id: String,
    pub label: String,
}

impl LabeledId {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// 条件值：标量或有序的 `{id, label}` 列表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CriterionValue {
    Number(i64),
    Text(String),
    Labeled(Vec<LabeledId>),
}

const NUMERIC_MODIFIERS: &[CriterionModifier] = &[
    CriterionModifier::Equals,
    CriterionModifier::NotEquals,
    CriterionModifier::GreaterThan,
    CriterionModifier::LessThan,
    CriterionModifier::IsNull,
    CriterionModifier::NotNull,
];
const STRING_MODIFIERS: &[CriterionModifier] = &[
    CriterionModifier::Equals,
    CriterionModifier::NotEquals,
    CriterionModifier::IsNull,
    CriterionModifier::NotNull,
];
const REFERENCE_MODIFIERS: &[CriterionModifier] =
    &[CriterionModifier::Includes, CriterionModifier::Excludes];
const EQUALS_ONLY: &[CriterionModifier] = &[CriterionModifier::Equals];

const RATING_OPTIONS: &[&str] = &["1", "2", "3", "4", "5"];
const RESOLUTION_OPTIONS: &[&str] = &["240p", "480p", "720p", "1080p", "4k"];
const BOOLEAN_OPTIONS: &[&str] = &["true", "false"];
const IS_MISSING_OPTIONS: &[&str] = &["title", "url", "date", "gallery", "studio", "performers"];

impl CriterionType {
    pub const ALL: [CriterionType; 23] = [
        CriterionType::None,
        CriterionType::Rating,
        CriterionType::Resolution,
        CriterionType::HasMarkers,
        CriterionType::IsMissing,
        CriterionType::Tags,
        CriterionType::SceneTags,
        CriterionType::Performers,
        CriterionType::Studios,
        CriterionType::Movies,
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

    /// 查询字符串中使用的类型标识
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionType::None => "none",
            CriterionType::Rating => "rating",
            CriterionType::Resolution => "resolution",
            CriterionType::HasMarkers => "hasMarkers",
            CriterionType::IsMissing => "isMissing",
            CriterionType::Tags => "tags",
            CriterionType::SceneTags => "sceneTags",
            CriterionType::Performers => "performers",
            CriterionType::Studios => "studios",
            CriterionType::Movies => "movies",
            CriterionType::Favorite => "favorite",
            CriterionType::BirthYear => "birth_year",
            CriterionType::Age => "age",
            CriterionType::Ethnicity => "ethnicity",
            CriterionType::Country => "country",
            CriterionType::EyeColor => "eye_color",
            CriterionType::Height => "height",
            CriterionType::Measurements => "measurements",
            CriterionType::FakeTits => "fake_tits",
            CriterionType::CareerLength => "career_length",
            CriterionType::Tattoos => "tattoos",
            CriterionType::Piercings => "piercings",
            CriterionType::Aliases => "aliases",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|ty| ty.as_str() == s)
    }

    /// 构建后端查询对象时使用的字段名
    pub fn parameter_name(&self) -> &'static str {
        match self {
            CriterionType::HasMarkers => "has_markers",
            CriterionType::IsMissing => "is_missing",
            CriterionType::SceneTags => "scene_tags",
            CriterionType::Favorite => "filter_favorites",
            other => other.as_str(),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CriterionType::None => "None",
            CriterionType::Rating => "Rating",
            CriterionType::Resolution => "Resolution",
            CriterionType::HasMarkers => "Has Markers",
            CriterionType::IsMissing => "Is Missing",
            CriterionType::Tags => "Tags",
            CriterionType::SceneTags => "Scene Tags",
            CriterionType::Performers => "Performers",
            CriterionType::Studios => "Studios",
            CriterionType::Movies => "Movies",
            CriterionType::Favorite => "Favorite",
            CriterionType::BirthYear => "Birth Year",
            CriterionType::Age => "Age",
            CriterionType::Ethnicity => "Ethnicity",
            CriterionType::Country => "Country",
            CriterionType::EyeColor => "Eye Color",
            CriterionType::Height => "Height",
            CriterionType::Measurements => "Measurements",
            CriterionType::FakeTits => "Fake Tits",
            CriterionType::CareerLength => "Career Length",
            CriterionType::Tattoos => "Tattoos",
            CriterionType::Piercings => "Piercings",
            CriterionType::Aliases => "Aliases",
        }
    }

    pub fn value_kind(&self) -> ValueKind {
        match self {
            CriterionType::Rating | CriterionType::BirthYear | CriterionType::Age => ValueKind::Number,
            CriterionType::Tags
            | CriterionType::SceneTags
            | CriterionType::Performers
            | CriterionType::Studios
            | CriterionType::Movies => ValueKind::Labeled,
            _ => ValueKind::Text,
        }
    }

    /// 该类型允许的修饰符
    pub fn modifier_options(&self) -> &'static [CriterionModifier] {
        match self {
            CriterionType::Rating | CriterionType::BirthYear | CriterionType::Age => NUMERIC_MODIFIERS,
            CriterionType::None
            | CriterionType::Resolution
            | CriterionType::HasMarkers
            | CriterionType::IsMissing
            | CriterionType::Favorite => EQUALS_ONLY,
            CriterionType::Tags
            | CriterionType::SceneTags
            | CriterionType::Performers
            | CriterionType::Studios
            | CriterionType::Movies => REFERENCE_MODIFIERS,
            _ => STRING_MODIFIERS,
        }
    }

    pub fn default_modifier(&self) -> CriterionModifier {
        self.modifier_options()[0]
    }

    /// 封闭取值集合；自由取值的类型返回空切片
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            CriterionType::Rating => RATING_OPTIONS,
            CriterionType::Resolution => RESOLUTION_OPTIONS,
            CriterionType::HasMarkers | CriterionType::Favorite => BOOLEAN_OPTIONS,
            CriterionType::IsMissing => IS_MISSING_OPTIONS,
            _ => &[],
        }
    }
}

impl fmt::Display for CriterionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CriterionModifier {
    pub fn as_str(&self) -> &'static str {
        match self {
            CriterionModifier::Equals => "EQUALS",
            CriterionModifier::NotEquals => "NOT_EQUALS",
            CriterionModifier::GreaterThan => "GREATER_THAN",
            CriterionModifier::LessThan => "LESS_THAN",
            CriterionModifier::Includes => "INCLUDES",
            CriterionModifier::Excludes => "EXCLUDES",
            CriterionModifier::IsNull => "IS_NULL",
            CriterionModifier::NotNull => "NOT_NULL",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CriterionModifier::Equals => "is",
            CriterionModifier::NotEquals => "is not",
            CriterionModifier::GreaterThan => "is greater than",
            CriterionModifier::LessThan => "is less than",
            CriterionModifier::Includes => "includes",
            CriterionModifier::Excludes => "excludes",
            CriterionModifier::IsNull => "is null",
            CriterionModifier::NotNull => "is not null",
        }
    }

    /// IS_NULL / NOT_NULL 不携带值
    pub fn is_null_check(&self) -> bool {
        matches!(self, CriterionModifier::IsNull | CriterionModifier::NotNull)
    }
}

impl ValueKind {
    fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Number => "number",
            ValueKind::Text => "text",
            ValueKind::Labeled => "labeled list",
        }
    }
}

impl CriterionValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            CriterionValue::Number(_) => ValueKind::Number,
            CriterionValue::Text(_) => ValueKind::Text,
            CriterionValue::Labeled(_) => ValueKind::Labeled,
        }
    }

    /// 界面上展示的值文本
    pub fn label(&self) -> String {
        match self {
            CriterionValue::Number(n) => n.to_string(),
            CriterionValue::Text(s) => s.clone(),
            CriterionValue::Labeled(items) => items
                .iter()
                .map(|item| item.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            CriterionValue::Number(_) => false,
            CriterionValue::Text(s) => s.is_empty(),
            CriterionValue::Labeled(items) => items.is_empty(),
        }
    }
}

/// 单个筛选条件
///
/// 通过 [`crate::models::registry::make_criterion`] 创建；JSON 形式为
/// `{type, value, modifier}`，反序列化时会校验值形态、修饰符和可选值。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "EncodedCriterion", try_from = "EncodedCriterion")]
pub struct Criterion {
    criterion_type: CriterionType,
    modifier: CriterionModifier,
    value: Option<CriterionValue>,
}

/// 条件的线上编码
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EncodedCriterion {
    #[serde(rename = "type")]
    criterion_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<CriterionValue>,
    modifier: CriterionModifier,
}

impl Criterion {
    pub(crate) fn new(criterion_type: CriterionType) -> Self {
        Self {
            criterion_type,
            modifier: criterion_type.default_modifier(),
            value: None,
        }
    }

    pub fn criterion_type(&self) -> CriterionType {
        self.criterion_type
    }

    pub fn parameter_name(&self) -> &'static str {
        self.criterion_type.parameter_name()
    }

    pub fn modifier(&self) -> CriterionModifier {
        self.modifier
    }

    pub fn value(&self) -> Option<&CriterionValue> {
        self.value.as_ref()
    }

    pub fn options(&self) -> &'static [&'static str] {
        self.criterion_type.options()
    }

    pub fn is_none(&self) -> bool {
        self.criterion_type == CriterionType::None
    }

    pub fn set_modifier(&mut self, modifier: CriterionModifier) -> Result<(), CriterionError> {
        if !self.criterion_type.modifier_options().contains(&modifier) {
            return Err(CriterionError::IllegalModifier {
                criterion: self.criterion_type.as_str(),
                modifier: modifier.as_str(),
            });
        }
        self.modifier = modifier;
        Ok(())
    }

    pub fn set_value(&mut self, value: CriterionValue) -> Result<(), CriterionError> {
        self.check_value(&value)?;
        self.value = Some(value);
        Ok(())
    }

    pub fn with_modifier(mut self, modifier: CriterionModifier) -> Result<Self, CriterionError> {
        self.set_modifier(modifier)?;
        Ok(self)
    }

    pub fn with_value(mut self, value: CriterionValue) -> Result<Self, CriterionError> {
        self.set_value(value)?;
        Ok(self)
    }

    fn check_value(&self, value: &CriterionValue) -> Result<(), CriterionError> {
        let expected = self.criterion_type.value_kind();
        if value.kind() != expected {
            return Err(CriterionError::WrongValueKind {
                criterion: self.criterion_type.as_str(),
                expected: expected.as_str(),
            });
        }

        let options = self.criterion_type.options();
        if !options.is_empty() {
            let text = value.label();
            if !options.contains(&text.as_str()) {
                return Err(CriterionError::UnknownOption {
                    criterion: self.criterion_type.as_str(),
                    value: text,
                });
            }
        }
        Ok(())
    }

    /// 去重与原位编辑使用的标识：`parameterName:MODIFIER`
    pub fn id(&self) -> String {
        format!("{}:{}", self.parameter_name(), self.modifier.as_str())
    }

    /// 例如 `Rating is greater than 3`
    pub fn label(&self) -> String {
        let type_label = self.criterion_type.label();
        let modifier_label = self.modifier.label();
        match (&self.value, self.modifier.is_null_check()) {
            (Some(value), false) => format!("{} {} {}", type_label, modifier_label, value.label()),
            _ => format!("{} {}", type_label, modifier_label),
        }
    }

    /// 是否可参与后端查询
    pub fn is_valid(&self) -> bool {
        if self.is_none() {
            return false;
        }
        if self.modifier.is_null_check() {
            return true;
        }
        self.value.as_ref().map(|v| !v.is_empty()).unwrap_or(false)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(&EncodedCriterion::from(self.clone())).unwrap_or_default()
    }

    pub fn from_json(json: &str) -> Result<Self, CriterionError> {
        let encoded: EncodedCriterion = serde_json::from_str(json)?;
        Criterion::try_from(encoded)
    }

    pub(crate) fn number(&self) -> Option<i64> {
        match self.value {
            Some(CriterionValue::Number(n)) => Some(n),
            _ => None,
        }
    }

    pub(crate) fn text(&self) -> Option<&str> {
        match self.value {
            Some(CriterionValue::Text(ref s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub(crate) fn ids(&self) -> Vec<String> {
        match self.value {
            Some(CriterionValue::Labeled(ref items)) => items.iter().map(|i| i.id.clone()).collect(),
            _ => Vec::new(),
        }
    }
}

impl From<Criterion> for EncodedCriterion {
    fn from(criterion: Criterion) -> Self {
        let value = if criterion.modifier.is_null_check() {
            None
        } else {
            criterion.value
        };
        Self {
            criterion_type: criterion.criterion_type.as_str().to_string(),
            value,
            modifier: criterion.modifier,
        }
    }
}

impl TryFrom<EncodedCriterion> for Criterion {
    type Error = CriterionError;

    fn try_from(encoded: EncodedCriterion) -> Result<Self, Self::Error> {
        let criterion_type = CriterionType::from_str(&encoded.criterion_type)
            .ok_or_else(|| CriterionError::UnknownType(encoded.criterion_type.clone()))?;

        let mut criterion = Criterion::new(criterion_type).with_modifier(encoded.modifier)?;
        if let Some(value) = encoded.value {
            if !criterion.modifier.is_null_check() {
                criterion.set_value(value)?;
            }
        }
        Ok(criterion)
    }
}
