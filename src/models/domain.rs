use serde::{Deserialize, Serialize};
use std::fmt;

/// 列表领域（每种实体列表各一个）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListDomain {
    Scenes,
    Performers,
    Studios,
    Movies,
    Galleries,
    SceneMarkers,
}

/// 展示模式，查询字符串中以序号 `disp` 表示
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    Grid,
    List,
    Wall,
}

/// 排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// 所有领域共享的排序字段
const COMMON_SORT_OPTIONS: [&str; 2] = ["created_at", "updated_at"];

impl ListDomain {
    pub const ALL: [ListDomain; 6] = [
        ListDomain::Scenes,
        ListDomain::Performers,
        ListDomain::Studios,
        ListDomain::Movies,
        ListDomain::Galleries,
        ListDomain::SceneMarkers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ListDomain::Scenes => "scenes",
            ListDomain::Performers => "performers",
            ListDomain::Studios => "studios",
            ListDomain::Movies => "movies",
            ListDomain::Galleries => "galleries",
            ListDomain::SceneMarkers => "scene_markers",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|domain| domain.as_str() == s)
    }

    /// 默认排序字段
    pub fn default_sort_by(&self) -> &'static str {
        match self {
            ListDomain::Scenes => "date",
            ListDomain::Performers | ListDomain::Studios | ListDomain::Movies => "name",
            ListDomain::Galleries => "path",
            ListDomain::SceneMarkers => "title",
        }
    }

    /// 领域自身的排序字段，不含 `created_at` / `updated_at`
    fn own_sort_options(&self) -> &'static [&'static str] {
        match self {
            ListDomain::Scenes => &[
                "title", "path", "rating", "date", "filesize", "duration", "framerate", "bitrate",
                "random",
            ],
            ListDomain::Performers => &["name", "height", "birthdate", "scenes_count"],
            ListDomain::Studios => &["name", "scenes_count"],
            ListDomain::Movies => &["name", "scenes_count"],
            ListDomain::Galleries => &["path"],
            ListDomain::SceneMarkers => &["title", "seconds", "scene_id", "random", "scenes_updated_at"],
        }
    }

    /// 可选排序字段（按界面展示顺序）
    pub fn sort_options(&self) -> Vec<&'static str> {
        self.own_sort_options()
            .iter()
            .chain(COMMON_SORT_OPTIONS.iter())
            .copied()
            .collect()
    }

    pub fn is_sort_option(&self, sort_by: &str) -> bool {
        self.own_sort_options().contains(&sort_by) || COMMON_SORT_OPTIONS.contains(&sort_by)
    }

    /// 可用展示模式，第一个为默认值
    pub fn display_modes(&self) -> &'static [DisplayMode] {
        match self {
            ListDomain::Scenes => &[DisplayMode::Grid, DisplayMode::List, DisplayMode::Wall],
            ListDomain::Performers => &[DisplayMode::Grid, DisplayMode::List],
            ListDomain::Studios | ListDomain::Movies => &[DisplayMode::Grid],
            ListDomain::Galleries => &[DisplayMode::List],
            ListDomain::SceneMarkers => &[DisplayMode::Wall],
        }
    }

    pub fn default_display_mode(&self) -> DisplayMode {
        self.display_modes()[0]
    }

    pub fn supports_display_mode(&self, mode: DisplayMode) -> bool {
        self.display_modes().contains(&mode)
    }
}

impl fmt::Display for ListDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DisplayMode {
    pub fn ordinal(&self) -> u32 {
        match self {
            DisplayMode::Grid => 0,
            DisplayMode::List => 1,
            DisplayMode::Wall => 2,
        }
    }

    pub fn from_ordinal(ordinal: u32) -> Option<Self> {
        match ordinal {
            0 => Some(DisplayMode::Grid),
            1 => Some(DisplayMode::List),
            2 => Some(DisplayMode::Wall),
            _ => None,
        }
    }
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}
