pub mod criterion;
pub mod domain;
pub mod filter;
pub mod query;
pub mod registry;

pub use criterion::{
    Criterion, CriterionError, CriterionModifier, CriterionType, CriterionValue, LabeledId, ValueKind,
};
pub use domain::{DisplayMode, ListDomain, SortDirection};
pub use filter::{ListFilter, PreferenceSnapshot, DEFAULT_ITEMS_PER_PAGE, PAGE_SIZE_OPTIONS};
pub use query::{
    FindFilter, GalleryFilter, IntCriterionInput, MovieFilter, MultiCriterionInput, ObjectFilter,
    PerformerFilter, ResolutionEnum, SceneFilter, SceneMarkerFilter, SortDirectionEnum,
    StringCriterionInput, StudioFilter,
};
pub use registry::{criterion_options, is_legal, legal_criterion_types, make_criterion, CriterionOption};
