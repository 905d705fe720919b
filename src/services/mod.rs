pub mod debounce;
pub mod error;
pub mod history;
pub mod list_controller;
pub mod pagination;
pub mod preferences;
pub mod selection;

pub use debounce::{PendingSearch, SearchDebouncer, DEFAULT_SEARCH_DELAY};
pub use error::{FetchError, ListError, PreferenceError};
pub use history::{HistoryLocation, MemoryLocation};
pub use list_controller::{
    FetchOutcome, ListController, ListOptions, ListPhase, ListView, PendingFetch, QuerySignature,
    MAX_ZOOM_INDEX,
};
pub use pagination::{pages_to_display, PaginationWindow};
pub use preferences::{JsonFilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
pub use selection::SelectionManager;
