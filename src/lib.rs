/// FolioView - Collection Views for Admin Dashboards
///
/// Filtering, sorting and pagination over in-memory record sets, the way
/// an admin list page needs them: every keystroke or click recomputes a
/// view from the full fetched collection. Around that engine sit the
/// caller-owned list state, status summaries, CSV export, the dashboard's
/// typed records and the API collaborator interfaces.

pub mod value;
pub mod record;
pub mod filter;
pub mod sort;
pub mod page;
pub mod view;
pub mod summary;
pub mod state;
pub mod export;
pub mod domain;
pub mod source;
pub mod config;
pub mod error;

pub use value::{FieldValue, parse_instant, format_instant};
pub use record::{Fields, Record};
pub use filter::{FilterSpec, Presence, Target, Predicate, ALL};
pub use sort::{SortKind, SortOrder, SortSpec, CREATED_AT};
pub use page::{PageInfo, PageSpec};
pub use view::{derive, filter_records, view, ViewQuery, ViewResult, DEFAULT_PAGE_SIZE};
pub use summary::{distinct_values, status_counts, StatusCounts};
pub use state::ListState;
pub use export::{export_file_name, CellFormat, CsvExport, ExportColumn};
pub use domain::{CareerApplication, ContactQuery, ListPreset, Project, ProjectSort, Subscriber};
pub use source::{
    decode_collection, decode_record, merge_json, ApiRequest, Collection, MemorySource, Method, RecordMutator,
    RecordSource, Session,
};
pub use config::AdminConfig;
pub use error::{ConfigError, SourceError, ViewError};
