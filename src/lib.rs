pub mod cache;
pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod normalize;
pub mod schema;
pub mod stats;
pub mod summary;
pub mod table;

#[cfg(feature = "python")]
mod python;

pub use config::{DashboardConfig, SourceConfig};
pub use error::{MonitorError, NotApplicable};
pub use loader::{DataLoader, LoadOutcome, SampleSource, TableOrigin};
pub use normalize::normalize_columns;
pub use table::{export_csv, parse_csv};
