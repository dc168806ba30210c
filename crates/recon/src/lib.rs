//! `formulary-recon`: Teamsters vs Wellcentra formulary reconciliation.
//!
//! Pure engine crate: receives pre-loaded records, returns grouped savings
//! and a summary. No CLI or IO dependencies.

pub mod aggregate;
pub mod analytics;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod model;
pub mod money;
pub mod savings;
pub mod summary;
pub mod view;

pub use config::{PriceFormat, ReconConfig};
pub use engine::{reconcile, reconcile_with};
pub use error::ReconError;
pub use model::{
    DrugGroup, RawRecord, ReconResult, ReconSummary, SavingsRecord, Source, TaggedRecord,
    TeamstersRecord, WellcentraRecord,
};
pub use view::{Page, SortDirection, SortKey, Tab, ViewQuery};
