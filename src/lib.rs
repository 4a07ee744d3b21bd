//! lvl zone import
//!
//! Imports the records of a DNS zone file into a domain of the control panel. The zone file is
//! parsed with [`zone::ZoneParser`], the parsed entries are reconciled with the records the domain
//! already has into an [`import::ImportPlan`], and the plan is applied through a
//! [`record_store::RecordStore`].
//!
//! Existing records are replaced by type and name: importing a `www A` record deletes every `A`
//! record named `www` before the new one is created.
//!
//! ```text
//! ❯ lvl domain zoneimport example.com example.com.zone --records records.json
//! 2 existing records to delete (for replacement)
//! 14 records to create
//! Confirm importing records? [y/N]
//! ```
//!
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod import;
pub mod record_store;
pub mod zone;

pub use config::{Config, SharedConfig};
pub use import::{apply_plan, plan_import, ImportPlan};
pub use record_store::{FileRecordStore, InMemoryRecordStore};
pub use zone::ZoneParser;
