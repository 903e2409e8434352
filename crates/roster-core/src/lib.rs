//! roster-core: Core library for reconciling army-list CSV exports
//!
//! This library provides functionality to:
//! - Tokenize list-valued CSV cells without splitting parenthesized parameters
//! - Normalize CSV rows into canonical unit records
//! - Canonicalize faction name variants
//! - Diff CSV-derived units against the current unit data
//! - Emit deterministic generated source files per faction and category
//! - Scan for exports, run batch syncs, and keep a run history

pub mod differ;
pub mod emitter;
pub mod error;
pub mod faction;
pub mod history;
pub mod normalizer;
pub mod parser;
pub mod pipeline;
pub mod scanner;
pub mod sync;
pub mod table;
pub mod tokenizer;
pub mod unit;
pub mod vocabulary;

pub use differ::{
    diff, Differ, FieldMismatch, FieldValue, ListField, ReportCounts, RuleDrift, RuleMatching,
    TrackedField, ValidationReport,
};
pub use emitter::{
    emit, emit_category, emit_faction, parse_emitted_source, select_faction, EmittedFile,
};
pub use error::{Error, Result};
pub use faction::{canonicalize_faction, FactionTable};
pub use history::{create_history_entry, HistoryEntry, HistoryFile};
pub use normalizer::{slugify, RowNormalizer, UnitField};
pub use parser::{read_csv, read_csv_str};
pub use pipeline::{parse_csv, CsvPipeline};
pub use scanner::{scan_directory, CsvSource, ScanResult};
pub use sync::{run_sync, EntryOutcome, SyncEntry, SyncManifest, SyncResult};
pub use table::{Column, RawRow, RawTable, RowRecord};
pub use tokenizer::parse_field;
pub use unit::{load_current_units, parse_current_units, CanonicalUnit, UnitType};
pub use vocabulary::Vocabulary;
