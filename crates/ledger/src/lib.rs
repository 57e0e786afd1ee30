// ABOUTME: Storage for harvested records: CSV site and daily tables plus the on-disk media vault.
// ABOUTME: Implements the harvester's RecordStore and AssetStore traits over a data directory.

//! sitetrawl-ledger - file-backed persistence for sitetrawl.
//!
//! ```no_run
//! use sitetrawl_ledger::{CsvLedger, DataLayout, MediaVault};
//!
//! let layout = DataLayout::new("data");
//! let ledger = CsvLedger::new(layout.clone());
//! let vault = MediaVault::new(layout);
//! # let _ = (ledger, vault);
//! ```

pub mod csv_ledger;
pub mod error;
pub mod paths;
pub mod vault;

pub use crate::csv_ledger::{append_records, load_index, read_records, CsvLedger};
pub use crate::error::LedgerError;
pub use crate::paths::DataLayout;
pub use crate::vault::MediaVault;
