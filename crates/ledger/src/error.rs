// ABOUTME: Error type for table and media vault I/O.
// ABOUTME: Converts into the harvester's Persist or Asset error categories at the trait boundary.

use std::io;
use std::path::PathBuf;

use sitetrawl_harvest::HarvestError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("csv error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("image could not be re-encoded: {0}")]
    Image(#[from] image::ImageError),
    #[error("background write task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LedgerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        LedgerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        LedgerError::Csv {
            path: path.into(),
            source,
        }
    }

    fn path(&self) -> String {
        match self {
            LedgerError::Io { path, .. } | LedgerError::Csv { path, .. } => {
                path.display().to_string()
            }
            _ => String::new(),
        }
    }

    /// True for a table that was read but could not be parsed.
    fn is_unreadable(&self) -> bool {
        matches!(self, LedgerError::Csv { source, .. } if !source.is_io_error())
    }

    /// Table I/O failures are persistence errors (retried); tables that do not
    /// parse are corrupt and undecodable images are asset errors (neither retried).
    pub fn into_harvest(self, op: &str) -> HarvestError {
        let path = self.path();
        if self.is_unreadable() {
            return HarvestError::corrupt(path, op, Some(anyhow::Error::new(self)));
        }
        match self {
            LedgerError::Image(_) => HarvestError::asset(path, op, Some(anyhow::Error::new(self))),
            _ => HarvestError::persist(path, op, Some(anyhow::Error::new(self))),
        }
    }
}
