// ABOUTME: Error types for the harvest pipeline including ErrorCode enum and HarvestError struct.
// ABOUTME: Provides categorized errors with convenience constructors, boolean helpers and transience.

use std::fmt;

/// Error codes representing different categories of pipeline failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    InvalidUrl,
    Fetch,
    Timeout,
    Status,
    Context,
    Config,
    Asset,
    Persist,
    /// A stored table that cannot be read back; retrying will not help.
    Corrupt,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidUrl => "invalid URL",
            ErrorCode::Fetch => "fetch error",
            ErrorCode::Timeout => "timeout",
            ErrorCode::Status => "unexpected status",
            ErrorCode::Context => "browsing context error",
            ErrorCode::Config => "configuration error",
            ErrorCode::Asset => "asset error",
            ErrorCode::Persist => "persistence error",
            ErrorCode::Corrupt => "unreadable table",
        };
        write!(f, "{}", s)
    }
}

/// The main error type for harvest operations.
#[derive(Debug, thiserror::Error)]
pub struct HarvestError {
    pub code: ErrorCode,
    pub url: String,
    pub op: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl fmt::Display for HarvestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "harvest: {} {}: {}", self.op, self.url, self.code)?;
        if let Some(ref src) = self.source {
            write!(f, ": {}", src)?;
        }
        Ok(())
    }
}

impl HarvestError {
    fn new(
        code: ErrorCode,
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self {
            code,
            url: url.into(),
            op: op.into(),
            source,
        }
    }

    /// Create an InvalidUrl error.
    pub fn invalid_url(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::InvalidUrl, url, op, source)
    }

    /// Create a Fetch error.
    pub fn fetch(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Fetch, url, op, source)
    }

    /// Create a Timeout error.
    pub fn timeout(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Timeout, url, op, source)
    }

    /// Create a Status error for a non-200 response.
    pub fn status(url: impl Into<String>, op: impl Into<String>, status: u16) -> Self {
        Self::new(
            ErrorCode::Status,
            url,
            op,
            Some(anyhow::anyhow!("HTTP status {}", status)),
        )
    }

    /// Create a Context error.
    pub fn context(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Context, url, op, source)
    }

    /// Create a Config error.
    pub fn config(op: impl Into<String>, source: Option<anyhow::Error>) -> Self {
        Self::new(ErrorCode::Config, String::new(), op, source)
    }

    /// Create an Asset error.
    pub fn asset(
        url: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Asset, url, op, source)
    }

    /// Create a Persist error. The url slot carries the table path.
    pub fn persist(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Persist, path, op, source)
    }

    /// Create a Corrupt error for a table whose contents cannot be parsed.
    pub fn corrupt(
        path: impl Into<String>,
        op: impl Into<String>,
        source: Option<anyhow::Error>,
    ) -> Self {
        Self::new(ErrorCode::Corrupt, path, op, source)
    }

    /// Returns true if a retry after a short delay may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self.code,
            ErrorCode::Fetch | ErrorCode::Timeout | ErrorCode::Persist
        )
    }

    /// Returns true if this is a Timeout error.
    pub fn is_timeout(&self) -> bool {
        self.code == ErrorCode::Timeout
    }

    /// Returns true if this is a Fetch error.
    pub fn is_fetch(&self) -> bool {
        self.code == ErrorCode::Fetch
    }

    /// Returns true if this is a Status error.
    pub fn is_status(&self) -> bool {
        self.code == ErrorCode::Status
    }

    /// Returns true if this is an InvalidUrl error.
    pub fn is_invalid_url(&self) -> bool {
        self.code == ErrorCode::InvalidUrl
    }

    /// Returns true if this is an Asset error.
    pub fn is_asset(&self) -> bool {
        self.code == ErrorCode::Asset
    }

    /// Returns true if this is a Corrupt error.
    pub fn is_corrupt(&self) -> bool {
        self.code == ErrorCode::Corrupt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_op_url_code_and_source() {
        let err = HarvestError::status("https://x.com/a", "LoadDetail", 404);
        let msg = err.to_string();
        assert!(msg.contains("LoadDetail"));
        assert!(msg.contains("https://x.com/a"));
        assert!(msg.contains("unexpected status"));
        assert!(msg.contains("404"));
    }

    #[test]
    fn transient_categories() {
        assert!(HarvestError::fetch("u", "op", None).is_transient());
        assert!(HarvestError::timeout("u", "op", None).is_transient());
        assert!(HarvestError::persist("t.csv", "op", None).is_transient());
        assert!(!HarvestError::status("u", "op", 500).is_transient());
        assert!(!HarvestError::context("u", "op", None).is_transient());
        assert!(!HarvestError::asset("u", "op", None).is_transient());
        assert!(!HarvestError::corrupt("t.csv", "op", None).is_transient());
    }
}
