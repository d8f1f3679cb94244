//! Error types for loading country data.

use thiserror::Error;

/// Problems found while decoding a topology document into features.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TopologyError {
    /// Document parsed as JSON but is not a `Topology`.
    #[error("expected a Topology document, found type `{0}`")]
    NotATopology(String),

    /// The requested object collection does not exist.
    #[error("topology has no object named `{0}`")]
    MissingObject(String),

    /// An arc reference points past the end of the arc table.
    #[error("arc reference {0} is out of range")]
    ArcOutOfRange(i64),

    /// A position has fewer than two coordinates.
    #[error("position with {0} coordinate(s), expected at least 2")]
    ShortPosition(usize),
}

/// Errors that end the single load attempt.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LoadError {
    /// Transport failure (DNS, connect, TLS, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// Server answered with a non-success status.
    #[error("server returned HTTP status {0}")]
    Status(u16),

    /// Response body is not valid JSON or does not match the topology shape.
    #[error("malformed topology JSON: {0}")]
    Parse(String),

    /// JSON was well formed but could not be converted to features.
    #[error(transparent)]
    Topology(#[from] TopologyError),
}

impl LoadError {
    /// True for failures that happened before a body was available.
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status(_))
    }

    /// Short message for the status bar.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        if self.is_network() {
            "Could not download country data."
        } else {
            "Country data could not be read."
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::Status(status.as_u16()),
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<simd_json::Error> for LoadError {
    fn from(err: simd_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_grouping() {
        assert!(LoadError::Status(500).is_network());
        assert!(LoadError::Network("refused".into()).is_network());
        assert!(!LoadError::Parse("eof".into()).is_network());
        assert!(!LoadError::from(TopologyError::MissingObject("countries".into())).is_network());
    }

    #[test]
    fn test_messages() {
        assert_eq!(LoadError::Status(404).to_string(), "server returned HTTP status 404");
        assert_eq!(
            LoadError::from(TopologyError::MissingObject("countries".into())).to_string(),
            "topology has no object named `countries`"
        );
    }
}
