//! Error types for town layout generation

use thiserror::Error;

/// Errors that can occur during town generation
///
/// Only conditions the caller must react to are represented here. Degenerate
/// geometry (missing cells, zero-length edges, undefined angles) is skipped
/// locally by each stage and never surfaces as an error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TownError {
    /// Configuration validation failed
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Too many seed points were supplied; no road network is built
    #[error("map too large: {count} seed points (max {max})")]
    InputTooLarge { count: usize, max: usize },

    /// Forest generation produced more tiles than the renderer accepts
    #[error("couldn't generate forest: {tiles} tiles (max {max})")]
    OverGeneration { tiles: usize, max: usize },
}

/// Result type alias for town generation
pub type Result<T> = std::result::Result<T, TownError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = TownError::InputTooLarge { count: 501, max: 500 };
        assert_eq!(err.to_string(), "map too large: 501 seed points (max 500)");

        let err = TownError::OverGeneration { tiles: 412, max: 300 };
        assert!(err.to_string().starts_with("couldn't generate forest"));
    }
}
