//! Domain primitives shared across the catalog and the personal lists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The two kinds of media the tracker knows about.
///
/// Stored in the database as the lowercase strings `"movie"` and `"tv"`, which
/// also match what the catalog upstream uses in its URL paths.
///
/// # Examples
///
/// ```rust
/// use watcharr::domain::MediaType;
///
/// assert_eq!(MediaType::parse("tv"), Some(MediaType::Tv));
/// assert_eq!(MediaType::Movie.as_str(), "movie");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Movie,
    Tv,
}

impl MediaType {
    /// Parses the canonical lowercase form. Anything else is rejected.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(Self::Movie),
            "tv" => Some(Self::Tv),
            _ => None,
        }
    }

    /// Parses like the search endpoint does: `"tv"` means series, any other
    /// value falls back to movies.
    #[must_use]
    pub fn parse_lenient(value: &str) -> Self {
        if value == "tv" { Self::Tv } else { Self::Movie }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Tv => "tv",
        }
    }

    #[must_use]
    pub const fn is_tv(self) -> bool {
        matches!(self, Self::Tv)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_only_canonical_forms() {
        assert_eq!(MediaType::parse("movie"), Some(MediaType::Movie));
        assert_eq!(MediaType::parse("tv"), Some(MediaType::Tv));
        assert_eq!(MediaType::parse("Movie"), None);
        assert_eq!(MediaType::parse("series"), None);
    }

    #[test]
    fn lenient_parse_defaults_to_movie() {
        assert_eq!(MediaType::parse_lenient("tv"), MediaType::Tv);
        assert_eq!(MediaType::parse_lenient("movie"), MediaType::Movie);
        assert_eq!(MediaType::parse_lenient("anything"), MediaType::Movie);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaType::Tv).unwrap(), "\"tv\"");
        let parsed: MediaType = serde_json::from_str("\"movie\"").unwrap();
        assert_eq!(parsed, MediaType::Movie);
    }
}
