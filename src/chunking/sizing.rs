//! Chunk size accounting strategies.
//!
//! The splitter needs to know how large the open chunk would become if the
//! next page were added. Two answers are available:
//!
//! - **Estimated**: adds the standalone serialized size of each page. Pages
//!   serialized together share fonts and other resources, so the sum
//!   overestimates the real size and chunks close earlier than necessary.
//!   This is the default and fixes the chunk boundaries users already rely on.
//! - **Exact**: re-serializes the open chunk plus the candidate page and
//!   measures the result. Chunks are packed tighter at the cost of one extra
//!   serialization per page.

use crate::chunking::subset::PageSource;
use crate::error::{ChunkingError, Error, Result};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// How the running size of an open chunk is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Sizing {
    /// Sum of independently serialized single-page sizes.
    #[default]
    Estimated,
    /// Measured size of the open chunk re-serialized with the next page.
    Exact,
}

impl Sizing {
    /// Every strategy, default first.
    pub const ALL: [Self; 2] = [Self::Estimated, Self::Exact];

    /// Returns the strategy name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Estimated => "estimated",
            Self::Exact => "exact",
        }
    }

    /// Returns a one-line description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Estimated => "sum of standalone page sizes (default)",
            Self::Exact => "re-serialize the open chunk for every added page",
        }
    }

    /// Size the open chunk `open` would have after adding `page`.
    ///
    /// `running` is the current size of `open` and `page_size` the
    /// standalone size of `page`. `open` must be non-empty and end at `page`.
    pub(crate) fn projected_size(
        self,
        source: &PageSource,
        open: &Range<usize>,
        running: usize,
        page: usize,
        page_size: usize,
    ) -> Result<usize> {
        match self {
            Self::Estimated => Ok(running.saturating_add(page_size)),
            Self::Exact => Ok(source.serialize(open.start..page + 1)?.len()),
        }
    }
}

impl fmt::Display for Sizing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Sizing {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "estimated" => Ok(Self::Estimated),
            "exact" => Ok(Self::Exact),
            _ => Err(ChunkingError::UnknownStrategy {
                name: s.to_string(),
                available: available_strategies().join(", "),
            }
            .into()),
        }
    }
}

/// Lists available sizing strategy names.
#[must_use]
pub fn available_strategies() -> Vec<&'static str> {
    Sizing::ALL.into_iter().map(Sizing::name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_pdf;

    #[test]
    fn test_default_is_estimated() {
        assert_eq!(Sizing::default(), Sizing::Estimated);
    }

    #[test]
    fn test_from_str() {
        assert_eq!("estimated".parse::<Sizing>().unwrap(), Sizing::Estimated);
        assert_eq!("EXACT".parse::<Sizing>().unwrap(), Sizing::Exact);
        let err = "fuzzy".parse::<Sizing>().unwrap_err();
        assert!(err.to_string().contains("available: estimated, exact"));
    }

    #[test]
    fn test_available_strategies() {
        let strategies = available_strategies();
        assert_eq!(strategies, vec!["estimated", "exact"]);
        for name in strategies {
            let sizing: Sizing = name.parse().unwrap();
            assert_eq!(sizing.to_string(), name);
            assert!(!sizing.description().is_empty());
        }
    }

    #[test]
    fn test_estimated_adds_page_size() {
        let source = PageSource::parse(&sample_pdf(2, 0)).unwrap();
        let size = Sizing::Estimated
            .projected_size(&source, &(0..1), 1_000, 1, 250)
            .unwrap();
        assert_eq!(size, 1_250);
    }

    #[test]
    fn test_exact_never_exceeds_estimate() {
        let source = PageSource::parse(&sample_pdf(3, 500)).unwrap();
        let first = source.serialize(0..1).unwrap().len();
        let second = source.serialize(1..2).unwrap().len();

        let estimated = Sizing::Estimated
            .projected_size(&source, &(0..1), first, 1, second)
            .unwrap();
        let exact = Sizing::Exact
            .projected_size(&source, &(0..1), first, 1, second)
            .unwrap();
        assert!(exact <= estimated);
    }
}
