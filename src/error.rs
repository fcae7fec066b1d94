use std::fmt;
use thiserror::Error;

/// Which selection syntax a raw token was supplied as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    List,
    Range,
    Index,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::List => "list",
            TokenKind::Range => "range",
            TokenKind::Index => "index",
        };
        f.write_str(name)
    }
}

/// Errors the user can act on: malformed or out-of-range page selections and
/// failed command preconditions. `main` maps each to an exit code.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CliError {
    #[error("'{token}' is not a valid {kind} selection")]
    MalformedToken { kind: TokenKind, token: String },

    #[error("No pages selected.")]
    NoPagesSelected,

    /// Offending pages are one-based and sorted ascending.
    #[error("Invalid selection: {pages}")]
    OutOfRange { pages: PageRuns },

    #[error(
        "Index shift must be within the range of existing pages and allow at least 1 selection \
         (pages: {num_pages}, left: {left}, right: {right})"
    )]
    IndexRange {
        num_pages: usize,
        left: usize,
        right: usize,
    },

    #[error("{0}")]
    BadParameter(String),

    #[error("{0}")]
    BadUsage(String),
}

/// One-based page numbers collapsed into sorted, disjoint inclusive runs.
///
/// Displays as `[3, 11-20]`, so an out-of-range span costs one entry no matter
/// how many pages it covers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageRuns(Vec<(usize, usize)>);

impl PageRuns {
    /// Merge overlapping and adjacent runs given in any order.
    pub fn from_runs(mut runs: Vec<(usize, usize)>) -> Self {
        runs.sort_unstable();
        let mut merged: Vec<(usize, usize)> = Vec::with_capacity(runs.len());
        for (first, last) in runs {
            match merged.last_mut() {
                Some(prev) if first <= prev.1.saturating_add(1) => prev.1 = prev.1.max(last),
                _ => merged.push((first, last)),
            }
        }
        PageRuns(merged)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn runs(&self) -> &[(usize, usize)] {
        &self.0
    }
}

impl FromIterator<usize> for PageRuns {
    fn from_iter<I: IntoIterator<Item = usize>>(pages: I) -> Self {
        Self::from_runs(pages.into_iter().map(|p| (p, p)).collect())
    }
}

impl FromIterator<(usize, usize)> for PageRuns {
    fn from_iter<I: IntoIterator<Item = (usize, usize)>>(runs: I) -> Self {
        Self::from_runs(runs.into_iter().collect())
    }
}

impl fmt::Display for PageRuns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, &(first, last)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            if first == last {
                write!(f, "{first}")?;
            } else {
                write!(f, "{first}-{last}")?;
            }
        }
        f.write_str("]")
    }
}

impl CliError {
    pub fn bad_parameter(msg: impl Into<String>) -> Self {
        CliError::BadParameter(msg.into())
    }

    pub fn bad_usage(msg: impl Into<String>) -> Self {
        CliError::BadUsage(msg.into())
    }

    /// Process exit status for this error. Everything the user can fix by
    /// changing arguments is a usage error (2); an impossible boundary policy
    /// is an internal fault (1).
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::IndexRange { .. } => 1,
            _ => 2,
        }
    }
}
