pub mod decrypt;
pub mod delete;
pub mod encrypt;
pub mod extract;
pub mod info;
pub mod insert;
pub mod merge;
pub mod remove;
pub mod reverse;
pub mod rotate;
pub mod scale;
pub mod split;

use crate::error::CliError;
use crate::selection::{parse_selection, BoundaryCheck, ParsedSelection, Selection};
use serde::Serialize;
use std::path::PathBuf;

/// Raw page selection arguments, as typed on the command line or sent over MCP.
#[derive(Debug, Clone, Default)]
pub struct PageSelection {
    pub lists: Vec<String>,
    pub ranges: Vec<String>,
    pub indices: Vec<String>,
    /// Select every page the command can act on, ignoring the tokens.
    pub all: bool,
}

impl PageSelection {
    /// Parse the raw tokens. Runs before any file is opened.
    pub fn parse(&self) -> Result<Requested, CliError> {
        if self.all {
            return Ok(Requested::All);
        }
        parse_selection(&self.lists, &self.ranges, &self.indices).map(Requested::Pages)
    }
}

/// A parsed selection that has not been checked against a document yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requested {
    All,
    Pages(ParsedSelection),
}

impl Requested {
    pub fn validate(self, check: &BoundaryCheck) -> Result<Selection, CliError> {
        match self {
            Requested::All => Ok(check.valid_range().collect()),
            Requested::Pages(pages) => pages.validate(check, true),
        }
    }
}

/// A file a command wrote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Written {
    pub output: PathBuf,
    pub page_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PageRuns;

    fn tokens(lists: &[&str], ranges: &[&str], indices: &[&str]) -> PageSelection {
        let owned = |raw: &[&str]| raw.iter().map(|s| s.to_string()).collect();
        PageSelection {
            lists: owned(lists),
            ranges: owned(ranges),
            indices: owned(indices),
            all: false,
        }
    }

    #[test]
    fn test_all_ignores_tokens() {
        let selection = PageSelection {
            all: true,
            ..tokens(&["not a list"], &[], &[])
        };
        assert_eq!(selection.parse().unwrap(), Requested::All);

        let check = BoundaryCheck::new(5, 0, 1).unwrap();
        assert_eq!(
            Requested::All.validate(&check).unwrap(),
            Selection::from([0, 1, 2, 3])
        );
    }

    #[test]
    fn test_parse_then_validate() {
        let requested = tokens(&["1,3"], &["5-6"], &["3"]).parse().unwrap();
        let check = BoundaryCheck::pages(6).unwrap();
        assert_eq!(
            requested.clone().validate(&check).unwrap(),
            Selection::from([0, 2, 4, 5])
        );

        let check = BoundaryCheck::pages(5).unwrap();
        assert_eq!(
            requested.validate(&check).unwrap_err(),
            CliError::OutOfRange {
                pages: PageRuns::from_iter([6usize])
            }
        );
    }

    #[test]
    fn test_nothing_requested() {
        let requested = tokens(&[], &[], &[]).parse().unwrap();
        let check = BoundaryCheck::pages(3).unwrap();
        assert_eq!(
            requested.validate(&check).unwrap_err(),
            CliError::NoPagesSelected
        );
    }
}
