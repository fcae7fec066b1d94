use crate::error::{PageRuns, CliError, TokenKind};
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::Range;
use std::sync::LazyLock;

/// Zero-based, duplicate-free set of page indices. Iterates in ascending order.
pub type Selection = BTreeSet<usize>;

static LIST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[\s*\d+(?:\s*,\s*\d+)*\s*\]|\d+(?:\s*,\s*\d+)*)$").unwrap()
});

static RANGE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\[\s*(?P<a>\d+)\s*,\s*(?P<b>\d+)\s*\]|(?P<c>\d+)\s*-\s*(?P<d>\d+))$").unwrap()
});

static INDEX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d+$").unwrap());

static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// One raw selection argument after parsing. Values are one-based, as typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionToken {
    /// `[1,3,7]` or `1,3,7`
    List(Vec<usize>),
    /// `[2,5]` or `2-5`, inclusive on both ends
    Range(usize, usize),
    /// `4`
    Index(usize),
}

impl SelectionToken {
    pub fn parse(kind: TokenKind, raw: &str) -> Result<Self, CliError> {
        match kind {
            TokenKind::List => Self::parse_list(raw),
            TokenKind::Range => Self::parse_range(raw),
            TokenKind::Index => Self::parse_index(raw),
        }
    }

    /// Parse a list of page numbers like "[1,2,3]", "[1, 2, 3]" or "1,2,3"
    pub fn parse_list(raw: &str) -> Result<Self, CliError> {
        let s = raw.trim();
        if !LIST_RE.is_match(s) {
            return Err(malformed(TokenKind::List, raw));
        }

        let pages = NUMBER_RE
            .find_iter(s)
            .map(|m| positive(TokenKind::List, raw, m.as_str()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SelectionToken::List(pages))
    }

    /// Parse an inclusive range like "[2,5]" or "2-5"
    pub fn parse_range(raw: &str) -> Result<Self, CliError> {
        let s = raw.trim();
        let caps = RANGE_RE
            .captures(s)
            .ok_or_else(|| malformed(TokenKind::Range, raw))?;

        let (start, end) = match (caps.name("a"), caps.name("b")) {
            (Some(a), Some(b)) => (a, b),
            _ => match (caps.name("c"), caps.name("d")) {
                (Some(c), Some(d)) => (c, d),
                _ => return Err(malformed(TokenKind::Range, raw)),
            },
        };

        let start = positive(TokenKind::Range, raw, start.as_str())?;
        let end = positive(TokenKind::Range, raw, end.as_str())?;

        if start > end {
            return Err(malformed(TokenKind::Range, raw));
        }

        Ok(SelectionToken::Range(start, end))
    }

    /// Parse a single page number like "4"
    pub fn parse_index(raw: &str) -> Result<Self, CliError> {
        let s = raw.trim();
        if !INDEX_RE.is_match(s) {
            return Err(malformed(TokenKind::Index, raw));
        }
        positive(TokenKind::Index, raw, s).map(SelectionToken::Index)
    }

    /// Expand into zero-based page indices.
    ///
    /// A range expands in full; check it with `outside` first when the upper
    /// bound comes from the user.
    pub fn pages(&self) -> Selection {
        match self {
            SelectionToken::List(pages) => pages.iter().map(|p| p - 1).collect(),
            SelectionToken::Range(start, end) => (start - 1..*end).collect(),
            SelectionToken::Index(page) => Selection::from([page - 1]),
        }
    }

    /// One-based runs of this token's pages that `check` rejects, computed
    /// from the endpoints without expanding ranges.
    pub fn outside(&self, check: &BoundaryCheck) -> Vec<(usize, usize)> {
        let valid = check.valid_range();
        match self {
            SelectionToken::List(pages) => pages
                .iter()
                .filter(|&&p| !check.contains(p - 1))
                .map(|&p| (p, p))
                .collect(),
            SelectionToken::Index(page) if check.contains(page - 1) => Vec::new(),
            SelectionToken::Index(page) => vec![(*page, *page)],
            SelectionToken::Range(start, end) => {
                let (first, last) = (start - 1, end - 1);
                let mut runs = Vec::new();
                if first < valid.start {
                    runs.push((first + 1, last.min(valid.start - 1) + 1));
                }
                if last >= valid.end {
                    runs.push((first.max(valid.end) + 1, last + 1));
                }
                runs
            }
        }
    }
}

fn malformed(kind: TokenKind, raw: &str) -> CliError {
    CliError::MalformedToken {
        kind,
        token: raw.to_string(),
    }
}

fn positive(kind: TokenKind, raw: &str, digits: &str) -> Result<usize, CliError> {
    match digits.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(malformed(kind, raw)),
    }
}

/// Union any number of sub-selections into one.
pub fn union<I: IntoIterator<Item = Selection>>(parts: I) -> Selection {
    parts.into_iter().fold(Selection::new(), |mut acc, part| {
        acc.extend(part);
        acc
    })
}

/// Parsed selection tokens that have not been checked against a document.
///
/// Ranges stay symbolic until `validate`, so an oversized range costs nothing
/// before it is rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSelection(Vec<SelectionToken>);

impl ParsedSelection {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Union of every token's pages.
    pub fn pages(&self) -> Selection {
        union(self.0.iter().map(SelectionToken::pages))
    }

    /// Check every token against `check` and return the union of their pages.
    ///
    /// Same outcomes as `validate` on the expanded set, with out-of-range
    /// pages reported as runs.
    pub fn validate(
        &self,
        check: &BoundaryCheck,
        non_empty: bool,
    ) -> Result<Selection, CliError> {
        if non_empty && self.is_empty() {
            return Err(CliError::NoPagesSelected);
        }

        let offending: PageRuns = self.0.iter().flat_map(|t| t.outside(check)).collect();
        if !offending.is_empty() {
            return Err(CliError::OutOfRange { pages: offending });
        }

        Ok(self.pages())
    }
}

/// Parse every raw list, range and index argument. Their union is the selection.
///
/// Fails on the first malformed token; no partial selection is returned.
pub fn parse_selection<S: AsRef<str>>(
    lists: &[S],
    ranges: &[S],
    indices: &[S],
) -> Result<ParsedSelection, CliError> {
    let tagged = |kind: TokenKind, raws: &[S]| {
        raws.iter()
            .map(move |raw| SelectionToken::parse(kind, raw.as_ref()))
            .collect::<Vec<_>>()
    };
    let tokens = tagged(TokenKind::List, lists)
        .into_iter()
        .chain(tagged(TokenKind::Range, ranges))
        .chain(tagged(TokenKind::Index, indices))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ParsedSelection(tokens))
}

/// The set of page indices an operation may touch: `[left, num_pages - right)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryCheck {
    num_pages: usize,
    left: usize,
    right: usize,
}

impl BoundaryCheck {
    /// Fails when the margins leave no valid index.
    pub fn new(num_pages: usize, left: usize, right: usize) -> Result<Self, CliError> {
        if left.checked_add(right).map_or(true, |margins| margins >= num_pages) {
            return Err(CliError::IndexRange {
                num_pages,
                left,
                right,
            });
        }
        Ok(BoundaryCheck {
            num_pages,
            left,
            right,
        })
    }

    /// Every existing page is valid.
    pub fn pages(num_pages: usize) -> Result<Self, CliError> {
        Self::new(num_pages, 0, 0)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.left <= index && index < self.num_pages - self.right
    }

    pub fn valid_range(&self) -> Range<usize> {
        self.left..self.num_pages - self.right
    }
}

/// Reject an empty selection (when `non_empty`) or any member `valid` refuses.
pub fn validate<F>(selection: Selection, valid: F, non_empty: bool) -> Result<Selection, CliError>
where
    F: Fn(usize) -> bool,
{
    if non_empty && selection.is_empty() {
        return Err(CliError::NoPagesSelected);
    }

    let offending: PageRuns = selection
        .iter()
        .filter(|&&p| !valid(p))
        .map(|p| p + 1)
        .collect();
    if !offending.is_empty() {
        return Err(CliError::OutOfRange { pages: offending });
    }

    Ok(selection)
}

/// Cut a document after each index in `cuts`.
///
/// `cuts` must already be validated against `BoundaryCheck::new(num_pages, 0, 1)`,
/// so every cut leaves at least one page after it.
pub fn split_groups(num_pages: usize, cuts: &Selection) -> Vec<Range<usize>> {
    debug_assert!(cuts.iter().all(|&c| c + 1 < num_pages));

    let mut groups = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for &cut in cuts {
        groups.push(start..cut + 1);
        start = cut + 1;
    }
    groups.push(start..num_pages);
    groups
}
