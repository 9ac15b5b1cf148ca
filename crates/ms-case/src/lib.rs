#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordered set of 1-indexed ranks a solver is asked to resolve.
///
/// A valid query set always contains rank 1, is strictly increasing, and
/// never exceeds the array size it is paired with. Construction does not
/// validate; call [`QuerySet::validate`] against the intended array size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySet {
    ranks: Vec<usize>,
}

impl QuerySet {
    #[must_use]
    pub fn new(ranks: Vec<usize>) -> Self {
        Self { ranks }
    }

    #[must_use]
    pub fn ranks(&self) -> &[usize] {
        &self.ranks
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.ranks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ranks.is_empty()
    }

    pub fn validate(&self, size: usize) -> Result<(), CaseError> {
        let Some(&first) = self.ranks.first() else {
            return Err(CaseError::EmptyQuerySet);
        };
        if first != 1 {
            return Err(CaseError::FirstRankNotOne { found: first });
        }
        for pair in self.ranks.windows(2) {
            if pair[1] <= pair[0] {
                return Err(CaseError::NonIncreasingRanks {
                    prev: pair[0],
                    next: pair[1],
                });
            }
        }
        // First element and strict ordering make the last rank the maximum.
        let last = self.ranks[self.ranks.len() - 1];
        if last > size {
            return Err(CaseError::RankOutOfBounds { rank: last, size });
        }
        Ok(())
    }
}

/// One generated test case: the solver's unsorted input array plus the
/// ranks it must report. Array order is significant and never assumed
/// sorted; duplicate values are expected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub values: Vec<u64>,
    pub queries: QuerySet,
}

impl TestCase {
    #[must_use]
    pub fn new(values: Vec<u64>, queries: QuerySet) -> Self {
        Self { values, queries }
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.values.len()
    }

    pub fn validate(&self) -> Result<(), CaseError> {
        if self.values.is_empty() {
            return Err(CaseError::EmptyArray);
        }
        self.queries.validate(self.values.len())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaseError {
    #[error("test case array must not be empty")]
    EmptyArray,
    #[error("query set must not be empty")]
    EmptyQuerySet,
    #[error("first query rank must be 1 but found {found}")]
    FirstRankNotOne { found: usize },
    #[error("query ranks must be strictly increasing but {next} follows {prev}")]
    NonIncreasingRanks { prev: usize, next: usize },
    #[error("query rank {rank} exceeds array size {size}")]
    RankOutOfBounds { rank: usize, size: usize },
    #[error("case line has {found} tokens but header declares {expected}")]
    TokenCount { expected: usize, found: usize },
    #[error("malformed integer token {token:?}")]
    MalformedToken { token: String },
    #[error("case line is missing the {field} header field")]
    MissingHeader { field: &'static str },
}

/// Renders the input-case line: `N K q_1 … q_K v_1 … v_N`.
///
/// Single spaces, no trailing newline. Solvers tuned against this format
/// tokenize on arbitrary whitespace, but the generator side is fixed so the
/// bytes stay reproducible.
#[must_use]
pub fn render_input(case: &TestCase) -> String {
    let mut out = String::new();
    push_token(&mut out, case.size() as u64);
    push_token(&mut out, case.queries.len() as u64);
    for &rank in case.queries.ranks() {
        push_token(&mut out, rank as u64);
    }
    for &value in &case.values {
        push_token(&mut out, value);
    }
    out
}

/// Renders the expected-output line: `val_1 … val_K` followed by a newline.
///
/// The newline here (and its absence in [`render_input`]) is deliberate:
/// verification is byte-exact against solvers whose stdout convention is
/// newline-terminated rows.
#[must_use]
pub fn render_expected(values: &[u64]) -> String {
    let mut out = String::new();
    for &value in values {
        push_token(&mut out, value);
    }
    out.push('\n');
    out
}

fn push_token(out: &mut String, value: u64) {
    if !out.is_empty() {
        out.push(' ');
    }
    out.push_str(&value.to_string());
}

/// Parses an input-case line back into a validated [`TestCase`].
///
/// Tokenizes on arbitrary whitespace, so a trailing newline or doubled
/// spaces in hand-edited case files are accepted.
pub fn parse_input(text: &str) -> Result<TestCase, CaseError> {
    let mut tokens = text.split_whitespace();

    let size = parse_token(tokens.next().ok_or(CaseError::MissingHeader { field: "N" })?)?;
    let query_count =
        parse_token(tokens.next().ok_or(CaseError::MissingHeader { field: "K" })?)?;
    let size = size as usize;
    let query_count = query_count as usize;

    // The declared counts are untrusted input: saturate the bookkeeping
    // arithmetic and never pre-allocate more than the line could hold.
    let declared = 2_usize.saturating_add(query_count).saturating_add(size);
    let token_budget = text.len();

    let mut ranks = Vec::with_capacity(query_count.min(token_budget));
    for _ in 0..query_count {
        let token = tokens
            .next()
            .ok_or(CaseError::TokenCount {
                expected: declared,
                found: 2_usize.saturating_add(ranks.len()),
            })?;
        ranks.push(parse_token(token)? as usize);
    }

    let mut values = Vec::with_capacity(size.min(token_budget));
    for _ in 0..size {
        let token = tokens
            .next()
            .ok_or(CaseError::TokenCount {
                expected: declared,
                found: declared.saturating_sub(size).saturating_add(values.len()),
            })?;
        values.push(parse_token(token)?);
    }

    let trailing = tokens.count();
    if trailing != 0 {
        return Err(CaseError::TokenCount {
            expected: declared,
            found: declared.saturating_add(trailing),
        });
    }

    let case = TestCase::new(values, QuerySet::new(ranks));
    case.validate()?;
    Ok(case)
}

/// Parses an expected/actual output line into its value row. Used for
/// mismatch diagnostics; verification itself compares raw bytes.
pub fn parse_expected(text: &str) -> Result<Vec<u64>, CaseError> {
    text.split_whitespace().map(parse_token).collect()
}

fn parse_token(token: &str) -> Result<u64, CaseError> {
    token.parse().map_err(|_| CaseError::MalformedToken {
        token: token.to_owned(),
    })
}
