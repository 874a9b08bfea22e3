//! Message normalization, tokenization and the per-message token ledger

use crate::constants::markers;
use std::ops::Range;
use tracing::trace;

/// Characters that separate tokens
const TOKEN_SEPARATORS: [char; 4] = [' ', '\t', '\n', '\r'];

/// Prefix "TAF " when the marker is missing and cut the text at the first `=`
pub fn normalize_message(text: &str) -> String {
    let mut normalized = if text.contains(markers::TAF) {
        text.to_string()
    } else {
        format!("{} {}", markers::TAF, text)
    };
    if let Some(pos) = normalized.find('=') {
        normalized.truncate(pos);
    }
    normalized
}

/// Split on whitespace runs; never yields empty tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(TOKEN_SEPARATORS)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Half-open range of token indices `[start, end)`
///
/// A span whose end does not exceed its start is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn indices(&self) -> Range<usize> {
        if self.is_empty() {
            self.start..self.start
        } else {
            self.start..self.end
        }
    }
}

/// Token sequence of one message with a consumed flag per token
///
/// The ledger is created per decode call and handed by `&mut` to each stage,
/// so a token claimed by one stage is invisible to the others.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    tokens: Vec<String>,
    consumed: Vec<bool>,
    reclaims: usize,
}

impl TokenLedger {
    pub fn new(tokens: Vec<String>) -> Self {
        let consumed = vec![false; tokens.len()];
        Self {
            tokens,
            consumed,
            reclaims: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token text at `index`, if in range
    pub fn token(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn is_consumed(&self, index: usize) -> bool {
        self.consumed.get(index).copied().unwrap_or(true)
    }

    /// Claim a token; returns false if it was out of range or already claimed
    pub fn consume(&mut self, index: usize) -> bool {
        match self.consumed.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                true
            }
            Some(_) => {
                self.reclaims += 1;
                trace!("Token {} ('{}') claimed twice", index, self.tokens[index]);
                false
            }
            None => false,
        }
    }

    /// Number of attempts to claim an already-consumed token
    pub fn reclaims(&self) -> usize {
        self.reclaims
    }

    pub fn consumed_count(&self) -> usize {
        self.consumed.iter().filter(|c| **c).count()
    }

    /// Span covering the whole message
    pub fn full_span(&self) -> Span {
        Span::new(0, self.tokens.len())
    }

    /// Unconsumed tokens within `span`, clipped to the message
    pub fn available(&self, span: Span) -> impl Iterator<Item = (usize, &str)> + '_ {
        let end = span.end.min(self.tokens.len());
        Span::new(span.start, end)
            .indices()
            .filter(move |&i| !self.consumed[i])
            .map(move |i| (i, self.tokens[i].as_str()))
    }

    /// First unconsumed token in `span` satisfying `predicate`
    pub fn find_available<F>(&self, span: Span, mut predicate: F) -> Option<(usize, &str)>
    where
        F: FnMut(&str) -> bool,
    {
        self.available(span).find(|(_, token)| predicate(token))
    }

    /// Space-joined token text over `[start, end)`, clipped to the message
    pub fn join(&self, span: Span) -> String {
        let end = span.end.min(self.tokens.len());
        self.tokens[Span::new(span.start, end).indices()].join(" ")
    }
}
