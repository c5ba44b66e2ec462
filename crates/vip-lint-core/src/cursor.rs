//! Stateless search primitives over a [`TokenStream`].

use crate::token::{TokenKind, TokenKindSet, TokenStream};

/// Forward-only search helper borrowed over one stream.
///
/// Holds no position of its own; every call states where to look. This is
/// the single way rules inspect neighboring structure, so its contract is
/// the load-bearing one: [`Cursor::find_next`] skips the kinds it is told
/// to skip and then judges the *first* remaining token, rather than
/// scanning until something matches. "Scan until one of these kinds" is
/// expressed by passing the complement of the accepted set as `skip`.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    stream: &'a TokenStream,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor over `stream`.
    #[must_use]
    pub fn new(stream: &'a TokenStream) -> Self {
        Self { stream }
    }

    /// Finds the next token matching the given criteria.
    ///
    /// Scans strictly forward from `from` up to `to` (exclusive; stream
    /// end if `None`). Tokens whose kind is in `skip` are passed over
    /// without being tested. The first remaining token is tested once:
    /// with `invert` false a match requires its kind to be in `accepted`,
    /// with `invert` true a match requires it not to be. Returns the
    /// matched index, or `None` if the test fails or the bound is reached
    /// while skipping. Never panics; `from` at or past the stream length
    /// returns `None` immediately.
    #[must_use]
    pub fn find_next(
        &self,
        accepted: TokenKindSet,
        from: usize,
        to: Option<usize>,
        invert: bool,
        skip: TokenKindSet,
    ) -> Option<usize> {
        let end = to.map_or(self.stream.len(), |t| t.min(self.stream.len()));
        let mut at = from;
        while at < end {
            let kind = self.stream.get(at)?.kind;
            if skip.contains(kind) {
                at += 1;
                continue;
            }
            return (accepted.contains(kind) != invert).then_some(at);
        }
        None
    }

    /// Steps over whitespace tokens one at a time starting at `from`.
    ///
    /// Returns the index of the first non-whitespace token, or `None` if
    /// only whitespace remains.
    #[must_use]
    pub fn next_non_whitespace(&self, from: usize) -> Option<usize> {
        let mut at = from;
        while let Some(token) = self.stream.get(at) {
            if token.kind != TokenKind::Whitespace {
                return Some(at);
            }
            at += 1;
        }
        None
    }
}
