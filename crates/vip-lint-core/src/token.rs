//! Token model: positioned lexical units and the immutable stream they form.

use serde::{Deserialize, Serialize};

/// Kind of a lexical token, as a closed enumeration.
///
/// The taxonomy is deliberately closed so that rules match on it
/// exhaustively; a tokenizer-side typo cannot silently disable a check
/// the way a string-typed kind comparison could.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// Bare name, e.g. a function name in a call.
    Identifier,
    /// Variable reference, e.g. `$foo`.
    Variable,
    /// Quoted string literal, raw text includes the quotes.
    StringLiteral,
    /// Horizontal or vertical whitespace.
    Whitespace,
    /// Assignment operator `=`.
    Assignment,
    /// Opening call delimiter `(`.
    OpenParen,
    /// Closing call delimiter `)`.
    CloseParen,
    /// Argument separator `,`.
    Comma,
    /// Anything the engine has no structural interest in.
    Other,
}

impl TokenKind {
    const COUNT: u16 = 9;

    const fn bit(self) -> u16 {
        1 << self as u16
    }
}

/// A set of [`TokenKind`]s with constant-time membership tests.
///
/// Backed by a bitmask over the closed enumeration, so cursor searches
/// and rule interest checks cost a single AND.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TokenKindSet(u16);

impl TokenKindSet {
    /// The empty set.
    pub const EMPTY: Self = Self(0);

    /// The set containing every kind.
    pub const ALL: Self = Self((1 << TokenKind::COUNT) - 1);

    /// Builds a set from a slice of kinds.
    #[must_use]
    pub const fn of(kinds: &[TokenKind]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < kinds.len() {
            bits |= kinds[i].bit();
            i += 1;
        }
        Self(bits)
    }

    /// Builds a set containing a single kind.
    #[must_use]
    pub const fn single(kind: TokenKind) -> Self {
        Self(kind.bit())
    }

    /// Returns true if `kind` is a member.
    #[must_use]
    pub const fn contains(self, kind: TokenKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// Returns the set of every kind not in `self`.
    #[must_use]
    pub const fn complement(self) -> Self {
        Self(!self.0 & Self::ALL.0)
    }

    /// Returns the union of two sets.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Returns true if the set has no members.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl From<TokenKind> for TokenKindSet {
    fn from(kind: TokenKind) -> Self {
        Self::single(kind)
    }
}

/// A single positioned lexical unit.
///
/// Immutable once produced by the tokenizer; `text` carries the raw
/// source slice including any original quoting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Position in the stream; contiguous and strictly increasing.
    pub index: usize,
    /// Closed-set kind.
    pub kind: TokenKind,
    /// Raw source text, quotes included for string literals.
    pub text: String,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
}

impl Token {
    /// Returns the text with any surrounding quote characters stripped.
    ///
    /// `'foo'` and `"foo"` both yield `foo`; unquoted text is returned
    /// unchanged.
    #[must_use]
    pub fn unquoted(&self) -> &str {
        self.text.trim_matches(|c| c == '\'' || c == '"')
    }
}

/// The immutable, ordered, randomly-indexable token sequence for one file.
///
/// Length is fixed for the life of a scan; the engine treats the stream
/// as read-only and so must every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Creates a builder for assembling a stream with positions tracked.
    #[must_use]
    pub fn builder() -> TokenStreamBuilder {
        TokenStreamBuilder::new()
    }

    /// Returns the token at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Returns the number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns true if the stream holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Iterates over the tokens in stream order.
    pub fn iter(&self) -> std::slice::Iter<'_, Token> {
        self.tokens.iter()
    }
}

impl<'a> IntoIterator for &'a TokenStream {
    type Item = &'a Token;
    type IntoIter = std::slice::Iter<'a, Token>;

    fn into_iter(self) -> Self::IntoIter {
        self.tokens.iter()
    }
}

/// Incremental [`TokenStream`] constructor for external tokenizers.
///
/// Assigns dense, strictly increasing indices and tracks line/column
/// positions, advancing the line on every newline inside token text.
#[derive(Debug, Default)]
pub struct TokenStreamBuilder {
    tokens: Vec<Token>,
    line: usize,
    column: usize,
}

impl TokenStreamBuilder {
    /// Creates an empty builder positioned at line 1, column 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tokens: Vec::new(),
            line: 1,
            column: 1,
        }
    }

    /// Appends a token of the given kind and raw text.
    pub fn push(&mut self, kind: TokenKind, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        let token = Token {
            index: self.tokens.len(),
            kind,
            text: text.clone(),
            line: self.line,
            column: self.column,
        };
        for ch in text.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.tokens.push(token);
        self
    }

    /// Appends a variable token, e.g. `$foo`.
    pub fn variable(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(TokenKind::Variable, text)
    }

    /// Appends a bare identifier token.
    pub fn identifier(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(TokenKind::Identifier, text)
    }

    /// Appends a string literal token; `text` should include the quotes.
    pub fn string_literal(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(TokenKind::StringLiteral, text)
    }

    /// Appends a whitespace token.
    pub fn whitespace(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(TokenKind::Whitespace, text)
    }

    /// Appends an assignment operator token.
    pub fn assignment(&mut self) -> &mut Self {
        self.push(TokenKind::Assignment, "=")
    }

    /// Appends an opening call delimiter token.
    pub fn open_paren(&mut self) -> &mut Self {
        self.push(TokenKind::OpenParen, "(")
    }

    /// Appends a closing call delimiter token.
    pub fn close_paren(&mut self) -> &mut Self {
        self.push(TokenKind::CloseParen, ")")
    }

    /// Appends an argument separator token.
    pub fn comma(&mut self) -> &mut Self {
        self.push(TokenKind::Comma, ",")
    }

    /// Appends a token the engine treats as opaque, e.g. `;`.
    pub fn other(&mut self, text: impl Into<String>) -> &mut Self {
        self.push(TokenKind::Other, text)
    }

    /// Finishes the stream.
    #[must_use]
    pub fn build(&mut self) -> TokenStream {
        TokenStream {
            tokens: std::mem::take(&mut self.tokens),
        }
    }
}
