//! The token definition for the canvas command language.

/// A token is a single unit of the language, with a specific kind and location.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'a> {
    pub kind: TokenKind<'a>,
    pub span: Span,
}

/// The kind of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind<'a> {
    // Keywords
    And,      // "AND"
    Or,       // "OR"
    Not,      // "NOT"
    Like,     // "LIKE"
    In,       // "IN"
    Includes, // "INCLUDES"
    Excludes, // "EXCLUDES"
    Asc,      // "ASC"
    Desc,     // "DESC"

    // Literals
    Word(&'a str),   // Any other run of non-separator characters
    Quoted(&'a str), // The content between matching quotes

    // Punctuation
    Comma, // ,

    // Operators
    Eq,    // =
    NotEq, // !=
    Gt,    // >
    Lt,    // <
    Gte,   // >=
    Lte,   // <=

    // Special
    Illegal, // An illegal/unknown character
}

/// Represents a span in the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    /// The starting byte offset.
    pub start: usize,
    /// The ending byte offset.
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}
