//! Token definitions for Livy source text.

use logos::Logos;

/// A lexical token kind. `Whitespace` only ever carries whitespace that
/// contains at least one newline — other whitespace is skipped outright by
/// the `logos` `skip` attribute below, since it never participates in EOL
/// inference.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\f]+")]
pub enum TokenKind {
    #[token("let")]
    Let,
    #[token("in")]
    In,
    #[token("if")]
    If,
    #[token("then")]
    Then,
    #[token("else")]
    Else,
    #[token("True")]
    True,
    #[token("False")]
    False,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token(",")]
    Comma,
    #[token(";")]
    Semicolon,
    #[token("\\")]
    Backslash,
    #[token("->")]
    Arrow,

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("^")]
    Caret,
    #[token("=")]
    Equal,
    #[token("<>")]
    Join,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,
    #[token("~")]
    Tilde,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Name(String),

    #[regex(r"[0-9]+\.[0-9]+", |lex| lex.slice().parse().ok())]
    Float(f64),
    #[regex(r"[0-9]+", |lex| lex.slice().parse().ok())]
    Int(i64),
    #[regex(r#""(?:[^"\\]|\\.)*""#, |lex| { let s = lex.slice(); s[1..s.len() - 1].to_string() })]
    String(String),

    /// Raw whitespace containing a newline, kept around only long enough for
    /// the EOL-inference pass to inspect (`spec.md` §6.2).
    #[regex(r"[ \t\r\f]*\n[ \t\r\n\f]*")]
    Whitespace,

    /// Inserted by EOL inference; never produced directly by `logos`.
    Eol,
}

impl TokenKind {
    /// `true` for the kinds EOL inference treats as a valid expression
    /// ending on the left of a candidate newline.
    #[must_use]
    pub const fn is_valid_end(&self) -> bool {
        matches!(
            self,
            Self::Name(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::String(_)
                | Self::True
                | Self::False
                | Self::RParen
                | Self::RBracket
        )
    }

    /// `true` for the kinds EOL inference treats as a valid expression start
    /// on the right of a candidate newline.
    #[must_use]
    pub const fn is_valid_start(&self) -> bool {
        matches!(
            self,
            Self::Name(_)
                | Self::Int(_)
                | Self::Float(_)
                | Self::String(_)
                | Self::True
                | Self::False
                | Self::LParen
                | Self::LBracket
                | Self::Backslash
                | Self::Tilde
                | Self::Minus
                | Self::If
                | Self::Let
        )
    }
}

/// A single token with its byte span into the source text.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: livy_source::Span,
}
