//! Tokenizing Livy source text (`spec.md` §6.2, explicitly out of scope for
//! the core but needed here so the rest of the pipeline can be exercised
//! from literal source).

mod eol;
mod token;

pub use token::{Token, TokenKind};

use logos::Logos;
use livy_source::Span;

/// Failure tokenizing source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized character at byte {0}")]
pub struct LexError(pub usize);

/// Tokenizes `source`, newline-normalized, with EOL inference already
/// applied (`spec.md` §6.2's "Token EOL inference").
///
/// # Errors
///
/// Returns [`LexError`] at the byte offset of the first byte sequence
/// `logos` cannot classify into any [`TokenKind`].
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    let normalized = source.replace("\r\n", "\n");
    let mut lexer = TokenKind::lexer(&normalized);
    let mut tokens = Vec::new();
    while let Some(result) = lexer.next() {
        let kind = result.map_err(|()| LexError(lexer.span().start))?;
        tokens.push(Token { kind, span: Span::new(lexer.span().start, lexer.span().end) });
    }
    Ok(eol::infer_eols(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_and_literals_are_recognized() {
        let tokens = lex("let x = 1").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Let);
        assert_eq!(tokens[1].kind, TokenKind::Name("x".to_string()));
        assert_eq!(tokens[2].kind, TokenKind::Equal);
        assert_eq!(tokens[3].kind, TokenKind::Int(1));
    }

    #[test]
    fn string_literal_keeps_its_escapes_unexpanded() {
        let tokens = lex(r#""a\nb""#).unwrap();
        assert_eq!(tokens[0].kind, TokenKind::String(r"a\nb".to_string()));
    }

    #[test]
    fn join_operator_is_not_split_into_two_less_than_tokens() {
        let tokens = lex(r#""a" <> "b""#).unwrap();
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Join));
    }

    #[test]
    fn invalid_byte_is_reported_at_its_offset() {
        let err = lex("let x = @").unwrap_err();
        assert_eq!(err.0, 8);
    }
}
