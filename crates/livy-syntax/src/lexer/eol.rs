//! End-of-line inference: turns newline-carrying whitespace into a real
//! statement separator, or drops it, depending on its neighbors and bracket
//! nesting (`spec.md` §6.2). Ported from the recovered
//! `lex/eol_inference.py`'s `can_add_eol`/`insert_eols`.

use livy_source::Span;

use super::token::{Token, TokenKind};

fn opens(kind: &TokenKind) -> bool { matches!(kind, TokenKind::LParen | TokenKind::LBracket) }

fn closes(kind: &TokenKind) -> bool { matches!(kind, TokenKind::RParen | TokenKind::RBracket) }

fn can_add_eol(prev: &TokenKind, next: &TokenKind, bracket_depth: usize) -> bool {
    bracket_depth == 0 && prev.is_valid_end() && next.is_valid_start()
}

/// Drops every `Whitespace` token, replacing the ones that sit at bracket
/// depth zero between a valid-end and a valid-start token with `Eol`.
#[must_use]
pub fn infer_eols(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut bracket_depth = 0usize;
    let mut prev_kind = TokenKind::Eol;

    let mut iter = tokens.into_iter().peekable();
    while let Some(token) = iter.next() {
        if token.kind == TokenKind::Whitespace {
            if let Some(next) = iter.peek() {
                if can_add_eol(&prev_kind, &next.kind, bracket_depth) {
                    out.push(Token { kind: TokenKind::Eol, span: token.span });
                }
            }
            continue;
        }

        if opens(&token.kind) {
            bracket_depth += 1;
        } else if closes(&token.kind) {
            bracket_depth = bracket_depth.saturating_sub(1);
        }
        prev_kind = token.kind.clone();
        out.push(token);
    }

    if !matches!(out.last().map(|t| &t.kind), Some(TokenKind::Eol) | None) {
        let offset = out.last().map_or(0, |t| t.span.end);
        out.push(Token { kind: TokenKind::Eol, span: Span::new(offset, offset) });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;

    fn kinds(source: &str) -> Vec<TokenKind> {
        infer_eols(lex(source).unwrap()).into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn newline_between_two_statements_becomes_eol() {
        let tokens = kinds("let x = 1\nlet y = 2");
        assert!(tokens.contains(&TokenKind::Eol));
    }

    #[test]
    fn newline_inside_brackets_is_dropped() {
        let tokens = kinds("[1,\n2]");
        // Exactly the trailing sentinel Eol, none injected inside the brackets.
        assert_eq!(tokens.iter().filter(|k| **k == TokenKind::Eol).count(), 1);
    }

    #[test]
    fn trailing_eol_is_always_appended() {
        let tokens = kinds("1");
        assert_eq!(tokens.last(), Some(&TokenKind::Eol));
    }
}
