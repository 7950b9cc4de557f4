//! Recursive-descent/precedence-climbing parser producing `livy_ast::Expr`
//! from a token stream (`spec.md` §1, §3.1). Explicitly out of scope for the
//! core, kept intentionally small: no error recovery, one pass, no
//! incremental reparse.

use livy_ast::{Expr, Literal, NodeId, NodeIdGen, VectorKind};
use livy_source::Span;

use crate::lexer::{lex, LexError, Token, TokenKind};

/// Failure parsing a token stream into an `Expr`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("{0}")]
    Lex(#[from] LexError),
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },
    #[error("expected {expected} at byte {found_at}, found {found:?}")]
    Unexpected { expected: &'static str, found: TokenKind, found_at: usize },
}

/// Parses a complete program: a non-empty sequence of `;`/inferred-EOL
/// separated top-level expressions, wrapped in one `Block`.
///
/// # Errors
///
/// See [`ParseError`].
pub fn parse(source: &str) -> Result<Expr, ParseError> {
    let tokens = lex(source)?;
    let mut parser = Parser { tokens, pos: 0, ids: NodeIdGen::new() };
    parser.parse_program()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    ids: NodeIdGen,
}

impl Parser {
    fn peek(&self) -> &TokenKind {
        self.tokens.get(self.pos).map_or(&TokenKind::Eol, |t| &t.kind)
    }

    fn peek_span(&self) -> Span { self.tokens.get(self.pos).map_or_else(Span::default, |t| t.span) }

    fn at_end(&self) -> bool { self.pos >= self.tokens.len() }

    fn advance(&mut self) -> TokenKind {
        let token = self.tokens[self.pos].kind.clone();
        self.pos += 1;
        token
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Eol | TokenKind::Semicolon) {
            self.pos += 1;
        }
    }

    fn expect(&mut self, expected: &'static str, matches_kind: impl Fn(&TokenKind) -> bool) -> Result<TokenKind, ParseError> {
        if self.at_end() {
            return Err(ParseError::UnexpectedEof { expected });
        }
        let span = self.peek_span();
        if matches_kind(self.peek()) {
            Ok(self.advance())
        } else {
            Err(ParseError::Unexpected { expected, found: self.peek().clone(), found_at: span.start })
        }
    }

    fn parse_program(&mut self) -> Result<Expr, ParseError> {
        self.skip_separators();
        let start = self.peek_span();
        let mut elements = Vec::new();
        while !self.at_end() {
            elements.push(self.parse_expr()?);
            self.skip_separators();
        }
        if elements.is_empty() {
            elements.push(Expr::Vector(self.ids.next(), start, VectorKind::Tuple, Vec::new()));
        }
        let end = elements.last().expect("just ensured non-empty").span();
        Ok(Expr::Block(self.ids.next(), start.merge(&end), elements))
    }

    fn parse_expr(&mut self) -> Result<Expr, ParseError> { self.parse_equality() }

    fn parse_equality(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;
        while matches!(self.peek(), TokenKind::Equal) {
            self.advance();
            let right = self.parse_comparison()?;
            left = self.binary_call("=", left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        loop {
            let op = match self.peek() {
                TokenKind::Less => "<",
                TokenKind::Greater => ">",
                TokenKind::Join => "<>",
                _ => break,
            };
            self.advance();
            let right = self.parse_additive()?;
            left = self.binary_call(op, left, right);
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.peek() {
                TokenKind::Plus => "+",
                TokenKind::Minus => "-",
                _ => break,
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary_call(op, left, right);
        }
        Ok(left)
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_exponential()?;
        loop {
            let op = match self.peek() {
                TokenKind::Star => "*",
                TokenKind::Slash => "/",
                TokenKind::Percent => "%",
                _ => break,
            };
            self.advance();
            let right = self.parse_exponential()?;
            left = self.binary_call(op, left, right);
        }
        Ok(left)
    }

    /// Right-associative, per the usual convention for exponentiation.
    fn parse_exponential(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_unary()?;
        if matches!(self.peek(), TokenKind::Caret) {
            self.advance();
            let right = self.parse_exponential()?;
            Ok(self.binary_call("^", left, right))
        } else {
            Ok(left)
        }
    }

    /// Both `-x` and `~x` are the surface spellings of the single unary
    /// native operator, whose name (and the identifier it's bound under in
    /// scope) is `~` — see `spec.md` §8 scenario S4's recovered reference
    /// parse of `21 ^ -2`.
    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        if matches!(self.peek(), TokenKind::Minus | TokenKind::Tilde) {
            let start = self.peek_span();
            self.advance();
            let operand = self.parse_unary()?;
            let op_name = self.name_ref("~", start);
            let id = self.ids.next();
            let span = start.merge(&operand.span());
            return Ok(Expr::FuncCall {
                id,
                span,
                caller: Box::new(op_name),
                callee: Box::new(operand),
            });
        }
        self.parse_postfix()
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while matches!(self.peek(), TokenKind::LParen) {
            let args = self.parse_paren_args()?;
            expr = self.apply(expr, args);
        }
        Ok(expr)
    }

    /// `f(a, b, c)` desugars to left-nested `FuncCall`s (`spec.md` §3.1).
    fn apply(&mut self, func: Expr, args: Vec<Expr>) -> Expr {
        args.into_iter().fold(func, |caller, callee| {
            let span = caller.span().merge(&callee.span());
            Expr::FuncCall { id: self.ids.next(), span, caller: Box::new(caller), callee: Box::new(callee) }
        })
    }

    fn parse_paren_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect("(", |k| matches!(k, TokenKind::LParen))?;
        let mut args = Vec::new();
        if !matches!(self.peek(), TokenKind::RParen) {
            args.push(self.parse_expr()?);
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                if matches!(self.peek(), TokenKind::RParen) {
                    break;
                }
                args.push(self.parse_expr()?);
            }
        }
        self.expect(")", |k| matches!(k, TokenKind::RParen))?;
        Ok(args)
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        match self.peek().clone() {
            TokenKind::Int(n) => {
                self.advance();
                Ok(Expr::Scalar(self.ids.next(), span, Literal::Int(n)))
            }
            TokenKind::Float(f) => {
                self.advance();
                Ok(Expr::Scalar(self.ids.next(), span, Literal::Float(f)))
            }
            TokenKind::String(s) => {
                self.advance();
                Ok(Expr::Scalar(self.ids.next(), span, Literal::String(s)))
            }
            TokenKind::True => {
                self.advance();
                Ok(Expr::Scalar(self.ids.next(), span, Literal::Bool(true)))
            }
            TokenKind::False => {
                self.advance();
                Ok(Expr::Scalar(self.ids.next(), span, Literal::Bool(false)))
            }
            TokenKind::Name(text) => {
                self.advance();
                Ok(Expr::Name(self.ids.next(), span, text, None))
            }
            TokenKind::LParen => self.parse_paren_expr(),
            TokenKind::LBracket => self.parse_list(),
            TokenKind::Backslash => self.parse_lambda(),
            TokenKind::If => self.parse_if(),
            TokenKind::Let => self.parse_let(),
            other => Err(ParseError::Unexpected { expected: "an expression", found: other, found_at: span.start }),
        }
    }

    /// `()` is unit, `(e)` is grouping, `(e,)` is a singleton tuple, `(e1,
    /// e2, ...)` is a tuple (`spec.md` §8 scenario S5).
    fn parse_paren_expr(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        self.advance();
        if matches!(self.peek(), TokenKind::RParen) {
            let end = self.peek_span();
            self.advance();
            return Ok(Expr::Vector(self.ids.next(), start.merge(&end), VectorKind::Tuple, Vec::new()));
        }

        let first = self.parse_expr()?;
        if matches!(self.peek(), TokenKind::RParen) {
            self.advance();
            return Ok(first);
        }

        let mut elements = vec![first];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            if matches!(self.peek(), TokenKind::RParen) {
                break;
            }
            elements.push(self.parse_expr()?);
        }
        let end = self.peek_span();
        self.expect(")", |k| matches!(k, TokenKind::RParen))?;
        Ok(Expr::Vector(self.ids.next(), start.merge(&end), VectorKind::Tuple, elements))
    }

    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        self.advance();
        let mut elements = Vec::new();
        if !matches!(self.peek(), TokenKind::RBracket) {
            elements.push(self.parse_expr()?);
            while matches!(self.peek(), TokenKind::Comma) {
                self.advance();
                if matches!(self.peek(), TokenKind::RBracket) {
                    break;
                }
                elements.push(self.parse_expr()?);
            }
        }
        let end = self.peek_span();
        self.expect("]", |k| matches!(k, TokenKind::RBracket))?;
        Ok(Expr::Vector(self.ids.next(), start.merge(&end), VectorKind::List, elements))
    }

    /// `\x, y, z -> body` desugars into right-nested single-parameter
    /// `Function`s (`spec.md` §3.1).
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        self.advance();
        let mut params = vec![self.parse_name_binding()?];
        while matches!(self.peek(), TokenKind::Comma) {
            self.advance();
            params.push(self.parse_name_binding()?);
        }
        self.expect("->", |k| matches!(k, TokenKind::Arrow))?;
        let body = self.parse_expr()?;
        let end = body.span();
        Ok(params.into_iter().rev().fold(body, |body, param| {
            Expr::Function { id: self.ids.next(), span: start.merge(&end), param: Box::new(param), body: Box::new(body) }
        }))
    }

    fn parse_name_binding(&mut self) -> Result<Expr, ParseError> {
        let span = self.peek_span();
        match self.expect("a parameter name", |k| matches!(k, TokenKind::Name(_)))? {
            TokenKind::Name(text) => Ok(Expr::Name(self.ids.next(), span, text, None)),
            _ => unreachable!("expect() already checked this is a Name"),
        }
    }

    fn parse_if(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        self.advance();
        let pred = self.parse_expr()?;
        self.expect("then", |k| matches!(k, TokenKind::Then))?;
        let cons = self.parse_expr()?;
        self.expect("else", |k| matches!(k, TokenKind::Else))?;
        let else_ = self.parse_expr()?;
        let span = start.merge(&else_.span());
        Ok(Expr::Cond { id: self.ids.next(), span, pred: Box::new(pred), cons: Box::new(cons), else_: Box::new(else_) })
    }

    /// `let name(params) = value` is sugar for `let name = \params -> value`
    /// (`spec.md` §8 scenario grounded in the recovered `let xor(a, b) = ...`
    /// fixture). `in body` makes this a scoped binding; its absence leaves
    /// `body` `None`, extending the definition's scope to the rest of the
    /// enclosing block.
    fn parse_let(&mut self) -> Result<Expr, ParseError> {
        let start = self.peek_span();
        self.advance();
        let target = self.parse_name_binding()?;

        let value = if matches!(self.peek(), TokenKind::LParen) {
            let params_start = self.peek_span();
            self.advance();
            let mut params = Vec::new();
            if !matches!(self.peek(), TokenKind::RParen) {
                params.push(self.parse_name_binding()?);
                while matches!(self.peek(), TokenKind::Comma) {
                    self.advance();
                    params.push(self.parse_name_binding()?);
                }
            }
            self.expect(")", |k| matches!(k, TokenKind::RParen))?;
            self.expect("=", |k| matches!(k, TokenKind::Equal))?;
            let body = self.parse_expr()?;
            let span = params_start.merge(&body.span());
            params.into_iter().rev().fold(body, |body, param| {
                Expr::Function { id: self.ids.next(), span, param: Box::new(param), body: Box::new(body) }
            })
        } else {
            self.expect("=", |k| matches!(k, TokenKind::Equal))?;
            self.parse_expr()?
        };

        let body = if matches!(self.peek(), TokenKind::In) {
            self.advance();
            Some(Box::new(self.parse_expr()?))
        } else {
            None
        };

        let end = body.as_ref().map_or_else(|| value.span(), |b| b.span());
        Ok(Expr::Define { id: self.ids.next(), span: start.merge(&end), target: Box::new(target), value: Box::new(value), body })
    }

    /// `left OP right` desugars into `FuncCall(FuncCall(Name(OP), left),
    /// right)` (`spec.md` §8's recovered reference parse for `+`).
    fn binary_call(&mut self, op: &str, left: Expr, right: Expr) -> Expr {
        let left_span = left.span();
        let op_name = self.name_ref(op, left_span);
        let partial =
            Expr::FuncCall { id: self.ids.next(), span: left_span, caller: Box::new(op_name), callee: Box::new(left) };
        let span = left_span.merge(&right.span());
        Expr::FuncCall { id: self.ids.next(), span, caller: Box::new(partial), callee: Box::new(right) }
    }

    fn name_ref(&mut self, text: &str, span: Span) -> Expr {
        Expr::Name(self.ids.next(), span, text.to_string(), None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unwrap_single(expr: Expr) -> Expr {
        match expr {
            Expr::Block(_, _, mut elements) if elements.len() == 1 => elements.remove(0),
            other => other,
        }
    }

    #[test]
    fn integer_literal_parses() {
        let expr = unwrap_single(parse("42").unwrap());
        assert!(matches!(expr, Expr::Scalar(_, _, Literal::Int(42))));
    }

    #[test]
    fn binary_operator_desugars_to_nested_calls_on_the_operator_name() {
        // "Hello " + "World" -> FuncCall(FuncCall(Name("+"), "Hello "), "World")
        let expr = unwrap_single(parse(r#""Hello " + "World""#).unwrap());
        let Expr::FuncCall { caller, callee, .. } = expr else { panic!("expected FuncCall") };
        assert!(matches!(*callee, Expr::Scalar(_, _, Literal::String(ref s)) if s == "World"));
        let Expr::FuncCall { caller: inner_caller, callee: inner_callee, .. } = *caller else {
            panic!("expected nested FuncCall")
        };
        assert!(matches!(*inner_caller, Expr::Name(_, _, ref n, _) if n == "+"));
        assert!(matches!(*inner_callee, Expr::Scalar(_, _, Literal::String(ref s)) if s == "Hello "));
    }

    #[test]
    fn prefix_minus_calls_the_tilde_operator() {
        // 21 ^ -2
        let expr = unwrap_single(parse("21 ^ -2").unwrap());
        let Expr::FuncCall { caller, callee, .. } = expr else { panic!("expected FuncCall") };
        assert!(matches!(*caller, Expr::FuncCall { .. }));
        let Expr::FuncCall { caller: tilde, callee: operand, .. } = *callee else { panic!("expected ~ call") };
        assert!(matches!(*tilde, Expr::Name(_, _, ref n, _) if n == "~"));
        assert!(matches!(*operand, Expr::Scalar(_, _, Literal::Int(2))));
    }

    #[test]
    fn multi_arg_call_desugars_to_left_nested_func_calls() {
        let expr = unwrap_single(parse("f(1, 2)").unwrap());
        let Expr::FuncCall { caller, callee, .. } = expr else { panic!("expected FuncCall") };
        assert!(matches!(*callee, Expr::Scalar(_, _, Literal::Int(2))));
        let Expr::FuncCall { caller: inner_caller, callee: inner_callee, .. } = *caller else {
            panic!("expected nested FuncCall")
        };
        assert!(matches!(*inner_caller, Expr::Name(_, _, ref n, _) if n == "f"));
        assert!(matches!(*inner_callee, Expr::Scalar(_, _, Literal::Int(1))));
    }

    #[test]
    fn curried_lambda_desugars_into_nested_functions() {
        let expr = unwrap_single(parse(r"\x, y -> x").unwrap());
        let Expr::Function { param, body, .. } = expr else { panic!("expected Function") };
        assert!(matches!(*param, Expr::Name(_, _, ref n, _) if n == "x"));
        let Expr::Function { param: inner_param, .. } = *body else { panic!("expected nested Function") };
        assert!(matches!(*inner_param, Expr::Name(_, _, ref n, _) if n == "y"));
    }

    #[test]
    fn let_with_params_desugars_to_a_function_value() {
        let expr = unwrap_single(parse("let xor(a, b) = a").unwrap());
        let Expr::Define { target, value, body, .. } = expr else { panic!("expected Define") };
        assert!(matches!(*target, Expr::Name(_, _, ref n, _) if n == "xor"));
        assert!(body.is_none());
        assert!(matches!(*value, Expr::Function { .. }));
    }

    #[test]
    fn let_in_produces_an_inline_body() {
        let expr = unwrap_single(parse("let x = 1 in x").unwrap());
        let Expr::Define { body, .. } = expr else { panic!("expected Define") };
        assert!(body.is_some());
    }

    #[test]
    fn empty_parens_is_unit() {
        let expr = unwrap_single(parse("()").unwrap());
        assert!(matches!(expr, Expr::Vector(_, _, VectorKind::Tuple, ref elements) if elements.is_empty()));
    }

    #[test]
    fn singleton_tuple_keeps_its_trailing_comma_marker() {
        let expr = unwrap_single(parse("(3.142,)").unwrap());
        assert!(matches!(expr, Expr::Vector(_, _, VectorKind::Tuple, ref elements) if elements.len() == 1));
    }

    #[test]
    fn parenthesized_single_expression_is_grouping_not_a_tuple() {
        let expr = unwrap_single(parse("(True)").unwrap());
        assert!(matches!(expr, Expr::Scalar(_, _, Literal::Bool(true))));
    }

    #[test]
    fn if_then_else_parses_all_three_branches() {
        let expr = unwrap_single(parse("if True then 1 else 2").unwrap());
        assert!(matches!(expr, Expr::Cond { .. }));
    }

    #[test]
    fn newline_separated_statements_form_a_multi_element_block() {
        let expr = parse("let x = 1\nlet y = 2\nx").unwrap();
        let Expr::Block(_, _, elements) = expr else { panic!("expected Block") };
        assert_eq!(elements.len(), 3);
    }
}
