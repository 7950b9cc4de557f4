//! Escape-sequence expansion for string literals (`spec.md` §4.1).

use livy_ast::{Expr, Literal, VectorKind};

const SPECIAL: &[(&str, char)] = &[
    ("\\a", '\u{7}'),
    ("\\b", '\u{8}'),
    ("\\f", '\u{c}'),
    ("\\n", '\n'),
    ("\\r", '\r'),
    ("\\v", '\u{b}'),
    ("\\t", '\t'),
    ("\\'", '\''),
    ("\\\"", '"'),
    ("\\\\", '\\'),
];

/// Rewrites every string `Scalar` in `expr`, expanding its escape sequences.
/// All other nodes pass through structurally unchanged.
#[must_use]
pub fn expand_strings(expr: &Expr) -> Expr {
    match expr {
        Expr::Scalar(id, span, Literal::String(text)) => {
            Expr::Scalar(*id, *span, Literal::String(expand_string(text)))
        }
        Expr::Scalar(..) | Expr::Name(..) => expr.clone(),

        Expr::Vector(id, span, kind, elements) => {
            Expr::Vector(*id, *span, *kind, elements.iter().map(expand_strings).collect())
        }

        Expr::Cond { id, span, pred, cons, else_ } => Expr::Cond {
            id: *id,
            span: *span,
            pred: Box::new(expand_strings(pred)),
            cons: Box::new(expand_strings(cons)),
            else_: Box::new(expand_strings(else_)),
        },

        Expr::Function { id, span, param, body } => Expr::Function {
            id: *id,
            span: *span,
            param: Box::new(expand_strings(param)),
            body: Box::new(expand_strings(body)),
        },

        Expr::FuncCall { id, span, caller, callee } => Expr::FuncCall {
            id: *id,
            span: *span,
            caller: Box::new(expand_strings(caller)),
            callee: Box::new(expand_strings(callee)),
        },

        Expr::Define { id, span, target, value, body } => Expr::Define {
            id: *id,
            span: *span,
            target: Box::new(expand_strings(target)),
            value: Box::new(expand_strings(value)),
            body: body.as_ref().map(|body| Box::new(expand_strings(body))),
        },

        Expr::Block(id, span, elements) => {
            Expr::Block(*id, *span, elements.iter().map(expand_strings).collect())
        }
    }
}

/// Expands the escapes inside a single string's contents.
#[must_use]
pub fn expand_string(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '\\' {
            out.push(chars[i]);
            i += 1;
            continue;
        }
        if let Some(consumed) = try_expand_at(&chars, i, &mut out) {
            i += consumed;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    if out != text {
        log::trace!("expanded escapes in string literal of length {}", text.len());
    }
    out
}

/// Tries to expand the escape sequence starting at `chars[i]` (which is
/// `\\`). Returns the number of `char`s consumed, or `None` if this is not a
/// recognized escape (left verbatim, per `spec.md` §4.1).
fn try_expand_at(chars: &[char], i: usize, out: &mut String) -> Option<usize> {
    if chars.get(i + 1) == Some(&'/') {
        out.push(std::path::MAIN_SEPARATOR);
        return Some(2);
    }
    for (escape, replacement) in SPECIAL {
        let esc_chars: Vec<char> = escape.chars().collect();
        if chars[i..].starts_with(&esc_chars[..]) {
            out.push(*replacement);
            return Some(esc_chars.len());
        }
    }
    // `\xx` (bare two hex digits), `\uxxxx`, `\Uxxxxxx` — a marker letter
    // selects the four- and six-digit forms; the two-digit form has none.
    if chars.get(i + 1) == Some(&'u') {
        return push_hex_digits(chars, i + 2, 4, out).map(|width| 2 + width);
    }
    if chars.get(i + 1) == Some(&'U') {
        return push_hex_digits(chars, i + 2, 6, out).map(|width| 2 + width);
    }
    push_hex_digits(chars, i + 1, 2, out).map(|width| 1 + width)
}

/// Reads `width` ASCII hex digits starting at `start`, pushes the
/// corresponding code point to `out`, and returns `width` on success.
fn push_hex_digits(chars: &[char], start: usize, width: usize, out: &mut String) -> Option<usize> {
    let digits = chars.get(start..start + width)?;
    if !digits.iter().all(char::is_ascii_hexdigit) {
        return None;
    }
    let text: String = digits.iter().collect();
    let code = u32::from_str_radix(&text, 16).ok()?;
    out.push(char::from_u32(code)?);
    Some(width)
}
