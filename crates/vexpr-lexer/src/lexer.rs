//! On-demand tokenizer: produces one token per call, never buffering.
//!
//! Features:
//! - `strtod`-style numeric literals, with overflow/underflow reported
//!   instead of clamped
//! - Greedy two-character operators (`<<`, `>>`, `<=`, `>=`, `==`, `!=`,
//!   `&&`, `||`)
//! - `+` and `-` are always operators, never sign prefixes
//! - Builtin call prefixes `name(` recognised against a [`FunctionTable`]
//! - Variable references and nested host literals (`{...}`, `"..."`,
//!   `[...]`) resolved through a [`VariableResolver`]

use vexpr_types::{ArithmeticFault, EvalError, EvalResult, VariableResolver, Vector};

use crate::token::{Operator, Token};

/// Lookup of builtin function names, so the tokenizer can tell a call
/// `sum(v)` from a host reference `v(1:3)`.
pub trait FunctionTable {
    /// Returns `true` if `name` is a builtin function.
    fn is_function(&self, name: &str) -> bool;
}

/// The vexpr tokenizer.
///
/// Holds the unconsumed input and advances monotonically left to right.
pub struct Tokenizer<'src, 'env> {
    /// The full expression text.
    source: &'src str,
    /// Current byte offset into `source`.
    pos: usize,
    /// Host collaborator for variable references and nested literals.
    resolver: &'env dyn VariableResolver,
    /// Builtin function names.
    functions: &'env dyn FunctionTable,
}

impl<'src, 'env> Tokenizer<'src, 'env> {
    /// Create a tokenizer positioned at the start of `source`.
    pub fn new(
        source: &'src str,
        resolver: &'env dyn VariableResolver,
        functions: &'env dyn FunctionTable,
    ) -> Self {
        Self {
            source,
            pos: 0,
            resolver,
            functions,
        }
    }

    /// Byte offset of the next unconsumed character.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The unconsumed input.
    pub fn remaining(&self) -> &'src str {
        &self.source[self.pos..]
    }

    // ─────────────────────────────────────────────────────────────
    // Character-level helpers
    // ─────────────────────────────────────────────────────────────

    fn peek(&self) -> Option<u8> {
        self.source.as_bytes().get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(self.pos + offset).copied()
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_ascii_whitespace() {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Consume `len` bytes and return `token`.
    fn emit(&mut self, len: usize, token: Token) -> EvalResult<Token> {
        self.pos += len;
        Ok(token)
    }

    // ─────────────────────────────────────────────────────────────
    // Scanning
    // ─────────────────────────────────────────────────────────────

    /// Scan exactly one token and advance past it.
    pub fn next_token(&mut self) -> EvalResult<Token> {
        self.skip_whitespace();

        let Some(ch) = self.peek() else {
            return Ok(Token::End);
        };

        // Numbers first, but never with a sign: `-` and `+` are operators.
        if ch != b'+' && ch != b'-' {
            if let Some(scanned) = scan_number(self.remaining()) {
                let (value, len) = scanned?;
                return self.emit(len, Token::Value(Vector::scalar(value)));
            }
        }

        let next = self.peek_at(1);
        match ch {
            b'(' => self.emit(1, Token::OpenParen),
            b')' => self.emit(1, Token::CloseParen),
            b',' => self.emit(1, Token::Comma),

            b'+' => self.emit(1, Token::Op(Operator::Add)),
            b'-' => self.emit(1, Token::Op(Operator::Sub)),
            b'*' => self.emit(1, Token::Op(Operator::Mul)),
            b'/' => self.emit(1, Token::Op(Operator::Div)),
            b'%' => self.emit(1, Token::Op(Operator::Mod)),
            b'^' => self.emit(1, Token::Op(Operator::Pow)),

            b'<' => match next {
                Some(b'<') => self.emit(2, Token::Op(Operator::ShiftLeft)),
                Some(b'=') => self.emit(2, Token::Op(Operator::LessEq)),
                _ => self.emit(1, Token::Op(Operator::Less)),
            },
            b'>' => match next {
                Some(b'>') => self.emit(2, Token::Op(Operator::ShiftRight)),
                Some(b'=') => self.emit(2, Token::Op(Operator::GreaterEq)),
                _ => self.emit(1, Token::Op(Operator::Greater)),
            },
            b'=' if next == Some(b'=') => self.emit(2, Token::Op(Operator::Eq)),
            b'!' => match next {
                Some(b'=') => self.emit(2, Token::Op(Operator::NotEq)),
                _ => self.emit(1, Token::Op(Operator::Not)),
            },
            b'&' if next == Some(b'&') => self.emit(2, Token::Op(Operator::And)),
            b'|' if next == Some(b'|') => self.emit(2, Token::Op(Operator::Or)),

            b'{' | b'"' | b'[' => self.scan_nested_literal(ch as char),

            b'$' | b'_' | b'a'..=b'z' | b'A'..=b'Z' => self.scan_reference(),

            _ => {
                let unknown = self.remaining().chars().next().unwrap_or('?');
                self.emit(unknown.len_utf8(), Token::Unknown(unknown))
            }
        }
    }

    /// Scan an identifier and turn it into a call prefix or a resolved
    /// variable reference.
    fn scan_reference(&mut self) -> EvalResult<Token> {
        let rest = self.remaining();
        let Some(len) = identifier_len(rest) else {
            // A bare `$` with no name after it.
            return self.emit(1, Token::Unknown('$'));
        };
        let name = &rest[..len];

        if rest.as_bytes().get(len) != Some(&b'(') {
            let vector = self
                .resolver
                .resolve_variable(name)
                .ok_or_else(|| EvalError::unknown_variable(name))?;
            return self.emit(len, Token::Value(vector));
        }

        if self.functions.is_function(name) {
            return self.emit(len + 1, Token::Call(name.to_string()));
        }

        // `name(...)` that is not a builtin: hand the whole reference,
        // suffix included, to the host.
        let close = matching_paren(&rest[len + 1..])
            .ok_or_else(|| EvalError::syntax("unmatched parentheses"))?;
        let reference = &rest[..len + 1 + close + 1];
        let vector = self
            .resolver
            .resolve_variable(reference)
            .ok_or_else(|| EvalError::unknown_function(name))?;
        self.emit(reference.len(), Token::Value(vector))
    }

    /// Delegate `{...}`, `"..."` or `[...]` to the host, then read the
    /// literal text as a number, a list of numbers, or a reference.
    fn scan_nested_literal(&mut self, open: char) -> EvalResult<Token> {
        let rest = &self.remaining()[1..];
        let (literal, remaining) = self.resolver.parse_nested_literal(open, rest)?;
        if remaining.len() > rest.len() {
            return Err(EvalError::syntax("nested literal overran the expression"));
        }
        self.pos = self.source.len() - remaining.len();
        self.literal_value(literal.trim()).map(Token::Value)
    }

    fn literal_value(&self, text: &str) -> EvalResult<Vector> {
        let mut values = Vec::new();
        let mut all_numbers = true;
        for word in text
            .split(|c: char| c == ',' || c.is_ascii_whitespace())
            .filter(|w| !w.is_empty())
        {
            // Inside a list, a sign belongs to the element.
            let (negative, digits) = match word.as_bytes()[0] {
                b'-' => (true, &word[1..]),
                b'+' => (false, &word[1..]),
                _ => (false, word),
            };
            match scan_number(digits) {
                Some(scanned) => {
                    let (value, len) = scanned?;
                    if len != digits.len() {
                        all_numbers = false;
                        break;
                    }
                    values.push(if negative { -value } else { value });
                }
                None => {
                    all_numbers = false;
                    break;
                }
            }
        }
        if all_numbers {
            return Ok(Vector::new(values));
        }
        self.resolver
            .resolve_variable(text)
            .ok_or_else(|| EvalError::unknown_variable(text))
    }
}

// ─────────────────────────────────────────────────────────────────────
// Lexeme helpers
// ─────────────────────────────────────────────────────────────────────

/// Scan a `strtod`-style decimal literal at the start of `text`.
///
/// Returns `None` if `text` does not start with a number, otherwise the
/// value and the byte length consumed. A literal too large for `f64` is
/// an overflow; one with non-zero digits that rounds to zero (or to a
/// subnormal) is an underflow.
pub fn scan_number(text: &str) -> Option<EvalResult<(f64, usize)>> {
    let bytes = text.as_bytes();
    let mut len = 0;
    let mut digits = 0;
    let mut nonzero = false;

    while let Some(&b) = bytes.get(len) {
        if !b.is_ascii_digit() {
            break;
        }
        nonzero |= b != b'0';
        digits += 1;
        len += 1;
    }
    if bytes.get(len) == Some(&b'.') {
        len += 1;
        while let Some(&b) = bytes.get(len) {
            if !b.is_ascii_digit() {
                break;
            }
            nonzero |= b != b'0';
            digits += 1;
            len += 1;
        }
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts if at least one digit follows it.
    if matches!(bytes.get(len), Some(b'e' | b'E')) {
        let mut exp_len = len + 1;
        if matches!(bytes.get(exp_len), Some(b'+' | b'-')) {
            exp_len += 1;
        }
        if bytes.get(exp_len).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_len).is_some_and(u8::is_ascii_digit) {
                exp_len += 1;
            }
            len = exp_len;
        }
    }

    let value: f64 = match text[..len].parse() {
        Ok(value) => value,
        Err(_) => return Some(Err(EvalError::syntax(format!("bad number \"{}\"", &text[..len])))),
    };
    if value.is_infinite() {
        return Some(Err(ArithmeticFault::Overflow.into()));
    }
    if nonzero && (value == 0.0 || value.is_subnormal()) {
        return Some(Err(ArithmeticFault::Underflow.into()));
    }
    Some(Ok((value, len)))
}

/// Length of the identifier at the start of `text`: an optional `$` sigil,
/// then `[A-Za-z_]`, then `[A-Za-z0-9_.:]*`.
fn identifier_len(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    let start = usize::from(bytes.first() == Some(&b'$'));
    match bytes.get(start) {
        Some(b) if b.is_ascii_alphabetic() || *b == b'_' => {}
        _ => return None,
    }
    let mut len = start + 1;
    while let Some(&b) = bytes.get(len) {
        if b.is_ascii_alphanumeric() || matches!(b, b'_' | b'.' | b':') {
            len += 1;
        } else {
            break;
        }
    }
    Some(len)
}

/// Offset of the `)` closing a group whose `(` has already been consumed.
fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 1usize;
    for (i, b) in text.bytes().enumerate() {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_number_forms() {
        assert_eq!(scan_number("42").unwrap().unwrap(), (42.0, 2));
        assert_eq!(scan_number("3.25+1").unwrap().unwrap(), (3.25, 4));
        assert_eq!(scan_number(".5").unwrap().unwrap(), (0.5, 2));
        assert_eq!(scan_number("7.").unwrap().unwrap(), (7.0, 2));
        assert_eq!(scan_number("1e3").unwrap().unwrap(), (1000.0, 3));
        assert_eq!(scan_number("2.5E-1").unwrap().unwrap(), (0.25, 6));
    }

    #[test]
    fn test_scan_number_dangling_exponent_not_consumed() {
        assert_eq!(scan_number("2e").unwrap().unwrap(), (2.0, 1));
        assert_eq!(scan_number("2e+x").unwrap().unwrap(), (2.0, 1));
    }

    #[test]
    fn test_scan_number_rejects_non_numbers() {
        assert!(scan_number("x1").is_none());
        assert!(scan_number(".").is_none());
        assert!(scan_number("-1").is_none());
        assert!(scan_number("").is_none());
    }

    #[test]
    fn test_scan_number_range_errors() {
        assert_eq!(
            scan_number("1e999").unwrap(),
            Err(EvalError::Arithmetic(ArithmeticFault::Overflow))
        );
        assert_eq!(
            scan_number("1e-999").unwrap(),
            Err(EvalError::Arithmetic(ArithmeticFault::Underflow))
        );
        // All-zero mantissa is a genuine zero.
        assert_eq!(scan_number("0e-999").unwrap().unwrap(), (0.0, 6));
    }

    #[test]
    fn test_identifier_len() {
        assert_eq!(identifier_len("abc+1"), Some(3));
        assert_eq!(identifier_len("$x2 "), Some(3));
        assert_eq!(identifier_len("ns::v.y)"), Some(7));
        assert_eq!(identifier_len("_"), Some(1));
        assert_eq!(identifier_len("$"), None);
        assert_eq!(identifier_len("9a"), None);
    }

    #[test]
    fn test_matching_paren() {
        assert_eq!(matching_paren("1:3) + 2"), Some(3));
        assert_eq!(matching_paren("(a)b)"), Some(4));
        assert_eq!(matching_paren("1:3"), None);
    }
}
