//! The host boundary: how the evaluator reaches named vectors.

use std::collections::HashMap;

use crate::{EvalError, EvalResult, Vector};

/// Supplies named vectors to the evaluator.
///
/// The evaluator never holds a reference into host storage: every
/// resolution returns an owned duplicate, so the host may mutate its
/// vectors between (or during) evaluations without corrupting one in
/// flight.
pub trait VariableResolver {
    /// Return a duplicate of the vector named by `name`, or `None` if the
    /// host has no such vector.
    ///
    /// `name` is the reference exactly as written, including a leading
    /// `$` sigil or a trailing `(range)` suffix when present.
    fn resolve_variable(&self, name: &str) -> Option<Vector>;

    /// Split the host's own quoting syntax out of an operand position.
    ///
    /// `open` is the opening delimiter (`{`, `"` or `[`) and `rest` the text
    /// right after it. Returns the literal text and the remaining input
    /// after the closing delimiter.
    fn parse_nested_literal<'a>(&self, open: char, rest: &'a str) -> EvalResult<(String, &'a str)> {
        default_nested_literal(open, rest)
    }
}

/// Nested-literal handling shared by every resolver that does not override
/// [`VariableResolver::parse_nested_literal`].
///
/// Handles brace-depth-matched `{...}` and backslash-escaped `"..."`.
/// Command substitution (`[...]`) needs a host interpreter and is rejected.
pub fn default_nested_literal(open: char, rest: &str) -> EvalResult<(String, &str)> {
    match open {
        '{' => {
            let mut depth = 1usize;
            for (i, ch) in rest.char_indices() {
                match ch {
                    '{' => depth += 1,
                    '}' => {
                        depth -= 1;
                        if depth == 0 {
                            return Ok((rest[..i].to_string(), &rest[i + 1..]));
                        }
                    }
                    _ => {}
                }
            }
            Err(EvalError::syntax("missing close-brace"))
        }
        '"' => {
            let mut literal = String::new();
            let mut escaped = false;
            for (i, ch) in rest.char_indices() {
                if escaped {
                    literal.push(ch);
                    escaped = false;
                    continue;
                }
                match ch {
                    '\\' => escaped = true,
                    '"' => return Ok((literal, &rest[i + 1..])),
                    _ => literal.push(ch),
                }
            }
            Err(EvalError::syntax("missing \""))
        }
        '[' => Err(EvalError::syntax("command substitution is not supported")),
        other => Err(EvalError::syntax(format!("unexpected '{other}'"))),
    }
}

// ─────────────────────────────────────────────────────────────────────
// MapResolver
// ─────────────────────────────────────────────────────────────────────

/// A `HashMap`-backed resolver.
///
/// Accepts `name`, `$name`, and index ranges `name(i)`, `name(a:b)`,
/// `name(a:end)`, `name(a:)`, `name(:b)`. A range resolves to a window
/// over a duplicate of the whole stored buffer.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    vectors: HashMap<String, Vec<f64>>,
}

impl MapResolver {
    /// Create an empty resolver.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, values: Vec<f64>) -> Self {
        self.insert(name, values);
        self
    }

    /// Define or replace a named vector.
    pub fn insert(&mut self, name: impl Into<String>, values: Vec<f64>) {
        self.vectors.insert(name.into(), values);
    }

    /// Remove a named vector, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<f64>> {
        self.vectors.remove(name)
    }

    /// Look up a stored vector without duplicating it.
    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.vectors.get(name).map(Vec::as_slice)
    }

    /// Number of stored vectors.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns `true` if no vectors are stored.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

impl FromIterator<(String, Vec<f64>)> for MapResolver {
    fn from_iter<I: IntoIterator<Item = (String, Vec<f64>)>>(iter: I) -> Self {
        Self {
            vectors: iter.into_iter().collect(),
        }
    }
}

impl VariableResolver for MapResolver {
    fn resolve_variable(&self, name: &str) -> Option<Vector> {
        let name = name.strip_prefix('$').unwrap_or(name);
        let (base, range) = match name.find('(') {
            Some(open) if name.ends_with(')') => (&name[..open], Some(&name[open + 1..name.len() - 1])),
            Some(_) => return None,
            None => (name, None),
        };
        let values = self.vectors.get(base)?.clone();
        match range {
            None => Some(Vector::new(values)),
            Some(range_text) => {
                let (first, last) = parse_range(range_text, values.len())?;
                Vector::with_window(values, first, last)
            }
        }
    }
}

/// Parse `i`, `a:b`, `a:end`, `a:` or `:b` against a buffer of length `len`.
fn parse_range(text: &str, len: usize) -> Option<(usize, usize)> {
    let end = len.checked_sub(1)?;
    let index = |part: &str, default: usize| -> Option<usize> {
        match part.trim() {
            "" => Some(default),
            "end" => Some(end),
            digits => digits.parse().ok(),
        }
    };
    match text.split_once(':') {
        Some((a, b)) => Some((index(a, 0)?, index(b, end)?)),
        None if text.trim().is_empty() => None,
        None => {
            let i = index(text, 0)?;
            Some((i, i))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MapResolver {
        MapResolver::new().with("x", vec![1.0, 2.0, 3.0, 4.0, 5.0])
    }

    #[test]
    fn test_plain_and_sigil_names() {
        let r = resolver();
        assert_eq!(r.resolve_variable("x").unwrap().len(), 5);
        assert_eq!(r.resolve_variable("$x").unwrap().len(), 5);
        assert!(r.resolve_variable("y").is_none());
    }

    #[test]
    fn test_ranges_produce_windows() {
        let r = resolver();
        let v = r.resolve_variable("x(1:3)").unwrap();
        assert_eq!(v.active(), &[2.0, 3.0, 4.0]);
        assert_eq!(v.backing_len(), 5);

        assert_eq!(r.resolve_variable("x(2)").unwrap().active(), &[3.0]);
        assert_eq!(r.resolve_variable("x(3:end)").unwrap().active(), &[4.0, 5.0]);
        assert_eq!(r.resolve_variable("x(3:)").unwrap().active(), &[4.0, 5.0]);
        assert_eq!(r.resolve_variable("x(:1)").unwrap().active(), &[1.0, 2.0]);
    }

    #[test]
    fn test_bad_ranges_are_unresolved() {
        let r = resolver();
        assert!(r.resolve_variable("x(9)").is_none());
        assert!(r.resolve_variable("x(3:1)").is_none());
        assert!(r.resolve_variable("x()").is_none());
        assert!(r.resolve_variable("x(a:b)").is_none());
        assert!(r.resolve_variable("x(1").is_none());
    }

    #[test]
    fn test_resolution_duplicates() {
        let mut r = resolver();
        let v = r.resolve_variable("x").unwrap();
        r.insert("x", vec![0.0]);
        assert_eq!(v.len(), 5);
        assert_eq!(r.get("x"), Some(&[0.0][..]));
    }

    #[test]
    fn test_nested_brace_literal() {
        let (lit, rest) = default_nested_literal('{', "1 {2} 3} + 4").unwrap();
        assert_eq!(lit, "1 {2} 3");
        assert_eq!(rest, " + 4");
    }

    #[test]
    fn test_nested_quote_literal() {
        let (lit, rest) = default_nested_literal('"', r#"a\"b" * 2"#).unwrap();
        assert_eq!(lit, "a\"b");
        assert_eq!(rest, " * 2");
    }

    #[test]
    fn test_nested_literal_errors() {
        assert_eq!(
            default_nested_literal('{', "1 2"),
            Err(EvalError::syntax("missing close-brace"))
        );
        assert_eq!(
            default_nested_literal('"', "abc"),
            Err(EvalError::syntax("missing \""))
        );
        assert!(default_nested_literal('[', "cmd]").is_err());
    }
}
