//! Single-pass precedence-climbing evaluator.
//!
//! Values are computed as the expression is parsed; no syntax tree is
//! built. The parser holds exactly one token of lookahead in `current`.
//!
//! Precedence (lowest → highest):
//! 1. `||`
//! 2. `&&`
//! 3. `==`, `!=`
//! 4. `<`, `>`, `<=`, `>=`
//! 5. `<<`, `>>`
//! 6. `+`, `-`
//! 7. `*`, `/`, `%`
//! 8. `^`
//! 9. unary `-`, `!`
//!
//! All binary operators are left-associative.

use vexpr_lexer::{Token, Tokenizer, LOWEST_PRECEDENCE, UNARY_PRECEDENCE};
use vexpr_types::{EvalError, EvalResult, VariableResolver, Vector};

use crate::broadcast::{apply_unary, combine};
use crate::builtins::{CallContext, FunctionRegistry};
use crate::classify;
use crate::options::EvalOptions;

/// A configured evaluator. Cheap to build; holds no per-expression state.
#[derive(Debug, Clone)]
pub struct Evaluator<'r> {
    options: EvalOptions,
    registry: &'r FunctionRegistry,
}

impl Evaluator<'static> {
    /// Create an evaluator over the global builtin registry.
    pub fn new(options: EvalOptions) -> Self {
        Self {
            options,
            registry: FunctionRegistry::global(),
        }
    }
}

impl Default for Evaluator<'static> {
    fn default() -> Self {
        Self::new(EvalOptions::default())
    }
}

impl<'r> Evaluator<'r> {
    /// Create an evaluator over a caller-owned registry.
    pub fn with_registry(options: EvalOptions, registry: &'r FunctionRegistry) -> Self {
        Self { options, registry }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// Evaluate `expression`, resolving variable references through
    /// `resolver`. Returns the first error encountered.
    pub fn evaluate(
        &self,
        expression: &str,
        resolver: &dyn VariableResolver,
    ) -> EvalResult<Vector> {
        log::debug!("evaluating {expression:?}");

        let mut parser = Parser {
            tokenizer: Tokenizer::new(expression, resolver, self.registry),
            current: Token::End,
            registry: self.registry,
            ctx: CallContext::new(self.options.random_seed),
            depth: 0,
            max_depth: self.options.max_depth,
        };
        parser.advance()?;
        let value = parser.parse_value(LOWEST_PRECEDENCE)?;

        match parser.current {
            Token::End => {}
            Token::CloseParen => return Err(EvalError::syntax("unmatched parentheses")),
            Token::Comma => return Err(EvalError::syntax("unexpected ','")),
            ref other => return Err(EvalError::syntax(format!("unexpected {other}"))),
        }

        if self.options.final_sweep {
            classify::sweep(value.active())?;
        }
        log::debug!("evaluated {expression:?} to {} elements", value.len());
        Ok(value)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Parser state
// ─────────────────────────────────────────────────────────────────────

struct Parser<'src, 'env> {
    tokenizer: Tokenizer<'src, 'env>,
    /// One-token lookahead.
    current: Token,
    registry: &'env FunctionRegistry,
    ctx: CallContext,
    depth: u32,
    max_depth: u32,
}

impl<'src, 'env> Parser<'src, 'env> {
    fn advance(&mut self) -> EvalResult<()> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    /// Parse an operand and every following binary operator that binds
    /// tighter than `min_precedence`.
    ///
    /// On return `current` holds the first token not consumed: a terminal,
    /// or an operator the caller must handle.
    fn parse_value(&mut self, min_precedence: u8) -> EvalResult<Vector> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(EvalError::syntax("expression nested too deeply"));
        }
        let left = self.parse_operand()?;
        let result = self.parse_operators(left, min_precedence)?;
        self.depth -= 1;
        Ok(result)
    }

    // ══════════════════════════════════════════════════════════════════
    // Operands
    // ══════════════════════════════════════════════════════════════════

    fn parse_operand(&mut self) -> EvalResult<Vector> {
        match std::mem::replace(&mut self.current, Token::End) {
            Token::Value(value) => {
                self.advance()?;
                Ok(value)
            }

            Token::OpenParen => {
                self.advance()?;
                let inner = self.parse_value(LOWEST_PRECEDENCE)?;
                if self.current != Token::CloseParen {
                    return Err(EvalError::syntax("unmatched parentheses"));
                }
                self.advance()?;
                Ok(inner)
            }

            Token::Op(op) if op.is_unary() => {
                self.advance()?;
                let operand = self.parse_value(UNARY_PRECEDENCE)?;
                apply_unary(op, operand)
            }

            Token::Call(name) => self.parse_call(&name),

            _ => Err(EvalError::syntax("missing operand")),
        }
    }

    /// `name(arg)`: the tokenizer has already consumed `name(`.
    fn parse_call(&mut self, name: &str) -> EvalResult<Vector> {
        let function = *self
            .registry
            .get(name)
            .ok_or_else(|| EvalError::unknown_function(name))?;

        self.advance()?;
        let arg = self.parse_value(LOWEST_PRECEDENCE)?;
        match self.current {
            Token::CloseParen => {}
            Token::Comma => {
                return Err(EvalError::syntax(format!(
                    "too many arguments for function \"{name}\""
                )))
            }
            _ => return Err(EvalError::syntax("unmatched parentheses")),
        }

        let result = function.invoke(arg, &mut self.ctx)?;
        self.advance()?;
        Ok(result)
    }

    // ══════════════════════════════════════════════════════════════════
    // Operators
    // ══════════════════════════════════════════════════════════════════

    fn parse_operators(&mut self, mut left: Vector, min_precedence: u8) -> EvalResult<Vector> {
        loop {
            let op = match &self.current {
                token if token.is_terminal() => return Ok(left),
                Token::Op(op) if op.is_binary() => *op,
                Token::Op(op) => return Err(EvalError::unknown_operator(op.symbol())),
                Token::Unknown(ch) => return Err(EvalError::unknown_operator(ch.to_string())),
                _ => return Err(EvalError::syntax("missing operator")),
            };
            if op.precedence() <= min_precedence {
                return Ok(left);
            }

            self.advance()?;
            let right = self.parse_value(op.precedence())?;
            left = combine(op, left, right)?;
        }
    }
}
