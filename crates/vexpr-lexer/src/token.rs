//! Token types for the vexpr tokenizer.
//!
//! Defines [`Operator`], which carries each operator's binding precedence,
//! and [`Token`], the single lexeme handed to the evaluator at a time.

use std::fmt;
use vexpr_types::Vector;

/// Precedence of the outermost sub-expression. Every binary operator binds
/// tighter than this.
pub const LOWEST_PRECEDENCE: u8 = 0;

/// Precedence of the unary `-` and `!` operators. Strictly above every
/// binary operator, so a unary operand never absorbs a binary operation.
pub const UNARY_PRECEDENCE: u8 = 9;

// ─────────────────────────────────────────────────────────────────────
// Operator
// ─────────────────────────────────────────────────────────────────────

/// Every operator the tokenizer recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `||`
    Or,
    /// `&&`
    And,
    /// `==`
    Eq,
    /// `!=`
    NotEq,
    /// `<`
    Less,
    /// `>`
    Greater,
    /// `<=`
    LessEq,
    /// `>=`
    GreaterEq,
    /// `<<` (rotate left)
    ShiftLeft,
    /// `>>` (rotate right)
    ShiftRight,
    /// `+`
    Add,
    /// `-` (binary subtraction or unary negation)
    Sub,
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,
    /// `^`
    Pow,
    /// `!` (unary logical not)
    Not,
}

impl Operator {
    /// Binding precedence, low to high:
    ///
    /// | prec | operators              |
    /// |------|------------------------|
    /// | 1    | `\|\|`                 |
    /// | 2    | `&&`                   |
    /// | 3    | `==` `!=`              |
    /// | 4    | `<` `>` `<=` `>=`      |
    /// | 5    | `<<` `>>`              |
    /// | 6    | `+` `-`                |
    /// | 7    | `*` `/` `%`            |
    /// | 8    | `^`                    |
    /// | 9    | unary `-` `!`          |
    pub fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq | Self::NotEq => 3,
            Self::Less | Self::Greater | Self::LessEq | Self::GreaterEq => 4,
            Self::ShiftLeft | Self::ShiftRight => 5,
            Self::Add | Self::Sub => 6,
            Self::Mul | Self::Div | Self::Mod => 7,
            Self::Pow => 8,
            Self::Not => UNARY_PRECEDENCE,
        }
    }

    /// Returns `true` if the operator can join two operands.
    pub fn is_binary(self) -> bool {
        self != Self::Not
    }

    /// Returns `true` if the operator can prefix an operand.
    pub fn is_unary(self) -> bool {
        matches!(self, Self::Sub | Self::Not)
    }

    /// Source text of the operator.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Eq => "==",
            Self::NotEq => "!=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::LessEq => "<=",
            Self::GreaterEq => ">=",
            Self::ShiftLeft => "<<",
            Self::ShiftRight => ">>",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Pow => "^",
            Self::Not => "!",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

// ─────────────────────────────────────────────────────────────────────
// Token
// ─────────────────────────────────────────────────────────────────────

/// A single token produced by the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// A numeric literal, vector literal, or resolved variable reference.
    Value(Vector),
    /// A builtin call prefix `name(`; the `(` has been consumed.
    Call(String),
    /// An operator.
    Op(Operator),
    /// `(`
    OpenParen,
    /// `)`
    CloseParen,
    /// `,`
    Comma,
    /// End of input.
    End,
    /// A character that starts no known token.
    Unknown(char),
}

impl Token {
    /// Returns `true` for the tokens that close an operand sequence:
    /// end of input, `)` and `,`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::End | Self::CloseParen | Self::Comma)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) if v.is_scalar() => write!(f, "{v}"),
            Self::Value(v) => write!(f, "{{{v}}}"),
            Self::Call(name) => write!(f, "{name}("),
            Self::Op(op) => write!(f, "{op}"),
            Self::OpenParen => write!(f, "("),
            Self::CloseParen => write!(f, ")"),
            Self::Comma => write!(f, ","),
            Self::End => write!(f, "end of expression"),
            Self::Unknown(ch) => write!(f, "{ch}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BINARY: &[Operator] = &[
        Operator::Or,
        Operator::And,
        Operator::Eq,
        Operator::NotEq,
        Operator::Less,
        Operator::Greater,
        Operator::LessEq,
        Operator::GreaterEq,
        Operator::ShiftLeft,
        Operator::ShiftRight,
        Operator::Add,
        Operator::Sub,
        Operator::Mul,
        Operator::Div,
        Operator::Mod,
        Operator::Pow,
    ];

    #[test]
    fn test_precedence_order() {
        use Operator::*;
        let ladder = [Or, And, Eq, Less, ShiftLeft, Add, Mul, Pow];
        for pair in ladder.windows(2) {
            assert!(
                pair[0].precedence() < pair[1].precedence(),
                "{} should bind looser than {}",
                pair[0],
                pair[1]
            );
        }
        assert_eq!(Eq.precedence(), NotEq.precedence());
        assert_eq!(Less.precedence(), GreaterEq.precedence());
        assert_eq!(Mul.precedence(), Mod.precedence());
    }

    #[test]
    fn test_unary_binds_tighter_than_every_binary() {
        for op in BINARY {
            assert!(op.precedence() > LOWEST_PRECEDENCE);
            assert!(op.precedence() < UNARY_PRECEDENCE, "{op}");
        }
    }

    #[test]
    fn test_binary_and_unary_sets() {
        assert!(BINARY.iter().all(|op| op.is_binary()));
        assert!(!Operator::Not.is_binary());
        assert!(Operator::Not.is_unary());
        assert!(Operator::Sub.is_unary());
        assert!(!Operator::Add.is_unary());
    }

    #[test]
    fn test_display_operators() {
        assert_eq!(Operator::ShiftLeft.to_string(), "<<");
        assert_eq!(Operator::NotEq.to_string(), "!=");
        assert_eq!(Token::Op(Operator::Pow).to_string(), "^");
    }

    #[test]
    fn test_display_tokens() {
        assert_eq!(Token::Value(Vector::scalar(2.5)).to_string(), "2.5");
        assert_eq!(Token::Value(Vector::new(vec![1.0, 2.0])).to_string(), "{1 2}");
        assert_eq!(Token::Call("sum".into()).to_string(), "sum(");
        assert_eq!(Token::End.to_string(), "end of expression");
        assert_eq!(Token::Unknown('@').to_string(), "@");
    }

    #[test]
    fn test_terminal_tokens() {
        assert!(Token::End.is_terminal());
        assert!(Token::CloseParen.is_terminal());
        assert!(Token::Comma.is_terminal());
        assert!(!Token::OpenParen.is_terminal());
        assert!(!Token::Op(Operator::Add).is_terminal());
    }
}
