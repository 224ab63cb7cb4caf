//! Predicate expressions for `where`, `having` and join conditions.
//!
//! # Usage
//!
//! ```
//! use quarry_core::expr::*;
//! use quarry_core::col;
//!
//! // Function style
//! let adults = and([gt(col("age"), 17), is_not_null(col("email"))]);
//!
//! // Operator style
//! let either = eq(col("role"), "admin") | eq(col("role"), "owner");
//! let neither = !either;
//! ```

mod cmp;
mod eval;
mod logical;

use core::fmt;

pub use cmp::*;
pub use logical::*;

pub(crate) use eval::resolve;

use crate::reference::{ColumnRef, ObjectRef};
use crate::value::Value;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub const fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A leaf of a predicate: a column reference or a literal.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(ColumnRef),
    Literal(Value),
}

impl From<ColumnRef> for Operand {
    fn from(column: ColumnRef) -> Self {
        Operand::Column(column)
    }
}

impl From<Value> for Operand {
    fn from(value: Value) -> Self {
        Operand::Literal(value)
    }
}

macro_rules! impl_literal_operand {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for Operand {
                fn from(value: $ty) -> Self {
                    Operand::Literal(Value::from(value))
                }
            }
        )+
    };
}

impl_literal_operand!(
    i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, &str, String, Vec<u8>
);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(value: Option<T>) -> Self {
        Operand::Literal(Value::from(value))
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Column(column) => write!(f, "{}", column.qualified()),
            Operand::Literal(Value::Text(text)) => write!(f, "'{text}'"),
            Operand::Literal(value) => write!(f, "{value}"),
        }
    }
}

/// A boolean expression tree over column references and literals.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        left: Operand,
        op: CompareOp,
        right: Operand,
    },
    Like {
        operand: Operand,
        pattern: String,
        negated: bool,
    },
    /// True when every child is true (and when there are none).
    And(Vec<Predicate>),
    /// True when any child is true.
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    /// Equality conjunction over columns of `target`, as produced by
    /// named-parameter join and `on` calls. Returns `None` for no pairs.
    pub fn columns_equal<I, K, V>(target: &ObjectRef, pairs: I) -> Option<Predicate>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Operand>,
    {
        let mut conditions: Vec<Predicate> = pairs
            .into_iter()
            .map(|(column, value)| eq(target.column(column.as_ref()), value))
            .collect();
        match conditions.len() {
            0 => None,
            1 => conditions.pop(),
            _ => Some(Predicate::And(conditions)),
        }
    }

    /// Column references appearing anywhere in the tree.
    pub fn columns(&self) -> Vec<&ColumnRef> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns<'a>(&'a self, out: &mut Vec<&'a ColumnRef>) {
        let mut push = |operand: &'a Operand| {
            if let Operand::Column(column) = operand {
                out.push(column);
            }
        };
        match self {
            Predicate::Compare { left, right, .. } => {
                push(left);
                push(right);
            }
            Predicate::Like { operand, .. } => push(operand),
            Predicate::And(children) | Predicate::Or(children) => {
                for child in children {
                    child.collect_columns(out);
                }
            }
            Predicate::Not(inner) => inner.collect_columns(out),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Compare {
                left,
                op,
                right: Operand::Literal(Value::Null),
            } if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
                let test = if *op == CompareOp::Eq { "IS NULL" } else { "IS NOT NULL" };
                write!(f, "{left} {test}")
            }
            Predicate::Compare { left, op, right } => write!(f, "{left} {} {right}", op.symbol()),
            Predicate::Like {
                operand,
                pattern,
                negated,
            } => {
                let keyword = if *negated { "NOT LIKE" } else { "LIKE" };
                write!(f, "{operand} {keyword} '{pattern}'")
            }
            Predicate::And(children) | Predicate::Or(children) => {
                if children.is_empty() {
                    let empty = if matches!(self, Predicate::And(_)) { "TRUE" } else { "FALSE" };
                    return write!(f, "{empty}");
                }
                let joiner = if matches!(self, Predicate::And(_)) { " AND " } else { " OR " };
                write!(f, "(")?;
                for (i, child) in children.iter().enumerate() {
                    if i > 0 {
                        write!(f, "{joiner}")?;
                    }
                    write!(f, "{child}")?;
                }
                write!(f, ")")
            }
            Predicate::Not(inner) => write!(f, "NOT ({inner})"),
        }
    }
}
