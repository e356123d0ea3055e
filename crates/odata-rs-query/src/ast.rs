//! Filter and transformation syntax trees.
//!
//! These are the clause trees the parsers produce and the compiler consumes.
//! [`FilterExpr`] is a closed union of node kinds; compilation dispatches on
//! it with a single `match` per kind rather than a trait-object visitor.

use serde::{Deserialize, Serialize};

use crate::value::Value;

/// A node in a boolean filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// A binary operation: logical combinator, comparison, or arithmetic.
    Binary {
        /// The operator.
        op: BinaryOp,
        /// The left operand.
        left: Box<FilterExpr>,
        /// The right operand.
        right: Box<FilterExpr>,
    },
    /// A unary operation (`not`).
    Unary {
        /// The operator.
        op: UnaryOp,
        /// The operand.
        operand: Box<FilterExpr>,
    },
    /// A function call, e.g. `contains(Name,'Jo')` or `year(Created)`.
    Function {
        /// The function name as written.
        name: String,
        /// The argument expressions, in order.
        args: Vec<FilterExpr>,
    },
    /// A reference to a declared column.
    Property(String),
    /// A reference to a dynamic column (`attributes.color`).
    OpenProperty(String),
    /// A literal constant.
    Literal(Value),
    /// A parenthesized literal list, e.g. `('Active','Inactive')`.
    Collection(Vec<FilterExpr>),
    /// Membership test: `Status in ('Active','Inactive')`.
    In {
        /// The tested expression (a column reference).
        left: Box<FilterExpr>,
        /// The candidate list (a collection node).
        list: Box<FilterExpr>,
    },
    /// A type-conversion wrapper around another node.
    Convert(Box<FilterExpr>),
}

impl FilterExpr {
    /// Convenience constructor for a binary node.
    pub fn binary(op: BinaryOp, left: Self, right: Self) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Convenience constructor for a `not` node.
    pub fn not(operand: Self) -> Self {
        Self::Unary {
            op: UnaryOp::Not,
            operand: Box::new(operand),
        }
    }
}

/// A binary operator in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Logical OR.
    Or,
    /// Logical AND.
    And,
    /// Equal.
    Eq,
    /// Not equal.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Ge,
    /// Less than.
    Lt,
    /// Less than or equal.
    Le,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo.
    Mod,
}

impl BinaryOp {
    /// The SQL text for this operator.
    ///
    /// Arithmetic symbols are included for completeness; they are not
    /// reachable from filter predicates in practice.
    pub const fn sql_symbol(self) -> &'static str {
        match self {
            Self::Or => "or",
            Self::And => "and",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    /// Returns `true` for the six comparison operators.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Eq | Self::Ne | Self::Gt | Self::Ge | Self::Lt | Self::Le
        )
    }
}

/// A unary operator in a filter expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical negation.
    Not,
}

/// One term of an order-by list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByTerm {
    /// The column to order by.
    pub column: String,
    /// Whether to sort descending.
    pub descending: bool,
}

impl OrderByTerm {
    /// Creates an ascending term.
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    /// Creates a descending term.
    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

/// One step of a transformation pipeline.
///
/// An aggregate step, if present, is always the last one processed:
/// compilation returns immediately after it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Transformation {
    /// A filter step; composes with whatever follows without nesting.
    Filter(FilterExpr),
    /// A grouping step with an optional nested aggregate child.
    GroupBy {
        /// The grouping columns.
        columns: Vec<String>,
        /// A nested child transformation applied in the same scope.
        child: Option<Box<Transformation>>,
    },
    /// A terminal aggregation step.
    Aggregate(Vec<AggregateExpr>),
    /// A compute step. Parsed but rejected at compile time.
    Compute(String),
    /// An expand step. Parsed but rejected at compile time.
    Expand(String),
}

impl Transformation {
    /// The grammar-level name of this step kind.
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Filter(_) => "filter",
            Self::GroupBy { .. } => "groupby",
            Self::Aggregate(_) => "aggregate",
            Self::Compute(_) => "compute",
            Self::Expand(_) => "expand",
        }
    }
}

/// One requested aggregate: source column, method, and output alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateExpr {
    /// The aggregated column. `None` for the virtual row count (`$count`).
    pub source: Option<String>,
    /// The aggregation method.
    pub method: AggregateMethod,
    /// The output column alias.
    pub alias: String,
}

/// An aggregation method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregateMethod {
    /// `SUM`.
    Sum,
    /// `MIN`.
    Min,
    /// `MAX`.
    Max,
    /// `AVG`.
    Average,
    /// `COUNT(DISTINCT col)`.
    CountDistinct,
    /// `COUNT(1)`, the `$count` virtual row count.
    VirtualCount,
    /// A method outside the supported set; rejected at compile time.
    Custom(String),
}

impl AggregateMethod {
    /// Maps a grammar method name to a method, case-insensitively.
    ///
    /// Unrecognized names become [`Custom`](Self::Custom) so the compiler
    /// can reject them with a message naming the method.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "sum" => Self::Sum,
            "min" => Self::Min,
            "max" => Self::Max,
            "average" => Self::Average,
            "countdistinct" => Self::CountDistinct,
            _ => Self::Custom(name.to_string()),
        }
    }
}
