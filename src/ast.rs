//! Expression objects and declared-type descriptors.
//!
//! Expressions are produced by the surrounding XPath compiler; this crate
//! only evaluates them. Core types: [`Expression`], [`SequenceType`].

use std::fmt;

use crate::types::AtomicKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Literal(Literal),
    Variable(String),
    ContextItem,

    LetExpr {
        bindings: Vec<(String, Box<Expression>)>,
        return_expr: Box<Expression>,
    },
    IfExpr {
        condition: Box<Expression>,
        then_expr: Box<Expression>,
        else_expr: Box<Expression>,
    },
    ForExpr {
        bindings: Vec<(String, Box<Expression>)>,
        return_expr: Box<Expression>,
    },
    QuantifiedExpr {
        quantifier: Quantifier,
        bindings: Vec<(String, Box<Expression>)>,
        satisfies: Box<Expression>,
    },

    Sequence(Vec<Expression>),
    RangeExpr {
        start: Box<Expression>,
        end: Box<Expression>,
    },
    FilterExpr {
        base: Box<Expression>,
        predicates: Vec<Expression>,
    },

    MapConstructor(Vec<MapEntry>),
    ArrayConstructor(ArrayConstructorKind),

    FunctionCall {
        name: QName,
        args: Vec<Expression>,
    },

    BinaryOp {
        left: Box<Expression>,
        op: BinaryOperator,
        right: Box<Expression>,
    },
    UnaryOp {
        op: UnaryOperator,
        expr: Box<Expression>,
    },
    StringConcat {
        left: Box<Expression>,
        right: Box<Expression>,
    },

    InstanceOf {
        expr: Box<Expression>,
        sequence_type: SequenceType,
    },
    TreatAs {
        expr: Box<Expression>,
        sequence_type: SequenceType,
    },
    CastAs {
        expr: Box<Expression>,
        single_type: SingleType,
    },
    CastableAs {
        expr: Box<Expression>,
        single_type: SingleType,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(String),
    Double(f64),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local_part: String,
}

impl QName {
    pub fn new(local_part: impl Into<String>) -> Self {
        Self {
            prefix: None,
            local_part: local_part.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local_part: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            local_part: local_part.into(),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local_part),
            None => write!(f, "{}", self.local_part),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Some,
    Every,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Or,
    And,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Plus,
    Minus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    pub key: Box<Expression>,
    pub value: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ArrayConstructorKind {
    Square(Vec<Expression>),
    Curly(Box<Expression>),
}

/// A declared sequence type: item kind plus occurrence indicator.
#[derive(Debug, Clone, PartialEq)]
pub struct SequenceType {
    pub item_type: ItemType,
    pub occurrence: OccurrenceIndicator,
}

impl SequenceType {
    pub fn empty() -> Self {
        Self {
            item_type: ItemType::EmptySequence,
            occurrence: OccurrenceIndicator::ExactlyOne,
        }
    }

    pub fn single(item_type: ItemType) -> Self {
        Self {
            item_type,
            occurrence: OccurrenceIndicator::ExactlyOne,
        }
    }

    pub fn zero_or_one(item_type: ItemType) -> Self {
        Self {
            item_type,
            occurrence: OccurrenceIndicator::ZeroOrOne,
        }
    }

    pub fn zero_or_more(item_type: ItemType) -> Self {
        Self {
            item_type,
            occurrence: OccurrenceIndicator::ZeroOrMore,
        }
    }

    pub fn one_or_more(item_type: ItemType) -> Self {
        Self {
            item_type,
            occurrence: OccurrenceIndicator::OneOrMore,
        }
    }
}

impl fmt::Display for SequenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.item_type == ItemType::EmptySequence {
            return write!(f, "empty-sequence()");
        }
        write!(f, "{}{}", self.item_type, self.occurrence)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemType {
    Item,
    EmptySequence,
    Atomic(AtomicKind),
    KindTest(KindTest),
    MapTest,
    ArrayTest,
    FunctionTest,
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemType::Item => write!(f, "item()"),
            ItemType::EmptySequence => write!(f, "empty-sequence()"),
            ItemType::Atomic(kind) => write!(f, "{}", kind.name()),
            ItemType::KindTest(test) => write!(f, "{}", test),
            ItemType::MapTest => write!(f, "map(*)"),
            ItemType::ArrayTest => write!(f, "array(*)"),
            ItemType::FunctionTest => write!(f, "function(*)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindTest {
    AnyKind,
    Element(Option<String>),
    Attribute(Option<String>),
    Text,
    Comment,
    ProcessingInstruction(Option<String>),
    Document,
}

impl fmt::Display for KindTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindTest::AnyKind => write!(f, "node()"),
            KindTest::Element(Some(name)) => write!(f, "element({})", name),
            KindTest::Element(None) => write!(f, "element()"),
            KindTest::Attribute(Some(name)) => write!(f, "attribute({})", name),
            KindTest::Attribute(None) => write!(f, "attribute()"),
            KindTest::Text => write!(f, "text()"),
            KindTest::Comment => write!(f, "comment()"),
            KindTest::ProcessingInstruction(Some(target)) => {
                write!(f, "processing-instruction({})", target)
            }
            KindTest::ProcessingInstruction(None) => write!(f, "processing-instruction()"),
            KindTest::Document => write!(f, "document-node()"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OccurrenceIndicator {
    ExactlyOne,
    ZeroOrOne,
    ZeroOrMore,
    OneOrMore,
}

impl fmt::Display for OccurrenceIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OccurrenceIndicator::ExactlyOne => Ok(()),
            OccurrenceIndicator::ZeroOrOne => write!(f, "?"),
            OccurrenceIndicator::ZeroOrMore => write!(f, "*"),
            OccurrenceIndicator::OneOrMore => write!(f, "+"),
        }
    }
}

/// The target of `cast as` / `castable as`: an atomic kind plus an
/// optional `?` marker admitting the empty sequence.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleType {
    pub kind: AtomicKind,
    pub optional: bool,
}

impl Expression {
    pub fn literal_string(s: impl Into<String>) -> Self {
        Expression::Literal(Literal::String(s.into()))
    }

    pub fn literal_integer(i: i64) -> Self {
        Expression::Literal(Literal::Integer(i))
    }

    pub fn literal_double(d: f64) -> Self {
        Expression::Literal(Literal::Double(d))
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    pub fn function_call(name: QName, args: Vec<Expression>) -> Self {
        Expression::FunctionCall { name, args }
    }

    pub fn binary_op(left: Expression, op: BinaryOperator, right: Expression) -> Self {
        Expression::BinaryOp {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn let_expr(bindings: Vec<(String, Expression)>, return_expr: Expression) -> Self {
        Expression::LetExpr {
            bindings: bindings
                .into_iter()
                .map(|(n, e)| (n, Box::new(e)))
                .collect(),
            return_expr: Box::new(return_expr),
        }
    }

    pub fn if_expr(condition: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Expression::IfExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        }
    }

    pub fn for_expr(bindings: Vec<(String, Expression)>, return_expr: Expression) -> Self {
        Expression::ForExpr {
            bindings: bindings
                .into_iter()
                .map(|(n, e)| (n, Box::new(e)))
                .collect(),
            return_expr: Box::new(return_expr),
        }
    }

    pub fn quantified(
        quantifier: Quantifier,
        bindings: Vec<(String, Expression)>,
        satisfies: Expression,
    ) -> Self {
        Expression::QuantifiedExpr {
            quantifier,
            bindings: bindings
                .into_iter()
                .map(|(n, e)| (n, Box::new(e)))
                .collect(),
            satisfies: Box::new(satisfies),
        }
    }

    pub fn range(start: Expression, end: Expression) -> Self {
        Expression::RangeExpr {
            start: Box::new(start),
            end: Box::new(end),
        }
    }

    pub fn string_concat(left: Expression, right: Expression) -> Self {
        Expression::StringConcat {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn filter(base: Expression, predicates: Vec<Expression>) -> Self {
        Expression::FilterExpr {
            base: Box::new(base),
            predicates,
        }
    }
}
