//! XPath 3.1 expression evaluation and the XDM atomic type system.
//!
//! This crate is the evaluation core of an XSLT processor: it walks
//! already-compiled expression objects (`for`/`let`/`if`, quantifiers,
//! sequence, map and array constructors), applies the XDM typing rules
//! (atomic casting with numeric promotion, sequence-type checking,
//! timezone-aware calendar and duration values), and renders numbers in
//! their canonical lexical forms. Surface syntax parsing, XML
//! serialization and schema validation live elsewhere.
//!
//! # Key Types
//!
//! - [`Expression`]: compiled expression objects, produced by the caller
//! - [`XdmValue`]: a flat XDM sequence (nodes, atomics, maps, arrays)
//! - [`EvaluationContext`] / [`VariableScope`]: evaluation state
//! - [`DataSourceNode`]: the seam to the caller's document tree
//!
//! # Example
//!
//! ```
//! use std::collections::HashMap;
//! use xpath31_core::{evaluate, EvaluationContext, Expression, VariableScope, XdmValue};
//!
//! let expr = Expression::for_expr(
//!     vec![("i".into(), Expression::range(
//!         Expression::literal_integer(1),
//!         Expression::literal_integer(3),
//!     ))],
//!     Expression::variable("i"),
//! );
//! let variables = HashMap::new();
//! let namespaces = HashMap::new();
//! let ctx = EvaluationContext::new(None, &variables, &namespaces);
//! let mut scope = VariableScope::new();
//! let result: XdmValue<()> = evaluate(&expr, &ctx, &mut scope).unwrap();
//! assert_eq!(result.len(), 3);
//! ```

pub mod ast;
pub mod datasource;
pub mod engine;
pub mod error;
pub mod format;
pub mod functions;
pub mod operators;
pub mod sequence_type;
pub mod types;

pub use ast::{
    ArrayConstructorKind, BinaryOperator, Expression, ItemType, KindTest, Literal, MapEntry,
    OccurrenceIndicator, QName, Quantifier, SequenceType, SingleType, UnaryOperator,
};
pub use datasource::{DataSourceNode, NodeType};
pub use engine::{EvaluationContext, VariableScope, evaluate};
pub use error::XdmError;
pub use sequence_type::{match_and_cast, matches};
pub use types::{
    AtomicKind, AtomicValue, Date, DateTime, Duration, Time, Timezone, XdmArray, XdmFunction,
    XdmItem, XdmMap, XdmValue,
};
