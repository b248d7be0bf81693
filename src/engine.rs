//! The expression evaluator.
//!
//! Entry point: [`evaluate`] with an [`EvaluationContext`] and a
//! [`VariableScope`]. Binding constructs (`let`, `for`, quantifiers)
//! push onto the scope and restore it to its entry mark on every exit
//! path, so a failed sub-expression can never leak bindings.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::ast::*;
use crate::datasource::DataSourceNode;
use crate::error::XdmError;
use crate::functions;
use crate::operators;
use crate::sequence_type;
use crate::types::*;

pub struct EvaluationContext<'d, N> {
    pub context_item: Option<XdmItem<N>>,
    pub context_position: usize,
    pub context_size: usize,
    pub variables: &'d HashMap<String, XdmValue<N>>,
    pub namespaces: &'d HashMap<String, String>,
}

impl<'d, N: Clone> EvaluationContext<'d, N> {
    pub fn new(
        context_item: Option<XdmItem<N>>,
        variables: &'d HashMap<String, XdmValue<N>>,
        namespaces: &'d HashMap<String, String>,
    ) -> Self {
        Self {
            context_item,
            context_position: 1,
            context_size: 1,
            variables,
            namespaces,
        }
    }

    pub fn with_context_item(&self, item: XdmItem<N>) -> Self {
        Self {
            context_item: Some(item),
            context_position: self.context_position,
            context_size: self.context_size,
            variables: self.variables,
            namespaces: self.namespaces,
        }
    }

    pub fn with_position(&self, position: usize, size: usize) -> Self {
        Self {
            context_item: self.context_item.clone(),
            context_position: position,
            context_size: size,
            variables: self.variables,
            namespaces: self.namespaces,
        }
    }
}

/// A save/restore stack of variable bindings. Shadowing is positional:
/// lookup walks from the top, and [`truncate`](Self::truncate) back to
/// a [`mark`](Self::mark) uncovers whatever was shadowed.
pub struct VariableScope<N> {
    bindings: Vec<(String, XdmValue<N>)>,
}

impl<N: Clone> VariableScope<N> {
    pub fn new() -> Self {
        Self { bindings: vec![] }
    }

    pub fn mark(&self) -> usize {
        self.bindings.len()
    }

    pub fn truncate(&mut self, mark: usize) {
        self.bindings.truncate(mark);
    }

    pub fn bind(&mut self, name: impl Into<String>, value: XdmValue<N>) {
        self.bindings.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&XdmValue<N>> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }
}

impl<N: Clone> Default for VariableScope<N> {
    fn default() -> Self {
        Self::new()
    }
}

pub fn evaluate<N: DataSourceNode>(
    expr: &Expression,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    match expr {
        Expression::Literal(lit) => evaluate_literal(lit),
        Expression::Variable(name) => evaluate_variable(name, ctx, scope),
        Expression::ContextItem => match &ctx.context_item {
            Some(item) => Ok(XdmValue::from_item(item.clone())),
            None => Err(XdmError::NoContextItem),
        },

        Expression::LetExpr {
            bindings,
            return_expr,
        } => evaluate_let(bindings, return_expr, ctx, scope),
        Expression::IfExpr {
            condition,
            then_expr,
            else_expr,
        } => {
            if evaluate(condition, ctx, scope)?.effective_boolean_value() {
                evaluate(then_expr, ctx, scope)
            } else {
                evaluate(else_expr, ctx, scope)
            }
        }
        Expression::ForExpr {
            bindings,
            return_expr,
        } => evaluate_for(bindings, return_expr, ctx, scope),
        Expression::QuantifiedExpr {
            quantifier,
            bindings,
            satisfies,
        } => evaluate_quantified(*quantifier, bindings, satisfies, ctx, scope),

        Expression::Sequence(exprs) => {
            let mut items = Vec::new();
            for e in exprs {
                items.extend(evaluate(e, ctx, scope)?.into_items());
            }
            Ok(XdmValue::from_items(items))
        }
        Expression::RangeExpr { start, end } => evaluate_range(start, end, ctx, scope),
        Expression::FilterExpr { base, predicates } => {
            evaluate_filter(base, predicates, ctx, scope)
        }

        Expression::MapConstructor(entries) => evaluate_map_constructor(entries, ctx, scope),
        Expression::ArrayConstructor(kind) => evaluate_array_constructor(kind, ctx, scope),

        Expression::FunctionCall { name, args } => {
            let mut values = Vec::with_capacity(args.len());
            for arg in args {
                values.push(evaluate(arg, ctx, scope)?);
            }
            functions::call_function(name, values, ctx)
        }

        Expression::BinaryOp { left, op, right } => {
            let l = evaluate(left, ctx, scope)?;
            // and/or short-circuit on the left operand.
            match op {
                BinaryOperator::And if !l.effective_boolean_value() => {
                    Ok(XdmValue::from_bool(false))
                }
                BinaryOperator::Or if l.effective_boolean_value() => {
                    Ok(XdmValue::from_bool(true))
                }
                _ => {
                    let r = evaluate(right, ctx, scope)?;
                    operators::evaluate_binary(*op, l, r)
                }
            }
        }
        Expression::UnaryOp { op, expr } => {
            let value = evaluate(expr, ctx, scope)?;
            operators::evaluate_unary(*op, value)
        }
        Expression::StringConcat { left, right } => {
            let l = evaluate(left, ctx, scope)?;
            let r = evaluate(right, ctx, scope)?;
            Ok(XdmValue::from_string(format!(
                "{}{}",
                l.to_string_value(),
                r.to_string_value()
            )))
        }

        Expression::InstanceOf {
            expr,
            sequence_type,
        } => {
            let value = evaluate(expr, ctx, scope)?;
            Ok(XdmValue::from_bool(sequence_type::matches(
                &value,
                sequence_type,
            )))
        }
        Expression::TreatAs {
            expr,
            sequence_type,
        } => {
            let value = evaluate(expr, ctx, scope)?;
            if sequence_type::matches(&value, sequence_type) {
                Ok(value)
            } else {
                Err(XdmError::type_error(format!(
                    "value does not match required type {}",
                    sequence_type
                )))
            }
        }
        Expression::CastAs { expr, single_type } => {
            let value = evaluate(expr, ctx, scope)?;
            evaluate_cast(value, single_type)
        }
        Expression::CastableAs { expr, single_type } => {
            let value = evaluate(expr, ctx, scope)?;
            Ok(XdmValue::from_bool(
                evaluate_cast(value, single_type).is_ok(),
            ))
        }
    }
}

fn evaluate_literal<N: Clone>(lit: &Literal) -> Result<XdmValue<N>, XdmError> {
    Ok(match lit {
        Literal::String(s) => XdmValue::from_string(s.clone()),
        Literal::Integer(i) => XdmValue::from_integer(*i),
        Literal::Decimal(s) => XdmValue::from_atomic(AtomicValue::Decimal(
            Decimal::from_str(s).map_err(|_| XdmError::malformed("xs:decimal", s.clone()))?,
        )),
        Literal::Double(d) => XdmValue::from_double(*d),
    })
}

fn evaluate_variable<N: DataSourceNode>(
    name: &str,
    ctx: &EvaluationContext<'_, N>,
    scope: &VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    if let Some(value) = scope.get(name) {
        return Ok(value.clone());
    }
    if let Some(value) = ctx.variables.get(name) {
        return Ok(value.clone());
    }
    Err(XdmError::UnknownVariable {
        name: name.to_string(),
    })
}

fn evaluate_let<N: DataSourceNode>(
    bindings: &[(String, Box<Expression>)],
    return_expr: &Expression,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let mark = scope.mark();
    let result = (|| {
        for (name, expr) in bindings {
            let value = evaluate(expr, ctx, scope)?;
            scope.bind(name.clone(), value);
        }
        evaluate(return_expr, ctx, scope)
    })();
    scope.truncate(mark);
    result
}

/// One level of the Cartesian enumeration over `for`/quantifier
/// bindings. Items are produced lazily: a sequence-constructor binding
/// evaluates one sub-expression at a time, so a quantifier that decides
/// early never evaluates the rest of the binding sequence.
struct Frame<'e, N> {
    pending: Vec<&'e Expression>,
    produced: Vec<XdmItem<N>>,
    next: usize,
}

impl<'e, N: DataSourceNode> Frame<'e, N> {
    fn new(expr: &'e Expression) -> Self {
        let pending = match expr {
            Expression::Sequence(exprs) => exprs.iter().rev().collect(),
            other => vec![other],
        };
        Self {
            pending,
            produced: Vec::new(),
            next: 0,
        }
    }

    fn next_item(
        &mut self,
        ctx: &EvaluationContext<'_, N>,
        scope: &mut VariableScope<N>,
    ) -> Result<Option<XdmItem<N>>, XdmError> {
        loop {
            if self.next < self.produced.len() {
                let item = self.produced[self.next].clone();
                self.next += 1;
                return Ok(Some(item));
            }
            let Some(expr) = self.pending.pop() else {
                return Ok(None);
            };
            self.produced.extend(evaluate(expr, ctx, scope)?.into_items());
        }
    }
}

fn evaluate_for<N: DataSourceNode>(
    bindings: &[(String, Box<Expression>)],
    return_expr: &Expression,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let mark = scope.mark();
    let result = for_combinations(bindings, ctx, scope, mark, &mut |ctx, scope| {
        Ok(Step::Collect(evaluate(return_expr, ctx, scope)?))
    });
    scope.truncate(mark);
    result.map(|outcome| match outcome {
        Outcome::Items(items) => XdmValue::from_items(items),
        Outcome::Decided(_) => unreachable!(),
    })
}

fn evaluate_quantified<N: DataSourceNode>(
    quantifier: Quantifier,
    bindings: &[(String, Box<Expression>)],
    satisfies: &Expression,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let mark = scope.mark();
    let result = for_combinations(bindings, ctx, scope, mark, &mut |ctx, scope| {
        // A dynamic error in the satisfies clause counts as false for
        // this one combination.
        let holds = match evaluate(satisfies, ctx, scope) {
            Ok(v) => v.effective_boolean_value(),
            Err(err) => {
                log::trace!("satisfies clause raised {err}; counted as false");
                false
            }
        };
        Ok(match (quantifier, holds) {
            (Quantifier::Some, true) => Step::Finish(true),
            (Quantifier::Every, false) => Step::Finish(false),
            _ => Step::Continue,
        })
    });
    scope.truncate(mark);
    result.map(|outcome| {
        XdmValue::from_bool(match outcome {
            Outcome::Decided(b) => b,
            // Exhausted without a decision: vacuous truth for `every`,
            // failure for `some`.
            Outcome::Items(_) => quantifier == Quantifier::Every,
        })
    })
}

enum Step<N> {
    Collect(XdmValue<N>),
    Finish(bool),
    Continue,
}

enum Outcome<N> {
    Items(Vec<XdmItem<N>>),
    Decided(bool),
}

/// Enumerates the Cartesian product of the binding sequences with an
/// explicit frame stack, one frame per binding, calling `body` once per
/// combination. Depth is bounded by the number of bindings, not by the
/// number of items.
fn for_combinations<N: DataSourceNode>(
    bindings: &[(String, Box<Expression>)],
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
    mark: usize,
    body: &mut dyn FnMut(
        &EvaluationContext<'_, N>,
        &mut VariableScope<N>,
    ) -> Result<Step<N>, XdmError>,
) -> Result<Outcome<N>, XdmError> {
    let Some((_, first_expr)) = bindings.first() else {
        return Ok(Outcome::Items(vec![]));
    };
    let mut frames = vec![Frame::new(first_expr)];
    let mut output: Vec<XdmItem<N>> = Vec::new();

    while let Some(depth) = frames.len().checked_sub(1) {
        // Drop deeper leftovers before producing this level's next item:
        // a binding expression must not see its own variable.
        scope.truncate(mark + depth);
        let Some(item) = frames[depth].next_item(ctx, scope)? else {
            frames.pop();
            continue;
        };
        scope.bind(bindings[depth].0.clone(), XdmValue::from_item(item));

        if depth + 1 == bindings.len() {
            match body(ctx, scope)? {
                Step::Collect(value) => output.extend(value.into_items()),
                Step::Finish(decision) => return Ok(Outcome::Decided(decision)),
                Step::Continue => {}
            }
        } else {
            frames.push(Frame::new(&bindings[depth + 1].1));
        }
    }
    Ok(Outcome::Items(output))
}

fn evaluate_range<N: DataSourceNode>(
    start: &Expression,
    end: &Expression,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let start = evaluate(start, ctx, scope)?.atomize();
    let end = evaluate(end, ctx, scope)?.atomize();
    if start.is_empty() || end.is_empty() {
        return Ok(XdmValue::empty());
    }
    let lo = range_bound(&start)?;
    let hi = range_bound(&end)?;
    if lo > hi {
        return Ok(XdmValue::empty());
    }
    Ok(XdmValue::from_items(
        (lo..=hi)
            .map(|i| XdmItem::Atomic(AtomicValue::Integer(i)))
            .collect(),
    ))
}

fn range_bound<N: DataSourceNode>(value: &XdmValue<N>) -> Result<i64, XdmError> {
    value
        .single()
        .and_then(|item| item.as_atomic())
        .and_then(|a| a.to_integer())
        .ok_or_else(|| XdmError::type_error("range bounds must be single integers"))
}

fn evaluate_filter<N: DataSourceNode>(
    base: &Expression,
    predicates: &[Expression],
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let mut current = evaluate(base, ctx, scope)?.into_items();
    for predicate in predicates {
        let size = current.len();
        let mut kept = Vec::new();
        for (i, item) in current.iter().enumerate() {
            let item_ctx = ctx
                .with_context_item(item.clone())
                .with_position(i + 1, size);
            let result = evaluate(predicate, &item_ctx, scope)?;

            // A numeric predicate is positional and must be an integer.
            if let Some(a) = result.single().and_then(|it| it.as_atomic()) {
                if a.is_numeric() {
                    let index = a.to_integer().ok_or_else(|| {
                        XdmError::index(format!("position {} is not an integer", a))
                    })?;
                    if index == (i + 1) as i64 {
                        kept.push(item.clone());
                    }
                    continue;
                }
            }
            if result.effective_boolean_value() {
                kept.push(item.clone());
            }
        }
        current = kept;
    }
    Ok(XdmValue::from_items(current))
}

fn evaluate_map_constructor<N: DataSourceNode>(
    entries: &[MapEntry],
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let mut pairs = Vec::with_capacity(entries.len());
    for entry in entries {
        let key_value = evaluate(&entry.key, ctx, scope)?.atomize();
        let key = key_value
            .single()
            .and_then(|item| item.as_atomic())
            .cloned()
            .ok_or_else(|| {
                XdmError::type_error(format!(
                    "map key must be a single atomic value, got {} items",
                    key_value.len()
                ))
            })?;
        let value = evaluate(&entry.value, ctx, scope)?;
        pairs.push((key, value));
    }
    Ok(XdmValue::from_map(XdmMap::from_entries(pairs)))
}

fn evaluate_array_constructor<N: DataSourceNode>(
    kind: &ArrayConstructorKind,
    ctx: &EvaluationContext<'_, N>,
    scope: &mut VariableScope<N>,
) -> Result<XdmValue<N>, XdmError> {
    let members = match kind {
        // [a, b]: one member per argument expression, whatever its
        // cardinality.
        ArrayConstructorKind::Square(exprs) => {
            let mut members = Vec::with_capacity(exprs.len());
            for e in exprs {
                members.push(evaluate(e, ctx, scope)?);
            }
            members
        }
        // array { e }: one singleton member per item of the result.
        ArrayConstructorKind::Curly(expr) => evaluate(expr, ctx, scope)?
            .into_items()
            .into_iter()
            .map(XdmValue::from_item)
            .collect(),
    };
    Ok(XdmValue::from_array(XdmArray::from_members(members)))
}

fn evaluate_cast<N: DataSourceNode>(
    value: XdmValue<N>,
    single_type: &SingleType,
) -> Result<XdmValue<N>, XdmError> {
    let atoms = value.atomize();
    match atoms.items() {
        [] => {
            if single_type.optional {
                Ok(XdmValue::empty())
            } else {
                Err(XdmError::casting("empty sequence", single_type.kind.name()))
            }
        }
        [XdmItem::Atomic(a)] => Ok(XdmValue::from_atomic(a.cast(single_type.kind)?)),
        items => Err(XdmError::casting(
            format!("sequence of {} items", items.len()),
            single_type.kind.name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::create_test_tree;

    fn eval(expr: &Expression) -> Result<XdmValue<()>, XdmError> {
        let variables = HashMap::new();
        let namespaces = HashMap::new();
        let ctx = EvaluationContext::new(None, &variables, &namespaces);
        let mut scope = VariableScope::new();
        evaluate(expr, &ctx, &mut scope)
    }

    fn int_seq(values: &[i64]) -> Expression {
        Expression::Sequence(values.iter().map(|&v| Expression::literal_integer(v)).collect())
    }

    fn error_call() -> Expression {
        Expression::function_call(QName::new("error"), vec![])
    }

    #[test]
    fn sequences_are_always_flat() {
        let expr = Expression::Sequence(vec![
            Expression::literal_integer(1),
            Expression::Sequence(vec![int_seq(&[2, 3]), Expression::literal_integer(4)]),
        ]);
        let result = eval(&expr).unwrap();
        assert_eq!(result.len(), 4);
        assert!(result.items().iter().all(|i| i.is_atomic()));
    }

    #[test]
    fn let_bindings_shadow_and_restore() {
        let variables = HashMap::new();
        let namespaces = HashMap::new();
        let ctx: EvaluationContext<'_, ()> = EvaluationContext::new(None, &variables, &namespaces);
        let mut scope = VariableScope::new();
        scope.bind("x", XdmValue::from_integer(1));

        let expr = Expression::let_expr(
            vec![("x".into(), Expression::literal_integer(2))],
            Expression::variable("x"),
        );
        let result = evaluate(&expr, &ctx, &mut scope).unwrap();
        assert_eq!(result.to_double(), 2.0);
        // The outer binding is visible again afterwards.
        assert_eq!(scope.get("x").unwrap().to_double(), 1.0);
        assert_eq!(scope.mark(), 1);
    }

    #[test]
    fn scope_is_restored_on_the_error_path() {
        let variables = HashMap::new();
        let namespaces = HashMap::new();
        let ctx = EvaluationContext::new(None, &variables, &namespaces);
        let mut scope: VariableScope<()> = VariableScope::new();

        let expr = Expression::let_expr(
            vec![("x".into(), Expression::literal_integer(2))],
            error_call(),
        );
        assert!(evaluate(&expr, &ctx, &mut scope).is_err());
        assert_eq!(scope.mark(), 0);
        assert!(scope.get("x").is_none());
    }

    #[test]
    fn for_builds_the_cartesian_product_in_order() {
        let expr = Expression::for_expr(
            vec![
                ("i".into(), int_seq(&[10, 20])),
                ("j".into(), int_seq(&[1, 2])),
            ],
            Expression::binary_op(
                Expression::variable("i"),
                BinaryOperator::Plus,
                Expression::variable("j"),
            ),
        );
        let result = eval(&expr).unwrap();
        let values: Vec<f64> = result
            .items()
            .iter()
            .map(|i| i.as_atomic().unwrap().to_double())
            .collect();
        assert_eq!(values, vec![11.0, 12.0, 21.0, 22.0]);
    }

    #[test]
    fn for_over_an_empty_binding_is_empty() {
        let expr = Expression::for_expr(
            vec![
                ("i".into(), int_seq(&[1, 2, 3])),
                ("j".into(), Expression::Sequence(vec![])),
            ],
            error_call(),
        );
        // The return clause never runs, so fn:error never fires.
        let result = eval(&expr).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn for_return_results_are_flattened() {
        let expr = Expression::for_expr(
            vec![("i".into(), int_seq(&[1, 2]))],
            Expression::Sequence(vec![
                Expression::variable("i"),
                Expression::variable("i"),
            ]),
        );
        assert_eq!(eval(&expr).unwrap().len(), 4);
    }

    #[test]
    fn quantifier_short_circuit_and_vacuous_truth() {
        let gt2 = |var: &str| {
            Expression::binary_op(
                Expression::variable(var),
                BinaryOperator::GreaterThan,
                Expression::literal_integer(2),
            )
        };
        let expr = Expression::quantified(
            Quantifier::Some,
            vec![("x".into(), int_seq(&[1, 2, 3]))],
            gt2("x"),
        );
        assert!(eval(&expr).unwrap().effective_boolean_value());

        let expr = Expression::quantified(
            Quantifier::Every,
            vec![("x".into(), int_seq(&[1, 2, 3]))],
            gt2("x"),
        );
        assert!(!eval(&expr).unwrap().effective_boolean_value());

        // Empty bindings decide without running the satisfies clause.
        let expr = Expression::quantified(
            Quantifier::Every,
            vec![("x".into(), Expression::Sequence(vec![]))],
            error_call(),
        );
        assert!(eval(&expr).unwrap().effective_boolean_value());

        let expr = Expression::quantified(
            Quantifier::Some,
            vec![("x".into(), Expression::Sequence(vec![]))],
            error_call(),
        );
        assert!(!eval(&expr).unwrap().effective_boolean_value());
    }

    #[test]
    fn satisfies_errors_count_as_false() {
        // some $x in (1, 2) satisfies error() is false, not an error.
        let expr = Expression::quantified(
            Quantifier::Some,
            vec![("x".into(), int_seq(&[1, 2]))],
            error_call(),
        );
        assert!(!eval(&expr).unwrap().effective_boolean_value());

        // every: an erroring combination fails the quantifier.
        let expr = Expression::quantified(
            Quantifier::Every,
            vec![("x".into(), int_seq(&[1, 2]))],
            error_call(),
        );
        assert!(!eval(&expr).unwrap().effective_boolean_value());
    }

    #[test]
    fn quantifier_decides_before_later_binding_items_are_evaluated() {
        // some $x in (1, 2, error()) satisfies $x = 1: the first item
        // already decides, so the erroring binding item is never reached.
        let expr = Expression::quantified(
            Quantifier::Some,
            vec![(
                "x".into(),
                Expression::Sequence(vec![
                    Expression::literal_integer(1),
                    Expression::literal_integer(2),
                    error_call(),
                ]),
            )],
            Expression::binary_op(
                Expression::variable("x"),
                BinaryOperator::Equals,
                Expression::literal_integer(1),
            ),
        );
        assert!(eval(&expr).unwrap().effective_boolean_value());

        // An undecided quantifier does reach it, and binding errors
        // propagate rather than count as false.
        let expr = Expression::quantified(
            Quantifier::Some,
            vec![(
                "x".into(),
                Expression::Sequence(vec![Expression::literal_integer(1), error_call()]),
            )],
            Expression::binary_op(
                Expression::variable("x"),
                BinaryOperator::Equals,
                Expression::literal_integer(9),
            ),
        );
        assert!(eval(&expr).is_err());
    }

    #[test]
    fn if_does_not_evaluate_the_unselected_branch() {
        let expr = Expression::if_expr(
            Expression::function_call(QName::new("true"), vec![]),
            Expression::literal_integer(1),
            error_call(),
        );
        assert_eq!(eval(&expr).unwrap().to_double(), 1.0);
    }

    #[test]
    fn or_short_circuits_on_a_true_left_operand() {
        let expr = Expression::binary_op(
            Expression::function_call(QName::new("true"), vec![]),
            BinaryOperator::Or,
            error_call(),
        );
        assert!(eval(&expr).unwrap().effective_boolean_value());

        let expr = Expression::binary_op(
            Expression::function_call(QName::new("false"), vec![]),
            BinaryOperator::And,
            error_call(),
        );
        assert!(!eval(&expr).unwrap().effective_boolean_value());
    }

    #[test]
    fn range_expression() {
        let result = eval(&Expression::range(
            Expression::literal_integer(1),
            Expression::literal_integer(4),
        ))
        .unwrap();
        assert_eq!(result.len(), 4);

        let result = eval(&Expression::range(
            Expression::literal_integer(3),
            Expression::literal_integer(1),
        ))
        .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn positional_filter() {
        let expr = Expression::filter(int_seq(&[10, 20, 30]), vec![Expression::literal_integer(2)]);
        let result = eval(&expr).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.to_double(), 20.0);

        // Out-of-range positions select nothing.
        let expr = Expression::filter(int_seq(&[10]), vec![Expression::literal_integer(5)]);
        assert!(eval(&expr).unwrap().is_empty());
    }

    #[test]
    fn fractional_position_is_an_index_error() {
        let expr = Expression::filter(
            int_seq(&[10, 20]),
            vec![Expression::literal_double(1.5)],
        );
        assert!(matches!(eval(&expr).unwrap_err(), XdmError::IndexType(_)));
    }

    #[test]
    fn boolean_predicate_filters_by_ebv() {
        let expr = Expression::filter(
            int_seq(&[1, 2, 3, 4]),
            vec![Expression::binary_op(
                Expression::ContextItem,
                BinaryOperator::GreaterThan,
                Expression::literal_integer(2),
            )],
        );
        let result = eval(&expr).unwrap();
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn map_constructor_singleton_keys() {
        let expr = Expression::MapConstructor(vec![MapEntry {
            key: Box::new(Expression::literal_string("a")),
            value: Box::new(int_seq(&[1, 2])),
        }]);
        let result = eval(&expr).unwrap();
        let map = result.items()[0].as_map().unwrap();
        assert_eq!(map.size(), 1);
        assert_eq!(map.get(&AtomicValue::String("a".into())).unwrap().len(), 2);

        let bad = Expression::MapConstructor(vec![MapEntry {
            key: Box::new(int_seq(&[1, 2])),
            value: Box::new(Expression::literal_integer(0)),
        }]);
        assert!(eval(&bad).is_err());
    }

    #[test]
    fn array_constructors() {
        let square = Expression::ArrayConstructor(ArrayConstructorKind::Square(vec![
            int_seq(&[1, 2]),
            Expression::literal_integer(3),
        ]));
        let result = eval(&square).unwrap();
        let arr = result.items()[0].as_array().unwrap();
        assert_eq!(arr.size(), 2);
        assert_eq!(arr.get(1).unwrap().len(), 2);

        let curly = Expression::ArrayConstructor(ArrayConstructorKind::Curly(Box::new(int_seq(
            &[1, 2, 3],
        ))));
        let result = eval(&curly).unwrap();
        let arr = result.items()[0].as_array().unwrap();
        assert_eq!(arr.size(), 3);
    }

    #[test]
    fn cast_and_castable() {
        let expr = Expression::CastAs {
            expr: Box::new(Expression::literal_string("7")),
            single_type: SingleType {
                kind: AtomicKind::Integer,
                optional: false,
            },
        };
        assert_eq!(eval(&expr).unwrap().to_double(), 7.0);

        // `?` admits the empty sequence, plain cast does not.
        let empty_cast = |optional| Expression::CastAs {
            expr: Box::new(Expression::Sequence(vec![])),
            single_type: SingleType {
                kind: AtomicKind::Integer,
                optional,
            },
        };
        assert!(eval(&empty_cast(true)).unwrap().is_empty());
        assert!(eval(&empty_cast(false)).is_err());

        let castable = Expression::CastableAs {
            expr: Box::new(Expression::literal_string("abc")),
            single_type: SingleType {
                kind: AtomicKind::Integer,
                optional: false,
            },
        };
        assert!(!eval(&castable).unwrap().effective_boolean_value());
    }

    #[test]
    fn instance_of_and_treat_as() {
        let expr = Expression::InstanceOf {
            expr: Box::new(int_seq(&[1, 2])),
            sequence_type: SequenceType::one_or_more(ItemType::Atomic(AtomicKind::Integer)),
        };
        assert!(eval(&expr).unwrap().effective_boolean_value());

        let expr = Expression::TreatAs {
            expr: Box::new(int_seq(&[1, 2])),
            sequence_type: SequenceType::single(ItemType::Atomic(AtomicKind::Integer)),
        };
        assert!(matches!(eval(&expr).unwrap_err(), XdmError::Type(_)));
    }

    #[test]
    fn unknown_variable_and_context_item() {
        assert!(matches!(
            eval(&Expression::variable("nope")).unwrap_err(),
            XdmError::UnknownVariable { .. }
        ));
        assert!(matches!(
            eval(&Expression::ContextItem).unwrap_err(),
            XdmError::NoContextItem
        ));
    }

    #[test]
    fn outer_variables_come_from_the_context() {
        let mut variables = HashMap::new();
        variables.insert("n".to_string(), XdmValue::<()>::from_integer(9));
        let namespaces = HashMap::new();
        let ctx = EvaluationContext::new(None, &variables, &namespaces);
        let mut scope = VariableScope::new();
        let result = evaluate(&Expression::variable("n"), &ctx, &mut scope).unwrap();
        assert_eq!(result.to_double(), 9.0);
    }

    #[test]
    fn evaluation_over_tree_nodes() {
        let tree = create_test_tree();
        let mut variables = HashMap::new();
        variables.insert(
            "prices".to_string(),
            XdmValue::from_nodes(vec![tree.node(1), tree.node(3)]),
        );
        let namespaces = HashMap::new();
        let ctx = EvaluationContext::new(None, &variables, &namespaces);
        let mut scope = VariableScope::new();

        // some $p in $prices satisfies $p > 40
        let expr = Expression::quantified(
            Quantifier::Some,
            vec![("p".into(), Expression::variable("prices"))],
            Expression::binary_op(
                Expression::variable("p"),
                BinaryOperator::GreaterThan,
                Expression::literal_integer(40),
            ),
        );
        let result = evaluate(&expr, &ctx, &mut scope).unwrap();
        assert!(result.effective_boolean_value());
    }

    #[test]
    fn string_concat_operator() {
        let expr = Expression::string_concat(
            Expression::literal_string("a"),
            Expression::literal_integer(1),
        );
        assert_eq!(eval(&expr).unwrap().to_string_value(), "a1");
    }
}
