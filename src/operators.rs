//! Binary and unary operators over sequences: general (existential)
//! comparison, boolean connectives, and promoting arithmetic.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::datasource::DataSourceNode;
use crate::error::XdmError;
use crate::types::atomic::compare_atomics;
use crate::types::{AtomicKind, AtomicValue, XdmValue};

pub fn evaluate_binary<N: DataSourceNode>(
    op: BinaryOperator,
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XdmError> {
    match op {
        BinaryOperator::Or => Ok(XdmValue::from_bool(
            left.effective_boolean_value() || right.effective_boolean_value(),
        )),
        BinaryOperator::And => Ok(XdmValue::from_bool(
            left.effective_boolean_value() && right.effective_boolean_value(),
        )),
        BinaryOperator::Equals => compare(left, right, |ord| ord == Ordering::Equal),
        BinaryOperator::NotEquals => compare(left, right, |ord| ord != Ordering::Equal),
        BinaryOperator::LessThan => compare(left, right, |ord| ord == Ordering::Less),
        BinaryOperator::LessThanOrEqual => compare(left, right, |ord| ord != Ordering::Greater),
        BinaryOperator::GreaterThan => compare(left, right, |ord| ord == Ordering::Greater),
        BinaryOperator::GreaterThanOrEqual => compare(left, right, |ord| ord != Ordering::Less),
        BinaryOperator::Plus
        | BinaryOperator::Minus
        | BinaryOperator::Multiply
        | BinaryOperator::Divide
        | BinaryOperator::Modulo => arithmetic(op, left, right),
    }
}

pub fn evaluate_unary<N: DataSourceNode>(
    op: UnaryOperator,
    value: XdmValue<N>,
) -> Result<XdmValue<N>, XdmError> {
    let atoms = value.atomize();
    if atoms.is_empty() {
        return Ok(XdmValue::empty());
    }
    let operand = numeric_operand(&atoms, "unary operator")?;
    match op {
        UnaryOperator::Plus => Ok(XdmValue::from_atomic(operand)),
        UnaryOperator::Minus => Ok(XdmValue::from_atomic(negate(operand))),
    }
}

fn negate(value: AtomicValue) -> AtomicValue {
    match value {
        AtomicValue::Double(v) => AtomicValue::Double(-v),
        AtomicValue::Float(v) => AtomicValue::Float(-v),
        AtomicValue::Decimal(d) => AtomicValue::Decimal(-d),
        AtomicValue::Integer(i) => AtomicValue::Integer(-i),
        AtomicValue::Long(i) => AtomicValue::Long(-i),
        AtomicValue::Int(i) => AtomicValue::Int(-i),
        other => other,
    }
}

/// General comparison: true when any atomized pair satisfies the
/// predicate. Untyped operands take the type of the other side before
/// comparison; pairs that remain incomparable never satisfy.
fn compare<N, F>(left: XdmValue<N>, right: XdmValue<N>, pred: F) -> Result<XdmValue<N>, XdmError>
where
    N: DataSourceNode,
    F: Fn(Ordering) -> bool,
{
    let left = left.atomize();
    let right = right.atomize();
    for a in left.items() {
        let Some(a) = a.as_atomic() else { continue };
        for b in right.items() {
            let Some(b) = b.as_atomic() else { continue };
            if let Some(ord) = compare_pair(a, b) {
                if pred(ord) {
                    return Ok(XdmValue::from_bool(true));
                }
            }
        }
    }
    Ok(XdmValue::from_bool(false))
}

fn compare_pair(a: &AtomicValue, b: &AtomicValue) -> Option<Ordering> {
    let (a, b) = adjust_untyped(a, b)?;
    compare_atomics(&a, &b)
}

/// When exactly one side is untyped it is cast to the other side's
/// kind; two untyped values compare as strings.
fn adjust_untyped(a: &AtomicValue, b: &AtomicValue) -> Option<(AtomicValue, AtomicValue)> {
    let a_untyped = matches!(a, AtomicValue::Untyped(_) | AtomicValue::UntypedAtomic(_));
    let b_untyped = matches!(b, AtomicValue::Untyped(_) | AtomicValue::UntypedAtomic(_));
    match (a_untyped, b_untyped) {
        (true, false) => Some((a.cast(untyped_target(b)).ok()?, b.clone())),
        (false, true) => Some((a.clone(), b.cast(untyped_target(a)).ok()?)),
        _ => Some((a.clone(), b.clone())),
    }
}

fn untyped_target(other: &AtomicValue) -> AtomicKind {
    if other.is_numeric() {
        AtomicKind::Double
    } else {
        other.kind()
    }
}

/// How far up the promotion order an arithmetic pair reaches.
enum ArithmeticMode {
    Integer,
    Decimal,
    Float,
    Double,
}

fn arithmetic<N: DataSourceNode>(
    op: BinaryOperator,
    left: XdmValue<N>,
    right: XdmValue<N>,
) -> Result<XdmValue<N>, XdmError> {
    let left = left.atomize();
    let right = right.atomize();
    // Arithmetic over the empty sequence is the empty sequence.
    if left.is_empty() || right.is_empty() {
        return Ok(XdmValue::empty());
    }
    let a = numeric_operand(&left, "arithmetic operator")?;
    let b = numeric_operand(&right, "arithmetic operator")?;

    let result = match arithmetic_mode(&a, &b, op) {
        ArithmeticMode::Double => AtomicValue::Double(double_arithmetic(
            op,
            a.to_double(),
            b.to_double(),
        )),
        ArithmeticMode::Float => AtomicValue::Float(double_arithmetic(
            op,
            a.to_double(),
            b.to_double(),
        ) as f32),
        ArithmeticMode::Decimal => {
            let x = a
                .cast(AtomicKind::Decimal)
                .ok()
                .and_then(|v| match v {
                    AtomicValue::Decimal(d) => Some(d),
                    _ => None,
                })
                .ok_or_else(|| XdmError::arithmetic(format!("cannot use {} here", a)))?;
            let y = b
                .cast(AtomicKind::Decimal)
                .ok()
                .and_then(|v| match v {
                    AtomicValue::Decimal(d) => Some(d),
                    _ => None,
                })
                .ok_or_else(|| XdmError::arithmetic(format!("cannot use {} here", b)))?;
            AtomicValue::Decimal(decimal_arithmetic(op, x, y)?)
        }
        ArithmeticMode::Integer => {
            // Safe: integer mode implies both sides have exact views.
            let x = a.to_integer().unwrap_or_default();
            let y = b.to_integer().unwrap_or_default();
            integer_arithmetic(op, x, y)?
        }
    };
    Ok(XdmValue::from_atomic(result))
}

fn numeric_operand<N: DataSourceNode>(
    atoms: &XdmValue<N>,
    context: &str,
) -> Result<AtomicValue, XdmError> {
    let item = atoms.single().ok_or_else(|| {
        XdmError::type_error(format!(
            "{} requires a single value, got {} items",
            context,
            atoms.len()
        ))
    })?;
    let atomic = item
        .as_atomic()
        .ok_or_else(|| XdmError::type_error(format!("{} requires an atomic value", context)))?;
    match atomic {
        AtomicValue::Untyped(_) | AtomicValue::UntypedAtomic(_) => {
            atomic.cast(AtomicKind::Double)
        }
        _ if atomic.is_numeric() => Ok(atomic.clone()),
        other => Err(XdmError::type_error(format!(
            "{} cannot be applied to {}",
            context,
            other.type_name()
        ))),
    }
}

fn arithmetic_mode(a: &AtomicValue, b: &AtomicValue, op: BinaryOperator) -> ArithmeticMode {
    let is_double = |v: &AtomicValue| matches!(v, AtomicValue::Double(_));
    let is_float = |v: &AtomicValue| matches!(v, AtomicValue::Float(_));
    let is_decimal = |v: &AtomicValue| matches!(v, AtomicValue::Decimal(_));
    if is_double(a) || is_double(b) {
        ArithmeticMode::Double
    } else if is_float(a) || is_float(b) {
        ArithmeticMode::Float
    } else if is_decimal(a) || is_decimal(b) {
        ArithmeticMode::Decimal
    } else if op == BinaryOperator::Divide {
        // Integer division produces a decimal.
        ArithmeticMode::Decimal
    } else {
        ArithmeticMode::Integer
    }
}

fn double_arithmetic(op: BinaryOperator, a: f64, b: f64) -> f64 {
    match op {
        BinaryOperator::Plus => a + b,
        BinaryOperator::Minus => a - b,
        BinaryOperator::Multiply => a * b,
        BinaryOperator::Divide => a / b,
        BinaryOperator::Modulo => a % b,
        _ => unreachable!(),
    }
}

fn decimal_arithmetic(op: BinaryOperator, a: Decimal, b: Decimal) -> Result<Decimal, XdmError> {
    match op {
        BinaryOperator::Plus => a.checked_add(b),
        BinaryOperator::Minus => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Divide => {
            if b.is_zero() {
                return Err(XdmError::arithmetic("division by zero"));
            }
            a.checked_div(b)
        }
        BinaryOperator::Modulo => {
            if b.is_zero() {
                return Err(XdmError::arithmetic("modulo by zero"));
            }
            a.checked_rem(b)
        }
        _ => unreachable!(),
    }
    .ok_or_else(|| XdmError::arithmetic("decimal overflow"))
}

fn integer_arithmetic(op: BinaryOperator, a: i64, b: i64) -> Result<AtomicValue, XdmError> {
    let result = match op {
        BinaryOperator::Plus => a.checked_add(b),
        BinaryOperator::Minus => a.checked_sub(b),
        BinaryOperator::Multiply => a.checked_mul(b),
        BinaryOperator::Modulo => {
            if b == 0 {
                return Err(XdmError::arithmetic("modulo by zero"));
            }
            a.checked_rem(b)
        }
        _ => unreachable!(),
    };
    result
        .map(AtomicValue::Integer)
        .ok_or_else(|| XdmError::arithmetic("integer overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::XdmItem;

    fn ints(values: &[i64]) -> XdmValue<()> {
        XdmValue::from_items(
            values
                .iter()
                .map(|&v| XdmItem::Atomic(AtomicValue::Integer(v)))
                .collect(),
        )
    }

    #[test]
    fn existential_comparison() {
        let result = evaluate_binary(BinaryOperator::Equals, ints(&[1, 2, 3]), ints(&[3, 9]));
        assert!(result.unwrap().effective_boolean_value());

        let result = evaluate_binary(BinaryOperator::LessThan, ints(&[5, 6]), ints(&[1, 2]));
        assert!(!result.unwrap().effective_boolean_value());

        // Empty operand: no pair can match.
        let result = evaluate_binary(BinaryOperator::Equals, ints(&[]), ints(&[1]));
        assert!(!result.unwrap().effective_boolean_value());
    }

    #[test]
    fn untyped_takes_the_other_sides_type() {
        let untyped = XdmValue::<()>::from_atomic(AtomicValue::UntypedAtomic("07".into()));
        let result =
            evaluate_binary(BinaryOperator::Equals, untyped.clone(), ints(&[7])).unwrap();
        assert!(result.effective_boolean_value());

        // Against a string the comparison stays lexical.
        let s = XdmValue::<()>::from_string("07");
        let result = evaluate_binary(BinaryOperator::Equals, untyped, s).unwrap();
        assert!(result.effective_boolean_value());
    }

    #[test]
    fn integer_division_yields_decimal() {
        let result = evaluate_binary(BinaryOperator::Divide, ints(&[7]), ints(&[2])).unwrap();
        let atom = result.items()[0].as_atomic().unwrap().clone();
        assert_eq!(atom.type_name(), "xs:decimal");
        assert_eq!(atom.serialize(), "3.5");
    }

    #[test]
    fn exact_division_by_zero_is_an_error() {
        let err = evaluate_binary(BinaryOperator::Divide, ints(&[1]), ints(&[0])).unwrap_err();
        assert!(matches!(err, XdmError::ArithmeticDomain(_)));

        let err = evaluate_binary(BinaryOperator::Modulo, ints(&[1]), ints(&[0])).unwrap_err();
        assert!(matches!(err, XdmError::ArithmeticDomain(_)));
    }

    #[test]
    fn double_division_by_zero_is_ieee() {
        let one = XdmValue::<()>::from_double(1.0);
        let zero = XdmValue::<()>::from_double(0.0);
        let result = evaluate_binary(BinaryOperator::Divide, one, zero).unwrap();
        let atom = result.items()[0].as_atomic().unwrap();
        assert_eq!(atom.serialize(), "INF");
    }

    #[test]
    fn promotion_picks_the_widest_operand() {
        let d = XdmValue::<()>::from_double(0.5);
        let result = evaluate_binary(BinaryOperator::Plus, ints(&[1]), d).unwrap();
        assert_eq!(result.items()[0].as_atomic().unwrap().type_name(), "xs:double");

        let f = XdmValue::<()>::from_atomic(AtomicValue::Float(0.5));
        let result = evaluate_binary(BinaryOperator::Plus, ints(&[1]), f).unwrap();
        assert_eq!(result.items()[0].as_atomic().unwrap().type_name(), "xs:float");
    }

    #[test]
    fn arithmetic_with_empty_is_empty() {
        let result = evaluate_binary(BinaryOperator::Plus, ints(&[]), ints(&[1])).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn unary_minus() {
        let result = evaluate_unary(UnaryOperator::Minus, ints(&[5])).unwrap();
        assert_eq!(result.items()[0].as_atomic().unwrap().serialize(), "-5");
    }
}
