//! Checks and converts sequences against declared sequence types.

use crate::ast::{ItemType, KindTest, OccurrenceIndicator, SequenceType};
use crate::datasource::{DataSourceNode, NodeType};
use crate::error::XdmError;
use crate::types::{AtomicKind, AtomicValue, XdmItem, XdmValue};

/// Tests whether `value` is an instance of `declared`, without any
/// conversion. This is the `instance of` operator.
pub fn matches<N: DataSourceNode>(value: &XdmValue<N>, declared: &SequenceType) -> bool {
    if declared.item_type == ItemType::EmptySequence {
        return value.is_empty();
    }
    if !cardinality_allows(declared.occurrence, value.len()) {
        return false;
    }
    value.items().iter().all(|item| item_matches(item, &declared.item_type))
}

/// Converts `value` to `declared`, the checking half of a typed variable
/// binding. Cardinality violations report the declared type string;
/// item conversion goes through atomic casting.
pub fn match_and_cast<N: DataSourceNode>(
    value: XdmValue<N>,
    declared: &SequenceType,
) -> Result<XdmValue<N>, XdmError> {
    if declared.item_type == ItemType::EmptySequence {
        if value.is_empty() {
            return Ok(value);
        }
        return Err(XdmError::cardinality(declared.to_string(), value.len()));
    }
    if !cardinality_allows(declared.occurrence, value.len()) {
        return Err(XdmError::cardinality(declared.to_string(), value.len()));
    }

    let mut converted = Vec::with_capacity(value.len());
    for item in value.into_items() {
        converted.push(convert_item(item, &declared.item_type)?);
    }
    Ok(XdmValue::from_items(converted))
}

fn cardinality_allows(occurrence: OccurrenceIndicator, len: usize) -> bool {
    match occurrence {
        OccurrenceIndicator::ExactlyOne => len == 1,
        OccurrenceIndicator::ZeroOrOne => len <= 1,
        OccurrenceIndicator::ZeroOrMore => true,
        OccurrenceIndicator::OneOrMore => len >= 1,
    }
}

fn convert_item<N: DataSourceNode>(
    item: XdmItem<N>,
    target: &ItemType,
) -> Result<XdmItem<N>, XdmError> {
    if item_matches(&item, target) {
        return Ok(item);
    }
    match target {
        ItemType::Atomic(kind) => {
            // A node contributes its string value, everything else its
            // own atomic form.
            let source = match &item {
                XdmItem::Node(n) => AtomicValue::UntypedAtomic(n.string_value()),
                XdmItem::Atomic(a) => a.clone(),
                other => {
                    return Err(XdmError::type_error(format!(
                        "cannot convert {} to {}",
                        other.type_name(),
                        kind.name()
                    )));
                }
            };
            Ok(XdmItem::Atomic(source.cast(*kind)?))
        }
        other => Err(XdmError::type_error(format!(
            "{} does not match required type {}",
            item.type_name(),
            other
        ))),
    }
}

fn item_matches<N: DataSourceNode>(item: &XdmItem<N>, target: &ItemType) -> bool {
    match target {
        ItemType::Item => true,
        ItemType::EmptySequence => false,
        ItemType::Atomic(kind) => match item {
            XdmItem::Atomic(a) => kind_matches(a.kind(), *kind),
            _ => false,
        },
        ItemType::KindTest(test) => match item {
            XdmItem::Node(n) => node_matches(n, test),
            _ => false,
        },
        ItemType::MapTest => matches!(item, XdmItem::Map(_)),
        ItemType::ArrayTest => matches!(item, XdmItem::Array(_)),
        ItemType::FunctionTest => {
            matches!(item, XdmItem::Function(_) | XdmItem::Map(_) | XdmItem::Array(_))
        }
    }
}

/// Nominal subtyping inside the atomic lattice: the integer family
/// derives from decimal, the two bounded-duration kinds from duration.
fn kind_matches(actual: AtomicKind, declared: AtomicKind) -> bool {
    if actual == declared {
        return true;
    }
    match declared {
        AtomicKind::Decimal => matches!(
            actual,
            AtomicKind::Integer | AtomicKind::Long | AtomicKind::Int
        ),
        AtomicKind::Integer => matches!(actual, AtomicKind::Long | AtomicKind::Int),
        AtomicKind::Long => actual == AtomicKind::Int,
        AtomicKind::Duration => matches!(
            actual,
            AtomicKind::DayTimeDuration | AtomicKind::YearMonthDuration
        ),
        _ => false,
    }
}

fn node_matches<N: DataSourceNode>(node: &N, test: &KindTest) -> bool {
    match test {
        KindTest::AnyKind => true,
        KindTest::Element(name) => {
            node.node_type() == NodeType::Element && name_matches(node, name)
        }
        KindTest::Attribute(name) => {
            node.node_type() == NodeType::Attribute && name_matches(node, name)
        }
        KindTest::Text => node.node_type() == NodeType::Text,
        KindTest::Comment => node.node_type() == NodeType::Comment,
        KindTest::ProcessingInstruction(target) => {
            node.node_type() == NodeType::ProcessingInstruction && name_matches(node, target)
        }
        KindTest::Document => node.node_type() == NodeType::Root,
    }
}

fn name_matches<N: DataSourceNode>(node: &N, required: &Option<String>) -> bool {
    match required {
        None => true,
        Some(name) => node.name().as_deref() == Some(name.as_str()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasource::tests::create_test_tree;

    fn decimal_seq(declared: OccurrenceIndicator) -> SequenceType {
        SequenceType {
            item_type: ItemType::Atomic(AtomicKind::Decimal),
            occurrence: declared,
        }
    }

    #[test]
    fn cardinality_violations_name_the_declared_type() {
        let two = XdmValue::<()>::from_integer(1).concat(XdmValue::from_integer(2));
        let err = match_and_cast(two, &decimal_seq(OccurrenceIndicator::ExactlyOne)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cardinality error: xs:decimal does not allow a sequence of 2 items"
        );

        let empty = XdmValue::<()>::empty();
        let err =
            match_and_cast(empty, &decimal_seq(OccurrenceIndicator::OneOrMore)).unwrap_err();
        assert!(err.to_string().contains("xs:decimal+"));
    }

    #[test]
    fn empty_sequence_type() {
        let empty = XdmValue::<()>::empty();
        assert!(match_and_cast(empty, &SequenceType::empty()).is_ok());
        let one = XdmValue::<()>::from_integer(1);
        assert!(match_and_cast(one, &SequenceType::empty()).is_err());
    }

    #[test]
    fn items_are_cast_to_the_declared_atomic_kind() {
        let strings = XdmValue::<()>::from_string("1.5").concat(XdmValue::from_string("2"));
        let result =
            match_and_cast(strings, &decimal_seq(OccurrenceIndicator::ZeroOrMore)).unwrap();
        assert_eq!(result.items()[0].as_atomic().unwrap().type_name(), "xs:decimal");
        assert_eq!(result.items()[1].as_atomic().unwrap().serialize(), "2");
    }

    #[test]
    fn nodes_convert_through_their_string_value() {
        let tree = create_test_tree();
        let value = XdmValue::from_node(tree.node(1));
        let result = match_and_cast(
            value,
            &SequenceType::single(ItemType::Atomic(AtomicKind::Integer)),
        )
        .unwrap();
        assert_eq!(result.items()[0].as_atomic().unwrap().serialize(), "42");

        // "7.5" is not in the integer lexical space.
        let value = XdmValue::from_node(tree.node(3));
        assert!(match_and_cast(
            value,
            &SequenceType::single(ItemType::Atomic(AtomicKind::Integer)),
        )
        .is_err());
    }

    #[test]
    fn instance_of_uses_the_derivation_chain() {
        let int = XdmValue::<()>::from_atomic(AtomicValue::Int(5));
        assert!(matches(&int, &decimal_seq(OccurrenceIndicator::ExactlyOne)));
        assert!(matches(
            &int,
            &SequenceType::single(ItemType::Atomic(AtomicKind::Integer))
        ));
        // Untyped is not implicitly a string.
        let untyped = XdmValue::<()>::from_atomic(AtomicValue::UntypedAtomic("x".into()));
        assert!(!matches(
            &untyped,
            &SequenceType::single(ItemType::Atomic(AtomicKind::String))
        ));
    }

    #[test]
    fn kind_tests_against_the_tree() {
        let tree = create_test_tree();
        let elem = XdmValue::from_node(tree.node(1));
        assert!(matches(
            &elem,
            &SequenceType::single(ItemType::KindTest(KindTest::Element(Some("price".into()))))
        ));
        assert!(!matches(
            &elem,
            &SequenceType::single(ItemType::KindTest(KindTest::Text))
        ));
        assert!(matches(
            &elem,
            &SequenceType::single(ItemType::KindTest(KindTest::AnyKind))
        ));
    }
}
