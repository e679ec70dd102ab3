//! Which comparison operators make sense for which field types.

use crate::ast::{FieldType, Operator};

const EQUALITY: &[Operator] = &[Operator::Eq, Operator::NotEq];

const ORDERED: &[Operator] = &[
    Operator::Eq,
    Operator::NotEq,
    Operator::Gt,
    Operator::Lt,
    Operator::Gte,
    Operator::Lte,
];

const PICKLIST: &[Operator] = &[
    Operator::Eq,
    Operator::NotEq,
    Operator::In,
    Operator::NotIn,
    Operator::Includes,
    Operator::Excludes,
];

const REFERENCE: &[Operator] = &[Operator::Eq, Operator::NotEq, Operator::In, Operator::NotIn];

const TEXT: &[Operator] = &[
    Operator::Eq,
    Operator::NotEq,
    Operator::Like,
    Operator::In,
    Operator::NotIn,
];

/// Offered before any field is chosen.
const ANY: &[Operator] = &[
    Operator::Eq,
    Operator::NotEq,
    Operator::Gt,
    Operator::Lt,
    Operator::Gte,
    Operator::Lte,
    Operator::Like,
    Operator::In,
    Operator::NotIn,
];

/// Operators a condition on a field of `field_type` may use. `None` means no field is selected yet.
pub fn operators_for(field_type: Option<FieldType>) -> &'static [Operator] {
    let Some(field_type) = field_type else {
        return ANY;
    };
    match field_type {
        FieldType::Boolean => EQUALITY,
        t if t.is_numeric() || t.is_temporal() => ORDERED,
        FieldType::Picklist | FieldType::Multipicklist => PICKLIST,
        FieldType::Reference => REFERENCE,
        _ => TEXT,
    }
}

/// Keep `current` only if it is still legal after the field type changed.
pub fn retain_operator(field_type: Option<FieldType>, current: Option<Operator>) -> Option<Operator> {
    current.filter(|op| operators_for(field_type).contains(op))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn set(ops: &[Operator]) -> HashSet<Operator> {
        ops.iter().copied().collect()
    }

    #[test]
    fn test_boolean_allows_equality_only() {
        assert_eq!(
            set(operators_for(Some(FieldType::Boolean))),
            set(&[Operator::NotEq, Operator::Eq])
        );
    }

    #[test]
    fn test_numeric_and_temporal_are_ordered() {
        for t in [
            FieldType::Integer,
            FieldType::Double,
            FieldType::Currency,
            FieldType::Date,
            FieldType::Datetime,
        ] {
            let ops = operators_for(Some(t));
            assert_eq!(ops.len(), 6, "{:?}", t);
            assert!(ops.contains(&Operator::Gte));
            assert!(!ops.contains(&Operator::Like));
        }
    }

    #[test]
    fn test_picklist_and_reference() {
        let picklist = operators_for(Some(FieldType::Multipicklist));
        assert!(picklist.contains(&Operator::Includes));
        assert!(picklist.contains(&Operator::Excludes));
        assert!(!picklist.contains(&Operator::Like));

        let reference = operators_for(Some(FieldType::Reference));
        assert_eq!(
            set(reference),
            set(&[Operator::Eq, Operator::NotEq, Operator::In, Operator::NotIn])
        );
    }

    #[test]
    fn test_text_types_default() {
        for t in [FieldType::String, FieldType::Textarea, FieldType::Id, FieldType::Other] {
            assert!(operators_for(Some(t)).contains(&Operator::Like));
            assert!(!operators_for(Some(t)).contains(&Operator::Gt));
        }
    }

    #[test]
    fn test_no_field_offers_nine_operators() {
        let ops = operators_for(None);
        assert_eq!(ops.len(), 9);
        assert!(!ops.contains(&Operator::Includes));
    }

    #[test]
    fn test_retain_operator_discards_illegal_choice() {
        assert_eq!(
            retain_operator(Some(FieldType::Boolean), Some(Operator::Like)),
            None
        );
        assert_eq!(
            retain_operator(Some(FieldType::String), Some(Operator::Like)),
            Some(Operator::Like)
        );
        assert_eq!(retain_operator(None, None), None);
    }
}
