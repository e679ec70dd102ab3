//! Turns raw user input into SOQL literals.

use crate::ast::{FieldType, Operator};

/// Render `raw` as the literal to embed after `operator` for a field of `field_type`.
///
/// Formatting is best effort: malformed input is passed through rather than rejected.
/// Quoted literals are always escaped, so user input cannot break out of a string.
pub fn format_value(field_type: FieldType, operator: Operator, raw: &str) -> String {
    if !operator.takes_list() {
        return format_scalar(field_type, raw);
    }
    // Multi-select picklist membership always takes a list of quoted strings.
    let quoted = field_type.is_textual() || matches!(operator, Operator::Includes | Operator::Excludes);
    format_list(raw, quoted)
}

fn format_scalar(field_type: FieldType, raw: &str) -> String {
    if field_type.is_textual() {
        return quote(raw);
    }
    match field_type {
        // Relative literals (THIS_WEEK, LAST_N_DAYS:30) and ISO dates are both unquoted.
        FieldType::Date | FieldType::Datetime => raw.to_string(),
        FieldType::Boolean => raw.to_lowercase(),
        _ => raw.to_string(),
    }
}

fn format_list(raw: &str, quoted: bool) -> String {
    let parts: Vec<String> = list_items(raw)
        .map(|part| if quoted { quote(part) } else { part.to_string() })
        .collect();
    format!("({})", parts.join(", "))
}

/// The non-blank, trimmed items of a comma-separated list value.
pub fn list_items(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(',').map(str::trim).filter(|part| !part.is_empty())
}

/// Whether `value` has the shape `format_value` gives a literal for this
/// field type and operator. Values that were never formatted (an unescaped
/// quote, a missing list paren) fail.
pub fn is_formatted(field_type: FieldType, operator: Operator, value: &str) -> bool {
    if value.trim().is_empty() {
        return false;
    }
    if !operator.takes_list() {
        return !field_type.is_textual() || is_quoted(value);
    }

    let Some(inner) = value.strip_prefix('(').and_then(|v| v.strip_suffix(')')) else {
        return false;
    };
    if field_type.is_textual() || matches!(operator, Operator::Includes | Operator::Excludes) {
        is_quoted_list(inner)
    } else {
        inner
            .split(',')
            .map(str::trim)
            .all(|part| !part.is_empty() && !part.contains(['(', ')']))
    }
}

/// Consume one quoted literal from `chars`, honouring backslash escapes.
fn scan_quoted(chars: &mut std::str::Chars<'_>) -> bool {
    if chars.next() != Some('\'') {
        return false;
    }
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '\'' => return true,
            _ => {}
        }
    }
    false
}

fn is_quoted(value: &str) -> bool {
    let mut chars = value.chars();
    scan_quoted(&mut chars) && chars.next().is_none()
}

fn is_quoted_list(inner: &str) -> bool {
    let mut chars = inner.chars();
    loop {
        if !scan_quoted(&mut chars) {
            return false;
        }
        match chars.next() {
            None => return true,
            Some(',') if chars.next() == Some(' ') => {}
            Some(_) => return false,
        }
    }
}

/// Wrap `value` in single quotes, escaping backslashes and embedded quotes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            _ => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_equality_is_quoted() {
        assert_eq!(format_value(FieldType::String, Operator::Eq, "Acme"), "'Acme'");
        assert_eq!(format_value(FieldType::Id, Operator::NotEq, "001xx"), "'001xx'");
        assert_eq!(format_value(FieldType::Picklist, Operator::Eq, "Hot"), "'Hot'");
    }

    #[test]
    fn test_embedded_quote_is_escaped() {
        assert_eq!(
            format_value(FieldType::String, Operator::Eq, "O'Brien"),
            "'O\\'Brien'"
        );
        assert_eq!(quote(r"C:\temp"), r"'C:\\temp'");
    }

    #[test]
    fn test_like_keeps_wildcards() {
        assert_eq!(format_value(FieldType::String, Operator::Like, "Acme%"), "'Acme%'");
    }

    #[test]
    fn test_picklist_in_list() {
        assert_eq!(
            format_value(FieldType::Picklist, Operator::In, "Hot, Warm, Cold"),
            "('Hot', 'Warm', 'Cold')"
        );
    }

    #[test]
    fn test_numeric_in_list_is_unquoted() {
        assert_eq!(format_value(FieldType::Integer, Operator::NotIn, " 1,2 , 3"), "(1, 2, 3)");
    }

    #[test]
    fn test_list_drops_empty_parts() {
        assert_eq!(format_value(FieldType::Reference, Operator::In, "a,,b,"), "('a', 'b')");
    }

    #[test]
    fn test_includes_is_always_quoted_list() {
        assert_eq!(
            format_value(FieldType::Multipicklist, Operator::Includes, "Red;Blue, Green"),
            "('Red;Blue', 'Green')"
        );
    }

    #[test]
    fn test_dates_pass_through() {
        assert_eq!(format_value(FieldType::Date, Operator::Gt, "THIS_WEEK"), "THIS_WEEK");
        assert_eq!(format_value(FieldType::Date, Operator::Eq, "2024-01-31"), "2024-01-31");
        assert_eq!(
            format_value(FieldType::Datetime, Operator::Lt, "2024-01-31T00:00:00Z"),
            "2024-01-31T00:00:00Z"
        );
    }

    #[test]
    fn test_boolean_is_lowercased() {
        assert_eq!(format_value(FieldType::Boolean, Operator::Eq, "True"), "true");
        assert_eq!(format_value(FieldType::Boolean, Operator::NotEq, "FALSE"), "false");
    }

    #[test]
    fn test_blank_list_has_no_items() {
        assert_eq!(list_items(" , ,").count(), 0);
        assert_eq!(list_items("a, ,b").collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_formatted_values_are_recognised() {
        for (field_type, operator, raw) in [
            (FieldType::String, Operator::Eq, "O'Brien"),
            (FieldType::String, Operator::Like, r"C:\temp%"),
            (FieldType::Picklist, Operator::In, "Hot, Warm"),
            (FieldType::Multipicklist, Operator::Excludes, "a,b'c"),
            (FieldType::Integer, Operator::NotIn, "1, 2"),
            (FieldType::Boolean, Operator::Eq, "TRUE"),
        ] {
            let value = format_value(field_type, operator, raw);
            assert!(is_formatted(field_type, operator, &value), "{}", value);
        }
    }

    #[test]
    fn test_unformatted_values_are_rejected() {
        assert!(!is_formatted(FieldType::String, Operator::Eq, "Acme"));
        assert!(!is_formatted(FieldType::String, Operator::Eq, "'x' OR Id != ''"));
        assert!(!is_formatted(FieldType::String, Operator::Eq, "'dangling\\'"));
        assert!(!is_formatted(FieldType::Picklist, Operator::In, "'Hot', 'Warm'"));
        assert!(!is_formatted(FieldType::Picklist, Operator::In, "('Hot') OR ('Warm')"));
        assert!(!is_formatted(FieldType::Integer, Operator::In, "()"));
        assert!(!is_formatted(FieldType::Integer, Operator::In, "(1,,2)"));
        assert!(!is_formatted(FieldType::Double, Operator::Gt, "  "));
    }

    #[test]
    fn test_numbers_and_unknown_types_pass_through() {
        assert_eq!(format_value(FieldType::Double, Operator::Gte, "1.5"), "1.5");
        assert_eq!(format_value(FieldType::Other, Operator::Eq, "x"), "x");
    }
}
