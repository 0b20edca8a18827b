//! Tokenizing and dtype inference helpers.

use std::collections::HashMap;

use crate::conf::{
    C_DUPLICATE_NAME_SEP, C_QUOTE_CHAR, TUP_BOOL_FALSE, TUP_BOOL_TRUE, TUP_FIELD_SEPARATORS,
};
use crate::spec::EnumColumnKind;

/// Split a line on runs of spaces and tabs, ignoring leading/trailing blanks.
///
/// A field opening with `"` runs to the matching close quote, separators
/// included; `""` inside it is a literal quote. A quote inside an unquoted
/// field is kept as is. Returns `None` when a quoted field is never closed.
pub fn split_fields(line: &str) -> Option<Vec<String>> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut l_fields = Vec::new();
    let mut field = String::new();
    let mut if_in_field = false;
    let mut if_in_quotes = false;

    let mut chars = line.chars().peekable();
    while let Some(chr) = chars.next() {
        if if_in_quotes {
            if chr != C_QUOTE_CHAR {
                field.push(chr);
            } else if chars.next_if_eq(&C_QUOTE_CHAR).is_some() {
                field.push(C_QUOTE_CHAR);
            } else {
                if_in_quotes = false;
            }
        } else if TUP_FIELD_SEPARATORS.contains(&chr) {
            if if_in_field {
                l_fields.push(std::mem::take(&mut field));
                if_in_field = false;
            }
        } else if chr == C_QUOTE_CHAR && !if_in_field {
            if_in_field = true;
            if_in_quotes = true;
        } else {
            if_in_field = true;
            field.push(chr);
        }
    }

    if if_in_quotes {
        return None;
    }
    if if_in_field {
        l_fields.push(field);
    }
    Some(l_fields)
}

/// Whether `token` is one of the configured missing-value markers.
pub fn is_na_token(token: &str, na_values: &[String]) -> bool {
    na_values.iter().any(|c_na| c_na == token)
}

pub fn parse_int_token(token: &str) -> Option<i64> {
    token.parse::<i64>().ok()
}

pub fn parse_float_token(token: &str) -> Option<f64> {
    token.parse::<f64>().ok()
}

pub fn parse_bool_token(token: &str) -> Option<bool> {
    if TUP_BOOL_TRUE.contains(&token) {
        Some(true)
    } else if TUP_BOOL_FALSE.contains(&token) {
        Some(false)
    } else {
        None
    }
}

/// Pick the narrowest kind every present token fits (integer, decimal, boolean, text).
pub fn infer_column_kind(cells: &[Option<String>]) -> EnumColumnKind {
    let l_present: Vec<&str> = cells.iter().filter_map(|cell| cell.as_deref()).collect();
    if l_present.is_empty() {
        return EnumColumnKind::Text;
    }

    if l_present.iter().all(|token| parse_int_token(token).is_some()) {
        EnumColumnKind::Integer
    } else if l_present.iter().all(|token| parse_float_token(token).is_some()) {
        EnumColumnKind::Decimal
    } else if l_present.iter().all(|token| parse_bool_token(token).is_some()) {
        EnumColumnKind::Boolean
    } else {
        EnumColumnKind::Text
    }
}

/// Rename repeated names positionally: `A, A, A` → `A, A.1, A.2`.
///
/// A generated name that is already taken keeps counting (`A.1` → `A.1.1`).
pub fn mangle_duplicate_names(names: &[String]) -> Vec<String> {
    let mut dict_counts: HashMap<String, usize> = HashMap::new();
    let mut l_names = Vec::with_capacity(names.len());

    for c_name in names {
        let mut c_name = c_name.clone();
        let mut n_count = dict_counts.get(&c_name).copied().unwrap_or(0);
        while n_count > 0 {
            dict_counts.insert(c_name.clone(), n_count + 1);
            c_name = format!("{c_name}{C_DUPLICATE_NAME_SEP}{n_count}");
            n_count = dict_counts.get(&c_name).copied().unwrap_or(0);
        }
        dict_counts.insert(c_name.clone(), n_count + 1);
        l_names.push(c_name);
    }

    l_names
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(tokens: &[Option<&str>]) -> Vec<Option<String>> {
        tokens.iter().map(|t| t.map(ToString::to_string)).collect()
    }

    fn names(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(ToString::to_string).collect()
    }

    fn split(line: &str) -> Vec<String> {
        split_fields(line).expect("closed quotes")
    }

    #[test]
    fn split_fields_collapses_runs_of_spaces_and_tabs() {
        assert_eq!(split("  a \t\tb   c  \r"), names(&["a", "b", "c"]));
        assert!(split(" \t ").is_empty());
    }

    #[test]
    fn split_fields_keeps_other_unicode_spaces_inside_fields() {
        assert_eq!(
            split("foo\u{a0}bar 3 x\u{3000}y\u{b}z"),
            names(&["foo\u{a0}bar", "3", "x\u{3000}y\u{b}z"])
        );
    }

    #[test]
    fn split_fields_reads_quoted_runs_as_one_field() {
        assert_eq!(split("\"New York\" 3"), names(&["New York", "3"]));
        assert_eq!(split("\"say \"\"hi\"\"\" x"), names(&["say \"hi\"", "x"]));
        assert_eq!(split("a \"\" b"), names(&["a", "", "b"]));
        assert_eq!(split("\"ab\"cd e"), names(&["abcd", "e"]));
        assert_eq!(split("ab\"c d"), names(&["ab\"c", "d"]));
    }

    #[test]
    fn split_fields_rejects_unclosed_quote() {
        assert_eq!(split_fields("a \"b c"), None);
    }

    #[test]
    fn infer_column_kind_picks_narrowest_kind() {
        assert_eq!(
            infer_column_kind(&cells(&[Some("1"), None, Some("-3")])),
            EnumColumnKind::Integer
        );
        assert_eq!(
            infer_column_kind(&cells(&[Some("1"), Some("2.5"), Some("1e-3")])),
            EnumColumnKind::Decimal
        );
        assert_eq!(
            infer_column_kind(&cells(&[Some("True"), Some("false")])),
            EnumColumnKind::Boolean
        );
        assert_eq!(
            infer_column_kind(&cells(&[Some("1"), Some("x")])),
            EnumColumnKind::Text
        );
        assert_eq!(infer_column_kind(&cells(&[None, None])), EnumColumnKind::Text);
        assert_eq!(infer_column_kind(&[]), EnumColumnKind::Text);
    }

    #[test]
    fn infer_column_kind_promotes_int_overflow_to_decimal() {
        assert_eq!(
            infer_column_kind(&cells(&[Some("99999999999999999999")])),
            EnumColumnKind::Decimal
        );
    }

    #[test]
    fn is_na_token_uses_configured_markers() {
        let na_values = names(&["NA", "-"]);
        assert!(is_na_token("NA", &na_values));
        assert!(is_na_token("-", &na_values));
        assert!(!is_na_token("nan", &na_values));
    }

    #[test]
    fn mangle_duplicate_names_counts_per_name() {
        assert_eq!(
            mangle_duplicate_names(&names(&["A", "B", "A", "A"])),
            names(&["A", "B", "A.1", "A.2"])
        );
        assert_eq!(
            mangle_duplicate_names(&names(&["A", "A.1", "A"])),
            names(&["A", "A.1", "A.1.1"])
        );
        assert_eq!(
            mangle_duplicate_names(&names(&["A", "A", "A.1"])),
            names(&["A", "A.1", "A.1.1"])
        );
    }
}
