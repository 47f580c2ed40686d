//! Per-row predicate filters for scans.
//!
//! A [`FilterSet`] maps a column name to at most one [`Filter`]; columns
//! absent from the set are unconstrained. Evaluation is a pure, kind-aware
//! comparison between a reconstructed field value and the filter value —
//! there is no index and no pushdown, every candidate row is tested.

use std::cmp::Ordering;

use rustc_hash::FxHashMap;

use crate::types::Value;

/// Comparison condition attached to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Always passes; a filter with this kind is treated as absent.
    NoCondition,
    Equals,
    Distinct,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    /// Membership test. Currently evaluates to `false` for every row; kept
    /// as-is pending clarification (see crate docs).
    In,
    /// Range test. Currently evaluates to `false` for every row; kept as-is
    /// pending clarification (see crate docs).
    Between,
    /// Case-insensitive substring test against the stringified field value.
    Contains,
}

/// A predicate over one named column.
#[derive(Debug, Clone)]
pub struct Filter {
    pub column: String,
    pub condition: ConditionKind,
    pub value1: Option<Value>,
    pub value2: Option<Value>,
}

impl Filter {
    pub fn new(
        column: impl Into<String>,
        condition: ConditionKind,
        value1: Option<Value>,
        value2: Option<Value>,
    ) -> Filter {
        Filter {
            column: column.into(),
            condition,
            value1,
            value2,
        }
    }
}

/// Mapping from column name to at most one filter; last write wins.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    filters: FxHashMap<String, Filter>,
}

impl FilterSet {
    pub fn new() -> FilterSet {
        FilterSet::default()
    }

    /// Add a filter for `column`, replacing any previous one.
    pub fn add(
        &mut self,
        column: impl Into<String>,
        condition: ConditionKind,
        value1: Option<Value>,
        value2: Option<Value>,
    ) {
        self.insert(Filter::new(column, condition, value1, value2));
    }

    pub fn insert(&mut self, filter: Filter) {
        self.filters.insert(filter.column.clone(), filter);
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    /// The effective filter for `column`: present and constrained.
    pub fn get(&self, column: &str) -> Option<&Filter> {
        self.filters
            .get(column)
            .filter(|f| f.condition != ConditionKind::NoCondition)
    }

    /// Evaluate the filter (if any) for `column` against a field value.
    ///
    /// Columns without a constrained filter always pass. `Between` and `In`
    /// always fail — a pinned limitation carried over from the previous
    /// implementation rather than a deliberate choice.
    pub fn evaluate(&self, column: &str, value: Option<&Value>) -> bool {
        let filter = match self.get(column) {
            Some(filter) => filter,
            None => return true,
        };
        match filter.condition {
            ConditionKind::NoCondition => true,
            ConditionKind::Contains => {
                evaluate_contains(value, filter.value1.as_ref())
            }
            ConditionKind::Between | ConditionKind::In => false,
            ordering_condition => {
                let comparison = compare(value, filter.value1.as_ref());
                match ordering_condition {
                    ConditionKind::Equals => comparison == Ordering::Equal,
                    ConditionKind::Distinct => comparison != Ordering::Equal,
                    ConditionKind::Greater => comparison == Ordering::Greater,
                    ConditionKind::GreaterOrEqual => comparison != Ordering::Less,
                    ConditionKind::Less => comparison == Ordering::Less,
                    ConditionKind::LessOrEqual => comparison != Ordering::Greater,
                    _ => false,
                }
            }
        }
    }
}

fn evaluate_contains(value: Option<&Value>, needle: Option<&Value>) -> bool {
    let haystack = value.map(Value::to_string).unwrap_or_default();
    let needle = needle.map(Value::to_string).unwrap_or_default();
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Three-way, kind-aware comparison between a field value and a filter
/// value.
///
/// The field value's kind selects the rule: `Double`/`Decimal` compare as
/// doubles, the integer family (`Byte`/`Integer`/`Long`) as 64-bit
/// integers, `DateTime` chronologically, everything else as case-insensitive
/// strings. A null field value is less than any non-null value and equal to
/// a null filter value; a filter value that cannot be coerced to the field's
/// kind compares as the numeric default (zero / epoch / empty string).
fn compare(value: Option<&Value>, filter_value: Option<&Value>) -> Ordering {
    let value = match (value, filter_value) {
        (None, None) => return Ordering::Equal,
        (None, Some(_)) => return Ordering::Less,
        (Some(value), _) => value,
    };
    match value {
        Value::Double(_) | Value::Decimal(_) => {
            let left = value.as_f64().unwrap_or(0.0);
            let right = filter_value.and_then(Value::as_f64).unwrap_or(0.0);
            left.partial_cmp(&right).unwrap_or(Ordering::Equal)
        }
        Value::Byte(_) | Value::Integer(_) | Value::Long(_) => {
            let left = value.as_i64().unwrap_or(0);
            let right = filter_value.and_then(Value::as_i64).unwrap_or(0);
            left.cmp(&right)
        }
        Value::DateTime(micros) => {
            let right = filter_value
                .and_then(Value::as_datetime_micros)
                .unwrap_or(0);
            micros.cmp(&right)
        }
        other => {
            let left = other.to_string().to_uppercase();
            let right = filter_value
                .map(Value::to_string)
                .unwrap_or_default()
                .to_uppercase();
            left.cmp(&right)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(column: &str, condition: ConditionKind, value1: Option<Value>) -> FilterSet {
        let mut filters = FilterSet::new();
        filters.add(column, condition, value1, None);
        filters
    }

    #[test]
    fn test_unconstrained_columns_always_pass() {
        let filters = FilterSet::new();
        assert!(filters.evaluate("anything", Some(&Value::Integer(1))));
        assert!(filters.evaluate("anything", None));

        let no_condition = set("a", ConditionKind::NoCondition, Some(Value::Integer(1)));
        assert!(no_condition.evaluate("a", Some(&Value::Integer(99))));
        assert!(no_condition.get("a").is_none());
    }

    #[test]
    fn test_last_write_wins_per_column() {
        let mut filters = FilterSet::new();
        filters.add("a", ConditionKind::Equals, Some(Value::Integer(1)), None);
        filters.add("a", ConditionKind::Equals, Some(Value::Integer(2)), None);
        assert_eq!(filters.len(), 1);
        assert!(!filters.evaluate("a", Some(&Value::Integer(1))));
        assert!(filters.evaluate("a", Some(&Value::Integer(2))));
    }

    #[test]
    fn test_integer_family_compares_as_i64() {
        let filters = set("n", ConditionKind::Greater, Some(Value::Long(10)));
        assert!(filters.evaluate("n", Some(&Value::Byte(11))));
        assert!(filters.evaluate("n", Some(&Value::Integer(11))));
        assert!(!filters.evaluate("n", Some(&Value::Long(10))));

        let le = set("n", ConditionKind::LessOrEqual, Some(Value::Integer(5)));
        assert!(le.evaluate("n", Some(&Value::Long(5))));
        assert!(!le.evaluate("n", Some(&Value::Long(6))));
    }

    #[test]
    fn test_floating_and_decimal_compare_as_doubles() {
        use crate::decimal::DecimalValue;
        let filters = set("x", ConditionKind::Equals, Some(Value::Double(2.5)));
        assert!(filters.evaluate("x", Some(&Value::Double(2.5))));
        assert!(filters.evaluate(
            "x",
            Some(&Value::Decimal(DecimalValue::new(25, 1).unwrap()))
        ));
        assert!(!filters.evaluate("x", Some(&Value::Double(2.4))));
    }

    #[test]
    fn test_datetime_compares_chronologically() {
        let filters = set(
            "ts",
            ConditionKind::GreaterOrEqual,
            Some(Value::DateTime(1_000_000)),
        );
        assert!(filters.evaluate("ts", Some(&Value::DateTime(1_000_000))));
        assert!(!filters.evaluate("ts", Some(&Value::DateTime(999_999))));
    }

    #[test]
    fn test_strings_compare_case_insensitively() {
        let filters = set(
            "s",
            ConditionKind::Equals,
            Some(Value::String("HELLO".into())),
        );
        assert!(filters.evaluate("s", Some(&Value::String("hello".into()))));

        let distinct = set(
            "s",
            ConditionKind::Distinct,
            Some(Value::String("hello".into())),
        );
        assert!(!distinct.evaluate("s", Some(&Value::String("Hello".into()))));
        assert!(distinct.evaluate("s", Some(&Value::String("world".into()))));
    }

    #[test]
    fn test_null_sorts_below_everything() {
        let less = set("n", ConditionKind::Less, Some(Value::Integer(0)));
        assert!(less.evaluate("n", None));

        let equals = set("n", ConditionKind::Equals, None);
        assert!(equals.evaluate("n", None));
    }

    #[test]
    fn test_contains_is_case_insensitive_substring() {
        let filters = set(
            "s",
            ConditionKind::Contains,
            Some(Value::String("Duct".into())),
        );
        assert!(filters.evaluate("s", Some(&Value::String("Product 7".into()))));
        assert!(!filters.evaluate("s", Some(&Value::String("Prod 7".into()))));
        assert!(!filters.evaluate("s", None));

        // An empty needle matches every row, including null (empty) values.
        let empty = set("s", ConditionKind::Contains, None);
        assert!(empty.evaluate("s", None));
    }

    #[test]
    fn test_between_and_in_exclude_every_row() {
        // Pinned limitation: these conditions match nothing. Do not "fix"
        // without a product decision.
        let mut filters = FilterSet::new();
        filters.add(
            "n",
            ConditionKind::Between,
            Some(Value::Integer(0)),
            Some(Value::Integer(100)),
        );
        assert!(!filters.evaluate("n", Some(&Value::Integer(50))));

        filters.add("n", ConditionKind::In, Some(Value::Integer(50)), None);
        assert!(!filters.evaluate("n", Some(&Value::Integer(50))));
    }
}
