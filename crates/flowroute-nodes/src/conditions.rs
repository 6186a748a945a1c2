// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Condition evaluation shared by the If, Filter and Switch nodes.
//!
//! Each condition resolves its operands against the current item, brings
//! them to the operator's type (strictly or loosely), then applies the
//! operation. Presence operations (`exists`, `notExists`, `empty`,
//! `notEmpty`) look at the raw value and never fail type validation.
//!
//! A missing or null operand compares as absent: positive operations on an
//! absent value are false, their negations true. Two absent values are equal.

use chrono::{DateTime, Utc};
use flowroute_core::time::{from_epoch_millis, parse_datetime};
use flowroute_dsl::coercion::{CoercionError, coerce_to_type};
use flowroute_dsl::{
    Combinator, Condition, ConditionGroup, ConditionOperation as Op, ConditionOptions, FieldType,
    OperandType, TypeValidation,
};
use regex::{Regex, RegexBuilder};
use serde_json::Value;

use crate::expression::resolve;
use crate::item::Item;
use crate::types::NodeError;

/// Check if two JSON values are equal.
///
/// - Numbers are compared numerically (`1 == 1.0`)
/// - Arrays and objects use element-wise comparison
/// - Values of different JSON types are never equal
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(l), Value::Bool(r)) => l == r,
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(lf), Some(rf)) => numbers_equal(lf, rf),
            _ => false,
        },
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(a, b)| values_equal(a, b))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(k, v)| r.get(k).is_some_and(|rv| values_equal(v, rv)))
        }
        _ => false,
    }
}

fn numbers_equal(left: f64, right: f64) -> bool {
    (left - right).abs() < f64::EPSILON
}

/// Check if a JSON value is "empty": null, `""`, `[]` or `{}`.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// An operand brought to its operator's type.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Absent,
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
    Boolean(bool),
    Array(Vec<Value>),
    Object,
}

fn field_type(operand_type: OperandType) -> Option<FieldType> {
    match operand_type {
        OperandType::String => Some(FieldType::String),
        OperandType::Number => Some(FieldType::Number),
        OperandType::Boolean => Some(FieldType::Boolean),
        OperandType::Array => Some(FieldType::Array),
        OperandType::Object => Some(FieldType::Object),
        OperandType::DateTime => None,
    }
}

fn to_operand(
    value: Value,
    operand_type: OperandType,
    validation: TypeValidation,
) -> Result<Operand, CoercionError> {
    if value.is_null() {
        return Ok(Operand::Absent);
    }

    let mismatch = |value: &Value| CoercionError::new(value, operand_type.to_string());

    let Some(target) = field_type(operand_type) else {
        let date = match (&value, validation) {
            (Value::String(s), _) => parse_datetime(s),
            (Value::Number(n), TypeValidation::Loose) => n.as_f64().and_then(from_epoch_millis),
            _ => None,
        };
        return date.map(Operand::Date).ok_or_else(|| mismatch(&value));
    };

    let typed = match validation {
        TypeValidation::Strict => value,
        TypeValidation::Loose => coerce_to_type(&value, target)
            .map_err(|_| mismatch(&value))?,
    };

    match typed {
        Value::String(s) if target == FieldType::String => Ok(Operand::Text(s)),
        Value::Number(n) if target == FieldType::Number => match n.as_f64() {
            Some(f) => Ok(Operand::Number(f)),
            None => Err(mismatch(&Value::Number(n))),
        },
        Value::Bool(b) if target == FieldType::Boolean => Ok(Operand::Boolean(b)),
        Value::Array(a) if target == FieldType::Array => Ok(Operand::Array(a)),
        Value::Object(_) if target == FieldType::Object => Ok(Operand::Object),
        other => Err(mismatch(&other)),
    }
}

/// Positive form of an operation, and whether the result is negated.
fn positive_form(operation: Op) -> (Op, bool) {
    match operation {
        Op::NotEquals => (Op::Equals, true),
        Op::NotContains => (Op::Contains, true),
        Op::NotStartsWith => (Op::StartsWith, true),
        Op::NotEndsWith => (Op::EndsWith, true),
        Op::NotRegex => (Op::Regex, true),
        Op::LengthNotEquals => (Op::LengthEquals, true),
        other => (other, false),
    }
}

/// Build a regex from `pattern` or `/pattern/flags`.
///
/// Flags `i`, `m`, `s` and `x` map to the matching regex options; `g` and
/// `u` are accepted and have no effect.
pub fn build_regex(pattern: &str, case_insensitive: bool) -> Result<Regex, NodeError> {
    let (body, flags) = match pattern.rfind('/') {
        Some(end)
            if end > 0
                && pattern.starts_with('/')
                && pattern[end + 1..]
                    .chars()
                    .all(|c| matches!(c, 'g' | 'i' | 'm' | 's' | 'u' | 'x')) =>
        {
            (&pattern[1..end], &pattern[end + 1..])
        }
        _ => (pattern, ""),
    };

    RegexBuilder::new(body)
        .case_insensitive(case_insensitive || flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .ignore_whitespace(flags.contains('x'))
        .build()
        .map_err(|e| {
            NodeError::item(
                "INVALID_REGEX",
                format!("Invalid regular expression '{}': {}", pattern, e),
            )
            .with_attr("pattern", pattern)
        })
}

fn fold_case(operand: Operand, case_sensitive: bool) -> Operand {
    match operand {
        Operand::Text(s) if !case_sensitive => Operand::Text(s.to_lowercase()),
        other => other,
    }
}

fn fold_value_case(value: &Value, case_sensitive: bool) -> Value {
    match value {
        Value::String(s) if !case_sensitive => Value::String(s.to_lowercase()),
        other => other.clone(),
    }
}

fn compare_numbers(operation: Op, left: f64, right: f64) -> bool {
    match operation {
        Op::Equals | Op::LengthEquals => numbers_equal(left, right),
        Op::Gt | Op::LengthGt => left > right,
        Op::Lt | Op::LengthLt => left < right,
        Op::Gte | Op::LengthGte => left >= right,
        Op::Lte | Op::LengthLte => left <= right,
        _ => false,
    }
}

fn apply(
    operation: Op,
    left: &Operand,
    right: &Operand,
    raw_right: &Value,
    options: ConditionOptions,
) -> Result<bool, NodeError> {
    use Operand as O;

    let result = match (operation, left, right) {
        (Op::Equals, O::Absent, O::Absent) => true,
        (Op::Equals, O::Text(l), O::Text(r)) => l == r,
        (Op::Equals, O::Number(l), O::Number(r)) => numbers_equal(*l, *r),
        (Op::Equals, O::Date(l), O::Date(r)) => l == r,
        (Op::Equals, O::Boolean(l), O::Boolean(r)) => l == r,

        (Op::Contains, O::Text(l), O::Text(r)) => l.contains(r.as_str()),
        (Op::StartsWith, O::Text(l), O::Text(r)) => l.starts_with(r.as_str()),
        (Op::EndsWith, O::Text(l), O::Text(r)) => l.ends_with(r.as_str()),
        (Op::Regex, O::Text(l), O::Text(pattern)) => {
            build_regex(pattern, !options.case_sensitive)?.is_match(l)
        }

        (Op::Gt | Op::Lt | Op::Gte | Op::Lte, O::Number(l), O::Number(r)) => {
            compare_numbers(operation, *l, *r)
        }

        (Op::After, O::Date(l), O::Date(r)) => l > r,
        (Op::Before, O::Date(l), O::Date(r)) => l < r,
        (Op::AfterOrEquals, O::Date(l), O::Date(r)) => l >= r,
        (Op::BeforeOrEquals, O::Date(l), O::Date(r)) => l <= r,

        (Op::True, O::Boolean(b), _) => *b,
        (Op::False, O::Boolean(b), _) => !*b,

        (Op::Contains, O::Array(elements), _) => {
            let needle = fold_value_case(raw_right, options.case_sensitive);
            elements
                .iter()
                .any(|e| values_equal(&fold_value_case(e, options.case_sensitive), &needle))
        }
        (
            Op::LengthEquals | Op::LengthGt | Op::LengthLt | Op::LengthGte | Op::LengthLte,
            O::Array(elements),
            O::Number(n),
        ) => compare_numbers(operation, elements.len() as f64, *n),

        _ => false,
    };
    Ok(result)
}

/// Evaluate one condition for the item at `index`.
pub fn evaluate_condition(
    condition: &Condition,
    options: ConditionOptions,
    item: &Item,
    index: usize,
) -> Result<bool, NodeError> {
    let operator = condition.operator;
    let left_raw = resolve(&condition.left_value, item, index)?;

    match operator.operation {
        Op::Exists => return Ok(!left_raw.is_null()),
        Op::NotExists => return Ok(left_raw.is_null()),
        Op::Empty => return Ok(is_empty_value(&left_raw)),
        Op::NotEmpty => return Ok(!is_empty_value(&left_raw)),
        _ => {}
    }

    let validation = options.type_validation;
    let left = to_operand(left_raw, operator.operand_type, validation)
        .map_err(|e| NodeError::from(e).with_attr("operand", "left"))?;
    let left = fold_case(left, options.case_sensitive);

    let right_raw = match &condition.right_value {
        Some(value) if !operator.operation.is_unary() => resolve(value, item, index)?,
        _ => Value::Null,
    };

    let (operation, negated) = positive_form(operator.operation);
    let right = match (operator.operand_type, operation) {
        (OperandType::Array, Op::Contains) => Operand::Absent,
        (OperandType::Array, _) => to_operand(right_raw.clone(), OperandType::Number, validation)
            .map_err(|e| NodeError::from(e).with_attr("operand", "right"))?,
        (_, Op::Regex) => to_operand(right_raw.clone(), OperandType::String, validation)
            .map_err(|e| NodeError::from(e).with_attr("operand", "right"))?,
        (operand_type, _) if !operator.operation.is_unary() => {
            let right = to_operand(right_raw.clone(), operand_type, validation)
                .map_err(|e| NodeError::from(e).with_attr("operand", "right"))?;
            fold_case(right, options.case_sensitive)
        }
        _ => Operand::Absent,
    };

    let result = apply(operation, &left, &right, &right_raw, options)?;
    Ok(result != negated)
}

/// Evaluate a condition group for the item at `index`.
///
/// `and` stops at the first false condition, `or` at the first true one.
/// An empty group is true for `and` and false for `or`.
pub fn evaluate_group(
    group: &ConditionGroup,
    options: ConditionOptions,
    item: &Item,
    index: usize,
) -> Result<bool, NodeError> {
    let label = |position: usize, condition: &Condition| {
        condition
            .id
            .clone()
            .unwrap_or_else(|| position.to_string())
    };

    for (position, condition) in group.conditions.iter().enumerate() {
        let matched = evaluate_condition(condition, options, item, index)
            .map_err(|e| e.with_attr("condition", label(position, condition)))?;
        match (group.combinator, matched) {
            (Combinator::And, false) => return Ok(false),
            (Combinator::Or, true) => return Ok(true),
            _ => {}
        }
    }
    Ok(group.combinator == Combinator::And)
}

/// Check a group before running it.
pub fn validate_group(group: &ConditionGroup) -> Result<(), NodeError> {
    group
        .validate()
        .map_err(|message| NodeError::configuration("INVALID_CONDITION", message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowroute_dsl::{ConditionOperator, MappingValue};
    use serde_json::json;

    fn cond(left: MappingValue, operand_type: OperandType, operation: Op, right: Option<Value>) -> Condition {
        Condition {
            id: None,
            left_value: left,
            right_value: right.map(MappingValue::immediate),
            operator: ConditionOperator {
                operand_type,
                operation,
            },
        }
    }

    fn check(
        data: Value,
        operand_type: OperandType,
        operation: Op,
        field: &str,
        right: Option<Value>,
        options: ConditionOptions,
    ) -> Result<bool, NodeError> {
        let item = Item::from_value(data);
        let condition = cond(MappingValue::reference(field), operand_type, operation, right);
        evaluate_condition(&condition, options, &item, 0)
    }

    fn strict() -> ConditionOptions {
        ConditionOptions::default()
    }

    fn loose() -> ConditionOptions {
        ConditionOptions {
            case_sensitive: true,
            type_validation: TypeValidation::Loose,
        }
    }

    fn insensitive() -> ConditionOptions {
        ConditionOptions {
            case_sensitive: false,
            type_validation: TypeValidation::Strict,
        }
    }

    #[test]
    fn test_values_equal() {
        assert!(values_equal(&json!(42.0), &json!(42)));
        assert!(values_equal(&json!({"a": [1, 2]}), &json!({"a": [1.0, 2]})));
        assert!(!values_equal(&json!("42"), &json!(42)));
        assert!(!values_equal(&json!([1]), &json!([1, 2])));
    }

    #[test]
    fn test_is_empty_value() {
        for v in [json!(null), json!(""), json!([]), json!({})] {
            assert!(is_empty_value(&v), "{} should be empty", v);
        }
        for v in [json!(0), json!(false), json!(" "), json!([null])] {
            assert!(!is_empty_value(&v), "{} should not be empty", v);
        }
    }

    #[test]
    fn test_presence_operations_skip_type_validation() {
        let data = json!({"a": "text", "e": "", "n": null});
        assert!(check(data.clone(), OperandType::Number, Op::Exists, "a", None, strict()).unwrap());
        assert!(check(data.clone(), OperandType::Number, Op::NotExists, "missing", None, strict()).unwrap());
        assert!(check(data.clone(), OperandType::Number, Op::NotExists, "n", None, strict()).unwrap());
        assert!(check(data.clone(), OperandType::String, Op::Empty, "e", None, strict()).unwrap());
        assert!(check(data, OperandType::Object, Op::NotEmpty, "a", None, strict()).unwrap());
    }

    #[test]
    fn test_string_operations() {
        let data = json!({"s": "Hello World"});
        let s = |op, right: &str| {
            check(data.clone(), OperandType::String, op, "s", Some(json!(right)), strict()).unwrap()
        };
        assert!(s(Op::Equals, "Hello World"));
        assert!(s(Op::NotEquals, "hello world"));
        assert!(s(Op::Contains, "lo W"));
        assert!(s(Op::NotContains, "xyz"));
        assert!(s(Op::StartsWith, "Hell"));
        assert!(s(Op::NotStartsWith, "World"));
        assert!(s(Op::EndsWith, "World"));
        assert!(s(Op::NotEndsWith, "Hello"));
        assert!(s(Op::Regex, "^H.*d$"));
        assert!(s(Op::NotRegex, "^\\d+$"));
    }

    #[test]
    fn test_case_insensitive_strings() {
        let data = json!({"s": "Hello World"});
        assert!(
            check(data.clone(), OperandType::String, Op::Equals, "s", Some(json!("hello world")), insensitive())
                .unwrap()
        );
        assert!(
            check(data.clone(), OperandType::String, Op::Regex, "s", Some(json!("^hello")), insensitive())
                .unwrap()
        );
        assert!(
            !check(data, OperandType::String, Op::Regex, "s", Some(json!("^hello")), strict()).unwrap()
        );
    }

    #[test]
    fn test_regex_flags() {
        assert!(build_regex("/^abc$/i", false).unwrap().is_match("ABC"));
        assert!(build_regex("/^b$/m", false).unwrap().is_match("a\nb\nc"));
        assert!(build_regex("/a.c/s", false).unwrap().is_match("a\nc"));
        assert!(build_regex("/a b c/x", false).unwrap().is_match("abc"));
        assert!(build_regex("/abc/g", false).unwrap().is_match("xabcx"));
        // Not a flag list: the slashes are part of the pattern
        assert!(build_regex("a/b", false).unwrap().is_match("a/b"));

        let err = build_regex("(unclosed", false).unwrap_err();
        assert_eq!(err.code, "INVALID_REGEX");
        assert!(err.is_item_error());
    }

    #[test]
    fn test_number_operations() {
        let data = json!({"n": 10});
        let n = |op, right: Value| {
            check(data.clone(), OperandType::Number, op, "n", Some(right), strict()).unwrap()
        };
        assert!(n(Op::Equals, json!(10.0)));
        assert!(n(Op::NotEquals, json!(11)));
        assert!(n(Op::Gt, json!(9)));
        assert!(!n(Op::Gt, json!(10)));
        assert!(n(Op::Gte, json!(10)));
        assert!(n(Op::Lt, json!(10.5)));
        assert!(n(Op::Lte, json!(10)));
    }

    #[test]
    fn test_number_equality_tolerance() {
        let sum = json!({"n": 0.1 + 0.2});
        let eq = |right: Value| {
            check(sum.clone(), OperandType::Number, Op::Equals, "n", Some(right), strict()).unwrap()
        };
        assert!(eq(json!(0.3)));
        assert!(!eq(json!(0.3 + 1e-15)));
        assert!(
            !check(sum.clone(), OperandType::Number, Op::NotEquals, "n", Some(json!(0.3)), strict())
                .unwrap()
        );

        assert!(values_equal(&json!([0.1 + 0.2]), &json!([0.3])));
        assert!(!values_equal(&json!(0.3), &json!(0.3 + 1e-15)));
    }

    #[test]
    fn test_strict_type_mismatch_is_item_error() {
        let err = check(json!({"n": "10"}), OperandType::Number, Op::Gt, "n", Some(json!(5)), strict())
            .unwrap_err();
        assert_eq!(err.code, "TYPE_VALIDATION_ERROR");
        assert_eq!(
            err.message,
            "Wrong type: '10' is a string but was expecting a number"
        );
        assert_eq!(err.attributes.get("operand"), Some(&"left".to_string()));
    }

    #[test]
    fn test_loose_conversions() {
        assert!(
            check(json!({"n": "10"}), OperandType::Number, Op::Gt, "n", Some(json!(5)), loose()).unwrap()
        );
        assert!(
            check(json!({"b": "TRUE"}), OperandType::Boolean, Op::True, "b", None, loose()).unwrap()
        );
        assert!(
            check(json!({"b": 0}), OperandType::Boolean, Op::False, "b", None, loose()).unwrap()
        );
        assert!(
            check(json!({"s": 42}), OperandType::String, Op::Equals, "s", Some(json!("42")), loose())
                .unwrap()
        );
        assert!(
            check(json!({"a": "[1,2,3]"}), OperandType::Array, Op::LengthEquals, "a", Some(json!(3)), loose())
                .unwrap()
        );
        let err = check(json!({"n": "ten"}), OperandType::Number, Op::Gt, "n", Some(json!(5)), loose())
            .unwrap_err();
        assert!(err.message.starts_with("Wrong type: 'ten' is a string"));
    }

    #[test]
    fn test_absent_operands() {
        let data = json!({"n": null});
        assert!(!check(data.clone(), OperandType::Number, Op::Gt, "n", Some(json!(1)), strict()).unwrap());
        assert!(!check(data.clone(), OperandType::String, Op::Equals, "n", Some(json!("x")), strict()).unwrap());
        assert!(check(data.clone(), OperandType::String, Op::NotEquals, "n", Some(json!("x")), strict()).unwrap());
        assert!(check(data.clone(), OperandType::String, Op::Equals, "n", Some(json!(null)), strict()).unwrap());
        assert!(!check(data, OperandType::Boolean, Op::True, "missing", None, strict()).unwrap());
    }

    #[test]
    fn test_date_operations() {
        let data = json!({"d": "2024-05-01T10:00:00+02:00"});
        let d = |op, right: Value, options| {
            check(data.clone(), OperandType::DateTime, op, "d", Some(right), options).unwrap()
        };
        assert!(d(Op::Equals, json!("2024-05-01T08:00:00Z"), strict()));
        assert!(d(Op::After, json!("2024-05-01"), strict()));
        assert!(d(Op::Before, json!("2024-05-02"), strict()));
        assert!(d(Op::AfterOrEquals, json!("2024-05-01 08:00:00"), strict()));
        assert!(d(Op::BeforeOrEquals, json!("2024-05-01T08:00:00Z"), strict()));
        // Epoch milliseconds only in loose mode
        assert!(d(Op::After, json!(0), loose()));
        assert!(
            check(data, OperandType::DateTime, Op::After, "d", Some(json!(0)), strict()).is_err()
        );

        let err = check(json!({"d": "yesterday"}), OperandType::DateTime, Op::After, "d", Some(json!("2024-01-01")), strict())
            .unwrap_err();
        assert_eq!(
            err.message,
            "Wrong type: 'yesterday' is a string but was expecting a dateTime"
        );
    }

    #[test]
    fn test_boolean_operations() {
        let data = json!({"b": true});
        assert!(check(data.clone(), OperandType::Boolean, Op::True, "b", None, strict()).unwrap());
        assert!(!check(data.clone(), OperandType::Boolean, Op::False, "b", None, strict()).unwrap());
        assert!(check(data.clone(), OperandType::Boolean, Op::Equals, "b", Some(json!(true)), strict()).unwrap());
        assert!(check(data, OperandType::Boolean, Op::NotEquals, "b", Some(json!(false)), strict()).unwrap());
    }

    #[test]
    fn test_array_operations() {
        let data = json!({"a": [1, "Two", {"k": 3}]});
        let a = |op, right: Value, options| {
            check(data.clone(), OperandType::Array, op, "a", Some(right), options).unwrap()
        };
        assert!(a(Op::Contains, json!(1.0), strict()));
        assert!(a(Op::Contains, json!({"k": 3}), strict()));
        assert!(!a(Op::Contains, json!("two"), strict()));
        assert!(a(Op::Contains, json!("two"), insensitive()));
        assert!(a(Op::NotContains, json!(4), strict()));
        assert!(a(Op::LengthEquals, json!(3), strict()));
        assert!(a(Op::LengthNotEquals, json!(2), strict()));
        assert!(a(Op::LengthGt, json!(2), strict()));
        assert!(a(Op::LengthLt, json!(4), strict()));
        assert!(a(Op::LengthGte, json!(3), strict()));
        assert!(a(Op::LengthLte, json!(3), strict()));
    }

    fn group(combinator: Combinator, conditions: Vec<Condition>) -> ConditionGroup {
        ConditionGroup {
            conditions,
            combinator,
            options: ConditionOptions::default(),
        }
    }

    #[test]
    fn test_group_combinators() {
        let item = Item::from_value(json!({"a": 1, "b": "x"}));
        let yes = cond(MappingValue::reference("a"), OperandType::Number, Op::Equals, Some(json!(1)));
        let no = cond(MappingValue::reference("b"), OperandType::String, Op::Equals, Some(json!("y")));

        let and = group(Combinator::And, vec![yes.clone(), no.clone()]);
        assert!(!evaluate_group(&and, and.options, &item, 0).unwrap());

        let or = group(Combinator::Or, vec![no, yes]);
        assert!(evaluate_group(&or, or.options, &item, 0).unwrap());

        assert!(evaluate_group(&group(Combinator::And, vec![]), strict(), &item, 0).unwrap());
        assert!(!evaluate_group(&group(Combinator::Or, vec![]), strict(), &item, 0).unwrap());
    }

    #[test]
    fn test_group_short_circuits_before_type_errors() {
        let item = Item::from_value(json!({"a": 1, "s": "text"}));
        let fails = cond(MappingValue::reference("a"), OperandType::Number, Op::Equals, Some(json!(2)));
        let broken = cond(MappingValue::reference("s"), OperandType::Number, Op::Gt, Some(json!(1)));

        let and = group(Combinator::And, vec![fails, broken.clone()]);
        assert!(!evaluate_group(&and, strict(), &item, 0).unwrap());

        let only_broken = group(Combinator::And, vec![broken]);
        let err = evaluate_group(&only_broken, strict(), &item, 0).unwrap_err();
        assert_eq!(err.attributes.get("condition"), Some(&"0".to_string()));
    }

    #[test]
    fn test_validate_group_rejects_unsupported_operation() {
        let bad = group(
            Combinator::And,
            vec![cond(MappingValue::reference("a"), OperandType::Object, Op::Gt, Some(json!(1)))],
        );
        let err = validate_group(&bad).unwrap_err();
        assert_eq!(err.code, "INVALID_CONDITION");
        assert!(!err.is_item_error());
    }
}
