//! Predicates: keypath -> condition-set guards evaluated against the state.
//!
//! A predicate holds iff every operator on every keypath holds. The operator
//! set is closed; an operator name outside it never holds.

mod compare;

pub use compare::*;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::state::State;

/// Comparison operators usable in a condition set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operator {
    /// Value is greater than or equal to the operand.
    Gte,
    /// Value is less than or equal to the operand.
    Lte,
    /// Value equals the operand.
    Eq,
    /// Presence of the value matches the operand's truthiness.
    Exists,
}

/// Operator names as they appear in story data.
const OPERATORS: &[(&str, Operator)] = &[
    ("gte", Operator::Gte),
    ("lte", Operator::Lte),
    ("eq", Operator::Eq),
    ("exists", Operator::Exists),
];

impl Operator {
    /// Look up an operator by name.
    pub fn from_name(name: &str) -> Option<Self> {
        OPERATORS
            .iter()
            .find(|(candidate, _)| *candidate == name)
            .map(|(_, op)| *op)
    }

    /// The name used in story data.
    pub fn name(&self) -> &'static str {
        match self {
            Operator::Gte => "gte",
            Operator::Lte => "lte",
            Operator::Eq => "eq",
            Operator::Exists => "exists",
        }
    }

    /// Apply the operator to a resolved value (`None` when absent).
    pub fn evaluate(&self, value: Option<&Value>, operand: &Value) -> bool {
        match self {
            Operator::Gte => compare(value, operand).is_some_and(|ord| ord.is_ge()),
            Operator::Lte => compare(value, operand).is_some_and(|ord| ord.is_le()),
            Operator::Eq => value.is_some_and(|v| loosely_equal(v, operand)),
            Operator::Exists => value.is_some() == is_truthy(operand),
        }
    }
}

impl std::fmt::Display for Operator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Operator name -> operand conditions on a single keypath.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionSet(BTreeMap<String, Value>);

impl ConditionSet {
    /// Create an empty condition set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn with(mut self, op: Operator, operand: impl Into<Value>) -> Self {
        self.0.insert(op.name().to_string(), operand.into());
        self
    }

    /// Whether every condition holds for `value`.
    pub fn holds(&self, value: Option<&Value>) -> bool {
        self.0.iter().all(|(name, operand)| match Operator::from_name(name) {
            Some(op) => op.evaluate(value, operand),
            None => false,
        })
    }

    /// Iterate raw operator names and operands.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, operand)| (name.as_str(), operand))
    }

    /// Number of conditions.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Keypath -> condition-set guard.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Predicate(BTreeMap<String, ConditionSet>);

impl Predicate {
    /// Create an empty predicate, which always holds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition on a keypath.
    pub fn with_condition(
        mut self,
        keypath: impl Into<String>,
        op: Operator,
        operand: impl Into<Value>,
    ) -> Self {
        let keypath = keypath.into();
        let conditions = self.0.remove(&keypath).unwrap_or_default();
        self.0.insert(keypath, conditions.with(op, operand));
        self
    }

    /// Evaluate against a state.
    pub fn holds(&self, state: &State) -> bool {
        self.0
            .iter()
            .all(|(keypath, conditions)| conditions.holds(state.get(keypath)))
    }

    /// Whether the predicate has no conditions.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Evaluate an optional guard; a missing guard holds.
pub fn holds(state: &State, predicate: Option<&Predicate>) -> bool {
    predicate.map_or(true, |p| p.holds(state))
}
