//! Weighted fuzzy rules

use derive_more::Display;
use serde::{Deserialize, Serialize};

/// How an antecedent folds into the running rule strength
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operator {
    /// `min(strength, m)`
    #[default]
    #[display(fmt = "AND")]
    And,
    /// `max(strength, m)`
    #[display(fmt = "OR")]
    Or,
    /// `min(strength, 1 - m)`
    #[display(fmt = "NOT")]
    Not,
}

impl Operator {
    pub fn apply(self, strength: f64, membership: f64) -> f64 {
        match self {
            Operator::And => strength.min(membership),
            Operator::Or => strength.max(membership),
            Operator::Not => strength.min(1.0 - membership),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Antecedent {
    pub variable: String,
    pub set: String,
    #[serde(default)]
    pub operator: Operator,
}

impl Antecedent {
    pub fn new(variable: impl Into<String>, set: impl Into<String>, operator: Operator) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
            operator,
        }
    }
}

/// Output set a rule fires into, scaled by `value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Consequent {
    pub variable: String,
    pub set: String,
    #[serde(default = "default_unit")]
    pub value: f64,
}

impl Consequent {
    pub fn new(variable: impl Into<String>, set: impl Into<String>, value: f64) -> Self {
        Self {
            variable: variable.into(),
            set: set.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuzzyRule {
    pub id: String,
    /// Folded left to right starting from 1.0
    pub antecedents: Vec<Antecedent>,
    pub consequent: Consequent,
    #[serde(default = "default_unit")]
    pub weight: f64,
}

fn default_unit() -> f64 {
    1.0
}

impl FuzzyRule {
    /// Rule with no antecedents and weight 1.0. Chain [`and`](Self::and),
    /// [`or`](Self::or) and [`not`](Self::not) to add conditions in order.
    pub fn new(id: impl Into<String>, consequent: Consequent) -> Self {
        Self {
            id: id.into(),
            antecedents: Vec::new(),
            consequent,
            weight: 1.0,
        }
    }

    pub fn and(self, variable: &str, set: &str) -> Self {
        self.push(variable, set, Operator::And)
    }

    pub fn or(self, variable: &str, set: &str) -> Self {
        self.push(variable, set, Operator::Or)
    }

    pub fn not(self, variable: &str, set: &str) -> Self {
        self.push(variable, set, Operator::Not)
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    fn push(mut self, variable: &str, set: &str, operator: Operator) -> Self {
        self.antecedents.push(Antecedent::new(variable, set, operator));
        self
    }
}
