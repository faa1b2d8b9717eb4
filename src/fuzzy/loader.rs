//! Declarative fuzzy variables and rules loaded from TOML
//!
//! ```toml
//! [[variables]]
//! name = "threat_level"
//!
//! [[variables.sets]]
//! name = "high"
//! shape = "triangle"
//! points = [0.5, 1.0, 1.0]
//! domain = [0.0, 1.0]
//!
//! [[rules]]
//! id = "avoid_danger"
//! weight = 1.2
//! antecedents = [{ variable = "threat_level", set = "high", operator = "AND" }]
//! consequent = { variable = "escape_action", set = "flee", value = 1.0 }
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{Result, SwarmError};
use crate::fuzzy::engine::FuzzyDecisionEngine;
use crate::fuzzy::membership::FuzzySet;
use crate::fuzzy::rule::FuzzyRule;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    Triangle,
    Trapezoid,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetDefinition {
    pub name: String,
    pub shape: Shape,
    pub points: Vec<f64>,
    /// Defaults to the shape's support
    #[serde(default)]
    pub domain: Option<[f64; 2]>,
}

impl SetDefinition {
    pub fn to_set(&self) -> Result<FuzzySet> {
        let set = match (self.shape, self.points.as_slice()) {
            (Shape::Triangle, &[a, b, c]) => FuzzySet::triangle(self.name.as_str(), a, b, c)?,
            (Shape::Trapezoid, &[a, b, c, d]) => FuzzySet::trapezoid(self.name.as_str(), a, b, c, d)?,
            (shape, points) => {
                return Err(SwarmError::InvalidFuzzySet {
                    set: self.name.clone(),
                    reason: format!("{:?} takes {} points, got {}", shape, shape_arity(shape), points.len()),
                })
            }
        };
        match self.domain {
            Some([lo, hi]) => set.with_domain(lo, hi),
            None => Ok(set),
        }
    }
}

fn shape_arity(shape: Shape) -> usize {
    match shape {
        Shape::Triangle => 3,
        Shape::Trapezoid => 4,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub sets: Vec<SetDefinition>,
}

/// Variables and rules as read from a definitions file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FuzzyDefinitions {
    #[serde(default)]
    pub variables: Vec<VariableDefinition>,
    #[serde(default)]
    pub rules: Vec<FuzzyRule>,
}

impl FuzzyDefinitions {
    /// Register every set, then every rule. Stops at the first invalid entry;
    /// entries before it stay registered.
    pub fn install(&self, engine: &mut FuzzyDecisionEngine) -> Result<()> {
        for variable in &self.variables {
            for definition in &variable.sets {
                engine.register_fuzzy_set(&variable.name, definition.to_set()?);
            }
        }
        for rule in &self.rules {
            engine.register_rule(rule.clone())?;
        }
        Ok(())
    }
}

pub fn parse_definitions(content: &str) -> Result<FuzzyDefinitions> {
    Ok(toml::from_str(content)?)
}

pub fn load_definitions(path: &Path) -> Result<FuzzyDefinitions> {
    let content = std::fs::read_to_string(path)?;
    let definitions = parse_definitions(&content)?;
    tracing::info!(
        "Loaded {} fuzzy variables and {} rules from {}",
        definitions.variables.len(),
        definitions.rules.len(),
        path.display()
    );
    Ok(definitions)
}
