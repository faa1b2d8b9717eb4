//! Input bag for a decision, addressed by dotted paths

use serde_json::{json, Map, Value};

use crate::core::error::{Result, SwarmError};
use crate::core::types::SimTime;

/// Path read for the decision timestamp
pub const TIME_PATH: &str = "worldState.time";

/// Arbitrary JSON document a decision is computed from.
///
/// Variables are looked up by dotted path: object keys, array indices, and
/// `length` on arrays (`nearbyEntities.length`, `agentState.health`).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DecisionInput {
    root: Value,
}

impl DecisionInput {
    /// Standard layout: `agentState`, `worldState`, `nearbyEntities`
    pub fn new(agent_state: Value, world_state: Value, nearby_entities: Vec<Value>) -> Self {
        Self {
            root: json!({
                "agentState": agent_state,
                "worldState": world_state,
                "nearbyEntities": nearby_entities,
            }),
        }
    }

    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn as_value(&self) -> &Value {
        &self.root
    }

    /// Set a number at `path`, creating intermediate objects. Non-object
    /// values on the way are replaced.
    pub fn with_value(mut self, path: &str, value: f64) -> Self {
        let mut node = &mut self.root;
        for segment in path.split('.') {
            if !node.is_object() {
                *node = Value::Object(Map::new());
            }
            node = &mut node[segment];
        }
        *node = json!(value);
        self
    }

    /// Scalar at `path`. Missing and non-numeric values read as 0, booleans
    /// as 0 or 1.
    pub fn resolve(&self, path: &str) -> Result<f64> {
        let mut node = &self.root;
        for segment in path.split('.') {
            let next = match node {
                Value::Object(map) => map.get(segment),
                Value::Array(items) if segment == "length" => {
                    return finite(path, items.len() as f64);
                }
                Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
                _ => None,
            };
            match next {
                Some(value) => node = value,
                None => return Ok(0.0),
            }
        }

        match node {
            Value::Number(n) => finite(path, n.as_f64().unwrap_or(0.0)),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            _ => Ok(0.0),
        }
    }

    /// `worldState.time`, or 0 when absent
    pub fn timestamp(&self) -> SimTime {
        self.resolve(TIME_PATH).unwrap_or(0.0)
    }
}

impl From<Value> for DecisionInput {
    fn from(root: Value) -> Self {
        Self::from_value(root)
    }
}

fn finite(path: &str, value: f64) -> Result<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(SwarmError::Computation(format!(
            "input '{}' is not a finite number",
            path
        )))
    }
}
