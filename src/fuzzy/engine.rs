//! Fuzzy inference: fuzzify, evaluate rules, aggregate, defuzzify

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use crate::core::error::{Result, SwarmError};
use crate::core::types::SimTime;
use crate::events::{EventPayload, EventSink, NullSink, SwarmEvent};
use crate::fuzzy::input::DecisionInput;
use crate::fuzzy::membership::FuzzySet;
use crate::fuzzy::rule::{Consequent, FuzzyRule};

/// Crisp output for one variable
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DecisionAction {
    pub variable: String,
    pub value: f64,
    /// Total aggregated strength behind `value`
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// One entry per output variable that fired, ordered by name
    pub actions: Vec<DecisionAction>,
    /// Mean of the action confidences, 0 with no actions
    pub confidence: f64,
    pub timestamp: SimTime,
}

impl Decision {
    pub fn action(&self, variable: &str) -> Option<&DecisionAction> {
        self.actions.iter().find(|a| a.variable == variable)
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

/// variable -> set -> degree
type Degrees<'a> = BTreeMap<&'a str, BTreeMap<&'a str, f64>>;

/// Rule-based decision maker over registered fuzzy variables.
///
/// Registration needs `&mut self`; `decide` only reads, so one engine can
/// serve many agents in parallel.
pub struct FuzzyDecisionEngine {
    variables: BTreeMap<String, BTreeMap<String, FuzzySet>>,
    rules: BTreeMap<String, FuzzyRule>,
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for FuzzyDecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FuzzyDecisionEngine")
            .field("variables", &self.variables.keys().collect::<Vec<_>>())
            .field("rules", &self.rules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for FuzzyDecisionEngine {
    fn default() -> Self {
        Self::new(Arc::new(NullSink))
    }
}

impl FuzzyDecisionEngine {
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            variables: BTreeMap::new(),
            rules: BTreeMap::new(),
            sink,
        }
    }

    /// Add or replace `set` under `variable`, creating the variable if needed
    pub fn register_fuzzy_set(&mut self, variable: &str, set: FuzzySet) {
        let set_name = set.name().to_string();
        self.variables
            .entry(variable.to_string())
            .or_default()
            .insert(set_name.clone(), set);

        // Registration happens outside simulated time
        self.sink.emit(SwarmEvent::new(
            0.0,
            EventPayload::FuzzySetAdded {
                variable: variable.to_string(),
                set: set_name,
            },
        ));
    }

    /// Validate and add `rule`, replacing any rule with the same id
    pub fn register_rule(&mut self, rule: FuzzyRule) -> Result<()> {
        self.validate_rule(&rule)?;

        let rule_id = rule.id.clone();
        self.rules.insert(rule_id.clone(), rule);
        self.sink
            .emit(SwarmEvent::new(0.0, EventPayload::RuleAdded { rule_id }));
        Ok(())
    }

    pub fn remove_rule(&mut self, id: &str) -> Option<FuzzyRule> {
        self.rules.remove(id)
    }

    pub fn variables(&self) -> impl Iterator<Item = &str> {
        self.variables.keys().map(String::as_str)
    }

    pub fn sets(&self, variable: &str) -> impl Iterator<Item = &FuzzySet> {
        self.variables.get(variable).into_iter().flat_map(|sets| sets.values())
    }

    pub fn set(&self, variable: &str, set: &str) -> Option<&FuzzySet> {
        self.variables.get(variable).and_then(|sets| sets.get(set))
    }

    pub fn rule(&self, id: &str) -> Option<&FuzzyRule> {
        self.rules.get(id)
    }

    pub fn rules(&self) -> impl Iterator<Item = &FuzzyRule> {
        self.rules.values()
    }

    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    fn validate_rule(&self, rule: &FuzzyRule) -> Result<()> {
        let invalid = |reason: &str| SwarmError::InvalidRule {
            rule_id: rule.id.clone(),
            reason: reason.to_string(),
        };

        if rule.id.trim().is_empty() {
            return Err(invalid("id is empty"));
        }
        if rule.antecedents.is_empty() {
            return Err(invalid("rule has no antecedents"));
        }
        if !rule.weight.is_finite() || rule.weight <= 0.0 {
            return Err(invalid("weight must be positive and finite"));
        }
        if !rule.consequent.value.is_finite() || rule.consequent.value < 0.0 {
            return Err(invalid("consequent value must be non-negative and finite"));
        }

        let references = rule
            .antecedents
            .iter()
            .map(|a| (&a.variable, &a.set))
            .chain(std::iter::once((&rule.consequent.variable, &rule.consequent.set)));
        for (variable, set) in references {
            let sets = self
                .variables
                .get(variable)
                .ok_or_else(|| SwarmError::UnknownVariable {
                    rule_id: rule.id.clone(),
                    variable: variable.clone(),
                })?;
            if !sets.contains_key(set) {
                return Err(SwarmError::UnknownSet {
                    rule_id: rule.id.clone(),
                    variable: variable.clone(),
                    set: set.clone(),
                });
            }
        }
        Ok(())
    }

    /// Run the full inference pipeline on `input`.
    ///
    /// Emits `DecisionMade` on success; on failure emits `DecisionError` and
    /// returns the error.
    pub fn decide(&self, input: &DecisionInput) -> Result<Decision> {
        let started = Instant::now();
        let timestamp = input.timestamp();

        match self.infer(input, timestamp) {
            Ok(decision) => {
                let duration = started.elapsed();
                tracing::debug!(
                    "Decision with {} actions, confidence {:.3} in {:?}",
                    decision.actions.len(),
                    decision.confidence,
                    duration
                );
                self.sink.emit(SwarmEvent::new(
                    timestamp,
                    EventPayload::DecisionMade {
                        duration,
                        decision: decision.clone(),
                    },
                ));
                Ok(decision)
            }
            Err(err) => {
                self.sink.emit(SwarmEvent::new(
                    timestamp,
                    EventPayload::DecisionError {
                        message: err.to_string(),
                    },
                ));
                Err(err)
            }
        }
    }

    fn infer(&self, input: &DecisionInput, timestamp: SimTime) -> Result<Decision> {
        let degrees = self.fuzzify(input)?;
        let fired = self.evaluate_rules(&degrees);
        let aggregated = aggregate(&fired);
        let actions = self.defuzzify(&aggregated);

        let confidence = if actions.is_empty() {
            0.0
        } else {
            actions.iter().map(|a| a.confidence).sum::<f64>() / actions.len() as f64
        };

        Ok(Decision {
            actions,
            confidence,
            timestamp,
        })
    }

    /// Degrees per variable; sets at 0 and variables with no degrees are left out
    fn fuzzify(&self, input: &DecisionInput) -> Result<Degrees<'_>> {
        let mut degrees = Degrees::new();
        for (variable, sets) in &self.variables {
            let x = input.resolve(variable)?;
            let mut memberships = BTreeMap::new();
            for (name, set) in sets {
                let m = set.evaluate(x)?;
                if m > 0.0 {
                    memberships.insert(name.as_str(), m);
                }
            }
            if !memberships.is_empty() {
                degrees.insert(variable.as_str(), memberships);
            }
        }
        Ok(degrees)
    }

    /// Weighted firing strength of every rule that fires
    fn evaluate_rules(&self, degrees: &Degrees<'_>) -> Vec<(&Consequent, f64)> {
        self.rules
            .values()
            .filter_map(|rule| {
                let strength = rule.antecedents.iter().fold(1.0, |strength, antecedent| {
                    match degrees.get(antecedent.variable.as_str()) {
                        None => 0.0,
                        Some(sets) => {
                            let m = sets.get(antecedent.set.as_str()).copied().unwrap_or(0.0);
                            antecedent.operator.apply(strength, m)
                        }
                    }
                });
                (strength > 0.0).then(|| (&rule.consequent, strength * rule.weight))
            })
            .collect()
    }

    /// Weighted average of the fired sets' centroids per output variable
    fn defuzzify(&self, aggregated: &Degrees<'_>) -> Vec<DecisionAction> {
        let mut actions = Vec::new();
        for (&variable, outputs) in aggregated {
            let mut numerator = 0.0;
            let mut denominator = 0.0;
            for (&set_name, &strength) in outputs {
                if let Some(set) = self.set(variable, set_name) {
                    numerator += set.centroid() * strength;
                    denominator += strength;
                }
            }
            if denominator > 0.0 {
                actions.push(DecisionAction {
                    variable: variable.to_string(),
                    value: numerator / denominator,
                    confidence: denominator,
                });
            }
        }
        actions
    }
}

/// Max of `strength * value` per (variable, set)
fn aggregate<'a>(fired: &[(&'a Consequent, f64)]) -> Degrees<'a> {
    let mut aggregated = Degrees::new();
    for &(consequent, strength) in fired {
        let slot = aggregated
            .entry(consequent.variable.as_str())
            .or_default()
            .entry(consequent.set.as_str())
            .or_insert(0.0);
        *slot = slot.max(strength * consequent.value);
    }
    aggregated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EventKind, EventLog};
    use crate::fuzzy::rule::Consequent;

    fn engine() -> FuzzyDecisionEngine {
        let mut engine = FuzzyDecisionEngine::default();
        engine.register_fuzzy_set("threat", FuzzySet::triangle("high", 0.5, 1.0, 1.0).unwrap());
        engine.register_fuzzy_set("threat", FuzzySet::triangle("low", 0.0, 0.0, 0.5).unwrap());
        engine.register_fuzzy_set("escape", FuzzySet::triangle("flee", 0.0, 0.5, 1.0).unwrap());
        engine
    }

    fn flee_rule() -> FuzzyRule {
        FuzzyRule::new("flee", Consequent::new("escape", "flee", 1.0)).and("threat", "high")
    }

    #[test]
    fn test_rejects_empty_id_and_antecedents() {
        let mut engine = engine();
        let empty_id = FuzzyRule::new("", Consequent::new("escape", "flee", 1.0)).and("threat", "high");
        assert!(matches!(
            engine.register_rule(empty_id),
            Err(SwarmError::InvalidRule { .. })
        ));

        let no_antecedents = FuzzyRule::new("bare", Consequent::new("escape", "flee", 1.0));
        assert!(matches!(
            engine.register_rule(no_antecedents),
            Err(SwarmError::InvalidRule { .. })
        ));
        assert_eq!(engine.rule_count(), 0);
    }

    #[test]
    fn test_rejects_bad_weight() {
        let mut engine = engine();
        assert!(engine.register_rule(flee_rule().with_weight(0.0)).is_err());
        assert!(engine.register_rule(flee_rule().with_weight(f64::INFINITY)).is_err());
    }

    #[test]
    fn test_rejects_unknown_references() {
        let mut engine = engine();
        let unknown_var = flee_rule().and("morale", "low");
        assert!(matches!(
            engine.register_rule(unknown_var),
            Err(SwarmError::UnknownVariable { ref variable, .. }) if variable == "morale"
        ));

        let unknown_set = FuzzyRule::new("x", Consequent::new("escape", "hide", 1.0)).and("threat", "high");
        let err = engine.register_rule(unknown_set).unwrap_err();
        assert_eq!(err.to_string(), "Rule 'x' references unknown set 'escape.hide'");
        assert!(engine.rule("x").is_none());
    }

    #[test]
    fn test_same_id_replaces() {
        let mut engine = engine();
        engine.register_rule(flee_rule()).unwrap();
        engine.register_rule(flee_rule().with_weight(2.0)).unwrap();
        assert_eq!(engine.rule_count(), 1);
        assert_eq!(engine.rule("flee").unwrap().weight, 2.0);
    }

    #[test]
    fn test_missing_variable_zeroes_rule() {
        let mut engine = engine();
        engine.register_rule(flee_rule()).unwrap();
        // threat resolves to 0: "low" fires, "high" does not
        let decision = engine.decide(&DecisionInput::default()).unwrap();
        assert!(decision.is_empty());
        assert_eq!(decision.confidence, 0.0);
    }

    #[test]
    fn test_not_operator_on_absent_set() {
        let mut engine = engine();
        let rule = FuzzyRule::new("calm", Consequent::new("escape", "flee", 0.5))
            .and("threat", "low")
            .not("threat", "high");
        engine.register_rule(rule).unwrap();

        let decision = engine
            .decide(&DecisionInput::default().with_value("threat", 0.1))
            .unwrap();
        let action = decision.action("escape").unwrap();
        // low(0.1) = 0.8, high absent so NOT contributes 1.0
        assert!((action.confidence - 0.4).abs() < 1e-9);
        assert!((action.value - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_events_emitted() {
        let log = Arc::new(EventLog::default());
        let mut engine = FuzzyDecisionEngine::new(log.clone());
        engine.register_fuzzy_set("threat", FuzzySet::triangle("high", 0.5, 1.0, 1.0).unwrap());
        engine.register_fuzzy_set("escape", FuzzySet::triangle("flee", 0.0, 0.5, 1.0).unwrap());
        engine.register_rule(flee_rule()).unwrap();
        engine
            .decide(&DecisionInput::default().with_value("threat", 1.0))
            .unwrap();

        assert_eq!(log.count(EventKind::FuzzySetAdded), 2);
        assert_eq!(log.count(EventKind::RuleAdded), 1);
        assert_eq!(log.count(EventKind::DecisionMade), 1);
    }
}
