//! Stock fuzzy variables every engine can start from

use std::sync::Arc;

use crate::core::error::Result;
use crate::events::EventSink;
use crate::fuzzy::engine::FuzzyDecisionEngine;
use crate::fuzzy::membership::FuzzySet;

/// `(variable, set)` pairs for distance, health, velocity and threat
pub fn standard_sets() -> Result<Vec<(&'static str, FuzzySet)>> {
    Ok(vec![
        ("distance", FuzzySet::trapezoid("close", 0.0, 0.0, 3.0, 5.0)?.with_domain(0.0, 10.0)?),
        ("distance", FuzzySet::triangle("medium", 3.0, 8.0, 13.0)?.with_domain(3.0, 15.0)?),
        ("distance", FuzzySet::trapezoid("far", 10.0, 15.0, 20.0, 20.0)?),
        ("health", FuzzySet::trapezoid("low", 0.0, 0.0, 20.0, 40.0)?.with_domain(0.0, 50.0)?),
        ("health", FuzzySet::triangle("medium", 30.0, 50.0, 70.0)?),
        ("health", FuzzySet::trapezoid("high", 60.0, 80.0, 100.0, 100.0)?),
        ("velocity", FuzzySet::trapezoid("slow", 0.0, 0.0, 2.0, 4.0)?.with_domain(0.0, 5.0)?),
        ("velocity", FuzzySet::triangle("moderate", 3.0, 5.0, 7.0)?),
        ("velocity", FuzzySet::trapezoid("fast", 6.0, 8.0, 10.0, 10.0)?),
        ("threat", FuzzySet::trapezoid("low", 0.0, 0.0, 20.0, 40.0)?.with_domain(0.0, 50.0)?),
        ("threat", FuzzySet::triangle("medium", 30.0, 50.0, 70.0)?),
        ("threat", FuzzySet::trapezoid("high", 60.0, 80.0, 100.0, 100.0)?),
    ])
}

impl FuzzyDecisionEngine {
    /// Engine preloaded with [`standard_sets`]
    pub fn with_standard_sets(sink: Arc<dyn EventSink>) -> Result<Self> {
        let mut engine = Self::new(sink);
        for (variable, set) in standard_sets()? {
            engine.register_fuzzy_set(variable, set);
        }
        Ok(engine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;

    #[test]
    fn test_standard_variables() {
        let engine = FuzzyDecisionEngine::with_standard_sets(Arc::new(NullSink)).unwrap();
        let variables: Vec<&str> = engine.variables().collect();
        assert_eq!(variables, vec!["distance", "health", "threat", "velocity"]);
        assert_eq!(engine.sets("distance").count(), 3);
    }

    #[test]
    fn test_close_distance_domain() {
        let engine = FuzzyDecisionEngine::with_standard_sets(Arc::new(NullSink)).unwrap();
        let close = engine.set("distance", "close").unwrap();
        assert_eq!(close.domain(), (0.0, 10.0));
        assert_eq!(close.evaluate(2.0).unwrap(), 1.0);
        assert!((close.evaluate(4.0).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(close.evaluate(6.0).unwrap(), 0.0);
    }
}
