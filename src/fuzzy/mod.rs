//! Fuzzy-logic decision making
//!
//! Inputs are fuzzified against registered sets, rules fold their
//! antecedents into a firing strength, strengths are aggregated per output
//! set and defuzzified by centroid into crisp actions.

pub mod engine;
pub mod input;
pub mod loader;
pub mod membership;
pub mod presets;
pub mod rule;

pub use engine::{Decision, DecisionAction, FuzzyDecisionEngine};
pub use input::DecisionInput;
pub use loader::{load_definitions, parse_definitions, FuzzyDefinitions};
pub use membership::{FuzzySet, MembershipFunction, CENTROID_SAMPLES};
pub use presets::standard_sets;
pub use rule::{Antecedent, Consequent, FuzzyRule, Operator};
