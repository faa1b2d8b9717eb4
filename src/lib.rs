//! Swarm Intel - flocking agents with fuzzy-logic decision making

pub mod agent;
pub mod core;
pub mod events;
pub mod fuzzy;
pub mod simulation;
pub mod spatial;
pub mod swarm;
