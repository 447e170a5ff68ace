//! Scenario tests for the entity lifecycle and transform hierarchy

mod lifecycle;
