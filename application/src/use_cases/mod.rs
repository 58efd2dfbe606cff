//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod execute_round;
pub mod find_max_safe;
pub mod run_sweep;
