//! Adapters between the outside world and the orchestrator: account fixtures
//! come in as CSV, reports go out as JSON.

pub mod csv;
pub mod json;
