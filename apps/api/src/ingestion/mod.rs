//! Job ingestion: query planning, source adapters, and the fan-out orchestrator.

pub mod adapters;
pub mod orchestrator;
pub mod query;
pub mod rate_limit;
pub mod text;
