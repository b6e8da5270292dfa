//! Application layer orchestrating batch transfers.
//!
//! `TransferOrchestrator` validates a request, asks the allocator for a plan,
//! lets the `BatchScheduler` run it group by group and returns what the
//! `ResultAggregator` collected.

pub mod aggregator;
pub mod orchestrator;
pub mod scheduler;
