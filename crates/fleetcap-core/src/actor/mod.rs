//! Actor implementations

pub mod aggregator;

pub use aggregator::{AggregatorActor, AggregatorActorArgs};
