//! Actor-based pipeline
//!
//! Four roles built on Ractor, each processing its own mailbox one message at a time:
//! Distributor (orchestrator), Worker (transform + filter), Collector (accumulates
//! accepted results) and Printer (renders the report). Actors share no memory;
//! records and results move between them inside messages.

pub mod collector;
pub mod distributor;
pub mod message;
pub mod printer;
pub mod worker;

pub use collector::*;
pub use distributor::*;
pub use message::*;
pub use printer::*;
pub use worker::*;
