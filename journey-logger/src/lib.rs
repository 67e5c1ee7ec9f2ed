//! Rail transit journey logger.
//!
//! Records a rider's trip as a journey with a stream of timestamped events
//! (start, doors open, doors close, end). Each event is tagged with the
//! position, the nearest known station and the ambient weather, and written
//! to a remote store.

pub mod config;
pub mod domain;
pub mod geo;
pub mod location;
pub mod machine;
pub mod recorder;
pub mod session;
pub mod stations;
pub mod store;
pub mod weather;
pub mod web;

#[cfg(test)]
mod testing;
