//! Session orchestration.
//!
//! A [`SessionController`] owns everything one rider's session knows: the
//! open journey, its door state, the ambient and manually picked stations,
//! and the recent-events log. User actions come in through its methods and
//! are delegated to the geo-matcher, the event recorder and the store.

mod controller;
mod error;


pub use controller::{ActionGuard, SessionController, SessionSnapshot};
pub use error::SessionError;
