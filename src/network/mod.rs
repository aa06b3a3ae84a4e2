//! Network layer - API call execution
//!
//! The Network actor receives API calls and sends back replies or errors.

pub mod actor;
pub mod client;

pub use actor::NetworkActor;
pub use client::ApiClient;
