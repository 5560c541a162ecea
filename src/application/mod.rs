//! Application layer: the services that orchestrate the domain.
//!
//! `Authenticator` gates merchant calls, `OrderLedger` owns orders and
//! `PaymentProcessor` drives a payment from `processing` to its terminal state.
//! All three are cheap to clone and safe to share across tokio tasks.

pub mod auth;
pub mod orders;
pub mod processor;
