//! Batch CSV adapters used by the command-line runner.

pub mod checkout_reader;
pub mod payment_writer;
