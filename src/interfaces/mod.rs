//! Outer surfaces: the transport-neutral gateway API and the CSV batch adapters.

pub mod api;
pub mod csv;
