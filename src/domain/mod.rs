//! Domain layer: entities, instrument validation and the ports the
//! application layer talks to.

pub mod ids;
pub mod merchant;
pub mod order;
pub mod payment;
pub mod ports;
pub mod validation;
