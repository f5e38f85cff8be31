//! Domain model: payments, their lifecycle, and the ports the coordinator
//! talks through.

pub mod authorization;
pub mod idempotency;
pub mod payment;
pub mod ports;
