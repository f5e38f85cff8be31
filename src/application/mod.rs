//! Application layer containing the payment orchestration.
//!
//! This module defines the `PaymentCoordinator`, the single entry point for
//! submitting and looking up payments. It owns the stores and the authorizer
//! behind their ports and is shared by every request-handling task.

pub mod coordinator;
