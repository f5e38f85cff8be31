//! Adapters behind the domain ports: in-memory stores and the acquiring bank client.

pub mod acquiring_bank;
pub mod in_memory;
