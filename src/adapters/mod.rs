//! Infrastructure adapters. Implement outbound ports.
//!
//! Content store, mail transport. Map errors to DomainError.

pub mod mail;
pub mod persistence;
