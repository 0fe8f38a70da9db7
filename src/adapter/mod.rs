//! Bidirectional schema translation between the internal commerce model and
//! the external UCP wire contract.
//!
//! Everything in here is pure and deterministic: no I/O, no clock, no
//! randomness. Status remapping is expressed as exhaustive matches so a new
//! internal state fails compilation instead of silently falling through.

pub mod inbound;
pub mod outbound;
pub mod wire;
