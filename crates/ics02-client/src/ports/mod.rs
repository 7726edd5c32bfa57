//! # Ports Module
//!
//! Hexagonal architecture ports: the client manager API (inbound) and the
//! host services it depends on (outbound).

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
