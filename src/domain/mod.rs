//! Domain layer: accounts, transfers, allocation policy and the ports to the
//! outside world. Nothing in here performs I/O.

pub mod account;
pub mod allocation;
pub mod ports;
pub mod transfer;
