//! Per-task notification fan-out
//!
//! An explicitly constructed service, injected into the ledger; nothing in
//! this crate reaches for ambient global state.

mod bus;

#[cfg(test)]
mod tests;

pub use bus::TaskEventBus;
