//! Wizdew library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) runs a scripted headless session on top of
//! these modules. `tests/` integration tests import the same game types,
//! systems, and resources without needing a window or GPU.

pub mod shared;
pub mod data;
pub mod save;
pub mod combat;
pub mod kills;
pub mod farming;
pub mod economy;
pub mod inventory;
