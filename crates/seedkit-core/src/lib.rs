//! Core contracts shared by the seedkit crates.
//!
//! This crate defines the closed set of account and operation kinds understood
//! by the banking gateway, and the result tree produced by a seeding run.

pub mod kinds;
pub mod tree;

pub use kinds::{AccountKind, OperationKind};
pub use tree::{AccountNode, ResultTree, SeededAccount, SeededOperation, SeededUser, UserNode};
