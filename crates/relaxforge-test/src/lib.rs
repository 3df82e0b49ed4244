//! Shared test fixtures for RelaxForge crates.
//!
//! This crate provides a deterministic solver double and problem data.
//! It only depends on `relaxforge-core`, so every other crate can use it
//! as a dev-dependency without cycles.
//!
//! - [`scripted`] - `Model` backend that replays scripted solve results
//! - [`gap`] - Generalized assignment instance (Wolsey, p. 182)
//!
//! # Usage
//!
//! Add as a dev-dependency in your crate's `Cargo.toml`:
//!
//! ```toml
//! [dev-dependencies]
//! relaxforge-test = { workspace = true }
//! ```
//!
//! Then import the fixtures you need:
//!
//! ```ignore
//! use relaxforge_test::scripted::{ScriptedModel, ScriptedSolve};
//! use relaxforge_test::gap::GapInstance;
//! ```

pub mod gap;
pub mod scripted;

pub use gap::GapInstance;
pub use scripted::{ScriptedModel, ScriptedSolve};
