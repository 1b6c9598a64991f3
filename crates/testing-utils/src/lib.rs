//! # Leadflow Testing Utils
//!
//! Shared testing utilities for the leadflow workspace.
//!
//! ## Features
//!
//! - **Mock Repositories**: In-memory implementations of every store port
//! - **Mock Sender**: A message channel that records sends and can be told to fail
//! - **Test Data Builders**: Entities with sensible defaults
//!
//! ## Usage
//!
//! ```toml
//! [dev-dependencies]
//! leadflow-testing-utils = { path = "../testing-utils" }
//! ```

pub mod builders;
pub mod helpers;
pub mod mocks;

pub use builders::*;
pub use helpers::*;
pub use mocks::*;
