//! spendlog - Expense tracking and reporting core for small businesses
//!
//! This library provides the core functionality for a small-business expense
//! tracker: typed expense and budget records, a CSV-backed record store, and
//! a pure read-side reporting engine. Front ends (web dashboard, CLI) are
//! external collaborators that call into the services and report functions
//! defined here.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, budgets, periods, money)
//! - `storage`: CSV file storage layer
//! - `services`: Business logic layer (validation + mutations)
//! - `report`: Pure aggregation and reporting functions
//!
//! # Example
//!
//! ```rust,ignore
//! use spendlog::config::SpendlogPaths;
//! use spendlog::services::ExpenseService;
//! use spendlog::storage::Storage;
//!
//! let paths = SpendlogPaths::new()?;
//! let storage = Storage::new(&paths);
//! storage.load_all()?;
//! let service = ExpenseService::new(&storage);
//! ```

pub mod config;
pub mod error;
pub mod models;
pub mod report;
pub mod services;
pub mod storage;

pub use error::{SpendlogError, SpendlogResult};
