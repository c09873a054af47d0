//! # filecab
//!
//! A file-cabinet tracking service: cabinets hold files, each file gets a
//! per-cabinet locator such as `C3.12`, and a dashboard summarizes counts by
//! status and category. Usable as a standalone binary or as a library.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! filecab = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use filecab::server::{AppState, create_router};
//! use filecab::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new("./data/filecab.db").unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store), "Admin"));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Builds the `filecab` binary. Disable with `default-features = false`.

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
