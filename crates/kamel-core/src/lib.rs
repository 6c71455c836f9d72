//! Reconciliation core for Camel integrations on Kubernetes.
//!
//! Workload manifests arrive as [`handler::Event`]s. The [`handler::Handler`]
//! routes each one to the action pool of its kind; the deploy action runs the
//! [`traits::Catalog`] to turn an integration into the Kubernetes resources it
//! needs.

pub mod action;
pub mod apis;
pub mod collection;
pub mod config;
pub mod environment;
pub mod error;
pub mod handler;
pub mod io;
pub mod manifest;
pub mod paths;
pub mod traits;
pub mod types;

pub use error::{KamelError, Result};
