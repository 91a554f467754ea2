//! Domain layer for the grantflow workflow engine
//!
//! This module contains the workflow data model, the errors it raises and
//! the ports the host application implements.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{RegistryError, WorkflowError, WorkflowResult};
