//! Grantflow - workflow engine for grant application review
//!
//! Applications move through Phases grouped into Stages. Each phase exposes
//! named transitions guarded by roles, optional preconditions and an optional
//! side-effect hook. Several differently shaped workflows share one engine.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): roles, permissions, phases, workflows,
//!   definitions, errors and the ports the host implements
//! - **Service Layer** (`services`): the built-in catalog, the registry,
//!   status tables, action aggregation, hooks and the transition engine
//! - **Infrastructure Layer** (`infrastructure`): configuration and logging
//! - **CLI Layer** (`cli`): inspection and simulation commands
//!
//! # Example
//!
//! ```
//! use grantflow::{HookRegistry, Registry, RegistryOptions, Role, RoleSet, Submission, TransitionEngine};
//!
//! struct Application {
//!     status: String,
//! }
//!
//! impl Submission for Application {
//!     type User = RoleSet;
//!     fn workflow_name(&self) -> &str {
//!         "single"
//!     }
//!     fn status(&self) -> &str {
//!         &self.status
//!     }
//! }
//!
//! let registry = Registry::builtin(&RegistryOptions::default())?.into_shared();
//! let hooks = HookRegistry::new()
//!     .with_precondition("not_progressed", |_: &Application| true)
//!     .with_side_effect("create_revision", |_: &mut Application, _: &RoleSet| Ok(()))
//!     .with_side_effect("progress_application", |_: &mut Application, _: &RoleSet| Ok(()));
//! let engine = TransitionEngine::new(registry, hooks, |user: &RoleSet, _: &Application| user.clone())?;
//!
//! let mut application = Application { status: "draft".to_string() };
//! let outcome = engine.perform(&mut application, "in_discussion", &RoleSet::from([Role::Applicant]))?;
//! assert_eq!(outcome.status, "in_discussion");
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::errors::{RegistryError, WorkflowError, WorkflowResult};
pub use domain::models::{
    Audience, Capability, Config, PermissionPreset, PermissionSet, Phase, Role, RoleSet, Stage,
    Transition, Workflow, WorkflowDefinition,
};
pub use domain::ports::{RoleResolver, Submission};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    ActionMapping, HookRegistry, Registry, RegistryOptions, StatusTables, TransitionEngine,
    TransitionOutcome,
};
