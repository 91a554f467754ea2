pub mod config;
pub mod definition;
pub mod permissions;
pub mod phase;
pub mod role;
pub mod workflow;

pub use config::{Config, LoggingConfig, WorkflowsConfig};
pub use definition::{
    DefinitionsFile, PermissionSpec, PhaseDefinition, StageDefinition, TransitionDefinition,
    WorkflowDefinition,
};
pub use permissions::{Capability, PermissionPreset, PermissionSet};
pub use phase::{Audience, Phase, Stage, Transition};
pub use role::{Role, RoleSet};
pub use workflow::Workflow;
