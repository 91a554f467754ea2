//! Domain errors for the grantflow workflow engine.

use thiserror::Error;

/// Errors raised while listing or performing transitions.
#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error("Workflow not found: {0}")]
    UnknownWorkflow(String),

    /// The status does not name a phase of the workflow. Indicates data
    /// corruption or definition drift; never retried.
    #[error("Unknown phase '{status}' in workflow '{workflow}'")]
    UnknownPhase { workflow: String, status: String },

    #[error("No transition '{action}' from phase '{status}'")]
    NoSuchTransition { status: String, action: String },

    #[error("Permission denied for transition '{action}'")]
    PermissionDenied { action: String },

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// A side-effect hook failed; the hook's error is passed through as is.
    #[error(transparent)]
    SideEffect(#[from] anyhow::Error),
}

impl WorkflowError {
    /// Whether auto-progression treats this as "not eligible yet" rather than
    /// a failure.
    pub fn is_not_applicable(&self) -> bool {
        matches!(self, Self::NoSuchTransition { .. } | Self::PermissionDenied { .. })
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;

/// Errors found while compiling workflow definitions into a registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Workflow '{0}' has no phases")]
    EmptyWorkflow(String),

    #[error("Workflow admin name cannot be empty")]
    EmptyAdminName,

    #[error("Duplicate workflow admin name: {0}")]
    DuplicateWorkflow(String),

    #[error("Duplicate phase '{phase}' in workflow '{workflow}'")]
    DuplicatePhase { workflow: String, phase: String },

    #[error("Duplicate stage '{stage}' in workflow '{workflow}'")]
    DuplicateStage { workflow: String, stage: String },

    #[error("Phase '{phase}' in workflow '{workflow}' references unknown stage '{stage}'")]
    UnknownStage {
        workflow: String,
        phase: String,
        stage: String,
    },

    #[error("Phase '{phase}' in workflow '{workflow}' transitions to unknown phase '{target}'")]
    DanglingTransition {
        workflow: String,
        phase: String,
        target: String,
    },

    #[error("Phase '{phase}' in workflow '{workflow}' declares transition '{target}' twice")]
    DuplicateTransition {
        workflow: String,
        phase: String,
        target: String,
    },

    #[error("Phase '{phase}' in workflow '{workflow}' sets both a public and a future name")]
    ConflictingNames { workflow: String, phase: String },

    #[error("Transition '{action}' of phase '{phase}' in workflow '{workflow}' uses unregistered precondition '{name}'")]
    UnknownPrecondition {
        workflow: String,
        phase: String,
        action: String,
        name: String,
    },

    #[error("Transition '{action}' of phase '{phase}' in workflow '{workflow}' uses unregistered side effect '{name}'")]
    UnknownSideEffect {
        workflow: String,
        phase: String,
        action: String,
        name: String,
    },

    #[error("Enabled workflow '{0}' has no definition")]
    UnknownWorkflow(String),
}
