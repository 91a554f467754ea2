pub mod action_mapping;
pub mod catalog;
pub mod hook_registry;
pub mod registry;
pub mod status_tables;
pub mod transition_engine;

pub use action_mapping::{slugify, ActionMapping, MappedAction};
pub use hook_registry::{HookRegistry, Precondition, SideEffect};
pub use registry::{Registry, RegistryOptions};
pub use status_tables::{DeterminationOutcome, StatusBucket, StatusTables};
pub use transition_engine::{TransitionEngine, TransitionOutcome};
