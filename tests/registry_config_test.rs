use std::fs;

use grantflow::domain::models::config::Config;
use grantflow::{Audience, ConfigLoader, Registry, RegistryError};
use tempfile::TempDir;

const DEFINITIONS: &str = r"
workflows:
  - name: Fellowship
    admin_name: fellowship
    stages:
      - name: Fellowship
    steps:
      - - name: draft
          display: Draft
          stage: Fellowship
          permissions: applicant_edit
          transitions:
            - target: fellowship_review
              display: Submit
              roles: [applicant]
              side_effect: create_revision
      - - name: fellowship_review
          display: Panel Review
          public: '{org_short_name} Panel'
          stage: Fellowship
          permissions:
            edit: [staff]
            review: [staff, reviewer]
          transitions:
            - { target: fellowship_accepted, display: Accept }
            - { target: fellowship_rejected, display: Dismiss }
      - - name: fellowship_accepted
          display: Accepted
          stage: Fellowship
          permissions: staff_edit
        - name: fellowship_rejected
          display: Dismissed
          stage: Fellowship
          permissions: no_permissions
";

fn write_project(config_yaml: &str) -> TempDir {
    let root = TempDir::new().unwrap();
    let dir = root.path().join(".grantflow");
    fs::create_dir_all(&dir).unwrap();
    fs::write(root.path().join("fellowship.yaml"), DEFINITIONS).unwrap();
    let config_yaml = config_yaml.replace(
        "DEFINITIONS",
        &root.path().join("fellowship.yaml").display().to_string(),
    );
    fs::write(dir.join("config.yaml"), config_yaml).unwrap();
    root
}

#[test]
fn test_registry_from_config_with_definitions_file() {
    let root = write_project(
        "org_short_name: ACME\nworkflows:\n  enabled: [single, fellowship]\n  definitions_file: DEFINITIONS\n",
    );

    let config: Config = temp_env::with_vars_unset(["GRANTFLOW_ORG_SHORT_NAME"], || {
        ConfigLoader::load_from_dir(root.path()).unwrap()
    });
    let registry = Registry::from_config(&config).unwrap();

    let names: Vec<&str> = registry.workflows().iter().map(|w| w.admin_name()).collect();
    assert_eq!(names, vec!["single", "fellowship"]);

    let review = registry.phase("fellowship", "fellowship_review").unwrap();
    assert_eq!(review.public_name(), "ACME Panel");
    assert_eq!(review.name_for(Audience::Staff, true), "Panel Review");
    assert!(review.permissions().can_view(&grantflow::RoleSet::from([grantflow::Role::Partner])));

    let mapping = registry.action_mapping(None);
    assert_eq!(
        mapping.get("dismiss").unwrap().targets,
        vec!["rejected".to_string(), "fellowship_rejected".to_string()]
    );
    assert!(registry
        .status_tables()
        .accepted_statuses
        .contains(&"fellowship_accepted".to_string()));
}

#[test]
fn test_definitions_file_can_replace_builtin() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("single.yaml");
    fs::write(&path, DEFINITIONS.replace("admin_name: fellowship", "admin_name: single")).unwrap();

    let mut config = Config::default();
    config.workflows.enabled = vec!["single".to_string()];
    config.workflows.definitions_file = Some(path.display().to_string());

    let registry = Registry::from_config(&config).unwrap();
    assert_eq!(registry.workflow("single").unwrap().name(), "Fellowship");
}

#[test]
fn test_missing_definitions_file_is_an_error() {
    let mut config = Config::default();
    config.workflows.definitions_file = Some("/no/such/definitions.yaml".to_string());

    let err = Registry::from_config(&config).unwrap_err();
    assert!(format!("{err:#}").contains("/no/such/definitions.yaml"));
}

#[test]
fn test_duplicate_admin_name_in_definitions_file_is_rejected() {
    let root = TempDir::new().unwrap();
    let path = root.path().join("dup.yaml");
    let second = DEFINITIONS
        .replacen("workflows:\n", "", 1)
        .replace("name: Fellowship\n    admin_name", "name: Second Fellowship\n    admin_name");
    fs::write(&path, format!("{DEFINITIONS}{second}")).unwrap();

    let mut config = Config::default();
    config.workflows.enabled = vec!["fellowship".to_string()];
    config.workflows.definitions_file = Some(path.display().to_string());

    let err = Registry::from_config(&config).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<RegistryError>(),
        Some(RegistryError::DuplicateWorkflow(name)) if name == "fellowship"
    ));
}
