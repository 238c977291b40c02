use std::collections::BTreeMap;
use std::path::PathBuf;

use rowforge_generate::{GenerateOptions, GenerationEngine, RowCounts};
use rowforge_schema::{
    Attribute, DirectRelationship, Entity, Relationship, SchemaModel,
};
use rowforge_validate::ValidationEngine;

fn attribute(name: &str, data_type: &str, unique_id: bool, alias: Option<&str>) -> Attribute {
    Attribute {
        name: name.to_string(),
        external_id: String::new(),
        data_type: data_type.to_string(),
        is_list: false,
        indexed: false,
        unique_id,
        alias: alias.map(|value| value.to_string()),
    }
}

fn entity(id: &str, external_id: &str, attributes: Vec<Attribute>) -> (String, Entity) {
    (
        id.to_string(),
        Entity {
            id: id.to_string(),
            external_id: external_id.to_string(),
            display_name: id.to_string(),
            description: None,
            attributes,
        },
    )
}

fn user_role_schema() -> SchemaModel {
    SchemaModel {
        entities: BTreeMap::from([
            entity(
                "user",
                "Example/User",
                vec![
                    attribute("id", "int", true, Some("userId")),
                    attribute("email", "email", false, None),
                ],
            ),
            entity(
                "role",
                "Example/Role",
                vec![
                    attribute("id", "int", true, Some("roleId")),
                    attribute("user_id", "int", false, Some("roleUserId")),
                ],
            ),
        ]),
        relationships: BTreeMap::from([(
            "role_user".to_string(),
            Relationship::Direct(DirectRelationship {
                from_attribute: "roleUserId".to_string(),
                to_attribute: "userId".to_string(),
            }),
        )]),
    }
}

fn temp_dir(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("rowforge-val-{tag}-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn generate_into(dir: &PathBuf) -> BTreeMap<String, rowforge_generate::RowSet> {
    let engine = GenerationEngine::new(GenerateOptions {
        out_dir: dir.clone(),
        default_rows: 5,
        seed: 11,
        auto_cardinality: true,
        prevent_cycles: true,
        write_report: false,
    });
    engine
        .run(&user_role_schema(), &RowCounts::uniform())
        .expect("generation succeeds")
        .row_sets
}

#[test]
fn round_trip_of_generated_output_is_clean() {
    let dir = temp_dir("round-trip");
    let row_sets = generate_into(&dir);

    let in_memory = ValidationEngine::new().validate_rows(&user_role_schema(), &row_sets);
    assert!(in_memory.is_clean(), "in-memory: {:?}", in_memory.violations);

    let from_disk = ValidationEngine::new()
        .validate_dir(&user_role_schema(), &dir)
        .expect("validation runs");
    assert!(from_disk.is_clean(), "from disk: {:?}", from_disk.violations);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn missing_file_is_a_violation_not_an_error() {
    let dir = temp_dir("missing-file");
    generate_into(&dir);
    std::fs::remove_file(dir.join("Role.csv")).expect("remove Role.csv");

    let result = ValidationEngine::new()
        .validate_dir(&user_role_schema(), &dir)
        .expect("missing file must not be fatal");

    let missing: Vec<_> = result
        .violations
        .iter()
        .filter(|violation| violation.code == "missing_file")
        .collect();
    assert_eq!(missing.len(), 1);
    assert_eq!(missing[0].path, "role");
    assert_eq!(result.violations.len(), 1);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn duplicate_unique_id_is_reported_once_per_duplicate() {
    let dir = temp_dir("duplicate");
    std::fs::write(dir.join("User.csv"), "id,email\n1,a@example.com\n1,b@example.com\n")
        .expect("write User.csv");
    std::fs::write(dir.join("Role.csv"), "id,user_id\n1,1\n").expect("write Role.csv");

    let result = ValidationEngine::new()
        .validate_dir(&user_role_schema(), &dir)
        .expect("validation runs");

    let duplicates: Vec<_> = result
        .violations
        .iter()
        .filter(|violation| violation.code == "duplicate_value")
        .collect();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0].example.as_deref(), Some("1"));
    assert!(duplicates[0].message.contains("user"));
    assert!(duplicates[0].message.contains("User.csv"));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn dangling_foreign_key_is_reported_with_context() {
    let dir = temp_dir("dangling");
    std::fs::write(dir.join("User.csv"), "id,email\n1,a@example.com\n").expect("write User.csv");
    std::fs::write(dir.join("Role.csv"), "id,user_id\n1,1\n2,999\n").expect("write Role.csv");

    let result = ValidationEngine::new()
        .validate_dir(&user_role_schema(), &dir)
        .expect("validation runs");

    let dangling: Vec<_> = result
        .violations
        .iter()
        .filter(|violation| violation.code == "foreign_key")
        .collect();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].example.as_deref(), Some("999"));
    assert!(dangling[0].message.contains("does not exist"));
    assert!(dangling[0].path.contains("role.user_id"));
    assert_eq!(dangling[0].row_index, Some(2));

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn validation_only_mode_never_writes() {
    let dir = temp_dir("read-only");
    std::fs::write(dir.join("User.csv"), "id,email\n1,a@example.com\n").expect("write User.csv");
    std::fs::write(dir.join("Role.csv"), "id,user_id\n1,1\n").expect("write Role.csv");

    ValidationEngine::new()
        .validate_dir(&user_role_schema(), &dir)
        .expect("validation runs");

    let entries: Vec<_> = std::fs::read_dir(&dir)
        .expect("read dir")
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(entries.len(), 2);

    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn unreadable_directory_is_fatal() {
    let missing = std::env::temp_dir().join(format!("rowforge-val-none-{}", uuid::Uuid::new_v4()));
    let err = ValidationEngine::new()
        .validate_dir(&user_role_schema(), &missing)
        .unwrap_err();
    assert!(err.to_string().contains("invalid dataset directory"));
}
