#![cfg(feature = "yaml")]

use std::fs;

use ruletrail::{
    rules_for, FieldVisitor, LoadError, Record, RuleEntry, RuleRepository, Validator,
};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

struct User {
    age: i64,
    email: &'static str,
    is_active: bool,
}

impl Record for User {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Age", self.age)
            .field("Email", self.email)
            .field("IsActive", self.is_active);
    }
}

fn load(document: &str) -> RuleRepository {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("rules.yaml");
    fs::write(&path, document).unwrap();
    RuleRepository::from_file(&path).unwrap()
}

fn texts(rules: &[RuleEntry]) -> Vec<&str> {
    rules.iter().map(|r| r.rule.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

#[test]
fn loads_operation_specific_rules() {
    let repo = load(
        r#"User:
  Create:
    - rule: "Age > 18"
      enabled: true
    - rule: "Email != ''"
      enabled: true
  Delete:
    - rule: "IsActive == false"
      enabled: true
"#,
    );
    let user = User {
        age: 20,
        email: "x@x.com",
        is_active: false,
    };

    assert_eq!(rules_for(&user, "Create", &repo).len(), 2);
    assert_eq!(rules_for(&user, "Delete", &repo).len(), 1);
}

#[test]
fn merges_default_and_operation_rules() {
    let repo = load(
        r#"User:
  Default:
    - rule: "Email != ''"
      enabled: true
  Create:
    - rule: "Age > 18"
      enabled: true
"#,
    );
    let user = User {
        age: 25,
        email: "valid@example.com",
        is_active: true,
    };

    let rules = rules_for(&user, "Create", &repo);
    assert_eq!(
        rules,
        vec![RuleEntry::new("Email != ''"), RuleEntry::new("Age > 18")]
    );
}

#[test]
fn deduplicates_between_default_and_operation() {
    let repo = load(
        r#"User:
  Default:
    - rule: "Email != ''"
      enabled: true
    - rule: "Age >= 18"
      enabled: true
  Create:
    - rule: "Age >= 18"
      enabled: true
    - rule: "IsActive == true"
      enabled: true
"#,
    );
    let user = User {
        age: 30,
        email: "x@x.com",
        is_active: true,
    };

    let rules = rules_for(&user, "Create", &repo);
    assert_eq!(texts(&rules), ["Email != ''", "Age >= 18", "IsActive == true"]);
}

#[test]
fn ignores_disabled_and_unflagged_rules() {
    let repo = load(
        r#"User:
  Default:
    - rule: "Email != ''"
      enabled: true
    - rule: "Age >= 18"
      enabled: false
    - rule: "Age < 200"
  Create:
    - rule: "IsActive == true"
      enabled: true
      then:
        - rule: "Age > 100"
          enabled: false
"#,
    );
    let user = User {
        age: 30,
        email: "x@x.com",
        is_active: true,
    };

    let rules = rules_for(&user, "Create", &repo);
    assert_eq!(texts(&rules), ["Email != ''", "IsActive == true"]);
    assert!(rules[1].then.is_empty());
}

#[test]
fn loaded_rules_validate_end_to_end() {
    let repo = load(
        r#"User:
  Create:
    - rule: "Age > 18"
      enabled: true
      message: "must be an adult"
      then:
        - rule: "Email.endsWith('.com')"
          enabled: true
          message: "email must be a .com address"
"#,
    );
    let user = User {
        age: 17,
        email: "",
        is_active: false,
    };

    let report = Validator::new().validate_operation(&user, "Create", &repo);
    assert_eq!(report.results().len(), 1);
    assert_eq!(report.failure_messages(), ["must be an adult"]);
}

#[test]
fn bundled_demo_document_runs_its_chain() {
    struct Member {
        age: i64,
        status: &'static str,
    }

    impl Record for Member {
        fn type_name(&self) -> std::borrow::Cow<'_, str> {
            "User".into()
        }

        fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
            v.field("Name", "Bob")
                .field("Email", "bob@elsewhere.org")
                .field("Age", self.age)
                .field("Status", self.status);
        }
    }

    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/demos/rules.yaml");
    let repo = RuleRepository::from_file(path).unwrap();
    let member = Member {
        age: 42,
        status: "active",
    };

    let rules = rules_for(&member, "Create", &repo);
    assert_eq!(texts(&rules), ["size(Name) > 0", "Age >= 18"]);

    let report = Validator::new().validate_operation(&member, "Create", &repo);
    assert_eq!(report.results().len(), 4);
    assert_eq!(
        report.failure_messages(),
        ["email must be on the company domain"]
    );

    let report = Validator::new().validate_operation(&member, "Update", &repo);
    assert_eq!(report.results().len(), 1);
    assert!(report.passed());
}

#[test]
fn empty_file_is_an_empty_repository() {
    assert!(load("").is_empty());
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[test]
fn missing_file_is_a_read_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = RuleRepository::from_file(&path).unwrap_err();
    match err {
        LoadError::Read { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("expected read error, got {other:?}"),
    }
}

#[test]
fn malformed_document_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "User:\n  Create:\n    - rule: [unclosed\n").unwrap();

    let err = RuleRepository::from_file(&path).unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}

#[test]
fn wrong_shape_is_a_parse_error() {
    let err = RuleRepository::from_yaml("User:\n  Create: not-a-list\n").unwrap_err();
    assert!(matches!(err, LoadError::Parse(_)));
}
