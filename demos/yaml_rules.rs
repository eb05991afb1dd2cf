use std::path::Path;

use ruletrail::{FieldVisitor, Record, RuleRepository, Validator};
use tracing_subscriber::EnvFilter;

struct User {
    name: &'static str,
    email: &'static str,
    age: i64,
    status: &'static str,
}

impl Record for User {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Name", self.name)
            .field("Email", self.email)
            .field("Age", self.age)
            .field("Status", self.status);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/rules.yaml");
    let repo = RuleRepository::from_file(&path)?;
    println!("Loaded {repo}");

    let user = User {
        name: "Bob",
        email: "bob@elsewhere.org",
        age: 42,
        status: "active",
    };

    for operation in ["Create", "Update"] {
        let report = Validator::new().validate_operation(&user, operation, &repo);
        println!("{operation}: {report}");
        for message in report.failure_messages() {
            println!("  {message}");
        }
    }
    Ok(())
}
