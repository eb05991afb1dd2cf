use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};
use tracing_subscriber::EnvFilter;

struct User {
    name: String,
    age: i64,
    status: String,
}

impl Record for User {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Name", self.name.as_str())
            .field("Age", self.age)
            .field("Status", self.status.as_str());
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Define rules
    let repo = RuleRepository::new()
        .with_rules(
            "User",
            "Default",
            vec![RuleEntry::new("size(Name) > 0").with_message("name is required")],
        )
        .with_rules(
            "User",
            "Create",
            vec![
                RuleEntry::new("Age >= 18").with_message("must be an adult"),
                RuleEntry::new("Status == 'active'").with_message("account is not active"),
            ],
        );

    println!("{repo}");

    let user = User {
        name: "Alice".into(),
        age: 16,
        status: "active".into(),
    };

    let report = Validator::new().validate_operation(&user, "Create", &repo);
    if report.passed() {
        println!("User is valid.");
    } else {
        for message in report.failure_messages() {
            println!("Invalid: {message}");
        }
    }
}
