use std::sync::Arc;
use std::thread;

use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};
use tracing_subscriber::EnvFilter;

struct User {
    age: i64,
    status: &'static str,
}

impl Record for User {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Age", self.age).field("Status", self.status);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let repo = Arc::new(RuleRepository::new().with_rules(
        "User",
        "Create",
        vec![RuleEntry::new("Age >= 18")
            .with_message("must be an adult")
            .then(RuleEntry::new("Status == 'active'").with_message("account is not active"))],
    ));
    let validator = Arc::new(Validator::new());

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let repo = Arc::clone(&repo);
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let user = User {
                    age: 16 + i64::from(i),
                    status: "active",
                };
                let report = validator.validate_operation(&user, "Create", &repo);
                println!("Thread {i}: {:?}", report.failure_messages());
            })
        })
        .collect();

    for h in handles {
        h.join().unwrap();
    }
}
