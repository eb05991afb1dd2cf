use std::sync::Arc;
use std::thread;

use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};

struct User {
    age: i64,
    status: &'static str,
    banned: bool,
}

impl Record for User {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Age", self.age)
            .field("Status", self.status)
            .field("Banned", self.banned);
    }
}

fn repository() -> RuleRepository {
    RuleRepository::new()
        .with_rules(
            "User",
            "Default",
            vec![RuleEntry::new("!Banned").with_message("user is banned")],
        )
        .with_rules(
            "User",
            "Create",
            vec![RuleEntry::new("Age >= 18")
                .with_message("must be an adult")
                .then(RuleEntry::new("Status == 'active'").with_message("account inactive"))],
        )
}

#[test]
fn validate_across_threads() {
    let repo = Arc::new(repository());
    let validator = Arc::new(Validator::new());

    let users = [
        User {
            age: 25,
            status: "active",
            banned: false,
        },
        User {
            age: 30,
            status: "active",
            banned: true,
        },
        User {
            age: 15,
            status: "active",
            banned: false,
        },
        User {
            age: 40,
            status: "suspended",
            banned: false,
        },
    ];

    let handles: Vec<_> = users
        .into_iter()
        .map(|user| {
            let repo = Arc::clone(&repo);
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let report = validator.validate_operation(&user, "Create", &repo);
                report
                    .failure_messages()
                    .into_iter()
                    .map(str::to_owned)
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let messages: Vec<Vec<String>> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(messages[0].is_empty());
    assert_eq!(messages[1], ["user is banned"]);
    assert_eq!(messages[2], ["must be an adult"]);
    assert_eq!(messages[3], ["account inactive"]);
}

#[test]
fn repeated_runs_agree_across_threads() {
    let repo = Arc::new(repository());
    let validator = Arc::new(Validator::builder().partial_eval(true).build());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let repo = Arc::clone(&repo);
            let validator = Arc::clone(&validator);
            thread::spawn(move || {
                let user = User {
                    age: 10 + i * 5,
                    status: if i % 2 == 0 { "active" } else { "inactive" },
                    banned: i == 3,
                };
                let first = validator.validate_operation(&user, "Create", &repo);
                let second = validator.validate_operation(&user, "Create", &repo);
                (
                    first.results().to_vec(),
                    second.results().to_vec(),
                )
            })
        })
        .collect();

    for handle in handles {
        let (first, second) = handle.join().unwrap();
        assert_eq!(first, second);
    }
}

#[test]
fn shared_types_are_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Validator>();
    assert_send_sync::<RuleRepository>();
    assert_send_sync::<ruletrail::ValidationReport>();
}
