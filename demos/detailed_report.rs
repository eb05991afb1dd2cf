use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};
use tracing_subscriber::EnvFilter;

struct Address {
    city: String,
    zip: Option<String>,
}

impl Record for Address {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("City", self.city.as_str())
            .optional("Zip", self.zip.as_deref());
    }
}

struct Customer {
    age: i64,
    banned: bool,
    address: Address,
}

impl Record for Customer {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Age", self.age)
            .field("Banned", self.banned)
            .record("Address", &self.address);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let repo = RuleRepository::new()
        .with_rules(
            "Customer",
            "Default",
            vec![RuleEntry::new("!Banned").with_message("customer is banned")],
        )
        .with_rules(
            "Customer",
            "Update",
            vec![
                RuleEntry::new("Age >= 18").with_message("must be an adult"),
                RuleEntry::new("size(Address.Zip) == 6").with_message("zip code must have 6 characters"),
                // Undeclared field: reported as a compile error.
                RuleEntry::new("Address.Country == 'CA'"),
                RuleEntry::new("size(Address.City) > 0").with_message("city is required"),
            ],
        );

    let customer = Customer {
        age: 30,
        banned: false,
        address: Address {
            city: "Toronto".into(),
            zip: Some("M5V 2T6".into()),
        },
    };

    // Partial evaluation keeps going past the compile error.
    let validator = Validator::builder().partial_eval(true).build();
    let report = validator.validate_operation(&customer, "Update", &repo);

    println!("{report}");
    println!();
    for result in report.results() {
        println!("{:<28} {result}", result.context().to_string());
    }
    println!();
    println!("Failure messages: {:?}", report.failure_messages());
    println!("Duration: {:?}", report.duration());

    // Without partial evaluation the run halts at the compile error.
    let report = Validator::new().validate_operation(&customer, "Update", &repo);
    println!();
    println!("{report}");
}
