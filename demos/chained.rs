use ruletrail::{FieldVisitor, Record, RuleEntry, RuleRepository, Validator};
use tracing_subscriber::EnvFilter;

struct Order {
    total: f64,
    express: bool,
    region: &'static str,
}

impl Record for Order {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        v.field("Total", self.total)
            .field("Express", self.express)
            .field("Region", self.region);
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Express shipping is only checked for orders that ship express, and
    // the region only once the total qualifies.
    let repo = RuleRepository::new().with_rules(
        "Order",
        "Create",
        vec![
            RuleEntry::new("Total > 0.0").with_message("order is empty"),
            RuleEntry::new("Express")
                .then(
                    RuleEntry::new("Total >= 50.0")
                        .with_message("express needs a total of at least 50")
                        .then(
                            RuleEntry::new("Region in ['us-east', 'us-west']")
                                .with_message("express is not offered in this region"),
                        ),
                ),
        ],
    );

    let orders = [
        Order {
            total: 20.0,
            express: false,
            region: "eu",
        },
        Order {
            total: 20.0,
            express: true,
            region: "us-east",
        },
        Order {
            total: 80.0,
            express: true,
            region: "eu",
        },
    ];

    let validator = Validator::new();
    for (i, order) in orders.iter().enumerate() {
        let report = validator.validate_operation(order, "Create", &repo);
        println!("Order {i}: {report}");
        for result in report.results() {
            println!("  {} {result}", result.context());
        }
    }
}
