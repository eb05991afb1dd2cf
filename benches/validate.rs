use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ruletrail::{
    flatten, FieldVisitor, Record, RuleEntry, RuleRepository, ValidationContext, Validator,
};

/// A record with `n` integer fields named `f0`, `f1`, ...
struct Wide {
    values: Vec<i64>,
}

impl Record for Wide {
    fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
        for (i, value) in self.values.iter().enumerate() {
            v.field(&format!("f{i}"), *value);
        }
    }
}

/// `n` flat rules, one per field.
fn flat_rules(n: usize) -> Vec<RuleEntry> {
    (0..n).map(|i| RuleEntry::new(format!("f{i} >= 1"))).collect()
}

/// A single chain `n` levels deep.
fn chained_rules(n: usize) -> Vec<RuleEntry> {
    let mut entry = RuleEntry::new(format!("f{} >= 1", n - 1));
    for i in (0..n - 1).rev() {
        entry = RuleEntry::new(format!("f{i} >= 1")).then(entry);
    }
    vec![entry]
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let validator = Validator::new();
    let context = ValidationContext::new("Wide", "Create");

    for &n in &[5, 20, 50] {
        let record = Wide {
            values: vec![10; n],
        };

        let rules = flat_rules(n);
        group.bench_function(&format!("{n}_flat_rules"), |b| {
            b.iter(|| validator.validate(black_box(&record), &rules, &context));
        });

        let rules = chained_rules(n);
        group.bench_function(&format!("{n}_chained_rules"), |b| {
            b.iter(|| validator.validate(black_box(&record), &rules, &context));
        });
    }

    group.finish();
}

fn bench_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("resolution");

    for &n in &[5, 20, 50] {
        let record = Wide {
            values: vec![10; n],
        };
        let repo = RuleRepository::new()
            .with_rules("Wide", "Default", flat_rules(n))
            .with_rules("Wide", "Create", chained_rules(n));

        group.bench_function(&format!("{n}_rules"), |b| {
            b.iter(|| ruletrail::rules_for(black_box(&record), "Create", &repo));
        });
    }

    group.finish();
}

fn bench_flatten(c: &mut Criterion) {
    let mut group = c.benchmark_group("flatten");

    for &n in &[5, 20, 50] {
        let record = Wide {
            values: vec![10; n],
        };
        group.bench_function(&format!("{n}_fields"), |b| {
            b.iter(|| flatten(black_box(&record)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_validate, bench_resolution, bench_flatten);
criterion_main!(benches);
