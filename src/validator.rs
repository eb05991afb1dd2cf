use std::collections::HashSet;
use std::time::Instant;

use tracing::{debug, debug_span, trace};

use crate::types::DEFAULT_MAX_PROGRAM_SIZE;
use crate::{
    flatten, rules_for, Activation, Environment, Record, RuleEntry, RuleError, RuleRepository,
    ValidationContext, ValidationReport, ValidationResult, Value,
};

/// Builder for configuring a [`Validator`].
///
/// ```
/// use ruletrail::ValidatorBuilder;
///
/// let validator = ValidatorBuilder::new()
///     .partial_eval(true)
///     .max_program_size(256)
///     .build();
/// assert!(validator.is_partial_eval());
/// ```
#[derive(Debug, Clone)]
pub struct ValidatorBuilder {
    partial_eval: bool,
    max_program_size: usize,
}

impl Default for ValidatorBuilder {
    fn default() -> Self {
        Self {
            partial_eval: false,
            max_program_size: DEFAULT_MAX_PROGRAM_SIZE,
        }
    }
}

impl ValidatorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep evaluating after a rule fails to compile or build. The failure
    /// is still reported for that rule, but the run does not halt.
    #[must_use]
    pub fn partial_eval(mut self, enabled: bool) -> Self {
        self.partial_eval = enabled;
        self
    }

    /// Node budget for each rule's built program.
    #[must_use]
    pub fn max_program_size(mut self, limit: usize) -> Self {
        self.max_program_size = limit;
        self
    }

    #[must_use]
    pub fn build(self) -> Validator {
        Validator {
            partial_eval: self.partial_eval,
            max_program_size: self.max_program_size,
        }
    }
}

/// Evaluates rule trees against records.
///
/// Holds configuration only; a validator is `Send + Sync` and can be shared
/// behind `Arc` across threads. Every call builds its own environment and
/// result list.
#[derive(Debug, Clone)]
pub struct Validator {
    partial_eval: bool,
    max_program_size: usize,
}

impl Default for Validator {
    fn default() -> Self {
        ValidatorBuilder::new().build()
    }
}

impl Validator {
    /// A validator that halts on the first compile or build failure.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn builder() -> ValidatorBuilder {
        ValidatorBuilder::new()
    }

    #[must_use]
    pub fn is_partial_eval(&self) -> bool {
        self.partial_eval
    }

    #[must_use]
    pub fn max_program_size(&self) -> usize {
        self.max_program_size
    }

    /// Evaluate `rules` against `record`.
    ///
    /// Rules are visited depth first in order. Disabled entries and
    /// expressions already visited anywhere in this run are skipped. A rule
    /// that evaluates to `true` has its chained rules evaluated with a
    /// `then` step appended to the chain path; a failing rule's chain is
    /// skipped. Compile and build failures are reported against the rule
    /// and halt the run unless partial evaluation is enabled; runtime errors
    /// and `false` results never halt.
    pub fn validate<R: Record + ?Sized>(
        &self,
        record: &R,
        rules: &[RuleEntry],
        context: &ValidationContext,
    ) -> ValidationReport {
        let span = debug_span!(
            "validate",
            type_name = context.type_name(),
            operation = context.operation()
        );
        let _guard = span.enter();
        let start = Instant::now();

        let fields = flatten(record);
        let env = match Environment::declare(&fields) {
            Ok(env) => env.with_max_program_size(self.max_program_size),
            Err(err) => {
                debug!(error = %err, "cannot declare record fields");
                return ValidationReport::new(Vec::new(), Some(err.into()), start.elapsed());
            }
        };
        let activation = env.activation(&fields);

        let mut walk = Walk {
            env: &env,
            activation: &activation,
            partial_eval: self.partial_eval,
            seen: HashSet::new(),
            results: Vec::new(),
        };
        let halted = walk.visit(rules, context).err();

        debug!(
            results = walk.results.len(),
            halted = halted.is_some(),
            "validation finished"
        );
        ValidationReport::new(walk.results, halted, start.elapsed())
    }

    /// Resolve the rules of `record`'s type for `operation` and validate
    /// them with a root context derived from the repository.
    pub fn validate_operation<R: Record + ?Sized>(
        &self,
        record: &R,
        operation: &str,
        repository: &RuleRepository,
    ) -> ValidationReport {
        let rules = rules_for(record, operation, repository);
        let context = ValidationContext::for_record(record, operation, repository);
        self.validate(record, &rules, &context)
    }
}

/// State of one validation run.
struct Walk<'a> {
    env: &'a Environment,
    activation: &'a Activation,
    partial_eval: bool,
    seen: HashSet<&'a str>,
    results: Vec<ValidationResult>,
}

impl<'a> Walk<'a> {
    fn visit(
        &mut self,
        entries: &'a [RuleEntry],
        context: &ValidationContext,
    ) -> Result<(), RuleError> {
        for (index, entry) in entries.iter().enumerate() {
            if !entry.enabled || !self.seen.insert(entry.rule.as_str()) {
                continue;
            }

            let ast = match self.env.compile(&entry.rule) {
                Ok(ast) => ast,
                Err(err) => {
                    self.setup_failure(entry, context.failed_at(index, "compileError"), err.into())?;
                    continue;
                }
            };
            let program = match self.env.program(&ast) {
                Ok(program) => program,
                Err(err) => {
                    self.setup_failure(entry, context.failed_at(index, "programError"), err.into())?;
                    continue;
                }
            };

            let (passed, error) = match program.execute(self.activation) {
                Ok(value) => (value == Value::Bool(true), None),
                Err(err) => (false, Some(RuleError::from(err))),
            };
            let message = if passed || error.is_some() {
                String::new()
            } else {
                entry.message.clone()
            };
            trace!(
                rule = %entry.rule,
                passed,
                chain_path = context.chain_path(),
                error = error.as_ref().map(tracing::field::display),
                "rule evaluated"
            );
            self.results.push(ValidationResult::new(
                entry.rule.as_str(),
                passed,
                error,
                message,
                context.at(index),
            ));

            if passed && !entry.then.is_empty() {
                self.visit(&entry.then, &context.chained(&entry.rule))?;
            }
        }
        Ok(())
    }

    /// Record a compile or build failure; returns the error when it halts
    /// the run.
    fn setup_failure(
        &mut self,
        entry: &RuleEntry,
        context: ValidationContext,
        error: RuleError,
    ) -> Result<(), RuleError> {
        let halts = !self.partial_eval && error.halts();
        debug!(rule = %entry.rule, error = %error, halts, "rule failed to compile");
        self.results.push(ValidationResult::new(
            entry.rule.as_str(),
            false,
            Some(error.clone()),
            "",
            context,
        ));
        if halts {
            Err(error)
        } else {
            Ok(())
        }
    }
}
