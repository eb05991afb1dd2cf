use super::environment::Environment;
use super::fields::Fields;
use super::value::Value;

/// Variable values laid out in the slot order of an [`Environment`].
///
/// Created once per validation run via [`Environment::activation()`] and
/// shared by every program executed in that run.
#[derive(Debug, Clone)]
pub struct Activation {
    values: Vec<Value>,
}

impl Activation {
    pub(crate) fn new(env: &Environment, fields: &Fields) -> Self {
        let mut values = vec![Value::Null; env.len()];
        for (path, value) in fields.iter() {
            if let Some((slot, _)) = env.lookup(path) {
                values[slot] = value.clone();
            }
        }
        Self { values }
    }

    /// Get a variable value by its slot.
    #[inline]
    #[must_use]
    pub fn get(&self, slot: usize) -> Option<&Value> {
        self.values.get(slot)
    }

    /// The raw slot values, for direct access by the evaluator.
    #[must_use]
    pub(crate) fn values(&self) -> &[Value] {
        &self.values
    }
}
