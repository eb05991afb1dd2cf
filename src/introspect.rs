use std::borrow::Cow;
use std::rc::Rc;
use std::sync::Arc;

use crate::{Fields, Value};

/// A validated type: exposes a stable type name and its fields.
///
/// The type name selects the bucket in a
/// [`RuleRepository`](crate::RuleRepository). Fields are visited into a
/// flattened [`Fields`] map; nested records are flattened with dotted
/// paths (`Address.City`).
///
/// ```
/// use ruletrail::{flatten, FieldVisitor, Record, Value};
///
/// struct Address { city: String }
/// struct User { name: String, address: Address, nickname: Option<String> }
///
/// impl Record for Address {
///     fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
///         v.field("City", self.city.as_str());
///     }
/// }
///
/// impl Record for User {
///     fn visit_fields(&self, v: &mut FieldVisitor<'_>) {
///         v.field("Name", self.name.as_str());
///         v.record("Address", &self.address);
///         v.optional("Nickname", self.nickname.as_deref());
///     }
/// }
///
/// let user = User {
///     name: "Bob".into(),
///     address: Address { city: "LA".into() },
///     nickname: None,
/// };
/// let fields = flatten(&user);
/// assert_eq!(fields.get("Address.City"), Some(&Value::from("LA")));
/// assert_eq!(fields.get("Nickname"), None);
/// assert_eq!(user.type_name(), "User");
/// ```
pub trait Record {
    /// Name used to look up this record's rules. Defaults to the Rust type
    /// name without module path or generic arguments.
    fn type_name(&self) -> Cow<'_, str> {
        Cow::Borrowed(short_type_name(std::any::type_name::<Self>()))
    }

    /// Report every accessible field to the visitor.
    fn visit_fields(&self, visitor: &mut FieldVisitor<'_>);
}

/// Collects the fields of a [`Record`] into a flattened [`Fields`] map.
#[derive(Debug)]
pub struct FieldVisitor<'a> {
    fields: &'a mut Fields,
    prefix: String,
}

impl<'a> FieldVisitor<'a> {
    fn new(fields: &'a mut Fields, prefix: String) -> Self {
        Self { fields, prefix }
    }

    fn path(&self, name: &str) -> String {
        format!("{}{name}", self.prefix)
    }

    /// Record a field value.
    pub fn field(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let path = self.path(name);
        self.fields.insert(&path, value.into());
        self
    }

    /// Record a field that may be absent; `None` leaves it undeclared.
    pub fn optional<V: Into<Value>>(&mut self, name: &str, value: Option<V>) -> &mut Self {
        if let Some(value) = value {
            self.field(name, value);
        }
        self
    }

    /// Flatten a nested record under `name.`.
    pub fn record<R: Record + ?Sized>(&mut self, name: &str, nested: &R) -> &mut Self {
        let prefix = format!("{}{name}.", self.prefix);
        nested.visit_fields(&mut FieldVisitor::new(&mut *self.fields, prefix));
        self
    }

    /// Flatten a nested record that may be absent.
    pub fn optional_record<R: Record + ?Sized>(
        &mut self,
        name: &str,
        nested: Option<&R>,
    ) -> &mut Self {
        if let Some(nested) = nested {
            self.record(name, nested);
        }
        self
    }
}

/// Flatten a record into dotted field paths.
#[must_use]
pub fn flatten<R: Record + ?Sized>(record: &R) -> Fields {
    let mut fields = Fields::new();
    record.visit_fields(&mut FieldVisitor::new(&mut fields, String::new()));
    fields
}

/// The rule lookup name of a record.
#[must_use]
pub fn type_name_of<R: Record + ?Sized>(record: &R) -> String {
    record.type_name().into_owned()
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

macro_rules! delegate_record {
    ($($wrapper:ty),*) => {
        $(
            impl<T: Record + ?Sized> Record for $wrapper {
                fn type_name(&self) -> Cow<'_, str> {
                    (**self).type_name()
                }

                fn visit_fields(&self, visitor: &mut FieldVisitor<'_>) {
                    (**self).visit_fields(visitor);
                }
            }
        )*
    };
}

delegate_record!(&T, Box<T>, Rc<T>, Arc<T>);
