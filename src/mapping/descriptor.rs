//! Record declarations
//!
//! A record type describes how it is filled from a result set by returning a
//! [`RecordDescriptor`]: the measurement it is read from, the time column,
//! explicit column/tag bindings and at most one extension bag that receives
//! every column nothing else claimed.
//!
//! ```rust,ignore
//! impl Measurement for Reading {
//!     const MEASUREMENT: &'static str = "sensorData";
//!
//!     fn descriptor() -> RecordDescriptor<Self> {
//!         RecordDescriptor::new()
//!             .time("time", |r, t| r.time = Some(t))
//!             .field("temperature", |r, v: f64| r.temperature = v)
//!             .extension(extra_fields)
//!     }
//! }
//! ```

use crate::mapping::coerce::{FieldKind, FieldValue};
use crate::mapping::error::{MappingError, MappingResult};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;

/// A record type that can be decoded from one measurement
pub trait Measurement: Default + Send + Sync + 'static {
    /// Series name the record is read from
    const MEASUREMENT: &'static str;

    /// Declares how columns map onto the record
    fn descriptor() -> RecordDescriptor<Self>;
}

/// A Rust type a column can be bound to
pub trait StoreField: Sized {
    const KIND: FieldKind;

    fn from_value(value: FieldValue) -> Option<Self>;
}

impl StoreField for String {
    const KIND: FieldKind = FieldKind::Text;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl StoreField for DateTime<Utc> {
    const KIND: FieldKind = FieldKind::Instant;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Instant(t) => Some(t),
            _ => None,
        }
    }
}

impl StoreField for f64 {
    const KIND: FieldKind = FieldKind::Double;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Double(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreField for i64 {
    const KIND: FieldKind = FieldKind::Long;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Long(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreField for i32 {
    const KIND: FieldKind = FieldKind::Int;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Int(v) => Some(v),
            _ => None,
        }
    }
}

impl StoreField for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn from_value(value: FieldValue) -> Option<Self> {
        match value {
            FieldValue::Bool(v) => Some(v),
            _ => None,
        }
    }
}

impl<F: StoreField> StoreField for Option<F> {
    const KIND: FieldKind = F::KIND;

    fn from_value(value: FieldValue) -> Option<Self> {
        F::from_value(value).map(Some)
    }
}

/// Type-erased assignment of a coerced value; `false` if the value does not fit
pub(crate) type Assign<T> = Box<dyn Fn(&mut T, FieldValue) -> bool + Send + Sync>;

/// Accessor for a record's extension bag
pub type ExtensionBag<T> = fn(&mut T) -> &mut HashMap<String, Value>;

pub(crate) struct Binding<T> {
    pub(crate) kind: FieldKind,
    pub(crate) assign: Assign<T>,
}

struct Declaration<T> {
    column: String,
    binding: Binding<T>,
}

/// Column bindings of a record type, as declared
pub struct RecordDescriptor<T> {
    time: Vec<Declaration<T>>,
    fields: Vec<Declaration<T>>,
    extensions: Vec<ExtensionBag<T>>,
}

impl<T> Default for RecordDescriptor<T> {
    fn default() -> Self {
        Self {
            time: Vec::new(),
            fields: Vec::new(),
            extensions: Vec::new(),
        }
    }
}

impl<T: 'static> RecordDescriptor<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the time column
    pub fn time<S>(mut self, column: impl Into<String>, setter: S) -> Self
    where
        S: Fn(&mut T, DateTime<Utc>) + Send + Sync + 'static,
    {
        self.time.push(Declaration {
            column: column.into(),
            binding: typed::<T, DateTime<Utc>, S>(setter),
        });
        self
    }

    /// Bind a column or tag to a typed field
    pub fn field<F, S>(mut self, column: impl Into<String>, setter: S) -> Self
    where
        F: StoreField + 'static,
        S: Fn(&mut T, F) + Send + Sync + 'static,
    {
        self.fields.push(Declaration {
            column: column.into(),
            binding: typed::<T, F, S>(setter),
        });
        self
    }

    /// Bind a column with an explicit kind and an untyped setter
    pub fn raw<S>(mut self, column: impl Into<String>, kind: FieldKind, assign: S) -> Self
    where
        S: Fn(&mut T, FieldValue) + Send + Sync + 'static,
    {
        self.fields.push(Declaration {
            column: column.into(),
            binding: Binding {
                kind,
                assign: Box::new(move |record, value| {
                    assign(record, value);
                    true
                }),
            },
        });
        self
    }

    /// Route every unclaimed column and tag into a map on the record
    pub fn extension(mut self, bag: ExtensionBag<T>) -> Self {
        self.extensions.push(bag);
        self
    }
}

fn typed<T, F, S>(setter: S) -> Binding<T>
where
    T: 'static,
    F: StoreField + 'static,
    S: Fn(&mut T, F) + Send + Sync + 'static,
{
    Binding {
        kind: F::KIND,
        assign: Box::new(move |record, value| match F::from_value(value) {
            Some(v) => {
                setter(record, v);
                true
            }
            None => false,
        }),
    }
}

/// Validated, lookup-ready form of a [`RecordDescriptor`]
pub(crate) struct RecordMapping<T> {
    measurement: &'static str,
    bindings: HashMap<String, Binding<T>>,
    extension: Option<ExtensionBag<T>>,
}

impl<T: Measurement> RecordMapping<T> {
    pub(crate) fn compile() -> MappingResult<Self> {
        let type_name = std::any::type_name::<T>();
        let descriptor = T::descriptor();

        if T::MEASUREMENT.trim().is_empty() {
            return Err(MappingError::Configuration(format!(
                "{} does not declare a measurement",
                type_name
            )));
        }
        match descriptor.time.len() {
            0 => {
                return Err(MappingError::Configuration(format!(
                    "{} does not declare a time column",
                    type_name
                )))
            }
            1 => {}
            _ => {
                return Err(MappingError::Configuration(format!(
                    "{} declares more than one time column",
                    type_name
                )))
            }
        }
        if descriptor.extensions.len() > 1 {
            return Err(MappingError::Configuration(format!(
                "{} declares more than one extension bag",
                type_name
            )));
        }

        let mut bindings = HashMap::new();
        for declaration in descriptor.time.into_iter().chain(descriptor.fields) {
            if bindings.contains_key(&declaration.column) {
                return Err(MappingError::Configuration(format!(
                    "{} binds column '{}' twice",
                    type_name, declaration.column
                )));
            }
            bindings.insert(declaration.column, declaration.binding);
        }

        Ok(Self {
            measurement: T::MEASUREMENT,
            bindings,
            extension: descriptor.extensions.into_iter().next(),
        })
    }
}

impl<T> RecordMapping<T> {
    pub(crate) fn measurement(&self) -> &'static str {
        self.measurement
    }

    pub(crate) fn binding(&self, column: &str) -> Option<&Binding<T>> {
        self.bindings.get(column)
    }

    pub(crate) fn extension(&self) -> Option<ExtensionBag<T>> {
        self.extension
    }

    pub(crate) fn columns(&self) -> usize {
        self.bindings.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Gauge {
        time: Option<DateTime<Utc>>,
        label: Option<String>,
        extra: HashMap<String, Value>,
    }

    fn extra(gauge: &mut Gauge) -> &mut HashMap<String, Value> {
        &mut gauge.extra
    }

    impl Measurement for Gauge {
        const MEASUREMENT: &'static str = "gauge";

        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::new()
                .time("time", |p: &mut Gauge, t| p.time = Some(t))
                .field("label", |p: &mut Gauge, v: Option<String>| p.label = v)
                .extension(extra)
        }
    }

    #[derive(Default)]
    struct NoTime;

    impl Measurement for NoTime {
        const MEASUREMENT: &'static str = "noTime";

        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::new()
        }
    }

    #[derive(Default)]
    struct TwoBags {
        a: HashMap<String, Value>,
        b: HashMap<String, Value>,
    }

    fn bag_a(r: &mut TwoBags) -> &mut HashMap<String, Value> {
        &mut r.a
    }

    fn bag_b(r: &mut TwoBags) -> &mut HashMap<String, Value> {
        &mut r.b
    }

    impl Measurement for TwoBags {
        const MEASUREMENT: &'static str = "twoBags";

        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::new()
                .time("time", |_: &mut TwoBags, _| {})
                .extension(bag_a)
                .extension(bag_b)
        }
    }

    #[derive(Default)]
    struct Duplicate {
        value: f64,
    }

    impl Measurement for Duplicate {
        const MEASUREMENT: &'static str = "duplicate";

        fn descriptor() -> RecordDescriptor<Self> {
            RecordDescriptor::new()
                .time("time", |_: &mut Duplicate, _| {})
                .field("value", |d: &mut Duplicate, v: f64| d.value = v)
                .field("value", |d: &mut Duplicate, v: f64| d.value = -v)
        }
    }

    #[test]
    fn test_compile_valid_descriptor() {
        let mapping = RecordMapping::<Gauge>::compile().unwrap();
        assert_eq!(mapping.measurement(), "gauge");
        assert_eq!(mapping.columns(), 2);
        assert_eq!(mapping.binding("time").map(|b| b.kind), Some(FieldKind::Instant));
        assert_eq!(mapping.binding("label").map(|b| b.kind), Some(FieldKind::Text));
        assert!(mapping.binding("humidity").is_none());
        assert!(mapping.extension().is_some());

        let mut gauge = Gauge::default();
        let label = mapping.binding("label").unwrap();
        assert!((label.assign)(&mut gauge, FieldValue::Text("kitchen".into())));
        assert_eq!(gauge.label.as_deref(), Some("kitchen"));
        assert!(!(label.assign)(&mut gauge, FieldValue::Double(1.0)));

        let bag = mapping.extension().unwrap();
        bag(&mut gauge).insert("humidity".into(), Value::from(40));
        assert_eq!(gauge.extra.len(), 1);
    }

    #[test]
    fn test_missing_time_column() {
        assert!(matches!(
            RecordMapping::<NoTime>::compile(),
            Err(MappingError::Configuration(msg)) if msg.contains("time column")
        ));
    }

    #[test]
    fn test_two_extension_bags() {
        assert!(matches!(
            RecordMapping::<TwoBags>::compile(),
            Err(MappingError::Configuration(msg)) if msg.contains("extension bag")
        ));
    }

    #[test]
    fn test_column_bound_twice() {
        assert!(matches!(
            RecordMapping::<Duplicate>::compile(),
            Err(MappingError::Configuration(msg)) if msg.contains("'value' twice")
        ));
    }
}
