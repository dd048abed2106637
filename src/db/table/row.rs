use super::{binding::Bindings, schema::Schema};
use crate::core::types::Value;

/// A row of typed values, one per column position.
///
/// Built from the binding buffers after a fetch; this is what the query
/// engine evaluates predicates against.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The ordered values in this row.
    pub values: Vec<Value>,
}

impl Row {
    /// Creates a new row from a vector of values.
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// Rebuilds typed values from the bound display text. Unbound and null
    /// positions become [`Value::Null`].
    pub fn from_bindings(schema: &Schema, bindings: &Bindings) -> Self {
        let values = schema
            .columns
            .iter()
            .zip(bindings.iter())
            .map(|(column, buffer)| {
                let text = buffer.is_bound().then(|| buffer.value()).flatten();
                Value::from_bound(column.column_type.data_type(), text)
            })
            .collect();

        Self { values }
    }

    /// Gets a reference to the value at the given column index.
    pub fn get_value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }
}
