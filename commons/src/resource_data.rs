//! ResourceData - the local-state container handed to field callbacks
//!
//! Holds one resource's configuration or state values together with the
//! schema they belong to. Reads apply schema defaults; writes are checked
//! against the schema so a read callback that produces the wrong shape fails
//! instead of corrupting state.

use crate::error::{FieldError, Result};
use crate::schema::{Schema, SchemaMap, ValueType};
use crate::types::{AttributePath, Diagnostic, Diagnostics, Dynamic};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;

const ID_KEY: &str = "id";

#[derive(Debug, Clone)]
pub struct ResourceData {
    schema: Arc<SchemaMap>,
    id: Option<String>,
    values: HashMap<String, Dynamic>,
    prior: Option<HashMap<String, Dynamic>>,
}

impl ResourceData {
    /// Empty container, used when reading a remote object into fresh state
    pub fn new(schema: Arc<SchemaMap>) -> Self {
        Self {
            schema,
            id: None,
            values: HashMap::new(),
            prior: None,
        }
    }

    pub fn with_values(schema: Arc<SchemaMap>, values: HashMap<String, Dynamic>) -> Self {
        let mut data = Self::new(schema);
        data.id = values
            .get(ID_KEY)
            .and_then(Dynamic::as_str)
            .map(str::to_string);
        data.values = values;
        data.values.remove(ID_KEY);
        data
    }

    /// Builds a container from an encoded state or config object
    pub fn from_value(schema: Arc<SchemaMap>, value: &Dynamic) -> Result<Self> {
        match value {
            Dynamic::Map(values) => Ok(Self::with_values(schema, values.clone())),
            Dynamic::Null => Ok(Self::new(schema)),
            other => Err(FieldError::TypeMismatch {
                field: "state".to_string(),
                expected: "map".to_string(),
                actual: other.type_name().to_string(),
            }),
        }
    }

    /// Attaches the previous state so `has_change` can compare against it
    pub fn with_prior(mut self, prior: &ResourceData) -> Self {
        self.prior = Some(prior.values.clone());
        if self.id.is_none() {
            self.id = prior.id.clone();
        }
        self
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    pub fn schema(&self) -> &SchemaMap {
        &self.schema
    }

    pub fn schema_arc(&self) -> Arc<SchemaMap> {
        Arc::clone(&self.schema)
    }

    /// Value with schema defaults applied; `None` when unset and no default
    pub fn get(&self, name: &str) -> Option<Dynamic> {
        let value = self.values.get(name);
        match self.schema.get(name) {
            Some(schema) => schema.apply_defaults(value),
            None => value.filter(|v| !v.is_null()).cloned(),
        }
    }

    /// Like `get`, but only for values that are not the zero value of their type
    pub fn get_ok(&self, name: &str) -> Option<Dynamic> {
        self.get(name).filter(|v| !v.is_zero())
    }

    /// True when the key is present in the raw values, ignoring defaults
    pub fn is_set(&self, name: &str) -> bool {
        self.values.get(name).is_some_and(|v| !v.is_null())
    }

    pub fn get_string(&self, name: &str) -> Result<Option<String>> {
        self.typed(name, "string", |v| v.as_str().map(str::to_string))
    }

    pub fn get_int(&self, name: &str) -> Result<Option<i64>> {
        self.typed(name, "int", Dynamic::as_i64)
    }

    pub fn get_float(&self, name: &str) -> Result<Option<f64>> {
        self.typed(name, "float", Dynamic::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.typed(name, "bool", Dynamic::as_bool)
    }

    /// Lists and sets of strings
    pub fn get_string_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        self.typed(name, "list of strings", |v| {
            v.as_list()?
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect()
        })
    }

    /// Decodes a field into a typed value, typically `Vec<SomeBlock>`
    pub fn decode<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            None => Ok(None),
            Some(value) => value.decode().map(Some).map_err(|e| FieldError::Decode {
                field: name.to_string(),
                message: e.to_string(),
            }),
        }
    }

    fn typed<T>(
        &self,
        name: &str,
        expected: &str,
        convert: impl Fn(&Dynamic) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(name) {
            None | Some(Dynamic::Unknown) => Ok(None),
            Some(value) => convert(&value).map(Some).ok_or_else(|| FieldError::TypeMismatch {
                field: name.to_string(),
                expected: expected.to_string(),
                actual: value.type_name().to_string(),
            }),
        }
    }

    /// Writes a value, rejecting keys outside the schema and values of the
    /// wrong shape
    pub fn set(&mut self, name: &str, value: impl Into<Dynamic>) -> Result<()> {
        let value = value.into();
        let schema = self
            .schema
            .get(name)
            .ok_or_else(|| FieldError::UnknownField(name.to_string()))?;

        schema
            .conforms(&value)
            .map_err(|mismatch| FieldError::TypeMismatch {
                field: name.to_string(),
                expected: mismatch.expected,
                actual: mismatch.actual,
            })?;

        self.values.insert(name.to_string(), value);
        Ok(())
    }

    /// Writes flattened nested blocks
    pub fn set_blocks<T: Serialize>(&mut self, name: &str, blocks: Vec<T>) -> Result<()> {
        let items = blocks
            .iter()
            .map(Dynamic::from_serialize)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| FieldError::Encoding(format!("{}: {}", name, e)))?;
        self.set(name, Dynamic::List(items))
    }

    /// Whether the field differs from the prior state. Without prior state
    /// (creation) every non-zero value counts as a change.
    pub fn has_change(&self, name: &str) -> bool {
        let Some(schema) = self.schema.get(name) else {
            return false;
        };

        match &self.prior {
            None => self.get_ok(name).is_some(),
            Some(prior) => {
                !values_equivalent(name, schema, prior.get(name), self.values.get(name))
            }
        }
    }

    /// Encodes the values (plus id) as a single state object
    pub fn state(&self) -> Dynamic {
        let mut state = self.values.clone();
        if let Some(id) = &self.id {
            state.insert(ID_KEY.to_string(), Dynamic::String(id.clone()));
        }
        Dynamic::Map(state)
    }

    /// Checks required fields, conflicts and validators on the raw values
    pub fn validate(&self) -> Diagnostics {
        let mut diags = Diagnostics::new();
        validate_block(&self.schema, &self.values, None, &mut diags);

        for (name, schema) in self.schema.iter() {
            if !self.is_set(name) {
                continue;
            }
            for other in &schema.conflicts_with {
                if self.is_set(other) {
                    diags.add_error(
                        format!("\"{}\": conflicts with {}", name, other),
                        None::<String>,
                    );
                }
            }
        }
        diags
    }

    /// msgpack snapshot of the state object
    pub fn encode_msgpack(&self) -> Result<Vec<u8>> {
        rmp_serde::encode::to_vec(&self.state())
            .map_err(|e| FieldError::Encoding(format!("msgpack encoding failed: {}", e)))
    }

    pub fn decode_msgpack(schema: Arc<SchemaMap>, data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Ok(Self::new(schema));
        }
        let value: Dynamic =
            rmp_serde::decode::from_slice(data).map_err(|e| FieldError::Decode {
                field: "state".to_string(),
                message: format!("msgpack decoding failed: {}", e),
            })?;
        Self::from_value(schema, &value)
    }
}

fn validate_block(
    schema: &SchemaMap,
    values: &HashMap<String, Dynamic>,
    parent: Option<&AttributePath>,
    diags: &mut Diagnostics,
) {
    for (name, field) in schema {
        let path = match parent {
            Some(parent) => parent.clone().attribute(name),
            None => AttributePath::new(name),
        };
        let value = values.get(name).filter(|v| !v.is_null());

        match value {
            None if field.required => {
                diags.push(
                    Diagnostic::error(
                        "Missing required argument",
                        format!("The argument \"{}\" is required, but no definition was found.", path),
                    )
                    .with_attribute(path),
                );
            }
            None => {}
            Some(value) => {
                let path_str = path.to_string();
                for validator in &field.validators {
                    validator.validate(value, &path_str, diags);
                }
                if let (Some(block), Some(items)) = (field.nested_block(), value.as_list()) {
                    for (idx, item) in items.iter().enumerate() {
                        if let Some(entries) = item.as_map() {
                            let item_path = path.clone().index(idx as i64);
                            validate_block(block, entries, Some(&item_path), diags);
                        }
                    }
                }
            }
        }
    }
}

/// Compares two raw values under a schema the way a plan would: defaults
/// applied, absent equal to zero, sets unordered, diff suppression honored.
/// A computed attribute left out of config keeps whatever the API reported.
fn values_equivalent(
    key: &str,
    schema: &Schema,
    old: Option<&Dynamic>,
    new: Option<&Dynamic>,
) -> bool {
    if schema.computed && new.map_or(true, |v| v.is_null() || v.is_unknown()) {
        return true;
    }

    let old = schema.apply_defaults(old);
    let new = schema.apply_defaults(new);

    let old_zero = old.as_ref().map_or(true, Dynamic::is_zero);
    let new_zero = new.as_ref().map_or(true, Dynamic::is_zero);

    if let (Some(suppress), ValueType::String) = (schema.diff_suppress, schema.value_type) {
        let old_str = old.as_ref().and_then(Dynamic::as_str).unwrap_or_default();
        let new_str = new.as_ref().and_then(Dynamic::as_str).unwrap_or_default();
        if suppress(key, old_str, new_str) {
            return true;
        }
    }

    if old_zero && new_zero {
        return true;
    }

    let (Some(old), Some(new)) = (old, new) else {
        return false;
    };

    match (schema.value_type, old.as_list(), new.as_list()) {
        (ValueType::List, Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter()
                    .zip(b.iter())
                    .all(|(x, y)| elements_equivalent(key, schema, x, y))
        }
        (ValueType::Set, Some(a), Some(b)) => {
            a.len() == b.len()
                && a.iter()
                    .all(|x| b.iter().any(|y| elements_equivalent(key, schema, x, y)))
                && b.iter()
                    .all(|y| a.iter().any(|x| elements_equivalent(key, schema, x, y)))
        }
        _ => old == new,
    }
}

fn elements_equivalent(key: &str, schema: &Schema, a: &Dynamic, b: &Dynamic) -> bool {
    match (schema.nested_block(), a.as_map(), b.as_map()) {
        (Some(block), Some(a), Some(b)) => block.iter().all(|(name, field)| {
            values_equivalent(&format!("{}.{}", key, name), field, a.get(name), b.get(name))
        }),
        _ => a == b,
    }
}
