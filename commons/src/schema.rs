//! Schema fragments for registry fields
//!
//! Each registered field owns one `Schema`. A resource's full schema is the
//! map of all its fields' fragments, keyed by field name.

use crate::types::Dynamic;
use crate::validator::{ListLengthValidator, Validator};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Decides whether an old and new string value should be treated as equal
pub type DiffSuppressFn = fn(key: &str, old: &str, new: &str) -> bool;

/// Schema keyed by attribute name
pub type SchemaMap = BTreeMap<String, Schema>;

/// Value type of a field, matching the Terraform type system
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Int,
    Float,
    Bool,
    /// Ordered, allows duplicates
    List,
    /// Unordered, no duplicates
    Set,
    /// String keys only
    Map,
}

impl ValueType {
    pub fn is_collection(&self) -> bool {
        matches!(self, ValueType::List | ValueType::Set | ValueType::Map)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::String => "string",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Bool => "bool",
            ValueType::List => "list",
            ValueType::Set => "set",
            ValueType::Map => "map",
        };
        f.write_str(name)
    }
}

/// Element of a collection: a scalar type or a nested block
#[derive(Debug, Clone)]
pub enum Elem {
    Type(ValueType),
    Block(SchemaMap),
}

/// Type check failure, reported by `Schema::conforms`
#[derive(Debug, Clone, PartialEq)]
pub struct Mismatch {
    pub expected: String,
    pub actual: String,
}

/// Schema fragment of a single field
#[derive(Clone)]
pub struct Schema {
    pub value_type: ValueType,
    pub elem: Option<Elem>,
    pub description: String,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    pub force_new: bool,
    pub sensitive: bool,
    pub default: Option<Dynamic>,
    pub min_items: usize,
    /// 0 means unbounded
    pub max_items: usize,
    pub conflicts_with: Vec<String>,
    pub validators: Vec<Arc<dyn Validator>>,
    pub diff_suppress: Option<DiffSuppressFn>,
}

// Manual Debug implementation since validators don't implement Debug
impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("value_type", &self.value_type)
            .field("elem", &self.elem)
            .field("required", &self.required)
            .field("optional", &self.optional)
            .field("computed", &self.computed)
            .field("force_new", &self.force_new)
            .field("default", &self.default)
            .field(
                "validators",
                &format!("{} validators", self.validators.len()),
            )
            .field("diff_suppress", &self.diff_suppress.is_some())
            .finish()
    }
}

impl Schema {
    pub fn builder(value_type: ValueType) -> SchemaBuilder {
        SchemaBuilder::new(value_type)
    }

    pub fn string() -> SchemaBuilder {
        SchemaBuilder::new(ValueType::String)
    }

    pub fn int() -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Int)
    }

    pub fn float() -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Float)
    }

    pub fn bool() -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Bool)
    }

    pub fn list_of(elem: ValueType) -> SchemaBuilder {
        SchemaBuilder::new(ValueType::List).elem(Elem::Type(elem))
    }

    pub fn set_of(elem: ValueType) -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Set).elem(Elem::Type(elem))
    }

    pub fn map_of(elem: ValueType) -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Map).elem(Elem::Type(elem))
    }

    /// Repeated nested block, ordered
    pub fn block_list(block: SchemaMap) -> SchemaBuilder {
        SchemaBuilder::new(ValueType::List).elem(Elem::Block(block))
    }

    /// Repeated nested block, unordered
    pub fn block_set(block: SchemaMap) -> SchemaBuilder {
        SchemaBuilder::new(ValueType::Set).elem(Elem::Block(block))
    }

    pub fn nested_block(&self) -> Option<&SchemaMap> {
        match &self.elem {
            Some(Elem::Block(block)) => Some(block),
            _ => None,
        }
    }

    /// Returns the value with schema defaults filled in, recursing into
    /// nested blocks. `None` when neither a value nor a default exists.
    pub fn apply_defaults(&self, value: Option<&Dynamic>) -> Option<Dynamic> {
        let value = match value {
            None | Some(Dynamic::Null) => return self.default.clone(),
            Some(value) => value,
        };

        match (self.nested_block(), value) {
            (Some(block), Dynamic::List(items)) => Some(Dynamic::List(
                items
                    .iter()
                    .map(|item| apply_block_defaults(block, item))
                    .collect(),
            )),
            _ => Some(value.clone()),
        }
    }

    /// Checks that a value has the shape this schema declares
    pub fn conforms(&self, value: &Dynamic) -> Result<(), Mismatch> {
        match value {
            Dynamic::Null | Dynamic::Unknown => return Ok(()),
            _ => {}
        }

        match self.value_type {
            ValueType::List | ValueType::Set => {
                let items = value.as_list().ok_or_else(|| mismatch(self.value_type, value))?;
                match &self.elem {
                    Some(Elem::Type(elem)) => items
                        .iter()
                        .try_for_each(|item| scalar_conforms(*elem, item)),
                    Some(Elem::Block(block)) => items
                        .iter()
                        .try_for_each(|item| block_conforms(block, item)),
                    None => Ok(()),
                }
            }
            ValueType::Map => {
                let entries = value.as_map().ok_or_else(|| mismatch(self.value_type, value))?;
                match &self.elem {
                    Some(Elem::Type(elem)) => entries
                        .values()
                        .try_for_each(|item| scalar_conforms(*elem, item)),
                    _ => Ok(()),
                }
            }
            scalar => scalar_conforms(scalar, value),
        }
    }

    /// Schema document entry, as printed by the provider binary
    pub fn to_json(&self) -> Value {
        let mut doc = Map::new();
        doc.insert("type".to_string(), json!(self.value_type.to_string()));
        for (flag, set) in [
            ("required", self.required),
            ("optional", self.optional),
            ("computed", self.computed),
            ("force_new", self.force_new),
            ("sensitive", self.sensitive),
        ] {
            if set {
                doc.insert(flag.to_string(), json!(true));
            }
        }
        if !self.description.is_empty() {
            doc.insert("description".to_string(), json!(self.description));
        }
        if let Some(default) = &self.default {
            doc.insert(
                "default".to_string(),
                serde_json::to_value(default).unwrap_or(Value::Null),
            );
        }
        if self.max_items > 0 {
            doc.insert("max_items".to_string(), json!(self.max_items));
        }
        match &self.elem {
            Some(Elem::Type(elem)) => {
                doc.insert("elem".to_string(), json!(elem.to_string()));
            }
            Some(Elem::Block(block)) => {
                doc.insert("block".to_string(), schema_map_to_json(block));
            }
            None => {}
        }
        Value::Object(doc)
    }
}

/// Collects `(name, schema)` pairs into a nested block schema
pub fn block<'a>(fields: impl IntoIterator<Item = (&'a str, Schema)>) -> SchemaMap {
    fields
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect()
}

pub fn schema_map_to_json(schema: &SchemaMap) -> Value {
    Value::Object(
        schema
            .iter()
            .map(|(name, field)| (name.clone(), field.to_json()))
            .collect(),
    )
}

fn apply_block_defaults(block: &SchemaMap, item: &Dynamic) -> Dynamic {
    let Dynamic::Map(entries) = item else {
        return item.clone();
    };

    let mut filled = entries.clone();
    for (name, schema) in block {
        match schema.apply_defaults(entries.get(name)) {
            Some(value) => filled.insert(name.clone(), value),
            None => filled.remove(name),
        };
    }
    Dynamic::Map(filled)
}

fn block_conforms(block: &SchemaMap, item: &Dynamic) -> Result<(), Mismatch> {
    let entries = item.as_map().ok_or_else(|| Mismatch {
        expected: "block".to_string(),
        actual: item.type_name().to_string(),
    })?;

    for (name, value) in entries {
        let schema = block.get(name).ok_or_else(|| Mismatch {
            expected: format!("one of the block attributes, not '{}'", name),
            actual: value.type_name().to_string(),
        })?;
        schema.conforms(value)?;
    }
    Ok(())
}

fn scalar_conforms(expected: ValueType, value: &Dynamic) -> Result<(), Mismatch> {
    let ok = match (expected, value) {
        (_, Dynamic::Null | Dynamic::Unknown) => true,
        (ValueType::String, Dynamic::String(_)) => true,
        (ValueType::Int, v) => v.as_i64().is_some(),
        (ValueType::Float, Dynamic::Number(_)) => true,
        (ValueType::Bool, Dynamic::Bool(_)) => true,
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(mismatch(expected, value))
    }
}

fn mismatch(expected: ValueType, value: &Dynamic) -> Mismatch {
    Mismatch {
        expected: expected.to_string(),
        actual: value.type_name().to_string(),
    }
}

/// SchemaBuilder provides a fluent API for building field schemas
pub struct SchemaBuilder {
    schema: Schema,
}

impl SchemaBuilder {
    pub fn new(value_type: ValueType) -> Self {
        Self {
            schema: Schema {
                value_type,
                elem: None,
                description: String::new(),
                required: false,
                optional: false,
                computed: false,
                force_new: false,
                sensitive: false,
                default: None,
                min_items: 0,
                max_items: 0,
                conflicts_with: Vec::new(),
                validators: Vec::new(),
                diff_suppress: None,
            },
        }
    }

    pub fn description(mut self, desc: &str) -> Self {
        self.schema.description = desc.to_string();
        self
    }

    /// Mark as required
    pub fn required(mut self) -> Self {
        self.schema.required = true;
        self.schema.optional = false;
        self
    }

    /// Mark as optional
    pub fn optional(mut self) -> Self {
        self.schema.optional = true;
        self.schema.required = false;
        self
    }

    /// Mark as computed
    pub fn computed(mut self) -> Self {
        self.schema.computed = true;
        self
    }

    /// Changing the value replaces the resource
    pub fn force_new(mut self) -> Self {
        self.schema.force_new = true;
        self
    }

    pub fn sensitive(mut self) -> Self {
        self.schema.sensitive = true;
        self
    }

    pub fn default(mut self, value: impl Into<Dynamic>) -> Self {
        self.schema.default = Some(value.into());
        self
    }

    pub fn elem(mut self, elem: Elem) -> Self {
        self.schema.elem = Some(elem);
        self
    }

    pub fn min_items(mut self, min: usize) -> Self {
        self.schema.min_items = min;
        self
    }

    pub fn max_items(mut self, max: usize) -> Self {
        self.schema.max_items = max;
        self
    }

    pub fn conflicts_with(mut self, fields: &[&str]) -> Self {
        self.schema
            .conflicts_with
            .extend(fields.iter().map(|f| f.to_string()));
        self
    }

    pub fn validator(mut self, validator: impl Validator + 'static) -> Self {
        self.schema.validators.push(Arc::new(validator));
        self
    }

    pub fn diff_suppress(mut self, suppress: DiffSuppressFn) -> Self {
        self.schema.diff_suppress = Some(suppress);
        self
    }

    pub fn build(mut self) -> Schema {
        let (min, max) = (self.schema.min_items, self.schema.max_items);
        if min > 0 || max > 0 {
            self.schema.validators.push(Arc::new(ListLengthValidator {
                min: (min > 0).then_some(min),
                max: (max > 0).then_some(max),
            }));
        }
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ebs_block() -> SchemaMap {
        block([
            ("volume_size", Schema::int().optional().default(-1).build()),
            ("encrypted", Schema::bool().optional().build()),
        ])
    }

    #[test]
    fn builder_creates_required_string() {
        let schema = Schema::string()
            .description("The image to launch")
            .required()
            .build();

        assert_eq!(schema.value_type, ValueType::String);
        assert!(schema.required);
        assert!(!schema.optional);
        assert_eq!(schema.description, "The image to launch");
    }

    #[test]
    fn defaults_fill_nested_blocks() {
        let schema = Schema::block_list(ebs_block()).optional().build();
        let value = Dynamic::List(vec![Dynamic::Map(HashMap::from([(
            "encrypted".to_string(),
            Dynamic::Bool(true),
        )]))]);

        let filled = schema.apply_defaults(Some(&value)).unwrap();
        let item = filled.as_list().unwrap()[0].as_map().unwrap().clone();
        assert_eq!(item.get("volume_size"), Some(&Dynamic::Number(-1.0)));
        assert_eq!(item.get("encrypted"), Some(&Dynamic::Bool(true)));
    }

    #[test]
    fn absent_value_uses_default() {
        let schema = Schema::int().optional().default(-1).build();
        assert_eq!(schema.apply_defaults(None), Some(Dynamic::Number(-1.0)));
        assert_eq!(Schema::string().optional().build().apply_defaults(None), None);
    }

    #[test]
    fn conforms_rejects_wrong_scalar() {
        let schema = Schema::string().optional().build();
        let err = schema.conforms(&Dynamic::Number(1.0)).unwrap_err();
        assert_eq!(err.expected, "string");
        assert_eq!(err.actual, "number");
    }

    #[test]
    fn conforms_rejects_fractional_int() {
        let schema = Schema::int().optional().build();
        assert!(schema.conforms(&Dynamic::Number(1.0)).is_ok());
        assert!(schema.conforms(&Dynamic::Number(1.5)).is_err());
    }

    #[test]
    fn conforms_checks_block_attributes() {
        let schema = Schema::block_list(ebs_block()).optional().build();
        let bad = Dynamic::List(vec![Dynamic::Map(HashMap::from([(
            "iops".to_string(),
            Dynamic::Number(3000.0),
        )]))]);

        assert!(schema.conforms(&bad).is_err());
    }

    #[test]
    fn schema_json_lists_flags_and_block() {
        let schema = Schema::block_list(ebs_block()).optional().max_items(1).build();
        let doc = schema.to_json();

        assert_eq!(doc["type"], "list");
        assert_eq!(doc["optional"], true);
        assert_eq!(doc["max_items"], 1);
        assert_eq!(doc["block"]["volume_size"]["default"], -1);
    }
}
