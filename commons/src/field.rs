//! Field registry
//!
//! A `GenericField<T>` pairs a schema fragment with the callbacks that move
//! one attribute between local state and the API object `T`. Field packages
//! register their fields into a `FieldRegistryBuilder<T>` once at startup;
//! `build` freezes the result into a `FieldRegistry<T>` that the CRUD driver
//! iterates for every operation.

use crate::error::{FieldError, Result};
use crate::resource_data::ResourceData;
use crate::schema::{Schema, SchemaMap};
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Copies a value from the API object into local state
pub type ReadFn<T> = fn(remote: &T, data: &mut ResourceData) -> Result<()>;

/// Copies a value from local state into the API object under construction
pub type WriteFn<T> = fn(data: &ResourceData, remote: &mut T) -> Result<()>;

/// Terraform resource or nested block a field belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceType(pub &'static str);

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// HCL attribute name of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldName(pub &'static str);

impl FieldName {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl Deref for FieldName {
    type Target = str;

    fn deref(&self) -> &str {
        self.0
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

pub struct GenericField<T> {
    affinity: ResourceType,
    name: FieldName,
    schema: Schema,
    on_read: Option<ReadFn<T>>,
    on_create: Option<WriteFn<T>>,
    on_update: Option<WriteFn<T>>,
}

impl<T> GenericField<T> {
    pub fn new(affinity: ResourceType, name: FieldName, schema: Schema) -> Self {
        Self {
            affinity,
            name,
            schema,
            on_read: None,
            on_create: None,
            on_update: None,
        }
    }

    pub fn on_read(mut self, read: ReadFn<T>) -> Self {
        self.on_read = Some(read);
        self
    }

    pub fn on_create(mut self, create: WriteFn<T>) -> Self {
        self.on_create = Some(create);
        self
    }

    pub fn on_update(mut self, update: WriteFn<T>) -> Self {
        self.on_update = Some(update);
        self
    }

    pub fn affinity(&self) -> ResourceType {
        self.affinity
    }

    pub fn name(&self) -> FieldName {
        self.name
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn read(&self, remote: &T, data: &mut ResourceData) -> Result<()> {
        match self.on_read {
            Some(read) => read(remote, data).map_err(|e| match e {
                FieldError::Read { .. } => e,
                other => FieldError::read(self.name.as_str(), other),
            }),
            None => Ok(()),
        }
    }

    pub fn create(&self, data: &ResourceData, remote: &mut T) -> Result<()> {
        match self.on_create {
            Some(create) => create(data, remote),
            None => Ok(()),
        }
    }

    pub fn update(&self, data: &ResourceData, remote: &mut T) -> Result<()> {
        match self.on_update {
            Some(update) => update(data, remote),
            None => Ok(()),
        }
    }
}

impl<T> Clone for GenericField<T> {
    fn clone(&self) -> Self {
        Self {
            affinity: self.affinity,
            name: self.name,
            schema: self.schema.clone(),
            on_read: self.on_read,
            on_create: self.on_create,
            on_update: self.on_update,
        }
    }
}

impl<T> fmt::Debug for GenericField<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenericField")
            .field("affinity", &self.affinity)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .field("on_read", &self.on_read.is_some())
            .field("on_create", &self.on_create.is_some())
            .field("on_update", &self.on_update.is_some())
            .finish()
    }
}

/// Collects field registrations at startup
pub struct FieldRegistryBuilder<T> {
    fields: Vec<GenericField<T>>,
    index: HashMap<(ResourceType, FieldName), usize>,
}

impl<T> Default for FieldRegistryBuilder<T> {
    fn default() -> Self {
        Self {
            fields: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T> FieldRegistryBuilder<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts the field, replacing an earlier registration of the same
    /// (resource type, name) in place. The last registration wins.
    pub fn register(&mut self, field: GenericField<T>) -> &mut Self {
        let key = (field.affinity, field.name);
        match self.index.get(&key) {
            Some(&pos) => {
                tracing::debug!(
                    resource_type = %field.affinity,
                    field = %field.name,
                    "field registered twice, keeping the last registration"
                );
                self.fields[pos] = field;
            }
            None => {
                self.index.insert(key, self.fields.len());
                self.fields.push(field);
            }
        }
        self
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    fn name_collisions(&self) -> Vec<(FieldName, ResourceType, ResourceType)> {
        let mut owners: HashMap<FieldName, ResourceType> = HashMap::new();
        self.fields
            .iter()
            .filter_map(|field| {
                owners
                    .insert(field.name, field.affinity)
                    .map(|first| (field.name, first, field.affinity))
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Freezes the registrations. The schema is keyed by field name alone, so
    /// a name registered under two resource types would collapse into one
    /// attribute; debug builds refuse that.
    pub fn build(self) -> FieldRegistry<T> {
        let collisions = self.name_collisions();
        for (name, first, second) in &collisions {
            tracing::warn!(
                field = %name,
                first = %first,
                second = %second,
                "field name registered under two resource types"
            );
        }
        debug_assert!(
            collisions.is_empty(),
            "field names registered under more than one resource type: {:?}",
            collisions
        );

        let schema = self
            .fields
            .iter()
            .map(|field| (field.name.as_str().to_string(), field.schema.clone()))
            .collect::<SchemaMap>();

        FieldRegistry {
            fields: self.fields,
            index: self.index,
            schema: Arc::new(schema),
        }
    }
}

/// Immutable registry of one Terraform resource's fields
pub struct FieldRegistry<T> {
    fields: Vec<GenericField<T>>,
    index: HashMap<(ResourceType, FieldName), usize>,
    schema: Arc<SchemaMap>,
}

impl<T> FieldRegistry<T> {
    pub fn builder() -> FieldRegistryBuilder<T> {
        FieldRegistryBuilder::new()
    }

    pub fn get(&self, resource_type: ResourceType, name: FieldName) -> Option<&GenericField<T>> {
        self.index
            .get(&(resource_type, name))
            .map(|&pos| &self.fields[pos])
    }

    /// Fields of one resource type, in registration order
    pub fn all_for_resource(
        &self,
        resource_type: ResourceType,
    ) -> impl Iterator<Item = &GenericField<T>> {
        self.fields
            .iter()
            .filter(move |field| field.affinity == resource_type)
    }

    /// All fields, in registration order
    pub fn fields(&self) -> &[GenericField<T>] {
        &self.fields
    }

    /// Merged schema of every registered field
    pub fn schema_map(&self) -> Arc<SchemaMap> {
        Arc::clone(&self.schema)
    }

    /// Runs every read callback against the API object
    pub fn on_read(&self, remote: &T, data: &mut ResourceData) -> Result<()> {
        self.fields
            .iter()
            .try_for_each(|field| field.read(remote, data))
    }

    /// Runs every create callback to build the API object
    pub fn on_create(&self, data: &ResourceData, remote: &mut T) -> Result<()> {
        for field in &self.fields {
            field.create(data, remote).inspect_err(|e| {
                tracing::debug!(field = %field.name, error = %e, "create callback failed");
            })?;
        }
        Ok(())
    }

    /// Runs the update callbacks of changed fields only. Returns whether
    /// any field changed.
    pub fn on_update(&self, data: &ResourceData, remote: &mut T) -> Result<bool> {
        let mut changed = false;
        for field in &self.fields {
            if field.on_update.is_none() || !data.has_change(field.name.as_str()) {
                continue;
            }
            tracing::debug!(field = %field.name, "field changed");
            field.update(data, remote).inspect_err(|e| {
                tracing::debug!(field = %field.name, error = %e, "update callback failed");
            })?;
            changed = true;
        }
        Ok(changed)
    }
}

impl<T> fmt::Debug for FieldRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRegistry")
            .field("fields", &self.fields)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Dynamic;

    const WIDGET: ResourceType = ResourceType("widget");
    const WIDGET_DISK: ResourceType = ResourceType("widget_disk");

    const NAME: FieldName = FieldName("name");
    const REGION: FieldName = FieldName("region");
    const DISK_SIZE: FieldName = FieldName("disk_size");

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Widget {
        name: Option<String>,
        region: Option<String>,
        disk_size: Option<i64>,
    }

    fn field(affinity: ResourceType, name: FieldName, schema: Schema) -> GenericField<Widget> {
        GenericField::new(affinity, name, schema)
    }

    fn name_field() -> GenericField<Widget> {
        field(WIDGET, NAME, Schema::string().required().build())
            .on_read(|widget, data| data.set("name", widget.name.clone().unwrap_or_default()))
            .on_create(|data, widget| {
                widget.name = data.get_string("name")?;
                Ok(())
            })
            .on_update(|data, widget| {
                widget.name = data.get_string("name")?;
                Ok(())
            })
    }

    fn region_field() -> GenericField<Widget> {
        field(WIDGET, REGION, Schema::string().required().build())
            .on_read(|widget, data| data.set("region", widget.region.clone().unwrap_or_default()))
            .on_create(|data, widget| {
                widget.region = data.get_string("region")?;
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed("region")))
    }

    fn disk_field() -> GenericField<Widget> {
        field(WIDGET_DISK, DISK_SIZE, Schema::int().optional().default(-1).build())
            .on_read(|widget, data| data.set("disk_size", widget.disk_size.unwrap_or(-1)))
            .on_create(|data, widget| {
                widget.disk_size = data.get_int("disk_size")?.filter(|size| *size != -1);
                Ok(())
            })
    }

    fn registry() -> FieldRegistry<Widget> {
        let mut builder = FieldRegistry::builder();
        builder
            .register(name_field())
            .register(region_field())
            .register(disk_field());
        builder.build()
    }

    fn config(values: &[(&str, Dynamic)]) -> ResourceData {
        ResourceData::with_values(
            registry().schema_map(),
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn get_finds_registered_field() {
        let registry = registry();
        let found = registry.get(WIDGET, NAME).unwrap();
        assert_eq!(found.name(), NAME);
        assert!(registry.get(WIDGET_DISK, NAME).is_none());
    }

    #[test]
    fn all_for_resource_filters_by_affinity() {
        let registry = registry();
        let names: Vec<_> = registry
            .all_for_resource(WIDGET)
            .map(|f| f.name().as_str())
            .collect();
        assert_eq!(names, vec!["name", "region"]);
        assert_eq!(registry.all_for_resource(WIDGET_DISK).count(), 1);
    }

    #[test]
    fn last_registration_wins() {
        let mut builder = FieldRegistry::builder();
        builder.register(name_field()).register(disk_field());
        builder.register(
            field(WIDGET, NAME, Schema::string().optional().build()).on_create(|_, widget| {
                widget.name = Some("second".to_string());
                Ok(())
            }),
        );
        let registry = builder.build();

        assert_eq!(registry.fields().len(), 2);
        // replaced in place, so ordering is unchanged
        assert_eq!(registry.fields()[0].name(), NAME);
        assert!(registry.get(WIDGET, NAME).unwrap().schema().optional);

        let mut widget = Widget::default();
        registry
            .on_create(&ResourceData::new(registry.schema_map()), &mut widget)
            .unwrap();
        assert_eq!(widget.name.as_deref(), Some("second"));
    }

    #[test]
    fn schema_map_merges_fragments() {
        let schema = registry().schema_map();
        assert_eq!(schema.len(), 3);
        assert!(schema["region"].required);
    }

    #[test]
    fn create_applies_sentinel_translation() {
        let registry = registry();
        let data = config(&[
            ("name", Dynamic::from("w1")),
            ("region", Dynamic::from("us-east-1")),
        ]);

        let mut widget = Widget::default();
        registry.on_create(&data, &mut widget).unwrap();

        assert_eq!(widget.name.as_deref(), Some("w1"));
        assert_eq!(widget.disk_size, None);
    }

    #[test]
    fn read_populates_state() {
        let registry = registry();
        let widget = Widget {
            name: Some("w1".to_string()),
            region: None,
            disk_size: None,
        };

        let mut data = ResourceData::new(registry.schema_map());
        registry.on_read(&widget, &mut data).unwrap();

        assert_eq!(data.get_string("name").unwrap().as_deref(), Some("w1"));
        assert_eq!(data.get_string("region").unwrap().as_deref(), Some(""));
        assert_eq!(data.get_int("disk_size").unwrap(), Some(-1));
    }

    #[test]
    fn read_errors_name_the_field() {
        let mut builder = FieldRegistry::builder();
        builder.register(
            field(WIDGET, NAME, Schema::string().optional().build())
                .on_read(|_, data| data.set("name", 5i64)),
        );
        let registry = builder.build();

        let mut data = ResourceData::new(registry.schema_map());
        let err = registry.on_read(&Widget::default(), &mut data).unwrap_err();
        assert!(err
            .to_string()
            .starts_with("failed to read field name: type mismatch"));
    }

    #[test]
    fn update_only_runs_changed_fields() {
        let registry = registry();
        let prior = config(&[
            ("name", Dynamic::from("w1")),
            ("region", Dynamic::from("us-east-1")),
        ]);
        let planned = config(&[
            ("name", Dynamic::from("w2")),
            ("region", Dynamic::from("us-east-1")),
        ])
        .with_prior(&prior);

        let mut widget = Widget::default();
        let changed = registry.on_update(&planned, &mut widget).unwrap();

        assert!(changed);
        assert_eq!(widget.name.as_deref(), Some("w2"));
        assert_eq!(widget.region, None);
    }

    #[test]
    fn unchanged_update_is_a_no_op() {
        let registry = registry();
        let prior = config(&[("name", Dynamic::from("w1"))]);
        let planned = config(&[("name", Dynamic::from("w1"))]).with_prior(&prior);

        let mut widget = Widget::default();
        assert!(!registry.on_update(&planned, &mut widget).unwrap());
        assert_eq!(widget, Widget::default());
    }

    #[test]
    fn immutable_field_rejects_update_without_mutation() {
        let registry = registry();
        let prior = config(&[("region", Dynamic::from("us-east-1"))]);
        let planned = config(&[("region", Dynamic::from("eu-west-1"))]).with_prior(&prior);

        let original = Widget {
            name: Some("w1".to_string()),
            region: Some("us-east-1".to_string()),
            disk_size: Some(20),
        };
        let mut widget = original.clone();
        let err = registry.on_update(&planned, &mut widget).unwrap_err();

        assert!(matches!(err, FieldError::UpdateNotAllowed(_)));
        assert_eq!(widget, original);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "registered under more than one resource type")]
    fn same_name_under_two_resource_types_is_refused() {
        let mut builder = FieldRegistry::builder();
        builder
            .register(name_field())
            .register(field(WIDGET_DISK, NAME, Schema::string().optional().build()));
        builder.build();
    }

    #[test]
    fn distinct_names_across_resource_types_have_no_collisions() {
        let mut builder = FieldRegistry::builder();
        builder.register(name_field()).register(disk_field());
        assert!(builder.name_collisions().is_empty());

        builder.register(field(WIDGET_DISK, NAME, Schema::string().optional().build()));
        assert_eq!(builder.name_collisions(), vec![(NAME, WIDGET, WIDGET_DISK)]);
    }
}
