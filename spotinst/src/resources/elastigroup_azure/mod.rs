//! spotinst_elastigroup_azure_v3

pub mod strategy;

use crate::sdk::elastigroup::azure::Group;
use crate::sdk::Nullable;
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType, Schema,
};

pub const TYPE_NAME: &str = "spotinst_elastigroup_azure_v3";

pub const ELASTIGROUP_AZURE: ResourceType = ResourceType("elastigroup_azure");

pub const NAME: FieldName = FieldName("name");
pub const DESCRIPTION: FieldName = FieldName("description");
pub const REGION: FieldName = FieldName("region");
pub const RESOURCE_GROUP_NAME: FieldName = FieldName("resource_group_name");

fn field(name: FieldName, schema: Schema) -> GenericField<Group> {
    GenericField::new(ELASTIGROUP_AZURE, name, schema)
}

pub fn setup(fields: &mut FieldRegistryBuilder<Group>) {
    fields.register(
        field(NAME, Schema::string().required().build())
            .on_read(|group, data| data.set(&NAME, group.name.cloned().unwrap_or_default()))
            .on_create(|data, group| {
                group.name = Nullable::from_option(data.get_string(&NAME)?);
                Ok(())
            })
            .on_update(|data, group| {
                group.name = Nullable::or_null(data.get_string(&NAME)?);
                Ok(())
            }),
    );

    fields.register(
        field(DESCRIPTION, Schema::string().optional().build())
            .on_read(|group, data| {
                data.set(&DESCRIPTION, group.description.cloned().unwrap_or_default())
            })
            .on_create(|data, group| {
                if let Some(description) = data.get_string(&DESCRIPTION)?.filter(|d| !d.is_empty()) {
                    group.description = Nullable::Value(description);
                }
                Ok(())
            })
            .on_update(|data, group| {
                let description = data.get_string(&DESCRIPTION)?.filter(|d| !d.is_empty());
                group.description = Nullable::or_null(description);
                Ok(())
            }),
    );

    fields.register(
        field(REGION, Schema::string().required().force_new().build())
            .on_read(|group, data| data.set(&REGION, group.region.cloned().unwrap_or_default()))
            .on_create(|data, group| {
                group.region = Nullable::from_option(data.get_string(&REGION)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(REGION.as_str()))),
    );

    fields.register(
        field(RESOURCE_GROUP_NAME, Schema::string().required().build())
            .on_read(|group, data| {
                data.set(
                    &RESOURCE_GROUP_NAME,
                    group.resource_group_name.cloned().unwrap_or_default(),
                )
            })
            .on_create(|data, group| {
                group.resource_group_name =
                    Nullable::from_option(data.get_string(&RESOURCE_GROUP_NAME)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(RESOURCE_GROUP_NAME.as_str()))),
    );
}

/// All fields of the resource, base fields first
pub fn registry() -> FieldRegistry<Group> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    strategy::setup(&mut fields);
    fields.build()
}
