//! spotinst_ocean_aws_launch_spec

use crate::resources::ocean_aws::launch_configuration::{
    block_device_mappings_schema, expand_block_device_mappings, expand_tags, expand_user_data,
    flatten_block_device_mappings, flatten_tags, root_volume_size_schema, tags_schema,
    user_data_schema,
};
use crate::sdk::ocean::aws::LaunchSpec;
use crate::sdk::Nullable;
use commons::sentinel::{none_to_sentinel, value_or_none, UNSET_INT};
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType, Schema,
    ValueType,
};

pub const TYPE_NAME: &str = "spotinst_ocean_aws_launch_spec";

pub const OCEAN_AWS_LAUNCH_SPEC: ResourceType = ResourceType("ocean_aws_launch_spec");

pub const OCEAN_ID: FieldName = FieldName("ocean_id");
pub const NAME: FieldName = FieldName("name");
pub const IMAGE_ID: FieldName = FieldName("image_id");
pub const USER_DATA: FieldName = FieldName("user_data");
pub const SECURITY_GROUPS: FieldName = FieldName("security_groups");
pub const ROOT_VOLUME_SIZE: FieldName = FieldName("root_volume_size");
pub const TAGS: FieldName = FieldName("tags");
pub const BLOCK_DEVICE_MAPPINGS: FieldName = FieldName("block_device_mappings");

fn field(name: FieldName, schema: Schema) -> GenericField<LaunchSpec> {
    GenericField::new(OCEAN_AWS_LAUNCH_SPEC, name, schema)
}

pub fn setup(fields: &mut FieldRegistryBuilder<LaunchSpec>) {
    fields.register(
        field(OCEAN_ID, Schema::string().required().build())
            .on_read(|spec, data| data.set(&OCEAN_ID, spec.ocean_id.cloned().unwrap_or_default()))
            .on_create(|data, spec| {
                spec.ocean_id = Nullable::from_option(data.get_string(&OCEAN_ID)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(OCEAN_ID.as_str()))),
    );

    fields.register(
        field(NAME, Schema::string().optional().build())
            .on_read(|spec, data| data.set(&NAME, spec.name.cloned().unwrap_or_default()))
            .on_create(|data, spec| {
                if let Some(name) = data.get_string(&NAME)?.filter(|n| !n.is_empty()) {
                    spec.name = Nullable::Value(name);
                }
                Ok(())
            })
            .on_update(|data, spec| {
                spec.name = Nullable::or_null(data.get_string(&NAME)?.filter(|n| !n.is_empty()));
                Ok(())
            }),
    );

    // the API leaves image_id out when the spec inherits the cluster image
    fields.register(
        field(IMAGE_ID, Schema::string().required().build())
            .on_read(|spec, data| data.set(&IMAGE_ID, spec.image_id.cloned().unwrap_or_default()))
            .on_create(|data, spec| {
                spec.image_id = Nullable::from_option(data.get_string(&IMAGE_ID)?);
                Ok(())
            })
            .on_update(|data, spec| {
                spec.image_id = Nullable::or_null(data.get_string(&IMAGE_ID)?);
                Ok(())
            }),
    );

    fields.register(
        field(USER_DATA, user_data_schema())
            .on_read(|spec, data| data.set(&USER_DATA, spec.user_data.cloned().unwrap_or_default()))
            .on_create(|data, spec| {
                if let Some(user_data) = expand_user_data(data.get_string(&USER_DATA)?) {
                    spec.user_data = Nullable::Value(user_data);
                }
                Ok(())
            })
            .on_update(|data, spec| {
                spec.user_data = Nullable::or_null(expand_user_data(data.get_string(&USER_DATA)?));
                Ok(())
            }),
    );

    fields.register(
        field(
            SECURITY_GROUPS,
            Schema::list_of(ValueType::String).optional().computed().build(),
        )
        .on_read(|spec, data| {
            match spec.security_group_ids.cloned() {
                Some(groups) => data.set(&SECURITY_GROUPS, groups),
                None => Ok(()),
            }
        })
        .on_create(|data, spec| {
            if let Some(groups) = data.get_string_list(&SECURITY_GROUPS)? {
                spec.security_group_ids = Nullable::Value(groups);
            }
            Ok(())
        })
        .on_update(|_, _| Err(FieldError::update_not_allowed(SECURITY_GROUPS.as_str()))),
    );

    fields.register(
        field(ROOT_VOLUME_SIZE, root_volume_size_schema())
            .on_read(|spec, data| {
                let size = spec.root_volume_size.cloned();
                data.set(&ROOT_VOLUME_SIZE, none_to_sentinel(size, UNSET_INT))
            })
            .on_create(|data, spec| {
                let size = data.get_int(&ROOT_VOLUME_SIZE)?;
                if let Some(size) = size.and_then(|v| value_or_none(v, UNSET_INT)) {
                    spec.root_volume_size = Nullable::Value(size);
                }
                Ok(())
            })
            .on_update(|data, spec| {
                let size = data.get_int(&ROOT_VOLUME_SIZE)?;
                spec.root_volume_size =
                    Nullable::or_null(size.and_then(|v| value_or_none(v, UNSET_INT)));
                Ok(())
            }),
    );

    fields.register(
        field(TAGS, tags_schema())
            .on_read(|spec, data| {
                let tags = spec.tags.value().map(|t| flatten_tags(t)).unwrap_or_default();
                data.set_blocks(&TAGS, tags)
            })
            .on_create(|data, spec| {
                if let Some(tags) = data.decode(&TAGS)? {
                    spec.tags = Nullable::Value(expand_tags(tags)?);
                }
                Ok(())
            })
            .on_update(|data, spec| {
                spec.tags = Nullable::or_null(data.decode(&TAGS)?.map(expand_tags).transpose()?);
                Ok(())
            }),
    );

    fields.register(
        field(BLOCK_DEVICE_MAPPINGS, block_device_mappings_schema())
            .on_read(|spec, data| {
                let mappings = spec
                    .block_device_mappings
                    .value()
                    .map(|m| flatten_block_device_mappings(m))
                    .unwrap_or_default();
                data.set_blocks(&BLOCK_DEVICE_MAPPINGS, mappings)
            })
            .on_create(|data, spec| {
                if let Some(mappings) = data.decode(&BLOCK_DEVICE_MAPPINGS)? {
                    spec.block_device_mappings =
                        Nullable::Value(expand_block_device_mappings(mappings));
                }
                Ok(())
            })
            .on_update(|data, spec| {
                let mappings = data
                    .decode(&BLOCK_DEVICE_MAPPINGS)?
                    .map(expand_block_device_mappings);
                spec.block_device_mappings = Nullable::or_null(mappings);
                Ok(())
            }),
    );
}

pub fn registry() -> FieldRegistry<LaunchSpec> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    fields.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use commons::{Dynamic, ResourceData};
    use std::collections::HashMap;

    fn config(values: &[(&str, Dynamic)]) -> ResourceData {
        ResourceData::with_values(
            registry().schema_map(),
            values
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<HashMap<_, _>>(),
        )
    }

    #[test]
    fn missing_image_id_reads_as_empty_string() {
        let registry = registry();
        let spec = LaunchSpec {
            ocean_id: Nullable::Value("o-1".to_string()),
            ..Default::default()
        };

        let mut state = ResourceData::new(registry.schema_map());
        registry.on_read(&spec, &mut state).unwrap();

        assert_eq!(state.get_string(&IMAGE_ID).unwrap(), Some(String::new()));
        assert_eq!(state.get_int(&ROOT_VOLUME_SIZE).unwrap(), Some(-1));
        assert!(!state.is_set(&SECURITY_GROUPS));
    }

    #[test]
    fn ocean_id_and_security_groups_are_immutable() {
        let registry = registry();
        let prior = config(&[
            ("ocean_id", Dynamic::from("o-1")),
            ("security_groups", Dynamic::from(vec!["sg-1"])),
        ]);

        for (name, value) in [
            (OCEAN_ID, Dynamic::from("o-2")),
            (SECURITY_GROUPS, Dynamic::from(vec!["sg-2"])),
        ] {
            let mut values = prior.state().as_map().cloned().unwrap_or_default();
            values.insert(name.to_string(), value);
            let planned =
                ResourceData::with_values(registry.schema_map(), values).with_prior(&prior);

            let mut spec = LaunchSpec::default();
            let err = registry.on_update(&planned, &mut spec).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("field update not allowed: {}", name)
            );
            assert_eq!(spec, LaunchSpec::default());
        }
    }

    #[test]
    fn omitted_security_groups_keep_the_reported_value() {
        let registry = registry();
        let prior = config(&[
            ("ocean_id", Dynamic::from("o-1")),
            ("security_groups", Dynamic::from(vec!["sg-1"])),
        ]);
        let planned = config(&[("ocean_id", Dynamic::from("o-1"))]).with_prior(&prior);

        let mut spec = LaunchSpec::default();
        assert!(!registry.on_update(&planned, &mut spec).unwrap());
        assert_eq!(spec, LaunchSpec::default());
    }

    #[test]
    fn update_sends_only_changed_fields() {
        let registry = registry();
        let prior = config(&[
            ("ocean_id", Dynamic::from("o-1")),
            ("image_id", Dynamic::from("ami-1")),
            ("root_volume_size", Dynamic::from(30i64)),
        ]);
        let planned = config(&[
            ("ocean_id", Dynamic::from("o-1")),
            ("image_id", Dynamic::from("ami-2")),
        ])
        .with_prior(&prior);

        let mut spec = LaunchSpec::default();
        assert!(registry.on_update(&planned, &mut spec).unwrap());

        assert_eq!(spec.image_id, Nullable::Value("ami-2".to_string()));
        assert!(spec.root_volume_size.is_null());
        assert!(spec.ocean_id.is_omitted());
        assert!(spec.tags.is_omitted());
    }
}
