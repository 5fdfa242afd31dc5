//! spotinst_mrscaler_aws

pub mod scaling_policies;

use crate::sdk::mrscaler::{AvailabilityZone, ConfigurationFile, Configurations, Scaler};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceData,
    ResourceType, Result, Schema, SchemaBuilder, ValueType,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "spotinst_mrscaler_aws";

pub const MRSCALER_AWS: ResourceType = ResourceType("mrscaler_aws");

pub const NAME: FieldName = FieldName("name");
pub const DESCRIPTION: FieldName = FieldName("description");
pub const REGION: FieldName = FieldName("region");
pub const AVAILABILITY_ZONES: FieldName = FieldName("availability_zones");
pub const CONFIGURATIONS_FILE: FieldName = FieldName("configurations_file");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ConfigurationFileBlock {
    bucket: Option<String>,
    key: Option<String>,
}

fn field(name: FieldName, schema: Schema) -> GenericField<Scaler> {
    GenericField::new(MRSCALER_AWS, name, schema)
}

pub fn setup(fields: &mut FieldRegistryBuilder<Scaler>) {
    fields.register(
        field(NAME, Schema::string().required().build())
            .on_read(|scaler, data| data.set(&NAME, scaler.name.cloned().unwrap_or_default()))
            .on_create(|data, scaler| {
                scaler.name = Nullable::from_option(data.get_string(&NAME)?);
                Ok(())
            })
            .on_update(|data, scaler| {
                scaler.name = Nullable::or_null(data.get_string(&NAME)?);
                Ok(())
            }),
    );

    fields.register(
        field(DESCRIPTION, Schema::string().optional().build())
            .on_read(|scaler, data| {
                data.set(&DESCRIPTION, scaler.description.cloned().unwrap_or_default())
            })
            .on_create(|data, scaler| {
                if let Some(description) = data.get_string(&DESCRIPTION)?.filter(|d| !d.is_empty()) {
                    scaler.description = Nullable::Value(description);
                }
                Ok(())
            })
            .on_update(|data, scaler| {
                let description = data.get_string(&DESCRIPTION)?.filter(|d| !d.is_empty());
                scaler.description = Nullable::or_null(description);
                Ok(())
            }),
    );

    fields.register(
        field(REGION, Schema::string().optional().force_new().build())
            .on_read(|scaler, data| data.set(&REGION, scaler.region.cloned().unwrap_or_default()))
            .on_create(|data, scaler| {
                if let Some(region) = data.get_string(&REGION)?.filter(|r| !r.is_empty()) {
                    scaler.region = Nullable::Value(region);
                }
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(REGION.as_str()))),
    );

    fields.register(
        field(
            AVAILABILITY_ZONES,
            Schema::list_of(ValueType::String)
                .optional()
                .force_new()
                .description("Zones as \"name:subnet-id\" pairs or bare zone names")
                .build(),
        )
        .on_read(|scaler, data| {
            let zones = scaler
                .compute
                .value()
                .and_then(|c| c.availability_zones.value())
                .map(|zones| flatten_availability_zones(zones))
                .unwrap_or_default();
            data.set(&AVAILABILITY_ZONES, zones)
        })
        .on_create(|data, scaler| {
            if let Some(zones) = data.get_string_list(&AVAILABILITY_ZONES)? {
                scaler.compute.get_or_insert_default().availability_zones =
                    Nullable::Value(expand_availability_zones(&zones)?);
            }
            Ok(())
        })
        .on_update(|_, _| Err(FieldError::update_not_allowed(AVAILABILITY_ZONES.as_str()))),
    );

    // Registered first as a create-only field
    fields.register(
        field(CONFIGURATIONS_FILE, configurations_file_schema().force_new().build())
            .on_read(read_configurations_file)
            .on_create(create_configurations_file),
    );

    // Same key again: this registration replaces the one above
    fields.register(
        field(CONFIGURATIONS_FILE, configurations_file_schema().build())
            .on_read(read_configurations_file)
            .on_create(create_configurations_file)
            .on_update(|data, scaler| {
                let file = expand_configurations_file(data.decode(&CONFIGURATIONS_FILE)?);
                scaler.compute.get_or_insert_default().configurations =
                    Nullable::Value(Configurations {
                        file: Nullable::or_null(file),
                    });
                Ok(())
            }),
    );
}

pub fn registry() -> FieldRegistry<Scaler> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    scaling_policies::setup(&mut fields);
    fields.build()
}

fn configurations_file_schema() -> SchemaBuilder {
    Schema::block_list(block([
        ("bucket", Schema::string().required().build()),
        ("key", Schema::string().required().build()),
    ]))
    .optional()
    .max_items(1)
}

fn read_configurations_file(scaler: &Scaler, data: &mut ResourceData) -> Result<()> {
    let blocks: Vec<_> = scaler
        .compute
        .value()
        .and_then(|c| c.configurations.value())
        .and_then(|c| c.file.value())
        .map(|file| ConfigurationFileBlock {
            bucket: file.bucket.cloned(),
            key: file.key.cloned(),
        })
        .into_iter()
        .collect();
    data.set_blocks(&CONFIGURATIONS_FILE, blocks)
}

fn create_configurations_file(data: &ResourceData, scaler: &mut Scaler) -> Result<()> {
    if let Some(file) = expand_configurations_file(data.decode(&CONFIGURATIONS_FILE)?) {
        scaler.compute.get_or_insert_default().configurations = Nullable::Value(Configurations {
            file: Nullable::Value(file),
        });
    }
    Ok(())
}

fn expand_configurations_file(
    blocks: Option<Vec<ConfigurationFileBlock>>,
) -> Option<ConfigurationFile> {
    let block = blocks?.into_iter().next()?;
    Some(ConfigurationFile {
        bucket: Nullable::from_option(block.bucket),
        key: Nullable::from_option(block.key),
    })
}

/// Parses `name:subnet-id` pairs; a bare `name` is a zone without a subnet
fn expand_availability_zones(zones: &[String]) -> Result<Vec<AvailabilityZone>> {
    zones
        .iter()
        .map(|zone| {
            let invalid = || {
                FieldError::invalid(format!(
                    "availability zone \"{}\", want name or name:subnet-id",
                    zone
                ))
            };
            let (name, subnet) = match zone.split_once(':') {
                Some((name, subnet)) if !subnet.is_empty() => (name, Some(subnet)),
                Some(_) => return Err(invalid()),
                None => (zone.as_str(), None),
            };
            if name.is_empty() {
                return Err(invalid());
            }
            Ok(AvailabilityZone {
                name: Nullable::Value(name.to_string()),
                subnet_id: Nullable::from_option(subnet.map(str::to_string)),
            })
        })
        .collect()
}

fn flatten_availability_zones(zones: &[AvailabilityZone]) -> Vec<String> {
    zones
        .iter()
        .filter_map(|zone| {
            let name = zone.name.value()?;
            Some(match zone.subnet_id.value() {
                Some(subnet) => format!("{}:{}", name, subnet),
                None => name.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sdk::mrscaler::Compute;
    use commons::Dynamic;
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

    fn file_block(bucket: &str, key: &str) -> Dynamic {
        Dynamic::List(vec![Dynamic::Map(HashMap::from([
            ("bucket".to_string(), Dynamic::from(bucket)),
            ("key".to_string(), Dynamic::from(key)),
        ]))])
    }

    #[test]
    fn second_configurations_file_registration_is_in_effect() {
        let registry = registry();
        let field = registry.get(MRSCALER_AWS, CONFIGURATIONS_FILE).unwrap();
        assert!(!field.schema().force_new);
        assert_eq!(
            registry
                .all_for_resource(MRSCALER_AWS)
                .filter(|f| f.name() == CONFIGURATIONS_FILE)
                .count(),
            1
        );

        let prior = config(&[("configurations_file", file_block("conf", "a.json"))]);
        let planned =
            config(&[("configurations_file", file_block("conf", "b.json"))]).with_prior(&prior);

        let mut scaler = Scaler::default();
        assert!(registry.on_update(&planned, &mut scaler).unwrap());
        let file = scaler
            .compute
            .value()
            .and_then(|c| c.configurations.value())
            .and_then(|c| c.file.value())
            .unwrap();
        assert_eq!(file.key, Nullable::Value("b.json".to_string()));
    }

    #[test]
    fn availability_zones_round_trip() {
        let zones = vec![AvailabilityZone {
            name: Nullable::Value("us-west-2a".to_string()),
            subnet_id: Nullable::Value("subnet-1".to_string()),
        }];
        let scaler = Scaler {
            compute: Nullable::Value(Compute {
                availability_zones: Nullable::Value(zones.clone()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let registry = registry();
        let mut state = ResourceData::new(registry.schema_map());
        registry.on_read(&scaler, &mut state).unwrap();
        assert_eq!(
            state.get_string_list(&AVAILABILITY_ZONES).unwrap(),
            Some(vec!["us-west-2a:subnet-1".to_string()])
        );

        let mut rebuilt = Scaler::default();
        registry.on_create(&state, &mut rebuilt).unwrap();
        assert_eq!(
            rebuilt.compute.value().unwrap().availability_zones,
            Nullable::Value(zones)
        );
    }

    #[test]
    fn zone_without_subnet_round_trips() {
        let zones = vec![AvailabilityZone {
            name: Nullable::Value("us-east-1a".to_string()),
            subnet_id: Nullable::Omitted,
        }];

        let flattened = flatten_availability_zones(&zones);
        assert_eq!(flattened, vec!["us-east-1a".to_string()]);
        assert_eq!(expand_availability_zones(&flattened).unwrap(), zones);
    }

    #[test]
    fn malformed_availability_zone_is_rejected() {
        for zone in ["us-west-2a:", ":subnet-1", ""] {
            let data = config(&[("availability_zones", Dynamic::from(vec![zone]))]);
            let mut scaler = Scaler::default();
            let err = registry().on_create(&data, &mut scaler).unwrap_err();
            assert!(err.to_string().starts_with("invalid availability zone"));
        }
    }

    #[test]
    fn region_and_zones_are_immutable() {
        let registry = registry();
        for name in [REGION, AVAILABILITY_ZONES] {
            let field = registry.get(MRSCALER_AWS, name).unwrap();
            let mut scaler = Scaler::default();
            let err = field.update(&config(&[]), &mut scaler).unwrap_err();
            assert_eq!(err.to_string(), format!("field update not allowed: {}", name));
            assert_eq!(scaler, Scaler::default());
        }
    }
}
