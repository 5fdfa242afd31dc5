//! spotinst_ocean_aws

pub mod launch_configuration;

use crate::sdk::ocean::aws::{Capacity, Cluster};
use crate::sdk::Nullable;
use commons::sentinel::{none_to_sentinel, value_or_none, UNSET_INT};
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType, Schema,
    ValueType,
};

pub const TYPE_NAME: &str = "spotinst_ocean_aws";

pub const OCEAN_AWS: ResourceType = ResourceType("ocean_aws");

pub const NAME: FieldName = FieldName("name");
pub const CONTROLLER_ID: FieldName = FieldName("controller_id");
pub const REGION: FieldName = FieldName("region");
pub const SUBNET_IDS: FieldName = FieldName("subnet_ids");
pub const MAX_SIZE: FieldName = FieldName("max_size");
pub const MIN_SIZE: FieldName = FieldName("min_size");
pub const DESIRED_CAPACITY: FieldName = FieldName("desired_capacity");

fn field(name: FieldName, schema: Schema) -> GenericField<Cluster> {
    GenericField::new(OCEAN_AWS, name, schema)
}

fn capacity(cluster: &mut Cluster) -> &mut Capacity {
    cluster.capacity.get_or_insert_default()
}

fn remote_capacity(cluster: &Cluster) -> Option<&Capacity> {
    cluster.capacity.value()
}

pub fn setup(fields: &mut FieldRegistryBuilder<Cluster>) {
    fields.register(
        field(NAME, Schema::string().required().build())
            .on_read(|cluster, data| data.set(&NAME, cluster.name.cloned().unwrap_or_default()))
            .on_create(|data, cluster| {
                cluster.name = Nullable::from_option(data.get_string(&NAME)?);
                Ok(())
            })
            .on_update(|data, cluster| {
                cluster.name = Nullable::or_null(data.get_string(&NAME)?);
                Ok(())
            }),
    );

    fields.register(
        field(CONTROLLER_ID, Schema::string().required().build())
            .on_read(|cluster, data| {
                data.set(
                    &CONTROLLER_ID,
                    cluster.controller_cluster_id.cloned().unwrap_or_default(),
                )
            })
            .on_create(|data, cluster| {
                cluster.controller_cluster_id =
                    Nullable::from_option(data.get_string(&CONTROLLER_ID)?);
                Ok(())
            })
            .on_update(|data, cluster| {
                cluster.controller_cluster_id =
                    Nullable::or_null(data.get_string(&CONTROLLER_ID)?);
                Ok(())
            }),
    );

    fields.register(
        field(REGION, Schema::string().required().force_new().build())
            .on_read(|cluster, data| {
                data.set(&REGION, cluster.region.cloned().unwrap_or_default())
            })
            .on_create(|data, cluster| {
                cluster.region = Nullable::from_option(data.get_string(&REGION)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(REGION.as_str()))),
    );

    fields.register(
        field(SUBNET_IDS, Schema::list_of(ValueType::String).required().build())
            .on_read(|cluster, data| {
                let subnets = cluster
                    .compute
                    .value()
                    .and_then(|c| c.subnet_ids.cloned())
                    .unwrap_or_default();
                data.set(&SUBNET_IDS, subnets)
            })
            .on_create(|data, cluster| {
                if let Some(subnets) = data.get_string_list(&SUBNET_IDS)? {
                    cluster.compute.get_or_insert_default().subnet_ids = Nullable::Value(subnets);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let subnets = data.get_string_list(&SUBNET_IDS)?;
                cluster.compute.get_or_insert_default().subnet_ids = Nullable::or_null(subnets);
                Ok(())
            }),
    );

    fields.register(
        field(MAX_SIZE, Schema::int().optional().default(UNSET_INT).build())
            .on_read(|cluster, data| {
                let value = remote_capacity(cluster).and_then(|c| c.maximum.cloned());
                data.set(&MAX_SIZE, none_to_sentinel(value, UNSET_INT))
            })
            .on_create(|data, cluster| {
                let value = data.get_int(&MAX_SIZE)?;
                if let Some(max) = value.and_then(|v| value_or_none(v, UNSET_INT)) {
                    capacity(cluster).maximum = Nullable::Value(max);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let value = data.get_int(&MAX_SIZE)?;
                capacity(cluster).maximum =
                    Nullable::or_null(value.and_then(|v| value_or_none(v, UNSET_INT)));
                Ok(())
            }),
    );

    fields.register(
        field(MIN_SIZE, Schema::int().optional().default(UNSET_INT).build())
            .on_read(|cluster, data| {
                let value = remote_capacity(cluster).and_then(|c| c.minimum.cloned());
                data.set(&MIN_SIZE, none_to_sentinel(value, UNSET_INT))
            })
            .on_create(|data, cluster| {
                let value = data.get_int(&MIN_SIZE)?;
                if let Some(min) = value.and_then(|v| value_or_none(v, UNSET_INT)) {
                    capacity(cluster).minimum = Nullable::Value(min);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let value = data.get_int(&MIN_SIZE)?;
                capacity(cluster).minimum =
                    Nullable::or_null(value.and_then(|v| value_or_none(v, UNSET_INT)));
                Ok(())
            }),
    );

    fields.register(
        field(DESIRED_CAPACITY, Schema::int().optional().computed().build())
            .on_read(|cluster, data| {
                match remote_capacity(cluster).and_then(|c| c.target.cloned()) {
                    Some(target) => data.set(&DESIRED_CAPACITY, target),
                    None => Ok(()),
                }
            })
            .on_create(|data, cluster| {
                if let Some(target) = data.get_int(&DESIRED_CAPACITY)? {
                    capacity(cluster).target = Nullable::Value(target);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                if let Some(target) = data.get_int(&DESIRED_CAPACITY)? {
                    capacity(cluster).target = Nullable::Value(target);
                }
                Ok(())
            }),
    );
}

pub fn registry() -> FieldRegistry<Cluster> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    launch_configuration::setup(&mut fields);
    fields.build()
}
