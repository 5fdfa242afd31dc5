//! Launch configuration of an Ocean AWS cluster
//!
//! The tag, block device mapping and user data helpers here are shared with
//! launch specs, which carry the same blocks.

use crate::sdk::ocean::aws::{
    BlockDeviceMapping, Cluster, DynamicVolumeSize, Ebs, IamInstanceProfile,
    InstanceMetadataOptions, LaunchSpecification, Tag,
};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::sentinel::{none_to_sentinel, value_or_none, NULL_HOP_LIMIT, UNSET_INT};
use commons::userdata::{normalize_to_base64, suppress_user_data_diff};
use commons::validator::OneOfValidator;
use commons::{
    FieldError, FieldName, FieldRegistryBuilder, GenericField, ResourceType, Result, Schema,
    ValueType,
};
use serde::{Deserialize, Serialize};

pub const OCEAN_AWS_LAUNCH_CONFIGURATION: ResourceType =
    ResourceType("ocean_aws_launch_configuration");

pub const IMAGE_ID: FieldName = FieldName("image_id");
pub const USER_DATA: FieldName = FieldName("user_data");
pub const SECURITY_GROUPS: FieldName = FieldName("security_groups");
pub const IAM_INSTANCE_PROFILE: FieldName = FieldName("iam_instance_profile");
pub const KEY_NAME: FieldName = FieldName("key_name");
pub const ASSOCIATE_PUBLIC_IP_ADDRESS: FieldName = FieldName("associate_public_ip_address");
pub const MONITORING: FieldName = FieldName("monitoring");
pub const EBS_OPTIMIZED: FieldName = FieldName("ebs_optimized");
pub const USE_AS_TEMPLATE_ONLY: FieldName = FieldName("use_as_template_only");
pub const ROOT_VOLUME_SIZE: FieldName = FieldName("root_volume_size");
pub const INSTANCE_METADATA_OPTIONS: FieldName = FieldName("instance_metadata_options");
pub const TAGS: FieldName = FieldName("tags");
pub const BLOCK_DEVICE_MAPPINGS: FieldName = FieldName("block_device_mappings");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct TagBlock {
    key: Option<String>,
    value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct InstanceMetadataOptionsBlock {
    http_tokens: Option<String>,
    http_put_response_hop_limit: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct BlockDeviceMappingBlock {
    device_name: Option<String>,
    ebs: Option<Vec<EbsBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct EbsBlock {
    delete_on_termination: Option<bool>,
    encrypted: Option<bool>,
    iops: Option<i64>,
    kms_key_id: Option<String>,
    snapshot_id: Option<String>,
    volume_type: Option<String>,
    volume_size: Option<i64>,
    throughput: Option<i64>,
    dynamic_volume_size: Option<Vec<DynamicVolumeSizeBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DynamicVolumeSizeBlock {
    base_size: Option<i64>,
    resource: Option<String>,
    size_per_resource_unit: Option<i64>,
}

fn field(name: FieldName, schema: Schema) -> GenericField<Cluster> {
    GenericField::new(OCEAN_AWS_LAUNCH_CONFIGURATION, name, schema)
}

fn launch_spec(cluster: &mut Cluster) -> &mut LaunchSpecification {
    cluster
        .compute
        .get_or_insert_default()
        .launch_specification
        .get_or_insert_default()
}

fn remote_launch_spec(cluster: &Cluster) -> Option<&LaunchSpecification> {
    cluster
        .compute
        .value()
        .and_then(|c| c.launch_specification.value())
}

pub fn setup(fields: &mut FieldRegistryBuilder<Cluster>) {
    fields.register(
        field(IMAGE_ID, Schema::string().required().build())
            .on_read(|cluster, data| {
                let image = remote_launch_spec(cluster).and_then(|ls| ls.image_id.cloned());
                data.set(&IMAGE_ID, image.unwrap_or_default())
            })
            .on_create(|data, cluster| {
                if let Some(image) = data.get_string(&IMAGE_ID)? {
                    launch_spec(cluster).image_id = Nullable::Value(image);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                launch_spec(cluster).image_id = Nullable::or_null(data.get_string(&IMAGE_ID)?);
                Ok(())
            }),
    );

    fields.register(
        field(USER_DATA, user_data_schema())
            .on_read(|cluster, data| {
                let user_data = remote_launch_spec(cluster).and_then(|ls| ls.user_data.cloned());
                data.set(&USER_DATA, user_data.unwrap_or_default())
            })
            .on_create(|data, cluster| {
                if let Some(user_data) = expand_user_data(data.get_string(&USER_DATA)?) {
                    launch_spec(cluster).user_data = Nullable::Value(user_data);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                launch_spec(cluster).user_data =
                    Nullable::or_null(expand_user_data(data.get_string(&USER_DATA)?));
                Ok(())
            }),
    );

    fields.register(
        field(
            SECURITY_GROUPS,
            Schema::list_of(ValueType::String).required().build(),
        )
        .on_read(|cluster, data| {
            let groups = remote_launch_spec(cluster)
                .and_then(|ls| ls.security_group_ids.cloned())
                .unwrap_or_default();
            data.set(&SECURITY_GROUPS, groups)
        })
        .on_create(|data, cluster| {
            if let Some(groups) = data.get_string_list(&SECURITY_GROUPS)? {
                launch_spec(cluster).security_group_ids = Nullable::Value(groups);
            }
            Ok(())
        })
        .on_update(|data, cluster| {
            launch_spec(cluster).security_group_ids =
                Nullable::or_null(data.get_string_list(&SECURITY_GROUPS)?);
            Ok(())
        }),
    );

    fields.register(
        field(IAM_INSTANCE_PROFILE, Schema::string().optional().build())
            .on_read(|cluster, data| {
                let profile = remote_launch_spec(cluster)
                    .and_then(|ls| ls.iam_instance_profile.value())
                    .and_then(|p| p.arn.cloned().or_else(|| p.name.cloned()));
                data.set(&IAM_INSTANCE_PROFILE, profile.unwrap_or_default())
            })
            .on_create(|data, cluster| {
                if let Some(profile) = expand_iam_instance_profile(data.get_string(&IAM_INSTANCE_PROFILE)?) {
                    launch_spec(cluster).iam_instance_profile = Nullable::Value(profile);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                launch_spec(cluster).iam_instance_profile = Nullable::or_null(
                    expand_iam_instance_profile(data.get_string(&IAM_INSTANCE_PROFILE)?),
                );
                Ok(())
            }),
    );

    fields.register(
        field(KEY_NAME, Schema::string().optional().build())
            .on_read(|cluster, data| {
                let key = remote_launch_spec(cluster).and_then(|ls| ls.key_pair.cloned());
                data.set(&KEY_NAME, key.unwrap_or_default())
            })
            .on_create(|data, cluster| {
                if let Some(key) = data.get_string(&KEY_NAME)?.filter(|k| !k.is_empty()) {
                    launch_spec(cluster).key_pair = Nullable::Value(key);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let key = data.get_string(&KEY_NAME)?.filter(|k| !k.is_empty());
                launch_spec(cluster).key_pair = Nullable::or_null(key);
                Ok(())
            }),
    );

    fields.register(
        field(
            ASSOCIATE_PUBLIC_IP_ADDRESS,
            Schema::bool().optional().default(false).build(),
        )
        .on_read(|cluster, data| {
            let value = remote_launch_spec(cluster)
                .and_then(|ls| ls.associate_public_ip_address.cloned());
            data.set(&ASSOCIATE_PUBLIC_IP_ADDRESS, value.unwrap_or(false))
        })
        .on_create(|data, cluster| {
            if let Some(value) = data.get_bool(&ASSOCIATE_PUBLIC_IP_ADDRESS)? {
                launch_spec(cluster).associate_public_ip_address = Nullable::Value(value);
            }
            Ok(())
        })
        .on_update(|data, cluster| {
            launch_spec(cluster).associate_public_ip_address =
                Nullable::or_null(data.get_bool(&ASSOCIATE_PUBLIC_IP_ADDRESS)?);
            Ok(())
        }),
    );

    fields.register(
        field(MONITORING, Schema::bool().optional().build())
            .on_read(|cluster, data| {
                let value = remote_launch_spec(cluster).and_then(|ls| ls.monitoring.cloned());
                data.set(&MONITORING, value.unwrap_or(false))
            })
            .on_create(|data, cluster| {
                if let Some(value) = data.get_bool(&MONITORING)? {
                    launch_spec(cluster).monitoring = Nullable::Value(value);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                launch_spec(cluster).monitoring = Nullable::or_null(data.get_bool(&MONITORING)?);
                Ok(())
            }),
    );

    fields.register(
        field(EBS_OPTIMIZED, Schema::bool().optional().computed().build())
            .on_read(|cluster, data| {
                match remote_launch_spec(cluster).and_then(|ls| ls.ebs_optimized.cloned()) {
                    Some(value) => data.set(&EBS_OPTIMIZED, value),
                    None => Ok(()),
                }
            })
            .on_create(|data, cluster| {
                if let Some(value) = data.get_bool(&EBS_OPTIMIZED)? {
                    launch_spec(cluster).ebs_optimized = Nullable::Value(value);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                if let Some(value) = data.get_bool(&EBS_OPTIMIZED)? {
                    launch_spec(cluster).ebs_optimized = Nullable::Value(value);
                }
                Ok(())
            }),
    );

    fields.register(
        field(USE_AS_TEMPLATE_ONLY, Schema::bool().optional().build())
            .on_read(|cluster, data| {
                let value =
                    remote_launch_spec(cluster).and_then(|ls| ls.use_as_template_only.cloned());
                data.set(&USE_AS_TEMPLATE_ONLY, value.unwrap_or(false))
            })
            .on_create(|data, cluster| {
                if let Some(value) = data.get_bool(&USE_AS_TEMPLATE_ONLY)? {
                    launch_spec(cluster).use_as_template_only = Nullable::Value(value);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                launch_spec(cluster).use_as_template_only =
                    Nullable::or_null(data.get_bool(&USE_AS_TEMPLATE_ONLY)?);
                Ok(())
            }),
    );

    fields.register(
        field(ROOT_VOLUME_SIZE, root_volume_size_schema())
            .on_read(|cluster, data| {
                let size = remote_launch_spec(cluster).and_then(|ls| ls.root_volume_size.cloned());
                data.set(&ROOT_VOLUME_SIZE, none_to_sentinel(size, UNSET_INT))
            })
            .on_create(|data, cluster| {
                let size = data.get_int(&ROOT_VOLUME_SIZE)?;
                if let Some(size) = size.and_then(|v| value_or_none(v, UNSET_INT)) {
                    launch_spec(cluster).root_volume_size = Nullable::Value(size);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let size = data.get_int(&ROOT_VOLUME_SIZE)?;
                launch_spec(cluster).root_volume_size =
                    Nullable::or_null(size.and_then(|v| value_or_none(v, UNSET_INT)));
                Ok(())
            }),
    );

    fields.register(
        field(
            INSTANCE_METADATA_OPTIONS,
            Schema::block_list(block([
                (
                    "http_tokens",
                    Schema::string()
                        .required()
                        .validator(OneOfValidator::new(&["optional", "required"]))
                        .build(),
                ),
                (
                    "http_put_response_hop_limit",
                    Schema::int().optional().default(NULL_HOP_LIMIT).build(),
                ),
            ]))
            .optional()
            .max_items(1)
            .build(),
        )
        .on_read(|cluster, data| {
            let blocks: Vec<_> = remote_launch_spec(cluster)
                .and_then(|ls| ls.instance_metadata_options.value())
                .map(flatten_instance_metadata_options)
                .into_iter()
                .collect();
            data.set_blocks(&INSTANCE_METADATA_OPTIONS, blocks)
        })
        .on_create(|data, cluster| {
            if let Some(options) =
                expand_instance_metadata_options(data.decode(&INSTANCE_METADATA_OPTIONS)?)
            {
                launch_spec(cluster).instance_metadata_options = Nullable::Value(options);
            }
            Ok(())
        })
        .on_update(|data, cluster| {
            let options = expand_instance_metadata_options(data.decode(&INSTANCE_METADATA_OPTIONS)?);
            launch_spec(cluster).instance_metadata_options = Nullable::or_null(options);
            Ok(())
        }),
    );

    fields.register(
        field(TAGS, tags_schema())
            .on_read(|cluster, data| {
                let tags = remote_launch_spec(cluster)
                    .and_then(|ls| ls.tags.value())
                    .map(|tags| flatten_tags(tags))
                    .unwrap_or_default();
                data.set_blocks(&TAGS, tags)
            })
            .on_create(|data, cluster| {
                if let Some(tags) = data.decode(&TAGS)? {
                    launch_spec(cluster).tags = Nullable::Value(expand_tags(tags)?);
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let tags = data.decode(&TAGS)?.map(expand_tags).transpose()?;
                launch_spec(cluster).tags = Nullable::or_null(tags);
                Ok(())
            }),
    );

    fields.register(
        field(BLOCK_DEVICE_MAPPINGS, block_device_mappings_schema())
            .on_read(|cluster, data| {
                let mappings = remote_launch_spec(cluster)
                    .and_then(|ls| ls.block_device_mappings.value())
                    .map(|m| flatten_block_device_mappings(m))
                    .unwrap_or_default();
                data.set_blocks(&BLOCK_DEVICE_MAPPINGS, mappings)
            })
            .on_create(|data, cluster| {
                if let Some(mappings) = data.decode(&BLOCK_DEVICE_MAPPINGS)? {
                    launch_spec(cluster).block_device_mappings =
                        Nullable::Value(expand_block_device_mappings(mappings));
                }
                Ok(())
            })
            .on_update(|data, cluster| {
                let mappings = data
                    .decode(&BLOCK_DEVICE_MAPPINGS)?
                    .map(expand_block_device_mappings);
                launch_spec(cluster).block_device_mappings = Nullable::or_null(mappings);
                Ok(())
            }),
    );
}

pub(crate) fn user_data_schema() -> Schema {
    Schema::string()
        .optional()
        .diff_suppress(suppress_user_data_diff)
        .build()
}

pub(crate) fn root_volume_size_schema() -> Schema {
    Schema::int().optional().default(UNSET_INT).build()
}

/// Empty user data is left out; anything else goes out as base64
pub(crate) fn expand_user_data(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.is_empty())
        .map(|s| normalize_to_base64(&s))
}

fn expand_iam_instance_profile(raw: Option<String>) -> Option<IamInstanceProfile> {
    let raw = raw.filter(|s| !s.is_empty())?;
    let mut profile = IamInstanceProfile::default();
    if raw.starts_with("arn:") {
        profile.arn = Nullable::Value(raw);
    } else {
        profile.name = Nullable::Value(raw);
    }
    Some(profile)
}

fn expand_instance_metadata_options(
    blocks: Option<Vec<InstanceMetadataOptionsBlock>>,
) -> Option<InstanceMetadataOptions> {
    let block = blocks?.into_iter().next()?;
    Some(InstanceMetadataOptions {
        http_tokens: Nullable::from_option(block.http_tokens),
        http_put_response_hop_limit: Nullable::or_null(
            block
                .http_put_response_hop_limit
                .and_then(|limit| value_or_none(limit, NULL_HOP_LIMIT)),
        ),
    })
}

fn flatten_instance_metadata_options(
    options: &InstanceMetadataOptions,
) -> InstanceMetadataOptionsBlock {
    InstanceMetadataOptionsBlock {
        http_tokens: options.http_tokens.cloned(),
        http_put_response_hop_limit: Some(none_to_sentinel(
            options.http_put_response_hop_limit.cloned(),
            NULL_HOP_LIMIT,
        )),
    }
}

pub(crate) fn tags_schema() -> Schema {
    Schema::block_set(block([
        ("key", Schema::string().required().build()),
        ("value", Schema::string().optional().build()),
    ]))
    .optional()
    .build()
}

pub(crate) fn expand_tags(blocks: Vec<TagBlock>) -> Result<Vec<Tag>> {
    blocks
        .into_iter()
        .map(|block| {
            let key = block
                .key
                .filter(|k| !k.is_empty())
                .ok_or_else(|| FieldError::invalid("tag attributes: key missing"))?;
            Ok(Tag {
                tag_key: Nullable::Value(key),
                tag_value: Nullable::from_option(block.value),
            })
        })
        .collect()
}

pub(crate) fn flatten_tags(tags: &[Tag]) -> Vec<TagBlock> {
    tags.iter()
        .map(|tag| TagBlock {
            key: tag.tag_key.cloned(),
            value: tag.tag_value.cloned(),
        })
        .collect()
}

pub(crate) fn block_device_mappings_schema() -> Schema {
    let dynamic_volume_size = block([
        ("base_size", Schema::int().required().build()),
        ("resource", Schema::string().required().build()),
        ("size_per_resource_unit", Schema::int().required().build()),
    ]);

    let ebs = block([
        ("delete_on_termination", Schema::bool().optional().computed().build()),
        ("encrypted", Schema::bool().optional().computed().build()),
        ("iops", Schema::int().optional().build()),
        ("kms_key_id", Schema::string().optional().build()),
        ("snapshot_id", Schema::string().optional().build()),
        ("volume_type", Schema::string().optional().build()),
        ("volume_size", Schema::int().optional().build()),
        ("throughput", Schema::int().optional().build()),
        (
            "dynamic_volume_size",
            Schema::block_list(dynamic_volume_size)
                .optional()
                .max_items(1)
                .build(),
        ),
    ]);

    Schema::block_list(block([
        ("device_name", Schema::string().required().build()),
        ("ebs", Schema::block_list(ebs).optional().max_items(1).build()),
    ]))
    .optional()
    .build()
}

pub(crate) fn expand_block_device_mappings(
    blocks: Vec<BlockDeviceMappingBlock>,
) -> Vec<BlockDeviceMapping> {
    blocks
        .into_iter()
        .map(|block| BlockDeviceMapping {
            device_name: Nullable::from_option(block.device_name.filter(|d| !d.is_empty())),
            ebs: Nullable::from_option(
                block
                    .ebs
                    .and_then(|ebs| ebs.into_iter().next())
                    .map(expand_ebs),
            ),
        })
        .collect()
}

fn expand_ebs(block: EbsBlock) -> Ebs {
    let positive = |v: Option<i64>| v.filter(|n| *n > 0);
    let non_empty = |v: Option<String>| v.filter(|s| !s.is_empty());

    Ebs {
        delete_on_termination: Nullable::from_option(block.delete_on_termination),
        encrypted: Nullable::from_option(block.encrypted),
        iops: Nullable::from_option(positive(block.iops)),
        kms_key_id: Nullable::from_option(non_empty(block.kms_key_id)),
        snapshot_id: Nullable::from_option(non_empty(block.snapshot_id)),
        volume_type: Nullable::from_option(non_empty(block.volume_type)),
        volume_size: Nullable::from_option(positive(block.volume_size)),
        throughput: Nullable::from_option(positive(block.throughput)),
        dynamic_volume_size: Nullable::from_option(
            block
                .dynamic_volume_size
                .and_then(|d| d.into_iter().next())
                .map(|d| DynamicVolumeSize {
                    base_size: Nullable::from_option(d.base_size),
                    resource: Nullable::from_option(d.resource),
                    size_per_resource_unit: Nullable::from_option(d.size_per_resource_unit),
                }),
        ),
    }
}

pub(crate) fn flatten_block_device_mappings(
    mappings: &[BlockDeviceMapping],
) -> Vec<BlockDeviceMappingBlock> {
    mappings
        .iter()
        .map(|mapping| BlockDeviceMappingBlock {
            device_name: mapping.device_name.cloned(),
            ebs: mapping.ebs.value().map(|ebs| vec![flatten_ebs(ebs)]),
        })
        .collect()
}

fn flatten_ebs(ebs: &Ebs) -> EbsBlock {
    EbsBlock {
        delete_on_termination: ebs.delete_on_termination.cloned(),
        encrypted: ebs.encrypted.cloned(),
        iops: ebs.iops.cloned(),
        kms_key_id: ebs.kms_key_id.cloned(),
        snapshot_id: ebs.snapshot_id.cloned(),
        volume_type: ebs.volume_type.cloned(),
        volume_size: ebs.volume_size.cloned(),
        throughput: ebs.throughput.cloned(),
        dynamic_volume_size: ebs.dynamic_volume_size.value().map(|d| {
            vec![DynamicVolumeSizeBlock {
                base_size: d.base_size.cloned(),
                resource: d.resource.cloned(),
                size_per_resource_unit: d.size_per_resource_unit.cloned(),
            }]
        }),
    }
}
