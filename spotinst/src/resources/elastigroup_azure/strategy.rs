use crate::sdk::elastigroup::azure::{Group, RevertToSpot, Strategy};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::sentinel::{none_to_sentinel, value_or_none, UNSET_INT};
use commons::validator::{NumberRangeValidator, OneOfValidator, SentinelOr, TimeWindowValidator};
use commons::{FieldName, FieldRegistryBuilder, GenericField, ResourceType, Schema, ValueType};
use serde::{Deserialize, Serialize};

pub const ELASTIGROUP_AZURE_STRATEGY: ResourceType = ResourceType("elastigroup_azure_strategy");

pub const SPOT_PERCENTAGE: FieldName = FieldName("spot_percentage");
pub const ON_DEMAND_COUNT: FieldName = FieldName("on_demand_count");
pub const FALLBACK_TO_ON_DEMAND: FieldName = FieldName("fallback_to_on_demand");
pub const DRAINING_TIMEOUT: FieldName = FieldName("draining_timeout");
pub const OPTIMIZATION_WINDOWS: FieldName = FieldName("optimization_windows");
pub const REVERT_TO_SPOT: FieldName = FieldName("revert_to_spot");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct RevertToSpotBlock {
    perform_at: Option<String>,
}

fn field(name: FieldName, schema: Schema) -> GenericField<Group> {
    GenericField::new(ELASTIGROUP_AZURE_STRATEGY, name, schema)
}

fn strategy(group: &mut Group) -> &mut Strategy {
    group.strategy.get_or_insert_default()
}

fn remote_strategy(group: &Group) -> Option<&Strategy> {
    group.strategy.value()
}

pub fn setup(fields: &mut FieldRegistryBuilder<Group>) {
    fields.register(
        field(
            SPOT_PERCENTAGE,
            Schema::int()
                .optional()
                .default(UNSET_INT)
                .conflicts_with(&[ON_DEMAND_COUNT.as_str()])
                .validator(SentinelOr {
                    sentinel: UNSET_INT,
                    inner: NumberRangeValidator {
                        min: Some(0.0),
                        max: Some(100.0),
                    },
                })
                .build(),
        )
        .on_read(|group, data| {
            let value = remote_strategy(group).and_then(|s| s.spot_percentage.cloned());
            data.set(&SPOT_PERCENTAGE, none_to_sentinel(value, UNSET_INT))
        })
        .on_create(|data, group| {
            let value = data.get_int(&SPOT_PERCENTAGE)?;
            if let Some(value) = value.and_then(|v| value_or_none(v, UNSET_INT)) {
                strategy(group).spot_percentage = Nullable::Value(value);
            }
            Ok(())
        })
        .on_update(|data, group| {
            let value = data.get_int(&SPOT_PERCENTAGE)?;
            strategy(group).spot_percentage =
                Nullable::or_null(value.and_then(|v| value_or_none(v, UNSET_INT)));
            Ok(())
        }),
    );

    fields.register(
        field(
            ON_DEMAND_COUNT,
            Schema::int().optional().default(UNSET_INT).build(),
        )
        .on_read(|group, data| {
            let value = remote_strategy(group).and_then(|s| s.on_demand_count.cloned());
            data.set(&ON_DEMAND_COUNT, none_to_sentinel(value, UNSET_INT))
        })
        .on_create(|data, group| {
            let value = data.get_int(&ON_DEMAND_COUNT)?;
            if let Some(value) = value.and_then(|v| value_or_none(v, UNSET_INT)) {
                strategy(group).on_demand_count = Nullable::Value(value);
            }
            Ok(())
        })
        .on_update(|data, group| {
            let value = data.get_int(&ON_DEMAND_COUNT)?;
            strategy(group).on_demand_count =
                Nullable::or_null(value.and_then(|v| value_or_none(v, UNSET_INT)));
            Ok(())
        }),
    );

    fields.register(
        field(FALLBACK_TO_ON_DEMAND, Schema::bool().optional().default(true).build())
            .on_read(|group, data| {
                let value = remote_strategy(group).and_then(|s| s.fallback_to_on_demand.cloned());
                data.set(&FALLBACK_TO_ON_DEMAND, value.unwrap_or(true))
            })
            .on_create(|data, group| {
                if let Some(value) = data.get_bool(&FALLBACK_TO_ON_DEMAND)? {
                    strategy(group).fallback_to_on_demand = Nullable::Value(value);
                }
                Ok(())
            })
            .on_update(|data, group| {
                let value = data.get_bool(&FALLBACK_TO_ON_DEMAND)?;
                strategy(group).fallback_to_on_demand = Nullable::or_null(value);
                Ok(())
            }),
    );

    // computed: an absent value is left to the API, never sent as null
    fields.register(
        field(DRAINING_TIMEOUT, Schema::int().optional().computed().build())
            .on_read(|group, data| {
                match remote_strategy(group).and_then(|s| s.draining_timeout.cloned()) {
                    Some(timeout) => data.set(&DRAINING_TIMEOUT, timeout),
                    None => Ok(()),
                }
            })
            .on_create(|data, group| {
                if let Some(timeout) = data.get_int(&DRAINING_TIMEOUT)? {
                    strategy(group).draining_timeout = Nullable::Value(timeout);
                }
                Ok(())
            })
            .on_update(|data, group| {
                if let Some(timeout) = data.get_int(&DRAINING_TIMEOUT)? {
                    strategy(group).draining_timeout = Nullable::Value(timeout);
                }
                Ok(())
            }),
    );

    fields.register(
        field(
            OPTIMIZATION_WINDOWS,
            Schema::list_of(ValueType::String)
                .optional()
                .validator(TimeWindowValidator)
                .build(),
        )
        .on_read(|group, data| {
            let windows = remote_strategy(group)
                .and_then(|s| s.optimization_windows.cloned())
                .unwrap_or_default();
            data.set(&OPTIMIZATION_WINDOWS, windows)
        })
        .on_create(|data, group| {
            if let Some(windows) = data.get_string_list(&OPTIMIZATION_WINDOWS)? {
                if !windows.is_empty() {
                    strategy(group).optimization_windows = Nullable::Value(windows);
                }
            }
            Ok(())
        })
        .on_update(|data, group| {
            let windows = data
                .get_string_list(&OPTIMIZATION_WINDOWS)?
                .filter(|w| !w.is_empty());
            strategy(group).optimization_windows = Nullable::or_null(windows);
            Ok(())
        }),
    );

    fields.register(
        field(
            REVERT_TO_SPOT,
            Schema::block_list(block([(
                "perform_at",
                Schema::string()
                    .required()
                    .validator(OneOfValidator::new(&["always", "never", "timeWindow"]))
                    .build(),
            )]))
            .optional()
            .max_items(1)
            .build(),
        )
        .on_read(|group, data| {
            let blocks: Vec<RevertToSpotBlock> = remote_strategy(group)
                .and_then(|s| s.revert_to_spot.value())
                .map(flatten_revert_to_spot)
                .into_iter()
                .collect();
            data.set_blocks(&REVERT_TO_SPOT, blocks)
        })
        .on_create(|data, group| {
            if let Some(revert) = expand_revert_to_spot(data.decode(&REVERT_TO_SPOT)?) {
                strategy(group).revert_to_spot = Nullable::Value(revert);
            }
            Ok(())
        })
        .on_update(|data, group| {
            let revert = expand_revert_to_spot(data.decode(&REVERT_TO_SPOT)?);
            strategy(group).revert_to_spot = Nullable::or_null(revert);
            Ok(())
        }),
    );
}

fn expand_revert_to_spot(blocks: Option<Vec<RevertToSpotBlock>>) -> Option<RevertToSpot> {
    let block = blocks?.into_iter().next()?;
    Some(RevertToSpot {
        perform_at: Nullable::from_option(block.perform_at.filter(|p| !p.is_empty())),
    })
}

fn flatten_revert_to_spot(revert: &RevertToSpot) -> RevertToSpotBlock {
    RevertToSpotBlock {
        perform_at: revert.perform_at.cloned(),
    }
}
