//! spotinst_oceancd_rollout_spec
//!
//! Rollout specs are addressed by name, so the name doubles as the id.

pub mod traffic;

use crate::sdk::oceancd::{Arg, RolloutSpec, RolloutSpecStrategy, SpotDeployment};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::{
    FieldError, FieldName, FieldRegistry, FieldRegistryBuilder, GenericField, ResourceType, Schema,
};
use serde::{Deserialize, Serialize};

pub const TYPE_NAME: &str = "spotinst_oceancd_rollout_spec";

pub const OCEANCD_ROLLOUT_SPEC: ResourceType = ResourceType("oceancd_rollout_spec");

pub const ROLLOUT_SPEC_NAME: FieldName = FieldName("rollout_spec_name");
pub const SPOT_DEPLOYMENT: FieldName = FieldName("spot_deployment");
pub const STRATEGY: FieldName = FieldName("strategy");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SpotDeploymentBlock {
    spot_deployment_cluster_id: Option<String>,
    spot_deployment_name: Option<String>,
    spot_deployment_namespace: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StrategyBlock {
    strategy_name: Option<String>,
    args: Option<Vec<ArgBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct ArgBlock {
    arg_name: Option<String>,
    arg_value: Option<String>,
}

fn field(name: FieldName, schema: Schema) -> GenericField<RolloutSpec> {
    GenericField::new(OCEANCD_ROLLOUT_SPEC, name, schema)
}

pub fn setup(fields: &mut FieldRegistryBuilder<RolloutSpec>) {
    fields.register(
        field(ROLLOUT_SPEC_NAME, Schema::string().required().force_new().build())
            .on_read(|spec, data| {
                data.set(&ROLLOUT_SPEC_NAME, spec.name.cloned().unwrap_or_default())
            })
            .on_create(|data, spec| {
                spec.name = Nullable::from_option(data.get_string(&ROLLOUT_SPEC_NAME)?);
                Ok(())
            })
            .on_update(|_, _| Err(FieldError::update_not_allowed(ROLLOUT_SPEC_NAME.as_str()))),
    );

    fields.register(
        field(
            SPOT_DEPLOYMENT,
            Schema::block_list(block([
                ("spot_deployment_cluster_id", Schema::string().optional().build()),
                ("spot_deployment_name", Schema::string().optional().build()),
                ("spot_deployment_namespace", Schema::string().optional().build()),
            ]))
            .required()
            .max_items(1)
            .build(),
        )
        .on_read(|spec, data| {
            let blocks: Vec<_> = spec
                .spot_deployment
                .value()
                .map(flatten_spot_deployment)
                .into_iter()
                .collect();
            data.set_blocks(&SPOT_DEPLOYMENT, blocks)
        })
        .on_create(|data, spec| {
            if let Some(deployment) = expand_spot_deployment(data.decode(&SPOT_DEPLOYMENT)?) {
                spec.spot_deployment = Nullable::Value(deployment);
            }
            Ok(())
        })
        .on_update(|data, spec| {
            spec.spot_deployment =
                Nullable::or_null(expand_spot_deployment(data.decode(&SPOT_DEPLOYMENT)?));
            Ok(())
        }),
    );

    fields.register(
        field(
            STRATEGY,
            Schema::block_list(block([
                ("strategy_name", Schema::string().required().build()),
                ("args", args_schema()),
            ]))
            .required()
            .max_items(1)
            .build(),
        )
        .on_read(|spec, data| {
            let blocks: Vec<_> = spec
                .strategy
                .value()
                .map(flatten_strategy)
                .into_iter()
                .collect();
            data.set_blocks(&STRATEGY, blocks)
        })
        .on_create(|data, spec| {
            if let Some(strategy) = expand_strategy(data.decode(&STRATEGY)?) {
                spec.strategy = Nullable::Value(strategy);
            }
            Ok(())
        })
        .on_update(|data, spec| {
            spec.strategy = Nullable::or_null(expand_strategy(data.decode(&STRATEGY)?));
            Ok(())
        }),
    );
}

pub fn registry() -> FieldRegistry<RolloutSpec> {
    let mut fields = FieldRegistry::builder();
    setup(&mut fields);
    traffic::setup(&mut fields);
    fields.build()
}

pub(crate) fn args_schema() -> Schema {
    Schema::block_list(block([
        ("arg_name", Schema::string().required().build()),
        ("arg_value", Schema::string().optional().build()),
    ]))
    .optional()
    .build()
}

fn expand_spot_deployment(blocks: Option<Vec<SpotDeploymentBlock>>) -> Option<SpotDeployment> {
    let block = blocks?.into_iter().next()?;
    Some(SpotDeployment {
        cluster_id: Nullable::from_option(block.spot_deployment_cluster_id),
        name: Nullable::from_option(block.spot_deployment_name),
        namespace: Nullable::from_option(block.spot_deployment_namespace),
    })
}

fn flatten_spot_deployment(deployment: &SpotDeployment) -> SpotDeploymentBlock {
    SpotDeploymentBlock {
        spot_deployment_cluster_id: deployment.cluster_id.cloned(),
        spot_deployment_name: deployment.name.cloned(),
        spot_deployment_namespace: deployment.namespace.cloned(),
    }
}

fn expand_strategy(blocks: Option<Vec<StrategyBlock>>) -> Option<RolloutSpecStrategy> {
    let block = blocks?.into_iter().next()?;
    Some(RolloutSpecStrategy {
        name: Nullable::from_option(block.strategy_name),
        args: Nullable::from_option(block.args.filter(|a| !a.is_empty()).map(expand_args)),
    })
}

fn flatten_strategy(strategy: &RolloutSpecStrategy) -> StrategyBlock {
    StrategyBlock {
        strategy_name: strategy.name.cloned(),
        args: strategy.args.value().map(|args| flatten_args(args)),
    }
}

pub(crate) fn expand_args(blocks: Vec<ArgBlock>) -> Vec<Arg> {
    blocks
        .into_iter()
        .map(|block| Arg {
            name: Nullable::from_option(block.arg_name),
            value: Nullable::from_option(block.arg_value.filter(|v| !v.is_empty())),
        })
        .collect()
}

pub(crate) fn flatten_args(args: &[Arg]) -> Vec<ArgBlock> {
    args.iter()
        .map(|arg| ArgBlock {
            arg_name: arg.name.cloned(),
            arg_value: arg.value.cloned(),
        })
        .collect()
}
