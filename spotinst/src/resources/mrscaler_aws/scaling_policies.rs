use crate::sdk::mrscaler::{Action, Dimension, Scaler, Scaling, ScalingPolicy};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::validator::OneOfValidator;
use commons::{FieldName, FieldRegistryBuilder, GenericField, ResourceType, Schema, ValueType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const MRSCALER_AWS_SCALING_POLICIES: ResourceType =
    ResourceType("mrscaler_aws_scaling_policies");

pub const SCALING_UP_POLICY: FieldName = FieldName("scaling_up_policy");
pub const SCALING_DOWN_POLICY: FieldName = FieldName("scaling_down_policy");

/// One scaling policy as written in configuration; the action is flattened
/// into the policy block
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ScalingPolicyBlock {
    policy_name: Option<String>,
    metric_name: Option<String>,
    namespace: Option<String>,
    statistic: Option<String>,
    unit: Option<String>,
    threshold: Option<f64>,
    period: Option<i64>,
    evaluation_periods: Option<i64>,
    cooldown: Option<i64>,
    operator: Option<String>,
    dimensions: Option<BTreeMap<String, String>>,
    action_type: Option<String>,
    adjustment: Option<String>,
    min_target_capacity: Option<String>,
    max_target_capacity: Option<String>,
    target: Option<String>,
    minimum: Option<String>,
    maximum: Option<String>,
}

fn field(name: FieldName, schema: Schema) -> GenericField<Scaler> {
    GenericField::new(MRSCALER_AWS_SCALING_POLICIES, name, schema)
}

fn scaling(scaler: &mut Scaler) -> &mut Scaling {
    scaler.scaling.get_or_insert_default()
}

fn remote_scaling(scaler: &Scaler) -> Option<&Scaling> {
    scaler.scaling.value()
}

pub fn setup(fields: &mut FieldRegistryBuilder<Scaler>) {
    fields.register(
        field(SCALING_UP_POLICY, scaling_policy_schema())
            .on_read(|scaler, data| {
                let policies = remote_scaling(scaler)
                    .and_then(|s| s.up.value())
                    .map(|p| flatten_policies(p))
                    .unwrap_or_default();
                data.set_blocks(&SCALING_UP_POLICY, policies)
            })
            .on_create(|data, scaler| {
                if let Some(policies) = data.decode(&SCALING_UP_POLICY)? {
                    scaling(scaler).up = Nullable::Value(expand_policies(policies));
                }
                Ok(())
            })
            .on_update(|data, scaler| {
                let policies = data.decode(&SCALING_UP_POLICY)?.map(expand_policies);
                scaling(scaler).up = Nullable::or_null(policies);
                Ok(())
            }),
    );

    fields.register(
        field(SCALING_DOWN_POLICY, scaling_policy_schema())
            .on_read(|scaler, data| {
                let policies = remote_scaling(scaler)
                    .and_then(|s| s.down.value())
                    .map(|p| flatten_policies(p))
                    .unwrap_or_default();
                data.set_blocks(&SCALING_DOWN_POLICY, policies)
            })
            .on_create(|data, scaler| {
                if let Some(policies) = data.decode(&SCALING_DOWN_POLICY)? {
                    scaling(scaler).down = Nullable::Value(expand_policies(policies));
                }
                Ok(())
            })
            .on_update(|data, scaler| {
                let policies = data.decode(&SCALING_DOWN_POLICY)?.map(expand_policies);
                scaling(scaler).down = Nullable::or_null(policies);
                Ok(())
            }),
    );
}

fn scaling_policy_schema() -> Schema {
    Schema::block_set(block([
        ("policy_name", Schema::string().required().build()),
        ("metric_name", Schema::string().required().build()),
        ("namespace", Schema::string().required().build()),
        ("statistic", Schema::string().optional().build()),
        ("unit", Schema::string().required().build()),
        ("threshold", Schema::float().required().build()),
        ("period", Schema::int().optional().build()),
        ("evaluation_periods", Schema::int().optional().build()),
        ("cooldown", Schema::int().optional().build()),
        (
            "operator",
            Schema::string()
                .optional()
                .validator(OneOfValidator::new(&["gt", "gte", "lt", "lte"]))
                .build(),
        ),
        ("dimensions", Schema::map_of(ValueType::String).optional().build()),
        ("action_type", Schema::string().optional().build()),
        ("adjustment", Schema::string().optional().build()),
        ("min_target_capacity", Schema::string().optional().build()),
        ("max_target_capacity", Schema::string().optional().build()),
        ("target", Schema::string().optional().build()),
        ("minimum", Schema::string().optional().build()),
        ("maximum", Schema::string().optional().build()),
    ]))
    .optional()
    .build()
}

fn expand_policies(blocks: Vec<ScalingPolicyBlock>) -> Vec<ScalingPolicy> {
    blocks.into_iter().map(expand_policy).collect()
}

fn expand_policy(block: ScalingPolicyBlock) -> ScalingPolicy {
    let non_empty = |v: Option<String>| Nullable::from_option(v.filter(|s| !s.is_empty()));
    let positive = |v: Option<i64>| Nullable::from_option(v.filter(|n| *n > 0));

    let action = Action {
        action_type: non_empty(block.action_type),
        adjustment: non_empty(block.adjustment),
        min_target_capacity: non_empty(block.min_target_capacity),
        max_target_capacity: non_empty(block.max_target_capacity),
        target: non_empty(block.target),
        minimum: non_empty(block.minimum),
        maximum: non_empty(block.maximum),
    };

    ScalingPolicy {
        policy_name: non_empty(block.policy_name),
        metric_name: non_empty(block.metric_name),
        namespace: non_empty(block.namespace),
        statistic: non_empty(block.statistic),
        unit: non_empty(block.unit),
        threshold: Nullable::from_option(block.threshold),
        period: positive(block.period),
        evaluation_periods: positive(block.evaluation_periods),
        cooldown: positive(block.cooldown),
        operator: non_empty(block.operator),
        dimensions: Nullable::from_option(
            block
                .dimensions
                .filter(|d| !d.is_empty())
                .map(expand_dimensions),
        ),
        action: if action == Action::default() {
            Nullable::Omitted
        } else {
            Nullable::Value(action)
        },
    }
}

/// Map entries become name/value pairs, ordered by name
fn expand_dimensions(dimensions: BTreeMap<String, String>) -> Vec<Dimension> {
    dimensions
        .into_iter()
        .map(|(name, value)| Dimension {
            name: Nullable::Value(name),
            value: Nullable::Value(value),
        })
        .collect()
}

fn flatten_dimensions(dimensions: &[Dimension]) -> BTreeMap<String, String> {
    dimensions
        .iter()
        .filter_map(|d| Some((d.name.cloned()?, d.value.cloned().unwrap_or_default())))
        .collect()
}

fn flatten_policies(policies: &[ScalingPolicy]) -> Vec<ScalingPolicyBlock> {
    policies.iter().map(flatten_policy).collect()
}

fn flatten_policy(policy: &ScalingPolicy) -> ScalingPolicyBlock {
    let action = policy.action.value();

    ScalingPolicyBlock {
        policy_name: policy.policy_name.cloned(),
        metric_name: policy.metric_name.cloned(),
        namespace: policy.namespace.cloned(),
        statistic: policy.statistic.cloned(),
        unit: policy.unit.cloned(),
        threshold: policy.threshold.cloned(),
        period: policy.period.cloned(),
        evaluation_periods: policy.evaluation_periods.cloned(),
        cooldown: policy.cooldown.cloned(),
        operator: policy.operator.cloned(),
        dimensions: policy.dimensions.value().map(|d| flatten_dimensions(d)),
        action_type: action_value(action, |a| &a.action_type),
        adjustment: action_value(action, |a| &a.adjustment),
        min_target_capacity: action_value(action, |a| &a.min_target_capacity),
        max_target_capacity: action_value(action, |a| &a.max_target_capacity),
        target: action_value(action, |a| &a.target),
        minimum: action_value(action, |a| &a.minimum),
        maximum: action_value(action, |a| &a.maximum),
    }
}

fn action_value(action: Option<&Action>, get: fn(&Action) -> &Nullable<String>) -> Option<String> {
    action.and_then(|a| get(a).cloned())
}
