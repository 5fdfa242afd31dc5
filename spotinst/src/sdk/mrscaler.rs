//! EMR scaler

use crate::sdk::{ApiResource, Nullable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scaler {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub description: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub region: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub compute: Nullable<Compute>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub scaling: Nullable<Scaling>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compute {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub availability_zones: Nullable<Vec<AvailabilityZone>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub configurations: Nullable<Configurations>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailabilityZone {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub subnet_id: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configurations {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub file: Nullable<ConfigurationFile>,
}

/// Cluster configuration file kept in S3
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigurationFile {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub bucket: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub key: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Scaling {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub up: Nullable<Vec<ScalingPolicy>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub down: Nullable<Vec<ScalingPolicy>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScalingPolicy {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub policy_name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub metric_name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub namespace: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub statistic: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub unit: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub threshold: Nullable<f64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub period: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub evaluation_periods: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub cooldown: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub operator: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub dimensions: Nullable<Vec<Dimension>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub action: Nullable<Action>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dimension {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub value: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Action {
    #[serde(rename = "type", skip_serializing_if = "Nullable::is_omitted")]
    pub action_type: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub adjustment: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub min_target_capacity: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub max_target_capacity: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub target: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub minimum: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub maximum: Nullable<String>,
}

impl ApiResource for Scaler {
    const PATH: &'static str = "/aws/emr/mrScaler";
    const ENVELOPE: &'static str = "mrScaler";

    fn id(&self) -> Option<&str> {
        self.id.value().map(String::as_str)
    }
}
