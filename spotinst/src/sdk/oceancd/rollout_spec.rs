use super::Arg;
use crate::sdk::{ApiResource, Nullable};
use serde::{Deserialize, Serialize};

/// Rollout spec; identified by its name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolloutSpec {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub spot_deployment: Nullable<SpotDeployment>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub strategy: Nullable<RolloutSpecStrategy>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub traffic: Nullable<Traffic>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpotDeployment {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub cluster_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub namespace: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RolloutSpecStrategy {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub args: Nullable<Vec<Arg>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Traffic {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub canary_service: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub stable_service: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub alb: Nullable<Alb>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub nginx: Nullable<Nginx>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub smi: Nullable<Smi>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ping_pong: Nullable<PingPong>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Alb {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ingress: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub root_service: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub service_port: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub annotation_prefix: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub stickiness_config: Nullable<StickinessConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StickinessConfig {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub enabled: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub duration_seconds: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Nginx {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub stable_ingress: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub annotation_prefix: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub additional_ingress_annotation: Nullable<AdditionalIngressAnnotation>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalIngressAnnotation {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub canary_by_header: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub key1: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Smi {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub root_service: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub traffic_split_name: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PingPong {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ping_service: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub pong_service: Nullable<String>,
}

impl ApiResource for RolloutSpec {
    const PATH: &'static str = "/ocean/cd/rolloutSpec";
    const ENVELOPE: &'static str = "rolloutSpec";

    fn id(&self) -> Option<&str> {
        self.name.value().map(String::as_str)
    }
}
