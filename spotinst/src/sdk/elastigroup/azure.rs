//! Elastigroup for Azure (v3 API)

use crate::sdk::{ApiResource, Nullable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Group {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub description: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub resource_group_name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub region: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub strategy: Nullable<Strategy>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Strategy {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub spot_percentage: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub on_demand_count: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub draining_timeout: Nullable<i64>,
    #[serde(rename = "fallbackToOd", skip_serializing_if = "Nullable::is_omitted")]
    pub fallback_to_on_demand: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub optimization_windows: Nullable<Vec<String>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub revert_to_spot: Nullable<RevertToSpot>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RevertToSpot {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub perform_at: Nullable<String>,
}

impl ApiResource for Group {
    const PATH: &'static str = "/azure/compute/group";
    const ENVELOPE: &'static str = "group";

    fn id(&self) -> Option<&str> {
        self.id.value().map(String::as_str)
    }
}
