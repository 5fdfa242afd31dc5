use super::Arg;
use crate::sdk::{ApiResource, Nullable};
use serde::{Deserialize, Serialize};

/// Verification template; identified by its name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerificationTemplate {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub args: Nullable<Vec<Arg>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub metrics: Nullable<Vec<Metric>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Metric {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub dry_run: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub interval: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub initial_delay: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub count: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub success_condition: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub failure_condition: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub failure_limit: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub consecutive_error_limit: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub provider: Nullable<MetricProvider>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricProvider {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub prometheus: Nullable<Prometheus>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub datadog: Nullable<Datadog>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub new_relic: Nullable<NewRelic>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub cloud_watch: Nullable<CloudWatch>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub web: Nullable<Web>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub job: Nullable<Job>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Prometheus {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub query: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Datadog {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub duration: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub query: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewRelic {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub profile: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub query: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CloudWatch {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub duration: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub metric_data_queries: Nullable<Vec<MetricDataQuery>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetricDataQuery {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub expression: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub label: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub period: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub return_data: Nullable<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Web {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub method: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub url: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub headers: Nullable<Vec<WebHeader>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub body: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub timeout_seconds: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub json_path: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub insecure: Nullable<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebHeader {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub key: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub value: Nullable<String>,
}

/// Kubernetes job run as a metric
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Job {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub spec: Nullable<JobSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobSpec {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub backoff_limit: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub template: Nullable<JobTemplate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobTemplate {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub spec: Nullable<TemplateSpec>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateSpec {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub containers: Nullable<Vec<Container>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub restart_policy: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Container {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub command: Nullable<Vec<String>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub image: Nullable<String>,
}

impl ApiResource for VerificationTemplate {
    const PATH: &'static str = "/ocean/cd/verificationTemplate";
    const ENVELOPE: &'static str = "verificationTemplate";

    fn id(&self) -> Option<&str> {
        self.name.value().map(String::as_str)
    }
}
