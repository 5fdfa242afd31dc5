//! Provider entry point: configuration, resource lookup and schemas

use crate::error::ProviderError;
use crate::resources::{
    elastigroup_azure, mrscaler_aws, ocean_aws, ocean_aws_launch_spec, oceancd_rollout_spec,
    oceancd_verification_template, ManagedResource,
};
use crate::sdk::elastigroup::azure::Group;
use crate::sdk::mrscaler::Scaler;
use crate::sdk::ocean::aws::{Cluster, LaunchSpec};
use crate::sdk::oceancd::{RolloutSpec, VerificationTemplate};
use crate::sdk::{Client, DEFAULT_BASE_URL};
use commons::schema::schema_map_to_json;
use commons::{Diagnostics, Dynamic, FieldRegistry, Resource, Schema, SchemaMap};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

pub struct ConfigureRequest {
    pub config: Dynamic,
}

pub struct ConfigureResponse {
    pub diagnostics: Diagnostics,
}

/// Field registries of every resource, built once per provider
struct Registries {
    elastigroup_azure: Arc<FieldRegistry<Group>>,
    ocean_aws: Arc<FieldRegistry<Cluster>>,
    ocean_aws_launch_spec: Arc<FieldRegistry<LaunchSpec>>,
    mrscaler_aws: Arc<FieldRegistry<Scaler>>,
    oceancd_rollout_spec: Arc<FieldRegistry<RolloutSpec>>,
    oceancd_verification_template: Arc<FieldRegistry<VerificationTemplate>>,
}

impl Registries {
    fn build() -> Self {
        Self {
            elastigroup_azure: Arc::new(elastigroup_azure::registry()),
            ocean_aws: Arc::new(ocean_aws::registry()),
            ocean_aws_launch_spec: Arc::new(ocean_aws_launch_spec::registry()),
            mrscaler_aws: Arc::new(mrscaler_aws::registry()),
            oceancd_rollout_spec: Arc::new(oceancd_rollout_spec::registry()),
            oceancd_verification_template: Arc::new(oceancd_verification_template::registry()),
        }
    }

    fn schemas(&self) -> HashMap<String, Arc<SchemaMap>> {
        [
            (elastigroup_azure::TYPE_NAME, self.elastigroup_azure.schema_map()),
            (ocean_aws::TYPE_NAME, self.ocean_aws.schema_map()),
            (ocean_aws_launch_spec::TYPE_NAME, self.ocean_aws_launch_spec.schema_map()),
            (mrscaler_aws::TYPE_NAME, self.mrscaler_aws.schema_map()),
            (oceancd_rollout_spec::TYPE_NAME, self.oceancd_rollout_spec.schema_map()),
            (
                oceancd_verification_template::TYPE_NAME,
                self.oceancd_verification_template.schema_map(),
            ),
        ]
        .into_iter()
        .map(|(name, schema)| (name.to_string(), schema))
        .collect()
    }
}

pub struct SpotinstProvider {
    client: Option<Client>,
    registries: Registries,
    schemas: OnceLock<HashMap<String, Arc<SchemaMap>>>,
}

impl Default for SpotinstProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SpotinstProvider {
    pub fn new() -> Self {
        Self {
            client: None,
            registries: Registries::build(),
            schemas: OnceLock::new(),
        }
    }

    pub fn schema() -> SchemaMap {
        commons::schema::block([
            (
                "token",
                Schema::string()
                    .optional()
                    .sensitive()
                    .description("Spotinst API token. Falls back to SPOTINST_TOKEN.")
                    .build(),
            ),
            (
                "account",
                Schema::string()
                    .optional()
                    .description("Spotinst account id. Falls back to SPOTINST_ACCOUNT.")
                    .build(),
            ),
            (
                "base_url",
                Schema::string()
                    .optional()
                    .description("API base URL. Falls back to SPOTINST_BASE_URL.")
                    .build(),
            ),
        ])
    }

    pub async fn configure(&mut self, request: ConfigureRequest) -> ConfigureResponse {
        let config_value = |key: &str| {
            request
                .config
                .as_map()
                .and_then(|values| values.get(key))
                .and_then(|v| v.as_str())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        };

        let token = config_value("token").or_else(|| std::env::var("SPOTINST_TOKEN").ok());
        let account = config_value("account").or_else(|| std::env::var("SPOTINST_ACCOUNT").ok());
        let base_url = config_value("base_url")
            .or_else(|| std::env::var("SPOTINST_BASE_URL").ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let mut diags = Diagnostics::new();

        match token.filter(|t| !t.is_empty()) {
            Some(token) => match Client::new(&base_url, &token, account.as_deref()) {
                Ok(client) => {
                    tracing::debug!("Configured Spotinst client for {}", base_url);
                    self.client = Some(client);
                }
                Err(e) => {
                    diags.add_error(ProviderError::from(e).to_string(), None::<String>);
                }
            },
            None => {
                diags.add_error(
                    "token is required (set in provider config or SPOTINST_TOKEN env var)",
                    None::<String>,
                );
            }
        }

        ConfigureResponse { diagnostics: diags }
    }

    pub async fn create_resource(&self, name: &str) -> Result<Box<dyn Resource>, ProviderError> {
        let client = self
            .client
            .as_ref()
            .ok_or(ProviderError::NotConfigured)?
            .clone();
        let registries = &self.registries;

        let resource: Box<dyn Resource> = match name {
            elastigroup_azure::TYPE_NAME => Box::new(ManagedResource::new(
                elastigroup_azure::TYPE_NAME,
                Arc::clone(&registries.elastigroup_azure),
                client,
            )),
            ocean_aws::TYPE_NAME => Box::new(ManagedResource::new(
                ocean_aws::TYPE_NAME,
                Arc::clone(&registries.ocean_aws),
                client,
            )),
            ocean_aws_launch_spec::TYPE_NAME => Box::new(ManagedResource::new(
                ocean_aws_launch_spec::TYPE_NAME,
                Arc::clone(&registries.ocean_aws_launch_spec),
                client,
            )),
            mrscaler_aws::TYPE_NAME => Box::new(ManagedResource::new(
                mrscaler_aws::TYPE_NAME,
                Arc::clone(&registries.mrscaler_aws),
                client,
            )),
            oceancd_rollout_spec::TYPE_NAME => Box::new(ManagedResource::new(
                oceancd_rollout_spec::TYPE_NAME,
                Arc::clone(&registries.oceancd_rollout_spec),
                client,
            )),
            oceancd_verification_template::TYPE_NAME => Box::new(ManagedResource::new(
                oceancd_verification_template::TYPE_NAME,
                Arc::clone(&registries.oceancd_verification_template),
                client,
            )),
            _ => return Err(ProviderError::UnknownResource(name.to_string())),
        };

        Ok(resource)
    }

    pub async fn resource_schemas(&self) -> HashMap<String, Arc<SchemaMap>> {
        self.schemas
            .get_or_init(|| self.registries.schemas())
            .clone()
    }

    /// Provider and resource schemas as one JSON document
    pub async fn schema_document(&self) -> Value {
        let resources: serde_json::Map<String, Value> = self
            .resource_schemas()
            .await
            .iter()
            .map(|(name, schema)| (name.clone(), schema_map_to_json(schema)))
            .collect();

        json!({
            "provider": schema_map_to_json(&Self::schema()),
            "resource_schemas": resources,
        })
    }
}
