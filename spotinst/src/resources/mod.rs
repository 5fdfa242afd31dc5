//! Terraform resources driven by field registries
//!
//! Every resource here is a `ManagedResource<T>`: the registry turns config
//! into the API object `T` and the API response back into state, the client
//! moves `T` over the wire. Field packages only declare fields.

pub mod elastigroup_azure;
pub mod mrscaler_aws;
pub mod ocean_aws;
pub mod ocean_aws_launch_spec;
pub mod oceancd_rollout_spec;
pub mod oceancd_verification_template;

use crate::sdk::{ApiError, ApiResource, Client};
use async_trait::async_trait;
use commons::resource::{
    CreateResourceRequest, CreateResourceResponse, DeleteResourceRequest, DeleteResourceResponse,
    ReadResourceRequest, ReadResourceResponse, UpdateResourceRequest, UpdateResourceResponse,
};
use commons::{Diagnostics, Dynamic, FieldError, FieldRegistry, Resource, ResourceData, SchemaMap};
use std::sync::Arc;

pub struct ManagedResource<T> {
    type_name: &'static str,
    registry: Arc<FieldRegistry<T>>,
    client: Client,
}

impl<T: ApiResource> ManagedResource<T> {
    pub fn new(type_name: &'static str, registry: Arc<FieldRegistry<T>>, client: Client) -> Self {
        Self {
            type_name,
            registry,
            client,
        }
    }

    /// API object -> state, including the id
    fn flatten(&self, remote: &T) -> Result<ResourceData, FieldError> {
        let mut data = ResourceData::new(self.registry.schema_map());
        self.registry.on_read(remote, &mut data)?;
        if let Some(id) = remote.id() {
            data.set_id(id);
        }
        Ok(data)
    }

    fn decode(&self, value: &Dynamic, diags: &mut Diagnostics) -> Option<ResourceData> {
        match ResourceData::from_value(self.registry.schema_map(), value) {
            Ok(data) => Some(data),
            Err(e) => {
                diags.add_error("Invalid resource data", Some(e.to_string()));
                None
            }
        }
    }

    fn require_id<'a>(&self, data: &'a ResourceData, diags: &mut Diagnostics) -> Option<&'a str> {
        let id = data.id();
        if id.is_none() {
            diags.add_error(
                format!("{} has no id in state", self.type_name),
                None::<String>,
            );
        }
        id
    }

    fn api_error(&self, action: &str, error: ApiError, diags: &mut Diagnostics) {
        diags.add_error(
            format!("Failed to {} {}", action, self.type_name),
            Some(error.to_string()),
        );
    }

    fn state_or_error(&self, remote: &T, diags: &mut Diagnostics) -> Option<Dynamic> {
        match self.flatten(remote) {
            Ok(data) => Some(data.state()),
            Err(e) => {
                diags.add_error("Failed to read API response", Some(e.to_string()));
                None
            }
        }
    }
}

#[async_trait]
impl<T: ApiResource> Resource for ManagedResource<T> {
    fn type_name(&self) -> &str {
        self.type_name
    }

    fn schema(&self) -> Arc<SchemaMap> {
        self.registry.schema_map()
    }

    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse {
        let mut diags = Diagnostics::new();

        let Some(config) = self.decode(&request.config, &mut diags) else {
            return CreateResourceResponse {
                new_state: Dynamic::Null,
                diagnostics: diags,
            };
        };

        let mut remote = T::default();
        if let Err(e) = self.registry.on_create(&config, &mut remote) {
            diags.add_error("Failed to build create request", Some(e.to_string()));
            return CreateResourceResponse {
                new_state: Dynamic::Null,
                diagnostics: diags,
            };
        }

        tracing::debug!("Creating {}", self.type_name);
        let new_state = match self.client.create(&remote).await {
            Ok(created) => self.state_or_error(&created, &mut diags),
            Err(e) => {
                self.api_error("create", e, &mut diags);
                None
            }
        };

        CreateResourceResponse {
            new_state: new_state.unwrap_or(Dynamic::Null),
            diagnostics: diags,
        }
    }

    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse {
        let mut diags = Diagnostics::new();

        let current = self.decode(&request.current_state, &mut diags);
        let Some(id) = current
            .as_ref()
            .and_then(|data| self.require_id(data, &mut diags))
        else {
            return ReadResourceResponse {
                new_state: None,
                diagnostics: diags,
            };
        };

        let new_state = match self.client.read::<T>(id).await {
            Ok(remote) => self.state_or_error(&remote, &mut diags),
            Err(e) if e.is_not_found() => {
                tracing::debug!("{} {} no longer exists, removing from state", self.type_name, id);
                None
            }
            Err(e) => {
                self.api_error("read", e, &mut diags);
                Some(request.current_state.clone())
            }
        };

        ReadResourceResponse {
            new_state,
            diagnostics: diags,
        }
    }

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse {
        let mut diags = Diagnostics::new();

        let prior = self.decode(&request.prior_state, &mut diags);
        let planned = self.decode(&request.config, &mut diags);
        let (Some(prior), Some(planned)) = (prior, planned) else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: diags,
            };
        };
        let planned = planned.with_prior(&prior);

        let Some(id) = self.require_id(&planned, &mut diags) else {
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: diags,
            };
        };

        let mut remote = T::default();
        let changed = match self.registry.on_update(&planned, &mut remote) {
            Ok(changed) => changed,
            Err(e) => {
                diags.add_error("Failed to build update request", Some(e.to_string()));
                return UpdateResourceResponse {
                    new_state: request.prior_state,
                    diagnostics: diags,
                };
            }
        };

        if !changed {
            tracing::debug!("No changes for {} {}, skipping update", self.type_name, id);
            return UpdateResourceResponse {
                new_state: request.prior_state,
                diagnostics: diags,
            };
        }

        let new_state = match self.client.update(id, &remote).await {
            Ok(updated) => self.state_or_error(&updated, &mut diags),
            Err(e) => {
                self.api_error("update", e, &mut diags);
                None
            }
        };

        UpdateResourceResponse {
            new_state: new_state.unwrap_or(request.prior_state),
            diagnostics: diags,
        }
    }

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse {
        let mut diags = Diagnostics::new();

        let prior = self.decode(&request.prior_state, &mut diags);
        if let Some(id) = prior
            .as_ref()
            .and_then(|data| self.require_id(data, &mut diags))
        {
            match self.client.delete_resource::<T>(id).await {
                Ok(()) => {}
                Err(e) if e.is_not_found() => {
                    tracing::debug!("{} {} already deleted", self.type_name, id);
                }
                Err(e) => self.api_error("delete", e, &mut diags),
            }
        }

        DeleteResourceResponse { diagnostics: diags }
    }
}
