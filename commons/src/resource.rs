//! Resource trait and its request/response types
//!
//! A resource receives configuration and state as `Dynamic` objects and
//! answers with the new state plus diagnostics. Errors never escape as
//! `Result`; they are reported through the response diagnostics.

use crate::resource_data::ResourceData;
use crate::schema::SchemaMap;
use crate::types::{Diagnostics, Dynamic};
use async_trait::async_trait;
use std::sync::Arc;

/// CRUD surface of a managed resource
/// Type name should be constant and match the key the provider hands out
#[async_trait]
pub trait Resource: Send + Sync {
    /// Type name, e.g. "spotinst_ocean_aws"
    fn type_name(&self) -> &str;

    /// Full schema of the resource; implementations cache it
    fn schema(&self) -> Arc<SchemaMap>;

    /// Checks required attributes, conflicts and validators
    async fn validate(&self, request: ValidateResourceConfigRequest) -> ValidateResourceConfigResponse {
        let diagnostics = match ResourceData::from_value(self.schema(), &request.config) {
            Ok(data) => data.validate(),
            Err(e) => {
                let mut diags = Diagnostics::new();
                diags.add_error("Invalid configuration", Some(e.to_string()));
                diags
            }
        };
        ValidateResourceConfigResponse { diagnostics }
    }

    /// MUST populate all attributes in response.new_state, including computed ones
    async fn create(&self, request: CreateResourceRequest) -> CreateResourceResponse;

    /// MUST return None when the remote object no longer exists
    async fn read(&self, request: ReadResourceRequest) -> ReadResourceResponse;

    async fn update(&self, request: UpdateResourceRequest) -> UpdateResourceResponse;

    async fn delete(&self, request: DeleteResourceRequest) -> DeleteResourceResponse;
}

pub struct ValidateResourceConfigRequest {
    pub type_name: String,
    pub config: Dynamic,
}

pub struct ValidateResourceConfigResponse {
    pub diagnostics: Diagnostics,
}

pub struct CreateResourceRequest {
    pub type_name: String,
    pub config: Dynamic,
}

pub struct CreateResourceResponse {
    pub new_state: Dynamic,
    pub diagnostics: Diagnostics,
}

pub struct ReadResourceRequest {
    pub type_name: String,
    pub current_state: Dynamic,
}

pub struct ReadResourceResponse {
    pub new_state: Option<Dynamic>,
    pub diagnostics: Diagnostics,
}

pub struct UpdateResourceRequest {
    pub type_name: String,
    pub prior_state: Dynamic,
    pub config: Dynamic,
}

pub struct UpdateResourceResponse {
    pub new_state: Dynamic,
    pub diagnostics: Diagnostics,
}

pub struct DeleteResourceRequest {
    pub type_name: String,
    pub prior_state: Dynamic,
}

pub struct DeleteResourceResponse {
    pub diagnostics: Diagnostics,
}
