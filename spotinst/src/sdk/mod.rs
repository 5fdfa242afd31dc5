//! Spotinst REST API: client, errors and request/response models

pub mod client;
pub mod elastigroup;
pub mod error;
pub mod mrscaler;
pub mod nullable;
pub mod ocean;
pub mod oceancd;

pub use client::{Client, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use nullable::Nullable;

use serde::de::DeserializeOwned;
use serde::Serialize;

/// A top-level API object with its own CRUD endpoints
pub trait ApiResource: Serialize + DeserializeOwned + Default + Send + Sync + 'static {
    /// Collection path, e.g. "/ocean/aws/k8s/cluster"
    const PATH: &'static str;

    /// Key the object is wrapped under in request bodies
    const ENVELOPE: &'static str;

    fn id(&self) -> Option<&str>;

    fn resource_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}
