//! Ocean CD: rollout specs and verification templates

mod rollout_spec;
mod verification_template;

pub use rollout_spec::*;
pub use verification_template::*;

use crate::sdk::Nullable;
use serde::{Deserialize, Serialize};

/// Named argument shared by strategies and verification templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Arg {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub value: Nullable<String>,
}
