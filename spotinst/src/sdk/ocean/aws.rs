//! Ocean for AWS Kubernetes: clusters and launch specs (virtual node groups)

use crate::sdk::{ApiResource, Nullable};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Cluster {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub controller_cluster_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub region: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub capacity: Nullable<Capacity>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub compute: Nullable<Compute>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Capacity {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub minimum: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub maximum: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub target: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compute {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub subnet_ids: Nullable<Vec<String>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub launch_specification: Nullable<LaunchSpecification>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchSpecification {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub image_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub user_data: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub security_group_ids: Nullable<Vec<String>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub iam_instance_profile: Nullable<IamInstanceProfile>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub key_pair: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub associate_public_ip_address: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub monitoring: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ebs_optimized: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub use_as_template_only: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub root_volume_size: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub instance_metadata_options: Nullable<InstanceMetadataOptions>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub tags: Nullable<Vec<Tag>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub block_device_mappings: Nullable<Vec<BlockDeviceMapping>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IamInstanceProfile {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub arn: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceMetadataOptions {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub http_tokens: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub http_put_response_hop_limit: Nullable<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub tag_key: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub tag_value: Nullable<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockDeviceMapping {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub device_name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ebs: Nullable<Ebs>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ebs {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub delete_on_termination: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub encrypted: Nullable<bool>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub iops: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub kms_key_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub snapshot_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub volume_type: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub volume_size: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub throughput: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub dynamic_volume_size: Nullable<DynamicVolumeSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DynamicVolumeSize {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub base_size: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub resource: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub size_per_resource_unit: Nullable<i64>,
}

/// Launch spec (virtual node group) attached to an Ocean cluster
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LaunchSpec {
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub ocean_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub name: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub image_id: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub user_data: Nullable<String>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub security_group_ids: Nullable<Vec<String>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub root_volume_size: Nullable<i64>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub tags: Nullable<Vec<Tag>>,
    #[serde(skip_serializing_if = "Nullable::is_omitted")]
    pub block_device_mappings: Nullable<Vec<BlockDeviceMapping>>,
}

impl ApiResource for Cluster {
    const PATH: &'static str = "/ocean/aws/k8s/cluster";
    const ENVELOPE: &'static str = "cluster";

    fn id(&self) -> Option<&str> {
        self.id.value().map(String::as_str)
    }
}

impl ApiResource for LaunchSpec {
    const PATH: &'static str = "/ocean/aws/k8s/launchSpec";
    const ENVELOPE: &'static str = "launchSpec";

    fn id(&self) -> Option<&str> {
        self.id.value().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn cluster_decodes_nested_launch_specification() {
        let cluster: Cluster = serde_json::from_value(json!({
            "id": "o-1",
            "compute": {
                "subnetIds": ["subnet-1"],
                "launchSpecification": {
                    "imageId": "ami-1",
                    "instanceMetadataOptions": {"httpTokens": "required"},
                    "blockDeviceMappings": [
                        {"deviceName": "/dev/xvda", "ebs": {"volumeSize": 50}}
                    ]
                }
            },
            "createdAt": "2024-01-01T00:00:00.000Z"
        }))
        .unwrap();

        let spec = cluster
            .compute
            .value()
            .and_then(|c| c.launch_specification.value())
            .unwrap();
        assert_eq!(spec.image_id.cloned().as_deref(), Some("ami-1"));
        let options = spec.instance_metadata_options.value().unwrap();
        assert!(options.http_put_response_hop_limit.is_omitted());
        let ebs = spec.block_device_mappings.value().unwrap()[0]
            .ebs
            .value()
            .unwrap();
        assert_eq!(ebs.volume_size, Nullable::Value(50));
    }

    #[test]
    fn launch_spec_omits_unset_fields() {
        let spec = LaunchSpec {
            ocean_id: Nullable::Value("o-1".to_string()),
            image_id: Nullable::Null,
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&spec).unwrap(),
            json!({"oceanId": "o-1", "imageId": null})
        );
    }
}
