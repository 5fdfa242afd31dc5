use crate::sdk::oceancd::{
    AdditionalIngressAnnotation, Alb, Nginx, PingPong, RolloutSpec, Smi, StickinessConfig, Traffic,
};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::{FieldName, FieldRegistryBuilder, GenericField, ResourceType, Schema, SchemaMap};
use serde::{Deserialize, Serialize};

pub const OCEANCD_ROLLOUT_SPEC_TRAFFIC: ResourceType =
    ResourceType("oceancd_rollout_spec_traffic");

pub const TRAFFIC: FieldName = FieldName("traffic");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TrafficBlock {
    canary_service: Option<String>,
    stable_service: Option<String>,
    alb: Option<Vec<AlbBlock>>,
    nginx: Option<Vec<NginxBlock>>,
    smi: Option<Vec<SmiBlock>>,
    ping_pong: Option<Vec<PingPongBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AlbBlock {
    alb_ingress: Option<String>,
    alb_root_service: Option<String>,
    service_port: Option<i64>,
    alb_annotation_prefix: Option<String>,
    stickiness_config: Option<Vec<StickinessConfigBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct StickinessConfigBlock {
    enabled: Option<bool>,
    duration_seconds: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct NginxBlock {
    stable_ingress: Option<String>,
    nginx_annotation_prefix: Option<String>,
    additional_ingress_annotation: Option<Vec<AdditionalIngressAnnotationBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct AdditionalIngressAnnotationBlock {
    canary_by_header: Option<String>,
    key1: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SmiBlock {
    smi_root_service: Option<String>,
    traffic_split_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PingPongBlock {
    ping_service: Option<String>,
    pong_service: Option<String>,
}

fn single(schema: SchemaMap) -> Schema {
    Schema::block_list(schema).optional().max_items(1).build()
}

fn traffic_schema() -> Schema {
    let alb = block([
        ("alb_ingress", Schema::string().required().build()),
        ("alb_root_service", Schema::string().required().build()),
        ("service_port", Schema::int().required().build()),
        ("alb_annotation_prefix", Schema::string().optional().build()),
        (
            "stickiness_config",
            single(block([
                ("enabled", Schema::bool().optional().build()),
                ("duration_seconds", Schema::int().optional().build()),
            ])),
        ),
    ]);

    let nginx = block([
        ("stable_ingress", Schema::string().required().build()),
        ("nginx_annotation_prefix", Schema::string().optional().build()),
        (
            "additional_ingress_annotation",
            single(block([
                ("canary_by_header", Schema::string().optional().build()),
                ("key1", Schema::string().optional().build()),
            ])),
        ),
    ]);

    let smi = block([
        ("smi_root_service", Schema::string().optional().build()),
        ("traffic_split_name", Schema::string().optional().build()),
    ]);

    let ping_pong = block([
        ("ping_service", Schema::string().required().build()),
        ("pong_service", Schema::string().required().build()),
    ]);

    single(block([
        ("canary_service", Schema::string().optional().build()),
        ("stable_service", Schema::string().optional().build()),
        ("alb", single(alb)),
        ("nginx", single(nginx)),
        ("smi", single(smi)),
        ("ping_pong", single(ping_pong)),
    ]))
}

pub fn setup(fields: &mut FieldRegistryBuilder<RolloutSpec>) {
    fields.register(
        GenericField::new(OCEANCD_ROLLOUT_SPEC_TRAFFIC, TRAFFIC, traffic_schema())
            .on_read(|spec: &RolloutSpec, data| {
                let blocks: Vec<_> = spec.traffic.value().map(flatten_traffic).into_iter().collect();
                data.set_blocks(&TRAFFIC, blocks)
            })
            .on_create(|data, spec| {
                if let Some(traffic) = expand_traffic(data.decode(&TRAFFIC)?) {
                    spec.traffic = Nullable::Value(traffic);
                }
                Ok(())
            })
            .on_update(|data, spec| {
                spec.traffic = Nullable::or_null(expand_traffic(data.decode(&TRAFFIC)?));
                Ok(())
            }),
    );
}

fn first<T>(blocks: Option<Vec<T>>) -> Option<T> {
    blocks?.into_iter().next()
}

fn expand_traffic(blocks: Option<Vec<TrafficBlock>>) -> Option<Traffic> {
    let block = first(blocks)?;
    Some(Traffic {
        canary_service: Nullable::from_option(block.canary_service.filter(|s| !s.is_empty())),
        stable_service: Nullable::from_option(block.stable_service.filter(|s| !s.is_empty())),
        alb: Nullable::from_option(first(block.alb).map(|alb| Alb {
            ingress: Nullable::from_option(alb.alb_ingress),
            root_service: Nullable::from_option(alb.alb_root_service),
            service_port: Nullable::from_option(alb.service_port),
            annotation_prefix: Nullable::from_option(alb.alb_annotation_prefix),
            stickiness_config: Nullable::from_option(first(alb.stickiness_config).map(|s| {
                StickinessConfig {
                    enabled: Nullable::from_option(s.enabled),
                    duration_seconds: Nullable::from_option(s.duration_seconds),
                }
            })),
        })),
        nginx: Nullable::from_option(first(block.nginx).map(|nginx| Nginx {
            stable_ingress: Nullable::from_option(nginx.stable_ingress),
            annotation_prefix: Nullable::from_option(nginx.nginx_annotation_prefix),
            additional_ingress_annotation: Nullable::from_option(
                first(nginx.additional_ingress_annotation).map(|a| AdditionalIngressAnnotation {
                    canary_by_header: Nullable::from_option(a.canary_by_header),
                    key1: Nullable::from_option(a.key1),
                }),
            ),
        })),
        smi: Nullable::from_option(first(block.smi).map(|smi| Smi {
            root_service: Nullable::from_option(smi.smi_root_service),
            traffic_split_name: Nullable::from_option(smi.traffic_split_name),
        })),
        ping_pong: Nullable::from_option(first(block.ping_pong).map(|pp| PingPong {
            ping_service: Nullable::from_option(pp.ping_service),
            pong_service: Nullable::from_option(pp.pong_service),
        })),
    })
}

fn flatten_traffic(traffic: &Traffic) -> TrafficBlock {
    TrafficBlock {
        canary_service: traffic.canary_service.cloned(),
        stable_service: traffic.stable_service.cloned(),
        alb: traffic.alb.value().map(|alb| {
            vec![AlbBlock {
                alb_ingress: alb.ingress.cloned(),
                alb_root_service: alb.root_service.cloned(),
                service_port: alb.service_port.cloned(),
                alb_annotation_prefix: alb.annotation_prefix.cloned(),
                stickiness_config: alb.stickiness_config.value().map(|s| {
                    vec![StickinessConfigBlock {
                        enabled: s.enabled.cloned(),
                        duration_seconds: s.duration_seconds.cloned(),
                    }]
                }),
            }]
        }),
        nginx: traffic.nginx.value().map(|nginx| {
            vec![NginxBlock {
                stable_ingress: nginx.stable_ingress.cloned(),
                nginx_annotation_prefix: nginx.annotation_prefix.cloned(),
                additional_ingress_annotation: nginx.additional_ingress_annotation.value().map(
                    |a| {
                        vec![AdditionalIngressAnnotationBlock {
                            canary_by_header: a.canary_by_header.cloned(),
                            key1: a.key1.cloned(),
                        }]
                    },
                ),
            }]
        }),
        smi: traffic.smi.value().map(|smi| {
            vec![SmiBlock {
                smi_root_service: smi.root_service.cloned(),
                traffic_split_name: smi.traffic_split_name.cloned(),
            }]
        }),
        ping_pong: traffic.ping_pong.value().map(|pp| {
            vec![PingPongBlock {
                ping_service: pp.ping_service.cloned(),
                pong_service: pp.pong_service.cloned(),
            }]
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::oceancd_rollout_spec::registry;
    use commons::{Dynamic, ResourceData};
    use std::collections::HashMap;

    #[test]
    fn traffic_round_trips() {
        let traffic = Traffic {
            canary_service: Nullable::Value("web-canary".to_string()),
            stable_service: Nullable::Value("web-stable".to_string()),
            alb: Nullable::Value(Alb {
                ingress: Nullable::Value("web-ingress".to_string()),
                root_service: Nullable::Value("web".to_string()),
                service_port: Nullable::Value(8080),
                annotation_prefix: Nullable::Omitted,
                stickiness_config: Nullable::Value(StickinessConfig {
                    enabled: Nullable::Value(true),
                    duration_seconds: Nullable::Value(300),
                }),
            }),
            ping_pong: Nullable::Value(PingPong {
                ping_service: Nullable::Value("ping".to_string()),
                pong_service: Nullable::Value("pong".to_string()),
            }),
            ..Default::default()
        };
        let spec = RolloutSpec {
            traffic: Nullable::Value(traffic.clone()),
            ..Default::default()
        };

        let registry = registry();
        let mut state = ResourceData::new(registry.schema_map());
        registry.on_read(&spec, &mut state).unwrap();

        let mut rebuilt = RolloutSpec::default();
        registry.on_create(&state, &mut rebuilt).unwrap();
        assert_eq!(rebuilt.traffic, Nullable::Value(traffic));
    }

    #[test]
    fn removed_traffic_is_sent_as_null() {
        let registry = registry();
        let traffic = Dynamic::List(vec![Dynamic::Map(HashMap::from([(
            "canary_service".to_string(),
            Dynamic::from("web-canary"),
        )]))]);
        let prior = ResourceData::with_values(
            registry.schema_map(),
            HashMap::from([("traffic".to_string(), traffic)]),
        );
        let planned = ResourceData::new(registry.schema_map()).with_prior(&prior);

        let mut spec = RolloutSpec::default();
        assert!(registry.on_update(&planned, &mut spec).unwrap());
        assert!(spec.traffic.is_null());
    }

    #[test]
    fn nested_blocks_accept_one_item_only() {
        let smi = Dynamic::Map(HashMap::from([(
            "smi_root_service".to_string(),
            Dynamic::from("web"),
        )]));
        let traffic = Dynamic::List(vec![Dynamic::Map(HashMap::from([(
            "smi".to_string(),
            Dynamic::List(vec![smi.clone(), smi]),
        )]))]);
        let data = ResourceData::with_values(
            registry().schema_map(),
            HashMap::from([("traffic".to_string(), traffic)]),
        );

        let limits: Vec<_> = data
            .validate()
            .errors
            .into_iter()
            .map(|d| d.summary)
            .filter(|s| s.contains("items"))
            .collect();
        assert_eq!(limits, vec!["traffic[0].smi must have at most 1 items".to_string()]);
    }
}
