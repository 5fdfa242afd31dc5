//! Metrics of a verification template and their providers

use crate::sdk::oceancd::{
    CloudWatch, Container, Datadog, Job, JobSpec, JobTemplate, Metric, MetricDataQuery,
    MetricProvider, NewRelic, Prometheus, TemplateSpec, VerificationTemplate, Web, WebHeader,
};
use crate::sdk::Nullable;
use commons::schema::block;
use commons::validator::{OneOfValidator, StringPatternValidator};
use commons::{FieldName, FieldRegistryBuilder, GenericField, ResourceType, Schema, SchemaMap, ValueType};
use serde::{Deserialize, Serialize};

pub const OCEANCD_VERIFICATION_TEMPLATE_METRICS: ResourceType =
    ResourceType("oceancd_verification_template_metrics");

pub const METRICS: FieldName = FieldName("metrics");

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MetricBlock {
    metrics_name: Option<String>,
    dry_run: Option<bool>,
    interval: Option<String>,
    initial_delay: Option<String>,
    count: Option<i64>,
    success_condition: Option<String>,
    failure_condition: Option<String>,
    failure_limit: Option<i64>,
    consecutive_error_limit: Option<i64>,
    provider: Option<Vec<ProviderBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ProviderBlock {
    prometheus: Option<Vec<PrometheusBlock>>,
    datadog: Option<Vec<DatadogBlock>>,
    new_relic: Option<Vec<NewRelicBlock>>,
    cloud_watch: Option<Vec<CloudWatchBlock>>,
    web: Option<Vec<WebBlock>>,
    job: Option<Vec<JobBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct PrometheusBlock {
    prometheus_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct DatadogBlock {
    duration: Option<String>,
    datadog_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct NewRelicBlock {
    profile: Option<String>,
    new_relic_query: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct CloudWatchBlock {
    duration: Option<String>,
    metric_data_queries: Option<Vec<MetricDataQueryBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct MetricDataQueryBlock {
    id: Option<String>,
    expression: Option<String>,
    label: Option<String>,
    period: Option<i64>,
    return_data: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WebBlock {
    method: Option<String>,
    url: Option<String>,
    web_header: Option<Vec<WebHeaderBlock>>,
    body: Option<String>,
    timeout_seconds: Option<i64>,
    json_path: Option<String>,
    insecure: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct WebHeaderBlock {
    web_header_key: Option<String>,
    web_header_value: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct JobBlock {
    spec: Option<Vec<JobSpecBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct JobSpecBlock {
    backoff_limit: Option<i64>,
    job_template: Option<Vec<JobTemplateBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct JobTemplateBlock {
    template_spec: Option<Vec<TemplateSpecBlock>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct TemplateSpecBlock {
    containers: Option<Vec<ContainerBlock>>,
    restart_policy: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct ContainerBlock {
    container_name: Option<String>,
    command: Option<Vec<String>>,
    image: Option<String>,
}

fn single(schema: SchemaMap) -> Schema {
    Schema::block_list(schema).optional().max_items(1).build()
}

fn duration() -> Schema {
    Schema::string()
        .optional()
        .validator(StringPatternValidator::new(
            r"^\d+[smh]$",
            "a duration such as 30s, 5m or 1h",
        ))
        .build()
}

fn provider_schema() -> SchemaMap {
    let cloud_watch = block([
        ("duration", duration()),
        (
            "metric_data_queries",
            Schema::block_list(block([
                ("id", Schema::string().required().build()),
                ("expression", Schema::string().optional().build()),
                ("label", Schema::string().optional().build()),
                ("period", Schema::int().optional().build()),
                ("return_data", Schema::bool().optional().build()),
            ]))
            .required()
            .build(),
        ),
    ]);

    let web = block([
        (
            "method",
            Schema::string()
                .optional()
                .validator(OneOfValidator::new(&["GET", "POST", "PUT"]))
                .build(),
        ),
        ("url", Schema::string().required().build()),
        (
            "web_header",
            Schema::block_list(block([
                ("web_header_key", Schema::string().required().build()),
                ("web_header_value", Schema::string().required().build()),
            ]))
            .optional()
            .build(),
        ),
        ("body", Schema::string().optional().build()),
        ("timeout_seconds", Schema::int().optional().build()),
        ("json_path", Schema::string().required().build()),
        ("insecure", Schema::bool().optional().build()),
    ]);

    let template_spec = block([
        (
            "containers",
            Schema::block_list(block([
                ("container_name", Schema::string().required().build()),
                ("command", Schema::list_of(ValueType::String).required().build()),
                ("image", Schema::string().required().build()),
            ]))
            .required()
            .build(),
        ),
        ("restart_policy", Schema::string().required().build()),
    ]);

    let job = block([(
        "spec",
        single(block([
            ("backoff_limit", Schema::int().optional().build()),
            (
                "job_template",
                single(block([("template_spec", single(template_spec))])),
            ),
        ])),
    )]);

    block([
        (
            "prometheus",
            single(block([("prometheus_query", Schema::string().required().build())])),
        ),
        (
            "datadog",
            single(block([
                ("duration", duration()),
                ("datadog_query", Schema::string().optional().build()),
            ])),
        ),
        (
            "new_relic",
            single(block([
                ("profile", Schema::string().optional().build()),
                ("new_relic_query", Schema::string().required().build()),
            ])),
        ),
        ("cloud_watch", single(cloud_watch)),
        ("web", single(web)),
        ("job", single(job)),
    ])
}

fn metrics_schema() -> Schema {
    Schema::block_list(block([
        ("metrics_name", Schema::string().required().build()),
        ("dry_run", Schema::bool().optional().build()),
        ("interval", duration()),
        ("initial_delay", duration()),
        ("count", Schema::int().optional().build()),
        ("success_condition", Schema::string().optional().build()),
        ("failure_condition", Schema::string().optional().build()),
        ("failure_limit", Schema::int().optional().build()),
        ("consecutive_error_limit", Schema::int().optional().build()),
        (
            "provider",
            Schema::block_list(provider_schema())
                .required()
                .min_items(1)
                .max_items(1)
                .build(),
        ),
    ]))
    .optional()
    .build()
}

pub fn setup(fields: &mut FieldRegistryBuilder<VerificationTemplate>) {
    fields.register(
        GenericField::new(OCEANCD_VERIFICATION_TEMPLATE_METRICS, METRICS, metrics_schema())
            .on_read(|template: &VerificationTemplate, data| {
                let metrics = template
                    .metrics
                    .value()
                    .map(|m| flatten_metrics(m))
                    .unwrap_or_default();
                data.set_blocks(&METRICS, metrics)
            })
            .on_create(|data, template| {
                if let Some(metrics) = data.decode(&METRICS)? {
                    template.metrics = Nullable::Value(expand_metrics(metrics));
                }
                Ok(())
            })
            .on_update(|data, template| {
                template.metrics = Nullable::or_null(data.decode(&METRICS)?.map(expand_metrics));
                Ok(())
            }),
    );
}

fn first<T>(blocks: Option<Vec<T>>) -> Option<T> {
    blocks?.into_iter().next()
}

fn one<T>(value: Option<T>) -> Option<Vec<T>> {
    value.map(|v| vec![v])
}

fn non_empty(value: Option<String>) -> Nullable<String> {
    Nullable::from_option(value.filter(|s| !s.is_empty()))
}

fn expand_metrics(blocks: Vec<MetricBlock>) -> Vec<Metric> {
    blocks.into_iter().map(expand_metric).collect()
}

fn expand_metric(block: MetricBlock) -> Metric {
    Metric {
        name: non_empty(block.metrics_name),
        dry_run: Nullable::from_option(block.dry_run),
        interval: non_empty(block.interval),
        initial_delay: non_empty(block.initial_delay),
        count: Nullable::from_option(block.count),
        success_condition: non_empty(block.success_condition),
        failure_condition: non_empty(block.failure_condition),
        failure_limit: Nullable::from_option(block.failure_limit),
        consecutive_error_limit: Nullable::from_option(block.consecutive_error_limit),
        provider: Nullable::from_option(first(block.provider).map(expand_provider)),
    }
}

fn expand_provider(block: ProviderBlock) -> MetricProvider {
    MetricProvider {
        prometheus: Nullable::from_option(first(block.prometheus).map(|p| Prometheus {
            query: non_empty(p.prometheus_query),
        })),
        datadog: Nullable::from_option(first(block.datadog).map(|d| Datadog {
            duration: non_empty(d.duration),
            query: non_empty(d.datadog_query),
        })),
        new_relic: Nullable::from_option(first(block.new_relic).map(|n| NewRelic {
            profile: non_empty(n.profile),
            query: non_empty(n.new_relic_query),
        })),
        cloud_watch: Nullable::from_option(first(block.cloud_watch).map(|c| CloudWatch {
            duration: non_empty(c.duration),
            metric_data_queries: Nullable::from_option(c.metric_data_queries.map(|queries| {
                queries
                    .into_iter()
                    .map(|q| MetricDataQuery {
                        id: non_empty(q.id),
                        expression: non_empty(q.expression),
                        label: non_empty(q.label),
                        period: Nullable::from_option(q.period),
                        return_data: Nullable::from_option(q.return_data),
                    })
                    .collect()
            })),
        })),
        web: Nullable::from_option(first(block.web).map(expand_web)),
        job: Nullable::from_option(first(block.job).map(expand_job)),
    }
}

fn expand_web(block: WebBlock) -> Web {
    Web {
        method: non_empty(block.method),
        url: non_empty(block.url),
        headers: Nullable::from_option(block.web_header.map(|headers| {
            headers
                .into_iter()
                .map(|h| WebHeader {
                    key: non_empty(h.web_header_key),
                    value: Nullable::from_option(h.web_header_value),
                })
                .collect()
        })),
        body: non_empty(block.body),
        timeout_seconds: Nullable::from_option(block.timeout_seconds),
        json_path: non_empty(block.json_path),
        insecure: Nullable::from_option(block.insecure),
    }
}

fn expand_job(block: JobBlock) -> Job {
    Job {
        spec: Nullable::from_option(first(block.spec).map(|spec| JobSpec {
            backoff_limit: Nullable::from_option(spec.backoff_limit),
            template: Nullable::from_option(first(spec.job_template).map(|template| {
                JobTemplate {
                    spec: Nullable::from_option(first(template.template_spec).map(|ts| {
                        TemplateSpec {
                            containers: Nullable::from_option(ts.containers.map(|containers| {
                                containers
                                    .into_iter()
                                    .map(|c| Container {
                                        name: non_empty(c.container_name),
                                        command: Nullable::from_option(c.command),
                                        image: non_empty(c.image),
                                    })
                                    .collect()
                            })),
                            restart_policy: non_empty(ts.restart_policy),
                        }
                    })),
                }
            })),
        })),
    }
}

fn flatten_metrics(metrics: &[Metric]) -> Vec<MetricBlock> {
    metrics
        .iter()
        .map(|metric| MetricBlock {
            metrics_name: metric.name.cloned(),
            dry_run: metric.dry_run.cloned(),
            interval: metric.interval.cloned(),
            initial_delay: metric.initial_delay.cloned(),
            count: metric.count.cloned(),
            success_condition: metric.success_condition.cloned(),
            failure_condition: metric.failure_condition.cloned(),
            failure_limit: metric.failure_limit.cloned(),
            consecutive_error_limit: metric.consecutive_error_limit.cloned(),
            provider: one(metric.provider.value().map(flatten_provider)),
        })
        .collect()
}

fn flatten_provider(provider: &MetricProvider) -> ProviderBlock {
    ProviderBlock {
        prometheus: one(provider.prometheus.value().map(|p| PrometheusBlock {
            prometheus_query: p.query.cloned(),
        })),
        datadog: one(provider.datadog.value().map(|d| DatadogBlock {
            duration: d.duration.cloned(),
            datadog_query: d.query.cloned(),
        })),
        new_relic: one(provider.new_relic.value().map(|n| NewRelicBlock {
            profile: n.profile.cloned(),
            new_relic_query: n.query.cloned(),
        })),
        cloud_watch: one(provider.cloud_watch.value().map(|c| CloudWatchBlock {
            duration: c.duration.cloned(),
            metric_data_queries: c.metric_data_queries.value().map(|queries| {
                queries
                    .iter()
                    .map(|q| MetricDataQueryBlock {
                        id: q.id.cloned(),
                        expression: q.expression.cloned(),
                        label: q.label.cloned(),
                        period: q.period.cloned(),
                        return_data: q.return_data.cloned(),
                    })
                    .collect()
            }),
        })),
        web: one(provider.web.value().map(flatten_web)),
        job: one(provider.job.value().map(flatten_job)),
    }
}

fn flatten_web(web: &Web) -> WebBlock {
    WebBlock {
        method: web.method.cloned(),
        url: web.url.cloned(),
        web_header: web.headers.value().map(|headers| {
            headers
                .iter()
                .map(|h| WebHeaderBlock {
                    web_header_key: h.key.cloned(),
                    web_header_value: h.value.cloned(),
                })
                .collect()
        }),
        body: web.body.cloned(),
        timeout_seconds: web.timeout_seconds.cloned(),
        json_path: web.json_path.cloned(),
        insecure: web.insecure.cloned(),
    }
}

fn flatten_job(job: &Job) -> JobBlock {
    JobBlock {
        spec: one(job.spec.value().map(|spec| JobSpecBlock {
            backoff_limit: spec.backoff_limit.cloned(),
            job_template: one(spec.template.value().map(|template| JobTemplateBlock {
                template_spec: one(template.spec.value().map(|ts| TemplateSpecBlock {
                    containers: ts.containers.value().map(|containers| {
                        containers
                            .iter()
                            .map(|c| ContainerBlock {
                                container_name: c.name.cloned(),
                                command: c.command.cloned(),
                                image: c.image.cloned(),
                            })
                            .collect()
                    }),
                    restart_policy: ts.restart_policy.cloned(),
                })),
            })),
        })),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::oceancd_verification_template::registry;
    use commons::{Dynamic, ResourceData};
    use std::collections::HashMap;

    fn read(template: &VerificationTemplate) -> ResourceData {
        let registry = registry();
        let mut data = ResourceData::new(registry.schema_map());
        registry.on_read(template, &mut data).unwrap();
        data
    }

    fn metric(provider: MetricProvider) -> Metric {
        Metric {
            name: Nullable::Value("error-rate".to_string()),
            interval: Nullable::Value("30s".to_string()),
            count: Nullable::Value(10),
            failure_limit: Nullable::Value(2),
            success_condition: Nullable::Value("result[0] < 0.05".to_string()),
            provider: Nullable::Value(provider),
            ..Default::default()
        }
    }

    #[test]
    fn count_and_failure_limit_stay_separate() {
        let template = VerificationTemplate {
            metrics: Nullable::Value(vec![metric(MetricProvider {
                prometheus: Nullable::Value(Prometheus {
                    query: Nullable::Value("sum(rate(errors[5m]))".to_string()),
                }),
                ..Default::default()
            })]),
            ..Default::default()
        };

        let state = read(&template);
        let metrics = state.get(&METRICS).unwrap();
        let first = metrics.as_list().unwrap()[0].as_map().unwrap().clone();
        assert_eq!(first["count"], Dynamic::from(10i64));
        assert_eq!(first["failure_limit"], Dynamic::from(2i64));

        let mut rebuilt = VerificationTemplate::default();
        registry().on_create(&state, &mut rebuilt).unwrap();
        assert_eq!(rebuilt.metrics, template.metrics);
    }

    #[test]
    fn job_and_web_providers_round_trip() {
        let job = Job {
            spec: Nullable::Value(JobSpec {
                backoff_limit: Nullable::Value(1),
                template: Nullable::Value(JobTemplate {
                    spec: Nullable::Value(TemplateSpec {
                        containers: Nullable::Value(vec![Container {
                            name: Nullable::Value("check".to_string()),
                            command: Nullable::Value(vec!["sh".to_string(), "-c".to_string()]),
                            image: Nullable::Value("busybox".to_string()),
                        }]),
                        restart_policy: Nullable::Value("Never".to_string()),
                    }),
                }),
            }),
        };
        let web = Web {
            method: Nullable::Value("GET".to_string()),
            url: Nullable::Value("https://status.example.com".to_string()),
            headers: Nullable::Value(vec![WebHeader {
                key: Nullable::Value("Accept".to_string()),
                value: Nullable::Value("application/json".to_string()),
            }]),
            json_path: Nullable::Value("{$.ok}".to_string()),
            timeout_seconds: Nullable::Value(20),
            ..Default::default()
        };
        let template = VerificationTemplate {
            metrics: Nullable::Value(vec![
                metric(MetricProvider {
                    job: Nullable::Value(job),
                    ..Default::default()
                }),
                metric(MetricProvider {
                    web: Nullable::Value(web),
                    ..Default::default()
                }),
            ]),
            ..Default::default()
        };

        let state = read(&template);
        let mut rebuilt = VerificationTemplate::default();
        registry().on_create(&state, &mut rebuilt).unwrap();
        assert_eq!(rebuilt.metrics, template.metrics);
    }

    #[test]
    fn durations_are_validated() {
        let provider = Dynamic::Map(HashMap::from([(
            "prometheus".to_string(),
            Dynamic::List(vec![Dynamic::Map(HashMap::from([(
                "prometheus_query".to_string(),
                Dynamic::from("up"),
            )]))]),
        )]));
        let metric = Dynamic::Map(HashMap::from([
            ("metrics_name".to_string(), Dynamic::from("up")),
            ("interval".to_string(), Dynamic::from("5 minutes")),
            ("initial_delay".to_string(), Dynamic::from("1m")),
            ("provider".to_string(), Dynamic::List(vec![provider])),
        ]));
        let data = ResourceData::with_values(
            registry().schema_map(),
            HashMap::from([
                ("name".to_string(), Dynamic::from("up-check")),
                ("metrics".to_string(), Dynamic::List(vec![metric])),
            ]),
        );

        let diags = data.validate();
        assert_eq!(diags.errors.len(), 1);
        assert!(diags.errors[0].summary.starts_with("metrics[0].interval"));
    }

    #[test]
    fn provider_must_be_a_single_block() {
        let prometheus = Dynamic::Map(HashMap::from([(
            "prometheus".to_string(),
            Dynamic::List(vec![Dynamic::Map(HashMap::from([(
                "prometheus_query".to_string(),
                Dynamic::from("up"),
            )]))]),
        )]));
        let with_providers = |providers: Vec<Dynamic>| {
            let metric = Dynamic::Map(HashMap::from([
                ("metrics_name".to_string(), Dynamic::from("up")),
                ("provider".to_string(), Dynamic::List(providers)),
            ]));
            ResourceData::with_values(
                registry().schema_map(),
                HashMap::from([
                    ("name".to_string(), Dynamic::from("up-check")),
                    ("metrics".to_string(), Dynamic::List(vec![metric])),
                ]),
            )
            .validate()
        };

        assert!(!with_providers(vec![prometheus.clone()]).has_errors());

        let none = with_providers(vec![]);
        assert_eq!(none.errors.len(), 1);
        assert_eq!(none.errors[0].summary, "metrics[0].provider must have at least 1 items");

        let two = with_providers(vec![prometheus.clone(), prometheus]);
        assert_eq!(two.errors.len(), 1);
        assert_eq!(two.errors[0].summary, "metrics[0].provider must have at most 1 items");
    }
}
