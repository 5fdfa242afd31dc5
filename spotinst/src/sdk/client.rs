use reqwest::{Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use url::Url;

use super::error::{ApiError, ErrorEnvelope};
use super::ApiResource;

pub const DEFAULT_BASE_URL: &str = "https://api.spotinst.io";

/// Spotinst API client
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http_client: reqwest::Client,
    base_url: Url,
    token: String,
    account: Option<String>,
}

/// Success body: `{"response":{"items":[...]}}`
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    response: ResponseBody<T>,
}

#[derive(Debug, Deserialize)]
struct ResponseBody<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

impl Client {
    pub fn new(base_url: &str, token: &str, account: Option<&str>) -> Result<Self, ApiError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("terraform-provider-spotinst/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(ClientInner {
                http_client,
                base_url,
                token: token.to_string(),
                account: account.map(str::to_string),
            }),
        })
    }

    pub fn account(&self) -> Option<&str> {
        self.inner.account.as_deref()
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.join(path)?;
        if let Some(account) = &self.inner.account {
            url.query_pairs_mut().append_pair("accountId", account);
        }
        Ok(url)
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.url(path)?;
        tracing::debug!("{} request to: {}", method, url);

        Ok(self
            .inner
            .http_client
            .request(method, url)
            .bearer_auth(&self.inner.token))
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let request = self.request(Method::GET, path)?;
        self.execute(request, path).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<T>, ApiError> {
        let request = self.request(Method::POST, path)?.json(body);
        self.execute(request, path).await
    }

    pub async fn put<T: DeserializeOwned, B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Vec<T>, ApiError> {
        let request = self.request(Method::PUT, path)?.json(body);
        self.execute(request, path).await
    }

    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.request(Method::DELETE, path)?;
        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::error_from(response, path).await)
    }

    pub async fn list<R: ApiResource>(&self) -> Result<Vec<R>, ApiError> {
        self.get(R::PATH).await
    }

    pub async fn create<R: ApiResource>(&self, resource: &R) -> Result<R, ApiError> {
        let body = Self::envelope::<R>(resource)?;
        let items = self.post(R::PATH, &body).await?;
        first_item(items, R::PATH)
    }

    pub async fn read<R: ApiResource>(&self, id: &str) -> Result<R, ApiError> {
        let path = R::resource_path(id);
        let items = self.get(&path).await?;
        items
            .into_iter()
            .next()
            .ok_or(ApiError::NotFound(path))
    }

    pub async fn update<R: ApiResource>(&self, id: &str, resource: &R) -> Result<R, ApiError> {
        let path = R::resource_path(id);
        let body = Self::envelope::<R>(resource)?;
        let items = self.put(&path, &body).await?;
        first_item(items, &path)
    }

    pub async fn delete_resource<R: ApiResource>(&self, id: &str) -> Result<(), ApiError> {
        self.delete(&R::resource_path(id)).await
    }

    /// Wraps the object under the resource's envelope key, e.g. `{"cluster": {...}}`
    fn envelope<R: ApiResource>(resource: &R) -> Result<serde_json::Value, ApiError> {
        let value = serde_json::to_value(resource)
            .map_err(|e| ApiError::Parse(format!("Failed to encode request: {}", e)))?;
        let mut body = serde_json::Map::new();
        body.insert(R::ENVELOPE.to_string(), value);
        Ok(serde_json::Value::Object(body))
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
    ) -> Result<Vec<T>, ApiError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from(response, path).await);
        }

        let text = response.text().await?;
        tracing::debug!("API response body: {}", text);

        serde_json::from_str::<ApiResponse<T>>(&text)
            .map(|wrapper| wrapper.response.items)
            .map_err(|e| {
                tracing::error!("Failed to deserialize response: {}, body: {}", e, text);
                ApiError::Parse(format!("Failed to parse response: {}", e))
            })
    }

    async fn error_from(response: reqwest::Response, path: &str) -> ApiError {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        let first = serde_json::from_str::<ErrorEnvelope>(&text)
            .ok()
            .and_then(|envelope| envelope.response.errors.into_iter().next());

        if status == StatusCode::NOT_FOUND || first.as_ref().is_some_and(|e| e.is_not_found()) {
            return ApiError::NotFound(path.to_string());
        }

        match first {
            Some(item) => ApiError::Api {
                status: status.as_u16(),
                code: item.code,
                message: item.message,
            },
            None => ApiError::Api {
                status: status.as_u16(),
                code: String::new(),
                message: text,
            },
        }
    }
}

fn first_item<R>(items: Vec<R>, path: &str) -> Result<R, ApiError> {
    items
        .into_iter()
        .next()
        .ok_or_else(|| ApiError::EmptyResponse(path.to_string()))
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)]
mod tests {
    use super::*;
    use crate::sdk::ocean::aws::Cluster;
    use crate::sdk::Nullable;
    use mockito::{Matcher, Server};

    #[tokio::test]
    async fn read_sends_token_and_account() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/ocean/aws/k8s/cluster/o-123")
            .match_query(Matcher::UrlEncoded("accountId".into(), "act-1".into()))
            .match_header("authorization", "Bearer secret")
            .with_body(r#"{"response":{"items":[{"id":"o-123","name":"prod","region":"us-west-2"}]}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret", Some("act-1")).unwrap();
        let cluster: Cluster = client.read("o-123").await.unwrap();

        mock.assert_async().await;
        assert_eq!(cluster.id.value().map(String::as_str), Some("o-123"));
        assert_eq!(cluster.name, Nullable::Value("prod".to_string()));
    }

    #[tokio::test]
    async fn create_wraps_body_in_envelope() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/ocean/aws/k8s/cluster")
            .match_body(Matcher::PartialJson(
                serde_json::json!({"cluster": {"name": "prod"}}),
            ))
            .with_body(r#"{"response":{"items":[{"id":"o-1","name":"prod"}]}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret", None).unwrap();
        let cluster = Cluster {
            name: Nullable::Value("prod".to_string()),
            ..Default::default()
        };
        let created = client.create(&cluster).await.unwrap();

        mock.assert_async().await;
        assert_eq!(created.id, Nullable::Value("o-1".to_string()));
    }

    #[tokio::test]
    async fn api_errors_are_decoded() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", "/ocean/aws/k8s/cluster/o-1")
            .with_status(400)
            .with_body(
                r#"{"response":{"errors":[{"code":"VALIDATION_FAILED","message":"bad capacity"}]}}"#,
            )
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret", None).unwrap();
        let err = client
            .update("o-1", &Cluster::default())
            .await
            .unwrap_err();

        match err {
            ApiError::Api {
                status,
                code,
                message,
            } => {
                assert_eq!(status, 400);
                assert_eq!(code, "VALIDATION_FAILED");
                assert_eq!(message, "bad capacity");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn missing_objects_map_to_not_found() {
        let mut server = Server::new_async().await;
        let _gone = server
            .mock("GET", "/ocean/aws/k8s/cluster/o-gone")
            .with_status(400)
            .with_body(r#"{"response":{"errors":[{"code":"CLUSTER_DOESNT_EXIST","message":"no such cluster"}]}}"#)
            .create_async()
            .await;
        let _deleted = server
            .mock("DELETE", "/ocean/aws/k8s/cluster/o-404")
            .with_status(404)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret", None).unwrap();
        assert!(client
            .read::<Cluster>("o-gone")
            .await
            .unwrap_err()
            .is_not_found());
        assert!(client
            .delete_resource::<Cluster>("o-404")
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn empty_item_list_is_an_error_on_create() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/ocean/aws/k8s/cluster")
            .with_body(r#"{"response":{"items":[]}}"#)
            .create_async()
            .await;

        let client = Client::new(&server.url(), "secret", None).unwrap();
        let err = client.create(&Cluster::default()).await.unwrap_err();
        assert!(matches!(err, ApiError::EmptyResponse(_)));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            Client::new("not a url", "secret", None),
            Err(ApiError::InvalidUrl(_))
        ));
    }
}
