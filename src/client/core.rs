// File: src/client/core.rs
use crate::client::auth::{ApiKeyAuthLayer, ApiKeyAuthService};
use crate::client::middleware::{DefaultHeadersLayer, DefaultHeadersService};
use crate::client::multipart::MultipartForm;
use crate::client::retry::{RetryPolicy, parse_retry_after};
use crate::client::types::{
    AttachmentInfo, Board, BoardLabel, BoardList, BoardMember, Checklist, CreatedCard,
    FileUpload, NewCard,
};
use crate::client::BoardApi;
use crate::error::ApiError;

use async_trait::async_trait;
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Uri};
use http_body_util::{BodyExt, Full};
use hyper_rustls::HttpsConnectorBuilder;
use hyper_util::client::legacy::Client;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tower::{ServiceBuilder, ServiceExt};

pub const DEFAULT_API_BASE_URL: &str = "https://api.trello.com/1";

type HttpsClient = Client<hyper_rustls::HttpsConnector<HttpConnector>, Full<Bytes>>;
type BoardService = DefaultHeadersService<ApiKeyAuthService<HttpsClient>>;

/// Everything needed to talk to the board service.
#[derive(Clone, Debug)]
pub struct ClientSettings {
    pub base_url: String,
    pub api_key: String,
    pub api_token: String,
    pub user_agent: String,
    pub retry: RetryPolicy,
}

impl ClientSettings {
    pub fn new(api_key: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            api_token: api_token.into(),
            user_agent: format!("docboard/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
        }
    }
}

/// A request that can be rebuilt for every retry attempt.
struct PreparedRequest {
    method: Method,
    path: String,
    content_type: Option<String>,
    body: Bytes,
}

impl PreparedRequest {
    fn get(path: String) -> Self {
        Self {
            method: Method::GET,
            path,
            content_type: None,
            body: Bytes::new(),
        }
    }

    fn post_json(path: String, body: &impl Serialize) -> Result<Self, ApiError> {
        let body = serde_json::to_vec(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        Ok(Self {
            method: Method::POST,
            path,
            content_type: Some("application/json".to_string()),
            body: Bytes::from(body),
        })
    }

    fn to_request(&self, base_url: &str) -> Result<Request<Full<Bytes>>, ApiError> {
        let uri: Uri = format!("{}{}", base_url, self.path)
            .parse()
            .map_err(|e: http::uri::InvalidUri| ApiError::InvalidRequest(e.to_string()))?;
        let mut builder = Request::builder().method(self.method.clone()).uri(uri);
        if let Some(ct) = &self.content_type {
            builder = builder.header(CONTENT_TYPE, ct.as_str());
        }
        builder
            .body(Full::new(self.body.clone()))
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))
    }
}

/// Identifiers are interpolated into paths, so only accept URL-safe ones.
fn segment(id: &str) -> Result<&str, ApiError> {
    if !id.is_empty()
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        Ok(id)
    } else {
        Err(ApiError::InvalidRequest(format!("invalid identifier '{}'", id)))
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

fn build_tls_config() -> rustls::ClientConfig {
    let mut root_store = rustls::RootCertStore::empty();
    let result = rustls_native_certs::load_native_certs();
    for err in &result.errors {
        log::debug!("Skipping unreadable system certificate: {}", err);
    }
    root_store.add_parsable_certificates(result.certs);
    if root_store.is_empty() {
        log::warn!("No system certificates found; using the bundled Mozilla root store");
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    }
    rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth()
}

#[derive(Clone, Debug)]
pub struct BoardClient {
    service: BoardService,
    base_url: String,
    retry: RetryPolicy,
}

impl BoardClient {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        base_url
            .parse::<Uri>()
            .map_err(|e| ApiError::InvalidRequest(format!("invalid API base URL: {}", e)))?;

        let https_connector = HttpsConnectorBuilder::new()
            .with_tls_config(build_tls_config())
            .https_or_http()
            .enable_http1()
            .build();
        let http_client: HttpsClient =
            Client::builder(TokioExecutor::new()).build(https_connector);

        let service = ServiceBuilder::new()
            .layer(DefaultHeadersLayer::new(&settings.user_agent))
            .layer(ApiKeyAuthLayer::new(&settings.api_key, &settings.api_token)?)
            .service(http_client);

        Ok(Self {
            service,
            base_url,
            retry: settings.retry,
        })
    }

    async fn execute_once(&self, prepared: &PreparedRequest) -> Result<Bytes, ApiError> {
        let request = prepared.to_request(&self.base_url)?;
        let response = self.service.clone().oneshot(request).await.map_err(|e| {
            if e.is_connect() {
                ApiError::Connect(error_chain(&e))
            } else {
                ApiError::Transport(error_chain(&e))
            }
        })?;

        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let body = response
            .into_body()
            .collect()
            .await
            .map_err(|e| ApiError::Transport(error_chain(&e)))?
            .to_bytes();

        if status.is_success() {
            Ok(body)
        } else {
            let text = String::from_utf8_lossy(&body).trim().to_string();
            Err(ApiError::from_status(status.as_u16(), text, retry_after))
        }
    }

    async fn execute(&self, prepared: PreparedRequest) -> Result<Bytes, ApiError> {
        let mut attempt = 0;
        loop {
            match self.execute_once(&prepared).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    let Some(delay) = self.retry.next_delay(&prepared.method, &err, attempt)
                    else {
                        return Err(err);
                    };
                    attempt += 1;
                    log::warn!(
                        "{} {} failed ({}); retry {}/{} in {:?}",
                        prepared.method,
                        prepared.path,
                        err,
                        attempt,
                        self.retry.max_retries,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, prepared: PreparedRequest) -> Result<T, ApiError> {
        log::debug!("{} {}", prepared.method, prepared.path);
        let body = self.execute(prepared).await?;
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

#[async_trait]
impl BoardApi for BoardClient {
    async fn get_board(&self, board_ref: &str) -> Result<Board, ApiError> {
        let path = format!("/boards/{}", segment(board_ref)?);
        self.send_json(PreparedRequest::get(path)).await
    }

    async fn get_lists(&self, board_id: &str) -> Result<Vec<BoardList>, ApiError> {
        let path = format!("/boards/{}/lists", segment(board_id)?);
        self.send_json(PreparedRequest::get(path)).await
    }

    async fn get_labels(&self, board_id: &str) -> Result<Vec<BoardLabel>, ApiError> {
        let path = format!("/boards/{}/labels", segment(board_id)?);
        self.send_json(PreparedRequest::get(path)).await
    }

    async fn get_members(&self, board_id: &str) -> Result<Vec<BoardMember>, ApiError> {
        let path = format!("/boards/{}/members", segment(board_id)?);
        self.send_json(PreparedRequest::get(path)).await
    }

    async fn create_card(&self, card: &NewCard) -> Result<CreatedCard, ApiError> {
        let prepared = PreparedRequest::post_json("/cards".to_string(), card)?;
        self.send_json(prepared).await
    }

    async fn create_checklist(&self, card_id: &str, name: &str) -> Result<Checklist, ApiError> {
        let path = format!("/cards/{}/checklists", segment(card_id)?);
        let prepared = PreparedRequest::post_json(path, &json!({ "name": name }))?;
        self.send_json(prepared).await
    }

    async fn add_checklist_item(&self, checklist_id: &str, name: &str) -> Result<(), ApiError> {
        let path = format!("/checklists/{}/checkItems", segment(checklist_id)?);
        let prepared = PreparedRequest::post_json(path, &json!({ "name": name }))?;
        self.execute(prepared).await.map(|_| ())
    }

    async fn attach_url(
        &self,
        card_id: &str,
        url: &str,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError> {
        let path = format!("/cards/{}/attachments", segment(card_id)?);
        let prepared = PreparedRequest::post_json(
            path,
            &json!({ "url": url, "setCover": set_cover }),
        )?;
        self.send_json(prepared).await
    }

    async fn upload_file(
        &self,
        card_id: &str,
        file: FileUpload,
        set_cover: bool,
    ) -> Result<AttachmentInfo, ApiError> {
        let path = format!("/cards/{}/attachments", segment(card_id)?);
        let (content_type, body) = MultipartForm::new()
            .text("name", &file.file_name)
            .text("setCover", if set_cover { "true" } else { "false" })
            .file("file", &file.file_name, &file.contents)
            .finish();
        let prepared = PreparedRequest {
            method: Method::POST,
            path,
            content_type: Some(content_type),
            body,
        };
        self.send_json(prepared).await
    }
}
