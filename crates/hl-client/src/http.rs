use crate::endpoints;
use crate::response::{RefreshResponse, classify, decode_body, decode_items};
use async_trait::async_trait;
use hl_core::api::{ChatApi, DirectoryApi, RequestApi};
use hl_core::types::{
    ApplyInput, Chat, ChatId, ContractorProfile, CreateHireRequest, Job, JobId, LabourProfile,
    ListingKind, Message, RequestId, RequestKind, RequestRecord, RequestStatus, SendMessageInput,
};
use hl_core::{ApiError, CacheError, SessionCache};
use hl_events::{AppEvent, EventBus, EventSource};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout: Duration,
}

/// Bearer-authenticated JSON client for the marketplace backend.
///
/// A 401 triggers one token refresh and a replay of the request. If the
/// refresh fails or the replay is also rejected, the session is cleared and
/// [`AppEvent::SessionExpired`] is published.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
    session: SessionCache,
    bus: EventBus,
    refresh_lock: Arc<tokio::sync::Mutex<()>>,
}

fn network(err: &reqwest::Error) -> ApiError {
    ApiError::Network {
        message: err.to_string(),
    }
}

fn cache_failure(err: &CacheError) -> ApiError {
    ApiError::Network {
        message: format!("session cache unavailable: {err}"),
    }
}

impl HttpApi {
    pub fn new(config: &HttpConfig, session: SessionCache, bus: EventBus) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|err| network(&err))?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            session,
            bus,
            refresh_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send::<(), T>(Method::GET, path, None).await
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        let items: Vec<serde_json::Value> = self.get(path).await?;
        Ok(decode_items(items))
    }

    async fn send<B, T>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let token = self.session.access_token().map_err(|err| cache_failure(&err))?;
        let (status, text) = self.dispatch(&method, path, body, token.as_deref()).await?;
        if status != StatusCode::UNAUTHORIZED {
            return finish(status, &text);
        }

        warn!(%method, path, "unauthorized, refreshing access token");
        let Some(fresh) = self.refresh_access_token(token.as_deref()).await else {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        };
        let (status, text) = self.dispatch(&method, path, body, Some(&fresh)).await?;
        if status == StatusCode::UNAUTHORIZED {
            self.expire_session();
            return Err(ApiError::SessionExpired);
        }
        finish(status, &text)
    }

    async fn dispatch<B>(
        &self,
        method: &Method,
        path: &str,
        body: Option<&B>,
        token: Option<&str>,
    ) -> Result<(StatusCode, String), ApiError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|err| network(&err))?;
        let status = response.status();
        let text = response.text().await.map_err(|err| network(&err))?;
        debug!(%method, path, status = status.as_u16(), "backend responded");
        Ok((status, text))
    }

    /// Returns the new access token, or `None` when the session cannot be
    /// renewed. Concurrent 401s share one refresh: a caller that waited on
    /// the lock reuses a token another caller already stored.
    async fn refresh_access_token(&self, rejected: Option<&str>) -> Option<String> {
        let _guard = self.refresh_lock.lock().await;
        let current = self.session.access_token().ok().flatten();
        if current.is_some() && current.as_deref() != rejected {
            return current;
        }

        let refresh_token = self.session.refresh_token().ok().flatten()?;
        let body = json!({ "refreshToken": refresh_token });
        let (status, text) = self
            .dispatch(&Method::POST, endpoints::REFRESH, Some(&body), None)
            .await
            .ok()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "token refresh rejected");
            return None;
        }
        let refreshed: RefreshResponse = match decode_body(&text) {
            Ok(refreshed) => refreshed,
            Err(err) => {
                warn!(%err, "token refresh returned an unreadable body");
                return None;
            }
        };
        if let Err(err) = self
            .session
            .set_tokens(&refreshed.access_token, refreshed.refresh_token.as_deref())
        {
            warn!(%err, "failed to store refreshed token");
        }
        info!("access token refreshed");
        Some(refreshed.access_token)
    }

    fn expire_session(&self) {
        if let Err(err) = self.session.clear_session() {
            warn!(%err, "failed to clear session");
        }
        info!("session expired, sign in again");
        self.bus.emit(EventSource::Session, AppEvent::SessionExpired);
    }
}

fn finish<T: DeserializeOwned>(status: StatusCode, text: &str) -> Result<T, ApiError> {
    if status.is_success() {
        decode_body(text)
    } else {
        Err(classify(status.as_u16(), text))
    }
}

#[async_trait]
impl RequestApi for HttpApi {
    async fn create_hire_request(
        &self,
        kind: RequestKind,
        input: &CreateHireRequest,
    ) -> Result<RequestRecord, ApiError> {
        let path = endpoints::create(kind)?;
        self.send(Method::POST, path, Some(input)).await
    }

    async fn apply_to_job(
        &self,
        job_id: &JobId,
        input: &ApplyInput,
    ) -> Result<RequestRecord, ApiError> {
        self.send(Method::POST, &endpoints::apply(job_id), Some(input))
            .await
    }

    async fn list_sent(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError> {
        self.get_list(endpoints::sent(kind)).await
    }

    async fn list_received(&self, kind: RequestKind) -> Result<Vec<RequestRecord>, ApiError> {
        self.get_list(endpoints::received(kind)?).await
    }

    async fn update_status(
        &self,
        kind: RequestKind,
        id: &RequestId,
        status: RequestStatus,
    ) -> Result<RequestRecord, ApiError> {
        let path = endpoints::status(kind, id)?;
        let body = json!({ "status": status.as_str() });
        self.send(Method::PATCH, &path, Some(&body)).await
    }
}

#[async_trait]
impl ChatApi for HttpApi {
    async fn list_chats(&self) -> Result<Vec<Chat>, ApiError> {
        self.get_list(endpoints::CHATS).await
    }

    async fn list_messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, ApiError> {
        self.get_list(&endpoints::messages(chat_id)).await
    }

    async fn send_message(&self, chat_id: &ChatId, text: &str) -> Result<Message, ApiError> {
        let body = SendMessageInput {
            text: text.to_string(),
        };
        self.send(Method::POST, &endpoints::messages(chat_id), Some(&body))
            .await
    }
}

#[async_trait]
impl DirectoryApi for HttpApi {
    async fn list_labours(&self) -> Result<Vec<LabourProfile>, ApiError> {
        self.get_list(endpoints::listing(ListingKind::Labours)).await
    }

    async fn list_contractors(&self) -> Result<Vec<ContractorProfile>, ApiError> {
        self.get_list(endpoints::listing(ListingKind::Contractors)).await
    }

    async fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get_list(endpoints::listing(ListingKind::Jobs)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    #[derive(Debug, Clone)]
    struct SeenRequest {
        line: String,
        authorization: Option<String>,
        body: String,
    }

    async fn read_request(stream: &mut TcpStream) -> SeenRequest {
        let mut reader = BufReader::new(stream);
        let mut line = String::new();
        reader.read_line(&mut line).await.unwrap();
        let mut authorization = None;
        let mut length = 0;
        loop {
            let mut header = String::new();
            reader.read_line(&mut header).await.unwrap();
            let header = header.trim_end();
            if header.is_empty() {
                break;
            }
            if let Some((name, value)) = header.split_once(':') {
                match name.trim().to_ascii_lowercase().as_str() {
                    "authorization" => authorization = Some(value.trim().to_string()),
                    "content-length" => length = value.trim().parse().unwrap(),
                    _ => {}
                }
            }
        }
        let mut body = vec![0; length];
        reader.read_exact(&mut body).await.unwrap();
        SeenRequest {
            line: line.trim_end().to_string(),
            authorization,
            body: String::from_utf8(body).unwrap(),
        }
    }

    /// Answers one connection per canned `(status, body)` and records what
    /// each request carried.
    async fn scripted_backend(
        replies: Vec<(u16, &'static str)>,
    ) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        tokio::spawn(async move {
            for (status, body) in replies {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                log.lock().unwrap().push(request);
                let reason = StatusCode::from_u16(status)
                    .ok()
                    .and_then(|code| code.canonical_reason())
                    .unwrap_or("Unknown");
                let reply = format!(
                    "HTTP/1.1 {status} {reason}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(reply.as_bytes()).await.unwrap();
                let _ = stream.shutdown().await;
            }
        });
        (base_url, seen)
    }

    fn api(base_url: &str) -> HttpApi {
        HttpApi::new(
            &HttpConfig {
                base_url: base_url.to_string(),
                timeout: Duration::from_millis(500),
            },
            SessionCache::in_memory(),
            EventBus::new(8),
        )
        .unwrap()
    }

    #[test]
    fn trailing_slash_is_trimmed_from_base_url() {
        assert_eq!(api("http://localhost:4000/api/").base_url, "http://localhost:4000/api");
    }

    #[test]
    fn finish_classifies_failures() {
        let ok: Vec<RequestRecord> = finish(StatusCode::OK, "[]").unwrap();
        assert!(ok.is_empty());
        let err = finish::<Vec<RequestRecord>>(StatusCode::CONFLICT, r#"{"message":"dup"}"#)
            .unwrap_err();
        assert_eq!(
            err,
            ApiError::Duplicate {
                message: "dup".into()
            }
        );
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Port 9 (discard) is not expected to run an HTTP server locally.
        let err = api("http://127.0.0.1:9").list_sent(RequestKind::LabourHire).await.unwrap_err();
        assert!(matches!(err, ApiError::Network { .. }));
    }

    #[tokio::test]
    async fn expiring_the_session_clears_tokens_and_notifies() {
        let api = api("http://127.0.0.1:9");
        api.session().set_tokens("old", Some("r")).unwrap();
        let mut rx = api.bus.subscribe();

        api.expire_session();

        assert!(api.session().access_token().unwrap().is_none());
        loop {
            let record = rx.recv().await.unwrap();
            if record.body == AppEvent::SessionExpired {
                break;
            }
        }
    }

    #[tokio::test]
    async fn refresh_without_refresh_token_gives_up() {
        let api = api("http://127.0.0.1:9");
        api.session().set_tokens("old", None).unwrap();
        assert!(api.refresh_access_token(Some("old")).await.is_none());
    }

    #[tokio::test]
    async fn waiting_refresh_reuses_a_token_stored_meanwhile() {
        let api = api("http://127.0.0.1:9");
        api.session().set_tokens("new", None).unwrap();
        assert_eq!(
            api.refresh_access_token(Some("old")).await.as_deref(),
            Some("new")
        );
    }

    #[tokio::test]
    async fn rejected_token_is_refreshed_and_the_request_replayed() {
        let (base_url, seen) = scripted_backend(vec![
            (401, r#"{"message":"jwt expired"}"#),
            (200, r#"{"accessToken":"new","refreshToken":"r2"}"#),
            (200, r#"{"data":[{"labourId":"L1","status":"accepted"}]}"#),
        ])
        .await;
        let api = api(&base_url);
        api.session().set_tokens("old", Some("r1")).unwrap();

        let records = api.list_sent(RequestKind::LabourHire).await.unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].target(), Some("L1"));
        let seen = seen.lock().unwrap().clone();
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[0].line, "GET /labour/hire-requests/sent HTTP/1.1");
        assert_eq!(seen[0].authorization.as_deref(), Some("Bearer old"));
        assert!(seen[1].line.starts_with("POST /auth/refresh "));
        assert!(seen[1].authorization.is_none());
        assert!(seen[1].body.contains(r#""refreshToken":"r1""#));
        assert_eq!(seen[2].line, "GET /labour/hire-requests/sent HTTP/1.1");
        assert_eq!(seen[2].authorization.as_deref(), Some("Bearer new"));
        assert_eq!(api.session().access_token().unwrap().as_deref(), Some("new"));
        assert_eq!(api.session().refresh_token().unwrap().as_deref(), Some("r2"));
    }

    #[tokio::test]
    async fn second_rejection_expires_the_session() {
        let (base_url, seen) = scripted_backend(vec![
            (401, r#"{"message":"jwt expired"}"#),
            (200, r#"{"accessToken":"new"}"#),
            (401, r#"{"message":"user disabled"}"#),
        ])
        .await;
        let api = api(&base_url);
        api.session().set_tokens("old", Some("r1")).unwrap();
        let mut rx = api.bus.subscribe();

        let err = api.list_sent(RequestKind::ContractorHire).await.unwrap_err();

        assert_eq!(err, ApiError::SessionExpired);
        assert_eq!(seen.lock().unwrap()[2].authorization.as_deref(), Some("Bearer new"));
        assert!(api.session().access_token().unwrap().is_none());
        assert!(api.session().refresh_token().unwrap().is_none());
        assert!(!api.session().has_session());
        assert_eq!(rx.recv().await.unwrap().body, AppEvent::SessionExpired);
    }

    #[tokio::test]
    async fn failed_refresh_expires_the_session_without_replaying() {
        let (base_url, seen) = scripted_backend(vec![
            (401, r#"{"message":"jwt expired"}"#),
            (401, r#"{"message":"refresh token revoked"}"#),
        ])
        .await;
        let api = api(&base_url);
        api.session().set_tokens("old", Some("r1")).unwrap();

        let err = api.list_chats().await.unwrap_err();

        assert_eq!(err, ApiError::SessionExpired);
        assert_eq!(seen.lock().unwrap().len(), 2);
        assert!(!api.session().has_session());
    }
}
