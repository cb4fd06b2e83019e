//! HTTP client for the Freeagle event server.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::{Response, StatusCode};
use tokio::time::timeout;
use url::Url;

use super::EventGateway;
use crate::config::FreeagleConfig;
use crate::error::{FreeagleError, FreeagleResult, TransportError};
use crate::event::{Event, User, string_bool};
use crate::invite_code::InviteCode;

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpGateway {
    pub fn new(base_url: &str, request_timeout: Duration) -> FreeagleResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| FreeagleError::Config(format!("Invalid api_url '{base_url}': {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(FreeagleError::Config(format!(
                "api_url '{base_url}' cannot be used as a base URL"
            )));
        }

        Ok(HttpGateway {
            http: reqwest::Client::new(),
            base_url,
            timeout: request_timeout,
        })
    }

    pub fn from_config(config: &FreeagleConfig) -> FreeagleResult<Self> {
        Self::new(&config.api_url, config.request_timeout())
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Run a request future under the configured timeout.
    async fn send<F>(&self, request: F) -> FreeagleResult<Response>
    where
        F: Future<Output = reqwest::Result<Response>>,
    {
        let response = timeout(self.timeout, request)
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| self.transport_error(e))?;
        Ok(response)
    }

    async fn get_text(&self, segments: &[&str]) -> FreeagleResult<(StatusCode, String)> {
        let url = self.url(segments);
        debug!("GET {}", url);

        let resp = self.send(self.http.get(url).send()).await?;
        let status = resp.status();
        let body = timeout(self.timeout, resp.text())
            .await
            .map_err(|_| TransportError::Timeout(self.timeout.as_secs()))?
            .map_err(|e| self.transport_error(e))?;
        Ok((status, body))
    }

    fn transport_error(&self, e: reqwest::Error) -> FreeagleError {
        if e.is_timeout() {
            TransportError::Timeout(self.timeout.as_secs()).into()
        } else {
            TransportError::Network(e.to_string()).into()
        }
    }
}

fn unexpected_status(status: StatusCode, what: &str) -> FreeagleError {
    TransportError::Protocol(format!("{what} returned {status}")).into()
}

#[async_trait]
impl EventGateway for HttpGateway {
    /// GET /users/getUser/:username
    async fn username_exists(&self, username: &str) -> FreeagleResult<bool> {
        let (status, body) = self.get_text(&["users", "getUser", username]).await?;
        if !status.is_success() {
            return Err(unexpected_status(status, "username check"));
        }

        string_bool::parse(&body).ok_or_else(|| {
            TransportError::Protocol(format!("username check returned {body:?}")).into()
        })
    }

    /// GET /users/newUser/:username
    async fn register_username(&self, username: &str) -> FreeagleResult<()> {
        let (status, _) = self.get_text(&["users", "newUser", username]).await?;
        if !status.is_success() {
            return Err(unexpected_status(status, "registration"));
        }
        Ok(())
    }

    /// GET /users/username/:username
    async fn find_user(&self, username: &str) -> FreeagleResult<Option<User>> {
        let (status, body) = self.get_text(&["users", "username", username]).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(unexpected_status(status, "user lookup"));
        }

        let body = body.trim();
        if body.is_empty() || body == "null" {
            return Ok(None);
        }

        let user = serde_json::from_str(body)
            .map_err(|e| TransportError::Protocol(format!("Failed to parse user: {e}")))?;
        Ok(Some(user))
    }

    /// GET /events/all
    async fn list_events(&self) -> FreeagleResult<Vec<Event>> {
        let (status, body) = self.get_text(&["events", "all"]).await?;
        if !status.is_success() {
            return Err(unexpected_status(status, "event listing"));
        }

        let events = serde_json::from_str(&body)
            .map_err(|e| TransportError::Protocol(format!("Failed to parse events: {e}")))?;
        Ok(events)
    }

    /// POST /events/newEvent
    async fn create_event(&self, event: &Event) -> FreeagleResult<()> {
        let url = self.url(&["events", "newEvent"]);
        debug!("POST {}", url);

        let resp = self.send(self.http.post(url).json(event).send()).await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(unexpected_status(status, "event creation"));
        }
        Ok(())
    }

    /// GET /events/:event_id/:inviter/:username/:participate
    ///
    /// The server answers with the participation it recorded. A boolean body
    /// confirms only when it equals `accepted`, so a decline echoed back as
    /// `"false"` counts as confirmed. Any other 2xx body is a plain
    /// acknowledgement.
    async fn confirm_participation(
        &self,
        code: &InviteCode,
        username: &str,
        accepted: bool,
    ) -> FreeagleResult<bool> {
        let (event_id, inviter) = code.decode()?;
        let (status, body) = self
            .get_text(&[
                "events",
                event_id,
                inviter,
                username,
                string_bool::format(accepted),
            ])
            .await?;

        if status == StatusCode::NOT_FOUND {
            return Err(FreeagleError::NotFound(format!(
                "No event for invite code '{code}'"
            )));
        }
        if status.is_client_error() {
            warn!("Server refused confirmation for {}: {}", code, status);
            return Ok(false);
        }
        if !status.is_success() {
            return Err(unexpected_status(status, "confirmation"));
        }

        match string_bool::parse(&body) {
            Some(recorded) if recorded != accepted => {
                warn!("Server recorded participate={} for {}", recorded, code);
                Ok(false)
            }
            _ => Ok(true),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShareOrder;
    use crate::event::tests::make_test_event;
    use crate::membership::MembershipStore;
    use crate::preferences::MemoryPreferences;
    use crate::reconcile::InviteEngine;
    use mockito::Server;
    use std::sync::Arc;

    const EVENT_JSON: &str = r#"[{
        "id": "E1",
        "title": "Palermo Half Marathon",
        "description": "",
        "category": "sports",
        "entities": [],
        "start_local": "2025-10-19T09:30:00",
        "end_local": "2025-10-19T13:00:00",
        "location": [13.3285416, 38.1995197],
        "geo": {"address": {"country_code": "IT", "formatted_address": "Palermo, Italy"}},
        "users": [{"username": "bob", "participate": "true"}]
    }]"#;

    fn gateway(server: &Server) -> HttpGateway {
        HttpGateway::new(&server.url(), Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_username_exists_parses_text_boolean() {
        let mut server = Server::new_async().await;
        let taken = server
            .mock("GET", "/users/getUser/alice")
            .with_body("true")
            .create_async()
            .await;
        let free = server
            .mock("GET", "/users/getUser/bob")
            .with_body("false")
            .create_async()
            .await;

        let gw = gateway(&server);
        assert!(gw.username_exists("alice").await.unwrap());
        assert!(!gw.username_exists("bob").await.unwrap());
        taken.assert_async().await;
        free.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_if_available_skips_taken_names() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/users/getUser/alice")
            .with_body("true")
            .create_async()
            .await;
        let register = server
            .mock("GET", "/users/newUser/alice")
            .expect(0)
            .create_async()
            .await;

        let gw = gateway(&server);
        assert!(gw.register_username_if_available("alice").await.unwrap());
        register.assert_async().await;
    }

    #[tokio::test]
    async fn test_register_if_available_claims_free_names() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/users/getUser/carol")
            .with_body("false")
            .create_async()
            .await;
        let register = server
            .mock("GET", "/users/newUser/carol")
            .create_async()
            .await;

        let gw = gateway(&server);
        assert!(!gw.register_username_if_available("carol").await.unwrap());
        register.assert_async().await;
    }

    #[tokio::test]
    async fn test_find_user_null_body_is_none() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/users/username/ghost")
            .with_body("null")
            .create_async()
            .await;
        server
            .mock("GET", "/users/username/mary")
            .with_body(r#"{"username": "mary", "participate": "false"}"#)
            .create_async()
            .await;

        let gw = gateway(&server);
        assert_eq!(gw.find_user("ghost").await.unwrap(), None);

        let user = gw.find_user("mary").await.unwrap().unwrap();
        assert_eq!(user.username, "mary");
        assert!(!user.participate);
    }

    #[tokio::test]
    async fn test_fetch_event_by_invite_code() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/events/all")
            .with_header("content-type", "application/json")
            .with_body(EVENT_JSON)
            .expect(2)
            .create_async()
            .await;

        let gw = gateway(&server);
        let code = InviteCode::encode("E1", "alice").unwrap();
        let event = gw.fetch_event_by_invite_code(&code).await.unwrap();
        assert_eq!(event.id, "E1");
        assert!(event.participant("bob").unwrap().participate);

        let missing = InviteCode::encode("E2", "alice").unwrap();
        let err = gw.fetch_event_by_invite_code(&missing).await.unwrap_err();
        assert!(matches!(err, FreeagleError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_confirm_participation_paths() {
        let mut server = Server::new_async().await;
        let accept = server
            .mock("GET", "/events/E1/alice/bob/true")
            .with_body("ok")
            .create_async()
            .await;
        server
            .mock("GET", "/events/E1/alice/bob/false")
            .with_body("false")
            .create_async()
            .await;
        server
            .mock("GET", "/events/E2/alice/bob/true")
            .with_status(409)
            .create_async()
            .await;
        server
            .mock("GET", "/events/E3/alice/bob/true")
            .with_body("\"false\"")
            .create_async()
            .await;

        let gw = gateway(&server);
        let e1 = InviteCode::encode("E1", "alice").unwrap();
        let e2 = InviteCode::encode("E2", "alice").unwrap();
        let e3 = InviteCode::encode("E3", "alice").unwrap();

        assert!(gw.confirm_participation(&e1, "bob", true).await.unwrap());
        // A decline echoed back is a confirmation
        assert!(gw.confirm_participation(&e1, "bob", false).await.unwrap());
        assert!(!gw.confirm_participation(&e2, "bob", true).await.unwrap());
        // An accept the server recorded as non-participation is not
        assert!(!gw.confirm_participation(&e3, "bob", true).await.unwrap());
        accept.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_transport_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/events/E1/alice/bob/true")
            .with_status(500)
            .create_async()
            .await;

        let gw = gateway(&server);
        let code = InviteCode::encode("E1", "alice").unwrap();
        let err = gw.confirm_participation(&code, "bob", true).await.unwrap_err();
        assert!(matches!(
            err,
            FreeagleError::Transport(TransportError::Protocol(_))
        ));
    }

    #[tokio::test]
    async fn test_create_event_posts_json() {
        let mut server = Server::new_async().await;
        let create = server
            .mock("POST", "/events/newEvent")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"id": "E1", "inviteCode": "E1-alice"}"#.to_string(),
            ))
            .create_async()
            .await;

        let gw = gateway(&server);
        let code = InviteCode::encode("E1", "alice").unwrap();
        let event = make_test_event("E1").with_invite_code(code);
        gw.create_event(&event).await.unwrap();
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_failure() {
        // Nothing listens on the discard port
        let gw = HttpGateway::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
        let err = gw.list_events().await.unwrap_err();
        assert!(matches!(
            err,
            FreeagleError::Transport(TransportError::Network(_))
        ));
    }

    /// A server that accepts connections and never answers.
    async fn silent_server() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn test_silent_server_times_out() {
        let url = silent_server().await;
        let gw = Arc::new(HttpGateway::new(&url, Duration::from_millis(200)).unwrap());
        let code = InviteCode::encode("E1", "alice").unwrap();

        let err = gw.confirm_participation(&code, "bob", true).await.unwrap_err();
        assert!(matches!(
            err,
            FreeagleError::Transport(TransportError::Timeout(_))
        ));

        let store = Arc::new(MembershipStore::open(Arc::new(MemoryPreferences::new())));
        let engine = InviteEngine::new(gw, store.clone(), ShareOrder::LocalFirst);
        let err = engine
            .respond(&code, "bob", true, &make_test_event("E1"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FreeagleError::ReconciliationFailed(TransportError::Timeout(_))
        ));
        assert!(store.load_all().is_empty());
    }

    #[test]
    fn test_base_url_path_is_preserved() {
        let gw = HttpGateway::new("http://localhost:3000/api/", Duration::from_secs(1)).unwrap();
        let url = gw.url(&["users", "getUser", "a/b"]);
        assert_eq!(url.as_str(), "http://localhost:3000/api/users/getUser/a%2Fb");
    }

    #[test]
    fn test_invalid_base_url_is_config_error() {
        assert!(matches!(
            HttpGateway::new("not a url", Duration::from_secs(1)),
            Err(FreeagleError::Config(_))
        ));
    }
}
