use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use netrep_cloud_azure::{ArmClient, AzureCredentials};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[allow(dead_code)]
pub const SUBSCRIPTION: &str = "0000-1111";

/// Scripted HTTP reply
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    headers: Vec<(&'static str, String)>,
    body: Option<Value>,
}

#[allow(dead_code)]
impl Reply {
    pub fn empty(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap(),
            headers: Vec::new(),
            body: None,
        }
    }

    pub fn json(status: u16, body: Value) -> Self {
        Self {
            body: Some(body),
            ..Self::empty(status)
        }
    }

    /// `Azure-AsyncOperation` status document
    pub fn operation(status: &str) -> Self {
        Self::json(200, json!({ "status": status })).retry_after(0)
    }

    /// Header names must be lowercase
    pub fn header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    pub fn retry_after(self, secs: u64) -> Self {
        self.header("retry-after", secs.to_string())
    }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        let mut response = match self.body {
            Some(body) => (self.status, Json(body)).into_response(),
            None => self.status.into_response(),
        };
        for (name, value) in self.headers {
            response.headers_mut().insert(
                HeaderName::from_static(name),
                HeaderValue::from_str(&value).unwrap(),
            );
        }
        response
    }
}

#[derive(Default)]
struct Script {
    replies: HashMap<String, VecDeque<Reply>>,
    requests: Vec<String>,
}

/// Local stand-in for the Resource Manager endpoint
///
/// Requests are recorded as `"<METHOD> <path>"`. Scripted replies are
/// consumed in order and the last one repeats; anything unscripted answers
/// 404 `ResourceNotFound`.
#[derive(Clone)]
pub struct ArmServer {
    base_url: String,
    script: Arc<Mutex<Script>>,
}

#[allow(dead_code)]
impl ArmServer {
    pub async fn start() -> Self {
        let script = Arc::new(Mutex::new(Script::default()));
        let app = Router::new().fallback(handle).with_state(script.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, script }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn on(&self, method: &str, path: &str, replies: Vec<Reply>) -> &Self {
        self.script
            .lock()
            .unwrap()
            .replies
            .insert(format!("{} {}", method, path), replies.into());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.script.lock().unwrap().requests.clone()
    }

    pub fn count(&self, request: &str) -> usize {
        self.requests().iter().filter(|r| r.as_str() == request).count()
    }

    pub fn client(&self) -> ArmClient {
        let credentials = AzureCredentials {
            subscription_id: SUBSCRIPTION.to_string(),
            access_token: "token".to_string(),
        };
        ArmClient::new(&credentials)
            .unwrap()
            .with_base_url(&self.base_url)
    }
}

async fn handle(State(script): State<Arc<Mutex<Script>>>, method: Method, uri: Uri) -> Response {
    let key = format!("{} {}", method, uri.path());
    let mut script = script.lock().unwrap();
    script.requests.push(key.clone());

    let reply = match script.replies.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
    };
    reply
        .unwrap_or_else(|| {
            Reply::json(
                404,
                json!({"error": {"code": "ResourceNotFound", "message": format!("no reply for {}", key)}}),
            )
        })
        .into_response()
}
