#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use octo_core::{ApiHost, GitHubProvider, SharedProvider, Translator};
use octo_mcp::{ToolsetSelection, build_toolset_group};
use octo_toolsets::{CallContext, JsonObject, ToolRequest, ToolResult, ToolsetGroup};
use serde_json::{Value, json};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
pub struct Recorder {
    requests: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    /// Recorded `METHOD /path` lines in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn fake_platform(State(recorder): State<Recorder>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    recorder
        .requests
        .lock()
        .unwrap()
        .push(format!("{} {path}", request.method()));

    match path.as_str() {
        "/api/v3/user" => axum::Json(json!({ "login": "octocat", "id": 1 })).into_response(),
        "/raw/owner/repo/HEAD/README.md" => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "# Hello",
        )
            .into_response(),
        "/raw/owner/repo/HEAD/logo.png" => (
            [(header::CONTENT_TYPE, "image/png")],
            vec![0x89_u8, 0x50, 0x4e, 0x47],
        )
            .into_response(),
        "/raw/owner/repo/abc123/src/main.rs" => "fn main() {}".into_response(),
        "/api/v3/repos/owner/repo/pulls/42" => {
            axum::Json(json!({ "number": 42, "head": { "sha": "abc123" } })).into_response()
        }
        "/api/v3/repos/owner/repo/contents/docs" => axum::Json(json!([
            { "name": "intro.md", "path": "docs/intro.md", "type": "file" },
            { "name": "guide", "path": "docs/guide", "type": "dir" },
        ]))
        .into_response(),
        "/api/v3/repos/owner/repo/actions/runs/7/jobs" => axum::Json(json!({
            "total_count": 3,
            "jobs": [
                { "id": 11, "name": "build", "conclusion": "failure" },
                { "id": 12, "name": "test", "conclusion": "failure" },
                { "id": 13, "name": "lint", "conclusion": "success" },
            ],
        }))
        .into_response(),
        "/api/v3/repos/owner/repo/actions/jobs/11/logs" => {
            (StatusCode::FOUND, [(header::LOCATION, "/downloads/job-11.txt")]).into_response()
        }
        "/downloads/job-11.txt" => "  error: build failed\n".into_response(),
        "/api/v3/repos/owner/repo/actions/jobs/12/logs" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "logs unavailable").into_response()
        }
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

/// In-process stand-in for the REST, GraphQL, and raw endpoints.
pub struct FakePlatform {
    pub provider: SharedProvider,
    pub recorder: Recorder,
}

impl FakePlatform {
    pub async fn start() -> Self {
        let recorder = Recorder::default();
        let app = Router::new()
            .fallback(fake_platform)
            .with_state(recorder.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let base = format!("http://{addr}");
        let host = ApiHost::from_urls(
            &format!("{base}/api/v3/"),
            &format!("{base}/api/graphql"),
            &format!("{base}/raw/"),
        )
        .unwrap();
        let provider = GitHubProvider::new(host, Some("test-token".to_string()))
            .unwrap()
            .into_shared();
        Self { provider, recorder }
    }

    pub async fn group(&self, selection: ToolsetSelection) -> ToolsetGroup {
        build_toolset_group(&selection, &self.provider, &Translator::null())
            .await
            .unwrap()
    }
}

pub fn selection(enabled: &[&str], dynamic: bool, read_only: bool) -> ToolsetSelection {
    ToolsetSelection {
        enabled: enabled.iter().map(|name| (*name).to_string()).collect(),
        dynamic,
        read_only,
    }
}

pub fn args(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        other => panic!("tool arguments must be an object, got {other}"),
    }
}

/// Authorizes and runs `tool` against `group`, panicking on policy or handler errors.
pub async fn call(group: &ToolsetGroup, tool: &str, arguments: Value) -> ToolResult {
    group
        .authorize(tool)
        .await
        .unwrap()
        .call(ToolRequest::new(args(arguments), CallContext::default()))
        .await
        .unwrap()
}

pub fn parse_text(result: &ToolResult) -> Value {
    serde_json::from_str(result.first_text().unwrap()).unwrap()
}

pub async fn exposed_names(group: &ToolsetGroup) -> Vec<String> {
    group
        .exposed_tools()
        .await
        .iter()
        .map(|tool| tool.name().to_string())
        .collect()
}
