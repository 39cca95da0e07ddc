use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use octo_core::{
    ApiHost,
    FileLocation,
    GitHubProvider,
    RawError,
    RefSelector,
    fetch_repository_file,
};
use octo_toolsets::{CallContext, ResourceContents, ToolError, UriTemplate};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Recorder {
    paths: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

async fn fake_platform(State(recorder): State<Recorder>, request: Request) -> Response {
    let path = request.uri().path().to_string();
    recorder.paths.lock().unwrap().push(path.clone());

    match path.as_str() {
        "/raw/owner/repo/HEAD/README.md" => (
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            "# Hello",
        )
            .into_response(),
        "/raw/owner/repo/HEAD/data.png" => (
            [(header::CONTENT_TYPE, "image/png")],
            vec![0x89_u8, 0x50, 0x4e, 0x47],
        )
            .into_response(),
        "/api/v3/repos/owner/repo/pulls/42" => {
            axum::Json(serde_json::json!({ "number": 42, "head": { "sha": "abc123" } }))
                .into_response()
        }
        "/raw/owner/repo/abc123/README.md" => "pr contents".into_response(),
        "/raw/owner/repo/HEAD/docs/read%20me.md" => "spaced".into_response(),
        "/raw/owner/repo/HEAD/broken.txt" => {
            (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response()
        }
        _ => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn start() -> (GitHubProvider, Recorder) {
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
    let provider = GitHubProvider::new(host, Some("test-token".to_string())).unwrap();
    (provider, recorder)
}

async fn fetch(
    provider: &GitHubProvider,
    path: &str,
    selector: RefSelector,
) -> Result<ResourceContents, RawError> {
    fetch_repository_file(
        provider,
        &CallContext::default(),
        &format!("repo://owner/repo/contents/{path}"),
        FileLocation {
            owner: "owner",
            repo: "repo",
            path,
        },
        &selector,
    )
    .await
}

#[tokio::test]
async fn markdown_at_head_is_text() {
    let (provider, recorder) = start().await;

    let contents = fetch(&provider, "README.md", RefSelector::Head).await.unwrap();

    assert_eq!(
        contents,
        ResourceContents::Text {
            uri: "repo://owner/repo/contents/README.md".to_string(),
            mime_type: Some("text/markdown".to_string()),
            text: "# Hello".to_string(),
        }
    );
    assert_eq!(recorder.paths(), vec!["/raw/owner/repo/HEAD/README.md"]);
}

#[tokio::test]
async fn png_is_base64_blob() {
    let (provider, _recorder) = start().await;

    let contents = fetch(&provider, "data.png", RefSelector::Head).await.unwrap();

    assert_eq!(
        contents,
        ResourceContents::Blob {
            uri: "repo://owner/repo/contents/data.png".to_string(),
            mime_type: Some("image/png".to_string()),
            blob: "iVBORw==".to_string(),
        }
    );
}

#[tokio::test]
async fn pull_request_resolves_head_sha() {
    let (provider, recorder) = start().await;

    let contents = fetch(&provider, "README.md", RefSelector::PullRequest(42))
        .await
        .unwrap();

    assert!(matches!(contents, ResourceContents::Text { ref text, .. } if text == "pr contents"));
    assert_eq!(
        recorder.paths(),
        vec![
            "/api/v3/repos/owner/repo/pulls/42",
            "/raw/owner/repo/abc123/README.md",
        ]
    );
}

#[tokio::test]
async fn directory_path_makes_no_requests() {
    let (provider, recorder) = start().await;

    let err = fetch(&provider, "src/", RefSelector::PullRequest(42))
        .await
        .unwrap_err();

    assert!(matches!(err, RawError::Directory(ref path) if path == "src/"));
    assert!(recorder.paths().is_empty());
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let (provider, _recorder) = start().await;

    let err = fetch(&provider, "missing.txt", RefSelector::Head)
        .await
        .unwrap_err();

    assert!(matches!(err, RawError::NotFound));
    assert!(matches!(ToolError::from(err), ToolError::NotFound(message) if message == "404 Not Found"));
}

#[tokio::test]
async fn other_statuses_carry_the_body() {
    let (provider, _recorder) = start().await;

    let err = fetch(&provider, "broken.txt", RefSelector::Head)
        .await
        .unwrap_err();

    assert!(matches!(err, RawError::Upstream { status: 500, .. }));
    assert_eq!(
        ToolError::from(err).to_string(),
        "failed to fetch raw content: upstream exploded"
    );
}

#[tokio::test]
async fn escaped_uri_path_is_requested_once_encoded() {
    let (provider, recorder) = start().await;
    let bound = UriTemplate::parse("repo://{owner}/{repo}/contents{/path*}")
        .matches("repo://owner/repo/contents/docs/read%20me.md")
        .unwrap();
    let path = bound["path"].join("/");

    let contents = fetch(&provider, &path, RefSelector::Head).await.unwrap();

    assert!(matches!(contents, ResourceContents::Text { ref text, .. } if text == "spaced"));
    assert_eq!(recorder.paths(), vec!["/raw/owner/repo/HEAD/docs/read%20me.md"]);
}
