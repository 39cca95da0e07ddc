mod common;

use common::{FakePlatform, call, parse_text, selection};
use octo_toolsets::{CallContext, DispatchError, ResourceContents, ToolContent, ToolError};

#[tokio::test]
async fn default_branch_resource_reads_text() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, true)).await;

    let uri = "repo://owner/repo/contents/README.md";
    let template = group.resource_template_for(uri).await.unwrap();
    let contents = template.read(uri, CallContext::default()).await.unwrap();

    assert_eq!(
        contents,
        vec![ResourceContents::Text {
            uri: uri.to_string(),
            mime_type: Some("text/markdown".to_string()),
            text: "# Hello".to_string(),
        }]
    );
}

#[tokio::test]
async fn pull_request_resource_reads_head_commit() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let uri = "repo://owner/repo/refs/pull/42/head/contents/src/main.rs";
    let template = group.resource_template_for(uri).await.unwrap();
    let contents = template.read(uri, CallContext::default()).await.unwrap();

    assert_eq!(contents.len(), 1);
    assert!(matches!(&contents[0], ResourceContents::Text { text, .. } if text == "fn main() {}"));
    assert_eq!(
        platform.recorder.requests(),
        vec![
            "GET /api/v3/repos/owner/repo/pulls/42",
            "GET /raw/owner/repo/abc123/src/main.rs",
        ]
    );
}

#[tokio::test]
async fn missing_file_is_not_found() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let uri = "repo://owner/repo/contents/missing.txt";
    let template = group.resource_template_for(uri).await.unwrap();
    let err = template.read(uri, CallContext::default()).await.unwrap_err();

    assert!(matches!(err, ToolError::NotFound(message) if message == "404 Not Found"));
}

#[tokio::test]
async fn directory_resource_is_rejected_without_requests() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let uri = "repo://owner/repo/contents/docs/";
    let template = group.resource_template_for(uri).await.unwrap();
    let err = template.read(uri, CallContext::default()).await.unwrap_err();

    assert!(matches!(err, ToolError::InvalidParams(_)));
    assert!(platform.recorder.requests().is_empty());
}

#[tokio::test]
async fn resources_of_disabled_toolsets_are_hidden() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["issues"], false, false)).await;

    assert!(group.exposed_resource_templates().await.is_empty());
    let uri = "repo://owner/repo/contents/README.md";
    assert_eq!(
        group.resource_template_for(uri).await.unwrap_err(),
        DispatchError::UnknownResource(uri.to_string())
    );
}

#[tokio::test]
async fn get_file_contents_embeds_binary_files() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let result = call(
        &group,
        "get_file_contents",
        serde_json::json!({ "owner": "owner", "repo": "repo", "path": "logo.png" }),
    )
    .await;

    assert!(!result.is_error);
    assert_eq!(
        result.content,
        vec![
            ToolContent::Text("successfully downloaded binary file".to_string()),
            ToolContent::Resource(ResourceContents::Blob {
                uri: "repo://owner/repo/contents/logo.png".to_string(),
                mime_type: Some("image/png".to_string()),
                blob: "iVBORw==".to_string(),
            }),
        ]
    );
}

#[tokio::test]
async fn get_file_contents_treats_empty_revisions_as_head() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let result = call(
        &group,
        "get_file_contents",
        serde_json::json!({
            "owner": "owner",
            "repo": "repo",
            "path": "README.md",
            "ref": "",
            "sha": "",
        }),
    )
    .await;

    assert!(!result.is_error);
    assert!(matches!(
        &result.content[1],
        ToolContent::Resource(contents) if contents.uri() == "repo://owner/repo/contents/README.md"
    ));
    assert_eq!(
        platform.recorder.requests(),
        vec!["GET /raw/owner/repo/HEAD/README.md"]
    );
}

#[tokio::test]
async fn get_file_contents_falls_back_to_directory_listing() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let result = call(
        &group,
        "get_file_contents",
        serde_json::json!({ "owner": "owner", "repo": "repo", "path": "docs" }),
    )
    .await;

    assert!(!result.is_error);
    let listing = parse_text(&result);
    assert_eq!(listing[0]["name"], "intro.md");
    assert_eq!(listing[1]["type"], "dir");
    assert_eq!(
        platform.recorder.requests(),
        vec![
            "GET /raw/owner/repo/HEAD/docs",
            "GET /api/v3/repos/owner/repo/contents/docs",
        ]
    );
}

#[tokio::test]
async fn get_file_contents_reports_missing_paths() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], false, false)).await;

    let result = call(
        &group,
        "get_file_contents",
        serde_json::json!({ "owner": "owner", "repo": "repo", "path": "nope.txt" }),
    )
    .await;

    assert!(result.is_error);
    assert!(result.first_text().unwrap().starts_with("Failed to get file contents."));
}
