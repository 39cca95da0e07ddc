mod common;

use common::{FakePlatform, call, exposed_names, parse_text, selection};
use octo_toolsets::DispatchError;
use serde_json::json;

#[tokio::test]
async fn dynamic_session_starts_small() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["all"], true, false)).await;

    assert_eq!(
        exposed_names(&group).await,
        vec![
            "get_me",
            "list_available_toolsets",
            "get_toolset_tools",
            "enable_toolset",
        ]
    );
}

#[tokio::test]
async fn enabling_a_toolset_grows_the_tool_list_once() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&[], true, false)).await;
    let before = group.revision();

    assert!(matches!(
        group.authorize("list_issues").await.unwrap_err(),
        DispatchError::ToolsetDisabled { .. }
    ));

    let result = call(&group, "enable_toolset", json!({ "toolset": "issues" })).await;
    assert_eq!(result.first_text(), Some("Toolset issues enabled"));
    assert_eq!(group.revision(), before + 1);
    assert!(exposed_names(&group).await.contains(&"list_issues".to_string()));
    assert!(group.authorize("list_issues").await.is_ok());

    let result = call(&group, "enable_toolset", json!({ "toolset": "issues" })).await;
    assert_eq!(result.first_text(), Some("Toolset issues is already enabled"));
    assert_eq!(group.revision(), before + 1);
}

#[tokio::test]
async fn enabling_an_unknown_toolset_changes_nothing() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&[], true, false)).await;
    let before = group.revision();
    let tools = exposed_names(&group).await;

    let result = call(&group, "enable_toolset", json!({ "toolset": "gists" })).await;

    assert!(result.is_error);
    assert_eq!(result.first_text(), Some("Toolset gists not found"));
    assert_eq!(group.revision(), before);
    assert_eq!(exposed_names(&group).await, tools);
}

#[tokio::test]
async fn available_toolsets_never_list_dynamic() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&["repos"], true, false)).await;

    let listing = parse_text(&call(&group, "list_available_toolsets", json!({})).await);
    let entries = listing.as_array().unwrap();

    assert_eq!(entries.len(), 11);
    assert!(entries.iter().all(|entry| entry["name"] != "dynamic"));
    assert!(entries.iter().all(|entry| entry["can_enable"] == true));
    let repos = entries.iter().find(|entry| entry["name"] == "repos").unwrap();
    assert_eq!(repos["currently_enabled"], true);
    let issues = entries.iter().find(|entry| entry["name"] == "issues").unwrap();
    assert_eq!(issues["currently_enabled"], false);
}

#[tokio::test]
async fn toolset_tools_hide_writes_in_read_only_mode() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&[], true, true)).await;

    let listing = parse_text(&call(&group, "get_toolset_tools", json!({ "toolset": "issues" })).await);
    let names: Vec<&str> = listing
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["name"].as_str().unwrap())
        .collect();

    assert_eq!(
        names,
        vec!["get_issue", "search_issues", "list_issues", "get_issue_comments"]
    );
    assert!(listing.as_array().unwrap().iter().all(|entry| entry["toolset"] == "issues"));
}

#[tokio::test]
async fn read_only_enable_keeps_writes_hidden() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&[], true, true)).await;

    call(&group, "enable_toolset", json!({ "toolset": "issues" })).await;

    let names = exposed_names(&group).await;
    assert!(names.contains(&"get_issue".to_string()));
    assert!(!names.contains(&"create_issue".to_string()));
    assert_eq!(
        group.authorize("create_issue").await.unwrap_err(),
        DispatchError::ReadOnly("create_issue".to_string())
    );
}

#[tokio::test]
async fn separate_groups_do_not_share_enablement() {
    let platform = FakePlatform::start().await;
    let first = platform.group(selection(&[], true, false)).await;
    let second = platform.group(selection(&[], true, false)).await;

    call(&first, "enable_toolset", json!({ "toolset": "actions" })).await;

    assert_eq!(first.is_enabled("actions").await, Some(true));
    assert_eq!(second.is_enabled("actions").await, Some(false));
}

#[tokio::test]
async fn get_me_reaches_the_platform() {
    let platform = FakePlatform::start().await;
    let group = platform.group(selection(&[], false, true)).await;

    let user = parse_text(&call(&group, "get_me", json!({})).await);

    assert_eq!(user["login"], "octocat");
    assert_eq!(platform.recorder.requests(), vec!["GET /api/v3/user"]);
}
