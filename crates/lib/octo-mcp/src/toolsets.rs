//! Assembly of the default toolset group and the dynamic discovery toolset.

use octo_core::{SharedProvider, Translator};
use octo_toolsets::{ALL_TOOLSETS, Toolset, ToolsetError, ToolsetGroup};

use crate::resources::repository_resource_templates;
use crate::tools::dynamic::DYNAMIC_TOOLSET;
use crate::tools::{
    actions,
    code_security,
    context,
    dynamic,
    issues,
    notifications,
    projects,
    pull_requests,
    repos,
    secret_protection,
    users,
};

/// Settings that decide which toolsets a fresh group starts with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsetSelection {
    pub enabled: Vec<String>,
    pub dynamic: bool,
    pub read_only: bool,
}

impl Default for ToolsetSelection {
    fn default() -> Self {
        Self {
            enabled: vec![ALL_TOOLSETS.to_string()],
            dynamic: false,
            read_only: false,
        }
    }
}

/// Every platform toolset, all disabled except `context`.
#[must_use]
pub fn platform_toolsets(provider: &SharedProvider, t: &Translator) -> Vec<Toolset> {
    let p = provider;

    let context = Toolset::new(
        "context",
        "Tools that provide context about the current user and GitHub context you are operating in",
    )
    .add_read_tools([context::get_me(p, t)])
    .with_enabled(true);

    let repos = Toolset::new("repos", "GitHub Repository related tools")
        .add_read_tools([
            repos::search_repositories(p, t),
            repos::get_file_contents(p, t),
            repos::list_commits(p, t),
            repos::search_code(p, t),
            repos::get_commit(p, t),
            repos::list_branches(p, t),
            repos::list_tags(p, t),
            repos::get_tag(p, t),
        ])
        .add_write_tools([
            repos::create_or_update_file(p, t),
            repos::create_repository(p, t),
            repos::fork_repository(p, t),
            repos::create_branch(p, t),
            repos::delete_file(p, t),
        ])
        .add_resource_templates(repository_resource_templates(p, t));

    let issues = Toolset::new("issues", "GitHub Issues related tools")
        .add_read_tools([
            issues::get_issue(p, t),
            issues::search_issues(p, t),
            issues::list_issues(p, t),
            issues::get_issue_comments(p, t),
        ])
        .add_write_tools([
            issues::create_issue(p, t),
            issues::add_issue_comment(p, t),
            issues::update_issue(p, t),
        ]);

    let users = Toolset::new("users", "GitHub User related tools")
        .add_read_tools([users::search_users(p, t)]);

    let pull_requests = Toolset::new("pull_requests", "GitHub Pull Request related tools")
        .add_read_tools([
            pull_requests::get_pull_request(p, t),
            pull_requests::list_pull_requests(p, t),
            pull_requests::get_pull_request_files(p, t),
            pull_requests::get_pull_request_status(p, t),
            pull_requests::get_pull_request_comments(p, t),
            pull_requests::get_pull_request_reviews(p, t),
            pull_requests::get_pull_request_diff(p, t),
        ])
        .add_write_tools([
            pull_requests::merge_pull_request(p, t),
            pull_requests::update_pull_request_branch(p, t),
            pull_requests::create_pull_request(p, t),
            pull_requests::update_pull_request(p, t),
        ]);

    let projects = Toolset::new("projects", "GitHub Projects V2 management tools")
        .add_read_tools([
            projects::list_projects(p, t),
            projects::get_project_fields(p, t),
            projects::get_project_items(p, t),
        ])
        .add_write_tools([
            projects::create_project_issue(p, t),
            projects::add_issue_to_project(p, t),
            projects::update_project_item_field(p, t),
            projects::create_draft_issue(p, t),
            projects::delete_project_item(p, t),
        ]);

    let actions = Toolset::new("actions", "GitHub Actions workflows and CI/CD operations")
        .add_read_tools([
            actions::list_workflows(p, t),
            actions::list_workflow_runs(p, t),
            actions::get_workflow_run(p, t),
            actions::get_workflow_run_logs(p, t),
            actions::list_workflow_jobs(p, t),
            actions::get_job_logs(p, t),
            actions::list_workflow_run_artifacts(p, t),
            actions::download_workflow_run_artifact(p, t),
            actions::get_workflow_run_usage(p, t),
        ])
        .add_write_tools([
            actions::run_workflow(p, t),
            actions::rerun_workflow_run(p, t),
            actions::rerun_failed_jobs(p, t),
            actions::cancel_workflow_run(p, t),
            actions::delete_workflow_run_logs(p, t),
        ]);

    let code_security = Toolset::new(
        "code_security",
        "Code security related tools, such as GitHub Code Scanning",
    )
    .add_read_tools([
        code_security::get_code_scanning_alert(p, t),
        code_security::list_code_scanning_alerts(p, t),
    ]);

    let secret_protection = Toolset::new(
        "secret_protection",
        "Secret protection related tools, such as GitHub Secret Scanning",
    )
    .add_read_tools([
        secret_protection::get_secret_scanning_alert(p, t),
        secret_protection::list_secret_scanning_alerts(p, t),
    ]);

    let notifications = Toolset::new("notifications", "GitHub Notifications related tools")
        .add_read_tools([
            notifications::list_notifications(p, t),
            notifications::get_notification_details(p, t),
        ])
        .add_write_tools([
            notifications::dismiss_notification(p, t),
            notifications::mark_all_notifications_read(p, t),
        ]);

    let experiments = Toolset::new(
        "experiments",
        "Experimental features that are not considered stable yet",
    );

    vec![
        context,
        repos,
        issues,
        users,
        pull_requests,
        projects,
        actions,
        code_security,
        secret_protection,
        notifications,
        experiments,
    ]
}

/// The always-enabled `dynamic` toolset bound to `group`.
#[must_use]
pub fn dynamic_toolset(group: &ToolsetGroup, t: &Translator) -> Toolset {
    Toolset::new(
        DYNAMIC_TOOLSET,
        "Discover GitHub MCP tools that can help achieve tasks by enabling additional sets of tools, you can control the enablement of any toolset to access its tools when this toolset is enabled.",
    )
    .add_read_tools([
        dynamic::list_available_toolsets(group, t),
        dynamic::get_toolset_tools(group, t),
        dynamic::enable_toolset(group, t),
    ])
    .with_enabled(true)
}

/// Builds a fresh group with every platform toolset registered and the
/// selected ones enabled.
///
/// In dynamic mode `all` is ignored so the session starts small, and the
/// dynamic toolset is registered last.
///
/// # Errors
/// Returns [`ToolsetError::UnknownToolset`] if the selection names a toolset
/// that does not exist.
pub async fn build_toolset_group(
    selection: &ToolsetSelection,
    provider: &SharedProvider,
    t: &Translator,
) -> Result<ToolsetGroup, ToolsetError> {
    let group = ToolsetGroup::new(selection.read_only);
    for toolset in platform_toolsets(provider, t) {
        group.add_toolset(toolset).await?;
    }

    if selection.dynamic {
        group
            .enable_toolsets(
                selection
                    .enabled
                    .iter()
                    .filter(|name| name.as_str() != ALL_TOOLSETS),
            )
            .await?;
        group.add_toolset(dynamic_toolset(&group, t)).await?;
    } else {
        group.enable_toolsets(selection.enabled.iter()).await?;
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use octo_core::{ApiHost, GitHubProvider};

    use super::*;

    fn provider() -> SharedProvider {
        Arc::new(GitHubProvider::new(ApiHost::dotcom().unwrap(), Some("token".to_string())).unwrap())
    }

    #[test]
    fn toolsets_register_in_fixed_order() {
        let names: Vec<String> = platform_toolsets(&provider(), &Translator::null())
            .iter()
            .map(|toolset| toolset.name().to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "context",
                "repos",
                "issues",
                "users",
                "pull_requests",
                "projects",
                "actions",
                "code_security",
                "secret_protection",
                "notifications",
                "experiments",
            ]
        );
    }

    #[test]
    fn only_repos_carries_resource_templates() {
        for toolset in platform_toolsets(&provider(), &Translator::null()) {
            let expected = if toolset.name() == "repos" { 5 } else { 0 };
            assert_eq!(toolset.resource_templates().len(), expected, "{}", toolset.name());
        }
    }

    #[tokio::test]
    async fn read_only_group_hides_write_tools() {
        let selection = ToolsetSelection {
            enabled: vec!["repos".to_string()],
            dynamic: false,
            read_only: true,
        };
        let group = build_toolset_group(&selection, &provider(), &Translator::null())
            .await
            .unwrap();

        let names: Vec<String> = group
            .exposed_tools()
            .await
            .iter()
            .map(|tool| tool.name().to_string())
            .collect();
        assert!(names.contains(&"get_me".to_string()));
        assert!(names.contains(&"get_file_contents".to_string()));
        assert!(!names.contains(&"create_branch".to_string()));
        assert!(!names.contains(&"list_issues".to_string()));
    }

    #[tokio::test]
    async fn dynamic_mode_ignores_all() {
        let selection = ToolsetSelection {
            enabled: vec![ALL_TOOLSETS.to_string()],
            dynamic: true,
            read_only: false,
        };
        let group = build_toolset_group(&selection, &provider(), &Translator::null())
            .await
            .unwrap();

        assert_eq!(group.is_enabled("repos").await, Some(false));
        assert_eq!(group.is_enabled("context").await, Some(true));
        assert_eq!(group.is_enabled(DYNAMIC_TOOLSET).await, Some(true));
    }

    #[tokio::test]
    async fn unknown_toolset_is_rejected() {
        let selection = ToolsetSelection {
            enabled: vec!["gists".to_string()],
            ..ToolsetSelection::default()
        };
        let err = build_toolset_group(&selection, &provider(), &Translator::null())
            .await
            .unwrap_err();
        assert_eq!(err, ToolsetError::UnknownToolset("gists".to_string()));
    }
}
