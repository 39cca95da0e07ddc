use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::{DispatchError, ToolsetError};
use crate::resource::ServerResourceTemplate;
use crate::tool::{ServerTool, is_exposed};
use crate::toolset::Toolset;

/// Name accepted by [`ToolsetGroup::enable_toolsets`] to enable every toolset.
pub const ALL_TOOLSETS: &str = "all";

/// Listing entry for one toolset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolsetSummary {
    pub name: String,
    pub description: String,
    pub currently_enabled: bool,
}

/// Shared, guarded set of toolsets with a fixed read-only policy.
///
/// Clones share state. Separate groups never share enablement.
#[derive(Clone)]
pub struct ToolsetGroup {
    inner: Arc<ToolsetGroupInner>,
}

/// Non-owning handle for handlers that live inside the group they reference.
#[derive(Clone)]
pub struct WeakToolsetGroup {
    inner: Weak<ToolsetGroupInner>,
}

struct ToolsetGroupInner {
    read_only: bool,
    toolsets: RwLock<Vec<Toolset>>,
    revision: AtomicU64,
}

impl ToolsetGroup {
    #[must_use]
    pub fn new(read_only: bool) -> Self {
        Self {
            inner: Arc::new(ToolsetGroupInner {
                read_only,
                toolsets: RwLock::new(Vec::new()),
                revision: AtomicU64::new(0),
            }),
        }
    }

    #[must_use]
    pub fn read_only(&self) -> bool {
        self.inner.read_only
    }

    /// Monotonic counter bumped whenever the set of enabled toolsets changes.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.inner.revision.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakToolsetGroup {
        WeakToolsetGroup {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Registers a toolset.
    ///
    /// # Errors
    /// Returns [`ToolsetError::DuplicateToolset`] if the name is taken, or
    /// [`ToolsetError::DuplicateTool`] if any of its tools is already registered
    /// by another toolset (or twice by this one).
    pub async fn add_toolset(&self, toolset: Toolset) -> Result<(), ToolsetError> {
        let mut toolsets = self.inner.toolsets.write().await;
        if toolsets.iter().any(|existing| existing.name() == toolset.name()) {
            return Err(ToolsetError::DuplicateToolset(toolset.name().to_string()));
        }

        let mut seen: HashSet<&str> = HashSet::new();
        for tool in toolset.tools() {
            if let Some(owner) = toolsets
                .iter()
                .find(|existing| existing.tools().iter().any(|other| other.name() == tool.name()))
            {
                return Err(ToolsetError::DuplicateTool {
                    tool: tool.name().to_string(),
                    toolset: owner.name().to_string(),
                });
            }
            if !seen.insert(tool.name()) {
                return Err(ToolsetError::DuplicateTool {
                    tool: tool.name().to_string(),
                    toolset: toolset.name().to_string(),
                });
            }
        }

        let enabled = toolset.is_enabled();
        toolsets.push(toolset);
        drop(toolsets);
        if enabled {
            self.bump_revision();
        }
        Ok(())
    }

    /// Enables a toolset by name. Enabling an enabled toolset is a no-op.
    ///
    /// Returns `true` when the toolset was newly enabled.
    ///
    /// # Errors
    /// Returns [`ToolsetError::UnknownToolset`] and leaves the group unchanged
    /// if no toolset has that name.
    pub async fn enable_toolset(&self, name: &str) -> Result<bool, ToolsetError> {
        let mut toolsets = self.inner.toolsets.write().await;
        let toolset = toolsets
            .iter_mut()
            .find(|toolset| toolset.name() == name)
            .ok_or_else(|| ToolsetError::UnknownToolset(name.to_string()))?;
        if toolset.is_enabled() {
            return Ok(false);
        }
        toolset.set_enabled(true);
        drop(toolsets);
        self.bump_revision();
        info!(toolset = name, "toolset enabled");
        Ok(true)
    }

    /// Enables several toolsets at once; [`ALL_TOOLSETS`] enables every toolset.
    ///
    /// # Errors
    /// Returns [`ToolsetError::UnknownToolset`] for the first unknown name; no
    /// toolset is enabled in that case.
    pub async fn enable_toolsets<I, S>(&self, names: I) -> Result<(), ToolsetError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<String> = names
            .into_iter()
            .map(|name| name.as_ref().to_string())
            .collect();
        let mut toolsets = self.inner.toolsets.write().await;
        let enable_all = names.iter().any(|name| name == ALL_TOOLSETS);

        if !enable_all
            && let Some(unknown) = names
                .iter()
                .find(|name| !toolsets.iter().any(|toolset| toolset.name() == name.as_str()))
        {
            return Err(ToolsetError::UnknownToolset(unknown.clone()));
        }

        let mut changed = false;
        for toolset in toolsets.iter_mut() {
            let wanted = enable_all || names.iter().any(|name| name == toolset.name());
            if wanted && !toolset.is_enabled() {
                toolset.set_enabled(true);
                changed = true;
                info!(toolset = toolset.name(), "toolset enabled");
            }
        }
        drop(toolsets);
        if changed {
            self.bump_revision();
        }
        Ok(())
    }

    /// `None` when the toolset does not exist.
    pub async fn is_enabled(&self, name: &str) -> Option<bool> {
        self.inner
            .toolsets
            .read()
            .await
            .iter()
            .find(|toolset| toolset.name() == name)
            .map(Toolset::is_enabled)
    }

    pub async fn toolset_names(&self) -> Vec<String> {
        self.inner
            .toolsets
            .read()
            .await
            .iter()
            .map(|toolset| toolset.name().to_string())
            .collect()
    }

    /// Every registered toolset with its enabled state, in registration order.
    pub async fn list_toolsets(&self) -> Vec<ToolsetSummary> {
        self.inner
            .toolsets
            .read()
            .await
            .iter()
            .map(|toolset| ToolsetSummary {
                name: toolset.name().to_string(),
                description: toolset.description().to_string(),
                currently_enabled: toolset.is_enabled(),
            })
            .collect()
    }

    /// Tools the named toolset would expose once enabled.
    ///
    /// # Errors
    /// Returns [`ToolsetError::UnknownToolset`] if no toolset has that name.
    pub async fn toolset_tools(&self, name: &str) -> Result<Vec<ServerTool>, ToolsetError> {
        let tools: Option<Vec<ServerTool>> = self
            .inner
            .toolsets
            .read()
            .await
            .iter()
            .find(|toolset| toolset.name() == name)
            .map(|toolset| {
                toolset
                    .available_tools(self.inner.read_only)
                    .cloned()
                    .collect()
            });
        tools.ok_or_else(|| ToolsetError::UnknownToolset(name.to_string()))
    }

    /// The effective tool list: every exposed tool of every enabled toolset,
    /// in registration order.
    pub async fn exposed_tools(&self) -> Vec<ServerTool> {
        self.inner
            .toolsets
            .read()
            .await
            .iter()
            .flat_map(|toolset| toolset.exposed_tools(self.inner.read_only))
            .cloned()
            .collect()
    }

    /// Re-applies the exposure filter for a single invocation.
    ///
    /// # Errors
    /// Returns a [`DispatchError`] if the tool is unknown, its toolset is
    /// disabled, or it writes while the group is read-only.
    pub async fn authorize(&self, tool_name: &str) -> Result<ServerTool, DispatchError> {
        let found = self
            .inner
            .toolsets
            .read()
            .await
            .iter()
            .find_map(|toolset| {
                toolset
                    .tools()
                    .iter()
                    .find(|tool| tool.name() == tool_name)
                    .map(|tool| (toolset.name().to_string(), toolset.is_enabled(), tool.clone()))
            });
        let Some((toolset, enabled, tool)) = found else {
            return Err(DispatchError::UnknownTool(tool_name.to_string()));
        };
        if !enabled {
            return Err(DispatchError::ToolsetDisabled {
                tool: tool_name.to_string(),
                toolset,
            });
        }
        if !is_exposed(true, self.inner.read_only, tool.kind) {
            return Err(DispatchError::ReadOnly(tool_name.to_string()));
        }
        Ok(tool)
    }

    /// Resource templates of enabled toolsets, in registration order.
    pub async fn exposed_resource_templates(&self) -> Vec<ServerResourceTemplate> {
        self.inner
            .toolsets
            .read()
            .await
            .iter()
            .filter(|toolset| toolset.is_enabled())
            .flat_map(|toolset| toolset.resource_templates().iter().cloned())
            .collect()
    }

    /// First enabled resource template matching `uri`.
    ///
    /// # Errors
    /// Returns [`DispatchError::UnknownResource`] when nothing enabled matches.
    pub async fn resource_template_for(
        &self,
        uri: &str,
    ) -> Result<ServerResourceTemplate, DispatchError> {
        let template = self
            .inner
            .toolsets
            .read()
            .await
            .iter()
            .filter(|toolset| toolset.is_enabled())
            .flat_map(Toolset::resource_templates)
            .find(|template| template.matches(uri).is_some())
            .cloned();
        template.ok_or_else(|| DispatchError::UnknownResource(uri.to_string()))
    }

    fn bump_revision(&self) {
        self.inner.revision.fetch_add(1, Ordering::AcqRel);
    }
}

impl WeakToolsetGroup {
    /// `None` once every owning handle has been dropped.
    #[must_use]
    pub fn upgrade(&self) -> Option<ToolsetGroup> {
        self.inner.upgrade().map(|inner| ToolsetGroup { inner })
    }
}

impl std::fmt::Debug for ToolsetGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsetGroup")
            .field("read_only", &self.inner.read_only)
            .field("revision", &self.revision())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tool::{OperationKind, Tool, ToolResult, ToolSpec};

    fn tool(name: &str) -> Tool {
        Tool::new(ToolSpec::new(name, name), |_request| async {
            Ok::<_, ToolError>(ToolResult::text("ok"))
        })
    }

    async fn sample_group(read_only: bool) -> ToolsetGroup {
        let group = ToolsetGroup::new(read_only);
        group
            .add_toolset(
                Toolset::new("context", "Context tools")
                    .add_read_tools([tool("get_me")])
                    .with_enabled(true),
            )
            .await
            .unwrap();
        group
            .add_toolset(
                Toolset::new("repos", "Repository tools")
                    .add_read_tools([tool("get_file_contents"), tool("list_commits")])
                    .add_write_tools([tool("create_branch")]),
            )
            .await
            .unwrap();
        group
            .add_toolset(
                Toolset::new("issues", "Issue tools")
                    .add_read_tools([tool("get_issue")])
                    .add_write_tools([tool("create_issue")]),
            )
            .await
            .unwrap();
        group
    }

    fn names(tools: &[ServerTool]) -> Vec<&str> {
        tools.iter().map(ServerTool::name).collect()
    }

    #[tokio::test]
    async fn disabled_toolsets_are_never_exposed() {
        let group = sample_group(false).await;
        let exposed = group.exposed_tools().await;
        assert_eq!(names(&exposed), vec!["get_me"]);
    }

    #[tokio::test]
    async fn exposure_follows_registration_order() {
        let group = sample_group(false).await;
        group.enable_toolsets(["issues", "repos"]).await.unwrap();

        let exposed = group.exposed_tools().await;
        assert_eq!(
            names(&exposed),
            vec![
                "get_me",
                "get_file_contents",
                "list_commits",
                "create_branch",
                "get_issue",
                "create_issue",
            ]
        );
    }

    #[tokio::test]
    async fn read_only_group_never_exposes_write_tools() {
        let group = sample_group(true).await;
        group.enable_toolsets([ALL_TOOLSETS]).await.unwrap();

        let exposed = group.exposed_tools().await;
        assert!(exposed.iter().all(|tool| tool.kind == OperationKind::Read));
        assert_eq!(
            names(&exposed),
            vec!["get_me", "get_file_contents", "list_commits", "get_issue"]
        );
    }

    #[tokio::test]
    async fn unknown_toolset_is_rejected_without_changes() {
        let group = sample_group(false).await;
        let before = group.list_toolsets().await;
        let revision = group.revision();

        let err = group.enable_toolset("nonexistent").await.unwrap_err();
        assert_eq!(err, ToolsetError::UnknownToolset("nonexistent".to_string()));

        let err = group.enable_toolsets(["repos", "nonexistent"]).await.unwrap_err();
        assert_eq!(err, ToolsetError::UnknownToolset("nonexistent".to_string()));

        assert_eq!(group.list_toolsets().await, before);
        assert_eq!(group.revision(), revision);
    }

    #[tokio::test]
    async fn enabling_twice_is_idempotent() {
        let group = sample_group(false).await;

        assert!(group.enable_toolset("repos").await.unwrap());
        let after_first = group.list_toolsets().await;
        let revision = group.revision();

        assert!(!group.enable_toolset("repos").await.unwrap());
        assert_eq!(group.list_toolsets().await, after_first);
        assert_eq!(group.revision(), revision);
    }

    #[tokio::test]
    async fn duplicate_names_are_rejected() {
        let group = sample_group(false).await;

        let err = group
            .add_toolset(Toolset::new("repos", "again"))
            .await
            .unwrap_err();
        assert_eq!(err, ToolsetError::DuplicateToolset("repos".to_string()));

        let err = group
            .add_toolset(Toolset::new("users", "Users").add_read_tools([tool("get_issue")]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ToolsetError::DuplicateTool {
                tool: "get_issue".to_string(),
                toolset: "issues".to_string(),
            }
        );

        let err = group
            .add_toolset(
                Toolset::new("users", "Users")
                    .add_read_tools([tool("search_users")])
                    .add_write_tools([tool("search_users")]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ToolsetError::DuplicateTool { .. }));
        assert!(group.is_enabled("users").await.is_none());
    }

    #[tokio::test]
    async fn authorize_rechecks_policy() {
        let group = sample_group(true).await;

        assert_eq!(
            group.authorize("get_issue").await.unwrap_err(),
            DispatchError::ToolsetDisabled {
                tool: "get_issue".to_string(),
                toolset: "issues".to_string(),
            }
        );

        group.enable_toolset("issues").await.unwrap();
        assert_eq!(group.authorize("get_issue").await.unwrap().name(), "get_issue");
        assert_eq!(
            group.authorize("create_issue").await.unwrap_err(),
            DispatchError::ReadOnly("create_issue".to_string())
        );
        assert_eq!(
            group.authorize("nope").await.unwrap_err(),
            DispatchError::UnknownTool("nope".to_string())
        );
    }

    #[tokio::test]
    async fn toolset_tools_respects_read_only() {
        let group = sample_group(true).await;
        let tools = group.toolset_tools("repos").await.unwrap();
        assert_eq!(names(&tools), vec!["get_file_contents", "list_commits"]);

        let group = sample_group(false).await;
        let tools = group.toolset_tools("repos").await.unwrap();
        assert_eq!(names(&tools), vec!["get_file_contents", "list_commits", "create_branch"]);

        assert!(group.toolset_tools("missing").await.is_err());
    }

    #[tokio::test]
    async fn concurrent_enable_and_listing_stay_consistent() {
        let group = sample_group(false).await;

        let enable_repos = group.clone();
        let enable_issues = group.clone();
        let lister = group.clone();
        let (left, right, listed) = tokio::join!(
            async move { enable_repos.enable_toolset("repos").await },
            async move { enable_issues.enable_toolset("issues").await },
            async move { lister.exposed_tools().await },
        );
        assert!(left.unwrap());
        assert!(right.unwrap());
        assert!(listed.iter().any(|tool| tool.name() == "get_me"));

        let exposed = group.exposed_tools().await;
        assert_eq!(exposed.len(), 6);
        assert_eq!(group.revision(), 3);
    }

    #[tokio::test]
    async fn groups_do_not_share_enablement() {
        let first = sample_group(false).await;
        let second = sample_group(false).await;

        first.enable_toolset("repos").await.unwrap();
        assert_eq!(first.is_enabled("repos").await, Some(true));
        assert_eq!(second.is_enabled("repos").await, Some(false));
    }

    #[tokio::test]
    async fn weak_handle_does_not_keep_group_alive() {
        let group = sample_group(false).await;
        let weak = group.downgrade();
        assert!(weak.upgrade().is_some());
        drop(group);
        assert!(weak.upgrade().is_none());
    }
}
