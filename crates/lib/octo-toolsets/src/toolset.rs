use crate::resource::ServerResourceTemplate;
use crate::tool::{OperationKind, ServerTool, Tool, is_exposed};

/// A named, independently enabled group of tools and resource templates.
#[derive(Debug, Clone)]
pub struct Toolset {
    name: String,
    description: String,
    enabled: bool,
    tools: Vec<ServerTool>,
    resource_templates: Vec<ServerResourceTemplate>,
}

impl Toolset {
    /// Creates a disabled, empty toolset.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            enabled: false,
            tools: Vec::new(),
            resource_templates: Vec::new(),
        }
    }

    #[must_use]
    pub fn add_read_tools(self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.add_tools(tools, OperationKind::Read)
    }

    /// Registers mutating tools.
    ///
    /// They stay registered under a read-only group; exposure is decided when
    /// listing and dispatching.
    #[must_use]
    pub fn add_write_tools(self, tools: impl IntoIterator<Item = Tool>) -> Self {
        self.add_tools(tools, OperationKind::Write)
    }

    #[must_use]
    pub fn add_resource_templates(
        mut self,
        templates: impl IntoIterator<Item = ServerResourceTemplate>,
    ) -> Self {
        self.resource_templates.extend(templates);
        self
    }

    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    fn add_tools(mut self, tools: impl IntoIterator<Item = Tool>, kind: OperationKind) -> Self {
        self.tools
            .extend(tools.into_iter().map(|tool| ServerTool::from_tool(tool, kind)));
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub(crate) const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// All registered tools in registration order, regardless of exposure.
    #[must_use]
    pub fn tools(&self) -> &[ServerTool] {
        &self.tools
    }

    #[must_use]
    pub fn resource_templates(&self) -> &[ServerResourceTemplate] {
        &self.resource_templates
    }

    /// Tools this toolset would expose if enabled, honoring `read_only`.
    pub fn available_tools(&self, read_only: bool) -> impl Iterator<Item = &ServerTool> {
        self.tools
            .iter()
            .filter(move |tool| is_exposed(true, read_only, tool.kind))
    }

    /// Tools currently exposed by this toolset.
    pub fn exposed_tools(&self, read_only: bool) -> impl Iterator<Item = &ServerTool> {
        let enabled = self.enabled;
        self.tools
            .iter()
            .filter(move |tool| is_exposed(enabled, read_only, tool.kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tool::{ToolResult, ToolSpec};

    fn tool(name: &str) -> Tool {
        Tool::new(ToolSpec::new(name, name), |_request| async {
            Ok::<_, ToolError>(ToolResult::text("ok"))
        })
    }

    #[test]
    fn new_toolset_is_disabled() {
        let toolset = Toolset::new("repos", "Repository tools");
        assert!(!toolset.is_enabled());
        assert_eq!(toolset.name(), "repos");
    }

    #[test]
    fn kinds_are_assigned_at_registration() {
        let toolset = Toolset::new("repos", "Repository tools")
            .add_read_tools([tool("get_file_contents")])
            .add_write_tools([tool("delete_file")]);

        let kinds: Vec<_> = toolset
            .tools()
            .iter()
            .map(|tool| (tool.name().to_string(), tool.kind))
            .collect();
        assert_eq!(
            kinds,
            vec![
                ("get_file_contents".to_string(), OperationKind::Read),
                ("delete_file".to_string(), OperationKind::Write),
            ]
        );
    }

    #[test]
    fn read_only_hides_but_keeps_write_tools() {
        let toolset = Toolset::new("repos", "Repository tools")
            .add_read_tools([tool("get_file_contents")])
            .add_write_tools([tool("delete_file")])
            .with_enabled(true);

        let exposed: Vec<_> = toolset.exposed_tools(true).map(ServerTool::name).collect();
        assert_eq!(exposed, vec!["get_file_contents"]);
        assert_eq!(toolset.tools().len(), 2);

        let exposed: Vec<_> = toolset.exposed_tools(false).map(ServerTool::name).collect();
        assert_eq!(exposed, vec!["get_file_contents", "delete_file"]);
    }

    #[test]
    fn disabled_toolset_exposes_nothing_but_reports_availability() {
        let toolset = Toolset::new("issues", "Issue tools")
            .add_read_tools([tool("get_issue")])
            .add_write_tools([tool("create_issue")]);

        assert_eq!(toolset.exposed_tools(false).count(), 0);
        assert_eq!(toolset.available_tools(false).count(), 2);
        assert_eq!(toolset.available_tools(true).count(), 1);
    }
}
