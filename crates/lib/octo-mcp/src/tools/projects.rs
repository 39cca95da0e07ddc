//! Projects (v2) tools. These go through GraphQL; any client or query failure
//! is reported to the caller as a tool-level error rather than a call failure.

use octo_core::{Params, SharedProvider, Translator};
use octo_toolsets::{CallContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};
use serde_json::{Value, json};

use super::{graphql, json_result, owner_repo, with_provider};

const OWNER_TYPE_USER: &str = "user";
const OWNER_TYPE_ORGANIZATION: &str = "organization";

const LIST_USER_PROJECTS: &str = "query($login: String!) { user(login: $login) { projectsV2(first: 100) { nodes { id title number } } } }";
const LIST_ORG_PROJECTS: &str = "query($login: String!) { organization(login: $login) { projectsV2(first: 100) { nodes { id title number } } } }";
const USER_PROJECT_FIELDS: &str = "query($login: String!, $number: Int!) { user(login: $login) { projectV2(number: $number) { fields(first: 100) { nodes { ... on ProjectV2FieldCommon { id name dataType } } } } } }";
const ORG_PROJECT_FIELDS: &str = "query($login: String!, $number: Int!) { organization(login: $login) { projectV2(number: $number) { fields(first: 100) { nodes { ... on ProjectV2FieldCommon { id name dataType } } } } } }";
const USER_PROJECT_ITEMS: &str = "query($login: String!, $number: Int!) { user(login: $login) { projectV2(number: $number) { items(first: 100) { nodes { id } } } } }";
const ORG_PROJECT_ITEMS: &str = "query($login: String!, $number: Int!) { organization(login: $login) { projectV2(number: $number) { items(first: 100) { nodes { id } } } } }";
const REPOSITORY_ID: &str =
    "query($owner: String!, $name: String!) { repository(owner: $owner, name: $name) { id } }";
const CREATE_ISSUE: &str =
    "mutation($input: CreateIssueInput!) { createIssue(input: $input) { issue { id } } }";
const ADD_ITEM: &str = "mutation($input: AddProjectV2ItemByIdInput!) { addProjectV2ItemById(input: $input) { item { id } } }";
const UPDATE_ITEM_FIELD: &str = "mutation($input: UpdateProjectV2ItemFieldValueInput!) { updateProjectV2ItemFieldValue(input: $input) { __typename } }";
const ADD_DRAFT_ISSUE: &str = "mutation($input: AddProjectV2DraftIssueInput!) { addProjectV2DraftIssue(input: $input) { projectItem { id } } }";
const DELETE_ITEM: &str = "mutation($input: DeleteProjectV2ItemInput!) { deleteProjectV2Item(input: $input) { deletedItemId } }";

fn owner_type_param() -> ParamSpec {
    ParamSpec::string("owner_type", "Owner type").one_of([OWNER_TYPE_USER, OWNER_TYPE_ORGANIZATION])
}

fn is_user(params: &Params<'_>) -> Result<bool, ToolError> {
    Ok(params.optional_str("owner_type")?.as_deref() == Some(OWNER_TYPE_USER))
}

async fn execute(
    provider: &SharedProvider,
    ctx: &CallContext,
    query: &str,
    variables: Value,
) -> Result<Value, String> {
    let client = graphql(provider, ctx).map_err(|err| err.to_string())?;
    client
        .query(query, variables)
        .await
        .map_err(|err| err.to_string())
}

async fn run(
    provider: &SharedProvider,
    ctx: &CallContext,
    query: &str,
    variables: Value,
) -> Result<ToolResult, ToolError> {
    match execute(provider, ctx, query, variables).await {
        Ok(data) => json_result(&data),
        Err(message) => Ok(ToolResult::error(message)),
    }
}

pub fn list_projects(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_projects",
        t.translate(
            "TOOL_LIST_PROJECTS_DESCRIPTION",
            "List Projects for a user or organization",
        ),
    )
    .title(t.translate("TOOL_LIST_PROJECTS_USER_TITLE", "List projects"))
    .param(ParamSpec::string("owner", "Owner login (user or organization)").required())
    .param(owner_type_param());
    Tool::new(spec, with_provider(provider, handle_list_projects))
}

async fn handle_list_projects(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let owner = params.required_str("owner")?;
    let query = if is_user(&params)? {
        LIST_USER_PROJECTS
    } else {
        LIST_ORG_PROJECTS
    };
    run(&provider, &request.context, query, json!({ "login": owner })).await
}

pub fn get_project_fields(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_project_fields",
        t.translate("TOOL_GET_PROJECT_FIELDS_DESCRIPTION", "Get fields for a project"),
    )
    .title(t.translate("TOOL_GET_PROJECT_FIELDS_USER_TITLE", "Get project fields"))
    .param(ParamSpec::string("owner", "Owner login").required())
    .param(owner_type_param())
    .param(ParamSpec::number("number", "Project number").required());
    Tool::new(spec, with_provider(provider, handle_get_project_fields))
}

async fn handle_get_project_fields(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let owner = params.required_str("owner")?;
    let number = params.required_int("number")?;
    let query = if is_user(&params)? {
        USER_PROJECT_FIELDS
    } else {
        ORG_PROJECT_FIELDS
    };
    run(
        &provider,
        &request.context,
        query,
        json!({ "login": owner, "number": number }),
    )
    .await
}

pub fn get_project_items(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_project_items",
        t.translate("TOOL_GET_PROJECT_ITEMS_DESCRIPTION", "Get items for a project"),
    )
    .title(t.translate("TOOL_GET_PROJECT_ITEMS_USER_TITLE", "Get project items"))
    .param(ParamSpec::string("owner", "Owner login").required())
    .param(owner_type_param())
    .param(ParamSpec::number("number", "Project number").required());
    Tool::new(spec, with_provider(provider, handle_get_project_items))
}

async fn handle_get_project_items(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let owner = params.required_str("owner")?;
    let number = params.required_int("number")?;
    let query = if is_user(&params)? {
        USER_PROJECT_ITEMS
    } else {
        ORG_PROJECT_ITEMS
    };
    run(
        &provider,
        &request.context,
        query,
        json!({ "login": owner, "number": number }),
    )
    .await
}

/// Looks up the repository node id, then creates the issue against it.
pub fn create_project_issue(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_project_issue",
        t.translate("TOOL_CREATE_PROJECT_ISSUE_DESCRIPTION", "Create a new issue"),
    )
    .title(t.translate("TOOL_CREATE_PROJECT_ISSUE_USER_TITLE", "Create issue"))
    .param(ParamSpec::string("owner", "Repository owner").required())
    .param(ParamSpec::string("repo", "Repository name").required())
    .param(ParamSpec::string("title", "Issue title").required())
    .param(ParamSpec::string("body", "Issue body"));
    Tool::new(spec, with_provider(provider, handle_create_project_issue))
}

async fn handle_create_project_issue(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let title = params.required_str("title")?;
    let body = params.optional_str("body")?;

    let repository = match execute(
        &provider,
        &request.context,
        REPOSITORY_ID,
        json!({ "owner": owner, "name": repo }),
    )
    .await
    {
        Ok(data) => data,
        Err(message) => return Ok(ToolResult::error(message)),
    };
    let Some(repository_id) = repository.pointer("/repository/id").and_then(Value::as_str) else {
        return Ok(ToolResult::error(format!("repository {owner}/{repo} not found")));
    };

    let mut input = json!({ "repositoryId": repository_id, "title": title });
    if let (Some(body), Value::Object(map)) = (body, &mut input) {
        map.insert("body".to_string(), Value::String(body));
    }
    run(&provider, &request.context, CREATE_ISSUE, json!({ "input": input })).await
}

pub fn add_issue_to_project(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "add_issue_to_project",
        t.translate("TOOL_ADD_ISSUE_TO_PROJECT_DESCRIPTION", "Add an issue to a project"),
    )
    .title(t.translate("TOOL_ADD_ISSUE_TO_PROJECT_USER_TITLE", "Add issue to project"))
    .param(ParamSpec::string("project_id", "Project ID").required())
    .param(ParamSpec::string("issue_id", "Issue node ID").required());
    Tool::new(spec, with_provider(provider, handle_add_issue_to_project))
}

async fn handle_add_issue_to_project(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let input = json!({
        "projectId": params.required_str("project_id")?,
        "contentId": params.required_str("issue_id")?,
    });
    run(&provider, &request.context, ADD_ITEM, json!({ "input": input })).await
}

pub fn update_project_item_field(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "update_project_item_field",
        t.translate(
            "TOOL_UPDATE_PROJECT_ITEM_FIELD_DESCRIPTION",
            "Update a project item field",
        ),
    )
    .title(t.translate("TOOL_UPDATE_PROJECT_ITEM_FIELD_USER_TITLE", "Update project item field"))
    .param(ParamSpec::string("project_id", "Project ID").required())
    .param(ParamSpec::string("item_id", "Item ID").required())
    .param(ParamSpec::string("field_id", "Field ID").required())
    .param(ParamSpec::string("text_value", "Text value"));
    Tool::new(spec, with_provider(provider, handle_update_project_item_field))
}

async fn handle_update_project_item_field(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let value = match params.optional_str("text_value")? {
        Some(text) => json!({ "text": text }),
        None => json!({}),
    };
    let input = json!({
        "projectId": params.required_str("project_id")?,
        "itemId": params.required_str("item_id")?,
        "fieldId": params.required_str("field_id")?,
        "value": value,
    });
    run(&provider, &request.context, UPDATE_ITEM_FIELD, json!({ "input": input })).await
}

pub fn create_draft_issue(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "create_draft_issue",
        t.translate(
            "TOOL_CREATE_DRAFT_ISSUE_DESCRIPTION",
            "Create a draft issue in a project",
        ),
    )
    .title(t.translate("TOOL_CREATE_DRAFT_ISSUE_USER_TITLE", "Create draft issue"))
    .param(ParamSpec::string("project_id", "Project ID").required())
    .param(ParamSpec::string("title", "Issue title").required())
    .param(ParamSpec::string("body", "Issue body"));
    Tool::new(spec, with_provider(provider, handle_create_draft_issue))
}

async fn handle_create_draft_issue(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let mut input = json!({
        "projectId": params.required_str("project_id")?,
        "title": params.required_str("title")?,
    });
    if let (Some(body), Value::Object(map)) = (params.optional_str("body")?, &mut input) {
        map.insert("body".to_string(), Value::String(body));
    }
    run(&provider, &request.context, ADD_DRAFT_ISSUE, json!({ "input": input })).await
}

pub fn delete_project_item(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "delete_project_item",
        t.translate("TOOL_DELETE_PROJECT_ITEM_DESCRIPTION", "Delete a project item"),
    )
    .title(t.translate("TOOL_DELETE_PROJECT_ITEM_USER_TITLE", "Delete project item"))
    .destructive()
    .param(ParamSpec::string("project_id", "Project ID").required())
    .param(ParamSpec::string("item_id", "Item ID").required());
    Tool::new(spec, with_provider(provider, handle_delete_project_item))
}

async fn handle_delete_project_item(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let input = json!({
        "projectId": params.required_str("project_id")?,
        "itemId": params.required_str("item_id")?,
    });
    run(&provider, &request.context, DELETE_ITEM, json!({ "input": input })).await
}
