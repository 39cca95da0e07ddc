use octo_core::{Params, QueryParams, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};
use reqwest::Method;
use serde_json::{Map, Value};

use super::{json_result, rest, with_provider};

const FILTER_DEFAULT: &str = "default";
const FILTER_INCLUDE_READ: &str = "include_read_notifications";
const FILTER_ONLY_PARTICIPATING: &str = "only_participating";

pub fn list_notifications(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_notifications",
        t.translate(
            "TOOL_LIST_NOTIFICATIONS_DESCRIPTION",
            "Lists all GitHub notifications for the authenticated user, including unread notifications, mentions, review requests, assignments, and updates on issues or pull requests. Use this tool whenever the user asks what to work on next, requests a summary of their GitHub activity, wants to see pending reviews, or needs to check for new updates or tasks.",
        ),
    )
    .title(t.translate("TOOL_LIST_NOTIFICATIONS_USER_TITLE", "List notifications"))
    .param(
        ParamSpec::string(
            "filter",
            "Filter notifications to, use default unless specified. Read notifications are ones that have already been acknowledged by the user. Participating notifications are those that the user is directly involved in, such as issues or pull requests they have commented on or created.",
        )
        .one_of([FILTER_DEFAULT, FILTER_INCLUDE_READ, FILTER_ONLY_PARTICIPATING]),
    )
    .param(ParamSpec::string(
        "since",
        "Only show notifications updated after the given time (ISO 8601 format)",
    ))
    .param(ParamSpec::string(
        "before",
        "Only show notifications updated before the given time (ISO 8601 format)",
    ))
    .param(ParamSpec::string(
        "owner",
        "Optional repository owner. If provided with repo, only notifications for this repository are listed.",
    ))
    .param(ParamSpec::string(
        "repo",
        "Optional repository name. If provided with owner, only notifications for this repository are listed.",
    ))
    .paginated();
    Tool::new(spec, with_provider(provider, handle_list_notifications))
}

async fn handle_list_notifications(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let filter = params
        .optional_str("filter")?
        .unwrap_or_else(|| FILTER_DEFAULT.to_string());
    let query = QueryParams::new()
        .push("all", filter == FILTER_INCLUDE_READ)
        .push("participating", filter == FILTER_ONLY_PARTICIPATING)
        .push_opt("since", params.optional_str("since")?)
        .push_opt("before", params.optional_str("before")?)
        .paginate(params.pagination()?);

    let segments: Vec<String> = match (params.optional_str("owner")?, params.optional_str("repo")?) {
        (Some(owner), Some(repo)) => vec!["repos".into(), owner, repo, "notifications".into()],
        _ => vec!["notifications".into()],
    };

    let client = rest(&provider, &request.context)?;
    let notifications = client
        .get(&segments, &query)
        .await
        .context("failed to get notifications")?;
    json_result(&notifications)
}

pub fn get_notification_details(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_notification_details",
        t.translate(
            "TOOL_GET_NOTIFICATION_DETAILS_DESCRIPTION",
            "Get detailed information for a specific GitHub notification, always call this tool when the user asks for details about a specific notification, if you don't know the ID list notifications first.",
        ),
    )
    .title(t.translate("TOOL_GET_NOTIFICATION_DETAILS_USER_TITLE", "Get notification details"))
    .param(ParamSpec::string("notificationID", "The ID of the notification").required());
    Tool::new(spec, with_provider(provider, handle_get_notification_details))
}

async fn handle_get_notification_details(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let id = params.required_str("notificationID")?;

    let client = rest(&provider, &request.context)?;
    let thread = client
        .get(&["notifications", "threads", &id], &QueryParams::new())
        .await
        .context(format!("failed to get notification details for ID '{id}'"))?;
    json_result(&thread)
}

/// `read` marks the thread read, `done` removes it from the inbox.
pub fn dismiss_notification(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "dismiss_notification",
        t.translate(
            "TOOL_DISMISS_NOTIFICATION_DESCRIPTION",
            "Dismiss a notification by marking it as read or done",
        ),
    )
    .title(t.translate("TOOL_DISMISS_NOTIFICATION_USER_TITLE", "Dismiss notification"))
    .param(ParamSpec::string("threadID", "The ID of the notification thread").required())
    .param(
        ParamSpec::string("state", "The new state of the notification (read/done)")
            .one_of(["read", "done"])
            .required(),
    );
    Tool::new(spec, with_provider(provider, handle_dismiss_notification))
}

async fn handle_dismiss_notification(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let thread_id = params.required_str("threadID")?;
    let state = params.required_str("state")?;
    let method = match state.as_str() {
        "read" => Method::PATCH,
        "done" => Method::DELETE,
        other => {
            return Err(ToolError::invalid_params(format!(
                "invalid state: must be 'read' or 'done', got '{other}'"
            )));
        }
    };

    let client = rest(&provider, &request.context)?;
    client
        .send_for_status(method, &["notifications", "threads", &thread_id], None)
        .await
        .context(format!("failed to mark notification as {state}"))?;
    Ok(ToolResult::text(format!(
        "Notification marked as {state}"
    )))
}

pub fn mark_all_notifications_read(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "mark_all_notifications_read",
        t.translate(
            "TOOL_MARK_ALL_NOTIFICATIONS_READ_DESCRIPTION",
            "Mark all notifications as read",
        ),
    )
    .title(t.translate("TOOL_MARK_ALL_NOTIFICATIONS_READ_USER_TITLE", "Mark all notifications as read"))
    .param(ParamSpec::string(
        "lastReadAt",
        "Describes the last point that notifications were checked (optional). Default: Now",
    ))
    .param(ParamSpec::string(
        "owner",
        "Optional repository owner. If provided with repo, only notifications for this repository are marked as read.",
    ))
    .param(ParamSpec::string(
        "repo",
        "Optional repository name. If provided with owner, only notifications for this repository are marked as read.",
    ));
    Tool::new(spec, with_provider(provider, handle_mark_all_notifications_read))
}

async fn handle_mark_all_notifications_read(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let mut body = Map::new();
    if let Some(last_read_at) = params.optional_str("lastReadAt")? {
        body.insert("last_read_at".to_string(), Value::String(last_read_at));
    }
    let segments: Vec<String> = match (params.optional_str("owner")?, params.optional_str("repo")?) {
        (Some(owner), Some(repo)) => vec!["repos".into(), owner, repo, "notifications".into()],
        _ => vec!["notifications".into()],
    };

    let client = rest(&provider, &request.context)?;
    client
        .send_for_status(Method::PUT, &segments, Some(&Value::Object(body)))
        .await
        .context("failed to mark all notifications as read")?;
    Ok(ToolResult::text("All notifications marked as read"))
}
