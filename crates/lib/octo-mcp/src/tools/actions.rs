//! GitHub Actions tools: workflows, runs, jobs, logs, and artifacts.

use futures::future::join_all;
use octo_core::{ApiError, Params, QueryParams, RestClient, SharedProvider, Translator};
use octo_toolsets::{ErrorContext, ParamSpec, Tool, ToolError, ToolRequest, ToolResult, ToolSpec};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{json_result, owner_param, owner_repo, repo_param, repo_segments, rest, with_provider};

const WORKFLOW_EVENTS: [&str; 32] = [
    "branch_protection_rule",
    "check_run",
    "check_suite",
    "create",
    "delete",
    "deployment",
    "deployment_status",
    "discussion",
    "discussion_comment",
    "fork",
    "gollum",
    "issue_comment",
    "issues",
    "label",
    "merge_group",
    "milestone",
    "page_build",
    "public",
    "pull_request",
    "pull_request_review",
    "pull_request_review_comment",
    "pull_request_target",
    "push",
    "registry_package",
    "release",
    "repository_dispatch",
    "schedule",
    "status",
    "watch",
    "workflow_call",
    "workflow_dispatch",
    "workflow_run",
];

const RUN_STATUSES: [&str; 5] = ["queued", "in_progress", "completed", "requested", "waiting"];

const CONCLUSION_FAILURE: &str = "failure";

fn run_id_param() -> ParamSpec {
    ParamSpec::number("run_id", "The unique identifier of the workflow run").required()
}

/// Actions endpoints use `per_page`/`page` rather than the camel-cased pair.
fn paginated(spec: ToolSpec) -> ToolSpec {
    spec.param(
        ParamSpec::number("per_page", "The number of results per page (max 100)").range(1, 100),
    )
    .param(ParamSpec::number("page", "The page number of the results to fetch").range(1, i64::MAX))
}

fn run_segments(params: &Params<'_>, rest: &[&str]) -> Result<(Vec<String>, i64), ToolError> {
    let (owner, repo) = owner_repo(params)?;
    let run_id = params.required_int("run_id")?;
    let id = run_id.to_string();
    let mut segments = repo_segments(&owner, &repo, &["actions", "runs", &id]);
    segments.extend(rest.iter().map(|segment| (*segment).to_string()));
    Ok((segments, run_id))
}

/// Outcome of a state-changing call whose response body is empty.
#[derive(Debug, Serialize)]
struct RunActionResult {
    message: &'static str,
    run_id: i64,
    status: String,
    status_code: u16,
}

impl RunActionResult {
    fn new(message: &'static str, run_id: i64, status: StatusCode) -> Self {
        Self {
            message,
            run_id,
            status: status.to_string(),
            status_code: status.as_u16(),
        }
    }
}

pub fn list_workflows(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_workflows",
        t.translate("TOOL_LIST_WORKFLOWS_DESCRIPTION", "List workflows in a repository"),
    )
    .title(t.translate("TOOL_LIST_WORKFLOWS_USER_TITLE", "List workflows"))
    .param(owner_param())
    .param(repo_param());
    Tool::new(paginated(spec), with_provider(provider, handle_list_workflows))
}

async fn handle_list_workflows(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let query = QueryParams::new().paginate(params.pagination_named("page", "per_page")?);

    let client = rest(&provider, &request.context)?;
    let workflows = client
        .get(&repo_segments(&owner, &repo, &["actions", "workflows"]), &query)
        .await
        .context("failed to list workflows")?;
    json_result(&workflows)
}

pub fn list_workflow_runs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_workflow_runs",
        t.translate(
            "TOOL_LIST_WORKFLOW_RUNS_DESCRIPTION",
            "List workflow runs for a specific workflow",
        ),
    )
    .title(t.translate("TOOL_LIST_WORKFLOW_RUNS_USER_TITLE", "List workflow runs"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::string("workflow_id", "The workflow ID or workflow file name").required())
    .param(ParamSpec::string(
        "actor",
        "Returns someone's workflow runs. Use the login for the user who created the workflow run.",
    ))
    .param(ParamSpec::string(
        "branch",
        "Returns workflow runs associated with a branch. Use the name of the branch.",
    ))
    .param(
        ParamSpec::string("event", "Returns workflow runs for a specific event type")
            .one_of(WORKFLOW_EVENTS),
    )
    .param(
        ParamSpec::string("status", "Returns workflow runs with the check run status")
            .one_of(RUN_STATUSES),
    );
    Tool::new(paginated(spec), with_provider(provider, handle_list_workflow_runs))
}

async fn handle_list_workflow_runs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let workflow_id = params.required_str("workflow_id")?;
    let mut query = QueryParams::new();
    for field in ["actor", "branch", "event", "status"] {
        query = query.push_opt(field, params.optional_str(field)?);
    }
    let query = query.paginate(params.pagination_named("page", "per_page")?);

    let client = rest(&provider, &request.context)?;
    let runs = client
        .get(
            &repo_segments(&owner, &repo, &["actions", "workflows", &workflow_id, "runs"]),
            &query,
        )
        .await
        .context("failed to list workflow runs")?;
    json_result(&runs)
}

/// Dispatches a workflow by numeric id or by file name.
pub fn run_workflow(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "run_workflow",
        t.translate(
            "TOOL_RUN_WORKFLOW_DESCRIPTION",
            "Run an Actions workflow by workflow ID or filename",
        ),
    )
    .title(t.translate("TOOL_RUN_WORKFLOW_USER_TITLE", "Run workflow"))
    .param(owner_param())
    .param(repo_param())
    .param(
        ParamSpec::string(
            "workflow_id",
            "The workflow ID (numeric) or workflow file name (e.g., main.yml, ci.yaml)",
        )
        .required(),
    )
    .param(
        ParamSpec::string(
            "ref",
            "The git reference for the workflow. The reference can be a branch or tag name.",
        )
        .required(),
    )
    .param(ParamSpec::object("inputs", "Inputs the workflow accepts"));
    Tool::new(spec, with_provider(provider, handle_run_workflow))
}

fn workflow_type(workflow_id: &str) -> &'static str {
    if workflow_id.parse::<i64>().is_ok() {
        "workflow_id"
    } else {
        "workflow_file"
    }
}

async fn handle_run_workflow(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let workflow_id = params.required_str("workflow_id")?;
    let git_ref = params.required_str("ref")?;
    let inputs = params.optional_object("inputs")?;

    let mut body = Map::new();
    body.insert("ref".to_string(), Value::String(git_ref.clone()));
    if let Some(inputs) = &inputs {
        body.insert("inputs".to_string(), Value::Object(inputs.clone()));
    }

    let client = rest(&provider, &request.context)?;
    let status = client
        .send_for_status(
            Method::POST,
            &repo_segments(
                &owner,
                &repo,
                &["actions", "workflows", &workflow_id, "dispatches"],
            ),
            Some(&Value::Object(body)),
        )
        .await
        .context("failed to run workflow")?;

    json_result(&json!({
        "message": "Workflow run has been queued",
        "workflow_type": workflow_type(&workflow_id),
        "workflow_id": workflow_id,
        "ref": git_ref,
        "inputs": inputs,
        "status": status.to_string(),
        "status_code": status.as_u16(),
    }))
}

pub fn get_workflow_run(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_workflow_run",
        t.translate(
            "TOOL_GET_WORKFLOW_RUN_DESCRIPTION",
            "Get details of a specific workflow run",
        ),
    )
    .title(t.translate("TOOL_GET_WORKFLOW_RUN_USER_TITLE", "Get workflow run"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_get_workflow_run))
}

async fn handle_get_workflow_run(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, _) = run_segments(&params, &[])?;

    let client = rest(&provider, &request.context)?;
    let run = client
        .get(&segments, &QueryParams::new())
        .await
        .context("failed to get workflow run")?;
    json_result(&run)
}

pub fn get_workflow_run_logs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_workflow_run_logs",
        t.translate(
            "TOOL_GET_WORKFLOW_RUN_LOGS_DESCRIPTION",
            "Download logs for a specific workflow run (EXPENSIVE: downloads ALL logs as ZIP. Consider using get_job_logs with failed_only=true for debugging failed jobs)",
        ),
    )
    .title(t.translate("TOOL_GET_WORKFLOW_RUN_LOGS_USER_TITLE", "Get workflow run logs"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_get_workflow_run_logs))
}

async fn handle_get_workflow_run_logs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["logs"])?;

    let client = rest(&provider, &request.context)?;
    let url = client
        .redirect_location(&segments, &QueryParams::new())
        .await
        .context("failed to get workflow run logs")?;

    json_result(&json!({
        "logs_url": url.as_str(),
        "message": "Workflow run logs are available for download",
        "note": "The logs_url provides a download link for the complete workflow run logs as a ZIP archive. You can download this archive to extract and examine individual job logs.",
        "warning": "This downloads ALL logs as a ZIP file which can be large and expensive. For debugging failed jobs, consider using get_job_logs with failed_only=true and run_id instead.",
        "optimization_tip": format!(
            "Use: get_job_logs with parameters {{run_id: {run_id}, failed_only: true}} for more efficient failed job debugging"
        ),
    }))
}

pub fn list_workflow_jobs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_workflow_jobs",
        t.translate(
            "TOOL_LIST_WORKFLOW_JOBS_DESCRIPTION",
            "List jobs for a specific workflow run",
        ),
    )
    .title(t.translate("TOOL_LIST_WORKFLOW_JOBS_USER_TITLE", "List workflow jobs"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param())
    .param(
        ParamSpec::string("filter", "Filters jobs by their completed_at timestamp")
            .one_of(["latest", "all"]),
    );
    Tool::new(paginated(spec), with_provider(provider, handle_list_workflow_jobs))
}

async fn handle_list_workflow_jobs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["jobs"])?;
    let query = QueryParams::new()
        .push_opt("filter", params.optional_str("filter")?)
        .paginate(params.pagination_named("page", "per_page")?);

    let client = rest(&provider, &request.context)?;
    let jobs = client
        .get(&segments, &query)
        .await
        .context("failed to list workflow jobs")?;

    json_result(&json!({
        "jobs": jobs,
        "optimization_tip": format!(
            "For debugging failed jobs, consider using get_job_logs with failed_only=true and run_id={run_id} to get logs directly without needing to list jobs first"
        ),
    }))
}

/// Logs for one job, or for every failed job of a run.
///
/// In failed-only mode a job whose logs cannot be fetched is reported inline
/// with its error; the remaining jobs are still returned.
pub fn get_job_logs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_job_logs",
        t.translate(
            "TOOL_GET_JOB_LOGS_DESCRIPTION",
            "Download logs for a specific workflow job or efficiently get all failed job logs for a workflow run",
        ),
    )
    .title(t.translate("TOOL_GET_JOB_LOGS_USER_TITLE", "Get job logs"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::number(
        "job_id",
        "The unique identifier of the workflow job (required for single job logs)",
    ))
    .param(ParamSpec::number(
        "run_id",
        "Workflow run ID (required when using failed_only)",
    ))
    .param(ParamSpec::boolean(
        "failed_only",
        "When true, gets logs for all failed jobs in run_id",
    ))
    .param(ParamSpec::boolean(
        "return_content",
        "Returns actual log content instead of URLs",
    ));
    Tool::new(spec, with_provider(provider, handle_get_job_logs))
}

async fn handle_get_job_logs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let job_id = params.optional_int("job_id")?.unwrap_or_default();
    let run_id = params.optional_int("run_id")?.unwrap_or_default();
    let failed_only = params.optional_bool("failed_only")?;
    let return_content = params.optional_bool("return_content")?;

    let client = rest(&provider, &request.context)?;

    if failed_only && run_id == 0 {
        return Ok(ToolResult::error("run_id is required when failed_only is true"));
    }
    if !failed_only && job_id == 0 {
        return Ok(ToolResult::error("job_id is required when failed_only is false"));
    }

    let logs = JobLogs {
        client: &client,
        owner: &owner,
        repo: &repo,
        return_content,
    };
    if failed_only && run_id > 0 {
        return logs.failed_jobs(run_id).await;
    }
    if job_id > 0 {
        return match logs.job(job_id, None).await {
            Ok(result) => json_result(&result),
            Err(message) => Ok(ToolResult::error(message)),
        };
    }
    Ok(ToolResult::error(
        "Either job_id must be provided for single job logs, or run_id with failed_only=true for failed job logs",
    ))
}

struct JobLogs<'a> {
    client: &'a RestClient,
    owner: &'a str,
    repo: &'a str,
    return_content: bool,
}

impl JobLogs<'_> {
    async fn failed_jobs(&self, run_id: i64) -> Result<ToolResult, ToolError> {
        let id = run_id.to_string();
        let listing = match self
            .client
            .get(
                &repo_segments(self.owner, self.repo, &["actions", "runs", &id, "jobs"]),
                &QueryParams::new().push("filter", "latest"),
            )
            .await
        {
            Ok(listing) => listing,
            Err(err) => {
                return Ok(ToolResult::error(format!(
                    "failed to list workflow jobs: {err}"
                )));
            }
        };

        let jobs = listing
            .get("jobs")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        let failed: Vec<(i64, String)> = jobs
            .iter()
            .filter(|job| job.get("conclusion").and_then(Value::as_str) == Some(CONCLUSION_FAILURE))
            .filter_map(|job| {
                let id = job.get("id").and_then(Value::as_i64)?;
                let name = job
                    .get("name")
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                Some((id, name))
            })
            .collect();

        if failed.is_empty() {
            return json_result(&json!({
                "message": "No failed jobs found in this workflow run",
                "run_id": run_id,
                "total_jobs": jobs.len(),
                "failed_jobs": 0,
            }));
        }

        let results = join_all(failed.iter().map(|(job_id, name)| async move {
            match self.job(*job_id, Some(name.as_str())).await {
                Ok(result) => result,
                Err(message) => {
                    tracing::warn!(job_id = *job_id, %message, "failed to fetch job logs");
                    json!({ "job_id": job_id, "job_name": name, "error": message })
                }
            }
        }))
        .await;

        json_result(&json!({
            "message": format!("Retrieved logs for {} failed jobs", failed.len()),
            "run_id": run_id,
            "total_jobs": jobs.len(),
            "failed_jobs": failed.len(),
            "logs": results,
            "return_format": { "content": self.return_content, "urls": !self.return_content },
        }))
    }

    async fn job(&self, job_id: i64, name: Option<&str>) -> Result<Value, String> {
        let id = job_id.to_string();
        let url = self
            .client
            .redirect_location(
                &repo_segments(self.owner, self.repo, &["actions", "jobs", &id, "logs"]),
                &QueryParams::new(),
            )
            .await
            .map_err(|err| format!("failed to get job logs for job {job_id}: {err}"))?;

        let mut result = Map::new();
        result.insert("job_id".to_string(), json!(job_id));
        if let Some(name) = name.filter(|name| !name.is_empty()) {
            result.insert("job_name".to_string(), json!(name));
        }

        if self.return_content {
            let content = self
                .client
                .download_text(url)
                .await
                .map_err(|err: ApiError| {
                    format!("failed to download log content for job {job_id}: {err}")
                })?;
            result.insert("logs_content".to_string(), json!(content.trim()));
            result.insert(
                "message".to_string(),
                json!("Job logs content retrieved successfully"),
            );
        } else {
            result.insert("logs_url".to_string(), json!(url.as_str()));
            result.insert(
                "message".to_string(),
                json!("Job logs are available for download"),
            );
            result.insert(
                "note".to_string(),
                json!("The logs_url provides a download link for the individual job logs in plain text format. Use return_content=true to get the actual log content."),
            );
        }
        Ok(Value::Object(result))
    }
}

pub fn rerun_workflow_run(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "rerun_workflow_run",
        t.translate("TOOL_RERUN_WORKFLOW_RUN_DESCRIPTION", "Re-run an entire workflow run"),
    )
    .title(t.translate("TOOL_RERUN_WORKFLOW_RUN_USER_TITLE", "Rerun workflow run"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_rerun_workflow_run))
}

async fn handle_rerun_workflow_run(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["rerun"])?;

    let client = rest(&provider, &request.context)?;
    let status = client
        .send_for_status(Method::POST, &segments, None)
        .await
        .context("failed to rerun workflow run")?;
    json_result(&RunActionResult::new(
        "Workflow run has been queued for re-run",
        run_id,
        status,
    ))
}

pub fn rerun_failed_jobs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "rerun_failed_jobs",
        t.translate(
            "TOOL_RERUN_FAILED_JOBS_DESCRIPTION",
            "Re-run only the failed jobs in a workflow run",
        ),
    )
    .title(t.translate("TOOL_RERUN_FAILED_JOBS_USER_TITLE", "Rerun failed jobs"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_rerun_failed_jobs))
}

async fn handle_rerun_failed_jobs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["rerun-failed-jobs"])?;

    let client = rest(&provider, &request.context)?;
    let status = client
        .send_for_status(Method::POST, &segments, None)
        .await
        .context("failed to rerun failed jobs")?;
    json_result(&RunActionResult::new(
        "Failed jobs have been queued for re-run",
        run_id,
        status,
    ))
}

pub fn cancel_workflow_run(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "cancel_workflow_run",
        t.translate("TOOL_CANCEL_WORKFLOW_RUN_DESCRIPTION", "Cancel a workflow run"),
    )
    .title(t.translate("TOOL_CANCEL_WORKFLOW_RUN_USER_TITLE", "Cancel workflow run"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_cancel_workflow_run))
}

async fn handle_cancel_workflow_run(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["cancel"])?;

    let client = rest(&provider, &request.context)?;
    let status = client
        .send_for_status(Method::POST, &segments, None)
        .await
        .context("failed to cancel workflow run")?;
    json_result(&RunActionResult::new(
        "Workflow run has been cancelled",
        run_id,
        status,
    ))
}

pub fn list_workflow_run_artifacts(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "list_workflow_run_artifacts",
        t.translate(
            "TOOL_LIST_WORKFLOW_RUN_ARTIFACTS_DESCRIPTION",
            "List artifacts for a workflow run",
        ),
    )
    .title(t.translate("TOOL_LIST_WORKFLOW_RUN_ARTIFACTS_USER_TITLE", "List workflow artifacts"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(
        paginated(spec),
        with_provider(provider, handle_list_workflow_run_artifacts),
    )
}

async fn handle_list_workflow_run_artifacts(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, _) = run_segments(&params, &["artifacts"])?;
    let query = QueryParams::new().paginate(params.pagination_named("page", "per_page")?);

    let client = rest(&provider, &request.context)?;
    let artifacts = client
        .get(&segments, &query)
        .await
        .context("failed to list workflow run artifacts")?;
    json_result(&artifacts)
}

pub fn download_workflow_run_artifact(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "download_workflow_run_artifact",
        t.translate(
            "TOOL_DOWNLOAD_WORKFLOW_RUN_ARTIFACT_DESCRIPTION",
            "Get download URL for a workflow run artifact",
        ),
    )
    .title(t.translate("TOOL_DOWNLOAD_WORKFLOW_RUN_ARTIFACT_USER_TITLE", "Download workflow artifact"))
    .param(owner_param())
    .param(repo_param())
    .param(ParamSpec::number("artifact_id", "The unique identifier of the artifact").required());
    Tool::new(spec, with_provider(provider, handle_download_workflow_run_artifact))
}

async fn handle_download_workflow_run_artifact(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (owner, repo) = owner_repo(&params)?;
    let artifact_id = params.required_int("artifact_id")?;
    let id = artifact_id.to_string();

    let client = rest(&provider, &request.context)?;
    let url = client
        .redirect_location(
            &repo_segments(&owner, &repo, &["actions", "artifacts", &id, "zip"]),
            &QueryParams::new(),
        )
        .await
        .context("failed to get artifact download URL")?;

    json_result(&json!({
        "download_url": url.as_str(),
        "message": "Artifact is available for download",
        "note": "The download_url provides a download link for the artifact as a ZIP archive. The link is temporary and expires after a short time.",
        "artifact_id": artifact_id,
    }))
}

pub fn delete_workflow_run_logs(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "delete_workflow_run_logs",
        t.translate(
            "TOOL_DELETE_WORKFLOW_RUN_LOGS_DESCRIPTION",
            "Delete logs for a workflow run",
        ),
    )
    .title(t.translate("TOOL_DELETE_WORKFLOW_RUN_LOGS_USER_TITLE", "Delete workflow logs"))
    .destructive()
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_delete_workflow_run_logs))
}

async fn handle_delete_workflow_run_logs(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, run_id) = run_segments(&params, &["logs"])?;

    let client = rest(&provider, &request.context)?;
    let status = client
        .send_for_status(Method::DELETE, &segments, None)
        .await
        .context("failed to delete workflow run logs")?;
    json_result(&RunActionResult::new(
        "Workflow run logs have been deleted",
        run_id,
        status,
    ))
}

pub fn get_workflow_run_usage(provider: &SharedProvider, t: &Translator) -> Tool {
    let spec = ToolSpec::new(
        "get_workflow_run_usage",
        t.translate(
            "TOOL_GET_WORKFLOW_RUN_USAGE_DESCRIPTION",
            "Get usage metrics for a workflow run",
        ),
    )
    .title(t.translate("TOOL_GET_WORKFLOW_RUN_USAGE_USER_TITLE", "Get workflow usage"))
    .param(owner_param())
    .param(repo_param())
    .param(run_id_param());
    Tool::new(spec, with_provider(provider, handle_get_workflow_run_usage))
}

async fn handle_get_workflow_run_usage(
    provider: SharedProvider,
    request: ToolRequest,
) -> Result<ToolResult, ToolError> {
    let params = Params::new(&request.arguments);
    let (segments, _) = run_segments(&params, &["timing"])?;

    let client = rest(&provider, &request.context)?;
    let usage = client
        .get(&segments, &QueryParams::new())
        .await
        .context("failed to get workflow run usage")?;
    json_result(&usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_dispatch_by_id() {
        assert_eq!(workflow_type("161335"), "workflow_id");
        assert_eq!(workflow_type("main.yml"), "workflow_file");
        assert_eq!(workflow_type("12a"), "workflow_file");
    }

    #[test]
    fn actions_pagination_uses_snake_case_names() {
        let schema = paginated(ToolSpec::new("list_workflows", "List")).input_schema();
        let properties = schema["properties"].as_object().unwrap();
        assert!(properties.contains_key("per_page"));
        assert!(properties.contains_key("page"));
        assert!(!properties.contains_key("perPage"));
    }

    #[test]
    fn run_action_result_reports_status_line() {
        let result = RunActionResult::new("Workflow run has been cancelled", 7, StatusCode::ACCEPTED);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "202 Accepted");
        assert_eq!(value["status_code"], 202);
        assert_eq!(value["run_id"], 7);
    }
}
