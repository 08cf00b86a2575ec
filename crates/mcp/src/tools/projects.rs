// Project data tools backed by the Luskad API

use crate::error::{parse_arguments, ToolError};
use crate::protocol::{CallToolResult, ToolSchema};
use crate::tools::{json_schema_object, json_schema_string, Tool};
use luskad_client::{ProjectApi, Resource, ResourceRequest};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Turn an API result into tool output.
///
/// Data is returned as pretty-printed JSON. A missing result (or a literal `null` body)
/// becomes `failure` as a normal text result, not a protocol error.
pub fn format_api_result(data: Option<Value>, failure: &str) -> CallToolResult {
    match data {
        Some(value) if !value.is_null() => CallToolResult::text(
            serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string()),
        ),
        _ => CallToolResult::text(failure),
    }
}

/// Tool to list all projects
pub struct ListProjectsTool {
    api: Arc<dyn ProjectApi>,
}

impl ListProjectsTool {
    pub const NAME: &'static str = "list-projects";

    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ListProjectsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("List All Projects".to_string()),
            description: "Retrieve a comprehensive list of all projects in the system with their IDs, names, descriptions, and creation dates for project management overview".to_string(),
            input_schema: json_schema_object(serde_json::json!({}), vec![]),
        }
    }

    async fn execute(&self, _arguments: Value) -> Result<CallToolResult, ToolError> {
        let data = self.api.fetch(&ResourceRequest::projects()).await;
        Ok(format_api_result(data, "Failed to retrieve projects"))
    }
}

/// Arguments a project tool takes besides `projectId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraArgs {
    None,
    /// Optional free-text `query`, with its schema description.
    Search(&'static str),
    /// Required `startDate` and `endDate`.
    DateRange,
}

/// Static description of a tool reading one project sub-resource.
#[derive(Debug, Clone, Copy)]
pub struct ProjectToolSpec {
    pub name: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub resource: Resource,
    pub project_description: &'static str,
    pub extra: ExtraArgs,
    pub failure: &'static str,
}

pub const CODING_RULES: ProjectToolSpec = ProjectToolSpec {
    name: "get-coding-rules",
    title: "Fetch Coding Rules",
    description: "Retrieve coding standards, guidelines, and best practices for a specific project. Supports optional search queries to filter rules by keywords or topics",
    resource: Resource::CodingRules,
    project_description: "The ID of the project to fetch coding rules for",
    extra: ExtraArgs::Search("The query to search for coding rules"),
    failure: "Failed to retrieve coding rules",
};

pub const CONTACTS: ProjectToolSpec = ProjectToolSpec {
    name: "get-contacts",
    title: "Fetch Project Contacts",
    description: "Retrieve all contacts associated with a specific project, including their personal information, company details, roles, and notes for stakeholder management",
    resource: Resource::Contacts,
    project_description: "The ID of the project to fetch contacts for",
    extra: ExtraArgs::None,
    failure: "Failed to retrieve contacts",
};

pub const FEATURES: ProjectToolSpec = ProjectToolSpec {
    name: "get-features",
    title: "Fetch Project Features & Issues",
    description: "Retrieve all features and issues for a specific project, including their status, priority, descriptions, and related metadata for project tracking and management",
    resource: Resource::Features,
    project_description: "The ID of the project to fetch features for",
    extra: ExtraArgs::None,
    failure: "Failed to retrieve features",
};

pub const RISKS: ProjectToolSpec = ProjectToolSpec {
    name: "get-risks",
    title: "Fetch Project Risks",
    description: "Retrieve all identified risks for a specific project, including their severity, probability, impact assessment, and mitigation strategies for risk management",
    resource: Resource::Risks,
    project_description: "The ID of the project to fetch risks for",
    extra: ExtraArgs::Search("The query to search for risks"),
    failure: "Failed to retrieve risks",
};

pub const TASKS: ProjectToolSpec = ProjectToolSpec {
    name: "get-tasks",
    title: "Fetch Project Tasks",
    description: "Retrieve all tasks associated with a specific project, including their status, priority, assignments, deadlines, and progress tracking for task management",
    resource: Resource::Tasks,
    project_description: "The ID of the project to fetch tasks for",
    extra: ExtraArgs::Search("The query to search for tasks"),
    failure: "Failed to retrieve tasks",
};

pub const TEAM_MEMBERS: ProjectToolSpec = ProjectToolSpec {
    name: "get-team-members",
    title: "Fetch Project Team Members",
    description: "Retrieve all team members assigned to a specific project, including their roles, skills, availability, and working schedules for team management and resource planning",
    resource: Resource::TeamMembers,
    project_description: "The ID of the project to fetch team members for",
    extra: ExtraArgs::None,
    failure: "Failed to retrieve team members",
};

pub const THROUGHPUT: ProjectToolSpec = ProjectToolSpec {
    name: "get-throughput",
    title: "Get Project Throughput",
    description: "Retrieve the throughput of a specific project (work items completed per period) between two dates for delivery tracking",
    resource: Resource::Throughput,
    project_description: "The ID of the project to get the throughput for",
    extra: ExtraArgs::DateRange,
    failure: "Failed to retrieve throughput",
};

pub const BUILD_TIME: ProjectToolSpec = ProjectToolSpec {
    name: "get-build-time",
    title: "Get Project Build Time",
    description: "Retrieve the time spent building a specific project between two dates for effort tracking and reporting",
    resource: Resource::BuildTime,
    project_description: "The ID of the project to get the build time for",
    extra: ExtraArgs::DateRange,
    failure: "Failed to retrieve build time",
};

/// Every single-resource project tool in the catalog.
pub const PROJECT_TOOLS: &[ProjectToolSpec] = &[
    CODING_RULES,
    CONTACTS,
    FEATURES,
    RISKS,
    TASKS,
    TEAM_MEMBERS,
    THROUGHPUT,
    BUILD_TIME,
];

// One argument struct per `ExtraArgs` variant. Keys a tool does not declare are ignored.

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProjectArgs {
    project_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchArgs {
    project_id: String,
    #[serde(default)]
    query: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DateRangeArgs {
    project_id: String,
    start_date: String,
    end_date: String,
}

fn require_project_id(tool: &str, project_id: &str) -> Result<(), ToolError> {
    if project_id.is_empty() {
        return Err(ToolError::invalid_arguments(tool, "projectId must not be empty"));
    }
    Ok(())
}

/// Tool reading one sub-resource of a project
pub struct ProjectResourceTool {
    spec: ProjectToolSpec,
    api: Arc<dyn ProjectApi>,
}

impl ProjectResourceTool {
    pub fn new(spec: ProjectToolSpec, api: Arc<dyn ProjectApi>) -> Self {
        Self { spec, api }
    }

    /// Validate the arguments this tool declares and build its API request.
    fn request(&self, arguments: Value) -> Result<ResourceRequest, ToolError> {
        let name = self.spec.name;
        let resource = self.spec.resource;

        match self.spec.extra {
            ExtraArgs::None => {
                let args: ProjectArgs = parse_arguments(name, arguments)?;
                require_project_id(name, &args.project_id)?;
                Ok(ResourceRequest::project(args.project_id, resource))
            }
            ExtraArgs::Search(_) => {
                let args: SearchArgs = parse_arguments(name, arguments)?;
                require_project_id(name, &args.project_id)?;
                Ok(ResourceRequest::project(args.project_id, resource)
                    .search(args.query.as_deref()))
            }
            ExtraArgs::DateRange => {
                let args: DateRangeArgs = parse_arguments(name, arguments)?;
                require_project_id(name, &args.project_id)?;
                Ok(ResourceRequest::project(args.project_id, resource)
                    .date_range(&args.start_date, &args.end_date))
            }
        }
    }
}

#[async_trait::async_trait]
impl Tool for ProjectResourceTool {
    fn schema(&self) -> ToolSchema {
        let mut properties = serde_json::Map::new();
        properties.insert(
            "projectId".to_string(),
            json_schema_string(self.spec.project_description),
        );

        let mut required = vec!["projectId"];
        match self.spec.extra {
            ExtraArgs::None => {}
            ExtraArgs::Search(description) => {
                properties.insert("query".to_string(), json_schema_string(description));
            }
            ExtraArgs::DateRange => {
                properties.insert(
                    "startDate".to_string(),
                    json_schema_string("The start date of the period (YYYY-MM-DD)"),
                );
                properties.insert(
                    "endDate".to_string(),
                    json_schema_string("The end date of the period (YYYY-MM-DD)"),
                );
                required.extend(["startDate", "endDate"]);
            }
        }

        ToolSchema {
            name: self.spec.name.to_string(),
            title: Some(self.spec.title.to_string()),
            description: self.spec.description.to_string(),
            input_schema: json_schema_object(Value::Object(properties), required),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let request = self.request(arguments)?;
        let data = self.api.fetch(&request).await;
        Ok(format_api_result(data, self.spec.failure))
    }
}

/// Tool combining project planning and progress
pub struct ProgressTool {
    api: Arc<dyn ProjectApi>,
}

impl ProgressTool {
    pub const NAME: &'static str = "get-progress";

    pub fn new(api: Arc<dyn ProjectApi>) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait]
impl Tool for ProgressTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: Self::NAME.to_string(),
            title: Some("Get Project Progress".to_string()),
            description: "Retrieve comprehensive project progress metrics including completion status, throughput analysis, build time tracking, and projected completion dates for project planning and reporting".to_string(),
            input_schema: json_schema_object(
                serde_json::json!({
                    "projectId": json_schema_string("The ID of the project to get the progress for"),
                    "query": json_schema_string("The query to search for features")
                }),
                vec!["projectId"],
            ),
        }
    }

    async fn execute(&self, arguments: Value) -> Result<CallToolResult, ToolError> {
        let args: SearchArgs = parse_arguments(Self::NAME, arguments)?;
        require_project_id(Self::NAME, &args.project_id)?;

        let planning = self
            .api
            .fetch(&ResourceRequest::project(args.project_id.as_str(), Resource::Planning))
            .await;
        let progress = self
            .api
            .fetch(
                &ResourceRequest::project(args.project_id.as_str(), Resource::Progress)
                    .search(args.query.as_deref()),
            )
            .await;

        let data = serde_json::json!({
            "planning": planning,
            "progress": progress,
        });
        Ok(format_api_result(Some(data), "Failed to retrieve project progress"))
    }
}
