//! Luskad API resources.
//!
//! Every endpoint the server reads from is a [`Resource`], either the project collection or
//! a sub-resource scoped to one project. A [`ResourceRequest`] pairs a resource with its
//! project id and query parameters; [`ProjectApi`] turns it into JSON or nothing.

use serde_json::Value;

/// A readable resource of the Luskad API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `/projects`
    Projects,
    /// `/projects/{id}/coding_rules`
    CodingRules,
    /// `/projects/{id}/contacts`
    Contacts,
    /// `/projects/{id}/features`
    Features,
    /// `/projects/{id}/planning`
    Planning,
    /// `/projects/{id}/progress`
    Progress,
    /// `/projects/{id}/risks`
    Risks,
    /// `/projects/{id}/tasks`
    Tasks,
    /// `/projects/{id}/team_members`
    TeamMembers,
    /// `/projects/{id}/throughput`
    Throughput,
    /// `/projects/{id}/build_time`
    BuildTime,
}

impl Resource {
    /// Path segment of the resource under its parent.
    pub fn path_segment(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::CodingRules => "coding_rules",
            Self::Contacts => "contacts",
            Self::Features => "features",
            Self::Planning => "planning",
            Self::Progress => "progress",
            Self::Risks => "risks",
            Self::Tasks => "tasks",
            Self::TeamMembers => "team_members",
            Self::Throughput => "throughput",
            Self::BuildTime => "build_time",
        }
    }

    /// Human readable name, used in log messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Projects => "projects",
            Self::CodingRules => "coding rules",
            Self::Contacts => "contacts",
            Self::Features => "features",
            Self::Planning => "planning",
            Self::Progress => "progress",
            Self::Risks => "risks",
            Self::Tasks => "tasks",
            Self::TeamMembers => "team members",
            Self::Throughput => "throughput",
            Self::BuildTime => "build time",
        }
    }
}

/// A single GET against the Luskad API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    resource: Resource,
    project_id: Option<String>,
    query: Vec<(&'static str, String)>,
}

impl ResourceRequest {
    /// Request the project collection.
    pub fn projects() -> Self {
        Self {
            resource: Resource::Projects,
            project_id: None,
            query: Vec::new(),
        }
    }

    /// Request a sub-resource of one project.
    ///
    /// The id is not validated here; callers check presence before building the request.
    pub fn project(project_id: impl Into<String>, resource: Resource) -> Self {
        Self {
            resource,
            project_id: Some(project_id.into()),
            query: Vec::new(),
        }
    }

    /// Add a free-text search as `q`. Absent or empty queries add nothing.
    pub fn search(mut self, query: Option<&str>) -> Self {
        if let Some(q) = query.filter(|q| !q.is_empty()) {
            self.query.push(("q", q.to_string()));
        }
        self
    }

    /// Add a `start_date` / `end_date` pair.
    pub fn date_range(mut self, start_date: &str, end_date: &str) -> Self {
        self.query.push(("start_date", start_date.to_string()));
        self.query.push(("end_date", end_date.to_string()));
        self
    }

    pub fn resource(&self) -> Resource {
        self.resource
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    /// Path segments relative to the API base URL.
    pub fn segments(&self) -> Vec<&str> {
        match &self.project_id {
            Some(id) if self.resource != Resource::Projects => vec![
                Resource::Projects.path_segment(),
                id.as_str(),
                self.resource.path_segment(),
            ],
            _ => vec![self.resource.path_segment()],
        }
    }

    /// Query parameters in insertion order.
    pub fn query_pairs(&self) -> Vec<(&str, &str)> {
        self.query.iter().map(|(k, v)| (*k, v.as_str())).collect()
    }
}

/// Read access to the Luskad API.
///
/// Implementations never fail: `None` is the absence marker for any failure (network,
/// non-success status, malformed body), and the cause only goes to the log.
#[async_trait::async_trait]
pub trait ProjectApi: Send + Sync {
    /// Fetch a resource, issuing exactly one request.
    async fn fetch(&self, request: &ResourceRequest) -> Option<Value>;
}
