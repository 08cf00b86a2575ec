pub mod current_date;
pub mod projects;
mod registry;

pub use current_date::CurrentDateTool;
pub use projects::{
    format_api_result, ExtraArgs, ListProjectsTool, ProgressTool, ProjectResourceTool,
    ProjectToolSpec, PROJECT_TOOLS,
};
pub use registry::{json_schema_object, json_schema_string, Tool, ToolRegistry};

use luskad_client::ProjectApi;
use std::sync::Arc;

/// Build a registry holding the full Luskad tool catalog.
pub fn catalog(api: Arc<dyn ProjectApi>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();

    registry.register(Arc::new(CurrentDateTool));
    registry.register(Arc::new(ListProjectsTool::new(api.clone())));
    registry.register(Arc::new(ProgressTool::new(api.clone())));

    for spec in PROJECT_TOOLS {
        registry.register(Arc::new(ProjectResourceTool::new(*spec, api.clone())));
    }

    registry
}


#[cfg(test)]
mod tests {
    use super::testing::StubApi;
    use super::*;

    #[test]
    fn test_catalog_contents() {
        let registry = catalog(StubApi::new());

        let names: Vec<String> = registry.list_schemas().into_iter().map(|s| s.name).collect();
        assert_eq!(
            names,
            vec![
                "get-build-time",
                "get-coding-rules",
                "get-contacts",
                "get-current-date",
                "get-features",
                "get-progress",
                "get-risks",
                "get-tasks",
                "get-team-members",
                "get-throughput",
                "list-projects",
            ]
        );
    }

    #[test]
    fn test_every_tool_has_title_and_object_schema() {
        let registry = catalog(StubApi::new());

        for schema in registry.list_schemas() {
            assert!(schema.title.is_some(), "{} has no title", schema.name);
            assert!(!schema.description.is_empty());
            assert_eq!(schema.input_schema["type"], "object");
        }
    }
}
