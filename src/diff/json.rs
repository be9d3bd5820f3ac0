//! JSON plan parser
//!
//! Reads the machine-readable plan written by `tofu show -json` /
//! `terraform show -json` and normalizes it into the same [`ParsedPlan`]
//! the text parser produces.

use serde::Deserialize;
use serde_json::{Map, Value};

use super::error::PlanResult;
use super::types::{Action, OutputChange, ParsedPlan, ResourceChange};

const SENSITIVE_PLACEHOLDER: &str = "(sensitive value)";
const UNKNOWN_PLACEHOLDER: &str = "(known after apply)";

#[derive(Deserialize, Debug)]
struct PlanDocument {
    resource_changes: Option<Vec<JsonResourceChange>>,
    output_changes: Option<Map<String, Value>>,
    planned_values: Option<PlannedValues>,
}

#[derive(Deserialize, Debug)]
struct PlannedValues {
    outputs: Option<Map<String, Value>>,
}

#[derive(Deserialize, Debug)]
struct JsonResourceChange {
    #[serde(rename = "type")]
    resource_type: String,
    name: String,
    module_address: Option<String>,
    index: Option<Value>,
    mode: Option<String>,
    change: JsonChange,
}

#[derive(Deserialize, Debug)]
struct JsonChange {
    #[serde(default)]
    actions: Vec<String>,
    before: Option<Value>,
    after: Option<Value>,
    after_unknown: Option<Value>,
    after_sensitive: Option<Value>,
}

impl JsonResourceChange {
    /// Resource address, e.g. `module.vpc.aws_subnet.main[0]`
    fn address(&self) -> String {
        let mut address = format!("{}.{}", self.resource_type, self.name);

        if let Some(module) = &self.module_address {
            address = format!("{}.{}", module, address);
        }

        if let Some(index) = &self.index {
            address.push_str(&format!("[{}]", index));
        }

        address
    }
}

impl JsonChange {
    /// Only `no-op` / `read` / `forget` tags: no real object will change
    fn is_passive(&self) -> bool {
        !self.actions.is_empty()
            && self
                .actions
                .iter()
                .all(|action| matches!(action.as_str(), "no-op" | "read" | "forget"))
    }

    /// Render each field of the post-change object as `key: value`
    fn attributes(&self) -> Vec<String> {
        let mut attributes = Vec::new();
        let after = self.after.as_ref().and_then(Value::as_object);

        if let Some(after) = after {
            for (key, value) in after {
                let rendered = if is_flagged(self.after_sensitive.as_ref(), key) {
                    SENSITIVE_PLACEHOLDER.to_string()
                } else if value.is_null() && is_flagged(self.after_unknown.as_ref(), key) {
                    UNKNOWN_PLACEHOLDER.to_string()
                } else {
                    render_value(value)
                };

                attributes.push(format!("{}: {}", key, rendered));
            }
        }

        // Values computed at apply time are absent from `after`
        if let Some(unknown) = self.after_unknown.as_ref().and_then(Value::as_object) {
            for (key, flag) in unknown {
                let present = after.is_some_and(|after| after.contains_key(key));

                if flag.as_bool() == Some(true) && !present {
                    attributes.push(format!("{}: {}", key, UNKNOWN_PLACEHOLDER));
                }
            }
        }

        attributes
    }
}

/// Parser for the JSON plan representation
pub struct JsonPlanParser;

impl Default for JsonPlanParser {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonPlanParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a JSON plan document from text
    pub fn parse(&self, input: &str) -> PlanResult<ParsedPlan> {
        if input.trim().is_empty() {
            return Ok(ParsedPlan::new());
        }

        let document: Value = serde_json::from_str(input)?;
        self.parse_value(document)
    }

    /// Parse an already decoded JSON plan document
    pub fn parse_value(&self, document: Value) -> PlanResult<ParsedPlan> {
        let document: PlanDocument = serde_json::from_value(document)?;
        self.normalize(document)
    }

    fn normalize(&self, document: PlanDocument) -> PlanResult<ParsedPlan> {
        let mut plan = ParsedPlan::new();

        for entry in document.resource_changes.unwrap_or_default() {
            if entry.mode.as_deref() == Some("data") || entry.change.is_passive() {
                continue;
            }

            plan.resources.push(ResourceChange {
                name: entry.address(),
                action: Action::from_tags(entry.change.actions.as_slice()),
                attributes: entry.change.attributes(),
            });
        }

        plan.outputs = match (document.output_changes, document.planned_values) {
            (Some(changes), _) => Self::output_changes(changes)?,
            (None, Some(PlannedValues { outputs: Some(outputs) })) => Self::planned_outputs(outputs),
            _ => Vec::new(),
        };

        plan.summary_line = Self::synthetic_summary(&plan.resources);
        Ok(plan)
    }

    /// Normalize `output_changes`, a map of key to change descriptor
    fn output_changes(changes: Map<String, Value>) -> PlanResult<Vec<OutputChange>> {
        let mut outputs = Vec::new();

        for (key, entry) in changes {
            if !entry.get("actions").is_some_and(Value::is_array) {
                // Flat key -> value form
                outputs.push(OutputChange::new(&key, &format!("{} = {}", key, render_value(&entry))));
                continue;
            }

            let change: JsonChange = serde_json::from_value(entry)?;

            if change.is_passive() {
                continue;
            }

            let action = Action::from_tags(change.actions.as_slice());
            let value = if action == Action::Delete && change.after.is_none() {
                change.before.as_ref()
            } else {
                change.after.as_ref()
            };

            let rendered = if change.after_sensitive.as_ref().is_some_and(any_flag) {
                SENSITIVE_PLACEHOLDER.to_string()
            } else if change.after_unknown.as_ref().and_then(Value::as_bool) == Some(true) {
                UNKNOWN_PLACEHOLDER.to_string()
            } else {
                value.map(render_value).unwrap_or_else(|| "null".to_string())
            };

            let line = match action {
                Action::Unknown => format!("{} = {}", key, rendered),
                _ => format!("{} {} = {}", action.symbol(), key, rendered),
            };

            outputs.push(OutputChange::new(&key, &line));
        }

        Ok(outputs)
    }

    /// Normalize `planned_values.outputs`, either `{value, sensitive}` entries or flat values
    fn planned_outputs(planned: Map<String, Value>) -> Vec<OutputChange> {
        planned
            .into_iter()
            .map(|(key, entry)| {
                let rendered = match entry.as_object() {
                    Some(object) if object.get("sensitive").and_then(Value::as_bool) == Some(true) => {
                        SENSITIVE_PLACEHOLDER.to_string()
                    }
                    Some(object) if object.contains_key("value") => {
                        render_value(&object["value"])
                    }
                    _ => render_value(&entry),
                };

                OutputChange::new(&key, &format!("{} = {}", key, rendered))
            })
            .collect()
    }

    /// Build a `Plan:` sentence from the recovered resources
    fn synthetic_summary(resources: &[ResourceChange]) -> String {
        if resources.is_empty() {
            return String::new();
        }

        let count = |action: Action| resources.iter().filter(|r| r.action == action).count();

        format!(
            "Plan: {} to add, {} to change, {} to destroy.",
            count(Action::Create),
            count(Action::Update),
            count(Action::Delete)
        )
    }
}

/// Render a JSON value as its literal text (strings keep their quotes)
fn render_value(value: &Value) -> String {
    value.to_string()
}

/// True when `flags` is `true` or the entry for `key` flags any nested value
fn is_flagged(flags: Option<&Value>, key: &str) -> bool {
    match flags {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Object(map)) => map.get(key).is_some_and(any_flag),
        _ => false,
    }
}

/// True when a flag tree holds `true` anywhere
fn any_flag(flags: &Value) -> bool {
    match flags {
        Value::Bool(flag) => *flag,
        Value::Array(items) => items.iter().any(any_flag),
        Value::Object(map) => map.values().any(any_flag),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::PlanError;
    use serde_json::json;

    fn parse(document: Value) -> ParsedPlan {
        JsonPlanParser::new().parse_value(document).unwrap()
    }

    #[test]
    fn test_parse_delete_without_after() {
        let plan = parse(json!({
            "resource_changes": [
                {"type": "aws_instance", "name": "web", "change": {"actions": ["delete"], "after": null}}
            ]
        }));

        assert_eq!(plan.resources, vec![ResourceChange::new("aws_instance.web", Action::Delete)]);
        assert_eq!(plan.summary_line, "Plan: 0 to add, 0 to change, 1 to destroy.");
    }

    #[test]
    fn test_attributes_render_json_literals_in_order() {
        let plan = parse(json!({
            "resource_changes": [{
                "type": "aws_s3_bucket",
                "name": "logs",
                "change": {
                    "actions": ["create"],
                    "after": {
                        "bucket": "logs",
                        "force_destroy": false,
                        "versions": 3,
                        "tags": {"env": "prod"},
                        "acl": null
                    }
                }
            }]
        }));

        assert_eq!(
            plan.resources[0].attributes,
            vec![
                "bucket: \"logs\"",
                "force_destroy: false",
                "versions: 3",
                "tags: {\"env\":\"prod\"}",
                "acl: null",
            ]
        );
    }

    #[test]
    fn test_replace_uses_delete_precedence() {
        let plan = parse(json!({
            "resource_changes": [
                {"type": "aws_instance", "name": "a", "change": {"actions": ["delete", "create"], "after": {}}},
                {"type": "aws_instance", "name": "b", "change": {"actions": ["create", "delete"], "after": {}}}
            ]
        }));

        assert!(plan.resources.iter().all(|r| r.action == Action::Delete));
    }

    #[test]
    fn test_sensitive_and_unknown_values() {
        let plan = parse(json!({
            "resource_changes": [{
                "type": "aws_db_instance",
                "name": "main",
                "change": {
                    "actions": ["create"],
                    "after": {"password": "hunter2", "engine": "postgres"},
                    "after_sensitive": {"password": true},
                    "after_unknown": {"id": true, "engine": false}
                }
            }]
        }));

        assert_eq!(
            plan.resources[0].attributes,
            vec![
                "password: (sensitive value)",
                "engine: \"postgres\"",
                "id: (known after apply)",
            ]
        );
    }

    #[test]
    fn test_nested_sensitive_values_are_masked() {
        let plan = parse(json!({
            "resource_changes": [{
                "type": "aws_lambda_function",
                "name": "api",
                "change": {
                    "actions": ["update"],
                    "after": {
                        "config": {"password": "hunter2", "user": "admin"},
                        "secrets": ["s3cr3t"],
                        "tags": {"team": "core"}
                    },
                    "after_sensitive": {
                        "config": {"password": true},
                        "secrets": [true],
                        "tags": {}
                    }
                }
            }],
            "output_changes": {
                "db": {
                    "actions": ["create"],
                    "after": {"host": "db", "token": "t0k3n"},
                    "after_sensitive": {"token": true}
                }
            }
        }));

        assert_eq!(
            plan.resources[0].attributes,
            vec![
                "config: (sensitive value)",
                "secrets: (sensitive value)",
                "tags: {\"team\":\"core\"}",
            ]
        );
        assert_eq!(plan.outputs[0].rendered_value, "+ db = (sensitive value)");
        assert!(plan.resources[0].attributes.iter().all(|a| !a.contains("hunter2")));
    }

    #[test]
    fn test_forget_is_skipped() {
        let plan = parse(json!({
            "resource_changes": [
                {"type": "aws_s3_bucket", "name": "b", "change": {"actions": ["forget"], "before": {"bucket": "b"}, "after": null}},
                {"type": "aws_s3_bucket", "name": "c", "change": {"actions": ["create"], "after": {}}}
            ]
        }));

        assert_eq!(plan.resources, vec![ResourceChange::new("aws_s3_bucket.c", Action::Create)]);
        assert_eq!(plan.summary_line, "Plan: 1 to add, 0 to change, 0 to destroy.");
    }

    #[test]
    fn test_module_and_index_in_address() {
        let plan = parse(json!({
            "resource_changes": [
                {"module_address": "module.vpc", "type": "aws_subnet", "name": "public", "index": 0,
                 "change": {"actions": ["update"], "after": null}},
                {"type": "aws_iam_user", "name": "u", "index": "jane",
                 "change": {"actions": ["create"], "after": null}}
            ]
        }));

        assert_eq!(plan.resources[0].name, "module.vpc.aws_subnet.public[0]");
        assert_eq!(plan.resources[1].name, "aws_iam_user.u[\"jane\"]");
    }

    #[test]
    fn test_reads_and_no_ops_are_skipped() {
        let plan = parse(json!({
            "resource_changes": [
                {"mode": "data", "type": "aws_ami", "name": "latest", "change": {"actions": ["read"]}},
                {"type": "aws_vpc", "name": "main", "change": {"actions": ["no-op"]}},
                {"type": "aws_vpc", "name": "other", "change": {"actions": ["update"]}}
            ]
        }));

        assert_eq!(plan.resources.len(), 1);
        assert_eq!(plan.resources[0].name, "aws_vpc.other");
    }

    #[test]
    fn test_empty_actions_is_unknown() {
        let plan = parse(json!({
            "resource_changes": [{"type": "aws_vpc", "name": "main", "change": {"actions": []}}]
        }));

        assert_eq!(plan.resources[0].action, Action::Unknown);
    }

    #[test]
    fn test_output_changes_descriptors() {
        let plan = parse(json!({
            "resource_changes": [],
            "output_changes": {
                "endpoint": {"actions": ["create"], "after": "1.2.3.4"},
                "unchanged": {"actions": ["no-op"], "after": "x"},
                "old": {"actions": ["delete"], "before": "gone", "after": null},
                "token": {"actions": ["update"], "after": "s3cret", "after_sensitive": true}
            }
        }));

        let rendered: Vec<&str> = plan.outputs.iter().map(|o| o.rendered_value.as_str()).collect();
        assert_eq!(
            rendered,
            vec![
                "+ endpoint = \"1.2.3.4\"",
                "- old = \"gone\"",
                "~ token = (sensitive value)",
            ]
        );
    }

    #[test]
    fn test_flat_output_map() {
        let plan = parse(json!({
            "output_changes": {"region": "eu-west-1", "replicas": 2}
        }));

        assert_eq!(
            plan.outputs,
            vec![
                OutputChange::new("region", "region = \"eu-west-1\""),
                OutputChange::new("replicas", "replicas = 2"),
            ]
        );
    }

    #[test]
    fn test_planned_values_outputs() {
        let plan = parse(json!({
            "planned_values": {
                "outputs": {
                    "url": {"sensitive": false, "value": "https://example.com"},
                    "secret": {"sensitive": true, "value": "x"}
                }
            }
        }));

        assert_eq!(plan.outputs[0].rendered_value, "url = \"https://example.com\"");
        assert_eq!(plan.outputs[1].rendered_value, "secret = (sensitive value)");
    }

    #[test]
    fn test_missing_resource_changes_is_empty() {
        let plan = parse(json!({"format_version": "1.2"}));

        assert!(plan.resources.is_empty());
        assert!(plan.outputs.is_empty());
        assert!(plan.summary_line.is_empty());
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let result = JsonPlanParser::new().parse("{\"resource_changes\": [");
        assert!(matches!(result, Err(PlanError::MalformedJson(_))));
    }

    #[test]
    fn test_blank_input_is_empty() {
        assert_eq!(JsonPlanParser::new().parse("  \n").unwrap(), ParsedPlan::new());
    }
}
