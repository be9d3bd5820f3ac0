//! Data types for plan change summaries
//!
//! Both plan front ends (text and JSON) normalize into these types, so the
//! classifier and renderer only ever see one model.

use serde::{Deserialize, Serialize};

/// Action a plan intends to take on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Resource will be created
    Create,
    /// Resource will be updated in-place
    Update,
    /// Resource will be destroyed (replacements land here too)
    Delete,
    /// No recognized marker was found for the resource
    Unknown,
}

impl Action {
    /// Map a text-plan marker token to an action.
    ///
    /// Replace markers (`-/+`, `+/-`) carry both delete and create and resolve
    /// to `Delete` under the `delete > create > update` precedence. Returns
    /// `None` for tokens that are not action markers at all.
    pub fn from_marker(marker: &str) -> Option<Self> {
        match marker {
            "+" => Some(Action::Create),
            "~" => Some(Action::Update),
            "-" | "-/+" | "+/-" => Some(Action::Delete),
            _ => None,
        }
    }

    /// Resolve a set of JSON action tags with the precedence `delete > create > update`
    pub fn from_tags<S: AsRef<str>>(tags: &[S]) -> Self {
        let has = |tag: &str| tags.iter().any(|t| t.as_ref() == tag);

        if has("delete") {
            Action::Delete
        } else if has("create") {
            Action::Create
        } else if has("update") {
            Action::Update
        } else {
            Action::Unknown
        }
    }

    /// Marker used when rendering this action
    pub fn symbol(&self) -> &'static str {
        match self {
            Action::Create => "+",
            Action::Update => "~",
            Action::Delete => "-",
            Action::Unknown => "?",
        }
    }
}

/// A single resource change recovered from a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceChange {
    /// Resource address (e.g., "aws_instance.web", "module.vpc.aws_subnet.main")
    pub name: String,

    /// What the plan will do with the resource
    pub action: Action,

    /// Changed attributes, in source order
    pub attributes: Vec<String>,
}

impl ResourceChange {
    /// Create a new resource change with no attributes
    #[cfg(test)]
    pub fn new(name: &str, action: Action) -> Self {
        Self {
            name: name.to_string(),
            action,
            attributes: Vec::new(),
        }
    }

    /// Add an attribute line
    #[cfg(test)]
    pub fn with_attribute(mut self, attribute: &str) -> Self {
        self.attributes.push(attribute.to_string());
        self
    }
}

/// A change to a named output value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChange {
    /// Output name
    pub key: String,

    /// Line shown in the report for this output
    pub rendered_value: String,
}

impl OutputChange {
    pub fn new(key: &str, rendered_value: &str) -> Self {
        Self {
            key: key.to_string(),
            rendered_value: rendered_value.to_string(),
        }
    }
}

/// Flat parser output, before classification
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedPlan {
    /// Resource changes in encounter order
    pub resources: Vec<ResourceChange>,

    /// Output changes in encounter order
    pub outputs: Vec<OutputChange>,

    /// The plan's synopsis line, empty when none was found
    pub summary_line: String,
}

impl ParsedPlan {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Classified plan, ready for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeSet {
    pub created: Vec<ResourceChange>,
    pub updated: Vec<ResourceChange>,
    pub destroyed: Vec<ResourceChange>,
    pub outputs: Vec<OutputChange>,
    pub summary_line: String,
}

impl ChangeSet {
    /// Total number of resources with a pending change
    pub fn total_changes(&self) -> usize {
        self.created.len() + self.updated.len() + self.destroyed.len()
    }

    /// True when there is nothing to report: no resources and no outputs
    pub fn is_empty(&self) -> bool {
        self.total_changes() == 0 && self.outputs.is_empty()
    }

    /// Serialize the classified buckets for downstream tooling
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Pretty-printed variant of [`ChangeSet::to_json`]
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
