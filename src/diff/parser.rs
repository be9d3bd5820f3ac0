//! Text plan parser for OpenTofu/Terraform
//!
//! Parses the human-readable output of `tofu plan` / `terraform plan` with a
//! small line-oriented state machine:
//!
//! ```text
//!            "will perform the following actions"
//!   Idle ───────────────────────────────────────────▶ InResourceBlock
//!    │  ▲                                                  │
//!    │  │ "Plan:" line                                     │ "Changes to Outputs:"
//!    │  └──────────────────────────────────────────────────┤
//!    │ "Changes to Outputs:"                               ▼
//!    └────────────────────────────────────────────────▶ InOutputsBlock
//! ```
//!
//! Every transition is triggered by a literal phrase matched by substring or
//! trimmed prefix, never by column position, since module nesting shifts
//! indentation.

use regex::Regex;

use super::error::{PlanError, PlanResult};
use super::types::{Action, OutputChange, ParsedPlan, ResourceChange};

/// Banner introducing the resource action list
pub const ACTIONS_BANNER: &str = "will perform the following actions";

/// Banner introducing output value changes
pub const OUTPUTS_BANNER: &str = "Changes to Outputs:";

/// Notice printed when the plan is empty
pub const NO_CHANGES_NOTICE: &str = "No changes.";

/// Prefix of the synopsis line, e.g. `Plan: 1 to add, 0 to change, 0 to destroy.`
pub const SUMMARY_PREFIX: &str = "Plan:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    Idle,
    InResourceBlock,
    InOutputsBlock,
}

/// What a resource header phrase says about the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderHint {
    Change(Action),
    /// Data source read, not a resource change
    Read,
    /// Address move without a change
    Moved,
    /// Removed from state without touching the real object
    Forget,
}

/// Marker-derived state of the resource block being assembled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MarkerAction {
    Change(Action),
    /// `<=` read or `.` forget
    Passive,
}

#[derive(Debug)]
struct OpenResource {
    name: String,
    hint: Option<HeaderHint>,
    marker: Option<MarkerAction>,
    attributes: Vec<String>,
}

impl OpenResource {
    fn new(name: String, hint: Option<HeaderHint>) -> Self {
        Self {
            name,
            hint,
            marker: None,
            attributes: Vec::new(),
        }
    }

    /// First marker wins
    fn mark(&mut self, marker: MarkerAction) {
        if self.marker.is_none() {
            self.marker = Some(marker);
        }
    }

    /// Resolve into a record, or `None` when the block is not a resource change
    fn finish(self) -> Option<ResourceChange> {
        let action = match (self.marker, self.hint) {
            (Some(MarkerAction::Change(action)), _) => action,
            (Some(MarkerAction::Passive), _) => return None,
            (None, Some(HeaderHint::Change(action))) => action,
            (None, Some(HeaderHint::Read | HeaderHint::Moved | HeaderHint::Forget)) => return None,
            (None, None) => Action::Unknown,
        };

        Some(ResourceChange {
            name: self.name,
            action,
            attributes: self.attributes,
        })
    }
}

/// Parser for OpenTofu/Terraform plan text output
pub struct TextPlanParser {
    address_pattern: Regex,
    phrase_pattern: Regex,
    ansi_pattern: Regex,
}

impl Default for TextPlanParser {
    fn default() -> Self {
        Self::new()
    }
}

impl TextPlanParser {
    /// Create a new parser with compiled regex patterns
    pub fn new() -> Self {
        Self {
            // Resource address right after the `#`, index keys may hold spaces:
            // # module.vpc.aws_subnet.main["eu west"] will be created
            address_pattern: Regex::new(r#"^#\s+((?:[^\s\[]|\[(?:"[^"]*"|[^\]]*)\])+)"#)
                .expect("Invalid address pattern regex"),

            // Action phrase anywhere after the address:
            // will be created / must be replaced / is tainted, so must be replaced
            // will no longer be managed / has moved to aws_instance.b
            phrase_pattern: Regex::new(r"\b(?:will be|must be|will no longer be|has moved to)\s+([a-z]+)")
                .expect("Invalid phrase pattern regex"),

            // Terminal color sequences emitted when the tool runs without -no-color
            ansi_pattern: Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("Invalid ANSI pattern regex"),
        }
    }

    /// Parse plan text into a flat list of changes
    pub fn parse(&self, output: &str) -> PlanResult<ParsedPlan> {
        let output = self.ansi_pattern.replace_all(output, "");

        let mut plan = ParsedPlan::new();
        let mut state = ParseState::Idle;
        let mut recognized = false;
        let mut current: Option<OpenResource> = None;
        let mut output_indent: Option<usize> = None;

        for line in output.lines() {
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }

            if line.contains(ACTIONS_BANNER) {
                recognized = true;
                Self::flush(&mut current, &mut plan);
                state = ParseState::InResourceBlock;
                continue;
            }

            if line.contains(OUTPUTS_BANNER) {
                recognized = true;
                Self::flush(&mut current, &mut plan);
                output_indent = None;
                state = ParseState::InOutputsBlock;
                continue;
            }

            if trimmed.starts_with(SUMMARY_PREFIX) {
                recognized = true;
                Self::flush(&mut current, &mut plan);
                plan.summary_line = trimmed.to_string();
                state = ParseState::Idle;
                continue;
            }

            if state == ParseState::Idle && trimmed.starts_with(NO_CHANGES_NOTICE) {
                recognized = true;
                continue;
            }

            match state {
                ParseState::Idle => {}
                ParseState::InResourceBlock => self.resource_line(trimmed, &mut current, &mut plan),
                ParseState::InOutputsBlock => {
                    Self::output_line(line, trimmed, &mut output_indent, &mut plan)
                }
            }
        }

        Self::flush(&mut current, &mut plan);

        if !recognized && !output.trim().is_empty() {
            return Err(PlanError::UnrecognizedText);
        }

        Ok(plan)
    }

    /// Handle a non-blank line inside the resource action list
    fn resource_line(&self, trimmed: &str, current: &mut Option<OpenResource>, plan: &mut ParsedPlan) {
        if let Some(comment) = trimmed.strip_prefix('#') {
            let comment = comment.trim_start();

            // Annotations such as "# (3 unchanged attributes hidden)"
            if comment.is_empty() || comment.starts_with('(') {
                return;
            }

            Self::flush(current, plan);
            *current = Some(self.parse_header(trimmed));
            return;
        }

        let Some(resource) = current.as_mut() else {
            return;
        };

        let (marker, rest) = split_marker(trimmed);

        match marker {
            Some("<=" | ".") => resource.mark(MarkerAction::Passive),
            Some(token) => {
                let Some(action) = Action::from_marker(token) else {
                    return;
                };
                resource.mark(MarkerAction::Change(action));

                if !rest.is_empty() && !is_block_open(rest) {
                    resource.attributes.push(rest.to_string());
                }
            }
            None => {}
        }
    }

    /// Handle a non-blank line inside the outputs block
    fn output_line(
        line: &str,
        trimmed: &str,
        output_indent: &mut Option<usize>,
        plan: &mut ParsedPlan,
    ) {
        let indent = indentation(line);

        // Lines nested under an output continue its multi-line value
        if let (Some(base), Some(last)) = (*output_indent, plan.outputs.last_mut()) {
            if indent > base {
                last.rendered_value.push('\n');
                last.rendered_value.push_str(&" ".repeat(indent - base));
                last.rendered_value.push_str(trimmed);
                return;
            }
        }

        let (marker, rest) = split_marker(trimmed);

        if matches!(marker, Some("+" | "~" | "-")) {
            let key = rest.split_whitespace().next().unwrap_or_default();
            plan.outputs.push(OutputChange::new(key, trimmed));
            output_indent.get_or_insert(indent);
        }
    }

    /// Build an open resource from its `#` header line
    fn parse_header(&self, trimmed: &str) -> OpenResource {
        let (name, rest) = match self.address_pattern.captures(trimmed).and_then(|caps| caps.get(1)) {
            Some(address) => (address.as_str(), &trimmed[address.end()..]),
            None => (
                trimmed.trim_start_matches('#').split_whitespace().next().unwrap_or_default(),
                "",
            ),
        };

        let hint = if rest.contains(" has moved to ") {
            Some(HeaderHint::Moved)
        } else {
            self.phrase_pattern
                .captures(rest)
                .and_then(|caps| caps.get(1))
                .and_then(|phrase| parse_hint(phrase.as_str()))
        };

        OpenResource::new(name.to_string(), hint)
    }

    fn flush(current: &mut Option<OpenResource>, plan: &mut ParsedPlan) {
        if let Some(resource) = current.take().and_then(OpenResource::finish) {
            plan.resources.push(resource);
        }
    }
}

/// Map a header phrase word to a hint
fn parse_hint(phrase: &str) -> Option<HeaderHint> {
    match phrase {
        "created" => Some(HeaderHint::Change(Action::Create)),
        "updated" => Some(HeaderHint::Change(Action::Update)),
        "destroyed" | "replaced" => Some(HeaderHint::Change(Action::Delete)),
        "read" => Some(HeaderHint::Read),
        "managed" => Some(HeaderHint::Forget),
        _ => None,
    }
}

/// Split a trimmed line into its action marker token (if any) and the remainder
fn split_marker(trimmed: &str) -> (Option<&str>, &str) {
    let token_end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
    let token = &trimmed[..token_end];

    match token {
        "+" | "~" | "-" | "-/+" | "+/-" | "<=" | "." => (Some(token), trimmed[token_end..].trim_start()),
        _ => (None, trimmed),
    }
}

/// True for `resource "type" "name" {` / `data "type" "name" {` lines
fn is_block_open(rest: &str) -> bool {
    rest.starts_with("resource \"") || rest.starts_with("data \"")
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}
