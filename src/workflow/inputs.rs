//! Parsing of `workflow_dispatch` inputs.

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::github::ForgeError;

const DEFAULT_INPUT_TYPE: &str = "string";

/// One input of a `workflow_dispatch` trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowInputSpec {
    /// Input name as declared under `inputs:`.
    pub name: String,
    /// Human-readable description.
    pub description: Option<String>,
    /// Whether the input must be supplied; only an explicit `false` makes it
    /// optional.
    pub required: bool,
    /// Default value rendered as a string.
    pub default: Option<String>,
    /// Declared type (`string`, `boolean`, `choice`, `environment`, ...).
    #[serde(rename = "type")]
    pub input_type: String,
    /// Allowed values of a `choice` input.
    pub options: Vec<String>,
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

fn is_explicit_false(value: &Value) -> bool {
    match value {
        Value::Bool(flag) => !flag,
        Value::String(text) => text.trim() == "false",
        _ => false,
    }
}

/// The `on:` block. YAML 1.1 readers turn a bare `on` key into `true`, so
/// both spellings are accepted.
fn triggers(document: &Mapping) -> Option<&Value> {
    document.get("on").or_else(|| document.get(Value::Bool(true)))
}

fn input_spec(name: String, declaration: &Value) -> WorkflowInputSpec {
    let field = |key: &str| declaration.get(key);
    WorkflowInputSpec {
        name,
        description: field("description").and_then(scalar_text),
        required: !field("required").is_some_and(is_explicit_false),
        default: field("default").and_then(scalar_text),
        input_type: field("type")
            .and_then(scalar_text)
            .unwrap_or_else(|| DEFAULT_INPUT_TYPE.to_owned()),
        options: field("options")
            .and_then(Value::as_sequence)
            .map(|options| options.iter().filter_map(scalar_text).collect())
            .unwrap_or_default(),
    }
}

/// Parses the `workflow_dispatch` inputs of a workflow file.
///
/// Inputs are returned in declaration order. A workflow whose trigger block
/// names `workflow_dispatch` without inputs, or does not name it at all,
/// yields no inputs.
///
/// # Errors
///
/// Returns [`ForgeError::InvalidWorkflow`] when `yaml` is not a YAML mapping.
///
/// # Examples
///
/// ```
/// use forgebar::workflow::parse_dispatch_inputs;
///
/// let yaml = "on:\n  workflow_dispatch:\n    inputs:\n      dry_run:\n        type: boolean\n        default: false\n";
/// let inputs = parse_dispatch_inputs(yaml).expect("valid workflow");
///
/// let dry_run = inputs.first().expect("one input");
/// assert_eq!(dry_run.name, "dry_run");
/// assert_eq!(dry_run.default.as_deref(), Some("false"));
/// assert!(dry_run.required);
/// ```
pub fn parse_dispatch_inputs(yaml: &str) -> Result<Vec<WorkflowInputSpec>, ForgeError> {
    let document: Value =
        serde_yaml::from_str(yaml).map_err(|error| ForgeError::InvalidWorkflow {
            message: error.to_string(),
        })?;
    let Some(mapping) = document.as_mapping() else {
        return Err(ForgeError::InvalidWorkflow {
            message: "workflow file is not a YAML mapping".to_owned(),
        });
    };

    let declared = triggers(mapping)
        .and_then(|on| on.get("workflow_dispatch"))
        .and_then(|dispatch| dispatch.get("inputs"))
        .and_then(Value::as_mapping);
    let Some(declared_inputs) = declared else {
        return Ok(Vec::new());
    };

    Ok(declared_inputs
        .iter()
        .filter_map(|(name, declaration)| {
            scalar_text(name).map(|input_name| input_spec(input_name, declaration))
        })
        .collect())
}
