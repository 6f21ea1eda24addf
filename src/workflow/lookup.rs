//! Resolution of workflow references to listed workflows.

use crate::github::WorkflowDescriptor;

const WORKFLOWS_DIR: &str = ".github/workflows/";

fn strip_yaml_extension(name: &str) -> &str {
    name.strip_suffix(".yml")
        .or_else(|| name.strip_suffix(".yaml"))
        .unwrap_or(name)
}

fn matches_path(workflow: &WorkflowDescriptor, given: &str) -> bool {
    workflow.path == given
        || workflow
            .path
            .strip_suffix(given)
            .is_some_and(|prefix| prefix.ends_with('/'))
        || workflow
            .path
            .strip_prefix(WORKFLOWS_DIR)
            .is_some_and(|rest| rest == given)
}

/// Replaces every whitespace run with a single `-`, keeping leading and
/// trailing runs.
fn hyphenate_whitespace(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut in_run = false;
    for character in name.chars() {
        if character.is_whitespace() {
            if !in_run {
                slug.push('-');
            }
            in_run = true;
        } else {
            slug.push(character);
            in_run = false;
        }
    }
    slug
}

fn matches_slug(workflow: &WorkflowDescriptor, slug: &str) -> bool {
    let file_name = workflow.path.rsplit('/').next().unwrap_or_default();
    let stem = file_name.to_lowercase();
    if strip_yaml_extension(&stem) == slug {
        return true;
    }
    let name_slug = hyphenate_whitespace(&workflow.name.to_lowercase());
    !name_slug.is_empty() && name_slug == slug
}

/// Finds the workflow `given` refers to.
///
/// `given` may be the full file path, a path suffix, or the file name below
/// `.github/workflows/`. Failing those, it is compared case-insensitively
/// (without a `.yml`/`.yaml` extension) against each file stem and against
/// each workflow name with whitespace runs replaced by `-`.
///
/// # Examples
///
/// ```
/// use forgebar::github::WorkflowDescriptor;
/// use forgebar::workflow::find_workflow_by_path;
///
/// let workflows = vec![WorkflowDescriptor {
///     id: 7,
///     name: "Deploy Production".to_owned(),
///     path: ".github/workflows/deploy.yml".to_owned(),
/// }];
///
/// assert_eq!(find_workflow_by_path(&workflows, "deploy.yml").map(|w| w.id), Some(7));
/// assert_eq!(find_workflow_by_path(&workflows, "deploy-production").map(|w| w.id), Some(7));
/// assert!(find_workflow_by_path(&workflows, "release.yml").is_none());
/// ```
#[must_use]
pub fn find_workflow_by_path<'a>(
    workflows: &'a [WorkflowDescriptor],
    given: &str,
) -> Option<&'a WorkflowDescriptor> {
    if given.is_empty() {
        return None;
    }
    if let Some(found) = workflows
        .iter()
        .find(|workflow| matches_path(workflow, given))
    {
        return Some(found);
    }
    let lowered = given.to_lowercase();
    let slug = strip_yaml_extension(&lowered);
    workflows
        .iter()
        .find(|workflow| matches_slug(workflow, slug))
}
