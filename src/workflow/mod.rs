//! Helpers for GitHub Actions workflows.
//!
//! [`parse_dispatch_inputs`] reads the `workflow_dispatch` inputs out of a
//! workflow file so a presentation layer can render a dispatch form, and
//! [`find_workflow_by_path`] resolves the loose workflow references found in
//! Actions page URLs to a concrete [`crate::github::WorkflowDescriptor`].

mod inputs;
mod lookup;

pub use inputs::{WorkflowInputSpec, parse_dispatch_inputs};
pub use lookup::find_workflow_by_path;
