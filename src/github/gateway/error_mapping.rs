//! Translation of Octocrab failures into [`ForgeError`].

use crate::github::error::ForgeError;

use super::http_utils::excerpt;

/// Maps a failure of `operation` (e.g. `"list pull requests"`).
///
/// GitHub API errors keep their status code; transport failures become
/// [`ForgeError::Network`] and anything else, including body decoding, is
/// reported as [`ForgeError::Decode`].
pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> ForgeError {
    match error {
        octocrab::Error::GitHub { source, .. } => ForgeError::Remote {
            status: source.status_code.as_u16(),
            body_excerpt: excerpt(&source.message),
        },
        octocrab::Error::Http { .. }
        | octocrab::Error::Hyper { .. }
        | octocrab::Error::Service { .. } => ForgeError::Network {
            message: format!("{operation}: {error}"),
        },
        _ => ForgeError::Decode {
            message: format!("{operation}: {error}"),
        },
    }
}
