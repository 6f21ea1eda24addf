//! Response classification shared by the REST and GraphQL calls.

use http::{StatusCode, Uri};
use serde::de::DeserializeOwned;

use crate::github::error::ForgeError;

/// Number of characters of an error body kept in [`ForgeError::Remote`].
pub(crate) const BODY_EXCERPT_CHARS: usize = 200;

pub(super) fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_CHARS).collect()
}

pub(super) fn parse_route(route: &str) -> Result<Uri, ForgeError> {
    route
        .parse::<Uri>()
        .map_err(|error| ForgeError::InvalidUrl(error.to_string()))
}

/// Turns a status and body into the body on success, `None` for
/// `204 No Content`, or a [`ForgeError::Remote`] for anything else.
pub(super) fn classify_response(
    status: StatusCode,
    body: String,
) -> Result<Option<String>, ForgeError> {
    if status == StatusCode::NO_CONTENT {
        return Ok(None);
    }
    if status.is_success() {
        return Ok(Some(body));
    }
    Err(ForgeError::Remote {
        status: status.as_u16(),
        body_excerpt: excerpt(&body),
    })
}

pub(super) fn decode_json<T: DeserializeOwned>(
    operation: &str,
    body: Option<&str>,
) -> Result<T, ForgeError> {
    let Some(text) = body else {
        return Err(ForgeError::Decode {
            message: format!("{operation} returned no content"),
        });
    };
    serde_json::from_str(text).map_err(|error| ForgeError::Decode {
        message: format!("{operation} response deserialisation failed: {error}"),
    })
}
