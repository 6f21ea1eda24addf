//! Octocrab client construction helpers.

use http::Uri;
use http::header::AUTHORIZATION;
use octocrab::Octocrab;
use url::Url;

use crate::github::error::ForgeError;
use crate::github::repo_key::PersonalAccessToken;

use super::error_mapping::map_octocrab_error;

/// Validates `api_base` as an absolute HTTP(S) URL and converts it to the
/// URI form Octocrab expects, without a trailing slash.
fn parse_base_uri(api_base: &str) -> Result<Uri, ForgeError> {
    let url = Url::parse(api_base.trim())
        .map_err(|error| ForgeError::InvalidUrl(format!("{api_base}: {error}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ForgeError::InvalidUrl(format!(
            "{api_base}: unsupported scheme {}",
            url.scheme()
        )));
    }

    url.as_str()
        .trim_end_matches('/')
        .parse::<Uri>()
        .map_err(|error| ForgeError::InvalidUrl(error.to_string()))
}

/// Builds the client used for REST calls.
///
/// GitHub's REST API is called with the `token` authorisation scheme.
///
/// # Errors
///
/// Returns `ForgeError::InvalidUrl` when the base URI cannot be parsed or a
/// mapped Octocrab error when the client cannot be constructed.
pub(super) fn build_rest_client(
    token: &PersonalAccessToken,
    api_base: &str,
) -> Result<Octocrab, ForgeError> {
    let base_uri = parse_base_uri(api_base)?;

    Octocrab::builder()
        .add_header(AUTHORIZATION, format!("token {}", token.value()))
        .base_uri(base_uri)
        .map_err(|error| map_octocrab_error("build REST client", &error))?
        .build()
        .map_err(|error| map_octocrab_error("build REST client", &error))
}

/// Builds the client used for GraphQL calls, authorised with a bearer token.
///
/// # Errors
///
/// Returns `ForgeError::InvalidUrl` when the base URI cannot be parsed or a
/// mapped Octocrab error when the client cannot be constructed.
pub(super) fn build_graphql_client(
    token: &PersonalAccessToken,
    api_base: &str,
) -> Result<Octocrab, ForgeError> {
    let base_uri = parse_base_uri(api_base)?;

    Octocrab::builder()
        .personal_token(token.value())
        .base_uri(base_uri)
        .map_err(|error| map_octocrab_error("build GraphQL client", &error))?
        .build()
        .map_err(|error| map_octocrab_error("build GraphQL client", &error))
}
