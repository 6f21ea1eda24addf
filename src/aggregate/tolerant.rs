//! Combinators that fold enrichment failures into defaults.
//!
//! Enrichment calls (CI status, unresolved counts, activity timestamps and
//! the like) must never abort a refresh. These helpers make that policy
//! explicit: a failure is logged with the name of the operation and replaced
//! by a caller-supplied default.

use std::future::Future;

use futures::future::join_all;

use crate::github::ForgeError;

/// Awaits `future`, returning `default` when it fails.
pub async fn tolerate<T, F>(operation: &str, future: F, default: T) -> T
where
    F: Future<Output = Result<T, ForgeError>>,
{
    match future.await {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!("{operation} failed, using default: {error}");
            default
        }
    }
}

/// Awaits `future`, returning `None` when it fails.
pub async fn tolerate_missing<T, F>(operation: &str, future: F) -> Option<T>
where
    F: Future<Output = Result<T, ForgeError>>,
{
    match future.await {
        Ok(value) => Some(value),
        Err(error) => {
            tracing::warn!("{operation} failed, omitting result: {error}");
            None
        }
    }
}

/// Runs `futures` concurrently and keeps the result of each, with `None` in
/// place of every failure.
///
/// Results keep the order of the input futures.
pub async fn join_tolerant<T, F, I>(operation: &str, futures: I) -> Vec<Option<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T, ForgeError>>,
{
    join_all(
        futures
            .into_iter()
            .map(|future| tolerate_missing(operation, future)),
    )
    .await
}
