//! Run one command and print its response.

use forgebar::{Command, CommandDispatcher, ForgeError};

use super::output::write_response;

/// Dispatches `command` and writes the response to stdout.
///
/// # Errors
///
/// Returns the dispatch error, or [`ForgeError::Io`] when the response
/// cannot be written.
pub async fn run(dispatcher: &CommandDispatcher, command: Command) -> Result<(), ForgeError> {
    let response = dispatcher.dispatch(command).await?;
    write_response(&response)
}
