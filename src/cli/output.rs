//! Output formatting utilities for CLI operations.
//!
//! Responses are written as one JSON object per line so a presentation
//! layer can read them from a pipe.

use std::io::{self, Write};

use forgebar::{ForgeError, Response};

/// Writes a response to stdout as a JSON line.
pub fn write_response(response: &Response) -> Result<(), ForgeError> {
    let mut stdout = io::stdout().lock();
    write_response_to(&mut stdout, response)
}

/// Writes a response to the given writer as a JSON line.
pub fn write_response_to<W: Write>(writer: &mut W, response: &Response) -> Result<(), ForgeError> {
    let line = serde_json::to_string(response).map_err(|error| ForgeError::Io {
        message: error.to_string(),
    })?;

    writeln!(writer, "{line}").map_err(|error| ForgeError::Io {
        message: error.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use forgebar::Response;
    use rstest::rstest;

    use super::write_response_to;

    #[rstest]
    #[case::done(Response::Done, "{\"type\":\"done\"}\n")]
    #[case::changed(Response::Changed(true), "{\"type\":\"changed\",\"payload\":true}\n")]
    #[case::login(
        Response::Login("alice".to_owned()),
        "{\"type\":\"login\",\"payload\":\"alice\"}\n"
    )]
    fn responses_are_written_as_json_lines(#[case] response: Response, #[case] expected: &str) {
        let mut buffer = Vec::new();

        write_response_to(&mut buffer, &response).expect("write should succeed");

        assert_eq!(String::from_utf8_lossy(&buffer), expected);
    }
}
