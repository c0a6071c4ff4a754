//! Parse typed lines into protocol messages

use thiserror::Error;

use crate::messages::{ClientMessage, Destination, PlayerId};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Direct messages look like @<slot> <text>")]
    BadDirect,
}

/// Turn one line of input into a client message.
///
/// `/cmd a b` sends a command on the all channel, `@3 text` sends a
/// direct chat to slot 3, and anything else is chat to everyone. Blank
/// lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ClientMessage>, InputError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    if let Some(rest) = line.strip_prefix('/') {
        let mut words = rest.split_whitespace();
        let command = words.next().ok_or(InputError::EmptyCommand)?;
        return Ok(Some(ClientMessage::Command {
            channel: Destination::All,
            command: command.to_string(),
            params: words.map(str::to_string).collect(),
        }));
    }

    if let Some(rest) = line.strip_prefix('@') {
        let (slot, text) = rest.split_once(char::is_whitespace).ok_or(InputError::BadDirect)?;
        let slot: PlayerId = slot.parse().map_err(|_| InputError::BadDirect)?;
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::BadDirect);
        }
        return Ok(Some(ClientMessage::Chat {
            to: Destination::Player(slot),
            message: text.to_string(),
        }));
    }

    Ok(Some(ClientMessage::Chat {
        to: Destination::All,
        message: line.to_string(),
    }))
}
