use std::str::FromStr;

use thiserror::Error;

use crate::domain::{
    conversation::ConversationId,
    message::{MediaKind, MessageId, ReactionKind},
};

pub const HELP_LINES: &[&str] = &[
    "list                           show conversations",
    "search <query>                 filter conversations by name",
    "open <c>                       show messages and mark them read",
    "send <c> <text>                send a text message",
    "reply <c> <m> <text>           reply to a message",
    "media <c> <kind> <ref> [text]  send image, video or audio",
    "edit <c> <m> <text>            edit one of your messages",
    "delete <c> <m>                 delete one of your messages",
    "react <c> <m> <kind>           like, love, laugh, wow, sad, angry",
    "unreact <c> <m>                remove your reaction",
    "read <c>                       mark conversation read",
    "typing <c> [ms]                mark the participant as typing",
    "incoming <c> <text>            receive a message from the participant",
    "help                           show this help",
    "quit                           save and exit",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Search(String),
    Open(ConversationId),
    Send {
        conversation_id: ConversationId,
        text: String,
    },
    Reply {
        conversation_id: ConversationId,
        message_id: MessageId,
        text: String,
    },
    Media {
        conversation_id: ConversationId,
        kind: MediaKind,
        media_ref: String,
        caption: String,
    },
    Edit {
        conversation_id: ConversationId,
        message_id: MessageId,
        text: String,
    },
    Delete {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    React {
        conversation_id: ConversationId,
        message_id: MessageId,
        kind: ReactionKind,
    },
    Unreact {
        conversation_id: ConversationId,
        message_id: MessageId,
    },
    Read(ConversationId),
    Typing {
        conversation_id: ConversationId,
        duration_ms: Option<u64>,
    },
    Incoming {
        conversation_id: ConversationId,
        text: String,
    },
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseCommandError {
    #[error("unknown command `{0}`; type `help` for the list")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("invalid {what}: `{value}`")]
    InvalidValue { what: &'static str, value: String },
}

impl ParseCommandError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unknown(_) => "SHELL_UNKNOWN_COMMAND",
            Self::Usage(_) => "SHELL_USAGE",
            Self::InvalidValue { .. } => "SHELL_INVALID_VALUE",
        }
    }
}

/// Splits off the first whitespace-delimited word.
fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(end) => Some((&input[..end], input[end..].trim_start())),
        None => Some((input, "")),
    }
}

struct Args<'a> {
    rest: &'a str,
    usage: &'static str,
}

impl<'a> Args<'a> {
    fn word(&mut self) -> Result<&'a str, ParseCommandError> {
        let (word, rest) = next_word(self.rest).ok_or(ParseCommandError::Usage(self.usage))?;
        self.rest = rest;
        Ok(word)
    }

    fn optional_word(&mut self) -> Option<&'a str> {
        let (word, rest) = next_word(self.rest)?;
        self.rest = rest;
        Some(word)
    }

    fn conversation(&mut self) -> Result<ConversationId, ParseCommandError> {
        self.word().map(ConversationId::from)
    }

    fn message(&mut self) -> Result<MessageId, ParseCommandError> {
        self.word().map(MessageId::from)
    }

    /// The remainder of the line, required to be non-blank.
    fn text(&mut self) -> Result<String, ParseCommandError> {
        let text = self.tail();
        if text.is_empty() {
            return Err(ParseCommandError::Usage(self.usage));
        }
        Ok(text)
    }

    fn tail(&mut self) -> String {
        let text = self.rest.trim().to_owned();
        self.rest = "";
        text
    }

    fn finish(&self) -> Result<(), ParseCommandError> {
        if self.rest.trim().is_empty() {
            Ok(())
        } else {
            Err(ParseCommandError::Usage(self.usage))
        }
    }
}

fn usage_for(name: &str) -> Option<&'static str> {
    HELP_LINES
        .iter()
        .copied()
        .find(|line| line.split_whitespace().next() == Some(name))
        .map(|line| line.split("  ").next().unwrap_or(line))
}

impl FromStr for ShellCommand {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (name, rest) = next_word(line).ok_or(ParseCommandError::Usage("help"))?;
        let name = name.to_ascii_lowercase();
        let usage = usage_for(&name).ok_or_else(|| ParseCommandError::Unknown(name.clone()))?;
        let mut args = Args { rest, usage };

        let command = match name.as_str() {
            "list" => Self::List,
            "search" => Self::Search(args.tail()),
            "open" => Self::Open(args.conversation()?),
            "send" => Self::Send {
                conversation_id: args.conversation()?,
                text: args.text()?,
            },
            "reply" => Self::Reply {
                conversation_id: args.conversation()?,
                message_id: args.message()?,
                text: args.text()?,
            },
            "media" => {
                let conversation_id = args.conversation()?;
                let kind_word = args.word()?;
                let kind = kind_word
                    .parse::<MediaKind>()
                    .ok()
                    .filter(|kind| *kind != MediaKind::None)
                    .ok_or_else(|| ParseCommandError::InvalidValue {
                        what: "media kind",
                        value: kind_word.to_owned(),
                    })?;
                Self::Media {
                    conversation_id,
                    kind,
                    media_ref: args.word()?.to_owned(),
                    caption: args.tail(),
                }
            }
            "edit" => Self::Edit {
                conversation_id: args.conversation()?,
                message_id: args.message()?,
                text: args.text()?,
            },
            "delete" => Self::Delete {
                conversation_id: args.conversation()?,
                message_id: args.message()?,
            },
            "react" => {
                let conversation_id = args.conversation()?;
                let message_id = args.message()?;
                let kind_word = args.word()?;
                let kind = kind_word.parse::<ReactionKind>().map_err(|_| {
                    ParseCommandError::InvalidValue {
                        what: "reaction",
                        value: kind_word.to_owned(),
                    }
                })?;
                Self::React {
                    conversation_id,
                    message_id,
                    kind,
                }
            }
            "unreact" => Self::Unreact {
                conversation_id: args.conversation()?,
                message_id: args.message()?,
            },
            "read" => Self::Read(args.conversation()?),
            "typing" => {
                let conversation_id = args.conversation()?;
                let duration_ms = args
                    .optional_word()
                    .map(|value| {
                        value
                            .parse::<u64>()
                            .map_err(|_| ParseCommandError::InvalidValue {
                                what: "duration",
                                value: value.to_owned(),
                            })
                    })
                    .transpose()?;
                Self::Typing {
                    conversation_id,
                    duration_ms,
                }
            }
            "incoming" => Self::Incoming {
                conversation_id: args.conversation()?,
                text: args.text()?,
            },
            "help" => Self::Help,
            "quit" => Self::Quit,
            _ => return Err(ParseCommandError::Unknown(name)),
        };

        args.finish()?;
        Ok(command)
    }
}
