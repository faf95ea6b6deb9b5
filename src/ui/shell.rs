//! Interactive line shell over the chat service.
//!
//! Each input line is parsed into a [`ShellCommand`] and dispatched to
//! [`ChatService`]. Chat errors are printed and the loop keeps going;
//! only I/O failures end the session early.

use std::io::{self, Write};

use anyhow::Result;
use thiserror::Error;

use crate::{
    domain::{
        conversation::{Conversation, ConversationId},
        error::ChatError,
        message::{Message, MessageId, NewMessage},
        shell_state::ShellState,
    },
    usecases::{
        chat_service::ChatService,
        context::AppContext,
        contracts::CommandSource,
        list_conversations::{list_conversations, ListConversationsQuery},
        load_messages::{load_messages, LoadMessagesQuery},
        send_message::SendMessageCommand,
    },
};

use super::{
    command::{ParseCommandError, ShellCommand, HELP_LINES},
    message_rendering::{
        build_message_list_elements, insert_unread_separator, render_conversation_row,
        render_message_lines, truncate_to_width, SenderNames,
    },
    styles::{self, Palette},
};

const SHELL_STARTED: &str = "SHELL_STARTED";
const SHELL_COMMAND_FAILED: &str = "SHELL_COMMAND_FAILED";
const PROMPT: &str = "> ";
const NOTICE_PREVIEW_WIDTH: usize = 48;

#[derive(Debug, Error)]
enum ShellError {
    #[error(transparent)]
    Chat(#[from] ChatError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub fn start(
    context: &AppContext,
    service: &mut ChatService,
    source: &mut dyn CommandSource,
    out: &mut dyn Write,
    palette: Palette,
) -> Result<()> {
    tracing::info!(
        code = SHELL_STARTED,
        log_level = %context.config.logging.level,
        current_user = %service.policy().current_user_id,
        "starting chat shell"
    );

    let mut shell = Shell {
        service,
        out,
        palette,
        page_size: context.config.ui.page_size,
        state: ShellState::default(),
    };
    shell.run(source)
}

struct Shell<'a> {
    service: &'a mut ChatService,
    out: &'a mut dyn Write,
    palette: Palette,
    page_size: usize,
    state: ShellState,
}

impl Shell<'_> {
    fn run(&mut self, source: &mut dyn CommandSource) -> Result<()> {
        self.dispatch(ShellCommand::List)?;
        writeln!(self.out, "Type `help` for commands.")?;

        while self.state.is_running() {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;

            let Some(line) = source.next_line()? else {
                break;
            };
            self.deliver_replies()?;

            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match line.parse::<ShellCommand>() {
                Ok(command) => self.dispatch(command)?,
                Err(error) => self.report_parse_error(&error)?,
            }
        }

        Ok(())
    }

    /// Runs one command; chat errors become a printed toast.
    fn dispatch(&mut self, command: ShellCommand) -> io::Result<()> {
        match self.execute(command) {
            Ok(()) => Ok(()),
            Err(ShellError::Chat(error)) => {
                tracing::debug!(
                    code = SHELL_COMMAND_FAILED,
                    error_code = error.code(),
                    error = %error,
                    "command failed"
                );
                self.toast_error(error.code(), &error.to_string())
            }
            Err(ShellError::Io(error)) => Err(error),
        }
    }

    fn execute(&mut self, command: ShellCommand) -> Result<(), ShellError> {
        match command {
            ShellCommand::List => {
                self.state.close();
                self.print_conversations(ListConversationsQuery::default())?;
                let unread = self.service.total_unread()?;
                if unread > 0 {
                    self.notice(&format!("{unread} unread"))?;
                }
            }
            ShellCommand::Search(query) => {
                self.print_conversations(ListConversationsQuery::matching(query))?;
            }
            ShellCommand::Open(conversation_id) => self.open(conversation_id)?,
            ShellCommand::Send {
                conversation_id,
                text,
            } => self.send(SendMessageCommand::text(conversation_id, text))?,
            ShellCommand::Reply {
                conversation_id,
                message_id,
                text,
            } => {
                self.send(SendMessageCommand::text(conversation_id, text).replying_to(message_id))?
            }
            ShellCommand::Media {
                conversation_id,
                kind,
                media_ref,
                caption,
            } => self.send(
                SendMessageCommand::text(conversation_id, caption).with_media(kind, media_ref),
            )?,
            ShellCommand::Edit {
                conversation_id,
                message_id,
                text,
            } => {
                let message = self
                    .service
                    .edit_message(&conversation_id, &message_id, &text)?;
                self.notice(&format!("edited [{}]", message.id))?;
            }
            ShellCommand::Delete {
                conversation_id,
                message_id,
            } => {
                let message = self.service.delete_message(&conversation_id, &message_id)?;
                self.notice(&format!("deleted [{}]", message.id))?;
            }
            ShellCommand::React {
                conversation_id,
                message_id,
                kind,
            } => {
                let message = self
                    .service
                    .add_reaction(&conversation_id, &message_id, kind)?;
                self.notice(&format!("reacted {} to [{}]", kind.emoji(), message.id))?;
            }
            ShellCommand::Unreact {
                conversation_id,
                message_id,
            } => {
                let message = self
                    .service
                    .remove_reaction(&conversation_id, &message_id)?;
                self.notice(&format!("reaction removed from [{}]", message.id))?;
            }
            ShellCommand::Read(conversation_id) => {
                match self.service.mark_as_read(&conversation_id)? {
                    Some(cursor) => {
                        self.notice(&format!("{conversation_id} read up to [{cursor}]"))?
                    }
                    None => self.notice(&format!("{conversation_id} has no messages"))?,
                }
            }
            ShellCommand::Typing {
                conversation_id,
                duration_ms,
            } => {
                self.service.set_typing(&conversation_id, duration_ms)?;
                let name = self
                    .service
                    .conversation(&conversation_id)?
                    .participant_name
                    .clone();
                self.notice(&format!("{name} is typing…"))?;
            }
            ShellCommand::Incoming {
                conversation_id,
                text,
            } => {
                let participant_id = self
                    .service
                    .conversation(&conversation_id)?
                    .participant_id
                    .clone();
                let message = self
                    .service
                    .receive_message(&conversation_id, NewMessage::text(participant_id, text))?;
                self.announce(&message)?;
            }
            ShellCommand::Help => {
                for line in HELP_LINES {
                    writeln!(self.out, "  {line}")?;
                }
            }
            ShellCommand::Quit => self.state.stop(),
        }

        Ok(())
    }

    fn print_conversations(&mut self, query: ListConversationsQuery) -> Result<(), ShellError> {
        let output = list_conversations(&*self.service, query)?;

        if output.conversations.is_empty() {
            writeln!(self.out, "No conversations.")?;
            return Ok(());
        }

        for summary in &output.conversations {
            writeln!(self.out, "{}", render_conversation_row(summary, self.palette))?;
        }

        let hidden = output.total_matches.saturating_sub(output.conversations.len());
        if hidden > 0 {
            writeln!(self.out, "… {hidden} more")?;
        }
        Ok(())
    }

    fn open(&mut self, conversation_id: ConversationId) -> Result<(), ShellError> {
        let conversation = self.service.conversation(&conversation_id)?.clone();
        let page = load_messages(
            &*self.service,
            LoadMessagesQuery::new(conversation_id.clone()).with_limit(self.page_size),
        )?;

        let mut header = self
            .palette
            .paint(styles::conversation_name_style(), &conversation.participant_name);
        if self.service.is_typing(&conversation_id) {
            header.push_str("  ");
            header.push_str(&self.palette.paint(styles::typing_style(), "typing…"));
        }
        writeln!(self.out, "{header}")?;

        if page.older_count > 0 {
            writeln!(self.out, "({} older messages)", page.older_count)?;
        }
        if page.messages.is_empty() {
            writeln!(self.out, "No messages yet.")?;
        }
        let mut first_unread = None;
        for message in page.messages.iter().filter(|message| !message.is_deleted) {
            if !self.service.is_read(&conversation_id, &message.id)? {
                first_unread = Some(message.id.clone());
                break;
            }
        }
        self.print_messages(&conversation, &page.messages, first_unread.as_ref())?;

        self.service.mark_as_read(&conversation_id)?;
        self.state.open(conversation_id);
        Ok(())
    }

    fn send(&mut self, command: SendMessageCommand) -> Result<(), ShellError> {
        let conversation = self.service.conversation(&command.conversation_id)?.clone();
        let message = self.service.send_message(command)?;

        self.print_messages(&conversation, std::slice::from_ref(&message), None)?;
        Ok(())
    }

    fn print_messages(
        &mut self,
        conversation: &Conversation,
        messages: &[Message],
        first_unread: Option<&MessageId>,
    ) -> io::Result<()> {
        let names = SenderNames {
            current_user_id: &self.service.policy().current_user_id,
            conversation,
        };
        let mut elements = build_message_list_elements(messages, &names);
        if let Some(message_id) = first_unread {
            insert_unread_separator(&mut elements, message_id);
        }

        for line in render_message_lines(&elements, self.palette) {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn deliver_replies(&mut self) -> Result<()> {
        for message in self.service.deliver_due_replies() {
            if let Err(error) = self.announce(&message) {
                match error {
                    ShellError::Io(error) => return Err(error.into()),
                    ShellError::Chat(error) => self.toast_error(error.code(), &error.to_string())?,
                }
            }
        }
        Ok(())
    }

    /// Shows a message that arrived from the participant. Messages landing
    /// in the open conversation are read immediately.
    fn announce(&mut self, message: &Message) -> Result<(), ShellError> {
        let conversation = self.service.conversation(&message.conversation_id)?.clone();

        if self.state.open_conversation() == Some(&conversation.id) {
            self.print_messages(&conversation, std::slice::from_ref(message), None)?;
            self.service.mark_as_read(&conversation.id)?;
        } else {
            let preview = truncate_to_width(&message.display_content(), NOTICE_PREVIEW_WIDTH);
            self.notice(&format!(
                "new message from {} in {}: {}",
                conversation.participant_name, conversation.id, preview
            ))?;
        }
        Ok(())
    }

    fn notice(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.out, "{}", self.palette.paint(styles::notice_style(), text))
    }

    fn toast_error(&mut self, code: &str, text: &str) -> io::Result<()> {
        writeln!(
            self.out,
            "{}",
            self.palette
                .paint(styles::error_style(), &format!("error [{code}]: {text}"))
        )
    }

    fn report_parse_error(&mut self, error: &ParseCommandError) -> io::Result<()> {
        self.toast_error(error.code(), &error.to_string())
    }
}
