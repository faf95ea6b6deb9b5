use std::io::{self, IsTerminal, Write};

use anyhow::Result;

use crate::{
    cli::{Cli, Command},
    domain,
    infra::{self, contracts::SnapshotStore},
    ui::{
        self,
        command_source::LineCommandSource,
        message_rendering::{
            build_message_list_elements, render_conversation_row, render_message_lines,
            SenderNames,
        },
        styles::Palette,
    },
    usecases::{
        self, bootstrap,
        chat_service::ChatService,
        list_conversations::{list_conversations, ListConversationsQuery},
        load_messages::{load_messages, LoadMessagesQuery},
    },
};

const SNAPSHOT_SAVED: &str = "SNAPSHOT_SAVED";
const SNAPSHOT_SAVE_FAILED: &str = "SNAPSHOT_SAVE_FAILED";

pub fn run(cli: Cli) -> Result<()> {
    let context = bootstrap::bootstrap(cli.config.as_deref())?;

    tracing::debug!(
        ui = ui::module_name(),
        domain = domain::module_name(),
        usecases = usecases::module_name(),
        infra = infra::module_name(),
        "module boundaries loaded"
    );

    let mut store = bootstrap::open_snapshot_store(&context)?;
    let (mut service, seed) = bootstrap::compose_service(&context.config, store.as_ref())?;

    let stdout = io::stdout();
    let palette = Palette::new(context.config.ui.color && stdout.is_terminal());
    let mut out = stdout.lock();

    match cli.command_or_default() {
        Command::Run => {
            tracing::info!(seed = seed.as_label(), "opening interactive shell");

            let mut source = LineCommandSource::stdin();
            let shell_result =
                ui::shell::start(&context, &mut service, &mut source, &mut out, palette);

            // Save what the session produced even if the shell broke off.
            if let Err(error) = persist(store.as_mut(), &service) {
                tracing::error!(code = SNAPSHOT_SAVE_FAILED, error = ?error, "snapshot not saved");
                shell_result?;
                return Err(error);
            }
            shell_result?;
        }
        Command::Conversations { query } => {
            let query = ListConversationsQuery::matching(query.unwrap_or_default());
            write_conversations(&service, query, &mut out, palette)?;
        }
        Command::Messages {
            conversation,
            limit,
        } => {
            let query = LoadMessagesQuery::new(conversation)
                .with_limit(limit.unwrap_or(context.config.ui.page_size));
            write_messages(&service, query, &mut out, palette)?;
        }
    }

    Ok(())
}

fn persist(store: &mut dyn SnapshotStore, service: &ChatService) -> Result<()> {
    let snapshot = service.snapshot();
    store.save(&snapshot)?;

    tracing::info!(
        code = SNAPSHOT_SAVED,
        conversations = snapshot.conversations.len(),
        messages = snapshot.message_count(),
        "chat state saved"
    );
    Ok(())
}

fn write_conversations(
    service: &ChatService,
    query: ListConversationsQuery,
    out: &mut dyn Write,
    palette: Palette,
) -> Result<()> {
    let output = list_conversations(service, query)?;

    if output.conversations.is_empty() {
        writeln!(out, "No conversations.")?;
    }
    for summary in &output.conversations {
        writeln!(out, "{}", render_conversation_row(summary, palette))?;
    }

    Ok(())
}

fn write_messages(
    service: &ChatService,
    query: LoadMessagesQuery,
    out: &mut dyn Write,
    palette: Palette,
) -> Result<()> {
    let conversation = service.conversation(&query.conversation_id)?;
    let page = load_messages(service, query)?;

    if page.older_count > 0 {
        writeln!(out, "({} older messages)", page.older_count)?;
    }

    let names = SenderNames {
        current_user_id: &service.policy().current_user_id,
        conversation,
    };
    let elements = build_message_list_elements(&page.messages, &names);
    for line in render_message_lines(&elements, palette) {
        writeln!(out, "{line}")?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{
            clock::ManualClock,
            conversation::{Conversation, ConversationId},
            error::ChatError,
            message::NewMessage,
        },
        infra::stubs::MemorySnapshotStore,
        usecases::chat_service::ChatPolicy,
    };

    fn service() -> ChatService {
        let clock = ManualClock::at(1_771_070_400_000);
        let mut service = ChatService::new(ChatPolicy::default(), Box::new(clock));
        service.register_conversation(Conversation::new("c1", "u-emma", "Emma Wilson"));
        service.register_conversation(Conversation::new("c2", "u-liam", "Liam Chen"));
        for text in ["one", "two", "three"] {
            service
                .receive_message(&ConversationId::from("c1"), NewMessage::text("u-emma", text))
                .expect("append");
        }
        service
    }

    fn rendered(write: impl FnOnce(&mut Vec<u8>) -> Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).expect("write should succeed");
        String::from_utf8(out).expect("utf-8 output")
    }

    #[test]
    fn conversations_are_filtered_by_query() {
        let service = service();

        let output = rendered(|out| {
            write_conversations(
                &service,
                ListConversationsQuery::matching("liam"),
                out,
                Palette::plain(),
            )
        });

        assert!(output.contains("Liam Chen"));
        assert!(!output.contains("Emma Wilson"));
    }

    #[test]
    fn messages_page_reports_older_count() {
        let service = service();

        let output = rendered(|out| {
            write_messages(
                &service,
                LoadMessagesQuery::new("c1").with_limit(2),
                out,
                Palette::plain(),
            )
        });

        assert!(output.starts_with("(1 older messages)"));
        assert!(!output.contains("one"));
        assert!(output.contains("two"));
        assert!(output.contains("three"));
    }

    #[test]
    fn messages_for_unknown_conversation_fail() {
        let service = service();
        let mut out = Vec::new();

        let error = write_messages(
            &service,
            LoadMessagesQuery::new("missing"),
            &mut out,
            Palette::plain(),
        )
        .expect_err("unknown conversation");

        assert_eq!(
            error.downcast_ref::<ChatError>(),
            Some(&ChatError::ConversationNotFound("missing".into()))
        );
    }

    #[test]
    fn persist_saves_current_state() {
        let service = service();
        let mut store = MemorySnapshotStore::default();

        persist(&mut store, &service).expect("save");

        let saved = store.saved.expect("snapshot saved");
        assert_eq!(saved.conversations.len(), 2);
        assert_eq!(saved.message_count(), 3);
    }
}
