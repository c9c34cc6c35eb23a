//! Hikmah - interactive chat client
//!
//! Reads questions from stdin, streams answers to stdout. Logs go to
//! stderr so they never interleave with the answer text.

use std::future::Future;
use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio::signal;
use tracing::{info, warn};

use hikmah::chat::{CitationMerge, ReplyStatus};
use hikmah::{
    telemetry, ChatClient, Config, DisplayMessage, Message, ReplyBuffer, SessionManager,
    StreamEvent,
};

const WELCOME_TEXT: &str = "As-salamu alaykum! Ask me anything about the Quran, hadith or duas.";

/// One interactive conversation
struct Conversation {
    turns: Vec<DisplayMessage>,
    sessions: SessionManager,
    next_id: usize,
}

impl Conversation {
    fn new() -> Self {
        Self {
            turns: vec![DisplayMessage::welcome(WELCOME_TEXT)],
            sessions: SessionManager::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let default_filter = if config.debug_enabled {
        "hikmah=debug"
    } else {
        "hikmah=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    telemetry::init_metrics();

    let client = ChatClient::from_config(&config)?;
    info!(api_url = %config.api_url, "Hikmah client ready");

    let mut conversation = Conversation::new();
    println!("{}", WELCOME_TEXT);
    println!("(commands: /new, /chats, /title, /quit; Ctrl+C cancels an answer or exits at the prompt)");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        // A cancelled turn replaced the default Ctrl+C exit with tokio's handler.
        let Some(line) = next_input(&mut lines, signal::ctrl_c()).await? else {
            println!();
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            "/quit" | "/exit" => break,
            "/new" => {
                conversation = Conversation::new();
                println!("{}", WELCOME_TEXT);
            }
            "/chats" => list_chats(&client).await,
            "/title" => generate_title(&client, &conversation).await,
            question => ask(&client, &mut conversation, question).await?,
        }
    }

    info!("Goodbye");
    Ok(())
}

/// Next input line; `None` at end of input or once `interrupt` fires.
async fn next_input<R, F>(lines: &mut Lines<R>, interrupt: F) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => Ok(line?),
        _ = interrupt => Ok(None),
    }
}

fn prompt() -> Result<()> {
    print!("\n> ");
    std::io::stdout().flush()?;
    Ok(())
}

/// Run one turn, printing tokens as they arrive. Ctrl+C cancels the turn.
async fn ask(client: &ChatClient, conversation: &mut Conversation, question: &str) -> Result<()> {
    let user_id = conversation.next_id("user");
    conversation
        .turns
        .push(DisplayMessage::new(user_id, Message::user(question)));

    let mut handle = match client
        .spawn_message(&mut conversation.sessions, &conversation.turns)
        .await
    {
        Ok(handle) => handle,
        Err(e) => {
            // Never sent; keep it out of the history
            conversation.turns.pop();
            println!("{}", e.user_message());
            return Ok(());
        }
    };

    let mut reply = ReplyBuffer::new(CitationMerge::Append);
    let mut stdout = std::io::stdout();
    let cancelled = loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else { break false };
                if let StreamEvent::Token(text) = &event {
                    write!(stdout, "{}", text)?;
                    stdout.flush()?;
                }
                let terminal = event.is_terminal();
                reply.apply(event);
                if terminal {
                    break false;
                }
            }
            _ = signal::ctrl_c() => {
                warn!("Turn cancelled");
                break true;
            }
        }
    };
    handle.abort();
    println!();

    if cancelled {
        // Partial text is still a real reply
        if let Some(message) = reply.to_message() {
            let id = conversation.next_id("assistant");
            conversation.turns.push(DisplayMessage::new(id, message));
        }
        return Ok(());
    }

    if let ReplyStatus::Failed(message) = reply.status() {
        println!("[error] {}", message);
    }
    for citation in reply.citations() {
        println!("  [{:?}] {}", citation.kind, citation.reference);
    }

    let id = conversation.next_id("assistant");
    match reply.to_message() {
        Some(message) => conversation.turns.push(DisplayMessage::new(id, message)),
        None => {
            let apology = reply.into_display_text();
            println!("{}", apology);
            conversation
                .turns
                .push(DisplayMessage::placeholder(id, Message::assistant(apology)));
        }
    }
    Ok(())
}

async fn list_chats(client: &ChatClient) {
    match client.list_chats().await {
        Ok(chats) if chats.is_empty() => println!("No chats yet."),
        Ok(chats) => {
            for chat in chats {
                println!(
                    "{}  {}",
                    chat.id,
                    chat.title.as_deref().unwrap_or("(untitled)")
                );
            }
        }
        Err(e) => println!("{}", e.user_message()),
    }
}

async fn generate_title(client: &ChatClient, conversation: &Conversation) {
    let Some(chat_id) = conversation.sessions.chat_id() else {
        println!("This conversation has no session yet.");
        return;
    };
    match client.generate_title(chat_id).await {
        Ok(title) => println!("Title: {}", title),
        Err(e) => println!("{}", e.user_message()),
    }
}
