//! `ragchat chat`: Interactive or single-message chat mode.

use std::io::Write;
use std::path::Path;

use ragchat_agent::{ChatOrchestrator, ChatReply, ChatRequest};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Per-run overrides taken from the command line.
pub struct ChatOptions {
    pub session: String,
    pub instruction: Option<String>,
    pub rag: Option<bool>,
    pub web: Option<bool>,
}

impl ChatOptions {
    fn request(&self, message: &str) -> ChatRequest {
        ChatRequest {
            session_id: self.session.clone(),
            message: message.to_string(),
            system_instruction: self.instruction.clone(),
            use_rag: self.rag,
            use_web_search: self.web,
        }
    }
}

pub async fn run(
    config_path: &Path,
    message: Option<String>,
    options: ChatOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;

    if !config.ai.enabled || config.ai.credential().is_none() {
        eprintln!();
        eprintln!("  The assistant is not configured.");
        eprintln!();
        eprintln!("  Set these environment variables:");
        eprintln!("    AI_ENABLED=true");
        eprintln!("    AI_API_KEY=<your key>");
        eprintln!();
        eprintln!("  Or edit {}", config_path.display());
        eprintln!();
        return Err("AI is not configured. See above for setup instructions.".into());
    }

    let model = config.ai.model.clone();
    let corpus = config.corpus.root.display().to_string();
    let orchestrator = super::build_orchestrator(&config);

    if let Some(msg) = message {
        // Single message mode
        let reply = orchestrator.chat(options.request(&msg)).await?;
        print_reply(&reply);
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  ragchat interactive mode");
    println!();
    println!("  Model:     {model}");
    println!("  Corpus:    {corpus}");
    println!("  Session:   {}", options.session);
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type '/clear' to forget this session, 'exit' to quit.");
    println!();

    interactive(&orchestrator, &options).await?;

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

async fn interactive(
    orchestrator: &ChatOrchestrator,
    options: &ChatOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => {}
            "exit" | "quit" => break,
            "/clear" => {
                if orchestrator.clear_session(&options.session).await {
                    println!("  Session cleared.");
                } else {
                    println!("  Nothing to clear.");
                }
            }
            _ => match orchestrator.chat(options.request(input)).await {
                Ok(reply) => {
                    println!();
                    print_reply(&reply);
                }
                Err(e) => {
                    eprintln!("  [Error] {e}");
                }
            },
        }
        println!();
        prompt()?;
    }

    Ok(())
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}

fn print_reply(reply: &ChatReply) {
    for line in render_reply(reply).lines() {
        println!("{line}");
    }
}

fn render_reply(reply: &ChatReply) -> String {
    let mut out = String::new();
    for line in reply.reply.lines() {
        out.push_str(&format!("  Assistant > {line}\n"));
    }

    if !reply.rag_sources.is_empty() || !reply.web_sources.is_empty() {
        out.push('\n');
        out.push_str("  Sources:\n");
        for s in &reply.rag_sources {
            out.push_str(&format!("    - {}:{}\n", s.source, s.line));
        }
        for w in &reply.web_sources {
            out.push_str(&format!("    - {} <{}>\n", w.title, w.link));
        }
    }

    out.push_str(&format!(
        "  [{} | {} messages in session {}]",
        reply.model, reply.messages_in_memory, reply.session_id
    ));
    out
}
