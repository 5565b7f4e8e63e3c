//! Interactive chat loop

use std::future::Future;
use std::io::{self, Write};
use std::sync::Arc;

use anyhow::bail;
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use widget_core::{AudioClip, FieldKind, MessageId, PreChatField, WidgetError};
use widget_session::WidgetSession;

use crate::render;

/// Line-oriented stdin shared by the chat loop and the form prompts.
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn stdin() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// `None` on end of input.
    pub async fn read_line(&mut self, prompt: &str) -> anyhow::Result<Option<String>> {
        print!("{} ", prompt);
        io::stdout().flush()?;
        Ok(self.lines.next_line().await?)
    }
}

/// Ctrl-C, watched for the whole run so a press is never lost between
/// prompts or while a reply is pending.
#[derive(Clone, Default)]
pub struct Interrupt {
    notify: Arc<Notify>,
}

impl Interrupt {
    /// Take over SIGINT for the rest of the process.
    pub fn listen() -> Self {
        let interrupt = Self::default();
        let signal = interrupt.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                signal.trigger();
            }
        });
        interrupt
    }

    fn trigger(&self) {
        self.notify.notify_one();
    }

    /// Run `future` unless Ctrl-C arrives first.
    pub async fn guard<F: Future>(&self, future: F) -> Option<F::Output> {
        tokio::select! {
            output = future => Some(output),
            _ = self.notify.notified() => None,
        }
    }
}

/// Whether a step ran to the end or was cut short by Ctrl-C.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Completed,
    Interrupted,
}

enum Command {
    Open,
    Close,
    Minimize,
    Escalate,
    ShowView,
    Audio(String),
    Quit,
    QuickPrompt(usize),
    Say(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let command = match line {
            "/open" => Self::Open,
            "/close" => Self::Close,
            "/min" | "/minimize" => Self::Minimize,
            "/escalate" => Self::Escalate,
            "/view" => Self::ShowView,
            "/quit" | "/exit" => Self::Quit,
            _ => match line.strip_prefix("/audio") {
                Some(path) => Self::Audio(path.trim().to_string()),
                None => match line.parse::<usize>() {
                    Ok(number) if number > 0 => Self::QuickPrompt(number - 1),
                    _ => Self::Say(line.to_string()),
                },
            },
        };
        Some(command)
    }
}

pub async fn run(session: WidgetSession, interrupt: Interrupt) -> anyhow::Result<()> {
    render::banner(&session);
    let mut input = Input::stdin();
    let mut last_seen: MessageId = 0;

    session.open();

    loop {
        render::new_messages(&session, &mut last_seen);
        let view = session.view();
        render::visibility(&view);

        if view.form().is_some() {
            println!("{}", session.config().pre_chat_form.pre_chat_message.yellow());
            if fill_pre_chat_form(&session, &mut input, &interrupt).await? == Flow::Interrupted {
                return hang_up(&session).await;
            }
            continue;
        }
        if let Some(conversation) = view.conversation() {
            render::quick_prompts(&conversation.quick_prompts);
        }

        let prompt = "You:".cyan().bold().to_string();
        let Some(line) = interrupt.guard(input.read_line(&prompt)).await else {
            return hang_up(&session).await;
        };
        let Some(line) = line? else {
            break;
        };
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        let pending = match command {
            Command::Open => {
                session.open();
                continue;
            }
            Command::Close => {
                session.close();
                continue;
            }
            Command::Minimize => {
                session.toggle_minimize();
                continue;
            }
            Command::ShowView => {
                println!("{}", serde_json::to_string_pretty(&view)?);
                continue;
            }
            Command::Quit => break,
            Command::Escalate => session.escalate(),
            Command::Audio(path) => match read_clip(&path).await {
                Ok(clip) => session.send_audio(clip),
                Err(e) => {
                    println!("{}", format!("❌ {}", e).red());
                    continue;
                }
            },
            Command::QuickPrompt(index) => {
                let prompt = view
                    .conversation()
                    .and_then(|conversation| conversation.quick_prompts.get(index).cloned());
                match prompt {
                    Some(prompt) => session.send_quick_prompt(&prompt),
                    None => session.send(line.trim()),
                }
            }
            Command::Say(text) => {
                if !session.visibility().is_open() {
                    println!("{}", "Type /open first.".dimmed());
                    continue;
                }
                session.send(text)
            }
        };

        match pending {
            Ok(handle) => {
                if wait_for_reply(&session, &mut last_seen, handle, &interrupt).await?
                    == Flow::Interrupted
                {
                    return hang_up(&session).await;
                }
            }
            Err(e) => println!("{}", format!("❌ {}", e).red()),
        }
    }

    session.unmount().await;
    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}

/// Ctrl-C is the page-unload trigger.
pub async fn hang_up(session: &WidgetSession) -> anyhow::Result<()> {
    println!();
    session.page_unload().await;
    println!("{}", "👋 Goodbye!".cyan());
    Ok(())
}

async fn wait_for_reply(
    session: &WidgetSession,
    last_seen: &mut MessageId,
    handle: JoinHandle<()>,
    interrupt: &Interrupt,
) -> anyhow::Result<Flow> {
    render::new_messages(session, last_seen);
    if let Some(typing) = session.view().conversation().and_then(|c| c.typing.clone()) {
        println!("{}", typing.dimmed());
    }
    match interrupt.guard(handle).await {
        Some(joined) => {
            joined?;
            Ok(Flow::Completed)
        }
        None => Ok(Flow::Interrupted),
    }
}

async fn read_clip(path: &str) -> anyhow::Result<AudioClip> {
    if path.is_empty() {
        bail!("usage: /audio <file>");
    }
    let data = tokio::fs::read(path).await?;
    Ok(AudioClip::from_file_name(data, path))
}

/// Ask for every active field until the form is accepted.
pub async fn fill_pre_chat_form(
    session: &WidgetSession,
    input: &mut Input,
    interrupt: &Interrupt,
) -> anyhow::Result<Flow> {
    let fields: Vec<PreChatField> = session.config().pre_chat_form.active_fields().cloned().collect();

    while session.is_gated() {
        for field in &fields {
            let prompt = render::field_prompt(field);
            let Some(answer) = interrupt.guard(input.read_line(&prompt)).await else {
                return Ok(Flow::Interrupted);
            };
            let Some(answer) = answer? else {
                bail!("input closed before the pre-chat form was submitted");
            };
            session.set_answer(field.id.clone(), select_value(field, answer.trim()));
        }

        match session.submit_pre_chat_form() {
            Ok(()) => {}
            Err(WidgetError::ValidationFailed(e)) => println!("{}", format!("❌ {}", e).red()),
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Flow::Completed)
}

/// Select fields accept the option number as well as its value.
fn select_value(field: &PreChatField, answer: &str) -> String {
    if field.kind == FieldKind::Select {
        if let Some(option) = answer
            .parse::<usize>()
            .ok()
            .and_then(|number| number.checked_sub(1))
            .and_then(|index| field.options.get(index))
        {
            return option.value.clone();
        }
    }
    answer.to_string()
}
