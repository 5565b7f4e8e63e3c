//! Terminal rendering of the widget view

use colored::Colorize;
use widget_core::{FieldKind, Message, MessageId, PreChatField, QuickPrompt};
use widget_session::{WidgetSession, WidgetView};

pub fn banner(session: &WidgetSession) {
    let config = session.config();
    println!("{}", format!("🤖 {}", config.title).cyan().bold());
    if let Some(heading) = &config.welcome_heading {
        println!("{}", heading.dimmed());
    }
    println!(
        "{}",
        "Commands: /open /close /min /escalate /audio <file> /view /quit".dimmed()
    );
    println!();
}

/// Print messages appended since `last_seen` and advance it.
pub fn new_messages(session: &WidgetSession, last_seen: &mut MessageId) {
    let title = session.config().title.clone();
    let since = *last_seen;
    for message in session.messages().iter().filter(|m| m.id > since) {
        print_message(&title, message);
        *last_seen = message.id;
    }
}

fn print_message(title: &str, message: &Message) {
    let time = format!("[{}]", message.display_time()).dimmed();
    if message.is_from_visitor() {
        println!("{} {} {}", time, "You:".cyan().bold(), message.text);
    } else {
        println!("{} {} {}", time, format!("{title}:").green().bold(), message.text);
    }
}

pub fn quick_prompts(prompts: &[QuickPrompt]) {
    if prompts.is_empty() {
        return;
    }
    println!("{}", "Quick prompts:".dimmed());
    for (index, prompt) in prompts.iter().enumerate() {
        println!("  {} {}", format!("{}.", index + 1).yellow(), prompt.title);
    }
}

pub fn visibility(view: &WidgetView) {
    match &view.panel {
        None => println!("{}", "💬 Widget closed. Type /open to chat.".dimmed()),
        Some(panel) if panel.header.minimized => {
            println!("{}", format!("▁ {} (minimized)", panel.header.title).dimmed())
        }
        Some(_) => {}
    }
}

pub fn field_prompt(field: &PreChatField) -> String {
    let marker = if field.required { "*" } else { "" };
    let mut prompt = format!("{}{}", field.display_label(), marker);
    if let Some(placeholder) = &field.placeholder {
        prompt.push_str(&format!(" ({placeholder})"));
    }
    if field.kind == FieldKind::Select {
        for (index, option) in field.options.iter().enumerate() {
            println!("  {} {}", format!("{}.", index + 1).yellow(), option.label);
        }
    }
    format!("{prompt}:")
}
