//! Markdown to HTML for note pages, plus the helpers templates use to show
//! notes in lists and forms.

use std::fmt;

use chrono::{DateTime, Utc};
use minijinja::{Environment, Value};
use pulldown_cmark::{html, Event, Options, Parser};

const PREVIEW_CHARS: usize = 100;
const ELLIPSIS: &str = "...";

/// Renders note content as HTML. Single newlines become `<br />` and raw
/// HTML in the source is escaped.
pub fn render(content: &str) -> Result<String, fmt::Error> {
    let parser = Parser::new_ext(content, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES).map(|event| {
        match event {
            Event::SoftBreak => Event::HardBreak,
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            event => event,
        }
    });

    let mut out = String::with_capacity(content.len() * 3 / 2);
    html::write_html_fmt(&mut out, parser)?;
    Ok(out)
}

/// Short plain-text excerpt for list views: the first line, or the first
/// hundred characters of a single long line.
pub fn preview(content: &str) -> String {
    let content = content.trim_start();

    if let Some((first, rest)) = content.split_once('\n') {
        let first = first.trim_end_matches('\r');
        let mut excerpt = truncate_chars(first).unwrap_or(first).to_string();
        if !rest.trim().is_empty() || excerpt.len() < first.len() {
            excerpt.push_str(ELLIPSIS);
        }
        return excerpt;
    }

    match truncate_chars(content) {
        Some(cut) => format!("{cut}{ELLIPSIS}"),
        None => content.to_string(),
    }
}

fn truncate_chars(line: &str) -> Option<&str> {
    line.char_indices().nth(PREVIEW_CHARS).map(|(idx, _)| &line[..idx])
}

pub fn labels_input(labels: &[String]) -> String {
    labels.join(", ")
}

pub fn format_date(value: &str) -> String {
    DateTime::parse_from_rfc3339(value)
        .map(|date| date.with_timezone(&Utc).format("%b %-d, %Y %H:%M").to_string())
        .unwrap_or_else(|_| value.to_string())
}

fn markdown_filter(content: &str) -> Value {
    html_or_text(render(content), content)
}

/// Rendered HTML is marked safe. On failure the raw content is kept as plain
/// text so the template escapes it.
fn html_or_text(rendered: Result<String, fmt::Error>, content: &str) -> Value {
    match rendered {
        Ok(html) => Value::from_safe_string(html),
        Err(err) => {
            tracing::warn!("markdown rendering failed: {err}");
            Value::from(content)
        }
    }
}

fn labels_input_filter(labels: Vec<String>) -> String {
    labels_input(&labels)
}

pub fn add_filters(env: &mut Environment<'static>) {
    env.add_filter("markdown", markdown_filter);
    env.add_filter("preview", preview);
    env.add_filter("labels_input", labels_input_filter);
    env.add_filter("date", format_date);
}
