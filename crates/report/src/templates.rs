use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use minijinja::{AutoEscape, Environment, default_auto_escape_callback, path_loader};
use minijinja_autoreload::AutoReloader;
use num_format::{Locale, ToFormattedString};

pub type Templates = Arc<AutoReloader>;

pub fn create(template_path: impl Into<String>) -> Templates {
    let template_path = template_path.into();
    Arc::new(AutoReloader::new(move |notifier| {
        let mut env = Environment::new();
        let template_path = template_path.as_str();
        notifier.watch_path(template_path, true);
        env.set_loader(path_loader(template_path));
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_auto_escape_callback(|name| {
            if name.ends_with(".svg") { AutoEscape::Html } else { default_auto_escape_callback(name) }
        });
        env.add_filter("date", date);
        env.add_filter("timeago", timeago);
        env.add_filter("number", number);
        env.add_filter("health", health_description);
        env.add_filter("truncate", truncate);
        Ok(env)
    }))
}

pub fn render<S>(templates: &Templates, template_name: &str, context: S) -> Result<String>
where S: serde::Serialize {
    let env = templates.acquire_env().context("Failed to get template environment")?;
    let template = env.get_template(template_name).context("Failed to get template")?;
    template.render(context).context("Failed to render template")
}

fn parse(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value).ok().map(|value| value.with_timezone(&Utc))
}

fn timeago(value: String) -> String {
    let Some(value) = parse(&value) else {
        return format!("[invalid {}]", value);
    };
    timeago::Formatter::new().convert_chrono(value, Utc::now())
}

fn date(value: String, format: Option<String>) -> String {
    let Some(value) = parse(&value) else {
        return format!("[invalid {}]", value);
    };
    let format = format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S UTC");
    let mut out = String::new();
    // chrono reports bad format strings through fmt::Error
    if std::fmt::write(&mut out, format_args!("{}", value.format(format))).is_err() {
        return format!("[invalid format {}]", format);
    }
    out
}

/// Integer with thousands separators.
pub fn number(value: i64) -> String { value.to_formatted_string(&Locale::en) }

/// Shorten text to at most `length` characters, ending in "..." when cut.
fn truncate(value: String, length: Option<usize>) -> String {
    const END: &str = "...";
    let length = length.unwrap_or(255);
    if value.chars().count() <= length {
        return value;
    }
    let keep = length.saturating_sub(END.len());
    let mut out: String = value.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(END);
    out
}

/// Qualitative label for an overall health score.
pub fn health_description(score: u32) -> &'static str {
    match score {
        90.. => "Excellent",
        80..=89 => "Very good",
        70..=79 => "Good",
        60..=69 => "Fair",
        _ => "Needs improvement",
    }
}
