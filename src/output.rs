//! @ai:module:intent Render error bags and raised errors as text or JSON, or emit them as log events
//! @ai:module:layer infrastructure
//! @ai:module:public_api OutputFormat, format_stack, format_pool, format_throwable, to_json, log_stack, log_pool, log_throwable
//! @ai:module:depends_on stack, pool, throwable, config
//! @ai:module:stateless true

use crate::config::ReportConfig;
use crate::item::ErrorItem;
use crate::pool::ErrorPool;
use crate::stack::ErrorStack;
use crate::throwable::ThrowableError;
use colored::{ColoredString, Colorize};
use serde::{Deserialize, Serialize};

/// @ai:intent Output format options
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    JsonPretty,
}

/// @ai:intent Format a stack of errors as a string
/// @ai:effects pure
pub fn format_stack(stack: &ErrorStack, config: &ReportConfig) -> String {
    match config.format {
        OutputFormat::Json => to_json(stack, false),
        OutputFormat::JsonPretty => to_json(stack, true),
        OutputFormat::Text => format_stack_text(stack, config),
    }
}

/// @ai:intent Format a pool of errors as a string
/// @ai:effects pure
pub fn format_pool(pool: &ErrorPool, config: &ReportConfig) -> String {
    match config.format {
        OutputFormat::Json => to_json(pool, false),
        OutputFormat::JsonPretty => to_json(pool, true),
        OutputFormat::Text => format_pool_text(pool, config),
    }
}

/// @ai:intent Format a raised error with its location and full cause chain
/// @ai:effects pure
pub fn format_throwable(err: &ThrowableError, config: &ReportConfig) -> String {
    match config.format {
        OutputFormat::Json => to_json(&err.report(), false),
        OutputFormat::JsonPretty => to_json(&err.report(), true),
        OutputFormat::Text => format_throwable_text(err, config),
    }
}

/// @ai:intent Format any serializable value as JSON
/// @ai:effects pure
pub fn to_json<T: Serialize>(value: &T, pretty: bool) -> String {
    if pretty {
        serde_json::to_string_pretty(value).unwrap_or_default()
    } else {
        serde_json::to_string(value).unwrap_or_default()
    }
}

/// Applies `style` only when color output is enabled.
fn paint(text: &str, color: bool, style: fn(ColoredString) -> ColoredString) -> String {
    if color {
        style(text.normal()).to_string()
    } else {
        text.to_string()
    }
}

fn push_item(output: &mut String, item: &ErrorItem, indent: &str, config: &ReportConfig) {
    output.push_str(&format!(
        "{}{} {}",
        indent,
        paint("ERROR", config.color, |s| s.red().bold()),
        item.message()
    ));
    if let Some(code) = item.code() {
        output.push_str(&format!(
            " ({})",
            paint(&code.to_string(), config.color, |s| s.dimmed())
        ));
    }
    output.push('\n');

    if config.show_data {
        if let Some(data) = item.data() {
            output.push_str(&format!(
                "{}  {} {}\n",
                indent,
                paint("data:", config.color, |s| s.cyan()),
                to_json(data, false)
            ));
        }
    }

    if !item.tags().is_empty() {
        output.push_str(&format!(
            "{}  {} {}\n",
            indent,
            paint("tags:", config.color, |s| s.cyan()),
            item.tags().join(", ")
        ));
    }
}

fn push_summary(
    output: &mut String,
    count: usize,
    subjects: Option<usize>,
    config: &ReportConfig,
) {
    output.push('\n');
    if count == 0 {
        output.push_str(&format!(
            "{} No errors collected\n",
            paint("OK", config.color, |s| s.green().bold())
        ));
        return;
    }

    let errors = plural(count, "error");
    let count = paint(&count.to_string(), config.color, |s| s.red().bold());
    match subjects {
        Some(subjects) => output.push_str(&format!(
            "{} {} in {} {}\n",
            count,
            errors,
            subjects,
            plural(subjects, "subject")
        )),
        None => output.push_str(&format!("{} {} collected\n", count, errors)),
    }
}

/// `word` for a count of one, `word` + "s" otherwise.
pub(crate) fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

/// @ai:intent Format a stack as human-readable text
/// @ai:effects pure
fn format_stack_text(stack: &ErrorStack, config: &ReportConfig) -> String {
    let mut output = String::new();

    for item in stack {
        push_item(&mut output, item, "", config);
    }

    push_summary(&mut output, stack.len(), None, config);
    output
}

/// @ai:intent Format a pool as human-readable text, one section per subject
/// @ai:effects pure
fn format_pool_text(pool: &ErrorPool, config: &ReportConfig) -> String {
    let mut output = String::new();
    let mut subjects = 0;

    for (key, stack) in pool {
        if stack.is_empty() {
            continue;
        }
        subjects += 1;

        output.push_str(&format!("{}:\n", paint(key, config.color, |s| s.bold())));
        for item in stack {
            push_item(&mut output, item, "  ", config);
        }
    }

    push_summary(&mut output, pool.len(), Some(subjects), config);
    output
}

/// @ai:intent Format a raised error as human-readable text
/// @ai:effects pure
fn format_throwable_text(err: &ThrowableError, config: &ReportConfig) -> String {
    let report = err.report();
    let mut output = String::new();

    output.push_str(&format!(
        "{} {} ({})\n",
        paint("ERROR", config.color, |s| s.red().bold()),
        report.message,
        paint(&format!("code {}", report.code), config.color, |s| s.dimmed())
    ));
    output.push_str(&format!(
        "  {} {}\n",
        paint("at", config.color, |s| s.dimmed()),
        report.location
    ));

    if config.show_data {
        if let Some(data) = &report.data {
            output.push_str(&format!(
                "  {} {}\n",
                paint("data:", config.color, |s| s.cyan()),
                to_json(data, false)
            ));
        }
    }

    for cause in &report.causes {
        output.push_str(&format!(
            "{} {}",
            paint("caused by:", config.color, |s| s.yellow()),
            cause.message
        ));
        if let Some(code) = cause.code {
            output.push_str(&format!(" (code {})", code));
        }
        output.push('\n');
        if let Some(location) = &cause.location {
            output.push_str(&format!(
                "  {} {}\n",
                paint("at", config.color, |s| s.dimmed()),
                location
            ));
        }
    }

    output
}

/// @ai:intent Emit one warning event per collected item
/// @ai:effects log
pub fn log_stack(stack: &ErrorStack) {
    for item in stack {
        log_item(None, item);
    }
}

/// @ai:intent Emit one warning event per collected item, tagged with its subject
/// @ai:effects log
pub fn log_pool(pool: &ErrorPool) {
    for (subject, item) in pool.items() {
        log_item(Some(subject), item);
    }
}

fn log_item(subject: Option<&str>, item: &ErrorItem) {
    let code = item.code().map(|c| c.to_string()).unwrap_or_default();
    let data = item.data().map(|d| to_json(d, false)).unwrap_or_default();

    match subject {
        Some(subject) => tracing::warn!(
            subject = subject,
            code = %code,
            data = %data,
            "{}",
            item.message()
        ),
        None => tracing::warn!(code = %code, data = %data, "{}", item.message()),
    }
}

/// @ai:intent Emit an error event for a raised error, then one per cause
/// @ai:effects log
pub fn log_throwable(err: &ThrowableError) {
    let report = err.report();

    tracing::error!(
        code = report.code,
        location = %report.location,
        "{}",
        report.message
    );
    for cause in &report.causes {
        tracing::error!(
            location = %cause.location.as_deref().unwrap_or("-"),
            "caused by: {}",
            cause.message
        );
    }
}
