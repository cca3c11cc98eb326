//! Parser for prompt-table files.
//!
//! The top-level entry points are [`parse_str`] and [`parse_file`].
//!
//! ```text
//! # answer the optional project prompt, then watch the build
//! step "project-setup" once 30s
//! respond "Would you like to automatically create an EAS project" "y"
//! log timeout
//! step "build" repeat
//! log "Waiting for build"
//! stop "Build failed" failure
//! stop "Build finished"
//! ```

use crate::directive::{TableBuilder, TableDirective};
use crate::directives::{Log, Respond, Step, Stop};
use crate::pattern::Pattern;
use crate::table::PromptTable;
use anyhow::{Context as _, Result, anyhow};
use std::path::Path;
use std::time::Duration;

/// Parse a prompt table from a string slice.
///
/// Lines that are empty or start with `#` are ignored. Inline comments (` # …`)
/// are stripped while preserving `#` characters inside quoted strings.
///
/// # Errors
///
/// Returns an error naming the line if it holds an unknown directive, a
/// malformed argument, an unclosed quoted string, or a rule before the first
/// `step`. Returns an error if the finished table fails validation.
///
/// # Example
///
/// ```
/// use guided_build::parse_str;
///
/// let table = parse_str("step \"build\" repeat\nstop \"Build finished\"\n").unwrap();
/// assert_eq!(table.steps().len(), 1);
/// ```
pub fn parse_str(content: &str) -> Result<PromptTable> {
    let mut builder = TableBuilder::new();
    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = strip_inline_comment(line);
        parse_line(line)
            .and_then(|directive| {
                directive
                    .apply(&mut builder)
                    .with_context(|| format!("Cannot apply '{}'", directive.name()))
            })
            .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
    }
    builder.finish()
}

/// Parse a prompt table from a file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or if the table is malformed.
pub fn parse_file(path: impl AsRef<Path>) -> Result<PromptTable> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
    parse_str(&content).with_context(|| format!("Invalid prompt file: {}", path.display()))
}

type ParseFn = fn(&str) -> Result<Box<dyn TableDirective>>;

static REGISTRY: &[(&str, ParseFn)] = &[
    (Step::NAME, Step::parse_boxed),
    (Respond::NAME, Respond::parse_boxed),
    (Log::NAME, Log::parse_boxed),
    (Stop::NAME, Stop::parse_boxed),
];

/// Dispatch a single non-empty, non-comment line to the matching directive's parser.
fn parse_line(line: &str) -> Result<Box<dyn TableDirective>> {
    let (name, args) = line.split_once(' ').unwrap_or((line, ""));
    REGISTRY
        .iter()
        .find(|(directive, _)| *directive == name)
        .map(|(_, parse)| parse(args))
        .unwrap_or_else(|| Err(anyhow!("Unknown directive: {}", line)))
}

/// Strip inline comments from a line, preserving `#` inside quoted strings.
fn strip_inline_comment(line: &str) -> &str {
    let mut in_quotes = false;
    let mut escaped = false;
    for (i, ch) in line.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if ch == '\\' {
            escaped = true;
            continue;
        }
        if ch == '"' {
            in_quotes = !in_quotes;
            continue;
        }
        if ch == '#' && !in_quotes {
            return line[..i].trim();
        }
    }
    line
}

/// Parse a duration string: `1s`, `500ms`, `1.5s`.
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();
    if let Some(ms_str) = s.strip_suffix("ms") {
        let ms: u64 = ms_str
            .trim()
            .parse()
            .context("Invalid milliseconds value")?;
        Ok(Duration::from_millis(ms))
    } else if let Some(s_str) = s.strip_suffix('s') {
        let secs: f64 = s_str.trim().parse().context("Invalid seconds value")?;
        Duration::try_from_secs_f64(secs).context("Invalid seconds value")
    } else {
        Err(anyhow!("Duration must end with 's' or 'ms', got: {}", s))
    }
}

/// Parse exactly one double-quoted string, processing `\n`, `\t`, `\"`, and `\\`.
pub(crate) fn parse_quoted_string(s: &str) -> Result<String> {
    let (text, rest) = split_quoted(s)?;
    if !rest.is_empty() {
        return Err(anyhow!("Unexpected text after quoted string: {rest}"));
    }
    Ok(text)
}

/// Split a leading double-quoted string off `args`.
///
/// Returns the unescaped string and the trimmed remainder.
pub(crate) fn split_quoted(args: &str) -> Result<(String, &str)> {
    let args = args.trim();
    let Some(body) = args.strip_prefix('"') else {
        return Err(anyhow!("Expected string to start with '\"'"));
    };

    let mut text = String::new();
    let mut escaped = false;
    for (i, ch) in body.char_indices() {
        if escaped {
            match ch {
                'n' => text.push('\n'),
                't' => text.push('\t'),
                '"' | '\\' => text.push(ch),
                other => {
                    text.push('\\');
                    text.push(other);
                }
            }
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '"' => return Ok((text, body[i + 1..].trim())),
            _ => text.push(ch),
        }
    }
    Err(anyhow!("Expected string to end with '\"'"))
}

/// Parse what a rule waits for: a quoted literal, `eof`, or `timeout`.
///
/// Returns the pattern and the trimmed remainder of the line.
pub(crate) fn parse_target(args: &str) -> Result<(Pattern, &str)> {
    let args = args.trim();
    if args.starts_with('"') {
        let (literal, rest) = split_quoted(args)?;
        if literal.is_empty() {
            return Err(anyhow!("Pattern must not be empty"));
        }
        return Ok((Pattern::Literal(literal), rest));
    }
    let (word, rest) = args.split_once(' ').unwrap_or((args, ""));
    let pattern = match word {
        "eof" => Pattern::Eof,
        "timeout" => Pattern::Timeout,
        "" => return Err(anyhow!("Missing pattern")),
        other => {
            return Err(anyhow!(
                "Pattern must be a quoted string, 'eof' or 'timeout', got: {other}"
            ));
        }
    };
    Ok((pattern, rest.trim()))
}
