//! Python-style traceback and syntax error text.

use std::fmt::Write;

use crate::exception::{RaisedException, TraceFrame};
use crate::line_cache::LineCache;

/// Render `raised`, outermost frame first, ending with `summary`
/// (`"KeyError: 'x'"`). Source lines come from `cache`.
pub(crate) fn render_traceback(
    raised: &RaisedException,
    cache: &LineCache,
    summary: &str,
    cause_summary: Option<&str>,
) -> String {
    let mut out = String::new();
    if let (Some(cause), Some(cause_summary)) = (&raised.cause, cause_summary) {
        out.push_str(&render_traceback(cause, cache, cause_summary, None));
        out.push_str(
            "\nThe above exception was the direct cause of the following exception:\n\n",
        );
    }
    if !raised.traceback.is_empty() {
        out.push_str("Traceback (most recent call last):\n");
    }
    let mut previous: Option<&TraceFrame> = None;
    let mut repeats = 0usize;
    for frame in raised.traceback.iter().rev() {
        if previous == Some(frame) {
            repeats += 1;
            if repeats >= REPEAT_CUTOFF {
                continue;
            }
        } else {
            flush_repeats(&mut out, repeats);
            repeats = 0;
        }
        previous = Some(frame);
        let _ = writeln!(
            out,
            "  File \"{}\", line {}, in {}",
            frame.filename, frame.line, frame.name
        );
        if let Some(text) = cache.line(&frame.filename, frame.line) {
            let text = text.trim();
            if !text.is_empty() {
                let _ = writeln!(out, "    {text}");
            }
        }
    }
    flush_repeats(&mut out, repeats);
    out.push_str(summary);
    out.push('\n');
    out
}

/// Identical consecutive frames printed before the rest are collapsed.
const REPEAT_CUTOFF: usize = 3;

fn flush_repeats(out: &mut String, repeats: usize) {
    if repeats >= REPEAT_CUTOFF {
        let hidden = repeats - (REPEAT_CUTOFF - 1);
        let times = if hidden == 1 { "time" } else { "times" };
        let _ = writeln!(out, "  [Previous line repeated {hidden} more {times}]");
    }
}

/// Render a syntax error the way the interactive shell reports one.
///
/// `column` is 1-based in bytes; the caret lands under it once leading
/// whitespace is stripped from `source_line`.
pub fn render_syntax_error(
    filename: &str,
    line: u32,
    column: u32,
    source_line: Option<&str>,
    message: &str,
) -> String {
    let mut out = format!("  File \"{filename}\", line {line}\n");
    if let Some(text) = source_line {
        let text = text.trim_end_matches(['\r', '\n']);
        let trimmed = text.trim_start();
        let indent = text.len() - trimmed.len();
        if !trimmed.is_empty() {
            let offset = (column as usize).saturating_sub(1).saturating_sub(indent);
            let caret = trimmed
                .get(..offset.min(trimmed.len()))
                .map_or(0, |prefix| prefix.chars().count());
            let _ = writeln!(out, "    {trimmed}");
            let _ = writeln!(out, "    {}^", " ".repeat(caret));
        }
    }
    let _ = writeln!(out, "SyntaxError: {message}");
    out
}
