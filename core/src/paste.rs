//! Reindenting pasted text.
//!
//! The first pasted line inherits whatever precedes the caret and is left
//! alone. Every following line is stripped of its leading whitespace,
//! replayed through a copy of the engine positioned at the insertion
//! point, and emitted with the indent the engine prescribes once the
//! line's content has been consumed. Line endings are normalized to the
//! configured EOL marker throughout.

use crate::cache::CachedIndentEngine;
use crate::config::EmptyLineFormatting;

/// Reformat `text` as if pasted into `doc` at character offset `offset`.
pub fn format_plain_text(
    cache: &mut CachedIndentEngine,
    doc: &str,
    offset: usize,
    text: &str,
) -> String {
    cache.update(doc, offset);
    let config = cache.config().clone();
    let (lines, trailing_eol) = split_lines(text);

    if !cache.state().is_code() {
        // Pasting into a string, comment or directive: only normalize EOLs
        return join_lines(lines.iter().map(|l| l.to_string()), trailing_eol, &config.eol_marker);
    }

    let mut engine = cache.engine().clone();
    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            engine.push_str(line);
            out.push((*line).to_string());
            continue;
        }
        engine.push('\n');
        if engine.state().is_verbatim() {
            // Leading whitespace is literal string content here
            engine.push_str(line);
            out.push((*line).to_string());
            continue;
        }
        let stripped = line.trim_start();
        if stripped.is_empty() {
            let indent_blank = config.empty_line_formatting == EmptyLineFormatting::Indent
                || config.indent_blank_lines;
            out.push(if indent_blank {
                engine.next_line_indent()
            } else {
                String::new()
            });
            continue;
        }
        engine.push_str(stripped);
        out.push(format!("{}{}", engine.this_line_indent(), stripped));
    }
    join_lines(out.into_iter(), trailing_eol, &config.eol_marker)
}

fn join_lines(lines: impl Iterator<Item = String>, trailing_eol: bool, eol: &str) -> String {
    let mut result = lines.collect::<Vec<_>>().join(eol);
    if trailing_eol {
        result.push_str(eol);
    }
    result
}

/// Split on `\n`, `\r\n` and `\r` without keeping the terminators. The
/// flag reports whether the text ended with a line terminator.
fn split_lines(text: &str) -> (Vec<&str>, bool) {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut iter = text.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
        match c {
            '\n' => {
                lines.push(&text[start..i]);
                start = i + 1;
            }
            '\r' => {
                lines.push(&text[start..i]);
                start = i + 1;
                if let Some(&(j, '\n')) = iter.peek() {
                    iter.next();
                    start = j + 1;
                }
            }
            _ => {}
        }
    }
    if start < text.len() {
        lines.push(&text[start..]);
        (lines, false)
    } else {
        (lines, !text.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::split_lines;

    #[test]
    fn test_split_lines() {
        assert_eq!(split_lines("a\nb"), (vec!["a", "b"], false));
        assert_eq!(split_lines("a\r\nb\r"), (vec!["a", "b"], true));
        assert_eq!(split_lines("a\n"), (vec!["a"], true));
        assert_eq!(split_lines(""), (vec![], false));
        assert_eq!(split_lines("a\n\nb"), (vec!["a", "", "b"], false));
    }
}
