use ratatui::{prelude::*, widgets::*};

use crate::viewer::{ContentFormat, RenderedContent};

/// Renders a text input field
pub fn render_input<'a>(content: &'a str, title: &'a str, is_focused: bool) -> Paragraph<'a> {
    let style = if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(style)
        .title(title);

    Paragraph::new(content).block(block)
}

/// Border style for a list panel
pub fn panel_border(is_focused: bool) -> Style {
    if is_focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    }
}

/// Highlight lines of a previewed file by its format
pub fn highlight_content(rendered: &RenderedContent) -> Vec<Line<'static>> {
    match rendered.format {
        ContentFormat::Json if rendered.parse_error.is_none() => highlight_json(&rendered.text),
        ContentFormat::Yaml if rendered.parse_error.is_none() => highlight_yaml(&rendered.text),
        _ => rendered
            .text
            .lines()
            .map(|l| Line::from(l.to_string()))
            .collect(),
    }
}

/// Simple JSON syntax highlighting
pub fn highlight_json(text: &str) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    for line in text.lines() {
        let mut spans = Vec::new();
        let mut current = String::new();
        let mut in_string = false;
        let mut is_key = false;
        let mut escaped = false;

        for (idx, c) in line.char_indices() {
            if in_string {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == '"' {
                    // End of string
                    let color = if is_key { Color::Cyan } else { Color::Green };
                    spans.push(Span::styled(current.clone(), Style::default().fg(color)));
                    current.clear();
                    in_string = false;
                    is_key = false;
                }
                continue;
            }

            match c {
                '"' => {
                    if !current.is_empty() {
                        spans.push(Span::raw(current.clone()));
                        current.clear();
                    }
                    in_string = true;
                    current.push(c);
                    // A key is a string followed by ':'
                    is_key = closing_quote(&line[idx + 1..])
                        .map(|end| line[idx + 1 + end + 1..].trim_start().starts_with(':'))
                        .unwrap_or(false);
                }
                ':' | ',' => {
                    flush_scalar(&mut spans, &mut current);
                    spans.push(Span::styled(c.to_string(), Style::default().fg(Color::White)));
                }
                '{' | '}' | '[' | ']' => {
                    flush_scalar(&mut spans, &mut current);
                    spans.push(Span::styled(
                        c.to_string(),
                        Style::default().fg(Color::Yellow),
                    ));
                }
                _ => current.push(c),
            }
        }

        flush_scalar(&mut spans, &mut current);
        lines.push(Line::from(spans));
    }

    lines
}

/// Keys cyan, comments grey, everything else as-is
pub fn highlight_yaml(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| {
            let trimmed = line.trim_start();
            if trimmed.starts_with('#') {
                return Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            match line.find(": ").or_else(|| line.strip_suffix(':').map(|s| s.len())) {
                Some(split) if !trimmed.starts_with('"') => {
                    let (key, rest) = line.split_at(split);
                    let mut spans = vec![Span::styled(
                        key.to_string(),
                        Style::default().fg(Color::Cyan),
                    )];
                    let value = rest.trim_start_matches(':');
                    spans.push(Span::styled(":", Style::default().fg(Color::White)));
                    let mut value = value.to_string();
                    flush_scalar(&mut spans, &mut value);
                    Line::from(spans)
                }
                _ => Line::from(line.to_string()),
            }
        })
        .collect()
}

/// Byte offset of the first unescaped `"`
fn closing_quote(rest: &str) -> Option<usize> {
    let mut escaped = false;
    for (i, c) in rest.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(i),
            _ => {}
        }
    }
    None
}

/// Push a pending unquoted token, colored by kind
fn flush_scalar(spans: &mut Vec<Span<'static>>, current: &mut String) {
    if current.is_empty() {
        return;
    }
    let token = std::mem::take(current);
    let word = token.trim();
    let style = if word == "true" || word == "false" || word == "null" {
        Style::default().fg(Color::Magenta)
    } else if !word.is_empty() && word.parse::<f64>().is_ok() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    spans.push(Span::styled(token, style));
}

/// Completion gauge color
pub fn completion_color(percentage: f64) -> Color {
    match percentage {
        p if p >= 100.0 => Color::Green,
        p if p >= 50.0 => Color::Cyan,
        p if p > 0.0 => Color::Yellow,
        _ => Color::DarkGray,
    }
}

/// Checkbox prefix for a task
pub fn checkbox(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_json_highlight_keeps_text() {
        let source = "{\n  \"name\": \"Launch\",\n  \"done\": true,\n  \"count\": 3\n}";
        let lines = highlight_json(source);
        let rebuilt: Vec<String> = lines.iter().map(text).collect();
        assert_eq!(rebuilt.join("\n"), source);

        let key = &lines[1].spans[1];
        assert_eq!(key.content, "\"name\"");
        assert_eq!(key.style.fg, Some(Color::Cyan));
    }

    #[test]
    fn test_json_escaped_quote_stays_in_string() {
        let source = r#"  "quote\"d": "say \"hi\"","#;
        let lines = highlight_json(source);
        assert_eq!(text(&lines[0]), source);

        let spans = &lines[0].spans;
        assert_eq!(spans[1].content, r#""quote\"d""#);
        assert_eq!(spans[1].style.fg, Some(Color::Cyan));
        assert_eq!(spans[4].content, r#""say \"hi\"""#);
        assert_eq!(spans[4].style.fg, Some(Color::Green));
    }

    #[test]
    fn test_yaml_highlight_colors_keys() {
        let lines = highlight_yaml("name: Launch\n# note\ntasks:");
        assert_eq!(lines[0].spans[0].content, "name");
        assert_eq!(lines[0].spans[0].style.fg, Some(Color::Cyan));
        assert_eq!(text(&lines[0]), "name: Launch");
        assert_eq!(lines[1].spans[0].style.fg, Some(Color::DarkGray));
        assert_eq!(text(&lines[2]), "tasks:");
    }

    #[test]
    fn test_completion_color_thresholds() {
        assert_eq!(completion_color(0.0), Color::DarkGray);
        assert_eq!(completion_color(42.0), Color::Yellow);
        assert_eq!(completion_color(50.0), Color::Cyan);
        assert_eq!(completion_color(100.0), Color::Green);
    }
}
