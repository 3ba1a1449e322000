//! Render assistant markdown as plain terminal text.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Flatten markdown into readable plain text.
///
/// Paragraphs and headings are separated by blank lines, list items get a
/// bullet or their number, and emphasis markers are dropped.
pub fn render_markdown(markdown: &str) -> String {
    let mut out = String::new();
    // One entry per open list: the next item number, or None for bullets.
    let mut lists: Vec<Option<u64>> = Vec::new();

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::List(start)) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                } else {
                    ensure_newline(&mut out);
                }
                lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                lists.pop();
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::Start(Tag::Item) => {
                ensure_newline(&mut out);
                let depth = lists.len().saturating_sub(1);
                out.push_str(&"  ".repeat(depth));
                match lists.last_mut() {
                    Some(Some(n)) => {
                        out.push_str(&format!("{n}. "));
                        *n += 1;
                    }
                    _ => out.push_str("- "),
                }
            }
            Event::End(TagEnd::Item) => ensure_newline(&mut out),
            Event::Start(Tag::Paragraph | Tag::Heading { .. } | Tag::CodeBlock(_)) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::End(TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::CodeBlock) => {
                if lists.is_empty() {
                    ensure_blank_line(&mut out);
                }
            }
            Event::Text(text) | Event::Code(text) => out.push_str(&text),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak | Event::Rule => out.push('\n'),
            _ => {}
        }
    }

    out.trim().to_string()
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    ensure_newline(out);
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        assert_eq!(render_markdown("Just **one** step."), "Just one step.");
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let rendered = render_markdown("## Steps\n\nFirst, square `3`.\nThen add.\n\nDone.");
        assert_eq!(rendered, "Steps\n\nFirst, square 3. Then add.\n\nDone.");
    }

    #[test]
    fn test_lists() {
        let rendered = render_markdown("Steps:\n\n1. Compute *2^3*\n2. Result is 8\n\n- note");
        assert_eq!(rendered, "Steps:\n\n1. Compute 2^3\n2. Result is 8\n\n- note");
    }
}
