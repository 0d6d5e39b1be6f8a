//! Default HTML→Markdown rendering for elements no rule claims.
//!
//! Output uses the same constructs the changelog formatter emits (ATX
//! headings, `-` bullets, `*`/`**` emphasis, fenced code) so Markdown written
//! in that style survives a round trip unchanged. Text is not escaped.

use scraper::ElementRef;

/// How an element participates in layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Block,
    Inline,
    Skip,
}

pub(crate) fn layout(name: &str) -> Layout {
    match name {
        "script" | "style" | "head" | "template" => Layout::Skip,
        "p" | "div" | "section" | "article" | "header" | "footer" | "main" | "aside" | "nav"
        | "figure" | "figcaption" | "details" | "summary" | "table" | "h1" | "h2" | "h3"
        | "h4" | "h5" | "h6" | "ul" | "ol" | "pre" | "blockquote" | "hr" => Layout::Block,
        _ => Layout::Inline,
    }
}

/// Renders `element` given the converted Markdown of its children.
///
/// Lists, code blocks and block quotes need their children in structured form
/// and are handled by the converter itself; this covers everything else.
pub(crate) fn render(element: &ElementRef<'_>, content: &str) -> String {
    let el = element.value();
    match el.name() {
        name @ ("h1" | "h2" | "h3" | "h4" | "h5" | "h6") => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            block(&format!("{} {}", "#".repeat(level), single_line(content)))
        }
        "hr" => block("---"),
        "br" => "  \n".to_string(),
        "strong" | "b" => wrap_inline(content, "**"),
        "em" | "i" => wrap_inline(content, "*"),
        "del" | "s" | "strike" => wrap_inline(content, "~~"),
        "code" => inline_code(&element.text().collect::<String>()),
        "a" => match el.attr("href") {
            Some(href) => match el.attr("title") {
                Some(title) => format!("[{content}]({href} \"{}\")", escape_title(title)),
                None => format!("[{content}]({href})"),
            },
            None => content.to_string(),
        },
        "img" => {
            let alt = el.attr("alt").unwrap_or_default();
            match el.attr("src") {
                Some(src) => format!("![{alt}]({src})"),
                None => String::new(),
            }
        }
        name if layout(name) == Layout::Block => block(content),
        _ => content.to_string(),
    }
}

/// Surrounds block content with blank lines; empty blocks vanish.
pub(crate) fn block(content: &str) -> String {
    let content = content.trim_matches('\n');
    if content.trim().is_empty() {
        return String::new();
    }
    format!("\n\n{content}\n\n")
}

/// Renders a fenced code block. The fence grows past any backtick run in the code.
pub(crate) fn code_block(code: &str, language: Option<&str>) -> String {
    let fence = "`".repeat(longest_backtick_run(code).max(2) + 1);
    let newline = if code.ends_with('\n') { "" } else { "\n" };
    format!(
        "\n\n{fence}{}\n{code}{newline}{fence}\n\n",
        language.unwrap_or_default()
    )
}

/// Prefixes every line with `> `.
pub(crate) fn block_quote(content: &str) -> String {
    let quoted = tidy(content)
        .lines()
        .map(|line| {
            if line.is_empty() {
                ">".to_string()
            } else {
                format!("> {line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    block(&quoted)
}

/// Renders one list item, indenting continuation lines under the marker.
pub(crate) fn list_item(marker: &str, content: &str) -> String {
    let indent = " ".repeat(marker.len());
    let mut out = String::from(marker);
    for (i, line) in tidy(content).lines().enumerate() {
        if i > 0 {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
    out
}

/// Collapses runs of blank lines to one and trims surrounding whitespace.
pub(crate) fn tidy(markdown: &str) -> String {
    let mut out = String::with_capacity(markdown.len());
    let mut newlines = 0;
    for ch in markdown.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines <= 2 {
                out.push(ch);
            }
        } else {
            newlines = 0;
            out.push(ch);
        }
    }
    out.trim().to_string()
}

fn wrap_inline(content: &str, marker: &str) -> String {
    if content.trim().is_empty() {
        return content.to_string();
    }
    format!("{marker}{content}{marker}")
}

fn inline_code(code: &str) -> String {
    if code.is_empty() {
        return String::new();
    }
    let fence = "`".repeat(longest_backtick_run(code) + 1);
    let pad = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };
    format!("{fence}{pad}{code}{pad}{fence}")
}

fn escape_title(title: &str) -> String {
    title.replace('\\', "\\\\").replace('"', "\\\"")
}

fn single_line(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn longest_backtick_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
