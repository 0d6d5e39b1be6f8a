//! Markdown → GitBook Markdown conversion.
//!
//! Documents are rendered to HTML with pulldown-cmark (raw HTML passes
//! through), parsed with scraper and walked back into Markdown. Each element is
//! offered to the registered [`ConversionRule`]s in order; the first rule that
//! matches renders it and no further rules are consulted. Elements no rule
//! claims go to the fallback renderer.
//!
//! Authors mark blocks for callouts with a class:
//!
//! ```
//! use changelog_sync::convert::Converter;
//!
//! let source = "<div class=\"changelog-breaking\">\n\nThe `v1` API is gone.\n\n</div>";
//! let converted = Converter::gitbook().convert(source);
//!
//! assert_eq!(
//!     converted,
//!     "{% hint style=\"danger\" %}\n💥 **Breaking Change**\n\nThe `v1` API is gone.\n{% endhint %}"
//! );
//! ```

use pulldown_cmark::{Options, Parser, html};
use scraper::{ElementRef, Html, Node};
use tracing::trace;

mod fallback;
pub mod rules;

pub use rules::{BREAKING_CLASS, CalloutRule, ConversionRule, FEATURE_CLASS};

use fallback::Layout;

/// Converts Markdown documents, applying registered rules before the fallback.
#[derive(Default)]
pub struct Converter {
    rules: Vec<Box<dyn ConversionRule>>,
}

impl Converter {
    /// A converter with no rules: only the fallback applies.
    pub fn new() -> Self {
        Self::default()
    }

    /// A converter with the breaking-change and new-feature callout rules.
    pub fn gitbook() -> Self {
        let mut converter = Self::new();
        converter.add_rule(CalloutRule::breaking());
        converter.add_rule(CalloutRule::feature());
        converter
    }

    /// Appends a rule. Earlier rules take precedence.
    pub fn add_rule(&mut self, rule: impl ConversionRule + 'static) -> &mut Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Names of the registered rules in evaluation order.
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    /// Converts a Markdown document.
    pub fn convert(&self, markdown: &str) -> String {
        let html = markdown_to_html(markdown);
        self.convert_html(&html)
    }

    /// Converts an HTML fragment.
    pub fn convert_html(&self, html: &str) -> String {
        let fragment = Html::parse_fragment(html);
        let content = self.children(fragment.root_element());
        fallback::tidy(&content)
    }

    fn children(&self, element: ElementRef<'_>) -> String {
        self.children_with(element, false)
    }

    /// Converts the children of `element`. With `tight`, nested lists are
    /// attached to the preceding line instead of standing as their own block.
    fn children_with(&self, element: ElementRef<'_>, tight: bool) -> String {
        let mut out = String::new();
        for child in element.children() {
            match child.value() {
                Node::Text(text) => {
                    let mut text: &str = text;
                    // A hard break already ends its line.
                    let after_break = child
                        .prev_sibling()
                        .and_then(ElementRef::wrap)
                        .is_some_and(|prev| prev.value().name() == "br");
                    if after_break {
                        text = text.strip_prefix('\n').unwrap_or(text);
                    }
                    if text.trim().is_empty() && text.contains('\n') {
                        // Whitespace between blocks is layout; between inline
                        // content it is a soft break.
                        let prev = child.prev_sibling().map(ElementRef::wrap);
                        let next = child.next_sibling().map(ElementRef::wrap);
                        if !(is_block_boundary(prev) && is_block_boundary(next)) {
                            out.push('\n');
                        }
                        continue;
                    }
                    out.push_str(text);
                }
                Node::Element(_) => {
                    let Some(child) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let name = child.value().name();
                    if tight && matches!(name, "ul" | "ol") && !self.claimed(&child) {
                        while out.ends_with('\n') {
                            out.pop();
                        }
                        out.push('\n');
                        out.push_str(&self.list_items(child));
                        out.push('\n');
                    } else {
                        out.push_str(&self.element(child));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn claimed(&self, element: &ElementRef<'_>) -> bool {
        self.rules.iter().any(|rule| rule.matches(element))
    }

    fn element(&self, element: ElementRef<'_>) -> String {
        let name = element.value().name();
        if fallback::layout(name) == Layout::Skip {
            return String::new();
        }

        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(&element)) {
            trace!(rule = rule.name(), element = name, "conversion rule matched");
            let content = fallback::tidy(&self.children(element));
            return rule.render(&content, &element);
        }

        match name {
            "pre" => self.code_block(element),
            "ul" | "ol" => self.list(element),
            "blockquote" => fallback::block_quote(&self.children(element)),
            _ => {
                let content = self.children(element);
                fallback::render(&element, &content)
            }
        }
    }

    fn code_block(&self, pre: ElementRef<'_>) -> String {
        let code = pre
            .children()
            .filter_map(ElementRef::wrap)
            .find(|child| child.value().name() == "code");

        let language = code.and_then(|code| {
            code.value()
                .classes()
                .find_map(|class| class.strip_prefix("language-"))
        });
        let text: String = match code {
            Some(code) => code.text().collect(),
            None => pre.text().collect(),
        };
        fallback::code_block(&text, language)
    }

    fn list(&self, list: ElementRef<'_>) -> String {
        fallback::block(&self.list_items(list))
    }

    /// Renders the items of `list`, one per line, without block padding.
    fn list_items(&self, list: ElementRef<'_>) -> String {
        let ordered = list.value().name() == "ol";
        let start = list
            .value()
            .attr("start")
            .and_then(|start| start.parse::<u64>().ok())
            .unwrap_or(1);

        let items: Vec<ElementRef<'_>> = list
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|child| child.value().name() == "li")
            .collect();
        // Items of a loose list wrap their text in paragraphs.
        let loose = items.iter().any(|item| {
            item.children()
                .filter_map(ElementRef::wrap)
                .any(|child| child.value().name() == "p")
        });

        let rendered: Vec<String> = items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                let marker = if ordered {
                    format!("{}. ", start + i as u64)
                } else {
                    "- ".to_string()
                };
                fallback::list_item(&marker, &self.children_with(item, !loose))
            })
            .collect();

        rendered.join(if loose { "\n\n" } else { "\n" })
    }
}

impl std::fmt::Debug for Converter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Converter")
            .field("rules", &self.rule_names())
            .finish()
    }
}

/// Whether a sibling of whitespace text ends inline flow. `None` is no
/// sibling at all; `Some(None)` is a sibling that is not an element.
fn is_block_boundary(sibling: Option<Option<ElementRef<'_>>>) -> bool {
    match sibling {
        None => true,
        Some(element) => {
            element.is_some_and(|el| fallback::layout(el.value().name()) != Layout::Inline)
        }
    }
}

/// Renders Markdown to HTML, passing raw HTML blocks through untouched.
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}
