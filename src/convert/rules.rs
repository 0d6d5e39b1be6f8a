//! Conversion rules for annotated blocks.
//!
//! A rule claims an HTML element and renders it in place of the fallback
//! converter. Rules are tried in registration order and the first match wins.

use scraper::ElementRef;

/// Class marking a block as a breaking change.
pub const BREAKING_CLASS: &str = "changelog-breaking";

/// Class marking a block as a new feature.
pub const FEATURE_CLASS: &str = "changelog-feature";

/// A match/render pair applied to elements during conversion.
pub trait ConversionRule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Returns true if this rule should render `element`.
    fn matches(&self, element: &ElementRef<'_>) -> bool;

    /// Renders a matched element. `content` is the already-converted Markdown
    /// of the element's children, trimmed. Block output should be surrounded
    /// by blank lines.
    fn render(&self, content: &str, element: &ElementRef<'_>) -> String;
}

/// Rewrites elements carrying a CSS class into a GitBook `hint` callout.
#[derive(Debug, Clone)]
pub struct CalloutRule {
    name: String,
    class: String,
    style: String,
    label: String,
}

impl CalloutRule {
    pub fn new(
        class: impl Into<String>,
        style: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        let class = class.into();
        Self {
            name: format!("callout:{class}"),
            class,
            style: style.into(),
            label: label.into(),
        }
    }

    /// `changelog-breaking` blocks become danger callouts.
    pub fn breaking() -> Self {
        Self::new(BREAKING_CLASS, "danger", "💥 **Breaking Change**")
    }

    /// `changelog-feature` blocks become success callouts.
    pub fn feature() -> Self {
        Self::new(FEATURE_CLASS, "success", "✨ **New Feature**")
    }
}

impl ConversionRule for CalloutRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, element: &ElementRef<'_>) -> bool {
        element.value().classes().any(|class| class == self.class)
    }

    fn render(&self, content: &str, _element: &ElementRef<'_>) -> String {
        format!(
            "\n\n{{% hint style=\"{}\" %}}\n{}\n\n{}\n{{% endhint %}}\n\n",
            self.style, self.label, content
        )
    }
}
