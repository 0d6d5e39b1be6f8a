//! Markdown rendering of changelog pages.
//!
//! Produces GitBook-flavoured Markdown: release notes use `{% hint %}` callouts
//! and the summary page groups versions into `{% tabs %}` by year. The output
//! is later passed through [`crate::convert::Converter`] before upload.

use chrono::NaiveDate;

use super::{ChangelogDataset, ChangelogVersion};

/// Number of versions listed under "Latest Releases" on the summary page.
pub const LATEST_RELEASES: usize = 5;

/// Renders the page for a single version.
///
/// Sections appear in a fixed order: title, release date, breaking changes
/// callout, new features, bug fixes, improvements. Empty sections are omitted
/// and items keep their input order.
pub fn format_version(version: &ChangelogVersion) -> String {
    let mut content = format!("# Changelog - {}\n\n", version.version);
    content.push_str(&format!("**Release Date:** {}\n\n", version.date));

    if !version.breaking.is_empty() {
        content.push_str("{% hint style=\"danger\" %}\n");
        content.push_str("💥 **Breaking Changes**\n\n");
        push_items(&mut content, &version.breaking);
        content.push_str("\n{% endhint %}\n\n");
    }

    push_section(&mut content, "✨ New Features", &version.features);
    push_section(&mut content, "🐛 Bug Fixes", &version.fixes);
    push_section(&mut content, "🔧 Improvements", &version.improvements);

    content
}

/// Renders the summary page.
///
/// The first [`LATEST_RELEASES`] versions in dataset order are listed with
/// their highlights, followed by a tab per year (in order of first appearance)
/// linking to every version released that year. `today` is printed as the
/// last-updated date.
pub fn format_summary(dataset: &ChangelogDataset, today: NaiveDate) -> String {
    let mut content = String::from("# Changelog\n\n");
    content.push_str(&format!("Last updated: {}\n\n", today.format("%Y-%m-%d")));

    content.push_str("## Latest Releases\n\n");
    for version in dataset.versions.iter().take(LATEST_RELEASES) {
        content.push_str(&format!("### {}\n\n", version_link(version)));
        content.push_str(&format!("*Released: {}*\n\n", version.date));

        if !version.highlights.is_empty() {
            content.push_str("**Highlights:**\n\n");
            push_items(&mut content, &version.highlights);
            content.push('\n');
        }
    }

    content.push_str("## All Versions\n\n");
    content.push_str("{% tabs %}\n\n");
    for year in dataset.years() {
        content.push_str(&format!("{{% tab title=\"{year}\" %}}\n\n"));
        for version in dataset
            .versions
            .iter()
            .filter(|v| v.date.starts_with(year))
        {
            content.push_str(&format!("- {} - {}\n", version_link(version), version.date));
        }
        content.push_str("\n{% endtab %}\n\n");
    }
    content.push_str("{% endtabs %}\n");

    content
}

fn version_link(version: &ChangelogVersion) -> String {
    format!("[{}](./changelog-{})", version.version, version.slug())
}

fn push_section(content: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    content.push_str(&format!("## {title}\n\n"));
    push_items(content, items);
    content.push('\n');
}

fn push_items(content: &mut String, items: &[String]) {
    for item in items {
        content.push_str(&format!("- {item}\n"));
    }
}
