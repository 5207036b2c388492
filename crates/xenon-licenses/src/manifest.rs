//! Manifest records and license expression handling.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

/// Separator between authors in the manifest's `authors` field.
pub const AUTHOR_SEPARATOR: char = '|';

/// Separator between alternatives in a license expression.
pub const LICENSE_ALTERNATIVE: &str = " OR ";

/// One manifest entry as written on disk. Unknown fields are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct ManifestEntry {
    pub(crate) name: String,
    pub(crate) version: String,
    pub(crate) authors: String,
    #[serde(default)]
    pub(crate) description: Option<String>,
    #[serde(default)]
    pub(crate) repository: Option<String>,
    #[serde(default)]
    pub(crate) license: Option<Value>,
}

/// A dependency with the license identifiers that have bundled texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLicenseInfo {
    /// Package name.
    pub name: String,
    /// Package version.
    pub version: String,
    /// Authors in manifest order.
    pub authors: Vec<String>,
    /// Short description, when the manifest has one.
    pub description: Option<String>,
    /// Source repository, when the manifest has one.
    pub repository: Option<String>,
    /// Identifiers with a bundled text; `None` when no license was declared.
    pub licenses: Option<BTreeSet<String>>,
}

impl DependencyLicenseInfo {
    /// Authors joined for display, for example `"Alice, Bob"`.
    #[must_use]
    pub fn authors_display(&self) -> String {
        self.authors.join(", ")
    }

    /// Whether at least one license text is available.
    #[must_use]
    pub fn has_licenses(&self) -> bool {
        self.licenses.as_ref().is_some_and(|set| !set.is_empty())
    }
}

impl ManifestEntry {
    /// Builds the display record, keeping only identifiers accepted by
    /// `has_text`.
    pub(crate) fn resolve(self, has_text: impl Fn(&str) -> bool) -> DependencyLicenseInfo {
        let licenses = self.license.map(|value| match value {
            Value::String(expression) => split_expression(&expression)
                .filter(|id| has_text(id))
                .map(str::to_owned)
                .collect(),
            // A license field of any other shape declares nothing usable.
            _ => BTreeSet::new(),
        });
        DependencyLicenseInfo {
            name: self.name,
            version: self.version,
            authors: split_authors(&self.authors),
            description: self.description,
            repository: self.repository,
            licenses,
        }
    }
}

/// Identifiers of an `A OR B OR C` expression, trimmed, empties skipped.
pub(crate) fn split_expression(expression: &str) -> impl Iterator<Item = &str> {
    expression
        .split(LICENSE_ALTERNATIVE)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

fn split_authors(authors: &str) -> Vec<String> {
    authors
        .split(AUTHOR_SEPARATOR)
        .map(str::trim)
        .filter(|author| !author.is_empty())
        .map(str::to_owned)
        .collect()
}
