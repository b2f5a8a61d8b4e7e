#![forbid(unsafe_code)]

//! Content-layer record shapes consumed by the navigation core.
//!
//! The content layer (fetching, caching, rendering) is an external
//! collaborator; these are the already-shaped records it hands over. The
//! navigation core treats them as opaque apart from `tags` (feeding the tag
//! filter) and the cover fields the hover store aggregates.

use serde::{Deserialize, Serialize};

/// Display scale of a cover image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageScale {
    Large,
    Medium,
    Small,
}

impl Default for ImageScale {
    fn default() -> Self {
        ImageScale::Medium
    }
}

/// Cover asset attached to an article.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cover {
    pub url: String,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub scale: Option<ImageScale>,
}

/// One article as shaped by the content layer.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover: Option<Cover>,
    /// Article-level scale override; falls back to the cover's own scale.
    #[serde(default)]
    pub scale: Option<ImageScale>,
}

/// One issue: a titled, colored collection of articles.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub url: String,
    /// Accent color carried into `NavState::issue_color` when this issue is
    /// active.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub articles: Vec<Article>,
}

/// All distinct tags across every article of every issue: trimmed, non-empty,
/// deduplicated, sorted.
#[must_use]
pub fn unique_tags(issues: &[Issue]) -> Vec<String> {
    let mut tags: Vec<String> = issues
        .iter()
        .flat_map(|issue| issue.articles.iter())
        .flat_map(|article| article.tags.iter())
        .map(|tag| tag.trim())
        .filter(|tag| !tag.is_empty())
        .map(str::to_owned)
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn article_with_tags(tags: &[&str]) -> Article {
        Article {
            id: "a1".into(),
            title: "A title".into(),
            slug: "a-title".into(),
            tags: tags.iter().map(|t| (*t).to_owned()).collect(),
            ..Article::default()
        }
    }

    #[test]
    fn unique_tags_trims_dedups_and_sorts() {
        let issues = vec![
            Issue {
                articles: vec![
                    article_with_tags(&["poetry", " essays "]),
                    article_with_tags(&["fiction", ""]),
                ],
                ..Issue::default()
            },
            Issue {
                articles: vec![article_with_tags(&["essays", "  ", "poetry"])],
                ..Issue::default()
            },
        ];
        assert_eq!(unique_tags(&issues), vec!["essays", "fiction", "poetry"]);
    }

    #[test]
    fn unique_tags_empty_input() {
        assert!(unique_tags(&[]).is_empty());
        let issues = vec![Issue::default()];
        assert!(unique_tags(&issues).is_empty());
    }

    #[test]
    fn article_deserializes_from_content_layer_json() {
        let json = r#"{
            "id": "art-9",
            "title": "Thresholds",
            "slug": "thresholds",
            "author": "M. Ellery",
            "tags": ["poetry"],
            "cover": { "url": "/media/thresholds.jpg", "alt": "Doorway", "scale": "large" }
        }"#;
        let article: Article = serde_json::from_str(json).expect("valid article");
        assert_eq!(article.id, "art-9");
        let cover = article.cover.expect("cover present");
        assert_eq!(cover.scale, Some(ImageScale::Large));
        assert_eq!(cover.alt.as_deref(), Some("Doorway"));
    }

    #[test]
    fn issue_defaults_optional_fields() {
        let json = r#"{ "id": "i1", "title": "Issue One", "slug": "issue-one" }"#;
        let issue: Issue = serde_json::from_str(json).expect("valid issue");
        assert!(issue.articles.is_empty());
        assert!(issue.color.is_empty());
    }
}
