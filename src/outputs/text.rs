//! Plain-text rendering.

use crate::dates::format_published_at;
use crate::models::{Article, BookmarkedArticle, COUNTRIES, Category, LANGUAGES};
use std::fmt::Write;

fn display_name<'a>(table: &'a [(&'a str, &'a str)], code: &str) -> &'a str {
    table
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, name)| *name)
        .unwrap_or("unknown")
}

/// One block per article: title, source and date, bookmark marker, url.
pub fn render_articles(articles: &[Article], bookmarked: &[BookmarkedArticle]) -> String {
    if articles.is_empty() {
        return "No articles.\n".to_string();
    }
    let mut out = String::new();
    for (i, article) in articles.iter().enumerate() {
        let url = article.url.as_deref().unwrap_or("");
        let marker = if !url.is_empty() && bookmarked.iter().any(|b| b.url == url) {
            " [saved]"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "{:>2}. {}{}",
            i + 1,
            article.title.as_deref().unwrap_or("No Title"),
            marker
        );
        let _ = writeln!(
            out,
            "    {} · {}",
            article.source_name().unwrap_or("Unknown source"),
            format_published_at(article.published_at.as_deref())
        );
        if !url.is_empty() {
            let _ = writeln!(out, "    {url}");
        }
    }
    out
}

/// Numbered bookmark list, or a hint line when empty.
pub fn render_bookmarks(bookmarks: &[BookmarkedArticle]) -> String {
    if bookmarks.is_empty() {
        return "No bookmarks yet.\n".to_string();
    }
    let mut out = String::new();
    for (i, b) in bookmarks.iter().enumerate() {
        let _ = writeln!(out, "{:>2}. {}", i + 1, b.title);
        if let Some(source) = &b.source {
            let _ = writeln!(out, "    {source}");
        }
        let _ = writeln!(out, "    {}", b.url);
    }
    out
}

pub fn render_settings(country: &str, language: &str, dark_mode: bool) -> String {
    format!(
        "country:   {country} ({})\nlanguage:  {language} ({})\ndark mode: {}\n",
        display_name(COUNTRIES, country),
        display_name(LANGUAGES, language),
        if dark_mode { "on" } else { "off" }
    )
}

/// Supported country and language codes with their names.
pub fn render_options() -> String {
    let mut out = String::from("Countries:\n");
    for (code, name) in COUNTRIES {
        let _ = writeln!(out, "  {code}  {name}");
    }
    out.push_str("Languages:\n");
    for (code, name) in LANGUAGES {
        let _ = writeln!(out, "  {code}  {name}");
    }
    out.push_str("Categories:\n");
    for category in Category::ALL {
        let _ = writeln!(out, "  {category}");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ArticleSource;

    #[test]
    fn test_render_articles_marks_bookmarks() {
        let articles = vec![
            Article {
                title: Some("Saved one".to_string()),
                url: Some("https://a".to_string()),
                source: Some(ArticleSource {
                    id: None,
                    name: Some("Wire".to_string()),
                }),
                published_at: Some("2025-05-06T12:00:00Z".to_string()),
                ..Default::default()
            },
            Article {
                title: None,
                url: None,
                ..Default::default()
            },
        ];
        let bookmarks = vec![BookmarkedArticle {
            title: "Saved one".to_string(),
            url: "https://a".to_string(),
            image_url: None,
            source: None,
        }];
        let out = render_articles(&articles, &bookmarks);
        assert!(out.contains(" 1. Saved one [saved]"));
        assert!(out.contains("Wire · May 6, 2025"));
        assert!(out.contains(" 2. No Title\n"));
        assert!(out.contains("Unknown source · Unknown date"));
    }

    #[test]
    fn test_empty_lists() {
        assert_eq!(render_articles(&[], &[]), "No articles.\n");
        assert_eq!(render_bookmarks(&[]), "No bookmarks yet.\n");
    }

    #[test]
    fn test_render_settings() {
        let out = render_settings("gb", "fr", true);
        assert!(out.contains("gb (United Kingdom)"));
        assert!(out.contains("fr (French)"));
        assert!(out.contains("dark mode: on"));
    }

    #[test]
    fn test_render_options_lists_categories() {
        let out = render_options();
        assert!(out.contains("  technology"));
        assert!(out.contains("  ud  Urdu"));
    }
}
