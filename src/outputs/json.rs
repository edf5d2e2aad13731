//! JSON rendering for scripting.

use crate::error::Result;
use serde::Serialize;
use serde_json::json;

/// Pretty-printed JSON for stdout.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Settings as a flat object keyed like the preference file.
pub fn settings_json(country: &str, language: &str, dark_mode: bool) -> Result<String> {
    to_json(&json!({
        "preferred_country": country,
        "preferred_language": language,
        "dark_mode_enabled": dark_mode,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookmarkedArticle;

    #[test]
    fn test_bookmarks_json_uses_wire_names() {
        let list = vec![BookmarkedArticle {
            title: "t".to_string(),
            url: "https://a".to_string(),
            image_url: Some("https://a.png".to_string()),
            source: None,
        }];
        let out = to_json(&list).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value[0]["imageUrl"], "https://a.png");
    }

    #[test]
    fn test_settings_json() {
        let out = settings_json("us", "en", false).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["preferred_country"], "us");
        assert_eq!(value["dark_mode_enabled"], false);
    }
}
