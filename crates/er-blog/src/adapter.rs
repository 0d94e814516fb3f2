//! WordPress post objects to display cards.

use er_api_types::WpPost;
use er_templates::{CardView, post_card, strip_tags, truncate_words};
use tracing::warn;

const EXCERPT_WORDS: usize = 40;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostCard {
    pub id: u64,
    pub title: String,
    pub excerpt: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    pub link: String,
    pub image_url: Option<String>,
    pub image_alt: String,
}

impl PostCard {
    pub fn to_html(&self) -> String {
        post_card(&CardView {
            id: self.id,
            title: &self.title,
            excerpt: &self.excerpt,
            date: &self.date,
            link: &self.link,
            image_url: self.image_url.as_deref(),
            image_alt: &self.image_alt,
        })
    }
}

/// `None` unless `value` is an object with a numeric `id`.
pub fn post_to_card(value: &serde_json::Value) -> Option<PostCard> {
    if !value.is_object() {
        return None;
    }
    let post: WpPost = serde_json::from_value(value.clone()).ok()?;

    let mut excerpt = strip_tags(&post.excerpt.rendered);
    if excerpt.is_empty() {
        excerpt = truncate_words(&strip_tags(&post.content.rendered), EXCERPT_WORDS);
    }
    let media = post.featured_media();

    Some(PostCard {
        id: post.id,
        title: strip_tags(&post.title.rendered),
        excerpt,
        date: post.date.chars().take(10).collect(),
        link: post.link.clone(),
        image_url: media.map(|m| m.source_url.clone()),
        image_alt: media.map(|m| m.alt_text.clone()).unwrap_or_default(),
    })
}

/// Adapt a page, dropping entries that are not posts.
pub fn cards_from(posts: &[serde_json::Value]) -> Vec<PostCard> {
    posts
        .iter()
        .filter_map(|value| {
            let card = post_to_card(value);
            if card.is_none() {
                warn!("skipping malformed post entry");
            }
            card
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adapts_embedded_post() {
        let post = json!({
            "id": 42,
            "date": "2024-03-09T10:15:00",
            "link": "https://elkaretro.example/grundig",
            "title": { "rendered": "Grundig &amp; Telefunken" },
            "excerpt": { "rendered": "<p>Two <em>legends</em>.</p>" },
            "content": { "rendered": "<p>ignored</p>" },
            "_embedded": {
                "wp:featuredmedia": [{ "source_url": "/img/g.jpg", "alt_text": "Radio" }]
            }
        });
        let card = post_to_card(&post).expect("well-formed post");
        assert_eq!(card.title, "Grundig & Telefunken");
        assert_eq!(card.excerpt, "Two legends .");
        assert_eq!(card.date, "2024-03-09");
        assert_eq!(card.image_url.as_deref(), Some("/img/g.jpg"));
        assert!(card.to_html().contains(r#"data-post-id="42""#));
    }

    #[test]
    fn empty_excerpt_falls_back_to_content() {
        let words: Vec<String> = (1..=50).map(|n| format!("w{n}")).collect();
        let post = json!({
            "id": 1,
            "excerpt": { "rendered": "" },
            "content": { "rendered": format!("<p>{}</p>", words.join(" ")) }
        });
        let card = post_to_card(&post).expect("post");
        assert!(card.excerpt.starts_with("w1 w2"));
        assert!(card.excerpt.ends_with("w40…"));
        assert_eq!(card.image_url, None);
    }

    #[test]
    fn rejects_non_posts() {
        assert_eq!(post_to_card(&json!(null)), None);
        assert_eq!(post_to_card(&json!([1, 2])), None);
        assert_eq!(post_to_card(&json!({ "title": { "rendered": "no id" } })), None);
        assert_eq!(post_to_card(&json!({ "id": "7" })), None);
        assert_eq!(cards_from(&[json!({ "id": 3 }), json!("junk")]).len(), 1);
    }
}
