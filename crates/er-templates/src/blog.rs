use std::fmt::Write;

use crate::escape::{escape_attr, escape_html};

/// Display-ready post fields. Text is plain (already stripped), not HTML.
pub struct CardView<'a> {
    pub id: u64,
    pub title: &'a str,
    pub excerpt: &'a str,
    pub date: &'a str,
    pub link: &'a str,
    pub image_url: Option<&'a str>,
    pub image_alt: &'a str,
}

pub fn post_card(card: &CardView<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<article class="er-post-card" data-post-id="{}"><a class="er-post-card__link" href="{}">"#,
        card.id,
        escape_attr(card.link)
    );
    if let Some(src) = card.image_url {
        let _ = write!(
            html,
            r#"<img class="er-post-card__image" src="{}" alt="{}" loading="lazy">"#,
            escape_attr(src),
            escape_attr(card.image_alt)
        );
    }
    let _ = write!(
        html,
        r#"<h3 class="er-post-card__title">{}</h3>"#,
        escape_html(card.title)
    );
    if !card.date.is_empty() {
        let _ = write!(
            html,
            r#"<time class="er-post-card__date" datetime="{0}">{0}</time>"#,
            escape_attr(card.date)
        );
    }
    if !card.excerpt.is_empty() {
        let _ = write!(
            html,
            r#"<p class="er-post-card__excerpt">{}</p>"#,
            escape_html(card.excerpt)
        );
    }
    html.push_str("</a></article>");
    html
}

/// Placeholder cards shown while the first page loads.
pub fn skeleton(count: usize) -> String {
    let mut html = String::from(r#"<div class="er-blog__skeleton" aria-hidden="true">"#);
    for _ in 0..count {
        html.push_str(
            r#"<div class="er-post-card er-post-card--skeleton"><div class="er-skeleton er-skeleton--image"></div><div class="er-skeleton er-skeleton--title"></div><div class="er-skeleton er-skeleton--text"></div></div>"#,
        );
    }
    html.push_str("</div>");
    html
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Error,
    Empty,
    End,
}

pub fn results_message(kind: MessageKind, text: &str) -> String {
    let (class, role) = match kind {
        MessageKind::Error => ("er-blog__message er-blog__message--error", r#" role="alert""#),
        MessageKind::Empty => ("er-blog__message er-blog__message--empty", ""),
        MessageKind::End => ("er-blog__message er-blog__message--end", ""),
    };
    format!(r#"<p class="{class}"{role}>{}</p>"#, escape_html(text))
}
