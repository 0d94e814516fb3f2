use er_templates::{MessageKind, results_message};

use crate::adapter::PostCard;

/// Rendering side of the blog listing.
///
/// The card list and a single status slot (skeleton, error, empty or end)
/// are independent: showing a status replaces whatever status was shown,
/// and every call is idempotent.
pub trait ResultsView {
    /// Replace the list. An empty list must show the empty state instead.
    fn render_initial(&mut self, cards: &[PostCard]);
    fn append_posts(&mut self, cards: &[PostCard]);
    fn show_skeleton(&mut self, markup: &str);
    fn hide_skeleton(&mut self);
    fn show_error(&mut self, message: &str);
    fn show_empty(&mut self, message: &str);
    fn show_end_message(&mut self, message: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    None,
    Skeleton(String),
    Error(String),
    Empty(String),
    End(String),
}

impl Status {
    pub fn to_html(&self) -> String {
        match self {
            Status::None => String::new(),
            Status::Skeleton(markup) => markup.clone(),
            Status::Error(text) => results_message(MessageKind::Error, text),
            Status::Empty(text) => results_message(MessageKind::Empty, text),
            Status::End(text) => results_message(MessageKind::End, text),
        }
    }
}

/// In-memory results view. The browser view keeps one to know what it shows.
#[derive(Debug, Clone)]
pub struct ResultsModel {
    cards: Vec<PostCard>,
    status: Status,
    empty_message: String,
}

impl ResultsModel {
    pub fn new(empty_message: &str) -> Self {
        Self {
            cards: Vec::new(),
            status: Status::None,
            empty_message: empty_message.to_owned(),
        }
    }

    pub fn cards(&self) -> &[PostCard] {
        &self.cards
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="er-blog__results">"#);
        for card in &self.cards {
            html.push_str(&card.to_html());
        }
        html.push_str("</div>");
        html.push_str(&self.status.to_html());
        html
    }
}

impl ResultsView for ResultsModel {
    fn render_initial(&mut self, cards: &[PostCard]) {
        if cards.is_empty() {
            let message = self.empty_message.clone();
            self.show_empty(&message);
            return;
        }
        self.cards = cards.to_vec();
        self.status = Status::None;
    }

    fn append_posts(&mut self, cards: &[PostCard]) {
        self.cards.extend_from_slice(cards);
        if matches!(self.status, Status::Error(_) | Status::Skeleton(_)) {
            self.status = Status::None;
        }
    }

    fn show_skeleton(&mut self, markup: &str) {
        self.status = Status::Skeleton(markup.to_owned());
    }

    fn hide_skeleton(&mut self) {
        if matches!(self.status, Status::Skeleton(_)) {
            self.status = Status::None;
        }
    }

    fn show_error(&mut self, message: &str) {
        self.status = Status::Error(message.to_owned());
    }

    fn show_empty(&mut self, message: &str) {
        self.cards.clear();
        self.status = Status::Empty(message.to_owned());
    }

    fn show_end_message(&mut self, message: &str) {
        self.status = Status::End(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(id: u64) -> PostCard {
        PostCard {
            id,
            title: format!("Post {id}"),
            excerpt: String::new(),
            date: String::new(),
            link: format!("/p/{id}"),
            image_url: None,
            image_alt: String::new(),
        }
    }

    #[test]
    fn empty_initial_render_shows_empty_state() {
        let mut view = ResultsModel::new("Nothing here yet.");
        view.show_skeleton("<div>…</div>");
        view.render_initial(&[]);
        assert_eq!(view.status(), &Status::Empty("Nothing here yet.".into()));
        assert!(view.to_html().contains("er-blog__message--empty"));
    }

    #[test]
    fn statuses_replace_each_other() {
        let mut view = ResultsModel::new("");
        view.render_initial(&[card(1)]);
        view.show_error("Oops");
        view.show_end_message("The end");
        assert_eq!(view.status(), &Status::End("The end".into()));
        assert!(!view.to_html().contains("Oops"));

        view.hide_skeleton();
        assert_eq!(view.status(), &Status::End("The end".into()));

        view.append_posts(&[card(2)]);
        view.append_posts(&[]);
        assert_eq!(view.cards().len(), 2);
    }
}
