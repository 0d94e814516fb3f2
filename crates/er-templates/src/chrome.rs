use std::fmt::Write;

use crate::escape::{escape_attr, escape_html};

/// Wrap trusted registry SVG markup. An empty `label` hides the icon from assistive tech.
pub fn icon(svg: &str, label: &str, size: f64) -> String {
    let mut html = String::from(r#"<span class="er-icon""#);
    if size > 0.0 {
        let _ = write!(html, r#" style="width:{size}px;height:{size}px""#);
    }
    if label.is_empty() {
        html.push_str(r#" aria-hidden="true">"#);
    } else {
        let _ = write!(html, r#" role="img" aria-label="{}">"#, escape_attr(label));
    }
    html.push_str(svg);
    html.push_str("</span>");
    html
}

pub fn loading_overlay(active: bool, message: &str) -> String {
    if !active {
        return String::new();
    }
    let mut html = String::from(
        r#"<div class="er-loader" role="status" aria-live="polite"><span class="er-loader__spinner"></span>"#,
    );
    if !message.is_empty() {
        let _ = write!(
            html,
            r#"<span class="er-loader__message">{}</span>"#,
            escape_html(message)
        );
    }
    html.push_str("</div>");
    html
}

pub struct UserMenuView<'a> {
    pub open: bool,
    pub logged_in: bool,
    pub display_name: &'a str,
    pub avatar_url: &'a str,
    pub account_url: &'a str,
    pub logout_url: &'a str,
    pub login_url: &'a str,
}

pub fn user_menu(view: &UserMenuView<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="er-user-menu{}">"#,
        if view.open { " is-open" } else { "" }
    );

    if !view.logged_in {
        let _ = write!(
            html,
            r#"<a class="er-user-menu__login" href="{}">Log in</a></div>"#,
            escape_attr(view.login_url)
        );
        return html;
    }

    let _ = write!(
        html,
        r#"<button type="button" class="er-user-menu__trigger" aria-haspopup="menu" aria-expanded="{}">"#,
        view.open
    );
    if !view.avatar_url.is_empty() {
        let _ = write!(
            html,
            r#"<img class="er-user-menu__avatar" src="{}" alt="">"#,
            escape_attr(view.avatar_url)
        );
    }
    let _ = write!(
        html,
        r#"<span class="er-user-menu__name">{}</span></button>"#,
        escape_html(view.display_name)
    );

    if view.open {
        html.push_str(r#"<ul class="er-user-menu__dropdown" role="menu">"#);
        if !view.account_url.is_empty() {
            let _ = write!(
                html,
                r#"<li role="none"><a role="menuitem" href="{}">My account</a></li>"#,
                escape_attr(view.account_url)
            );
        }
        if !view.logout_url.is_empty() {
            let _ = write!(
                html,
                r#"<li role="none"><a role="menuitem" href="{}">Log out</a></li>"#,
                escape_attr(view.logout_url)
            );
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}
