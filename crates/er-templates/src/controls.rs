use std::fmt::Write;

use er_api_types::SelectOption;

use crate::escape::{escape_attr, escape_html};

pub struct TextInputView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub label: &'a str,
    pub value: &'a str,
    pub placeholder: &'a str,
    pub input_type: &'a str,
    pub required: bool,
    pub disabled: bool,
    pub max_length: Option<usize>,
    pub error: &'a str,
}

pub fn text_input(view: &TextInputView<'_>) -> String {
    let mut html = String::from(r#"<div class="er-text-input">"#);
    if !view.label.is_empty() {
        let _ = write!(
            html,
            r#"<label class="er-text-input__label" for="{}">{}{}</label>"#,
            escape_attr(view.id),
            escape_html(view.label),
            if view.required { r#"<span class="er-required">*</span>"# } else { "" },
        );
    }

    let input_type = if view.input_type.is_empty() { "text" } else { view.input_type };
    let _ = write!(
        html,
        r#"<input class="er-text-input__field" id="{}" name="{}" type="{}" value="{}" placeholder="{}""#,
        escape_attr(view.id),
        escape_attr(view.name),
        escape_attr(input_type),
        escape_attr(view.value),
        escape_attr(view.placeholder),
    );
    if let Some(max) = view.max_length {
        let _ = write!(html, r#" maxlength="{max}""#);
    }
    if view.required {
        html.push_str(" required");
    }
    if view.disabled {
        html.push_str(" disabled");
    }
    if !view.error.is_empty() {
        html.push_str(r#" aria-invalid="true""#);
    }
    html.push('>');

    if !view.error.is_empty() {
        let _ = write!(
            html,
            r#"<p class="er-text-input__error" role="alert">{}</p>"#,
            escape_html(view.error)
        );
    }
    html.push_str("</div>");
    html
}

pub struct SelectView<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub label: &'a str,
    pub placeholder: &'a str,
    pub options: &'a [SelectOption],
    /// Indexes into `options`, in display order.
    pub filtered: &'a [usize],
    pub selected: &'a [String],
    pub open: bool,
    pub query: &'a str,
    /// Position within `filtered`.
    pub highlighted: Option<usize>,
    pub searchable: bool,
    pub multiple: bool,
    pub disabled: bool,
    pub show_select_all: bool,
}

impl SelectView<'_> {
    fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|v| v == value)
    }

    fn label_for(&self, value: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.as_str())
    }
}

pub fn select(view: &SelectView<'_>) -> String {
    let mut html = String::new();
    let listbox_id = format!("{}-listbox", view.id);
    let _ = write!(
        html,
        r#"<div class="er-select{}{}">"#,
        if view.open { " is-open" } else { "" },
        if view.disabled { " is-disabled" } else { "" },
    );

    if !view.label.is_empty() {
        let _ = write!(
            html,
            r#"<span class="er-select__label" id="{}-label">{}</span>"#,
            escape_attr(view.id),
            escape_html(view.label)
        );
    }

    let active = view
        .highlighted
        .filter(|_| view.open)
        .map(|pos| format!(r#" aria-activedescendant="{}-opt-{}""#, escape_attr(view.id), pos))
        .unwrap_or_default();
    let _ = write!(
        html,
        r#"<button type="button" class="er-select__trigger" role="combobox" aria-haspopup="listbox" aria-controls="{}" aria-expanded="{}"{}{}>"#,
        escape_attr(&listbox_id),
        view.open,
        active,
        if view.disabled { " disabled" } else { "" },
    );

    if view.selected.is_empty() {
        let _ = write!(
            html,
            r#"<span class="er-select__placeholder">{}</span>"#,
            escape_html(view.placeholder)
        );
    } else if view.multiple {
        html.push_str(r#"<span class="er-select__chips">"#);
        for value in view.selected {
            let label = view.label_for(value).unwrap_or(value.as_str());
            let _ = write!(
                html,
                r#"<span class="er-chip" data-value="{}">{}<span class="er-chip__remove" data-remove="{}" aria-label="Remove">×</span></span>"#,
                escape_attr(value),
                escape_html(label),
                escape_attr(label),
            );
        }
        html.push_str("</span>");
    } else {
        let value = &view.selected[0];
        let _ = write!(
            html,
            r#"<span class="er-select__value">{}</span>"#,
            escape_html(view.label_for(value).unwrap_or(value.as_str()))
        );
    }
    html.push_str("</button>");

    if view.open {
        html.push_str(r#"<div class="er-select__dropdown">"#);
        if view.searchable {
            let _ = write!(
                html,
                r#"<input class="er-select__search" type="search" value="{}" aria-controls="{}" autocomplete="off">"#,
                escape_attr(view.query),
                escape_attr(&listbox_id),
            );
        }
        if view.multiple && view.show_select_all {
            html.push_str(r#"<button type="button" class="er-select__all">Select all</button>"#);
        }

        let _ = write!(
            html,
            r#"<ul class="er-select__options" role="listbox" id="{}"{}>"#,
            escape_attr(&listbox_id),
            if view.multiple { r#" aria-multiselectable="true""# } else { "" },
        );
        if view.filtered.is_empty() {
            html.push_str(r#"<li class="er-select__empty">No results</li>"#);
        }
        for (pos, &idx) in view.filtered.iter().enumerate() {
            let Some(option) = view.options.get(idx) else {
                continue;
            };
            let selected = view.is_selected(&option.value);
            let mut class = String::from("er-select__option");
            if view.highlighted == Some(pos) {
                class.push_str(" is-highlighted");
            }
            if selected {
                class.push_str(" is-selected");
            }
            let _ = write!(
                html,
                r#"<li class="{}" id="{}-opt-{}" role="option" data-value="{}" aria-selected="{}"{}><span class="er-select__option-label">{}</span>"#,
                class,
                escape_attr(view.id),
                pos,
                escape_attr(&option.value),
                selected,
                if option.disabled { r#" aria-disabled="true""# } else { "" },
                escape_html(&option.label),
            );
            if let Some(description) = option.description.as_deref().filter(|d| !d.is_empty()) {
                let _ = write!(
                    html,
                    r#"<span class="er-select__option-description">{}</span>"#,
                    escape_html(description)
                );
            }
            html.push_str("</li>");
        }
        html.push_str("</ul></div>");
    }

    if !view.name.is_empty() {
        let joined = view.selected.join(",");
        let _ = write!(
            html,
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape_attr(view.name),
            escape_attr(&joined)
        );
    }
    html.push_str("</div>");
    html
}

pub struct ToggleView<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub options: &'a [SelectOption],
    pub selected: &'a str,
    pub focused: Option<usize>,
    pub disabled: bool,
}

pub fn toggle(view: &ToggleView<'_>) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="er-toggle" role="radiogroup" aria-label="{}">"#,
        escape_attr(view.label)
    );
    for (idx, option) in view.options.iter().enumerate() {
        let checked = option.value == view.selected;
        let mut class = String::from("er-toggle__segment");
        if checked {
            class.push_str(" is-active");
        }
        if view.focused == Some(idx) {
            class.push_str(" is-focused");
        }
        let _ = write!(
            html,
            r#"<button type="button" class="{}" role="radio" aria-checked="{}" data-value="{}" tabindex="{}"{}>{}</button>"#,
            class,
            checked,
            escape_attr(&option.value),
            if checked { "0" } else { "-1" },
            if view.disabled || option.disabled { " disabled" } else { "" },
            escape_html(&option.label),
        );
    }
    if !view.name.is_empty() {
        let _ = write!(
            html,
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape_attr(view.name),
            escape_attr(view.selected)
        );
    }
    html.push_str("</div>");
    html
}

/// Wrapper markup around a slotted control.
pub fn form_field(label: &str, error: &str, required: bool) -> String {
    let mut html = String::from(r#"<div class="er-form-field">"#);
    if !label.is_empty() {
        let _ = write!(
            html,
            r#"<span class="er-form-field__label">{}{}</span>"#,
            escape_html(label),
            if required { r#"<span class="er-required">*</span>"# } else { "" },
        );
    }
    html.push_str(r#"<slot></slot>"#);
    if !error.is_empty() {
        let _ = write!(
            html,
            r#"<p class="er-form-field__error" role="alert">{}</p>"#,
            escape_html(error)
        );
    }
    html.push_str("</div>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> Vec<SelectOption> {
        vec![
            SelectOption::new("tv", "Television"),
            SelectOption {
                description: Some("<b>AM/FM</b>".into()),
                ..SelectOption::new("radio", "Radio & Tuner")
            },
        ]
    }

    #[test]
    fn text_input_escapes_value_and_shows_error() {
        let html = text_input(&TextInputView {
            id: "q",
            name: "q",
            label: "Search",
            value: r#""><script>"#,
            placeholder: "",
            input_type: "",
            required: true,
            disabled: false,
            max_length: Some(20),
            error: "Required",
        });
        assert!(html.contains(r#"value="&quot;&gt;&lt;script&gt;""#));
        assert!(html.contains(r#"maxlength="20""#));
        assert!(html.contains(r#"type="text""#));
        assert!(html.contains(r#"role="alert">Required</p>"#));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn open_select_renders_filtered_options_with_highlight() {
        let opts = options();
        let selected = vec!["radio".to_owned()];
        let html = select(&SelectView {
            id: "cat",
            name: "category",
            label: "Category",
            placeholder: "Choose",
            options: &opts,
            filtered: &[1],
            selected: &selected,
            open: true,
            query: "rad",
            highlighted: Some(0),
            searchable: true,
            multiple: false,
            disabled: false,
            show_select_all: false,
        });
        assert!(html.contains("is-open"));
        assert!(html.contains(r#"aria-activedescendant="cat-opt-0""#));
        assert!(html.contains("Radio &amp; Tuner"));
        assert!(html.contains("&lt;b&gt;AM/FM&lt;/b&gt;"));
        assert!(!html.contains("Television"));
        assert!(html.contains(r#"name="category" value="radio""#));
    }

    #[test]
    fn closed_multi_select_renders_chips() {
        let opts = options();
        let selected = vec!["tv".to_owned(), "radio".to_owned()];
        let html = select(&SelectView {
            id: "cat",
            name: "",
            label: "",
            placeholder: "Choose",
            options: &opts,
            filtered: &[0, 1],
            selected: &selected,
            open: false,
            query: "",
            highlighted: None,
            searchable: false,
            multiple: true,
            disabled: false,
            show_select_all: true,
        });
        assert!(html.contains(r#"data-remove="Television""#));
        assert!(html.contains(r#"data-remove="Radio &amp; Tuner""#));
        assert!(!html.contains("er-select__dropdown"));
    }

    #[test]
    fn toggle_marks_active_segment() {
        let opts = options();
        let html = toggle(&ToggleView {
            name: "kind",
            label: "Kind",
            options: &opts,
            selected: "tv",
            focused: Some(1),
            disabled: false,
        });
        assert!(html.contains(r#"class="er-toggle__segment is-active" role="radio" aria-checked="true" data-value="tv""#));
        assert!(html.contains(r#"class="er-toggle__segment is-focused""#));
    }
}
