//! Interaction state machine shared by the select, multi-select and toggle.
//!
//! States are `Closed`, `Open` and `Searching` (open with a non-empty query).
//! Every operation returns the [`Effect`]s it produced; the owning control
//! turns them into state writes and events.

use er_api_types::SelectOption;
use er_reactive::Matcher;

use crate::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuState {
    Closed,
    Open,
    Searching,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Opened,
    Closed,
    Selected(SelectOption),
    Deselected(SelectOption),
    SelectionChanged { previous: Vec<String> },
    LimitReached { option: SelectOption, max: usize },
}

pub struct SelectMachine {
    mode: SelectMode,
    options: Vec<SelectOption>,
    selected: Vec<String>,
    max: Option<usize>,
    open: bool,
    query: String,
    filtered: Vec<usize>,
    highlighted: Option<usize>,
    matcher: Option<Matcher>,
}

/// Case-insensitive substring match over label, description and value.
pub fn default_match(option: &SelectOption, query: &str) -> bool {
    let needle = query.to_lowercase();
    option.label.to_lowercase().contains(&needle)
        || option.value.to_lowercase().contains(&needle)
        || option
            .description
            .as_deref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
}

impl SelectMachine {
    pub fn new(mode: SelectMode) -> Self {
        Self {
            mode,
            options: Vec::new(),
            selected: Vec::new(),
            max: None,
            open: false,
            query: String::new(),
            filtered: Vec::new(),
            highlighted: None,
            matcher: None,
        }
    }

    pub fn mode(&self) -> SelectMode {
        self.mode
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn state(&self) -> MenuState {
        match (self.open, self.query.is_empty()) {
            (false, _) => MenuState::Closed,
            (true, true) => MenuState::Open,
            (true, false) => MenuState::Searching,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Indexes into [`SelectMachine::options`] that pass the current query.
    pub fn filtered(&self) -> &[usize] {
        &self.filtered
    }

    /// Position within [`SelectMachine::filtered`].
    pub fn highlighted(&self) -> Option<usize> {
        self.highlighted
    }

    pub fn highlighted_option(&self) -> Option<&SelectOption> {
        let idx = *self.filtered.get(self.highlighted?)?;
        self.options.get(idx)
    }

    pub fn max(&self) -> Option<usize> {
        self.max
    }

    /// Zero means unlimited.
    pub fn set_max(&mut self, max: usize) {
        self.max = (max > 0).then_some(max);
    }

    pub fn set_matcher(&mut self, matcher: Option<Matcher>) {
        self.matcher = matcher;
        self.refilter();
    }

    pub fn set_options(&mut self, options: Vec<SelectOption>) {
        self.options = options;
        self.refilter();
    }

    /// Replace the selection with the value currently held by the owner.
    pub fn set_selection(&mut self, values: Vec<String>) {
        self.selected = match self.mode {
            SelectMode::Single => values.into_iter().take(1).collect(),
            SelectMode::Multi => values,
        };
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.selected.iter().any(|v| v == value)
    }

    /// Recompute the filtered projection and clamp the highlight to it.
    pub fn refilter(&mut self) {
        let query = self.query.trim();
        self.filtered = if query.is_empty() {
            (0..self.options.len()).collect()
        } else {
            self.options
                .iter()
                .enumerate()
                .filter(|(_, opt)| match &self.matcher {
                    Some(matcher) => matcher(opt, query),
                    None => default_match(opt, query),
                })
                .map(|(idx, _)| idx)
                .collect()
        };
        self.highlighted = match (self.highlighted, self.filtered.len()) {
            (_, 0) => None,
            (Some(h), len) => Some(h.min(len - 1)),
            (None, _) if self.open => Some(0),
            (None, _) => None,
        };
    }

    pub fn open(&mut self) -> Vec<Effect> {
        if self.open {
            return Vec::new();
        }
        self.open = true;
        self.query.clear();
        self.highlighted = None;
        self.refilter();
        let first_selected = self.filtered.iter().position(|&idx| {
            self.options
                .get(idx)
                .is_some_and(|o| self.is_selected(&o.value))
        });
        if let Some(pos) = first_selected {
            self.highlighted = Some(pos);
        }
        vec![Effect::Opened]
    }

    pub fn close(&mut self) -> Vec<Effect> {
        if !self.open {
            return Vec::new();
        }
        self.open = false;
        self.query.clear();
        self.highlighted = None;
        self.refilter();
        vec![Effect::Closed]
    }

    pub fn toggle_open(&mut self) -> Vec<Effect> {
        if self.open { self.close() } else { self.open() }
    }

    pub fn outside_pointer_down(&mut self) -> Vec<Effect> {
        self.close()
    }

    /// Text typed into the embedded filter field. Opens the menu if needed.
    pub fn set_query(&mut self, query: &str) -> Vec<Effect> {
        let effects = self.open();
        self.query = query.to_owned();
        self.refilter();
        if self.highlighted.is_none() && !self.filtered.is_empty() {
            self.highlighted = Some(0);
        }
        effects
    }

    pub fn key(&mut self, key: Key) -> Vec<Effect> {
        if !self.open {
            return match key {
                Key::Enter | Key::Space | Key::ArrowDown | Key::ArrowUp => self.open(),
                _ => Vec::new(),
            };
        }

        match key {
            Key::ArrowDown => {
                self.move_highlight(1);
                Vec::new()
            }
            Key::ArrowUp => {
                self.move_highlight(-1);
                Vec::new()
            }
            Key::Home => {
                self.highlight(0);
                Vec::new()
            }
            Key::End => {
                self.highlight(self.filtered.len().saturating_sub(1));
                Vec::new()
            }
            Key::Enter => self.commit_highlighted(),
            // A space typed while searching belongs to the query.
            Key::Space if self.query.is_empty() => self.commit_highlighted(),
            Key::Escape | Key::Tab => self.close(),
            _ => Vec::new(),
        }
    }

    /// Circular move through the filtered list.
    pub fn move_highlight(&mut self, delta: isize) {
        let len = self.filtered.len();
        if len == 0 {
            self.highlighted = None;
            return;
        }
        let next = match self.highlighted {
            Some(current) => (current as isize + delta).rem_euclid(len as isize) as usize,
            None if delta < 0 => len - 1,
            None => 0,
        };
        self.highlighted = Some(next);
    }

    pub fn highlight(&mut self, position: usize) {
        self.highlighted = (position < self.filtered.len()).then_some(position);
    }

    pub fn commit_highlighted(&mut self) -> Vec<Effect> {
        match self.highlighted_option() {
            Some(option) => {
                let value = option.value.clone();
                self.choose(&value)
            }
            None => Vec::new(),
        }
    }

    /// Pick an option: replaces and closes in single mode, toggles in multi mode.
    pub fn choose(&mut self, value: &str) -> Vec<Effect> {
        let Some(option) = self.option(value).cloned() else {
            return Vec::new();
        };
        if option.disabled {
            return Vec::new();
        }

        match self.mode {
            SelectMode::Multi => self.toggle(option),
            SelectMode::Single => {
                let mut effects = Vec::new();
                if self.selected != [option.value.as_str()] {
                    let previous = std::mem::replace(&mut self.selected, vec![option.value.clone()]);
                    effects.push(Effect::Selected(option));
                    effects.push(Effect::SelectionChanged { previous });
                }
                effects.extend(self.close());
                effects
            }
        }
    }

    fn toggle(&mut self, option: SelectOption) -> Vec<Effect> {
        let previous = self.selected.clone();
        if self.is_selected(&option.value) {
            self.selected.retain(|v| *v != option.value);
            return vec![Effect::Deselected(option), Effect::SelectionChanged { previous }];
        }
        if let Some(max) = self.max.filter(|&max| self.selected.len() >= max) {
            return vec![Effect::LimitReached { option, max }];
        }
        self.selected.push(option.value.clone());
        vec![Effect::Selected(option), Effect::SelectionChanged { previous }]
    }

    /// Toggle every visible, enabled option.
    ///
    /// When all of them are already selected they are all removed. Otherwise
    /// the missing ones are added in display order, truncated to the remaining
    /// capacity rather than rejected. Truncation reports the first option left
    /// out as [`Effect::LimitReached`].
    pub fn select_all(&mut self) -> Vec<Effect> {
        if self.mode != SelectMode::Multi {
            return Vec::new();
        }
        let visible: Vec<String> = self
            .filtered
            .iter()
            .filter_map(|&idx| self.options.get(idx))
            .filter(|o| !o.disabled)
            .map(|o| o.value.clone())
            .collect();
        if visible.is_empty() {
            return Vec::new();
        }

        let previous = self.selected.clone();
        let mut limit = None;
        if visible.iter().all(|v| self.is_selected(v)) {
            self.selected.retain(|v| !visible.contains(v));
        } else {
            let capacity = self
                .max
                .map(|max| max.saturating_sub(self.selected.len()))
                .unwrap_or(usize::MAX);
            let mut missing: Vec<String> = visible.into_iter().filter(|v| !previous.contains(v)).collect();
            if missing.len() > capacity {
                let dropped = missing.split_off(capacity);
                limit = self
                    .max
                    .zip(dropped.first().and_then(|v| self.option(v)).cloned())
                    .map(|(max, option)| Effect::LimitReached { option, max });
            }
            self.selected.extend(missing);
        }

        let mut effects = Vec::new();
        if self.selected != previous {
            effects.push(Effect::SelectionChanged { previous });
        }
        effects.extend(limit);
        effects
    }

    pub fn remove(&mut self, value: &str) -> Vec<Effect> {
        if !self.is_selected(value) {
            return Vec::new();
        }
        let previous = self.selected.clone();
        self.selected.retain(|v| v != value);
        let option = self
            .option(value)
            .cloned()
            .unwrap_or_else(|| SelectOption::new(value, value));
        vec![Effect::Deselected(option), Effect::SelectionChanged { previous }]
    }

    /// Remove the chip showing `label`. Resolves to the first option with that label.
    pub fn remove_chip(&mut self, label: &str) -> Vec<Effect> {
        let value = self
            .options
            .iter()
            .find(|o| o.label == label)
            .map(|o| o.value.clone())
            .unwrap_or_else(|| label.to_owned());
        self.remove(&value)
    }

    fn option(&self, value: &str) -> Option<&SelectOption> {
        self.options.iter().find(|o| o.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    fn catalog() -> Vec<SelectOption> {
        vec![
            SelectOption::new("tv", "Television"),
            SelectOption {
                description: Some("Portable tape player".into()),
                ..SelectOption::new("walkman", "Walkman")
            },
            SelectOption::new("radio", "Radio"),
            SelectOption {
                disabled: true,
                ..SelectOption::new("vcr", "VCR")
            },
        ]
    }

    fn machine(mode: SelectMode) -> SelectMachine {
        let mut m = SelectMachine::new(mode);
        m.set_options(catalog());
        m
    }

    #[test]
    fn opening_highlights_current_value() {
        let mut m = machine(SelectMode::Single);
        m.set_selection(vec!["radio".into()]);
        assert_eq!(m.key(Key::ArrowDown), vec![Effect::Opened]);
        assert_eq!(m.state(), MenuState::Open);
        assert_eq!(m.highlighted(), Some(2));
        assert_eq!(m.filtered(), &[0, 1, 2, 3]);
    }

    #[test]
    fn search_filters_case_insensitively_and_clamps_highlight() {
        let mut m = machine(SelectMode::Single);
        m.open();
        m.highlight(3);
        m.set_query("TAPE");
        assert_eq!(m.state(), MenuState::Searching);
        assert_eq!(m.filtered(), &[1]);
        assert_eq!(m.highlighted(), Some(0));

        m.set_query("zzz");
        assert!(m.filtered().is_empty());
        assert_eq!(m.highlighted(), None);
        assert!(m.commit_highlighted().is_empty());
    }

    #[test]
    fn override_matcher_replaces_substring_match() {
        let mut m = machine(SelectMode::Single);
        m.set_matcher(Some(Rc::new(|o: &SelectOption, q: &str| o.value.starts_with(q))));
        m.set_query("r");
        assert_eq!(m.filtered(), &[2]);
    }

    #[test]
    fn arrows_wrap_around() {
        let mut m = machine(SelectMode::Single);
        m.open();
        m.key(Key::ArrowUp);
        assert_eq!(m.highlighted(), Some(3));
        m.key(Key::ArrowDown);
        assert_eq!(m.highlighted(), Some(0));
    }

    #[test]
    fn single_commit_replaces_and_closes() {
        let mut m = machine(SelectMode::Single);
        m.set_selection(vec!["tv".into()]);
        m.open();
        m.key(Key::ArrowDown);
        let effects = m.key(Key::Enter);
        assert_eq!(
            effects,
            vec![
                Effect::Selected(catalog()[1].clone()),
                Effect::SelectionChanged { previous: vec!["tv".into()] },
                Effect::Closed,
            ]
        );
        assert_eq!(m.selected(), &["walkman"]);
        assert!(!m.is_open());
    }

    #[test]
    fn disabled_options_cannot_be_chosen() {
        let mut m = machine(SelectMode::Single);
        assert!(m.choose("vcr").is_empty());
        assert!(m.selected().is_empty());
    }

    #[test]
    fn space_while_searching_is_text() {
        let mut m = machine(SelectMode::Single);
        m.set_query("walk");
        assert!(m.key(Key::Space).is_empty());
        assert!(m.is_open());
    }

    #[test]
    fn multi_toggle_stays_open_and_enforces_max() {
        let mut m = machine(SelectMode::Multi);
        m.set_max(2);
        m.open();
        m.choose("tv");
        m.choose("radio");
        assert!(m.is_open());

        let effects = m.choose("walkman");
        assert_eq!(
            effects,
            vec![Effect::LimitReached { option: catalog()[1].clone(), max: 2 }]
        );
        assert_eq!(m.selected(), &["tv", "radio"]);
    }

    #[test]
    fn add_then_remove_restores_selection() {
        let mut m = machine(SelectMode::Multi);
        m.set_selection(vec!["radio".into()]);
        let before = m.selected().to_vec();
        m.choose("tv");
        m.choose("tv");
        assert_eq!(m.selected(), before.as_slice());
    }

    #[test]
    fn select_all_truncates_at_max_and_toggles_off() {
        let mut m = machine(SelectMode::Multi);
        m.set_max(2);
        m.set_selection(vec!["radio".into()]);
        m.open();
        let effects = m.select_all();
        assert_eq!(m.selected(), &["radio", "tv"]);
        assert_eq!(
            effects,
            vec![
                Effect::SelectionChanged { previous: vec!["radio".into()] },
                Effect::LimitReached { option: catalog()[1].clone(), max: 2 },
            ]
        );
        // Already full: nothing changes, the limit is still reported.
        m.set_selection(vec!["radio".into(), "tv".into()]);
        m.set_query("walk");
        assert_eq!(
            m.select_all(),
            vec![Effect::LimitReached { option: catalog()[1].clone(), max: 2 }]
        );

        let mut unlimited = machine(SelectMode::Multi);
        unlimited.open();
        unlimited.select_all();
        assert_eq!(unlimited.selected(), &["tv", "walkman", "radio"]);
        unlimited.select_all();
        assert!(unlimited.selected().is_empty());
    }

    #[test]
    fn select_all_only_touches_visible_options() {
        let mut m = machine(SelectMode::Multi);
        m.set_query("a");
        m.select_all();
        assert_eq!(m.selected(), &["walkman", "radio"]);
    }

    #[test]
    fn chip_removal_resolves_by_label() {
        let mut m = machine(SelectMode::Multi);
        m.set_selection(vec!["tv".into(), "radio".into()]);
        let effects = m.remove_chip("Radio");
        assert_eq!(effects.len(), 2);
        assert_eq!(m.selected(), &["tv"]);
        assert!(m.remove_chip("Radio").is_empty());
    }

    #[test]
    fn option_updates_reclamp_highlight() {
        let mut m = machine(SelectMode::Single);
        m.open();
        m.highlight(3);
        m.set_options(catalog().into_iter().take(2).collect());
        assert_eq!(m.highlighted(), Some(1));
    }
}
