//! Floating suggestion list bound to a text control.
//!
//! The widget never touches the bound input itself: selections are returned
//! to the caller, which decides what to write back.

use crate::node::Element;
use std::cmp::Ordering;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Upper bound on rendered suggestions.
pub const MAX_SUGGESTIONS: usize = 100;

/// Filters `candidates` by case-insensitive substring and orders them:
/// prefix matches first, then by character position of the first
/// occurrence, then alphabetically.
pub fn rank<'a, S: AsRef<str>>(query: &str, candidates: &'a [S]) -> Vec<&'a str> {
    let query = query.to_lowercase();

    let mut matches: Vec<(&str, bool, usize)> = candidates
        .iter()
        .map(AsRef::as_ref)
        .filter_map(|candidate| {
            let lowered = candidate.to_lowercase();
            let offset = lowered.find(query.as_str())?;
            Some((candidate, offset == 0, lowered[..offset].chars().count()))
        })
        .collect();

    matches.sort_by(|(a, a_prefix, a_index), (b, b_prefix, b_index)| {
        b_prefix
            .cmp(a_prefix)
            .then(a_index.cmp(b_index))
            .then_with(|| locale_cmp(a, b))
    });
    matches.truncate(MAX_SUGGESTIONS);

    matches.into_iter().map(|(candidate, _, _)| candidate).collect()
}

/// Three-level comparison in the spirit of a root-locale collator:
/// base letters (accents and case folded away, punctuation before digits
/// before letters), then accents, then case with lowercase first.
///
/// Only the ordering between these broad classes is modelled. Script-specific
/// tailoring and the collator's ignorable characters are not, so mixed
/// symbol strings can still order differently than in a browser.
fn locale_cmp(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.to_lowercase().cmp(&b.to_lowercase()))
        .then_with(|| b.cmp(a))
}

fn primary_key(s: &str) -> Vec<(u8, char)> {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .map(|c| {
            let class = if c.is_alphabetic() {
                2
            } else if c.is_numeric() {
                1
            } else {
                0
            };
            (class, c)
        })
        .collect()
}

/// Geometry of the bound input, as reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputBox {
    pub client_width: i32,
    pub client_height: i32,
    pub offset_left: i32,
    pub offset_top: i32,
}

/// Absolute placement of the floating list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Placement {
    pub width: i32,
    pub left: i32,
    pub top: i32,
}

impl From<InputBox> for Placement {
    fn from(input: InputBox) -> Self {
        Self {
            width: input.client_width,
            left: input.offset_left,
            top: input.offset_top + input.client_height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowDown,
    ArrowUp,
    Tab,
    Enter,
    Other,
}

impl Key {
    /// Maps a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowDown" => Key::ArrowDown,
            "ArrowUp" => Key::ArrowUp,
            "Tab" => Key::Tab,
            "Enter" => Key::Enter,
            _ => Key::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
}

impl KeyPress {
    pub fn new(key: Key) -> Self {
        Self { key, shift: false }
    }

    pub fn shifted(key: Key) -> Self {
        Self { key, shift: true }
    }
}

impl From<Key> for KeyPress {
    fn from(key: Key) -> Self {
        KeyPress::new(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Not handled; the host keeps the default key behaviour.
    Ignored,
    /// Handled and default behaviour suppressed.
    Handled,
    /// A suggestion was picked; default behaviour suppressed.
    Selected(String),
}

impl KeyOutcome {
    pub fn prevents_default(&self) -> bool {
        !matches!(self, KeyOutcome::Ignored)
    }
}

#[derive(Debug, Clone)]
pub struct Autocomplete {
    candidates: Vec<String>,
    suggestions: Vec<String>,
    visible: bool,
    focused: Option<usize>,
    anchor: InputBox,
    placement: Placement,
    connected: bool,
}

impl Autocomplete {
    /// Creates a hidden widget over a fixed candidate list.
    pub fn attach(candidates: Vec<String>) -> Self {
        Self {
            candidates,
            suggestions: Vec::new(),
            visible: false,
            focused: None,
            anchor: InputBox::default(),
            placement: Placement::default(),
            connected: true,
        }
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn focused(&self) -> Option<usize> {
        self.focused
    }

    pub fn focused_text(&self) -> Option<&str> {
        self.focused
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Marks the list as removed from the document; resize dispatch drops it.
    pub fn disconnect(&mut self) {
        self.connected = false;
        self.hide();
    }

    /// Bound input text changed.
    pub fn on_input(&mut self, text: &str) {
        if text.is_empty() {
            self.hide();
            return;
        }

        self.suggestions = rank(text, &self.candidates)
            .into_iter()
            .map(str::to_string)
            .collect();
        self.focused = None;

        if self.suggestions.is_empty() {
            self.hide();
        } else {
            self.show();
        }
    }

    /// Focus went back to the bound input.
    pub fn focus_input(&mut self) {
        self.focused = None;
    }

    pub fn set_anchor(&mut self, anchor: InputBox) {
        self.anchor = anchor;
        if self.visible {
            self.reposition();
        }
    }

    pub fn reposition(&mut self) {
        self.placement = Placement::from(self.anchor);
    }

    pub fn hide(&mut self) {
        self.visible = false;
        self.focused = None;
    }

    fn show(&mut self) {
        self.visible = true;
        self.reposition();
    }

    pub fn key_down(&mut self, press: impl Into<KeyPress>) -> KeyOutcome {
        let press = press.into();
        if !self.visible || self.suggestions.is_empty() {
            return KeyOutcome::Ignored;
        }
        let last = self.suggestions.len() - 1;

        match (press.key, press.shift) {
            (Key::ArrowDown, _) | (Key::Tab, false) => {
                self.focused = Some(match self.focused {
                    None => 0,
                    Some(i) => (i + 1).min(last),
                });
                KeyOutcome::Handled
            }
            (Key::ArrowUp, _) | (Key::Tab, true) => {
                self.focused = Some(match self.focused {
                    None => last,
                    Some(i) => i.saturating_sub(1),
                });
                KeyOutcome::Handled
            }
            (Key::Enter, _) => match self.focused_text().map(str::to_string) {
                Some(text) => {
                    self.hide();
                    KeyOutcome::Selected(text)
                }
                None => KeyOutcome::Handled,
            },
            (Key::Other, _) => KeyOutcome::Ignored,
        }
    }

    /// Click on the suggestion at `index`.
    pub fn click(&mut self, index: usize) -> Option<String> {
        if !self.visible {
            return None;
        }
        let text = self.suggestions.get(index).cloned()?;
        self.hide();
        Some(text)
    }

    pub fn view(&self) -> Element {
        let style = if self.visible {
            format!(
                "display: block; width: {}px; left: {}px; top: {}px",
                self.placement.width, self.placement.left, self.placement.top
            )
        } else {
            "display: none".to_string()
        };

        let items = self.suggestions.iter().enumerate().map(|(i, text)| {
            let link = Element::new("a")
                .attr("href", "#")
                .flag("data-focused", self.focused == Some(i))
                .child(text.as_str());
            Element::new("li").class("menu-item").child(link)
        });

        Element::new("ul")
            .class("menu autocomplete")
            .attr("style", style)
            .children(if self.visible {
                items.collect::<Vec<_>>()
            } else {
                Vec::new()
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn widget(candidates: &[&str]) -> Autocomplete {
        Autocomplete::attach(candidates.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn prefix_then_position_then_alphabetical() {
        let ranked = rank("ab", &["cab", "abacus", "crab"]);
        assert_eq!(ranked, vec!["abacus", "cab", "crab"]);

        let ranked = rank("AB", &["xab", "abz", "Aba", "zab", "nope"]);
        assert_eq!(ranked, vec!["Aba", "abz", "xab", "zab"]);
    }

    #[test]
    fn position_counts_characters_not_bytes() {
        let ranked = rank("ab", &["xab", "éab"]);
        assert_eq!(ranked, vec!["éab", "xab"]);

        let ranked = rank("ab", &["ééab", "xxxab", "yab"]);
        assert_eq!(ranked, vec!["yab", "ééab", "xxxab"]);
    }

    #[test]
    fn alphabetical_ties_follow_collation_classes() {
        assert_eq!(locale_cmp("a_b", "a0b"), Ordering::Less);
        assert_eq!(locale_cmp("a0b", "aab"), Ordering::Less);
        assert_eq!(locale_cmp("eab", "éab"), Ordering::Less);
        assert_eq!(locale_cmp("éab", "fab"), Ordering::Less);
        assert_eq!(locale_cmp("abc", "Abc"), Ordering::Less);
        assert_eq!(locale_cmp("Abc", "abd"), Ordering::Less);
    }

    #[test]
    fn truncates_to_max_suggestions() {
        let candidates: Vec<String> = (0..250).map(|i| format!("item{i:03}")).collect();
        let ranked = rank("item", &candidates);
        assert_eq!(ranked.len(), MAX_SUGGESTIONS);
        assert_eq!(ranked[0], "item000");
    }

    #[test]
    fn prefix_matches_always_precede_inner_matches() {
        let candidates = ["zzsword", "sword", "a sword", "swordfish", "Broadsword"];
        let ranked = rank("sword", &candidates);
        let first_inner = ranked
            .iter()
            .position(|c| !c.to_lowercase().starts_with("sword"))
            .unwrap();
        assert!(
            ranked[first_inner..]
                .iter()
                .all(|c| !c.to_lowercase().starts_with("sword"))
        );
        assert_eq!(&ranked[..first_inner], &["sword", "swordfish"]);
    }

    #[test]
    fn hidden_until_input_matches() {
        let mut ac = widget(&["apple", "banana"]);
        assert!(!ac.is_visible());

        ac.on_input("zzz");
        assert!(!ac.is_visible());

        ac.on_input("an");
        assert!(ac.is_visible());
        assert_eq!(ac.suggestions(), &["banana".to_string()]);

        ac.on_input("");
        assert!(!ac.is_visible());
    }

    #[test]
    fn arrow_navigation_clamps_at_ends() {
        let mut ac = widget(&["abc", "abd", "abe"]);
        ac.on_input("ab");

        assert_eq!(ac.key_down(Key::ArrowDown), KeyOutcome::Handled);
        assert_eq!(ac.focused(), Some(0));
        ac.key_down(Key::ArrowDown);
        ac.key_down(Key::ArrowDown);
        assert_eq!(ac.focused(), Some(2));
        ac.key_down(Key::ArrowDown);
        assert_eq!(ac.focused(), Some(2));

        assert_eq!(
            ac.key_down(Key::Enter),
            KeyOutcome::Selected("abe".to_string())
        );
        assert!(!ac.is_visible());
    }

    #[test]
    fn up_and_shift_tab_start_from_last() {
        let mut ac = widget(&["abc", "abd", "abe"]);
        ac.on_input("ab");
        ac.key_down(KeyPress::shifted(Key::Tab));
        assert_eq!(ac.focused_text(), Some("abe"));
        ac.key_down(Key::ArrowUp);
        ac.key_down(Key::ArrowUp);
        ac.key_down(Key::ArrowUp);
        assert_eq!(ac.focused(), Some(0));

        ac.key_down(Key::Tab);
        assert_eq!(ac.focused_text(), Some("abd"));
    }

    #[test]
    fn keys_ignored_while_hidden_and_enter_without_focus_is_noop() {
        let mut ac = widget(&["abc"]);
        assert_eq!(ac.key_down(Key::ArrowDown), KeyOutcome::Ignored);

        ac.on_input("a");
        assert_eq!(ac.key_down(Key::Enter), KeyOutcome::Handled);
        assert!(ac.is_visible());
        assert_eq!(ac.key_down(Key::Other), KeyOutcome::Ignored);
    }

    #[test]
    fn placement_follows_anchor() {
        let mut ac = widget(&["abc"]);
        ac.set_anchor(InputBox {
            client_width: 200,
            client_height: 30,
            offset_left: 15,
            offset_top: 40,
        });
        ac.on_input("a");
        assert_eq!(
            ac.placement(),
            Placement {
                width: 200,
                left: 15,
                top: 70
            }
        );
        let html = ac.view().to_html();
        assert!(html.contains("display: block; width: 200px; left: 15px; top: 70px"));
    }

    #[test]
    fn click_returns_text_and_hides() {
        let mut ac = widget(&["abc", "xab"]);
        ac.on_input("ab");
        assert_eq!(ac.click(1), Some("xab".to_string()));
        assert!(!ac.is_visible());
        assert_eq!(ac.click(0), None);
    }
}
