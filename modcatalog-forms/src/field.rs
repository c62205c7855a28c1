//! Field renderer: turns a [`FieldDefinition`] into an editable control bound
//! to a [`FieldAccess`] host.
//!
//! Only `select` and `boolean` write back during construction (initial-load
//! normalization). Every other kind treats the initial value as display-only
//! until the user edits.

use crate::access::FieldAccess;
use crate::autocomplete::{Autocomplete, InputBox, KeyOutcome, KeyPress};
use crate::definition::{FieldDefinition, FieldKind};
use crate::node::Element;
use crate::viewport::Viewport;
use serde_json::{Map, Number, Value};
use std::cell::RefCell;
use std::num::FpCategory;
use std::rc::Rc;

pub const INVALID_DEFINITION_MESSAGE: &str = "Error in definition! Report this to the developer.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    Item,
    Texture,
}

impl IconKind {
    pub fn as_str(self) -> &'static str {
        match self {
            IconKind::Item => "item",
            IconKind::Texture => "texture",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "item" => Some(IconKind::Item),
            "texture" => Some(IconKind::Texture),
            _ => None,
        }
    }
}

/// Current state of a rendered control.
#[derive(Debug, Clone)]
pub enum Control {
    Input {
        text: String,
        autocomplete: Option<Rc<RefCell<Autocomplete>>>,
    },
    Textarea {
        text: String,
    },
    Select {
        selected: Option<String>,
    },
    Icon {
        text: String,
        kind: IconKind,
    },
    Boolean {
        selected: Option<String>,
    },
    Invalid,
}

pub struct Field<A: FieldAccess> {
    definition: FieldDefinition,
    access: A,
    control: Control,
}

/// Renders `definition` against `access`.
pub fn render<A: FieldAccess>(definition: FieldDefinition, access: A) -> Field<A> {
    Field::render(definition, access)
}

impl<A: FieldAccess> Field<A> {
    pub fn render(definition: FieldDefinition, mut access: A) -> Self {
        let key = definition.key.clone();
        let control = match definition.kind {
            FieldKind::Input => {
                let text = initial_text(&definition, access.initial(&key));
                let autocomplete = definition
                    .autocomplete
                    .clone()
                    .map(|candidates| Rc::new(RefCell::new(Autocomplete::attach(candidates))));
                Control::Input { text, autocomplete }
            }
            FieldKind::Textarea => Control::Textarea {
                text: initial_text(&definition, access.initial(&key)),
            },
            FieldKind::Select => {
                let mut selected = None;
                if let Some(initial) = access.initial(&key) {
                    let shown = display_text(&initial);
                    if definition.options.contains(&shown) {
                        selected = Some(shown);
                    }
                    access.set(&key, initial);
                }
                Control::Select { selected }
            }
            FieldKind::Icon => {
                let mut text = String::new();
                let mut kind = IconKind::Item;
                if let Some(Value::Object(initial)) = access.initial(&key) {
                    for candidate in [IconKind::Item, IconKind::Texture] {
                        if let Some(value) = initial.get(candidate.as_str()) {
                            text = display_text(value);
                            kind = candidate;
                        }
                    }
                }
                Control::Icon { text, kind }
            }
            FieldKind::Boolean => {
                let mut selected = None;
                if let Some(initial) = access.initial(&key) {
                    let shown = display_text(&initial);
                    let truthy = matches!(&initial, Value::Bool(true)) || shown == "true";
                    if shown == "true" || shown == "false" {
                        selected = Some(shown);
                    }
                    access.set(&key, Value::Bool(truthy));
                }
                Control::Boolean { selected }
            }
            FieldKind::Unknown => Control::Invalid,
        };

        Self {
            definition,
            access,
            control,
        }
    }

    pub fn definition(&self) -> &FieldDefinition {
        &self.definition
    }

    pub fn control(&self) -> &Control {
        &self.control
    }

    pub fn access(&self) -> &A {
        &self.access
    }

    pub fn into_access(self) -> A {
        self.access
    }

    pub fn autocomplete(&self) -> Option<&Rc<RefCell<Autocomplete>>> {
        match &self.control {
            Control::Input {
                autocomplete: Some(ac),
                ..
            } => Some(ac),
            _ => None,
        }
    }

    /// Registers the suggestion list for window resize repositioning.
    pub fn subscribe(&self, viewport: &mut Viewport) {
        if let Some(ac) = self.autocomplete() {
            viewport.subscribe(ac);
        }
    }

    /// The host reports the text control's current geometry.
    pub fn set_input_box(&mut self, input_box: InputBox) {
        if let Some(ac) = self.autocomplete() {
            ac.borrow_mut().set_anchor(input_box);
        }
    }

    /// User typed into the text control.
    pub fn input(&mut self, value: &str) {
        let key = self.definition.key.as_str();
        match &mut self.control {
            Control::Input { text, autocomplete } => {
                *text = value.to_string();
                let stored = if self.definition.is_unset_text(value) {
                    Value::Null
                } else if self.definition.is_number {
                    parse_number(value)
                } else {
                    Value::String(value.to_string())
                };
                self.access.set(key, stored);

                if let Some(ac) = autocomplete {
                    ac.borrow_mut().on_input(value);
                }
            }
            Control::Textarea { text } => {
                *text = value.to_string();
                let stored = if self.definition.is_unset_text(value) {
                    Value::Null
                } else {
                    Value::String(value.to_string())
                };
                self.access.set(key, stored);
            }
            Control::Icon { text, kind } => {
                *text = value.to_string();
                if !value.is_empty() {
                    self.access.set(key, icon_value(*kind, value));
                }
            }
            Control::Select { .. } | Control::Boolean { .. } | Control::Invalid => {}
        }
    }

    /// User picked an option in a dropdown (select, boolean, icon kind).
    pub fn choose(&mut self, value: &str) {
        let key = self.definition.key.as_str();
        match &mut self.control {
            Control::Select { selected } => {
                if !self.definition.options.iter().any(|o| o == value) {
                    return;
                }
                *selected = Some(value.to_string());
                self.access.set(key, Value::String(value.to_string()));
            }
            Control::Boolean { selected } => {
                if value != "true" && value != "false" {
                    return;
                }
                *selected = Some(value.to_string());
                self.access.set(key, Value::Bool(value == "true"));
            }
            Control::Icon { text, kind } => {
                let Some(parsed) = IconKind::parse(value) else {
                    return;
                };
                *kind = parsed;
                if !text.is_empty() {
                    self.access.set(key, icon_value(parsed, text));
                }
            }
            Control::Input { .. } | Control::Textarea { .. } | Control::Invalid => {}
        }
    }

    /// Key pressed in the text control or its suggestion list.
    pub fn key_down(&mut self, press: impl Into<KeyPress>) -> KeyOutcome {
        let Some(ac) = self.autocomplete().cloned() else {
            return KeyOutcome::Ignored;
        };
        let outcome = ac.borrow_mut().key_down(press);
        if let KeyOutcome::Selected(text) = &outcome {
            self.accept_suggestion(text);
        }
        outcome
    }

    /// Click on the suggestion at `index`. Returns the accepted text.
    pub fn click_suggestion(&mut self, index: usize) -> Option<String> {
        let ac = self.autocomplete().cloned()?;
        let text = ac.borrow_mut().click(index)?;
        self.accept_suggestion(&text);
        Some(text)
    }

    fn accept_suggestion(&mut self, value: &str) {
        if let Control::Input { text, .. } = &mut self.control {
            *text = value.to_string();
            self.access
                .set(&self.definition.key, Value::String(value.to_string()));
        }
    }

    pub fn view(&self) -> Element {
        let controls: Vec<Element> = match &self.control {
            Control::Input { text, autocomplete } => {
                let mut controls = vec![
                    Element::new("input")
                        .class("form-input")
                        .attr("type", "text")
                        .attr("value", text.as_str()),
                ];
                if let Some(ac) = autocomplete {
                    controls.push(ac.borrow().view());
                }
                controls
            }
            Control::Textarea { text } => {
                vec![Element::new("textarea").class("form-input").child(text.as_str())]
            }
            Control::Select { selected } => {
                let options = self
                    .definition
                    .options
                    .iter()
                    .map(|o| option(o, o, selected.as_deref() == Some(o.as_str())));
                vec![Element::new("select").class("form-select").children(options)]
            }
            Control::Icon { text, kind } => vec![
                Element::new("input")
                    .class("form-input")
                    .attr("type", "text")
                    .attr("value", text.as_str()),
                Element::new("select")
                    .class("form-select")
                    .attr("style", "flex-grow: unset")
                    .child(option("item", "Item", *kind == IconKind::Item))
                    .child(option("texture", "Texture", *kind == IconKind::Texture)),
            ],
            Control::Boolean { selected } => {
                let selected = selected.as_deref();
                vec![
                    Element::new("select")
                        .class("form-select")
                        .child(option("true", "True", selected == Some("true")))
                        .child(option("false", "False", selected == Some("false"))),
                ]
            }
            Control::Invalid => vec![
                Element::new("input")
                    .class("form-input disabled")
                    .attr("type", "text")
                    .flag("disabled", true)
                    .attr("value", INVALID_DEFINITION_MESSAGE),
            ],
        };

        let label = Element::new("span")
            .class("input-group-addon min-w-5em text-right")
            .child(self.definition.name.as_str());

        let tooltip = Element::new("div")
            .class("input-group-addon popover popover-right")
            .child(Element::new("div").class("noselect").child("?"))
            .child(
                Element::new("div").class("popover-container card p-0").child(
                    Element::new("div")
                        .class("card-body ws-collapse")
                        .attr("id", "tooltip")
                        .child(self.definition.description.as_str()),
                ),
            );

        Element::new("div").class("form-group").child(
            Element::new("div")
                .class("input-group")
                .child(label)
                .children(controls)
                .child(tooltip),
        )
    }
}

fn option(value: &str, label: &str, selected: bool) -> Element {
    Element::new("option")
        .attr("value", value)
        .flag("selected", selected)
        .child(label)
}

fn initial_text(definition: &FieldDefinition, initial: Option<Value>) -> String {
    match initial {
        Some(value) => display_text(&value),
        None => definition.default.clone().unwrap_or_default(),
    }
}

/// Text a DOM control would show for an arbitrary value.
fn display_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Numeric input mirrors a falsy-to-null coercion: zero, unparsable and
/// non-finite text are all stored as unset.
fn parse_number(text: &str) -> Value {
    let Ok(n) = text.trim().parse::<f64>() else {
        return Value::Null;
    };
    if matches!(
        n.classify(),
        FpCategory::Zero | FpCategory::Nan | FpCategory::Infinite
    ) {
        return Value::Null;
    }
    if let Ok(integral) = n.to_string().parse::<i64>() {
        return Value::Number(Number::from(integral));
    }
    Number::from_f64(n).map_or(Value::Null, Value::Number)
}

fn icon_value(kind: IconKind, text: &str) -> Value {
    let mut map = Map::new();
    map.insert(kind.as_str().to_string(), Value::String(text.to_string()));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autocomplete::Key;
    use serde_json::json;

    /// Host that records every `set` call.
    #[derive(Default)]
    struct Recorder {
        initial: Map<String, Value>,
        calls: Vec<(String, Value)>,
    }

    impl Recorder {
        fn with(key: &str, value: Value) -> Self {
            let mut initial = Map::new();
            initial.insert(key.to_string(), value);
            Self {
                initial,
                calls: Vec::new(),
            }
        }
    }

    impl FieldAccess for Recorder {
        fn initial(&self, key: &str) -> Option<Value> {
            self.initial.get(key).cloned()
        }

        fn set(&mut self, key: &str, value: Value) {
            self.calls.push((key.to_string(), value));
        }
    }

    fn last_call<A: FieldAccess>(field: &Field<A>) -> Option<(String, Value)>
    where
        A: std::ops::Deref<Target = Recorder>,
    {
        field.access().calls.last().cloned()
    }

    #[test]
    fn input_equal_to_default_or_empty_is_unset() {
        let def = FieldDefinition::input("title", "Title").with_default("Untitled");
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);

        match field.control() {
            Control::Input { text, .. } => assert_eq!(text, "Untitled"),
            other => panic!("unexpected control {other:?}"),
        }

        field.input("Hello");
        field.input("Untitled");
        field.input("");
        drop(field);

        assert_eq!(
            host.calls,
            vec![
                ("title".to_string(), json!("Hello")),
                ("title".to_string(), Value::Null),
                ("title".to_string(), Value::Null),
            ]
        );
    }

    #[test]
    fn numeric_input_parses_or_nulls() {
        let def = FieldDefinition::input("count", "Count").numeric();
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);

        field.input("42");
        field.input(" 1.5 ");
        field.input("abc");
        field.input("1e3");
        drop(field);

        assert_eq!(
            host.calls.into_iter().map(|(_, v)| v).collect::<Vec<_>>(),
            vec![json!(42), json!(1.5), Value::Null, json!(1000)]
        );
    }

    #[test]
    fn numeric_zero_is_stored_as_unset() {
        let def = FieldDefinition::input("count", "Count").numeric();
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);

        field.input("0");
        field.input("-0.0");
        field.input("3");
        drop(field);

        assert_eq!(
            host.calls.into_iter().map(|(_, v)| v).collect::<Vec<_>>(),
            vec![Value::Null, Value::Null, json!(3)]
        );
        assert_eq!(parse_number("0"), Value::Null);
    }

    #[test]
    fn input_initial_value_is_display_only() {
        let def = FieldDefinition::input("count", "Count").with_default("1");
        let mut host = Recorder::with("count", json!(7));
        let field = render(def, &mut host);

        match field.control() {
            Control::Input { text, .. } => assert_eq!(text, "7"),
            other => panic!("unexpected control {other:?}"),
        }
        drop(field);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn select_resubmits_initial_value_on_load() {
        // Documented quirk: select normalizes during construction.
        let def = FieldDefinition::select("side", "Side", ["left", "right"]);
        let mut host = Recorder::with("side", json!("right"));
        let mut field = render(def, &mut host);
        assert_eq!(last_call(&field), Some(("side".to_string(), json!("right"))));

        field.choose("left");
        field.choose("middle");
        drop(field);
        assert_eq!(host.calls.len(), 2);
        assert_eq!(host.calls[1], ("side".to_string(), json!("left")));
    }

    #[test]
    fn select_without_initial_does_not_write() {
        let def = FieldDefinition::select("side", "Side", ["left", "right"]);
        let mut host = Recorder::default();
        let field = render(def, &mut host);
        drop(field);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn boolean_emits_booleans_never_strings() {
        let def = FieldDefinition::boolean("hidden", "Hidden");
        let mut host = Recorder::default();
        let mut field = render(def.clone(), &mut host);
        field.choose("true");
        drop(field);
        assert_eq!(host.calls, vec![("hidden".to_string(), json!(true))]);

        // Re-reading the stored boolean normalizes to a boolean again.
        let mut host = Recorder::with("hidden", json!(true));
        let field = render(def.clone(), &mut host);
        assert!(matches!(
            field.control(),
            Control::Boolean { selected: Some(s) } if s == "true"
        ));
        drop(field);
        assert_eq!(host.calls, vec![("hidden".to_string(), json!(true))]);

        let mut host = Recorder::with("hidden", json!("true"));
        drop(render(def.clone(), &mut host));
        assert_eq!(host.calls, vec![("hidden".to_string(), json!(true))]);

        let mut host = Recorder::with("hidden", json!("false"));
        drop(render(def, &mut host));
        assert_eq!(host.calls, vec![("hidden".to_string(), json!(false))]);
    }

    #[test]
    fn icon_seeds_from_item_or_texture() {
        let def = FieldDefinition::icon("icon", "Icon");

        let mut host = Recorder::with("icon", json!({ "item": "sword" }));
        let field = render(def.clone(), &mut host);
        match field.control() {
            Control::Icon { text, kind } => {
                assert_eq!(text, "sword");
                assert_eq!(*kind, IconKind::Item);
            }
            other => panic!("unexpected control {other:?}"),
        }
        drop(field);
        assert!(host.calls.is_empty());

        let mut host = Recorder::with("icon", json!({ "texture": "foo.png" }));
        let field = render(def, &mut host);
        match field.control() {
            Control::Icon { text, kind } => {
                assert_eq!(text, "foo.png");
                assert_eq!(*kind, IconKind::Texture);
            }
            other => panic!("unexpected control {other:?}"),
        }
    }

    #[test]
    fn icon_writes_only_with_text() {
        let def = FieldDefinition::icon("icon", "Icon");
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);

        field.choose("texture");
        field.input("stone.png");
        field.choose("item");
        field.input("");
        drop(field);

        assert_eq!(
            host.calls,
            vec![
                ("icon".to_string(), json!({ "texture": "stone.png" })),
                ("icon".to_string(), json!({ "item": "stone.png" })),
            ]
        );
    }

    #[test]
    fn textarea_is_never_numeric() {
        let mut def = FieldDefinition::textarea("notes", "Notes");
        def.is_number = true;
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);
        field.input("12");
        drop(field);
        assert_eq!(host.calls, vec![("notes".to_string(), json!("12"))]);
    }

    #[test]
    fn unknown_kind_renders_disabled_error_control() {
        let def = FieldDefinition::new("x", "X", FieldKind::Unknown).describe("help");
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);
        field.input("ignored");
        field.choose("ignored");

        let view = field.view();
        let input = view
            .find(&|el| el.tag == "input")
            .expect("disabled input rendered");
        assert!(input.get_attr("disabled").is_some());
        assert_eq!(input.get_attr("value"), Some(INVALID_DEFINITION_MESSAGE));
        assert!(view.text().contains("help"));
        drop(field);
        assert!(host.calls.is_empty());
    }

    #[test]
    fn view_wraps_with_label_and_tooltip() {
        let def = FieldDefinition::select("side", "Side", ["left", "right"])
            .describe("Which side the item sits on");
        let field = render(def, (|_: &str| Some(json!("left")), |_: &str, _: Value| {}));

        let html = field.view().to_html();
        assert!(html.starts_with(r#"<div class="form-group"><div class="input-group">"#));
        assert!(html.contains(r#"<span class="input-group-addon min-w-5em text-right">Side</span>"#));
        assert!(html.contains(r#"<option value="left" selected>left</option>"#));
        assert!(html.contains(r#"id="tooltip">Which side the item sits on</div>"#));
    }

    #[test]
    fn suggestion_selection_sets_text_and_value() {
        let def = FieldDefinition::input("item", "Item")
            .with_autocomplete(["iron_sword", "diamond_sword", "stone"]);
        let mut host = Recorder::default();
        let mut field = render(def, &mut host);

        field.input("sword");
        let ac = field.autocomplete().expect("autocomplete attached").clone();
        assert_eq!(
            ac.borrow().suggestions(),
            &["iron_sword".to_string(), "diamond_sword".to_string()]
        );

        assert_eq!(field.key_down(Key::ArrowDown), KeyOutcome::Handled);
        assert_eq!(
            field.key_down(Key::Enter),
            KeyOutcome::Selected("iron_sword".to_string())
        );
        match field.control() {
            Control::Input { text, .. } => assert_eq!(text, "iron_sword"),
            other => panic!("unexpected control {other:?}"),
        }

        field.input("st");
        assert_eq!(field.click_suggestion(0), Some("stone".to_string()));
        drop(field);

        assert_eq!(
            host.calls,
            vec![
                ("item".to_string(), json!("sword")),
                ("item".to_string(), json!("iron_sword")),
                ("item".to_string(), json!("st")),
                ("item".to_string(), json!("stone")),
            ]
        );
    }
}
