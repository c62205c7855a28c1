use crate::access::{FormModel, SharedModel};
use crate::definition::FieldDefinition;
use crate::field::Field;
use crate::node::Element;
use crate::viewport::Viewport;
use serde_json::{Map, Value};

/// A list of fields sharing one [`FormModel`].
pub struct Form {
    model: SharedModel,
    fields: Vec<Field<SharedModel>>,
}

/// Renders every definition against a model seeded with `values`.
pub fn render_form(definitions: Vec<FieldDefinition>, values: Map<String, Value>) -> Form {
    let model = FormModel::new(values).shared();
    let fields = definitions
        .into_iter()
        .map(|definition| Field::render(definition, model.clone()))
        .collect();
    Form { model, fields }
}

impl Form {
    pub fn fields(&self) -> &[Field<SharedModel>] {
        &self.fields
    }

    pub fn field_mut(&mut self, key: &str) -> Option<&mut Field<SharedModel>> {
        self.fields.iter_mut().find(|f| f.definition().key == key)
    }

    /// Current values; unset fields are absent.
    pub fn values(&self) -> Map<String, Value> {
        self.model.borrow().values().clone()
    }

    pub fn subscribe(&self, viewport: &mut Viewport) {
        for field in &self.fields {
            field.subscribe(viewport);
        }
    }

    pub fn view(&self) -> Element {
        Element::new("form")
            .class("form-horizontal")
            .children(self.fields.iter().map(Field::view))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn definitions() -> Vec<FieldDefinition> {
        serde_json::from_value(json!([
            { "key": "name", "name": "Name", "description": "Display name", "type": "input", "default": "Unnamed" },
            { "key": "hidden", "name": "Hidden", "description": "Hide from lists", "type": "boolean" },
            { "key": "frame", "name": "Frame", "description": "Frame style", "type": "select", "options": ["task", "goal"] },
            { "key": "bogus", "name": "Bogus", "description": "", "type": "dropdown" }
        ]))
        .expect("valid definitions")
    }

    #[test]
    fn fields_share_one_model() {
        let values = json!({ "hidden": "false", "frame": "goal" })
            .as_object()
            .cloned()
            .unwrap();
        let mut form = render_form(definitions(), values);

        // boolean/select normalized on load
        assert_eq!(
            Value::Object(form.values()),
            json!({ "hidden": false, "frame": "goal" })
        );

        form.field_mut("name").unwrap().input("Quest");
        form.field_mut("hidden").unwrap().choose("true");
        assert_eq!(
            Value::Object(form.values()),
            json!({ "name": "Quest", "hidden": true, "frame": "goal" })
        );

        form.field_mut("name").unwrap().input("Unnamed");
        assert!(!form.values().contains_key("name"));
    }

    #[test]
    fn view_renders_every_field() {
        let form = render_form(definitions(), Map::new());
        let view = form.view();
        let mut groups = Vec::new();
        view.find_all(&|el| el.has_class("form-group"), &mut groups);
        assert_eq!(groups.len(), 4);
        assert!(view.to_html().contains("Error in definition!"));
    }
}
