use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Declarative description of one editable property.
///
/// The JSON shape is `{ key, name, description, type, default?, options?,
/// isNumber?, autocomplete? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type", default)]
    pub kind: FieldKind,
    #[serde(
        default,
        deserialize_with = "deserialize_default_lax",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<String>,
    /// Choices for `select` fields.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<String>,
    /// `input` only: emit numbers instead of strings.
    #[serde(rename = "isNumber", default, skip_serializing_if = "is_false")]
    pub is_number: bool,
    /// `input` only: candidate suggestions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub autocomplete: Option<Vec<String>>,
}

/// Control kind. Anything unrecognised deserializes to [`FieldKind::Unknown`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Input,
    Select,
    Icon,
    Boolean,
    Textarea,
    #[default]
    #[serde(other)]
    Unknown,
}

fn is_false(v: &bool) -> bool {
    !*v
}

fn deserialize_default_lax<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let v = Option::<Value>::deserialize(deserializer)?;

    match v {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(_) => Err(serde::de::Error::custom(
            "expected a string, number or boolean for field default",
        )),
    }
}

impl FieldDefinition {
    pub fn new(key: impl Into<String>, name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            description: String::new(),
            kind,
            default: None,
            options: Vec::new(),
            is_number: false,
            autocomplete: None,
        }
    }

    pub fn input(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, FieldKind::Input)
    }

    pub fn textarea(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, FieldKind::Textarea)
    }

    pub fn boolean(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, FieldKind::Boolean)
    }

    pub fn icon(key: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(key, name, FieldKind::Icon)
    }

    pub fn select<I, S>(key: impl Into<String>, name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut def = Self::new(key, name, FieldKind::Select);
        def.options = options.into_iter().map(Into::into).collect();
        def
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn numeric(mut self) -> Self {
        self.is_number = true;
        self
    }

    pub fn with_autocomplete<I, S>(mut self, candidates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.autocomplete = Some(candidates.into_iter().map(Into::into).collect());
        self
    }

    /// `true` when `text` should be stored as "unset".
    pub(crate) fn is_unset_text(&self, text: &str) -> bool {
        text.is_empty() || self.default.as_deref() == Some(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_shape() {
        let def: FieldDefinition = serde_json::from_value(json!({
            "key": "amount",
            "name": "Amount",
            "description": "How many",
            "type": "input",
            "default": 1,
            "isNumber": true,
            "autocomplete": ["1", "2"]
        }))
        .expect("valid definition");

        assert_eq!(def.kind, FieldKind::Input);
        assert_eq!(def.default.as_deref(), Some("1"));
        assert!(def.is_number);
        assert_eq!(def.autocomplete, Some(vec!["1".to_string(), "2".to_string()]));
    }

    #[test]
    fn unrecognised_or_missing_type_is_unknown() {
        let def: FieldDefinition =
            serde_json::from_value(json!({ "key": "k", "name": "K", "type": "slider" }))
                .expect("still deserializes");
        assert_eq!(def.kind, FieldKind::Unknown);

        let def: FieldDefinition =
            serde_json::from_value(json!({ "key": "k", "name": "K" })).expect("still deserializes");
        assert_eq!(def.kind, FieldKind::Unknown);
    }

    #[test]
    fn serializes_without_empty_optionals() {
        let def = FieldDefinition::boolean("hidden", "Hidden");
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({ "key": "hidden", "name": "Hidden", "description": "", "type": "boolean" })
        );
    }
}
