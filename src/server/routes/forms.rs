use crate::error::CatalogError;
use crate::server::router::AppState;
use axum::{
    Json,
    extract::{Path, State},
};
use modcatalog_forms::FieldDefinition;

fn mod_form() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::input("id", "ID").describe("Lowercase letters, digits, '-' and '_'."),
        FieldDefinition::input("name", "Name"),
        FieldDefinition::input("url", "URL").describe("Project page."),
    ]
}

fn version_form() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::input("id", "Version"),
        FieldDefinition::input("name", "Name"),
        FieldDefinition::input("url", "Download URL"),
        FieldDefinition::textarea("changelog", "Changelog"),
    ]
}

fn dependency_form(mod_ids: Vec<String>) -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::input("id", "Mod")
            .describe("ID of the required mod.")
            .with_autocomplete(mod_ids),
        FieldDefinition::input("version", "Version"),
        FieldDefinition::boolean("required", "Required").with_default("true"),
    ]
}

fn redirect_form() -> Vec<FieldDefinition> {
    vec![
        FieldDefinition::input("path", "Path").describe("Request path, without leading slash."),
        FieldDefinition::input("url", "Target"),
    ]
}

/// Field definitions the browser renders edit forms from.
pub(crate) async fn form_definitions(
    State(state): State<AppState>,
    Path(entity): Path<String>,
) -> Result<Json<Vec<FieldDefinition>>, CatalogError> {
    let form = match entity.as_str() {
        "mod" => mod_form(),
        "version" => version_form(),
        "dependency" => dependency_form(state.db.mods().ids().await?),
        "redirect" => redirect_form(),
        other => return Err(CatalogError::not_found(format!("Form '{other}' not found."))),
    };
    Ok(Json(form))
}

#[cfg(test)]
mod tests {
    use super::*;
    use modcatalog_forms::{FieldKind, INVALID_DEFINITION_MESSAGE, render_form};
    use serde_json::Map;

    #[test]
    fn dependency_form_suggests_mod_ids() {
        let form = dependency_form(vec!["create".into(), "jei".into()]);
        assert_eq!(
            form[0].autocomplete.as_deref(),
            Some(&["create".to_string(), "jei".to_string()][..])
        );
        assert_eq!(form[2].kind, FieldKind::Boolean);
    }

    #[test]
    fn served_forms_render_without_invalid_controls() {
        for defs in [mod_form(), version_form(), redirect_form()] {
            let form = render_form(defs, Map::new());
            let html = form.view().to_html();
            assert!(!html.contains(INVALID_DEFINITION_MESSAGE), "{html}");
        }
    }
}
