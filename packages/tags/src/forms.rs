// ABOUTME: Form fields validating user-submitted tag strings
// ABOUTME: Admin name field, plain tag field, and the multi-select variant

use serde::Deserialize;
use tagging_config::TaggingSettings;
use tagging_core::ValidationError;

use crate::parser::parse_tag_input;
use crate::widget::TagSelectWidget;

pub const MULTIPLE_TAGS_MESSAGE: &str = "Multiple tags were given.";

pub fn tag_length_message(max_tag_length: usize) -> String {
    format!(
        "Each tag may be no more than {} characters long.",
        max_tag_length
    )
}

/// Admin form for a single tag. The name must hold exactly one tag.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagAdminForm {
    #[serde(default)]
    pub name: Option<String>,
}

impl TagAdminForm {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
        }
    }

    pub fn clean_name(&self, settings: &TaggingSettings) -> Result<String, ValidationError> {
        let value = match self.name.as_deref() {
            Some(value) if !value.is_empty() => value,
            _ => return Err(ValidationError::required("name")),
        };

        let tag_names = parse_tag_input(value);
        if tag_names.len() > 1 {
            return Err(ValidationError::new("name", MULTIPLE_TAGS_MESSAGE));
        }
        if exceeds_length(&tag_names, settings.max_tag_length) {
            return Err(ValidationError::new(
                "name",
                tag_length_message(settings.max_tag_length),
            ));
        }

        Ok(value.to_string())
    }
}

/// Text field whose value must parse into tag names no longer than
/// `max_tag_length` characters each.
#[derive(Debug, Clone)]
pub struct TagField {
    pub name: String,
    pub required: bool,
    pub max_tag_length: usize,
}

impl TagField {
    pub fn new(name: impl Into<String>, settings: &TaggingSettings) -> Self {
        Self {
            name: name.into(),
            required: true,
            max_tag_length: settings.max_tag_length,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Returns the submitted string unchanged when it is valid
    pub fn clean(&self, value: Option<&str>) -> Result<String, ValidationError> {
        let value = value.unwrap_or_default();
        if value.is_empty() {
            if self.required {
                return Err(ValidationError::required(&self.name));
            }
            return Ok(String::new());
        }

        if exceeds_length(&parse_tag_input(value), self.max_tag_length) {
            return Err(ValidationError::new(
                &self.name,
                tag_length_message(self.max_tag_length),
            ));
        }

        Ok(value.to_string())
    }
}

/// Tag field fed by a multi-select widget. The selected values are joined
/// with commas and then validated like a plain [`TagField`].
#[derive(Debug, Clone)]
pub struct TagFieldMultiSelect {
    field: TagField,
}

impl TagFieldMultiSelect {
    pub fn new(name: impl Into<String>, settings: &TaggingSettings) -> Self {
        Self {
            field: TagField::new(name, settings),
        }
    }

    pub fn optional(self) -> Self {
        Self {
            field: self.field.optional(),
        }
    }

    pub fn clean(&self, values: &[String]) -> Result<String, ValidationError> {
        let joined = values.join(",");
        self.field.clean(Some(&joined))
    }

    pub fn widget(&self, search_url: impl Into<String>) -> TagSelectWidget {
        TagSelectWidget::new(search_url)
    }

    pub fn name(&self) -> &str {
        &self.field.name
    }
}

fn exceeds_length(tag_names: &[String], max_tag_length: usize) -> bool {
    tag_names
        .iter()
        .any(|tag_name| tag_name.chars().count() > max_tag_length)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagging_core::validation::REQUIRED_MESSAGE;

    fn settings(max_tag_length: usize) -> TaggingSettings {
        TaggingSettings {
            max_tag_length,
            ..TaggingSettings::default()
        }
    }

    #[test]
    fn test_admin_form_accepts_single_tag() {
        let form = TagAdminForm::new("python");
        assert_eq!(form.clean_name(&settings(50)).unwrap(), "python");
    }

    #[test]
    fn test_admin_form_accepts_quoted_name_with_spaces() {
        let form = TagAdminForm::new("\"big cats\"");
        assert_eq!(form.clean_name(&settings(50)).unwrap(), "\"big cats\"");
    }

    #[test]
    fn test_admin_form_rejects_multiple_tags() {
        let form = TagAdminForm::new("cats dogs");
        let err = form.clean_name(&settings(50)).unwrap_err();
        assert_eq!(err.field, "name");
        assert_eq!(err.message, MULTIPLE_TAGS_MESSAGE);

        let form = TagAdminForm::new("cats, dogs");
        assert!(form.clean_name(&settings(50)).is_err());
    }

    #[test]
    fn test_admin_form_requires_name() {
        let form = TagAdminForm::default();
        let err = form.clean_name(&settings(50)).unwrap_err();
        assert_eq!(err.message, REQUIRED_MESSAGE);
    }

    #[test]
    fn test_admin_form_rejects_long_name() {
        let form = TagAdminForm::new("abcdef");
        let err = form.clean_name(&settings(5)).unwrap_err();
        assert!(err.message.contains('5'));
    }

    #[test]
    fn test_tag_field_returns_value_unchanged() {
        let field = TagField::new("tags", &settings(50));
        assert_eq!(field.clean(Some("b a, c")).unwrap(), "b a, c");
    }

    #[test]
    fn test_tag_field_rejects_long_tag() {
        let field = TagField::new("tags", &settings(10));
        let err = field.clean(Some("short waytoolongtagname")).unwrap_err();
        assert_eq!(err.field, "tags");
        assert_eq!(err.message, "Each tag may be no more than 10 characters long.");
    }

    #[test]
    fn test_tag_field_counts_characters_not_bytes() {
        let field = TagField::new("tags", &settings(4));
        assert!(field.clean(Some("über")).is_ok());
        assert!(field.clean(Some("übers")).is_err());
    }

    #[test]
    fn test_tag_field_required_and_optional() {
        let field = TagField::new("tags", &settings(50));
        assert_eq!(field.clean(None).unwrap_err().message, REQUIRED_MESSAGE);
        assert!(field.clean(Some("")).is_err());

        let field = field.optional();
        assert_eq!(field.clean(None).unwrap(), "");
    }

    #[test]
    fn test_multi_select_joins_with_commas() {
        let field = TagFieldMultiSelect::new("tags", &settings(50));
        let values = vec!["a".to_string(), "b".to_string()];
        assert_eq!(field.clean(&values).unwrap(), "a,b");
    }

    #[test]
    fn test_multi_select_keeps_spaces_inside_selected_values() {
        let field = TagFieldMultiSelect::new("tags", &settings(8));
        let values = vec!["big cats".to_string(), "dogs".to_string()];
        assert_eq!(field.clean(&values).unwrap(), "big cats,dogs");
    }

    #[test]
    fn test_multi_select_rejects_long_value() {
        let field = TagFieldMultiSelect::new("tags", &settings(3));
        let values = vec!["ok".to_string(), "toolong".to_string()];
        let err = field.clean(&values).unwrap_err();
        assert!(err.message.contains('3'));
    }

    #[test]
    fn test_multi_select_empty_selection_is_required() {
        let field = TagFieldMultiSelect::new("tags", &settings(50));
        assert!(field.clean(&[]).is_err());
        assert_eq!(field.optional().clean(&[]).unwrap(), "");
    }

    #[test]
    fn test_multi_select_widget_renders_under_field_name() {
        let field = TagFieldMultiSelect::new("tags", &settings(50));
        let html = field
            .widget("/tags_list/article")
            .render(field.name(), &["rust".to_string()], &[]);

        assert!(html.contains("name=\"tags\" id=\"id_tags\""));
        assert!(html.contains("<option value=\"rust\" selected=\"selected\">rust</option>"));
        assert!(html.contains("\"/tags_list/article\""));
    }
}
