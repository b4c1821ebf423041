// ABOUTME: Select widget for the multi-select tag field
// ABOUTME: Renders a hidden <select multiple> plus the select2 initialisation script

pub const SELECT2_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/select2/4.0.1/css/select2.min.css";
pub const SELECT2_JS: &str = "https://cdnjs.cloudflare.com/ajax/libs/select2/4.0.1/js/select2.js";

/// Stylesheets and scripts a page must include for the widget to work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetMedia {
    pub css: Vec<&'static str>,
    pub js: Vec<&'static str>,
}

impl WidgetMedia {
    /// `<link>` and `<script>` tags for the page head
    pub fn render(&self) -> String {
        let mut html = String::new();
        for href in &self.css {
            html.push_str(&format!(
                "<link href=\"{}\" type=\"text/css\" media=\"all\" rel=\"stylesheet\">\n",
                html_escape(href)
            ));
        }
        for src in &self.js {
            html.push_str(&format!(
                "<script type=\"text/javascript\" src=\"{}\"></script>\n",
                html_escape(src)
            ));
        }
        html
    }
}

#[derive(Debug, Clone)]
pub struct TagSelectWidget {
    /// URL of the AJAX tag search endpoint used for autocomplete
    pub search_url: String,
}

impl TagSelectWidget {
    pub fn new(search_url: impl Into<String>) -> Self {
        Self {
            search_url: search_url.into(),
        }
    }

    pub fn media() -> WidgetMedia {
        WidgetMedia {
            css: vec![SELECT2_CSS],
            js: vec![SELECT2_JS],
        }
    }

    /// Render the field. Existing values become preselected options; the
    /// native control stays hidden until select2 takes over.
    pub fn render(&self, name: &str, values: &[String], attrs: &[(&str, &str)]) -> String {
        let id = attrs
            .iter()
            .find(|(key, _)| *key == "id")
            .map(|(_, value)| value.to_string())
            .unwrap_or_else(|| format!("id_{}", name));

        let mut html = format!(
            "<select multiple=\"multiple\" name=\"{}\" id=\"{}\"",
            html_escape(name),
            html_escape(&id)
        );
        for (key, value) in attrs.iter().filter(|(key, _)| !matches!(*key, "id" | "style")) {
            html.push_str(&format!(" {}=\"{}\"", html_escape(key), html_escape(value)));
        }
        html.push_str(" style=\"display: none\">\n");

        for value in values {
            let escaped = html_escape(value);
            html.push_str(&format!(
                "<option value=\"{}\" selected=\"selected\">{}</option>\n",
                escaped, escaped
            ));
        }
        html.push_str("</select>\n");

        html.push_str("<script type=\"text/javascript\">\n");
        html.push_str(&self.init_script(&id));
        html.push_str("</script>\n");
        html
    }

    fn init_script(&self, id: &str) -> String {
        format!(
            r#"$(function () {{
    $({selector}).select2({{
        tags: true,
        tokenSeparators: [","],
        ajax: {{
            url: {url},
            dataType: "json",
            delay: 250,
            headers: {{"X-Requested-With": "XMLHttpRequest"}},
            data: function (params) {{
                return {{query: params.term, limit: 10}};
            }},
            processResults: function (data) {{
                return {{results: $.map(data.tags, function (tag) {{
                    return {{id: tag, text: tag}};
                }})}};
            }}
        }}
    }});
}});
"#,
            selector = js_string(&format!("#{}", id)),
            url = js_string(&self.search_url),
        )
    }
}

/// HTML escape helper
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON string literal that is also safe inside a <script> block
fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string())
        .to_string()
        .replace("</", "<\\/")
}
