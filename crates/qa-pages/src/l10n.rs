use std::sync::OnceLock;

use handlebars::Handlebars;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

/// Replaceable string table: control labels and validation message templates.
///
/// Templates may contain one `{{n}}` placeholder, substituted with the
/// violated bound or the offending answer value.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct L10n {
    #[serde(default)]
    pub buttons: ButtonLabels,
    #[serde(default)]
    pub validation: ValidationMessages,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ButtonLabels {
    pub back: String,
    pub next: String,
    pub finish: String,
}

impl Default for ButtonLabels {
    fn default() -> Self {
        Self {
            back: "< Back".into(),
            next: "Next >".into(),
            finish: "Finish >".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default, rename_all = "camelCase")]
pub struct ValidationMessages {
    pub required: String,
    pub min_string: String,
    pub max_string: String,
    pub min_number: String,
    pub max_number: String,
    pub min_array: String,
    pub max_array: String,
    pub generic: String,
}

impl Default for ValidationMessages {
    fn default() -> Self {
        Self {
            required: "Please answer this question to continue.".into(),
            min_string: "Please enter at least {{n}} character(s).".into(),
            max_string: "Please enter no more than {{n}} character(s).".into(),
            min_number: "Please enter a number greater than {{n}}.".into(),
            max_number: "Please enter a number less than {{n}}.".into(),
            min_array: "Please choose at least {{n}} option(s).".into(),
            max_array: "Please choose at most {{n}} option(s).".into(),
            generic: "Please answer this question to continue.".into(),
        }
    }
}

/// Render a string-table template, replacing `{{n}}` with `placeholder`.
///
/// Rendering is strict: a template referencing anything but `n`, or one
/// handlebars cannot parse, falls back to [`substitute_placeholder`].
pub fn format_message(template: &str, placeholder: &str) -> String {
    static ENGINE: OnceLock<Handlebars<'static>> = OnceLock::new();
    let engine = ENGINE.get_or_init(|| {
        let mut engine = Handlebars::new();
        engine.register_escape_fn(handlebars::no_escape);
        engine.set_strict_mode(true);
        engine
    });
    match engine.render_template(template, &json!({ "n": placeholder })) {
        Ok(rendered) => rendered,
        Err(err) => {
            warn!(template, error = %err, "message template failed to render; substituting literally");
            substitute_placeholder(template, placeholder)
        }
    }
}

/// Replace every literal `{{n}}` in `message`, leaving anything else untouched.
pub fn substitute_placeholder(message: &str, placeholder: &str) -> String {
    message.replace("{{n}}", placeholder)
}

/// Display form of a numeric bound (`3` rather than `3.0`).
pub fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < i64::MAX as f64 {
        format!("{}", bound as i64)
    } else {
        bound.to_string()
    }
}
