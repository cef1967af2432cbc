//! Tera-backed template rendering for error pages.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use tera::Tera;
use tracing::debug;

use crate::config::Config;
use crate::i18n::{LocalizeParams, Localizer};

/// Renders a named view against a serializable model.
pub trait TemplateRenderer: Send + Sync {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String>;
}

/// Render `model` through `renderer`.
pub fn render_model<M: Serialize + ?Sized>(
    renderer: &(impl TemplateRenderer + ?Sized),
    view: &str,
    model: &M,
) -> Result<String> {
    let model = serde_json::to_value(model).context("failed to serialize template model")?;
    renderer.render(view, &model)
}

/// Template renderer over a Tera instance.
pub struct TeraRenderer {
    tera: Tera,
}

impl TeraRenderer {
    /// Load every `**/*.html` template under `template_dir`.
    pub fn new(template_dir: &Path) -> Result<Self> {
        let pattern = template_dir.join("**/*.html");
        let pattern_str = pattern
            .to_str()
            .context("invalid template directory path")?;

        let tera = Tera::new(pattern_str).context("failed to initialize Tera templates")?;

        let template_names: Vec<_> = tera.get_template_names().collect();
        debug!(count = template_names.len(), "loaded templates");

        Ok(Self { tera })
    }

    /// Create a renderer with no templates.
    pub fn empty() -> Self {
        Self {
            tera: Tera::default(),
        }
    }

    /// Load from `templates_dir` when configured, else start empty.
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.templates_dir {
            Some(dir) => Self::new(dir),
            None => Ok(Self::empty()),
        }
    }

    /// Register a template from a string.
    pub fn add_raw_template(&mut self, name: &str, content: &str) -> Result<()> {
        self.tera
            .add_raw_template(name, content)
            .with_context(|| format!("failed to add template {name}"))
    }

    /// Register the `t` filter, localizing its input key.
    ///
    /// `{{ "errors.NotFoundError" | t }}` or with a locale:
    /// `{{ key | t(locale="nb") }}`. Unknown keys render as the key itself.
    pub fn with_localizer(mut self, localizer: Arc<dyn Localizer>) -> Self {
        self.tera.register_filter(
            "t",
            move |value: &tera::Value, args: &HashMap<String, tera::Value>| {
                let key = tera::try_get_value!("t", "value", String, value);
                let params = LocalizeParams {
                    locale: args
                        .get("locale")
                        .and_then(|v| v.as_str())
                        .map(str::to_string),
                    ..LocalizeParams::default()
                };
                let message = localizer.localize(&key, &params).unwrap_or(key);
                Ok(tera::Value::String(message))
            },
        );
        self
    }

    /// Get the underlying Tera instance for custom operations.
    pub fn tera(&self) -> &Tera {
        &self.tera
    }
}

impl TemplateRenderer for TeraRenderer {
    fn render(&self, view: &str, model: &serde_json::Value) -> Result<String> {
        let context =
            tera::Context::from_value(model.clone()).context("template model must be an object")?;
        self.tera
            .render(view, &context)
            .with_context(|| format!("failed to render {view}"))
    }
}

impl std::fmt::Debug for TeraRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TeraRenderer")
            .field("templates", &self.tera.get_template_names().count())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::i18n::{DEFAULT_BUNDLE, MessageBundles};
    use serde_json::json;

    #[test]
    fn renders_model_fields() {
        let mut renderer = TeraRenderer::empty();
        renderer
            .add_raw_template("error.html", "<h1>{{ status }} {{ errorKey }}</h1>")
            .unwrap();
        let html = renderer
            .render("error.html", &json!({"status": 404, "errorKey": "NotFoundError"}))
            .unwrap();
        assert_eq!(html, "<h1>404 NotFoundError</h1>");
    }

    #[test]
    fn unknown_view_is_error() {
        let renderer = TeraRenderer::empty();
        assert!(renderer.render("missing.html", &json!({})).is_err());
    }

    #[test]
    fn non_object_model_is_error() {
        let mut renderer = TeraRenderer::empty();
        renderer.add_raw_template("x.html", "x").unwrap();
        assert!(renderer.render("x.html", &json!([1, 2])).is_err());
    }

    #[test]
    fn t_filter_localizes() {
        let bundles = MessageBundles::new();
        bundles.insert(DEFAULT_BUNDLE, None, "errors.NotFoundError", "Page not found");
        bundles.insert(DEFAULT_BUNDLE, Some("nb"), "errors.NotFoundError", "Fant ikke siden");

        let mut renderer = TeraRenderer::empty().with_localizer(Arc::new(bundles));
        renderer
            .add_raw_template(
                "e.html",
                r#"{% set key = "errors." ~ errorKey %}{{ key | t }}|{{ key | t(locale="nb") }}|{{ "x.y" | t }}"#,
            )
            .unwrap();

        let html = renderer
            .render("e.html", &json!({"errorKey": "NotFoundError"}))
            .unwrap();
        assert_eq!(html, "Page not found|Fant ikke siden|x.y");
    }

    #[test]
    fn loads_templates_from_directory() {
        let dir = std::env::temp_dir().join(format!("stagehand-theme-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(dir.join("errors")).unwrap();
        std::fs::write(dir.join("errors/500.html"), "oops {{ status }}").unwrap();

        let renderer = TeraRenderer::new(&dir).unwrap();
        let html = render_model(&renderer, "errors/500.html", &json!({"status": 500})).unwrap();
        assert_eq!(html, "oops 500");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
