//! Template rendering for HTML error pages.

pub mod engine;

pub use engine::{TemplateRenderer, TeraRenderer, render_model};
