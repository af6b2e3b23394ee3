//! Two-pass template renderer.

use relayci_core::config::TemplateFormat;
use relayci_core::event::EventRecord;
use serde_json::Value;

use crate::placeholder;
use crate::plan::{self, TestPlan};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A `[[` delimiter with no matching `]]`, or a nested delimiter.
    #[error("template placeholder syntax error: {0}")]
    TemplateSyntax(String),

    /// A required key of the test-plan tree is absent or has the wrong
    /// shape. Carries the name of the offending key.
    #[error("job descriptor is missing or has a malformed {0:?} key")]
    InvalidShape(&'static str),

    #[error("template is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),

    #[error("invalid JSON job template: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid YAML job template: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// Turns a job template into a concrete job descriptor.
///
/// Pass one substitutes `[[NAME]]` placeholders at the text level; pass
/// two parses the result (JSON or YAML per the configured format),
/// rewrites the checkout step's `args` from the event record, and
/// re-serializes to pretty-printed JSON. The output format is always
/// JSON so the execution server only ever sees one wire format.
#[derive(Debug, Clone)]
pub struct Renderer {
    format: TemplateFormat,
    checkout_label: String,
}

impl Renderer {
    pub fn new(format: TemplateFormat, checkout_label: impl Into<String>) -> Self {
        Self {
            format,
            checkout_label: checkout_label.into(),
        }
    }

    /// Render a template into a submission-ready JSON descriptor.
    pub fn render(&self, template: &[u8], event: &EventRecord) -> Result<String, RenderError> {
        let text = std::str::from_utf8(template)?;
        let substituted = placeholder::substitute(text, event)?;
        let value = self.parse(substituted.as_bytes())?;
        let mut plan = TestPlan::from_value(value)?;
        plan.rewrite_checkout_args(&self.checkout_label, event);
        Ok(serde_json::to_string_pretty(&plan.into_value())?)
    }

    /// Extract the top-level `JobName` from a template.
    ///
    /// Placeholders are substituted first, so the returned name is the
    /// one the submitted descriptor will carry.
    pub fn job_name(&self, template: &[u8], event: &EventRecord) -> Result<String, RenderError> {
        let text = std::str::from_utf8(template)?;
        let substituted = placeholder::substitute(text, event)?;
        let value = self.parse(substituted.as_bytes())?;
        let plan = TestPlan::from_value(value)?;
        plan.job_name
            .ok_or(RenderError::InvalidShape(plan::KEY_JOB_NAME))
    }

    fn parse(&self, bytes: &[u8]) -> Result<Value, RenderError> {
        match self.format {
            TemplateFormat::Json => Ok(serde_json::from_slice(bytes)?),
            TemplateFormat::Yaml => Ok(serde_yaml_ng::from_slice(bytes)?),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const SHA: &str = "deadbeefdeadbeefdeadbeefdeadbeefdeadbeef";

    fn event() -> EventRecord {
        EventRecord::new(SHA, "git@example.com:org/repo.git", "main").unwrap()
    }

    fn template_json() -> String {
        json!({
            "JobName": "firmware-smoke",
            "TestDescriptors": [{
                "TestFetcherFetchParameters": {
                    "Steps": [
                        {
                            "label": "checkout",
                            "parameters": { "args": ["", "", ""] }
                        },
                        {
                            "label": "build",
                            "parameters": { "args": ["make", "all"] }
                        }
                    ]
                }
            }]
        })
        .to_string()
    }

    #[test]
    fn render_rewrites_checkout_args() {
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let out = renderer.render(template_json().as_bytes(), &event()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let args = &value["TestDescriptors"][0]["TestFetcherFetchParameters"]["Steps"][0]
            ["parameters"]["args"];
        assert_eq!(args[1], SHA);
        assert_eq!(args[2], "git@example.com:org/repo.git");
        // Non-matching steps are untouched.
        let build_args = &value["TestDescriptors"][0]["TestFetcherFetchParameters"]["Steps"][1]
            ["parameters"]["args"];
        assert_eq!(build_args[0], "make");
        assert_eq!(build_args[1], "all");
    }

    #[test]
    fn render_substitutes_sha_placeholder() {
        let template = json!({
            "JobName": "pr-[[SHA]]",
            "TestDescriptors": [{
                "TestFetcherFetchParameters": { "Steps": [] }
            }]
        })
        .to_string();
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let out = renderer.render(template.as_bytes(), &event()).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["JobName"], format!("pr-{SHA}"));
    }

    #[test]
    fn render_is_idempotent() {
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let once = renderer.render(template_json().as_bytes(), &event()).unwrap();
        let twice = renderer.render(once.as_bytes(), &event()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn yaml_template_normalized_to_json() {
        let template = "\
JobName: firmware-smoke
TestDescriptors:
  - TestFetcherFetchParameters:
      Steps:
        - label: checkout
          parameters:
            args: [\"\", \"\", \"\"]
";
        let renderer = Renderer::new(TemplateFormat::Yaml, "checkout");
        let out = renderer.render(template.as_bytes(), &event()).unwrap();
        // Output parses as JSON with the rewrite applied.
        let value: Value = serde_json::from_str(&out).unwrap();
        let args = &value["TestDescriptors"][0]["TestFetcherFetchParameters"]["Steps"][0]
            ["parameters"]["args"];
        assert_eq!(args[1], SHA);
    }

    #[test]
    fn job_name_from_json_and_yaml() {
        let json_renderer = Renderer::new(TemplateFormat::Json, "checkout");
        assert_eq!(
            json_renderer
                .job_name(template_json().as_bytes(), &event())
                .unwrap(),
            "firmware-smoke"
        );

        let yaml_renderer = Renderer::new(TemplateFormat::Yaml, "checkout");
        let yaml = "JobName: yaml-job\nTestDescriptors:\n  - TestFetcherFetchParameters:\n      Steps: []\n";
        assert_eq!(
            yaml_renderer.job_name(yaml.as_bytes(), &event()).unwrap(),
            "yaml-job"
        );
    }

    #[test]
    fn job_name_reflects_placeholder_substitution() {
        let template = json!({
            "JobName": "pr-[[SHA]]",
            "TestDescriptors": [{
                "TestFetcherFetchParameters": { "Steps": [] }
            }]
        })
        .to_string();
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        assert_eq!(
            renderer.job_name(template.as_bytes(), &event()).unwrap(),
            format!("pr-{SHA}")
        );
    }

    #[test]
    fn missing_job_name_is_shape_error() {
        let template = json!({
            "TestDescriptors": [{
                "TestFetcherFetchParameters": { "Steps": [] }
            }]
        })
        .to_string();
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let err = renderer.job_name(template.as_bytes(), &event()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("JobName")));
    }

    #[test]
    fn missing_test_descriptors_is_shape_error() {
        let template = json!({ "JobName": "x" }).to_string();
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let err = renderer.render(template.as_bytes(), &event()).unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("TestDescriptors")));
    }

    #[test]
    fn invalid_json_reported() {
        let renderer = Renderer::new(TemplateFormat::Json, "checkout");
        let err = renderer.render(b"{not json", &event()).unwrap_err();
        assert!(matches!(err, RenderError::Json(_)));
    }
}
