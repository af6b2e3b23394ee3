//! Typed test-plan tree.
//!
//! The template's interesting spine is
//! `TestDescriptors[*].TestFetcherFetchParameters.Steps[*]`; everything
//! else is opaque and must survive a parse/serialize round trip
//! untouched. Each level keeps its unrecognized keys in a `rest` map so
//! re-serialization loses nothing. Parsing fails closed: a missing or
//! wrong-shaped spine key is reported by name instead of being skipped.

use relayci_core::event::EventRecord;
use serde_json::{Map, Value};

use crate::renderer::RenderError;

pub const KEY_JOB_NAME: &str = "JobName";
pub const KEY_TEST_DESCRIPTORS: &str = "TestDescriptors";
pub const KEY_FETCH_PARAMETERS: &str = "TestFetcherFetchParameters";
pub const KEY_STEPS: &str = "Steps";
const KEY_LABEL: &str = "label";
const KEY_PARAMETERS: &str = "parameters";
const KEY_ARGS: &str = "args";

/// Fixed `args` positions overwritten by the structural rewrite. The
/// rewrite only overwrites existing slots, never appends, so applying
/// it twice with the same event yields identical output.
const ARG_INDEX_COMMIT_SHA: usize = 1;
const ARG_INDEX_REPO_URL: usize = 2;

// ---------------------------------------------------------------------------
// Tree types
// ---------------------------------------------------------------------------

/// Root of a parsed job template.
#[derive(Debug, Clone)]
pub struct TestPlan {
    pub job_name: Option<String>,
    pub test_descriptors: Vec<TestDescriptor>,
    rest: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct TestDescriptor {
    pub fetch_parameters: FetchParameters,
    rest: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct FetchParameters {
    pub steps: Vec<Step>,
    rest: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub label: Option<String>,
    pub parameters: Option<StepParameters>,
    rest: Map<String, Value>,
}

#[derive(Debug, Clone)]
pub struct StepParameters {
    pub args: Option<Vec<Value>>,
    rest: Map<String, Value>,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn as_object(value: Value, key: &'static str) -> Result<Map<String, Value>, RenderError> {
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(RenderError::InvalidShape(key)),
    }
}

impl TestPlan {
    /// Parse a template value, failing closed on a malformed spine.
    pub fn from_value(value: Value) -> Result<Self, RenderError> {
        let mut root = as_object(value, KEY_TEST_DESCRIPTORS)?;

        let job_name = match root.remove(KEY_JOB_NAME) {
            None => None,
            Some(Value::String(s)) => Some(s),
            Some(_) => return Err(RenderError::InvalidShape(KEY_JOB_NAME)),
        };

        let descriptors = match root
            .remove(KEY_TEST_DESCRIPTORS)
            .ok_or(RenderError::InvalidShape(KEY_TEST_DESCRIPTORS))?
        {
            Value::Array(items) => items,
            _ => return Err(RenderError::InvalidShape(KEY_TEST_DESCRIPTORS)),
        };
        let test_descriptors = descriptors
            .into_iter()
            .map(TestDescriptor::from_value)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            job_name,
            test_descriptors,
            rest: root,
        })
    }

    /// Reassemble the tree into a JSON value.
    pub fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(name) = self.job_name {
            map.insert(KEY_JOB_NAME.to_string(), Value::String(name));
        }
        map.insert(
            KEY_TEST_DESCRIPTORS.to_string(),
            Value::Array(
                self.test_descriptors
                    .into_iter()
                    .map(TestDescriptor::into_value)
                    .collect(),
            ),
        );
        map.extend(self.rest);
        Value::Object(map)
    }

    /// Rewrite the `args` of every step in the first test descriptor
    /// whose label equals `label`, overwriting the fixed positions with
    /// event data. Returns the number of steps rewritten; zero matches
    /// is not an error.
    pub fn rewrite_checkout_args(&mut self, label: &str, event: &EventRecord) -> usize {
        let Some(first) = self.test_descriptors.first_mut() else {
            return 0;
        };
        let mut rewritten = 0;
        for step in &mut first.fetch_parameters.steps {
            if step.label.as_deref() != Some(label) {
                continue;
            }
            let Some(params) = step.parameters.as_mut() else {
                continue;
            };
            let Some(args) = params.args.as_mut() else {
                continue;
            };
            if let Some(slot) = args.get_mut(ARG_INDEX_COMMIT_SHA) {
                *slot = Value::String(event.head_commit.clone());
            }
            if let Some(slot) = args.get_mut(ARG_INDEX_REPO_URL) {
                *slot = Value::String(event.repo_url.clone());
            }
            rewritten += 1;
        }
        rewritten
    }
}

impl TestDescriptor {
    fn from_value(value: Value) -> Result<Self, RenderError> {
        let mut map = as_object(value, KEY_TEST_DESCRIPTORS)?;
        let fetch = map
            .remove(KEY_FETCH_PARAMETERS)
            .ok_or(RenderError::InvalidShape(KEY_FETCH_PARAMETERS))?;
        Ok(Self {
            fetch_parameters: FetchParameters::from_value(fetch)?,
            rest: map,
        })
    }

    fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert(
            KEY_FETCH_PARAMETERS.to_string(),
            self.fetch_parameters.into_value(),
        );
        map.extend(self.rest);
        Value::Object(map)
    }
}

impl FetchParameters {
    fn from_value(value: Value) -> Result<Self, RenderError> {
        let mut map = as_object(value, KEY_FETCH_PARAMETERS)?;
        let steps = match map
            .remove(KEY_STEPS)
            .ok_or(RenderError::InvalidShape(KEY_STEPS))?
        {
            Value::Array(items) => items,
            _ => return Err(RenderError::InvalidShape(KEY_STEPS)),
        };
        let steps = steps
            .into_iter()
            .map(Step::from_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { steps, rest: map })
    }

    fn into_value(self) -> Value {
        let mut map = Map::new();
        map.insert(
            KEY_STEPS.to_string(),
            Value::Array(self.steps.into_iter().map(Step::into_value).collect()),
        );
        map.extend(self.rest);
        Value::Object(map)
    }
}

impl Step {
    fn from_value(value: Value) -> Result<Self, RenderError> {
        let mut map = as_object(value, KEY_STEPS)?;

        // label and parameters are optional; wrong-typed values stay in
        // rest and the step is simply never matched.
        let label = match map.remove(KEY_LABEL) {
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                map.insert(KEY_LABEL.to_string(), other);
                None
            }
            None => None,
        };
        let parameters = match map.remove(KEY_PARAMETERS) {
            Some(Value::Object(inner)) => Some(StepParameters::from_map(inner)),
            Some(other) => {
                map.insert(KEY_PARAMETERS.to_string(), other);
                None
            }
            None => None,
        };

        Ok(Self {
            label,
            parameters,
            rest: map,
        })
    }

    fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(label) = self.label {
            map.insert(KEY_LABEL.to_string(), Value::String(label));
        }
        if let Some(parameters) = self.parameters {
            map.insert(KEY_PARAMETERS.to_string(), parameters.into_value());
        }
        map.extend(self.rest);
        Value::Object(map)
    }
}

impl StepParameters {
    fn from_map(mut map: Map<String, Value>) -> Self {
        let args = match map.remove(KEY_ARGS) {
            Some(Value::Array(items)) => Some(items),
            Some(other) => {
                map.insert(KEY_ARGS.to_string(), other);
                None
            }
            None => None,
        };
        Self { args, rest: map }
    }

    fn into_value(self) -> Value {
        let mut map = Map::new();
        if let Some(args) = self.args {
            map.insert(KEY_ARGS.to_string(), Value::Array(args));
        }
        map.extend(self.rest);
        Value::Object(map)
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

    fn plan_with_steps(steps: Value) -> TestPlan {
        TestPlan::from_value(json!({
            "JobName": "smoke",
            "TestDescriptors": [{
                "TestFetcherFetchParameters": { "Steps": steps }
            }]
        }))
        .unwrap()
    }

    #[test]
    fn missing_test_descriptors_named() {
        let err = TestPlan::from_value(json!({ "JobName": "x" })).unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("TestDescriptors")));
    }

    #[test]
    fn wrong_shape_test_descriptors_named() {
        let err = TestPlan::from_value(json!({ "TestDescriptors": "nope" })).unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("TestDescriptors")));
    }

    #[test]
    fn missing_fetch_parameters_named() {
        let err = TestPlan::from_value(json!({ "TestDescriptors": [{}] })).unwrap_err();
        assert!(matches!(
            err,
            RenderError::InvalidShape("TestFetcherFetchParameters")
        ));
    }

    #[test]
    fn missing_steps_named() {
        let err = TestPlan::from_value(json!({
            "TestDescriptors": [{ "TestFetcherFetchParameters": {} }]
        }))
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("Steps")));
    }

    #[test]
    fn non_array_steps_named() {
        let err = TestPlan::from_value(json!({
            "TestDescriptors": [{ "TestFetcherFetchParameters": { "Steps": 7 } }]
        }))
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("Steps")));
    }

    #[test]
    fn non_string_job_name_named() {
        let err = TestPlan::from_value(json!({
            "JobName": 42,
            "TestDescriptors": []
        }))
        .unwrap_err();
        assert!(matches!(err, RenderError::InvalidShape("JobName")));
    }

    #[test]
    fn rewrite_overwrites_fixed_positions() {
        let mut plan = plan_with_steps(json!([
            { "label": "checkout", "parameters": { "args": ["a", "b", "c", "d"] } }
        ]));
        let count = plan.rewrite_checkout_args("checkout", &event());
        assert_eq!(count, 1);
        let value = plan.into_value();
        let args = &value["TestDescriptors"][0]["TestFetcherFetchParameters"]["Steps"][0]
            ["parameters"]["args"];
        assert_eq!(args[0], "a");
        assert_eq!(args[1], SHA);
        assert_eq!(args[2], "git@example.com:org/repo.git");
        assert_eq!(args[3], "d");
    }

    #[test]
    fn rewrite_never_appends() {
        let mut plan = plan_with_steps(json!([
            { "label": "checkout", "parameters": { "args": ["only"] } }
        ]));
        plan.rewrite_checkout_args("checkout", &event());
        let value = plan.into_value();
        let args = value["TestDescriptors"][0]["TestFetcherFetchParameters"]["Steps"][0]
            ["parameters"]["args"]
            .as_array()
            .unwrap();
        assert_eq!(args.len(), 1);
        assert_eq!(args[0], "only");
    }

    #[test]
    fn rewrite_matches_all_steps_with_label() {
        let mut plan = plan_with_steps(json!([
            { "label": "checkout", "parameters": { "args": ["", "", ""] } },
            { "label": "build" },
            { "label": "checkout", "parameters": { "args": ["", "", ""] } }
        ]));
        assert_eq!(plan.rewrite_checkout_args("checkout", &event()), 2);
    }

    #[test]
    fn zero_matches_is_noop() {
        let mut plan = plan_with_steps(json!([
            { "label": "build", "parameters": { "args": ["make"] } }
        ]));
        assert_eq!(plan.rewrite_checkout_args("checkout", &event()), 0);
    }

    #[test]
    fn step_without_parameters_skipped() {
        let mut plan = plan_with_steps(json!([{ "label": "checkout" }]));
        assert_eq!(plan.rewrite_checkout_args("checkout", &event()), 0);
    }

    #[test]
    fn unknown_keys_survive_round_trip() {
        let input = json!({
            "JobName": "smoke",
            "Reporting": { "RunReporters": [{ "Name": "TargetSuccess" }] },
            "TestDescriptors": [{
                "TargetManagerName": "CSVFileTargetManager",
                "TestFetcherFetchParameters": {
                    "Extra": true,
                    "Steps": [
                        { "label": "checkout", "note": 1, "parameters": { "args": [], "env": {} } }
                    ]
                }
            }]
        });
        let plan = TestPlan::from_value(input.clone()).unwrap();
        assert_eq!(plan.into_value(), input);
    }

    #[test]
    fn rewrite_only_walks_first_descriptor() {
        let mut plan = TestPlan::from_value(json!({
            "TestDescriptors": [
                { "TestFetcherFetchParameters": { "Steps": [] } },
                { "TestFetcherFetchParameters": { "Steps": [
                    { "label": "checkout", "parameters": { "args": ["", "", ""] } }
                ] } }
            ]
        }))
        .unwrap();
        assert_eq!(plan.rewrite_checkout_args("checkout", &event()), 0);
    }
}
