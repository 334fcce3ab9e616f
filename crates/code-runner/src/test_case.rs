use serde_json::Value;

/// Method invoked when the metadata does not name one.
pub const DEFAULT_METHOD_NAME: &str = "solution";

/// The sample case attached to a problem. Read-only input to the runner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestSpec {
    /// Newline-separated argument literals.
    pub test_case: Option<String>,
    /// JSON object naming the method under test.
    pub meta_data: Option<String>,
}

impl TestSpec {
    pub fn new(test_case: Option<&str>, meta_data: Option<&str>) -> Self {
        Self {
            test_case: test_case.map(str::to_string),
            meta_data: meta_data.map(str::to_string),
        }
    }

    /// Both parts are present and not blank.
    pub fn is_runnable(&self) -> bool {
        let present = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        present(&self.test_case) && present(&self.meta_data)
    }
}

/// Interprets one line of a sample case.
///
/// Lines that look structured (leading `[` or `{`) are parsed as JSON. Other
/// lines are accepted when they are a JSON scalar (`9`, `-1.5`, `true`,
/// `null`, `"abc"`). Anything that fails to parse is passed on verbatim as a
/// string, so a malformed line never aborts the run.
pub fn parse_argument_literal(line: &str) -> Value {
    let trimmed = line.trim();
    let looks_structured = trimmed.starts_with('[') || trimmed.starts_with('{');
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value) if looks_structured => value,
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null | Value::String(_))) => value,
        _ => Value::String(line.to_string()),
    }
}

/// Splits a raw sample case into the positional argument list.
///
/// The block is trimmed first, so leading and trailing blank lines are
/// dropped while interior blank lines stay as empty-string arguments.
pub fn parse_test_case(raw: &str) -> Vec<Value> {
    raw.trim()
        .split('\n')
        .map(|line| parse_argument_literal(line.strip_suffix('\r').unwrap_or(line)))
        .collect()
}

/// Reads the method name out of the problem metadata.
///
/// Malformed JSON or a non-object document is an error; a missing or
/// non-string `name` falls back to [`DEFAULT_METHOD_NAME`].
pub fn method_name(meta_data: &str) -> Result<String, String> {
    let meta: Value =
        serde_json::from_str(meta_data).map_err(|e| format!("invalid metadata JSON: {}", e))?;
    let object = meta
        .as_object()
        .ok_or_else(|| "metadata must be a JSON object".to_string())?;
    Ok(object
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_METHOD_NAME)
        .to_string())
}
