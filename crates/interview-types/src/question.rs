use serde::{Deserialize, Deserializer};

/// The setup chosen by the candidate before the session starts.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    pub difficulty: String,
    pub topic: String,
    pub persona: String,
}

impl SessionConfig {
    pub fn new(difficulty: &str, topic: &str, persona: &str) -> Self {
        Self {
            difficulty: difficulty.to_string(),
            topic: topic.to_string(),
            persona: persona.to_string(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new("Medium", "Array", "Neutral")
    }
}

/// A coding problem as delivered by the backend.
///
/// Every field is optional on the wire. `test_case` and `meta_data` are kept
/// as raw text; the backend may send `meta_data` either as a JSON string or as
/// an inline object, and both end up here as JSON text.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub markdown_content: Option<String>,
    #[serde(default)]
    pub starter_code: Option<String>,
    #[serde(default, deserialize_with = "text_or_json")]
    pub test_case: Option<String>,
    #[serde(default, deserialize_with = "text_or_json")]
    pub meta_data: Option<String>,
}

impl Question {
    pub fn builder() -> QuestionBuilder {
        QuestionBuilder::new()
    }
}

pub struct QuestionBuilder {
    question: Question,
}

impl QuestionBuilder {
    pub fn new() -> Self {
        Self {
            question: Question::default(),
        }
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.question.title = Some(title.to_string());
        self
    }

    pub fn with_starter_code(mut self, code: &str) -> Self {
        self.question.starter_code = Some(code.to_string());
        self
    }

    pub fn with_test_case(mut self, test_case: &str) -> Self {
        self.question.test_case = Some(test_case.to_string());
        self
    }

    pub fn with_meta_data(mut self, meta_data: &str) -> Self {
        self.question.meta_data = Some(meta_data.to_string());
        self
    }

    pub fn build(self) -> Question {
        self.question
    }
}

impl Default for QuestionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn text_or_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
