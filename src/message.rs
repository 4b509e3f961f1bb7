use serde_json::Value;

/// Who a chat bubble belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

/// Where an answer came from: the uploaded document or the generative fallback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerSource {
    File,
    Llm,
}

impl AnswerSource {
    /// Read the backend's `source` field. Empty or falsy values carry no
    /// tag, `"file"` is the document, anything else counts as the LLM.
    pub fn from_json(value: &Value) -> Option<Self> {
        let present = match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        };
        if !present {
            return None;
        }
        match value.as_str() {
            Some("file") => Some(AnswerSource::File),
            _ => Some(AnswerSource::Llm),
        }
    }

    pub fn tag(&self) -> &'static str {
        match self {
            AnswerSource::File => "from file",
            AnswerSource::Llm => "from llm",
        }
    }
}

/// One rendered bubble in the chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: Role,
    pub text: String,
    pub source: Option<AnswerSource>,
    pub small: bool,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
            source: None,
            small: false,
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            text: text.into(),
            source: None,
            small: false,
        }
    }

    pub fn with_source(mut self, source: Option<AnswerSource>) -> Self {
        self.source = source;
        self
    }

    pub fn small(mut self) -> Self {
        self.small = true;
        self
    }

    /// Source tag shown on the bubble. User bubbles never carry one.
    pub fn tag(&self) -> Option<&'static str> {
        match self.role {
            Role::User => None,
            Role::Assistant => self.source.map(|s| s.tag()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_unknown_source_is_llm() {
        assert_eq!(AnswerSource::from_json(&json!("web")), Some(AnswerSource::Llm));
        assert_eq!(AnswerSource::from_json(&json!("file")), Some(AnswerSource::File));
        assert_eq!(AnswerSource::from_json(&json!(5)), Some(AnswerSource::Llm));
        assert_eq!(AnswerSource::from_json(&json!(true)), Some(AnswerSource::Llm));
    }

    #[test]
    fn test_falsy_source_has_no_tag() {
        for value in [json!(""), json!(null), json!(false), json!(0)] {
            assert_eq!(AnswerSource::from_json(&value), None, "{value}");
        }
    }

    #[test]
    fn test_user_message_has_no_tag() {
        let msg = Message::user("hello").with_source(Some(AnswerSource::File));
        assert_eq!(msg.tag(), None);

        let msg = Message::assistant("hi").with_source(Some(AnswerSource::File));
        assert_eq!(msg.tag(), Some("from file"));
    }
}
