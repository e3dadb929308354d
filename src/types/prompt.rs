//! Prompt field types

use serde::{Deserialize, Serialize};

/// The three text fields of a prompt under estimation.
///
/// Fields are free-form text supplied by the caller; the counter keeps no
/// reference to them beyond its cache keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFields {
    /// System instructions.
    pub system_text: String,
    /// User message.
    pub user_text: String,
    /// Assistant prefill.
    pub assistant_text: String,
}

impl PromptFields {
    /// Create prompt fields from the three role texts.
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        assistant: impl Into<String>,
    ) -> Self {
        Self {
            system_text: system.into(),
            user_text: user.into(),
            assistant_text: assistant.into(),
        }
    }

    /// A prompt holding only a system text.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            system_text: content.into(),
            ..Self::default()
        }
    }

    /// A prompt holding only a user text.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            user_text: content.into(),
            ..Self::default()
        }
    }

    /// The three texts in system, user, assistant order.
    pub fn texts(&self) -> [&str; 3] {
        [&self.system_text, &self.user_text, &self.assistant_text]
    }

    /// Whether all three fields are empty.
    pub fn is_empty(&self) -> bool {
        self.system_text.is_empty() && self.user_text.is_empty() && self.assistant_text.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_constructors() {
        let fields = PromptFields::system("sys");
        assert_eq!(fields.system_text, "sys");
        assert!(fields.user_text.is_empty());

        let fields = PromptFields::user("usr");
        assert_eq!(fields.user_text, "usr");
        assert!(fields.system_text.is_empty());
    }

    #[test]
    fn texts_in_role_order() {
        let fields = PromptFields::new("a", "b", "c");
        assert_eq!(fields.texts(), ["a", "b", "c"]);
    }

    #[test]
    fn is_empty_requires_all_fields_empty() {
        assert!(PromptFields::default().is_empty());
        assert!(!PromptFields::user("x").is_empty());
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let fields = PromptFields::new("s", "u", "");
        let json = serde_json::to_value(&fields).unwrap();
        assert_eq!(json["systemText"], "s");
        assert_eq!(json["userText"], "u");
        assert_eq!(json["assistantText"], "");
    }
}
