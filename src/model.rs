use serde::{Deserialize, Serialize};

use crate::Challenge;

/// One piece of a page in reading order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    Text {
        content: String,
    },
    Image {
        src: String,
        local_path: String,
        #[serde(default)]
        alt: String,
        #[serde(default)]
        width: Option<String>,
        #[serde(default)]
        height: Option<String>,
    },
    LineBreak,
    /// Markup the walker does not model, kept verbatim.
    #[serde(rename = "html")]
    RawFragment {
        #[serde(rename = "content")]
        visible_text: String,
        #[serde(rename = "html")]
        serialized_markup: String,
        #[serde(rename = "tag")]
        tag_name: String,
    },
}

impl ContentItem {
    pub fn text(content: impl Into<String>) -> Self {
        ContentItem::Text {
            content: content.into(),
        }
    }

    /// Text that takes part in answer-choice matching.
    pub fn searchable_text(&self) -> Option<&str> {
        match self {
            ContentItem::Text { content } => Some(content),
            ContentItem::RawFragment { visible_text, .. } => Some(visible_text),
            _ => None,
        }
    }

    pub fn image_alt(&self) -> Option<&str> {
        match self {
            ContentItem::Image { alt, .. } => Some(alt),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChoiceSource {
    #[default]
    Text,
    ImageAlt,
}

impl ChoiceSource {
    fn is_text(&self) -> bool {
        matches!(self, ChoiceSource::Text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerChoice {
    pub letter: char,
    pub text: String,
    #[serde(default, skip_serializing_if = "ChoiceSource::is_text")]
    pub source: ChoiceSource,
}

impl AnswerChoice {
    pub fn new(letter: char, text: impl Into<String>, source: ChoiceSource) -> Self {
        Self {
            letter,
            text: text.into(),
            source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolutionRecord {
    /// The number declared in the source heading, not the output position.
    #[serde(rename = "number", alias = "index")]
    pub index: u32,
    pub content: Vec<ContentItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub number: u32,
    pub content: Vec<ContentItem>,
    pub answer_choices: Vec<AnswerChoice>,
    #[serde(default)]
    pub solutions: Vec<SolutionRecord>,
    pub year: u32,
    pub contest_type: Challenge,
    pub contest_name: String,
}

impl ProblemRecord {
    /// Key used by the rendering and labeling consumers.
    pub fn key(&self) -> String {
        format!("{}/{}/problem_{}", self.contest_type, self.year, self.number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> ProblemRecord {
        ProblemRecord {
            number: 7,
            content: vec![
                ContentItem::text("How many"),
                ContentItem::Image {
                    src: "//latex.artofproblemsolving.com/a/b.png".into(),
                    local_path: "images/problem_7_problem_0.png".into(),
                    alt: "$x^2$".into(),
                    width: Some("27".into()),
                    height: None,
                },
                ContentItem::LineBreak,
                ContentItem::RawFragment {
                    visible_text: "bold".into(),
                    serialized_markup: "<b>bold</b>".into(),
                    tag_name: "b".into(),
                },
            ],
            answer_choices: vec![
                AnswerChoice::new('A', "5", ChoiceSource::Text),
                AnswerChoice::new('B', "10", ChoiceSource::ImageAlt),
            ],
            solutions: vec![SolutionRecord {
                index: 2,
                content: vec![ContentItem::text("Count.")],
            }],
            year: 2021,
            contest_type: Challenge::Amc10a,
            contest_name: "AMC 10A".into(),
        }
    }

    #[test]
    fn record_should_serialize_to_stored_shape() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["content"][0], json!({"type": "text", "content": "How many"}));
        assert_eq!(value["content"][1]["type"], "image");
        assert_eq!(value["content"][1]["local_path"], "images/problem_7_problem_0.png");
        assert_eq!(value["content"][2], json!({"type": "line_break"}));
        assert_eq!(
            value["content"][3],
            json!({"type": "html", "content": "bold", "html": "<b>bold</b>", "tag": "b"})
        );
        assert_eq!(value["answer_choices"][0], json!({"letter": "A", "text": "5"}));
        assert_eq!(
            value["answer_choices"][1],
            json!({"letter": "B", "text": "10", "source": "image_alt"})
        );
        assert_eq!(value["solutions"][0]["number"], 2);
        assert_eq!(value["contest_type"], "AMC10A");
    }

    #[test]
    fn record_should_survive_json_round_trip() {
        let record = sample();
        let json = serde_json::to_string_pretty(&record).unwrap();
        let parsed: ProblemRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }

    #[test]
    fn record_should_accept_sparse_input() {
        let parsed: ProblemRecord = serde_json::from_value(json!({
            "number": 1,
            "content": [{"type": "image", "src": "a.png", "local_path": "images/a.png"}],
            "answer_choices": [],
            "solutions": [{"index": 1, "content": []}],
            "year": 2020,
            "contest_type": "AMC8",
            "contest_name": "AMC 8"
        }))
        .unwrap();

        assert_eq!(parsed.content[0].image_alt(), Some(""));
        assert_eq!(parsed.solutions[0].index, 1);
        assert_eq!(parsed.key(), "AMC8/2020/problem_1");
    }
}
