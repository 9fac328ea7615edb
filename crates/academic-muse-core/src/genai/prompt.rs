use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::storage::keys;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcademicLevel {
    #[default]
    Bachelors,
    Diploma,
    Research,
    Phd,
    Masters,
    Competitive,
}

impl AcademicLevel {
    pub const ALL: [AcademicLevel; 6] = [
        AcademicLevel::Bachelors,
        AcademicLevel::Diploma,
        AcademicLevel::Research,
        AcademicLevel::Phd,
        AcademicLevel::Masters,
        AcademicLevel::Competitive,
    ];

    pub fn id(self) -> &'static str {
        match self {
            AcademicLevel::Bachelors => "bachelors",
            AcademicLevel::Diploma => "diploma",
            AcademicLevel::Research => "research",
            AcademicLevel::Phd => "phd",
            AcademicLevel::Masters => "masters",
            AcademicLevel::Competitive => "competitive",
        }
    }

    /// Name used inside prompts.
    pub fn name(self) -> &'static str {
        match self {
            AcademicLevel::Bachelors => "Bachelors",
            AcademicLevel::Diploma => "Diploma",
            AcademicLevel::Research => "Research",
            AcademicLevel::Phd => "PhD",
            AcademicLevel::Masters => "Masters",
            AcademicLevel::Competitive => "Competitive Exam",
        }
    }
}

impl fmt::Display for AcademicLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for AcademicLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|l| l.id() == wanted || l.name().to_ascii_lowercase() == wanted)
            .ok_or_else(|| {
                let ids: Vec<_> = Self::ALL.iter().map(|l| l.id()).collect();
                format!("unknown level '{s}' (expected one of: {})", ids.join(", "))
            })
    }
}

/// One of the three prompt templates.
#[derive(Debug, Clone, PartialEq)]
pub enum Prompt {
    TopicExplanation { topic: String, level: AcademicLevel },
    KeyTakeaways { topic: String, level: AcademicLevel },
    ComprehensionFeedback { text: String },
}

impl Prompt {
    /// Build a prompt, rejecting blank input before any request is made.
    pub fn topic_explanation(topic: &str, level: AcademicLevel) -> Result<Self, ValidationError> {
        Ok(Prompt::TopicExplanation {
            topic: non_blank(topic, ValidationError::EmptyTopic)?,
            level,
        })
    }

    pub fn key_takeaways(topic: &str, level: AcademicLevel) -> Result<Self, ValidationError> {
        Ok(Prompt::KeyTakeaways {
            topic: non_blank(topic, ValidationError::EmptyTopic)?,
            level,
        })
    }

    pub fn comprehension_feedback(text: &str) -> Result<Self, ValidationError> {
        Ok(Prompt::ComprehensionFeedback {
            text: non_blank(text, ValidationError::EmptyExplanation)?,
        })
    }

    pub fn temperature(&self) -> f64 {
        match self {
            Prompt::TopicExplanation { .. } => 0.4,
            Prompt::KeyTakeaways { .. } | Prompt::ComprehensionFeedback { .. } => 0.7,
        }
    }

    /// Store key holding the last text generated for this widget.
    pub fn storage_key(&self) -> &'static str {
        match self {
            Prompt::TopicExplanation { .. } => keys::TOPIC_EXPLANATION,
            Prompt::KeyTakeaways { .. } => keys::KEY_POINTS,
            Prompt::ComprehensionFeedback { .. } => keys::UNDERSTANDING_FEEDBACK,
        }
    }

    pub fn render(&self) -> String {
        match self {
            Prompt::TopicExplanation { topic, level } => format!(
                "Explain the topic \"{topic}\" at a {level} education level in about 2000 words.\n\
                 Write as an internationally recognized educator with extensive experience teaching this subject.\n\
                 Start with a detailed overview of the basics and core concepts of \"{topic}\", then go deeper.\n\
                 Keep it engaging, informative and thorough so the reader gains a deep understanding \
                 and feels confident mastering the topic."
            ),
            Prompt::KeyTakeaways { topic, level } => format!(
                "For the topic \"{topic}\" at a {level} education level, provide the following:\n\
                 1. Key Points: List the most important aspects.\n\
                 2. Important Takeaways: Summarize the essential conclusions.\n\
                 3. Acronyms: Define common acronyms related to the topic.\n\
                 4. Learning Hacks: Suggest memory aids or study techniques to master this topic.\n\
                 5. Additional Resources: Recommend relevant free courses, official documentation and \
                 video tutorials, formatted as - Platform: Course Name (with a link)."
            ),
            Prompt::ComprehensionFeedback { text } => format!(
                "Evaluate the following explanation of a topic using SWOT analysis.\n\
                 Provide detailed feedback including:\n\
                 - **Strengths:** What are the strong points of this explanation?\n\
                 - **Weaknesses:** What areas need improvement?\n\
                 - **Opportunities:** What further aspects can be explored to enhance understanding?\n\
                 - **Threats:** What potential misunderstandings or issues might arise?\n\
                 Also highlight the key points and offer actionable suggestions for improvement.\n\
                 \n\
                 Explanation:\n{text}"
            ),
        }
    }
}

fn non_blank(raw: &str, err: ValidationError) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(err)
    } else {
        Ok(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parses_ids_and_names() {
        assert_eq!("phd".parse::<AcademicLevel>().unwrap(), AcademicLevel::Phd);
        assert_eq!(
            "Competitive Exam".parse::<AcademicLevel>().unwrap(),
            AcademicLevel::Competitive
        );
        assert!("kindergarten".parse::<AcademicLevel>().is_err());
    }

    #[test]
    fn blank_input_is_rejected() {
        assert_eq!(
            Prompt::topic_explanation("   ", AcademicLevel::Masters),
            Err(ValidationError::EmptyTopic)
        );
        assert_eq!(
            Prompt::comprehension_feedback(""),
            Err(ValidationError::EmptyExplanation)
        );
    }

    #[test]
    fn templates_substitute_inputs() {
        let p = Prompt::topic_explanation("Entropy", AcademicLevel::Phd).unwrap();
        let text = p.render();
        assert!(text.contains("\"Entropy\" at a PhD education level"));
        assert_eq!(p.temperature(), 0.4);
        assert_eq!(p.storage_key(), "topicExplanation");

        let p = Prompt::key_takeaways("Graphs", AcademicLevel::Diploma).unwrap();
        assert!(p.render().contains("Learning Hacks"));
        assert_eq!(p.storage_key(), "topicContent");

        let p = Prompt::comprehension_feedback("Cells divide by mitosis.").unwrap();
        assert!(p.render().ends_with("Explanation:\nCells divide by mitosis."));
        assert_eq!(p.temperature(), 0.7);
    }
}
