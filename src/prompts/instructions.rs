// file: src/prompts/instructions.rs
// description: instruction blocks injected into prompt templates per generation option
// reference: CEFR descriptors and Bloom's taxonomy question stems

use crate::models::{
    BloomsLevel, CefrLevel, CefrTier, EngagementLevel, LevelBand, TopicConsistency,
};

pub fn tier_instructions(level: CefrLevel, tier: CefrTier) -> &'static str {
    match (tier, level.band()) {
        (CefrTier::Lower, LevelBand::Basic) => {
            "Use simple present tense, basic vocabulary, and straightforward questions like 'Do you...?', 'Can you...?', 'Do you like...?'"
        }
        (CefrTier::Lower, LevelBand::Intermediate) => {
            "Use simple to intermediate structures, common vocabulary, and questions like 'Do you think...?', 'Have you ever...?', 'Would you like to...?'"
        }
        (CefrTier::Lower, LevelBand::Advanced) => {
            "Use intermediate structures, avoid overly complex grammar, and focus on practical, everyday questions"
        }
        (CefrTier::Neutral, LevelBand::Basic) => {
            "Use appropriate structures for the level, mix of present and past tense, and balanced questions that are neither too simple nor too complex"
        }
        (CefrTier::Neutral, LevelBand::Intermediate) => {
            "Use intermediate structures, standard vocabulary, and well-balanced questions that match the level expectations"
        }
        (CefrTier::Neutral, LevelBand::Advanced) => {
            "Use level-appropriate structures, standard vocabulary, and questions that are challenging but not overly complex"
        }
        (CefrTier::Upper, LevelBand::Basic) => {
            "Use more varied structures within the level, include past tense, and create engaging questions beyond basic patterns"
        }
        (CefrTier::Upper, LevelBand::Intermediate) => {
            "Use intermediate to upper-intermediate structures, more sophisticated vocabulary, and thought-provoking questions"
        }
        (CefrTier::Upper, LevelBand::Advanced) => {
            "Use advanced structures, complex vocabulary, and challenging questions that require critical thinking and detailed responses"
        }
    }
}

pub fn quality_validation_instructions(enabled: bool) -> String {
    if !enabled {
        return String::new();
    }
    [
        "QUALITY VALIDATION REQUIREMENTS",
        "\t- Ensure each question is crystal clear and unambiguous",
        "\t- Use perfect grammar and natural phrasing throughout",
        "\t- Avoid culturally insensitive or potentially offensive content",
        "\t- Make sure questions are appropriate for the target level",
        "\t- Double-check that questions sound like natural English",
    ]
    .join("\n")
}

pub fn blooms_taxonomy_instructions(blooms: BloomsLevel) -> String {
    let lines: &[&str] = match blooms {
        BloomsLevel::Auto => return String::new(),
        BloomsLevel::Remember => &[
            "\t- Focus on factual recall questions",
            "\t- Use stems like: What is...?, Who...?, When...?, Where...?, Which...?",
            "\t- Ask for basic information and definitions",
        ],
        BloomsLevel::Understand => &[
            "\t- Focus on comprehension and explanation",
            "\t- Use stems like: Explain why...?, Describe...?, What does... mean?",
            "\t- Ask students to interpret or summarize information",
        ],
        BloomsLevel::Apply => &[
            "\t- Focus on practical application",
            "\t- Use stems like: How would you use...?, Solve...?, What would happen if...?",
            "\t- Ask students to use knowledge in new situations",
        ],
        BloomsLevel::Analyze => &[
            "\t- Focus on breaking down and comparing",
            "\t- Use stems like: Compare...?, What are the differences...?, Why do you think...?",
            "\t- Ask students to examine relationships and patterns",
        ],
        BloomsLevel::Evaluate => &[
            "\t- Focus on judgment and opinion",
            "\t- Use stems like: Do you agree...?, What's your opinion...?, Which is better...?",
            "\t- Ask students to make judgments and defend positions",
        ],
        BloomsLevel::Create => &[
            "\t- Focus on original thinking and design",
            "\t- Use stems like: Design...?, Invent...?, Propose...?, What would you create...?",
            "\t- Ask students to generate new ideas or solutions",
        ],
    };

    format!(
        "BLOOM'S TAXONOMY LEVEL: {}\n{}",
        blooms.to_string().to_uppercase(),
        lines.join("\n")
    )
}

pub fn engagement_level_instructions(engagement: EngagementLevel) -> String {
    let lines: &[&str] = match engagement {
        EngagementLevel::Balanced => return String::new(),
        EngagementLevel::Low => &[
            "\t- Create simple, factual questions",
            "\t- Focus on basic information and personal preferences",
            "\t- Avoid controversial or complex topics",
        ],
        EngagementLevel::Medium => &[
            "\t- Include personal but safe questions",
            "\t- Mix factual and opinion-based questions",
            "\t- Use topics that most students can relate to",
        ],
        EngagementLevel::High => &[
            "\t- Create thought-provoking, opinion-based questions",
            "\t- Include questions that spark debate and discussion",
            "\t- Use topics that require deeper thinking",
        ],
        EngagementLevel::VeryHigh => &[
            "\t- Create controversial and challenging questions",
            "\t- Include topics that require strong opinions and debate",
            "\t- Use complex, multi-faceted issues that generate intense discussion",
        ],
    };

    format!(
        "ENGAGEMENT LEVEL: {}\n{}",
        engagement.to_string().to_uppercase(),
        lines.join("\n")
    )
}

pub fn academic_background_instructions(enabled: bool) -> String {
    if !enabled {
        return String::new();
    }
    [
        "ACADEMIC BACKGROUND REQUIREMENT",
        "\t- Generate questions that require subject-specific knowledge",
        "\t- Use academic vocabulary and terminology appropriately",
        "\t- Include questions that test critical thinking skills",
        "\t- Require students to draw on research or study background",
        "\t- Make questions suitable for advanced or specialized learners",
    ]
    .join("\n")
}

pub fn naturalness_instructions(enabled: bool) -> String {
    if !enabled {
        return String::new();
    }
    [
        "NATURALNESS REQUIREMENTS",
        "\t- Use native speaker language patterns and phrasing",
        "\t- Ensure appropriate register for the target level",
        "\t- Create natural question flow and structure",
        "\t- Avoid awkward, artificial, or textbook-like phrasing",
        "\t- Make questions sound like they come from a real teacher",
    ]
    .join("\n")
}

pub fn strictness_instructions(consistency: TopicConsistency) -> String {
    let lines: &[&str] = match consistency {
        TopicConsistency::Strict => &[
            "TOPIC CONSISTENCY: STRICT",
            "\t- Questions must strictly follow the provided topics",
            "\t- No deviation from topic content",
            "\t- Questions must directly relate to specific topic points",
            "\t- Minimal creative interpretation allowed",
        ],
        TopicConsistency::Free => &[
            "TOPIC CONSISTENCY: FREE",
            "\t- More flexible interpretation of topics",
            "\t- Questions can be loosely related to topics",
            "\t- Allows creative and tangential connections",
            "\t- Good for open-ended discussions",
        ],
        TopicConsistency::Neutral => &[
            "TOPIC CONSISTENCY: NEUTRAL",
            "\t- Questions should relate to topics but allow some flexibility",
            "\t- Good balance between strict adherence and creativity",
            "\t- Recommended for most use cases",
        ],
    };
    lines.join("\n")
}

const SINGLE_OUTPUT_MARKER: &str = "OUTPUT: only the question text.";

pub fn feedback_section(feedback: &str) -> String {
    format!(
        "\nFEEDBACK ON PREVIOUS QUESTION: {}\n\n\
         IMPORTANT: Generate a completely new question from scratch that addresses the feedback above. \n\
         - If the feedback mentions the question is too easy/hard, adjust the difficulty accordingly\n\
         - If the feedback mentions grammar issues, ensure perfect grammar\n\
         - If the feedback mentions relevance, make it more relevant to the unit topics\n\
         - If the feedback mentions clarity, make it clearer and more specific\n\
         - If the feedback mentions engagement, make it more interesting and thought-provoking\n\
         - Completely rewrite the question rather than just making minor adjustments\n",
        feedback.trim()
    )
}

/// Insert the feedback block ahead of the single-question output line.
///
/// Templates without that line get the block appended instead.
pub fn with_feedback(template: &str, feedback: &str) -> String {
    if feedback.trim().is_empty() {
        return template.to_string();
    }

    let section = feedback_section(feedback);
    if template.contains(SINGLE_OUTPUT_MARKER) {
        template.replace(
            SINGLE_OUTPUT_MARKER,
            &format!("{}\n{}", section, SINGLE_OUTPUT_MARKER),
        )
    } else {
        format!("{}\n{}", template, section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_instructions_by_band() {
        assert!(tier_instructions(CefrLevel::A1, CefrTier::Lower).contains("simple present tense"));
        assert!(tier_instructions(CefrLevel::B1Plus, CefrTier::Neutral).contains("well-balanced"));
        assert!(tier_instructions(CefrLevel::C2, CefrTier::Upper).contains("critical thinking"));
    }

    #[test]
    fn test_disabled_blocks_are_empty() {
        assert!(quality_validation_instructions(false).is_empty());
        assert!(academic_background_instructions(false).is_empty());
        assert!(naturalness_instructions(false).is_empty());
        assert!(blooms_taxonomy_instructions(BloomsLevel::Auto).is_empty());
        assert!(engagement_level_instructions(EngagementLevel::Balanced).is_empty());
    }

    #[test]
    fn test_headed_blocks() {
        let blooms = blooms_taxonomy_instructions(BloomsLevel::Evaluate);
        assert!(blooms.starts_with("BLOOM'S TAXONOMY LEVEL: EVALUATE\n"));

        let engagement = engagement_level_instructions(EngagementLevel::VeryHigh);
        assert!(engagement.starts_with("ENGAGEMENT LEVEL: VERY HIGH\n"));

        assert!(strictness_instructions(TopicConsistency::Neutral).starts_with("TOPIC CONSISTENCY: NEUTRAL"));
    }

    #[test]
    fn test_with_feedback_inserts_before_output_line() {
        let template = "Write one.\nOUTPUT: only the question text.";
        let result = with_feedback(template, "too easy");

        let feedback_at = result.find("FEEDBACK ON PREVIOUS QUESTION: too easy").unwrap();
        let output_at = result.find(SINGLE_OUTPUT_MARKER).unwrap();
        assert!(feedback_at < output_at);
        assert_eq!(with_feedback(template, "  "), template);
    }
}
