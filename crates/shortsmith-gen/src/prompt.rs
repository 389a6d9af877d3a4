//! Prompt templates sent to the generative service

use serde_json::json;

use crate::provider::ImageCount;
use crate::style::StyleGuide;

/// Video resolution requested from the synthesis model
pub const VIDEO_RESOLUTION: &str = "720p";

/// JSON schema the structured script response must follow
pub fn script_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "title": { "type": "STRING" },
            "hook": { "type": "STRING" },
            "body": { "type": "STRING" },
            "conclusion": { "type": "STRING" },
            "imagePrompts": {
                "type": "ARRAY",
                "items": { "type": "STRING" }
            }
        },
        "required": ["title", "hook", "body", "conclusion", "imagePrompts"]
    })
}

/// Planning prompt for a 30-second short on `topic`
pub fn script_prompt(topic: &str, count: ImageCount, style: &StyleGuide, language: &str) -> String {
    let count_clause = match count {
        ImageCount::Auto => "as many high-quality image generation prompts as suit the content".to_string(),
        ImageCount::Fixed(1) => "exactly 1 high-quality image generation prompt".to_string(),
        ImageCount::Fixed(n) => format!("exactly {} high-quality image generation prompts", n),
    };
    let style_clause = if style.is_none() {
        String::new()
    } else {
        format!(", with an overall visual style of '{}'", style.name)
    };

    format!(
        "Write a 30-second short-form video script about '{topic}', made of a hook, a body and a conclusion. \
         Also write {count_clause} that follow the flow of the script{style_clause}. \
         Write everything in {language}."
    )
}

/// The narration passage read by the speech model
pub fn narration_passage(hook: &str, body: &str, conclusion: &str) -> String {
    format!("{}. {}. {}", hook.trim(), body.trim(), conclusion.trim())
}

/// Speech request text for a narration passage
pub fn speech_text(passage: &str) -> String {
    format!("Read this aloud: {}", passage)
}

/// Image prompt after style enrichment
pub fn image_prompt(base: &str, style: &StyleGuide) -> String {
    style.enrich_prompt(base)
}

/// Composite prompt for the final video
pub fn video_prompt(topic: &str, style: &StyleGuide, music: &str, passage: &str) -> String {
    let mut lines = vec![
        format!("A high quality vertical short video about {}.", topic),
        "Subtitles should be burned in at the bottom center, one line at a time.".to_string(),
    ];
    if !style.is_none() {
        lines.push(format!("The visual style is {}.", style.name));
    }
    if !music.trim().is_empty() {
        lines.push(format!("Music style: {}.", music.trim()));
    }
    lines.push(format!("Narration text: {}", passage));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_script_prompt_fixed_count_and_style() {
        let style = StyleGuide::preset("Watercolor").unwrap();
        let prompt = script_prompt("겨울철 별미", ImageCount::Fixed(3), &style, "Korean");
        assert!(prompt.contains("'겨울철 별미'"));
        assert!(prompt.contains("exactly 3 high-quality"));
        assert!(prompt.contains("'Watercolor'"));
        assert!(prompt.ends_with("Write everything in Korean."));
    }

    #[test]
    fn test_script_prompt_auto_without_style() {
        let prompt = script_prompt("street food", ImageCount::Auto, &StyleGuide::none(), "English");
        assert!(prompt.contains("as many high-quality image generation prompts"));
        assert!(!prompt.contains("visual style"));
    }

    #[test]
    fn test_narration_passage_joins_sections() {
        assert_eq!(
            narration_passage("Cold outside? ", "Try hotteok.", " See you next time"),
            "Cold outside?. Try hotteok.. See you next time"
        );
    }

    #[test]
    fn test_video_prompt_sections() {
        let style = StyleGuide::preset("Pixel Art").unwrap();
        let prompt = video_prompt("winter snacks", &style, "warm acoustic", "hook body end");
        assert!(prompt.contains("about winter snacks."));
        assert!(prompt.contains("The visual style is Pixel Art."));
        assert!(prompt.contains("Music style: warm acoustic."));
        assert!(prompt.ends_with("Narration text: hook body end"));

        let plain = video_prompt("winter snacks", &StyleGuide::none(), "  ", "text");
        assert!(!plain.contains("visual style"));
        assert!(!plain.contains("Music style"));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = script_schema();
        let required = schema["required"].as_array().unwrap();
        assert_eq!(required.len(), 5);
        assert_eq!(schema["properties"]["imagePrompts"]["type"], "ARRAY");
    }
}
