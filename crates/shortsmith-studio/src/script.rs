//! The planned script of a short

use serde::{Deserialize, Serialize};
use shortsmith_core::{Result, ShortsError};
use shortsmith_gen::prompt;
use shortsmith_gen::ImageCount;
use std::fmt;
use std::str::FromStr;

/// Script returned by the planning request.
///
/// `image_prompts[i]` describes image asset `i`. The list length is fixed
/// once planned; edits replace text only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Script {
    pub title: String,
    pub hook: String,
    pub body: String,
    pub conclusion: String,
    pub image_prompts: Vec<String>,
}

/// Editable text fields of a script
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptField {
    Title,
    Hook,
    Body,
    Conclusion,
}

impl fmt::Display for ScriptField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptField::Title => write!(f, "title"),
            ScriptField::Hook => write!(f, "hook"),
            ScriptField::Body => write!(f, "body"),
            ScriptField::Conclusion => write!(f, "conclusion"),
        }
    }
}

impl FromStr for ScriptField {
    type Err = ShortsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(ScriptField::Title),
            "hook" => Ok(ScriptField::Hook),
            "body" => Ok(ScriptField::Body),
            "conclusion" => Ok(ScriptField::Conclusion),
            other => Err(ShortsError::Validation(format!(
                "Unknown script field '{}'. Expected title, hook, body or conclusion",
                other
            ))),
        }
    }
}

impl Script {
    /// Parse the structured planning response
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text.trim()).map_err(|e| {
            ShortsError::MalformedResponse(format!("Script response does not match the schema: {}", e))
        })
    }

    /// Bring the prompt list to the requested size.
    ///
    /// With a fixed count, extras are dropped and a short list is padded by
    /// cycling what the model returned. An empty list is always an error.
    pub fn normalize_prompts(&mut self, count: ImageCount) -> Result<()> {
        self.image_prompts.retain(|p| !p.trim().is_empty());
        if self.image_prompts.is_empty() {
            return Err(ShortsError::MalformedResponse(
                "Script contains no image prompts".to_string(),
            ));
        }

        if let Some(expected) = count.expected() {
            let returned = self.image_prompts.len();
            if returned != expected {
                log::warn!(
                    "Planner returned {} image prompts, expected {}; normalizing",
                    returned,
                    expected
                );
            }
            if returned > expected {
                self.image_prompts.truncate(expected);
            } else {
                for i in returned..expected {
                    let filler = self.image_prompts[i % returned].clone();
                    self.image_prompts.push(filler);
                }
            }
        }
        Ok(())
    }

    /// Hook, body and conclusion as one narration passage
    pub fn narration_passage(&self) -> String {
        prompt::narration_passage(&self.hook, &self.body, &self.conclusion)
    }

    pub fn field(&self, field: ScriptField) -> &str {
        match field {
            ScriptField::Title => &self.title,
            ScriptField::Hook => &self.hook,
            ScriptField::Body => &self.body,
            ScriptField::Conclusion => &self.conclusion,
        }
    }

    pub fn set_field(&mut self, field: ScriptField, text: &str) {
        let slot = match field {
            ScriptField::Title => &mut self.title,
            ScriptField::Hook => &mut self.hook,
            ScriptField::Body => &mut self.body,
            ScriptField::Conclusion => &mut self.conclusion,
        };
        *slot = text.to_string();
    }

    /// Replace the text of prompt `index`. The list length never changes.
    pub fn set_prompt(&mut self, index: usize, text: &str) -> Result<()> {
        let count = self.image_prompts.len();
        let slot = self.image_prompts.get_mut(index).ok_or_else(|| {
            ShortsError::Precondition(format!(
                "Image {} does not exist (script has {} prompts)",
                index + 1,
                count
            ))
        })?;
        *slot = text.to_string();
        Ok(())
    }
}
