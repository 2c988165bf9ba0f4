//! Prompt templates for Papercast.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Prompts {
    pub summary: SummaryPrompts,
    pub chat: PromptPair,
    pub podcast: PromptPair,
    pub notes: PromptPair,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// A system instruction and the user template it is paired with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptPair {
    pub system: String,
    pub user: String,
}

/// Fields of a prompt file; missing ones keep the built-in text.
#[derive(Debug, Default, Deserialize)]
struct PromptOverride {
    system: Option<String>,
    user: Option<String>,
}

impl PromptOverride {
    fn read(path: &Path) -> crate::error::Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path)?;
        Ok(Some(toml::from_str(&content)?))
    }

    fn apply(self, system: &mut String, user: &mut String) {
        if let Some(text) = self.system {
            *system = text;
        }
        if let Some(text) = self.user {
            *user = text;
        }
    }
}

/// Prompts for summarizing a whole paper or a selection from it.
///
/// `{{subject}}` is filled with "research paper" or "selected text".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SummaryPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an expert at summarizing academic content.
Create a clear, concise summary that captures the main points."#
                .to_string(),

            user: r#"Summarize this {{subject}}:

{{content}}

Keep it concise but informative."#
                .to_string(),
        }
    }
}

impl PromptPair {
    /// Default chat prompts. `{{context}}` and `{{question}}` are filled per request.
    pub fn default_chat() -> Self {
        Self {
            system: r#"You are an AI research assistant helping users understand academic papers.
Provide clear, accurate responses based on the paper's content."#
                .to_string(),

            user: r#"Based on this research paper content:

{{context}}

Answer this question: {{question}}

Provide a clear, concise response that directly addresses the question."#
                .to_string(),
        }
    }

    /// Default podcast narration prompts.
    pub fn default_podcast() -> Self {
        Self {
            system: r#"You are an expert at creating engaging podcast scripts from academic content.
Convert this research paper into a natural conversational narrative.
Important: do not use any speaker labels, names, or markers like 'Host A' or 'Host B'.
Present the content as a flowing narrative that can be read naturally by text-to-speech."#
                .to_string(),

            user: r#"Create an engaging podcast script about this research paper:

{{content}}

Requirements:
- Present as a natural flowing narrative
- No speaker labels or markers
- Include 3-4 main points from the paper
- Keep the tone conversational but informative
- Avoid any special characters or formatting"#
                .to_string(),
        }
    }

    /// Default study-notes prompts.
    pub fn default_notes() -> Self {
        Self {
            system: r#"You are an expert at converting academic text into comprehensive study notes.
Create detailed, well-structured notes that capture the main points and supporting details."#
                .to_string(),

            user: r#"Convert this text into comprehensive study notes:

{{content}}

Format the notes with:
- A clear summary
- Key points with explanations
- Important concepts and definitions
- Related topics and implications
Use bullet points and proper formatting."#
                .to_string(),
        }
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self {
            summary: SummaryPrompts::default(),
            chat: PromptPair::default_chat(),
            podcast: PromptPair::default_podcast(),
            notes: PromptPair::default_notes(),
            variables: HashMap::new(),
        }
    }
}

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\{\{(\w+)\}\}").expect("valid placeholder regex"))
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            if let Some(o) = PromptOverride::read(&custom_path.join("summary.toml"))? {
                o.apply(&mut prompts.summary.system, &mut prompts.summary.user);
            }
            for (file, pair) in [
                ("chat.toml", &mut prompts.chat),
                ("podcast.toml", &mut prompts.podcast),
                ("notes.toml", &mut prompts.notes),
            ] {
                if let Some(o) = PromptOverride::read(&custom_path.join(file))? {
                    o.apply(&mut pair.system, &mut pair.user);
                }
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    ///
    /// Placeholders are filled in a single pass over the template, so
    /// substituted values are never scanned again. Unknown placeholders stay.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        placeholder()
            .replace_all(template, |caps: &Captures| match vars.get(&caps[1]) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            })
            .into_owned()
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
