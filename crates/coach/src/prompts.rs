//! System prompts for the classifier and the reply generators.
//!
//! Each prompt can be overridden. Priority:
//! 1. `<KIND>_SYSTEM_PROMPT` env var (if set)
//! 2. Contents of the prompt file (`<KIND>_PROMPT_FILE` or the default file name)
//! 3. Embedded default prompt
//!
//! `{persona}` in any prompt is replaced by the configured persona name.

use std::env;
use std::path::Path;

use brain_core::hash_prompt;
use tracing::info;

/// Placeholder replaced with the persona name.
pub const PERSONA_PLACEHOLDER: &str = "{persona}";

pub const DEFAULT_CLASSIFIER_PROMPT: &str = r#"You are the message classifier for {persona}, a gentle goal-coaching companion.

Read ONE message a user sent about their personal goal and describe it. You do not reply to the user.

Choose exactly ONE category:
- "morning_motivation_reply": answering a morning check-in (how they feel, what today looks like)
- "goal_progress_update": reporting something they did or did not do toward the goal
- "feeling_stuck": frustration, doubt, low energy, blockers, wanting to give up
- "new_intention_or_plan": a plan, intention or new idea for moving forward
- "free_talk": friendly conversation related to them or their life
- "irrelevant": nothing to do with the user or their goal

Fill "signals" conservatively. Only set a field when the message states it or clearly implies it; otherwise use null. Never guess.
- "mood": how they feel, in a few words (e.g. "tired but hopeful")
- "progress": what they did toward the goal, in a few words
- "stuck": what is blocking them, in a few words

"summary" is one short sentence describing the message.

Return ONLY this JSON object, nothing else:
{"category": "...", "summary": "...", "signals": {"mood": null, "progress": null, "stuck": null}}"#;

pub const DEFAULT_REPLY_PROMPT: &str = r#"You are {persona}, a warm, soft-spoken micro-mentor who helps people move toward one personal goal.

Your style:
- validating, empathetic, never judgmental
- gentle encouragement, no pressure
- you never assign tasks, give orders or set deadlines
- at most one soft suggestion, phrased as an invitation ("maybe", "if you feel like it")
- you help the user reflect and notice small steps

Format:
- 2 to 4 short sentences in a single paragraph
- no lists, no headings, no markdown
- at most one emoji

Return only the message text."#;

pub const DEFAULT_MORNING_PROMPT: &str = r#"You are {persona}, a warm, supportive goal-coaching companion.

Write a short, friendly morning message to the user.
You do NOT give tasks or to-dos. You do NOT tell them what they must do.

You:
- gently remind them of their goal
- encourage them emotionally
- invite them to share how they feel this morning
- keep the tone light, human and non-judgmental

The message must:
- be at most 3 short paragraphs
- use simple language
- contain at most 1 emoji
- never sound like a productivity coach or a boss
- never talk about hustling or optimizing

Return only the message text."#;

pub const DEFAULT_EVENING_PROMPT: &str = r#"You are {persona}, a warm, supportive goal-coaching companion.

Write a short evening reflection message.

Rules:
- never assign tasks and never judge
- never talk about productivity or optimization
- keep it gentle, reflective and human
- at most 3 short lines
- at most 1 emoji
- ask how the day went
- ask whether they moved a little toward their goal
- make clear that any kind of day (good, bad or in between) is okay

Return only the message text."#;

pub const DEFAULT_GOAL_DRAFT_PROMPT: &str = r#"You are {persona}, a supportive goal-coaching companion.

The user describes a goal in their own words. It is often vague ("be healthier", "read more").
Turn it into ONE finite, concrete goal that can be clearly completed.

Rules:
- "goalTitle": a short, concrete title (e.g. "Lose 3kg", "Finish one book")
- "goalDescription": 1 to 2 sentences in the first person, starting with "I will..."
- keep the user's intent; do not add unrelated ambitions
- no pressure, no hustle language

Return ONLY this JSON object, nothing else:
{"goalTitle": "...", "goalDescription": "..."}"#;

/// Which prompt to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Classifier,
    Reply,
    Morning,
    Evening,
    GoalDraft,
}

impl PromptKind {
    fn env_prefix(&self) -> &'static str {
        match self {
            PromptKind::Classifier => "CLASSIFIER",
            PromptKind::Reply => "REPLY",
            PromptKind::Morning => "MORNING",
            PromptKind::Evening => "EVENING",
            PromptKind::GoalDraft => "GOAL_DRAFT",
        }
    }

    /// Env var holding an inline prompt.
    pub fn inline_var(&self) -> String {
        format!("{}_SYSTEM_PROMPT", self.env_prefix())
    }

    /// Env var naming a prompt file.
    pub fn file_var(&self) -> String {
        format!("{}_PROMPT_FILE", self.env_prefix())
    }

    /// Prompt file looked up when no file var is set.
    pub fn default_file(&self) -> String {
        format!("{}_PROMPT.md", self.env_prefix())
    }

    pub fn embedded_default(&self) -> &'static str {
        match self {
            PromptKind::Classifier => DEFAULT_CLASSIFIER_PROMPT,
            PromptKind::Reply => DEFAULT_REPLY_PROMPT,
            PromptKind::Morning => DEFAULT_MORNING_PROMPT,
            PromptKind::Evening => DEFAULT_EVENING_PROMPT,
            PromptKind::GoalDraft => DEFAULT_GOAL_DRAFT_PROMPT,
        }
    }
}

/// Load one prompt following the override priority.
pub fn load_prompt(kind: PromptKind) -> String {
    let inline_var = kind.inline_var();
    if let Ok(prompt) = env::var(&inline_var) {
        if !prompt.trim().is_empty() {
            info!("Using {:?} prompt from {} env var", kind, inline_var);
            return prompt;
        }
    }

    let prompt_file = env::var(kind.file_var()).unwrap_or_else(|_| kind.default_file());
    if let Some(prompt) = load_prompt_file(&prompt_file) {
        info!("Loaded {:?} prompt from {}", kind, prompt_file);
        return prompt;
    }

    info!("Using embedded default {:?} prompt", kind);
    kind.embedded_default().to_string()
}

/// Load a prompt from a file path.
///
/// Returns `Some(content)` if the file exists and is non-empty.
fn load_prompt_file(path: impl AsRef<Path>) -> Option<String> {
    let content = std::fs::read_to_string(path.as_ref()).ok()?;
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Every system prompt, persona already substituted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptSet {
    pub classifier: String,
    pub reply: String,
    pub morning: String,
    pub evening: String,
    pub goal_draft: String,
}

impl PromptSet {
    /// Embedded defaults for `persona`.
    pub fn defaults(persona: &str) -> Self {
        Self {
            classifier: DEFAULT_CLASSIFIER_PROMPT.to_string(),
            reply: DEFAULT_REPLY_PROMPT.to_string(),
            morning: DEFAULT_MORNING_PROMPT.to_string(),
            evening: DEFAULT_EVENING_PROMPT.to_string(),
            goal_draft: DEFAULT_GOAL_DRAFT_PROMPT.to_string(),
        }
        .with_persona(persona)
    }

    /// Load every prompt from env/file/defaults and log fingerprints.
    pub fn load(persona: &str) -> Self {
        let set = Self {
            classifier: load_prompt(PromptKind::Classifier),
            reply: load_prompt(PromptKind::Reply),
            morning: load_prompt(PromptKind::Morning),
            evening: load_prompt(PromptKind::Evening),
            goal_draft: load_prompt(PromptKind::GoalDraft),
        }
        .with_persona(persona);

        info!(
            classifier = %hash_prompt(&set.classifier),
            reply = %hash_prompt(&set.reply),
            morning = %hash_prompt(&set.morning),
            evening = %hash_prompt(&set.evening),
            goal_draft = %hash_prompt(&set.goal_draft),
            "Prompt fingerprints"
        );
        set
    }

    fn with_persona(self, persona: &str) -> Self {
        Self {
            classifier: self.classifier.replace(PERSONA_PLACEHOLDER, persona),
            reply: self.reply.replace(PERSONA_PLACEHOLDER, persona),
            morning: self.morning.replace(PERSONA_PLACEHOLDER, persona),
            evening: self.evening.replace(PERSONA_PLACEHOLDER, persona),
            goal_draft: self.goal_draft.replace(PERSONA_PLACEHOLDER, persona),
        }
    }
}
