//! Reply and scheduled-prompt generation.
//!
//! The prompts ask for short, gentle text; [`shape`] then enforces the
//! structural limits on whatever comes back (no lists, bounded paragraphs,
//! sentences and length) so a chatty model cannot break the format.

use std::sync::Arc;

use brain_core::{hash_prompt, Brain, CompletionRequest};
use coach_database::ReflectionSignals;
use tracing::{debug, info, warn};

use crate::classifier::{display_name, Classification};
use crate::error::CoachError;
use crate::prompts::PromptSet;

const REPLY_TEMPERATURE: f32 = 0.8;
const REPLY_MAX_TOKENS: u32 = 300;

/// How generated text is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    /// Everything joined into one paragraph.
    SingleParagraph,
    /// Blank-line separated paragraphs.
    Paragraphs,
    /// One short line per block.
    Lines,
}

/// Structural limits applied to generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyShape {
    pub layout: Layout,
    pub max_blocks: usize,
    pub max_sentences: usize,
    pub max_chars: usize,
}

impl ReplyShape {
    /// Conversational reply: a few sentences, one paragraph.
    pub const CHAT: ReplyShape = ReplyShape {
        layout: Layout::SingleParagraph,
        max_blocks: 1,
        max_sentences: 4,
        max_chars: 600,
    };

    /// Morning prompt: up to three short paragraphs.
    pub const MORNING: ReplyShape = ReplyShape {
        layout: Layout::Paragraphs,
        max_blocks: 3,
        max_sentences: 8,
        max_chars: 900,
    };

    /// Evening prompt: up to three short lines.
    pub const EVENING: ReplyShape = ReplyShape {
        layout: Layout::Lines,
        max_blocks: 3,
        max_sentences: 5,
        max_chars: 450,
    };
}

/// Remove a leading bullet or number marker from a line.
fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    for marker in ['-', '*', '•', '–', '>'] {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && digits < 3 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim_start();
        }
    }
    line.trim_start_matches('#').trim()
}

/// Byte index just past the `n`th sentence terminator, if there are more.
fn sentence_cut(text: &str, n: usize) -> Option<usize> {
    let mut count = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((_, ch)) = chars.next() {
        if matches!(ch, '.' | '!' | '?' | '…') {
            // Swallow runs like "?!" or "...".
            while let Some(&(_, next)) = chars.peek() {
                if matches!(next, '.' | '!' | '?' | '…') {
                    chars.next();
                } else {
                    break;
                }
            }
            let end = chars.peek().map(|&(j, _)| j).unwrap_or(text.len());
            let at_boundary = chars.peek().map_or(true, |&(_, c)| c.is_whitespace());
            if at_boundary {
                count += 1;
                if count == n && end < text.len() {
                    return Some(end);
                }
            }
        }
    }
    None
}

fn cap_sentences(text: &str, max: usize) -> String {
    match sentence_cut(text, max) {
        Some(end) => text[..end].trim_end().to_string(),
        None => text.to_string(),
    }
}

fn cap_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max).collect();
    if let Some(end) = cut.rfind(['.', '!', '?']) {
        if end > max / 2 {
            return cut[..=end].to_string();
        }
    }
    match cut.rfind(char::is_whitespace) {
        Some(space) => format!("{}…", cut[..space].trim_end()),
        None => format!("{}…", cut),
    }
}

/// Apply structural limits to generated text.
///
/// Returns `None` when nothing usable remains.
pub fn shape(text: &str, shape: ReplyShape) -> Option<String> {
    let text = text.replace("\r\n", "\n").replace("**", "");

    // Blocks are paragraphs; each is a list of cleaned non-empty lines.
    let paragraphs: Vec<Vec<String>> = text
        .split("\n\n")
        .map(|p| {
            p.lines()
                .map(strip_list_marker)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|p| !p.is_empty())
        .collect();

    let blocks: Vec<String> = match shape.layout {
        Layout::SingleParagraph => {
            let joined = paragraphs
                .iter()
                .flatten()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" ");
            vec![joined]
        }
        Layout::Paragraphs => paragraphs.iter().map(|p| p.join(" ")).collect(),
        Layout::Lines => paragraphs.into_iter().flatten().collect(),
    };

    let separator = match shape.layout {
        Layout::Lines => "\n",
        _ => "\n\n",
    };

    let mut remaining = shape.max_sentences;
    let mut kept = Vec::new();
    for block in blocks.into_iter().take(shape.max_blocks) {
        if remaining == 0 {
            break;
        }
        let capped = cap_sentences(&block, remaining);
        let used = sentence_count(&capped).max(1);
        remaining = remaining.saturating_sub(used);
        if !capped.trim().is_empty() {
            kept.push(capped.trim().to_string());
        }
    }

    let result = cap_chars(&kept.join(separator), shape.max_chars);
    let result = result.trim();
    if result.is_empty() {
        None
    } else {
        Some(result.to_string())
    }
}

fn sentence_count(text: &str) -> usize {
    let mut n = 0;
    while sentence_cut(text, n + 1).is_some() {
        n += 1;
    }
    // The trailing sentence has no cut after it.
    n + usize::from(!text.trim().is_empty())
}

/// Context for a conversational reply.
#[derive(Debug, Clone, Copy)]
pub struct ReplyContext<'a> {
    pub name: &'a str,
    pub goal_title: &'a str,
    pub goal_description: &'a str,
    pub message: &'a str,
    pub classification: &'a Classification,
    /// Today's reflection after merging this message's signals.
    pub reflection: &'a ReflectionSignals,
}

/// Context for a morning prompt.
#[derive(Debug, Clone, Copy)]
pub struct MorningContext<'a> {
    pub name: &'a str,
    pub goal_title: &'a str,
    pub goal_description: &'a str,
    /// Most recent moods, newest first.
    pub recent_moods: &'a [String],
}

/// Context for an evening prompt.
#[derive(Debug, Clone, Copy)]
pub struct EveningContext<'a> {
    pub name: &'a str,
    pub goal_title: &'a str,
}

fn or_null(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("null")
}

/// Format the user-turn prompt for a conversational reply.
pub fn format_reply_input(ctx: &ReplyContext<'_>) -> String {
    let c = ctx.classification;
    let mut prompt = format!(
        "User: {}\nGoal: {}\nDescription: {}\n\nUser message:\n\"\"\"\n{}\n\"\"\"\n\n\
         Category detected: {}\nSummary: {}\n\n\
         Signals in this message:\n- Mood: {}\n- Progress: {}\n- Stuck: {}\n\n\
         Today's reflection so far:\n- Mood: {}\n- Progress: {}\n- Stuck: {}\n",
        display_name(ctx.name),
        ctx.goal_title,
        ctx.goal_description,
        ctx.message,
        c.category,
        c.summary.as_deref().unwrap_or("(none)"),
        or_null(&c.signals.mood),
        or_null(&c.signals.progress),
        or_null(&c.signals.stuck),
        or_null(&ctx.reflection.mood),
        or_null(&ctx.reflection.progress),
        or_null(&ctx.reflection.stuck),
    );

    if c.category.is_difficulty() {
        prompt.push_str(
            "\nThe user is having a hard time. Acknowledge how they feel first and normalize it before anything else. Offer at most one very small, optional step.\n",
        );
    }

    prompt.push_str("\nWrite your reply in a warm, human voice.");
    prompt
}

/// Format the user-turn prompt for a morning message.
pub fn format_morning_input(ctx: &MorningContext<'_>) -> String {
    let moods = if ctx.recent_moods.is_empty() {
        "(none)".to_string()
    } else {
        ctx.recent_moods
            .iter()
            .map(|m| format!("- {}", m))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "User name: {}\nGoal title: {}\nGoal description: {}\n\n\
         Recent moods, newest first (may be empty):\n{}\n\n\
         Write ONE morning message for this user. Talk directly to them (\"you\").",
        display_name(ctx.name),
        ctx.goal_title,
        ctx.goal_description,
        moods
    )
}

/// Format the user-turn prompt for an evening message.
pub fn format_evening_input(ctx: &EveningContext<'_>) -> String {
    format!(
        "User name: {}\nGoal: {}\n\nWrite ONE evening message for this user.",
        display_name(ctx.name),
        ctx.goal_title
    )
}

/// Generates conversational replies and scheduled prompts.
pub struct ReplyGenerator {
    brain: Arc<dyn Brain>,
    reply_prompt: String,
    morning_prompt: String,
    evening_prompt: String,
}

impl ReplyGenerator {
    pub fn new(brain: Arc<dyn Brain>, prompts: &PromptSet) -> Self {
        info!(
            "Reply prompt fingerprints: reply={} morning={} evening={}",
            hash_prompt(&prompts.reply),
            hash_prompt(&prompts.morning),
            hash_prompt(&prompts.evening)
        );
        Self {
            brain,
            reply_prompt: prompts.reply.clone(),
            morning_prompt: prompts.morning.clone(),
            evening_prompt: prompts.evening.clone(),
        }
    }

    async fn generate(
        &self,
        kind: &'static str,
        system: &str,
        user: String,
        limits: ReplyShape,
    ) -> Result<String, CoachError> {
        let request = CompletionRequest::new(system, user)
            .with_temperature(REPLY_TEMPERATURE)
            .with_max_tokens(REPLY_MAX_TOKENS);

        let completion = self.brain.complete(request).await?;
        debug!("{} raw output: {}", kind, completion.text);

        match shape(&completion.text, limits) {
            Some(text) => Ok(text),
            None => {
                warn!(kind, "REPLY_EMPTY");
                Err(CoachError::ReplyGeneration(format!("{} came back empty", kind)))
            }
        }
    }

    /// Reply to a classified message.
    pub async fn generate_reply(&self, ctx: &ReplyContext<'_>) -> Result<String, CoachError> {
        self.generate("reply", &self.reply_prompt, format_reply_input(ctx), ReplyShape::CHAT)
            .await
    }

    /// Morning check-in message.
    pub async fn morning_prompt(&self, ctx: &MorningContext<'_>) -> Result<String, CoachError> {
        self.generate("morning", &self.morning_prompt, format_morning_input(ctx), ReplyShape::MORNING)
            .await
    }

    /// Evening reflection message.
    pub async fn evening_prompt(&self, ctx: &EveningContext<'_>) -> Result<String, CoachError> {
        self.generate("evening", &self.evening_prompt, format_evening_input(ctx), ReplyShape::EVENING)
            .await
    }
}
