//! The closed set of message categories.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// What kind of message the user sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    MorningMotivationReply,
    GoalProgressUpdate,
    FeelingStuck,
    NewIntentionOrPlan,
    FreeTalk,
    Irrelevant,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::MorningMotivationReply,
        Category::GoalProgressUpdate,
        Category::FeelingStuck,
        Category::NewIntentionOrPlan,
        Category::FreeTalk,
        Category::Irrelevant,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::MorningMotivationReply => "morning_motivation_reply",
            Category::GoalProgressUpdate => "goal_progress_update",
            Category::FeelingStuck => "feeling_stuck",
            Category::NewIntentionOrPlan => "new_intention_or_plan",
            Category::FreeTalk => "free_talk",
            Category::Irrelevant => "irrelevant",
        }
    }

    /// Whether the user is signalling difficulty, so the reply should
    /// acknowledge feelings before anything else.
    pub fn is_difficulty(&self) -> bool {
        matches!(self, Category::FeelingStuck)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s.trim())
            .ok_or_else(|| format!("unknown category: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_strings_match_serde() {
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
            assert_eq!(category.as_str().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn test_unknown_category() {
        assert!("motivation".parse::<Category>().is_err());
        assert!(serde_json::from_str::<Category>("\"FREE_TALK\"").is_err());
    }

    #[test]
    fn test_difficulty() {
        assert!(Category::FeelingStuck.is_difficulty());
        assert!(!Category::GoalProgressUpdate.is_difficulty());
    }
}
