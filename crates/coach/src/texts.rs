//! Fixed texts sent outside the model pipeline.

/// Canned messages, personalised with the persona name and web app URL.
#[derive(Debug, Clone)]
pub struct Texts {
    persona: String,
    web_url: Option<String>,
}

impl Texts {
    pub fn new(persona: impl Into<String>, web_url: Option<String>) -> Self {
        Self {
            persona: persona.into(),
            web_url,
        }
    }

    fn web_app(&self) -> String {
        match &self.web_url {
            Some(url) => format!("the web app ({})", url),
            None => "the web app".to_string(),
        }
    }

    /// "/start" from a chat that is not linked yet.
    pub fn welcome(&self) -> String {
        format!(
            "Hey, I'm {}. I'll help you move toward your goals, one small step at a time.\n\n\
             To connect your account, please send me the code you see in {}.",
            self.persona,
            self.web_app()
        )
    }

    /// "/start" from a chat that is already linked.
    pub fn already_connected(&self) -> String {
        "You're already connected. You can just talk to me naturally here, \
         tell me how you feel or how your goal is going."
            .to_string()
    }

    /// Pairing succeeded.
    pub fn linked(&self, name: &str) -> String {
        let name = name.trim();
        let name = if name.is_empty() { "friend" } else { name };
        format!(
            "Great! Your account is now connected, {}. From now on, you can just talk to me here. \
             I'll check in with you in the morning and in the evening.",
            name
        )
    }

    /// The code belongs to an account linked to another chat.
    pub fn conflict(&self) -> String {
        format!(
            "This code is already linked to another account. Please generate a new code from {}.",
            self.web_app()
        )
    }

    /// No account has this code.
    pub fn code_not_found(&self) -> String {
        format!(
            "I couldn't find this code.\n\nPlease open {}, go to the Telegram section, \
             and send me the code you see there.",
            self.web_app()
        )
    }

    /// Linked user without an active goal.
    pub fn no_active_goal(&self) -> String {
        format!(
            "You don't have an active goal right now. Set one up in {} and we can start walking toward it together.",
            self.web_app()
        )
    }

    /// Something went wrong while answering.
    pub fn apology(&self) -> String {
        "Sorry, I couldn't answer just now. Could you send that again in a little while?".to_string()
    }
}
