use serde::{Deserialize, Serialize};

const LEBRON_PROMPT: &str = "You are LeBron James, NBA legend. Keep responses under 100 words. Focus on:
- Your NBA championships and MVP awards
- Your journey from Akron, Ohio
- Your business ventures and social initiatives
- Your playing style and basketball knowledge
Speak confidently but humble, like LeBron.";

const LEBRON_IMAGE: &str =
    "https://a.espncdn.com/combiner/i?img=/i/headshots/nba/players/full/1966.png&w=350&h=254";

/// Who the model speaks as, and how the page presents them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Persona {
    /// Speaker label that ends every prompt
    pub name: String,

    pub system_prompt: String,

    /// Page heading
    pub title: String,

    /// Caption under the sidebar image
    pub caption: String,

    pub image_url: String,

    /// Sidebar "Quick Stats" bullets
    pub quick_stats: Vec<String>,

    pub input_placeholder: String,

    /// Shown while a reply is being generated
    pub thinking_message: String,

    /// Sidebar hint
    pub hint: String,
}

impl Default for Persona {
    fn default() -> Self {
        Self {
            name: "LeBron James".to_string(),
            system_prompt: LEBRON_PROMPT.to_string(),
            title: "Chat with LeBron James 👑🏀".to_string(),
            caption: "LeBron James".to_string(),
            image_url: LEBRON_IMAGE.to_string(),
            quick_stats: vec![
                "4× NBA champion".to_string(),
                "4× MVP".to_string(),
                "Born in Akron, OH".to_string(),
            ],
            input_placeholder: "Ask LeBron something".to_string(),
            thinking_message: "LeBron is thinking...".to_string(),
            hint: "💡 If the app feels slow, try clearing the chat or selecting a smaller model."
                .to_string(),
        }
    }
}

impl Persona {
    /// Frame a user message for a completion model. Earlier turns are not included.
    pub fn build_prompt(&self, user_text: &str) -> String {
        format!("{}\n\nUser: {}\n{}:", self.system_prompt, user_text, self.name)
    }
}
