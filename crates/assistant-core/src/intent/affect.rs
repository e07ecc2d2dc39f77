use std::fmt;

use serde::{Deserialize, Serialize};

/// Emotional tone of an utterance, as labelled by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Affect {
    #[default]
    Neutral,
    Happy,
    Sad,
    Angry,
    Fear,
    Surprise,
}

impl Affect {
    /// Scan order used when reading labels out of free text.
    pub const ALL: [Affect; 6] = [
        Affect::Neutral,
        Affect::Happy,
        Affect::Sad,
        Affect::Angry,
        Affect::Fear,
        Affect::Surprise,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Affect::Neutral => "neutral",
            Affect::Happy => "happy",
            Affect::Sad => "sad",
            Affect::Angry => "angry",
            Affect::Fear => "fear",
            Affect::Surprise => "surprise",
        }
    }

    /// First label found in `text` (case-insensitive), or neutral.
    pub fn from_text(text: &str) -> Affect {
        let text_lower = text.to_lowercase();
        Affect::ALL
            .into_iter()
            .find(|affect| text_lower.contains(affect.as_str()))
            .unwrap_or_default()
    }

    pub fn is_distressed(&self) -> bool {
        matches!(self, Affect::Sad | Affect::Angry | Affect::Fear)
    }
}

impl fmt::Display for Affect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
