use crate::intent::affect::Affect;

const INSTRUCTION_HEADER: &str = "You are the intent layer of a multilingual voice assistant. \
Decide whether one of the provided functions answers the user's message.";

const DISAMBIGUATION_RULES: &[&str] = &[
    "Call a function whenever one of the provided functions can serve the request.",
    "Do not call a function for small talk, greetings, or purely emotional statements.",
    "Call at most one function.",
    "Extract arguments from the message; use sensible defaults for anything not stated.",
    "City names are written in English (台北 -> Taipei).",
    "Currencies use ISO 4217 codes (USD, TWD, JPY).",
    "Bus route arguments are the route number only (307, 紅30).",
];

/// Builds the cross-cutting instruction sent with every classification.
///
/// Per-capability guidance travels in the function descriptions; this text
/// only carries the affect taxonomy and the disambiguation rules.
pub fn build_instruction() -> String {
    let mut text = String::from(INSTRUCTION_HEADER);

    text.push_str("\n\nRules:\n");
    for (index, rule) in DISAMBIGUATION_RULES.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", index + 1, rule));
    }

    text.push_str("\nAlso label the tone of the message with exactly one of: ");
    let labels: Vec<&str> = Affect::ALL.iter().map(Affect::as_str).collect();
    text.push_str(&labels.join(", "));
    text.push_str(". Mention the label in your reply text.");
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_lists_every_affect_label() {
        let instruction = build_instruction();
        for affect in Affect::ALL {
            assert!(instruction.contains(affect.as_str()));
        }
    }

    #[test]
    fn instruction_does_not_name_capabilities() {
        let instruction = build_instruction();
        assert!(!instruction.contains("weather_query"));
        assert!(!instruction.contains("tdx_"));
    }
}
