use serde_json::{Map, Value};

use crate::classifier::ClassifierResponse;
use crate::intent::affect::Affect;
use crate::intent::resolution::IntentPayload;

/// Interprets a classifier response as `(matched, payload)`.
///
/// Only the first invocation is used; later ones are ignored. Arguments that
/// do not parse as a JSON object become `{}`.
pub fn parse_response(response: &ClassifierResponse) -> (bool, IntentPayload) {
    let affect = Affect::from_text(&response.content);

    let Some(invocation) = response.invocations.first() else {
        tracing::info!(affect = %affect, "classifier chose no capability");
        return (false, IntentPayload::Conversation { affect });
    };

    if response.invocations.len() > 1 {
        tracing::debug!(
            count = response.invocations.len(),
            "classifier returned several invocations; using the first"
        );
    }

    let arguments = parse_arguments(&invocation.capability_name, &invocation.arguments_json);
    tracing::info!(capability = %invocation.capability_name, affect = %affect, "classifier chose capability");

    (
        true,
        IntentPayload::CapabilityCall {
            capability: invocation.capability_name.clone(),
            arguments,
            affect,
        },
    )
}

fn parse_arguments(capability: &str, raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            tracing::warn!(capability = %capability, arguments = %other, "arguments are not an object; using {{}}");
            Value::Object(Map::new())
        }
        Err(error) => {
            tracing::warn!(capability = %capability, error = %error, "malformed arguments; using {{}}");
            Value::Object(Map::new())
        }
    }
}
