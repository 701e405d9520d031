//! JSON and JSON-lines payload parsing.

use super::{NormalizedOutput, ParseError};
use crate::result::Metadata;
use serde_json::{Map, Value};

/// Fields that may hold the primary answer, in lookup order.
const CONTENT_KEYS: [&str; 5] = ["content", "result", "response", "text", "message"];

/// Top-level fields copied into metadata when present.
const METADATA_KEYS: [&str; 6] = [
    "model",
    "usage",
    "stats",
    "session_id",
    "thread_id",
    "total_cost_usd",
];

/// Candidate payload starts decoded before giving up.
const MAX_DECODE_ATTEMPTS: usize = 16;

/// Parse a single JSON payload, tolerating non-JSON text before and after it.
///
/// Candidates are tried in order of appearance. A value that decodes but
/// carries no content (`[1]`, `[]` in a log preamble) does not end the search;
/// scanning resumes after it, so text nested inside a decoded value is never
/// taken as a payload of its own.
pub(super) fn parse_json(raw: &str) -> Result<NormalizedOutput, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyOutput);
    }

    let mut first_error: Option<ParseError> = None;
    let mut resume_at = 0;
    let mut attempts = 0;

    for (start, _) in raw.match_indices(['{', '[']) {
        if start < resume_at {
            continue;
        }
        if attempts == MAX_DECODE_ATTEMPTS {
            break;
        }
        attempts += 1;

        let mut stream = serde_json::Deserializer::from_str(&raw[start..]).into_iter::<Value>();
        let outcome = match stream.next() {
            Some(Ok(value)) => {
                resume_at = start + stream.byte_offset();
                payload_output(&value)
            }
            Some(Err(e)) => Err(ParseError::InvalidJson(e.to_string())),
            None => continue,
        };
        match outcome {
            Ok(output) => return Ok(output),
            Err(e) => {
                first_error.get_or_insert(e);
            }
        }
    }

    Err(first_error.unwrap_or(ParseError::NoPayload))
}

fn payload_output(payload: &Value) -> Result<NormalizedOutput, ParseError> {
    let (content, metadata) = match payload {
        Value::Object(map) => {
            let content = object_content(map).ok_or(ParseError::MissingContent)?;
            (content, object_metadata(map))
        }
        Value::Array(items) => (array_content(items), Metadata::new()),
        _ => return Err(ParseError::NoPayload),
    };

    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::EmptyContent);
    }

    Ok(NormalizedOutput {
        content: content.to_string(),
        metadata,
    })
}

/// Parse newline-delimited JSON events.
///
/// Lines that are not JSON are skipped; CLIs often interleave log noise.
pub(super) fn parse_json_lines(raw: &str) -> Result<NormalizedOutput, ParseError> {
    if raw.trim().is_empty() {
        return Err(ParseError::EmptyOutput);
    }

    let mut messages: Vec<String> = Vec::new();
    let mut metadata = Metadata::new();
    let mut events = 0usize;

    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(Value::Object(event)) = serde_json::from_str::<Value>(line) else {
            continue;
        };
        events += 1;

        if let Some(text) = event_message(&event) {
            messages.push(text);
        }

        for key in METADATA_KEYS {
            if let Some(value) = event.get(key)
                && !value.is_null()
            {
                // Later events carry the final totals.
                metadata.insert(key.to_string(), value.clone());
            }
        }
    }

    if events == 0 {
        return Err(ParseError::NoPayload);
    }
    if messages.is_empty() {
        return Err(ParseError::MissingContent);
    }

    let content = messages.join("\n\n");
    let content = content.trim();
    if content.is_empty() {
        return Err(ParseError::EmptyContent);
    }

    Ok(NormalizedOutput {
        content: content.to_string(),
        metadata,
    })
}

fn object_content(map: &Map<String, Value>) -> Option<String> {
    CONTENT_KEYS
        .iter()
        .find_map(|key| map.get(*key).and_then(value_text))
}

fn object_metadata(map: &Map<String, Value>) -> Metadata {
    let mut metadata = Metadata::new();

    if let Some(Value::Object(explicit)) = map.get("metadata") {
        for (key, value) in explicit {
            metadata.insert(key.clone(), value.clone());
        }
    }

    for key in METADATA_KEYS {
        if let Some(value) = map.get(key)
            && !value.is_null()
        {
            metadata
                .entry(key.to_string())
                .or_insert_with(|| value.clone());
        }
    }

    metadata
}

fn array_content(items: &[Value]) -> String {
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Object(map) => object_content(map),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => Some(array_content(items)),
        other => serde_json::to_string_pretty(other).ok(),
    }
}

/// Extract an assistant message from one streamed event.
fn event_message(event: &Map<String, Value>) -> Option<String> {
    // {"type":"item.completed","item":{"type":"agent_message","text":"..."}}
    if let Some(Value::Object(item)) = event.get("item")
        && item.get("type").and_then(Value::as_str) == Some("agent_message")
    {
        return item.get("text").and_then(value_text);
    }

    // {"msg":{"type":"agent_message","message":"..."}}
    if let Some(Value::Object(msg)) = event.get("msg")
        && msg.get("type").and_then(Value::as_str) == Some("agent_message")
    {
        return msg.get("message").and_then(value_text);
    }

    ["content", "result", "response"]
        .iter()
        .find_map(|key| event.get(*key).and_then(value_text))
}
