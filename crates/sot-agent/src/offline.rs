//! Offline provider
//!
//! Canned Sketch-of-Thought replies keyed on which template produced the prompt,
//! so every mode and endpoint works without a model server.

use sot_core::mock::ScriptedProvider;
use sot_core::Message;

pub fn provider() -> ScriptedProvider {
    ScriptedProvider::from_fn(|messages| Ok(reply(messages)))
}

fn reply(messages: &[Message]) -> String {
    let prompt = messages.last().map_or("", |m| m.content.as_str());

    if prompt.contains("analyze the following instruction") {
        let instruction = field(prompt, "INSTRUCTION: ");
        return serde_json::json!({
            "primary_objectives": [instruction],
            "constraints": [],
            "methodology": "address each part of the instruction in order",
            "output_format": "plain text",
        })
        .to_string();
    }
    if prompt.contains("verifying instruction execution") {
        return r#"{"verified": true, "explanation": "The response addresses the stated objective."}"#
            .to_string();
    }
    if prompt.contains("following instructions precisely") {
        return format!("Completed: {}", field(prompt, "INSTRUCTION: "));
    }

    let task = field(prompt, "Task: ");
    let (thinking, answer) = if prompt.contains("Conceptual Chaining") {
        (
            format!("{task} -> world state -> assessment\nassessment -> answer"),
            format!("Linked the question to the current readings: {task}"),
        )
    } else if prompt.contains("Chunked Symbolism") {
        (
            "T = temperature\nH = humidity\nHI = T + 0.05*H".to_string(),
            "Computed from the current readings.".to_string(),
        )
    } else if prompt.contains("Expert Lexicon") {
        (
            "Dx: insufficient hx -> r/o acute cause".to_string(),
            "Needs more domain context before a firm recommendation.".to_string(),
        )
    } else {
        (
            format!("1. read task\n2. consult state\n3. answer {task}"),
            "Done.".to_string(),
        )
    };

    format!("<thinking>\n{thinking}\n</thinking>\n\n<answer>\n{answer}\n</answer>")
}

/// Rest of the first line that starts with `label`
fn field<'a>(prompt: &'a str, label: &str) -> &'a str {
    prompt
        .lines()
        .find_map(|line| line.strip_prefix(label))
        .map_or("", str::trim)
}
