//! Prompt Templates
//!
//! One template per reasoning paradigm plus the three instruction-following stages.

use crate::paradigm::Paradigm;
use crate::world::WorldModel;

pub const THINKING_START: &str = "<thinking>";
pub const THINKING_END: &str = "</thinking>";
pub const ANSWER_START: &str = "<answer>";
pub const ANSWER_END: &str = "</answer>";

/// Build the reasoning prompt for `paradigm`
pub fn render(paradigm: Paradigm, task: &str, world: &WorldModel) -> String {
    let world_state = world.to_prompt_text();

    match paradigm {
        Paradigm::ConceptualChaining => format!(
            r"You are an AI reasoning using the Sketch-of-Thought (SoT) Conceptual Chaining paradigm.

In Conceptual Chaining, you link key concepts with minimal words, using -> arrows.
For example: Seoul -> South Korea -> Won (Currency)

Current world state:
{world_state}
Task: {task}

Think step by step, but use concise concept chains. Respond in this format:

<thinking>
[Your condensed chain of concepts, using -> arrows]
</thinking>

<answer>
[Your final answer/explanation based on the conceptual chain]
</answer>
"
        ),
        Paradigm::ChunkedSymbolism => format!(
            r"You are an AI reasoning using the Sketch-of-Thought (SoT) Chunked Symbolism paradigm.

In Chunked Symbolism, you compress quantitative reasoning into symbols and equations.
For example: v_f = v_i + a·t = 15 m/s + 2.5 m/s² · 10 s = 40 m/s

Current world state:
{world_state}
Task: {task}

Think step by step using equations and symbols. Respond in this format:

<thinking>
[Your symbolic calculations and equations]
</thinking>

<answer>
[Your final answer/explanation based on the calculations]
</answer>
"
        ),
        Paradigm::ExpertLexicon => format!(
            r"You are an AI reasoning using the Sketch-of-Thought (SoT) Expert Lexicon paradigm.

In Expert Lexicon, you use domain-specific shorthand and abbreviations.
For example: Pt w/ STEMI -> MONA (Morphine, O2, Nitrates, Aspirin)

Current world state:
{world_state}
Task: {task}

Think using domain expert shorthand. Respond in this format:

<thinking>
[Your expert shorthand reasoning]
</thinking>

<answer>
[Your final answer/explanation based on the expert reasoning]
</answer>
"
        ),
        Paradigm::Default => format!(
            r"You are an AI assistant tasked with answering a question or solving a problem.

Current world state:
{world_state}
Task: {task}

Think step by step, then provide your answer.

<thinking>
[Your step-by-step reasoning]
</thinking>

<answer>
[Your final answer/explanation]
</answer>
"
        ),
    }
}

/// Stage 1: break an instruction into its components
pub fn instruction_analysis(instruction: &str) -> String {
    format!(
        r"You are an AI assistant dedicated to accurately following instructions.
Your task is to analyze the following instruction:

INSTRUCTION: {instruction}

Break down this instruction into:
1. Primary objective(s)
2. Constraints or requirements
3. Any specific methodologies to follow
4. Expected output format

Respond in JSON format with these components.
"
    )
}

/// Stage 2: carry the instruction out against its analysis
pub fn instruction_execution(instruction: &str, analysis: &str) -> String {
    format!(
        r"You are an AI assistant following instructions precisely.

INSTRUCTION: {instruction}

INSTRUCTION ANALYSIS: {analysis}

Based on this analysis, execute the instruction exactly as specified.
Ensure your response adheres to all constraints and output formats.
"
    )
}

/// Stage 3: check the execution against the analysis
pub fn instruction_verification(instruction: &str, analysis: &str, response: &str) -> String {
    format!(
        r"You are an AI assistant verifying instruction execution.

ORIGINAL INSTRUCTION: {instruction}
INSTRUCTION ANALYSIS: {analysis}
GENERATED RESPONSE: {response}

Verify if the response correctly follows the instruction.
Check against each component of the analysis.
If there are discrepancies, explain them.

Respond in JSON format with a verification result (true/false) and explanation.
"
    )
}
