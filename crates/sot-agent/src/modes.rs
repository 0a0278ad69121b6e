//! CLI Modes
//!
//! Terminal front ends over [`SotAgent`]. Output meant for the user goes to stdout;
//! diagnostics go through `tracing`.

use anyhow::Result;
use sot_core::{InstructionOutcome, InstructionSet, Scalar};
use sot_sensors::SensorReadings;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::agent::{AgentResponse, CycleReport, SotAgent};

const DEMO_QUERIES: [&str; 3] = [
    "What is the current temperature?",
    "Analyze the trend of humidity over the last hour",
    "Is there any unusual activity detected in the environment?",
];

/// Read queries from stdin until `exit`, `quit` or end of input
pub async fn interactive(agent: &mut SotAgent) -> Result<()> {
    println!("Sketch-of-Thought AI Agent - Interactive Mode");
    println!("Type 'exit' to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\n> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let query = line.trim();
        if is_exit(query) {
            break;
        }
        if query.is_empty() {
            continue;
        }

        let report = agent.run_once(Some(query)).await;
        print_report(&report);
    }

    Ok(())
}

/// Seed the world model, then answer a fixed set of questions
pub async fn demo(agent: &mut SotAgent) -> Result<()> {
    println!("Sketch-of-Thought AI Agent - Demo Mode\n");

    let seeded = agent.ingest_data(Some(demo_readings())).await;
    if !seeded.is_empty() {
        println!("Events from seed data: {}", seeded.join("; "));
    }

    for query in DEMO_QUERIES {
        println!("\nQuery: {query}");
        let report = agent.run_once(Some(query)).await;
        print_report(&report);
        if let Some(output) = report.response.output() {
            println!("\nReasoning Sketch:\n{}", output.reasoning_sketch);
        }
        tokio::time::sleep(std::time::Duration::from_secs(1)).await;
    }

    Ok(())
}

/// Run a small prioritized, dependency-linked instruction set
pub async fn instructions(agent: &SotAgent) -> Result<()> {
    println!("Sketch-of-Thought AI Agent - Instruction Mode\n");

    let mut set = sample_instructions();
    let outcomes = agent.run_instructions(&mut set).await;

    for outcome in &outcomes {
        match outcome {
            InstructionOutcome::Completed {
                instruction,
                analysis,
                response,
                verification,
            } => {
                println!("Instruction: {instruction}");
                println!("Analysis: {}", serde_json::to_string_pretty(analysis)?);
                println!("Response: {response}");
                println!("Verification: {}\n", serde_json::to_string_pretty(verification)?);
            }
            InstructionOutcome::Failed { instruction, error } => {
                println!("Instruction: {instruction}");
                println!("Failed: {error}\n");
            }
        }
    }

    if !set.all_completed() {
        println!("Some instructions were never eligible (dependency cycle?)");
    }
    Ok(())
}

pub fn sample_instructions() -> InstructionSet {
    let mut set = InstructionSet::new();
    let list = set.add(
        "Create a list of 5 alternative energy sources and their main advantages",
        5,
        [],
    );
    let compare = set.add(
        "Compare the two sources from the list with the lowest installation cost",
        3,
        [list],
    );
    set.add(
        "Summarize the comparison in two sentences for a non-technical reader",
        1,
        [compare],
    );
    set.add("State the current date format you will use in all answers", 4, []);
    set
}

fn demo_readings() -> SensorReadings {
    let mut readings = SensorReadings::new();
    readings.insert("temperature".into(), Scalar::Number(22.5));
    readings.insert("humidity".into(), Scalar::Number(45.2));
    readings.insert("motion".into(), Scalar::Bool(false));
    readings
}

fn is_exit(input: &str) -> bool {
    input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit")
}

fn print_report(report: &CycleReport) {
    match &report.response {
        AgentResponse::Success { output, .. } => {
            println!("\nAgent: {}", output.text);
            if let Some(viz) = &output.visualization {
                println!("\n[{} visualization available]", viz.kind);
            }
        }
        AgentResponse::Idle => println!("\nAgent: idle"),
    }
    if !report.events_detected.is_empty() {
        println!("Events: {}", report.events_detected.join("; "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_words() {
        assert!(is_exit("exit"));
        assert!(is_exit("QUIT"));
        assert!(!is_exit("exit now"));
    }

    #[test]
    fn test_sample_instructions_order() {
        let mut set = sample_instructions();
        let mut order = Vec::new();
        while let Some(next) = set.get_next() {
            order.push(next.priority);
            set.mark_current_completed();
        }
        assert_eq!(order, vec![5, 4, 3, 1]);
        assert!(set.all_completed());
    }

    #[test]
    fn test_demo_readings_are_quiet() {
        let readings = demo_readings();
        assert_eq!(readings.get("temperature"), Some(&Scalar::Number(22.5)));
        assert_eq!(readings.len(), 3);
    }
}
