//! # sot-core
//!
//! Sketch-of-Thought reasoning core with a provider-agnostic completion capability.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                         SotReasoner                           │
//! │  ┌──────────────┐  ┌─────────────┐  ┌──────────────────────┐  │
//! │  │  Paradigm    │  │   Prompt    │  │   TextGenerator      │  │
//! │  │  Selector    │──│  Templates  │──│   (LlmProvider)      │  │
//! │  └──────────────┘  └─────────────┘  └──────────────────────┘  │
//! │                      extract_between → thinking / answer      │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The same `TextGenerator` drives the [`InstructionProcessor`] pipeline
//! (analyze → execute → verify), fed from a priority/dependency [`InstructionSet`].

pub mod completion;
pub mod error;
pub mod extract;
pub mod instruction;
pub mod message;
pub mod mock;
pub mod paradigm;
pub mod prompt;
pub mod provider;
pub mod reasoning;
pub mod world;

pub use completion::TextGenerator;
pub use error::{AgentError, Result};
pub use instruction::{Instruction, InstructionOutcome, InstructionProcessor, InstructionSet};
pub use message::{Message, Role};
pub use paradigm::{Paradigm, ParadigmSelector};
pub use provider::{GenerationOptions, LlmProvider};
pub use reasoning::{ReasoningResult, SotReasoner};
pub use world::{ContextValue, Scalar, WorldModel};
