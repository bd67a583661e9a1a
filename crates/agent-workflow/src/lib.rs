//! Sequential multi-agent pipelines for the agent workshop
//!
//! A [`Workflow`] runs named [`Stage`]s strictly in order, feeding earlier
//! outputs into later prompts. [`research`] holds the research-team preset
//! and [`WorkflowAgent`] exposes any workflow through the `Agent` trait.

pub mod research;
pub mod workflow;
pub mod workflow_agent;

pub use research::{render_report, research_team, research_workflow};
pub use workflow::{
    EMPTY_RESPONSE, NOT_AVAILABLE, Stage, StageOutcome, StageStatus, Workflow, WorkflowBuilder,
    WorkflowRun, render_prompt,
};
pub use workflow_agent::WorkflowAgent;
