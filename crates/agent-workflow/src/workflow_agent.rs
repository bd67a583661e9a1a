//! Workflow agent implementation (wraps a workflow as an agent)

use crate::workflow::{Workflow, WorkflowRun};
use agent_core::{Agent, Context, Error, Result};
use async_trait::async_trait;

/// Context key under which the last run is stored
pub const WORKFLOW_RUN_KEY: &str = "workflow_run";

/// Wraps a Workflow as an Agent
///
/// The input is used as the workflow topic and the reply is the output of
/// the last stage that completed. The full [`WorkflowRun`] is stored in the
/// context under [`WORKFLOW_RUN_KEY`]. This lets a pipeline be used as a
/// stage of another pipeline or as a tool of an orchestrating agent.
pub struct WorkflowAgent {
    workflow: Workflow,
    name: String,
    description: String,
}

impl WorkflowAgent {
    pub fn new(name: impl Into<String>, workflow: Workflow) -> Self {
        let description = format!("Runs the '{}' multi-agent workflow", workflow.name());
        Self {
            workflow,
            name: name.into(),
            description,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn workflow(&self) -> &Workflow {
        &self.workflow
    }
}

#[async_trait]
impl Agent for WorkflowAgent {
    async fn process(&self, input: String, context: &mut Context) -> Result<String> {
        let run = self.workflow.run_with_context(&input, context).await;
        context.insert_typed(WORKFLOW_RUN_KEY, &run)?;

        last_output(&run)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }
}

fn last_output(run: &WorkflowRun) -> Result<String> {
    if let Some(output) = run.last_output() {
        return Ok(output.to_string());
    }
    let reasons: Vec<String> = run
        .failures()
        .into_iter()
        .map(|(stage, error)| format!("{stage}: {error}"))
        .collect();
    Err(Error::ProcessingFailed(format!(
        "Workflow '{}' produced no output ({})",
        run.workflow,
        reasons.join("; ")
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Stage;
    use std::sync::Arc;

    struct Upper;

    #[async_trait]
    impl Agent for Upper {
        async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
            Ok(input.to_uppercase())
        }

        fn name(&self) -> &str {
            "upper"
        }
    }

    struct Broken;

    #[async_trait]
    impl Agent for Broken {
        async fn process(&self, _input: String, _context: &mut Context) -> Result<String> {
            Err(Error::ProcessingFailed("boom".to_string()))
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    #[tokio::test]
    async fn test_returns_last_output_and_stores_run() {
        let workflow = Workflow::builder("shout")
            .stage(Stage::new("loud", Arc::new(Upper), "say {topic}"))
            .stage(Stage::new("after", Arc::new(Broken), "{loud}"))
            .build()
            .unwrap();
        let agent = WorkflowAgent::new("shouter", workflow);
        assert_eq!(agent.description(), "Runs the 'shout' multi-agent workflow");

        let mut context = Context::new();
        let out = agent.process("hi".to_string(), &mut context).await.unwrap();
        assert_eq!(out, "SAY HI");

        let run: WorkflowRun = context.get_typed(WORKFLOW_RUN_KEY).unwrap().unwrap();
        assert_eq!(run.completed(), ["loud"]);
        assert_eq!(run.failures().len(), 1);
    }

    #[tokio::test]
    async fn test_error_when_nothing_completed() {
        let workflow = Workflow::builder("doomed")
            .stage(Stage::new("only", Arc::new(Broken), "{topic}"))
            .build()
            .unwrap();
        let agent = WorkflowAgent::new("doomed", workflow);

        let err = agent
            .process("x".to_string(), &mut Context::new())
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Agent processing failed: Workflow 'doomed' produced no output (only: Agent processing failed: boom)"
        );
    }
}
