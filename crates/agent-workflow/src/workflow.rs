//! Workflow definition and execution
//!
//! A [`Workflow`] is an ordered list of named [`Stage`]s. Stages run one at
//! a time in the order they were added. Each stage renders its prompt from
//! the topic and the outputs of earlier stages, then hands it to its agent.
//!
//! A stage whose preconditions are not met is skipped, and a stage whose
//! agent fails is recorded as failed. Neither stops the pipeline.

use agent_core::{Agent, Context, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, warn};

/// Substituted for a `{stage}` placeholder whose stage produced no output
pub const NOT_AVAILABLE: &str = "Not available";

/// Placeholder name reserved for the workflow input
pub const TOPIC_PLACEHOLDER: &str = "topic";

/// Failure recorded for a stage whose agent replied with only whitespace
pub const EMPTY_RESPONSE: &str = "empty response";

/// One step of a workflow
#[derive(Clone)]
pub struct Stage {
    name: String,
    agent: Arc<dyn Agent>,
    template: String,
    requires: Vec<String>,
    min_completed: usize,
}

impl Stage {
    /// A stage that sends `template`, rendered, to `agent`
    ///
    /// `{topic}` expands to the workflow input and `{<stage>}` to the output
    /// of an earlier stage.
    pub fn new(name: impl Into<String>, agent: Arc<dyn Agent>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            agent,
            template: template.into(),
            requires: Vec::new(),
            min_completed: 0,
        }
    }

    /// Only run if `stage` completed
    pub fn requires(mut self, stage: impl Into<String>) -> Self {
        self.requires.push(stage.into());
        self
    }

    /// Only run if at least `count` earlier stages completed
    pub fn min_completed(mut self, count: usize) -> Self {
        self.min_completed = count;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Why this stage cannot run yet, if it cannot
    fn unmet_precondition(&self, run: &WorkflowRun) -> Option<String> {
        let missing: Vec<&str> = self
            .requires
            .iter()
            .filter(|stage| run.output(stage).is_none())
            .map(String::as_str)
            .collect();
        if !missing.is_empty() {
            return Some(format!("requires {}", missing.join(", ")));
        }

        let completed = run.completed().len();
        if completed < self.min_completed {
            return Some(format!(
                "needs at least {} completed stages, have {completed}",
                self.min_completed
            ));
        }
        None
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("agent", &self.agent.name())
            .field("requires", &self.requires)
            .field("min_completed", &self.min_completed)
            .finish_non_exhaustive()
    }
}

/// Fill `{topic}` and `{<stage>}` placeholders in `template`
///
/// Placeholders naming a stage without output render as [`NOT_AVAILABLE`].
/// Anything else in braces is left untouched.
pub fn render_prompt(
    template: &str,
    topic: &str,
    stage_names: &[&str],
    outputs: &HashMap<&str, &str>,
) -> String {
    let mut rendered = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        rendered.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            rendered.push_str(&rest[open..]);
            return rendered;
        };

        let key = &after[..close];
        if key == TOPIC_PLACEHOLDER {
            rendered.push_str(topic);
        } else if stage_names.contains(&key) {
            rendered.push_str(outputs.get(key).copied().unwrap_or(NOT_AVAILABLE));
        } else {
            rendered.push('{');
            rendered.push_str(key);
            rendered.push('}');
        }
        rest = &after[close + 1..];
    }

    rendered.push_str(rest);
    rendered
}

/// What happened to one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StageStatus {
    Completed { output: String },
    Failed { error: String },
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageOutcome {
    pub stage: String,
    #[serde(flatten)]
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// Record of one workflow execution, stages in execution order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowRun {
    pub workflow: String,
    pub topic: String,
    pub stages: Vec<StageOutcome>,
    pub duration_ms: u64,
}

impl WorkflowRun {
    fn new(workflow: &str, topic: &str) -> Self {
        Self {
            workflow: workflow.to_string(),
            topic: topic.to_string(),
            stages: Vec::new(),
            duration_ms: 0,
        }
    }

    /// Output of `stage`, if it completed
    pub fn output(&self, stage: &str) -> Option<&str> {
        self.outputs()
            .find(|(name, _)| *name == stage)
            .map(|(_, output)| output)
    }

    /// `(stage, output)` for completed stages, in stage order
    pub fn outputs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.stages.iter().filter_map(|outcome| match &outcome.status {
            StageStatus::Completed { output } => Some((outcome.stage.as_str(), output.as_str())),
            _ => None,
        })
    }

    pub fn completed(&self) -> Vec<&str> {
        self.outputs().map(|(name, _)| name).collect()
    }

    /// `(stage, error)` for failed stages
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.stages
            .iter()
            .filter_map(|outcome| match &outcome.status {
                StageStatus::Failed { error } => Some((outcome.stage.as_str(), error.as_str())),
                _ => None,
            })
            .collect()
    }

    /// `(stage, reason)` for skipped stages
    pub fn skipped(&self) -> Vec<(&str, &str)> {
        self.stages
            .iter()
            .filter_map(|outcome| match &outcome.status {
                StageStatus::Skipped { reason } => Some((outcome.stage.as_str(), reason.as_str())),
                _ => None,
            })
            .collect()
    }

    /// Output of the last stage that completed
    pub fn last_output(&self) -> Option<&str> {
        self.outputs().last().map(|(_, output)| output)
    }

    /// True when every stage completed
    pub fn is_complete(&self) -> bool {
        self.stages
            .iter()
            .all(|outcome| matches!(outcome.status, StageStatus::Completed { .. }))
    }
}

/// A named, ordered pipeline of agents
///
/// # Example
///
/// ```no_run
/// use agent_core::Agent;
/// use agent_workflow::{Stage, Workflow};
/// use std::sync::Arc;
///
/// # async fn example(writer: Arc<dyn Agent>, editor: Arc<dyn Agent>) -> agent_core::Result<()> {
/// let workflow = Workflow::builder("article")
///     .stage(Stage::new("draft", writer, "Write a short article about {topic}."))
///     .stage(Stage::new("edit", editor, "Tighten this draft:\n\n{draft}").requires("draft"))
///     .build()?;
///
/// let run = workflow.run("Rust ownership").await;
/// println!("{}", run.last_output().unwrap_or("no output"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Workflow {
    name: String,
    stages: Vec<Stage>,
}

impl Workflow {
    pub fn builder(name: impl Into<String>) -> WorkflowBuilder {
        WorkflowBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// Run every stage with a fresh context
    pub async fn run(&self, topic: &str) -> WorkflowRun {
        let mut context = Context::new();
        self.run_with_context(topic, &mut context).await
    }

    /// Run every stage in order, sharing `context` between the agents
    ///
    /// The context's stage key names the stage currently executing.
    pub async fn run_with_context(&self, topic: &str, context: &mut Context) -> WorkflowRun {
        let started = Instant::now();
        let stage_names: Vec<&str> = self.stages.iter().map(Stage::name).collect();
        let mut run = WorkflowRun::new(&self.name, topic);

        info!(workflow = %self.name, stages = self.stages.len(), "Workflow started");

        for stage in &self.stages {
            let stage_started = Instant::now();

            let status = if let Some(reason) = stage.unmet_precondition(&run) {
                warn!(workflow = %self.name, stage = %stage.name, %reason, "Stage skipped");
                StageStatus::Skipped { reason }
            } else {
                let outputs: HashMap<&str, &str> = run.outputs().collect();
                let prompt = render_prompt(&stage.template, topic, &stage_names, &outputs);
                context.set_stage(stage.name.clone());
                info!(
                    workflow = %self.name,
                    stage = %stage.name,
                    agent = %stage.agent.name(),
                    prompt_length = prompt.len(),
                    "Stage started"
                );

                match stage.agent.process(prompt, context).await {
                    Ok(output) if output.trim().is_empty() => {
                        warn!(stage = %stage.name, "Stage returned an empty reply");
                        StageStatus::Failed {
                            error: EMPTY_RESPONSE.to_string(),
                        }
                    }
                    Ok(output) => {
                        info!(stage = %stage.name, output_length = output.len(), "Stage completed");
                        StageStatus::Completed { output }
                    }
                    Err(e) => {
                        error!(stage = %stage.name, error = %e, "Stage failed");
                        StageStatus::Failed {
                            error: e.to_string(),
                        }
                    }
                }
            };

            run.stages.push(StageOutcome {
                stage: stage.name.clone(),
                status,
                duration_ms: elapsed_ms(stage_started),
            });
        }

        run.duration_ms = elapsed_ms(started);
        info!(
            workflow = %self.name,
            completed = run.completed().len(),
            failed = run.failures().len(),
            skipped = run.skipped().len(),
            duration_ms = run.duration_ms,
            "Workflow finished"
        );
        run
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Builder for constructing workflows
pub struct WorkflowBuilder {
    name: String,
    stages: Vec<Stage>,
}

impl WorkflowBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
        }
    }

    /// Append a stage
    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Build the workflow
    ///
    /// # Errors
    ///
    /// Fails when there are no stages, when two stages share a name, when a
    /// stage is named `topic`, or when a stage requires a stage that does not
    /// run before it.
    pub fn build(self) -> Result<Workflow> {
        if self.stages.is_empty() {
            return Err(invalid(&self.name, "has no stages"));
        }

        let mut seen = HashSet::new();
        for stage in &self.stages {
            if stage.name == TOPIC_PLACEHOLDER {
                return Err(invalid(&self.name, "stage name 'topic' is reserved"));
            }
            if let Some(required) = stage.requires.iter().find(|r| !seen.contains(r.as_str())) {
                return Err(invalid(
                    &self.name,
                    &format!(
                        "stage '{}' requires '{required}', which does not run before it",
                        stage.name
                    ),
                ));
            }
            if !seen.insert(stage.name.as_str()) {
                return Err(invalid(
                    &self.name,
                    &format!("stage '{}' is defined more than once", stage.name),
                ));
            }
        }

        Ok(Workflow {
            name: self.name,
            stages: self.stages,
        })
    }
}

fn invalid(workflow: &str, problem: &str) -> Error {
    Error::InitializationFailed(format!("Workflow '{workflow}' {problem}"))
}
