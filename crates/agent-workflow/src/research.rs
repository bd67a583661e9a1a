//! Research team preset
//!
//! Four specialists run in sequence: research, then analysis and fact
//! checking of the research, then a quality review once at least two
//! reports exist. [`render_report`] turns the run into a markdown report.

use crate::workflow::{Stage, Workflow, WorkflowRun};
use agent_core::{Agent, Result};
use agent_runtime::AgentRuntime;
use std::sync::Arc;

pub const RESEARCH: &str = "research";
pub const ANALYSIS: &str = "analysis";
pub const FACTCHECK: &str = "factcheck";
pub const QA: &str = "qa";

const RESEARCH_SYSTEM: &str = "You are a specialized Research Agent. \
You will be given a topic and you need to return comprehensive research findings, \
noting where each claim comes from.";

const ANALYSIS_SYSTEM: &str = "You are a specialized Analysis Agent. \
You work through research data step by step. You will be given research findings \
and you need to return a detailed analysis with insights and patterns.";

const FACTCHECK_SYSTEM: &str = "You are a specialized Fact-Checking Agent. \
You will be given claims and findings and you need to return fact-checking results \
with verification details and a confidence level for each claim.";

const QA_SYSTEM: &str = "You are a specialized Quality Assurance Agent. \
Your expertise is to assess research quality and completeness. You will be given a \
complete research summary and you need to return a quality assessment with scores \
and recommendations.";

const RESEARCH_PROMPT: &str = "Please conduct comprehensive research on the following topic: {topic}

Provide a thorough analysis covering:
1. Key concepts and definitions
2. Current state and recent developments
3. Important facts and statistics
4. Major players or stakeholders involved
5. Challenges and opportunities
6. Future outlook and trends

Please be comprehensive and well-structured in your response.";

const ANALYSIS_PROMPT: &str = "Please analyze the following research data about {topic}:

{research}

Provide a detailed analysis including:
1. Key insights and patterns
2. Critical success factors
3. Risk assessment
4. Strategic implications
5. Recommendations for action
6. Areas requiring further investigation

Focus on actionable insights and strategic implications.";

const FACTCHECK_PROMPT: &str = "Please fact-check the following research about {topic}:

{research}

Verify:
1. Factual accuracy of key claims
2. Consistency of information
3. Logical coherence
4. Potential misinformation or errors
5. Source credibility assessment
6. Areas needing verification

Provide a detailed fact-check report with specific findings.";

const QA_PROMPT: &str = "Please conduct quality assurance on this research project about {topic}.

Research Results:
{research}

Analysis Results:
{analysis}

Fact-check Results:
{factcheck}

Evaluate:
1. Overall research quality and completeness
2. Consistency across different phases
3. Gaps or weaknesses identified
4. Reliability and credibility assessment
5. Recommendations for improvement
6. Final quality rating and justification

Provide a comprehensive quality assessment report.";

/// Section headings of the report, in stage order
const SECTIONS: [(&str, &str); 4] = [
    (RESEARCH, "Research Findings"),
    (ANALYSIS, "Strategic Analysis"),
    (FACTCHECK, "Fact-Check Report"),
    (QA, "Quality Assurance Assessment"),
];

/// The research pipeline around four caller-supplied agents
pub fn research_workflow(
    researcher: Arc<dyn Agent>,
    analyst: Arc<dyn Agent>,
    fact_checker: Arc<dyn Agent>,
    reviewer: Arc<dyn Agent>,
) -> Result<Workflow> {
    Workflow::builder("research_team")
        .stage(Stage::new(RESEARCH, researcher, RESEARCH_PROMPT))
        .stage(Stage::new(ANALYSIS, analyst, ANALYSIS_PROMPT).requires(RESEARCH))
        .stage(Stage::new(FACTCHECK, fact_checker, FACTCHECK_PROMPT).requires(RESEARCH))
        .stage(Stage::new(QA, reviewer, QA_PROMPT).min_completed(2))
        .build()
}

/// The research pipeline with specialists built from `runtime`
///
/// Every specialist shares the runtime's model handle.
pub fn research_team(runtime: &AgentRuntime) -> Result<Workflow> {
    let specialist = |name: &str, description: &str, system_prompt: &str| -> Arc<dyn Agent> {
        let config = runtime.simple_config().with_system_prompt(system_prompt);
        Arc::new(
            runtime
                .create_simple_agent(config, name)
                .with_description(description),
        )
    };

    research_workflow(
        specialist(
            "ResearchSpecialist",
            "Gathers comprehensive research on a topic",
            RESEARCH_SYSTEM,
        ),
        specialist(
            "AnalysisSpecialist",
            "Analyzes research data for insights and patterns",
            ANALYSIS_SYSTEM,
        ),
        specialist(
            "FactCheckSpecialist",
            "Verifies claims made in research findings",
            FACTCHECK_SYSTEM,
        ),
        specialist(
            "QualityAssuranceSpecialist",
            "Assesses research quality and completeness",
            QA_SYSTEM,
        ),
    )
}

/// Markdown report of a research run
pub fn render_report(run: &WorkflowRun) -> String {
    let completed = run.completed();
    let mut report = format!(
        "# Comprehensive Research Report: {}\n\nGenerated by the multi-agent research team\nAgents involved: {}\n",
        run.topic,
        if completed.is_empty() {
            "none".to_string()
        } else {
            completed.join(", ")
        }
    );

    for (stage, heading) in SECTIONS {
        if let Some(output) = run.output(stage) {
            report.push_str(&format!("\n## {heading}\n\n{}\n", output.trim_end()));
        }
    }

    let problems: Vec<String> = run
        .failures()
        .into_iter()
        .map(|(stage, error)| format!("- {stage}: failed: {error}"))
        .chain(
            run.skipped()
                .into_iter()
                .map(|(stage, reason)| format!("- {stage}: skipped ({reason})")),
        )
        .collect();
    if !problems.is_empty() {
        report.push_str("\n## Incomplete Stages\n\n");
        report.push_str(&problems.join("\n"));
        report.push('\n');
    }

    report.push_str(&format!(
        "\n---\n*Completed {} of {} stages in {:.1}s*\n",
        completed.len(),
        run.stages.len(),
        run.duration_ms as f64 / 1000.0
    ));
    report
}
