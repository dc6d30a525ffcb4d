//! End-to-end simulation: classify the contract, run the negotiation
//! pipeline, extract redlines and assemble a report.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::classifier::{classify, ContractAnalysis, RiskBand};
use crate::config::{Config, DocumentConfig};
use crate::document::ContractDocument;
use crate::error::ArtifactError;
use crate::generation::Generator;
use crate::pipeline::{
    self, AggressionProfile, ArtifactStore, NegotiationInputs, PersonaConfig, PipelineSettings,
    RunOutputs, StageKind,
};
use crate::redline::{parse_clause_comparisons, render_markdown, ClauseComparison};

/// File name of the rendered report inside the run directory.
pub const REPORT_FILE: &str = "verdict_report.md";

/// Per-simulation choices.
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    pub aggression: AggressionProfile,
    /// Replaces the detected user role when set.
    pub user_role: Option<String>,
    /// Replaces the detected counter-party role when set.
    pub counter_party: Option<String>,
    pub include_coaching: bool,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            aggression: AggressionProfile::default(),
            user_role: None,
            counter_party: None,
            include_coaching: true,
        }
    }
}

/// Everything a simulation produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationReport {
    pub run_id: String,
    pub generated_at: DateTime<Utc>,
    pub aggression: AggressionProfile,
    pub analysis: ContractAnalysis,
    pub outputs: RunOutputs,
    pub clauses: Vec<ClauseComparison>,
}

/// Simulation front door.
pub struct WarRoom {
    agent: Arc<dyn Generator>,
    classifier: Arc<dyn Generator>,
    personas: PersonaConfig,
    document: DocumentConfig,
    settings: PipelineSettings,
}

impl WarRoom {
    /// Create a war room. `agent` serves the negotiation stages, `classifier`
    /// the one-shot analysis.
    pub fn new(
        agent: Arc<dyn Generator>,
        classifier: Arc<dyn Generator>,
        document: DocumentConfig,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            agent,
            classifier,
            personas: PersonaConfig::default(),
            document,
            settings,
        }
    }

    /// Create a war room from application configuration.
    pub fn from_config(
        config: &Config,
        agent: Arc<dyn Generator>,
        classifier: Arc<dyn Generator>,
    ) -> Self {
        Self::new(
            agent,
            classifier,
            config.document.clone(),
            PipelineSettings::from_config(config),
        )
    }

    /// Replace the persona table.
    pub fn with_personas(mut self, personas: PersonaConfig) -> Self {
        self.personas = personas;
        self
    }

    /// Run a full simulation. Stage failures are reflected in the report,
    /// never returned as errors.
    pub async fn simulate(
        &self,
        document: &ContractDocument,
        options: &SimulationOptions,
    ) -> SimulationReport {
        let classifier_excerpt =
            document.excerpt(self.document.max_pages, self.document.classifier_max_chars);
        let analysis = classify(self.classifier.as_ref(), &classifier_excerpt).await;

        let user_role = options
            .user_role
            .clone()
            .unwrap_or_else(|| analysis.roles.user_role.clone());
        let counter_party = options
            .counter_party
            .clone()
            .unwrap_or_else(|| analysis.roles.counter_party.clone());

        let contract_text =
            document.excerpt(self.document.max_pages, self.document.pipeline_max_chars);
        let inputs = NegotiationInputs::new(contract_text, user_role, counter_party)
            .with_aggression(options.aggression)
            .with_coaching(options.include_coaching);

        let outputs = pipeline::run(self.agent.as_ref(), &inputs, &self.personas, &self.settings).await;

        let clauses = match outputs.get(StageKind::Verdict) {
            Some(verdict) if verdict.is_content() => parse_clause_comparisons(&verdict.text),
            _ => Vec::new(),
        };

        info!(
            run_id = %outputs.run_id,
            clauses = clauses.len(),
            "Simulation finished"
        );

        SimulationReport {
            run_id: outputs.run_id.clone(),
            generated_at: Utc::now(),
            aggression: options.aggression,
            analysis,
            outputs,
            clauses,
        }
    }

    /// Write the markdown report into the run's artifact directory.
    pub fn save_report(&self, report: &SimulationReport) -> Result<PathBuf, ArtifactError> {
        ArtifactStore::for_run(&self.settings.artifact_root, &report.run_id)
            .write(REPORT_FILE, &report.to_markdown())
    }
}

fn band_label(band: RiskBand) -> &'static str {
    match band {
        RiskBand::Low => "LOW",
        RiskBand::Elevated => "ELEVATED",
        RiskBand::High => "HIGH",
    }
}

fn section_title(kind: StageKind) -> &'static str {
    match kind {
        StageKind::Attack => "The Shark: Red Report",
        StageKind::Defense => "The Shield: Blue Report",
        StageKind::Verdict => "The Mediator: Final Verdict",
        StageKind::Negotiation => "The Coach: Negotiation Playbook",
    }
}

impl SimulationReport {
    /// Render the report as markdown.
    pub fn to_markdown(&self) -> String {
        let roles = &self.analysis.roles;
        let risk = &self.analysis.risk_scores;
        let (user, counter) = self.analysis.parties();

        let mut out = format!(
            "# Contract War Room Report\n\n\
             - Run: `{}`\n\
             - Generated: {}\n\
             - Contract type: {}\n\
             - Aggression: {}\n\n",
            self.run_id,
            self.generated_at.to_rfc3339(),
            roles.contract_type,
            self.aggression
        );

        out.push_str("## Risk Dashboard\n\n| Metric | Score | Band |\n|---|---|---|\n");
        for (label, score) in [
            ("Liability", risk.liability_score),
            ("Financial", risk.financial_risk),
            ("Unfairness", risk.unfairness_score),
        ] {
            out.push_str(&format!(
                "| {} | {}/100 | {} |\n",
                label,
                score,
                band_label(RiskBand::from_score(score))
            ));
        }
        out.push('\n');
        if !risk.summary.is_empty() {
            out.push_str(&format!("> {}\n\n", risk.summary));
        }

        out.push_str(&format!(
            "## Parties\n\n- You: {} ({})\n- Counter-party: {} ({})\n\n",
            user.name, user.role, counter.name, counter.role
        ));

        for kind in StageKind::ALL {
            out.push_str(&format!(
                "## {}\n\n{}\n\n",
                section_title(kind),
                self.outputs.text(kind)
            ));
        }

        if !self.clauses.is_empty() {
            out.push_str("## Redlines\n");
            for (idx, clause) in self.clauses.iter().enumerate() {
                out.push_str(&format!(
                    "\n### Clause {}\n\n{}\n\n_{}_\n",
                    idx + 1,
                    render_markdown(&clause.original, &clause.revised),
                    clause.explanation
                ));
            }
        }

        out
    }
}
