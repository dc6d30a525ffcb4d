//! One-shot contract classification.
//!
//! A single generation call identifies the two parties and scores the
//! contract's risk. The answer must be strict JSON; anything unusable is
//! replaced by [`ContractAnalysis::fallback`] and never surfaces as an error.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::generation::{Generator, RoleDescriptor};
use crate::prompts::{classifier_task, CLASSIFIER_BACKSTORY, CLASSIFIER_GOAL, CLASSIFIER_PERSONA};

/// Which side of the negotiation a party is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartySide {
    /// The party we advocate for.
    User,
    /// The other side of the table.
    CounterParty,
}

/// A contract party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    /// Role label, e.g. "Tenant".
    pub role: String,
    /// Display name, or a placeholder when the contract does not name one.
    pub name: String,
    /// Side tag.
    pub side: PartySide,
}

fn default_user_name() -> String {
    "The User".to_string()
}

fn default_counter_party_name() -> String {
    "The Counterparty".to_string()
}

/// Roles section of the classifier answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRoles {
    /// Contract category, e.g. "NDA".
    pub contract_type: String,
    /// Role of the vulnerable party.
    pub user_role: String,
    /// Role of the dominant party.
    pub counter_party: String,
    /// Name of the vulnerable party.
    #[serde(default = "default_user_name")]
    pub user_name: String,
    /// Name of the dominant party.
    #[serde(default = "default_counter_party_name")]
    pub counter_party_name: String,
}

/// Risk section of the classifier answer. Scores are 0 (safe) to 100.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskScores {
    /// Liability exposure.
    #[serde(deserialize_with = "deserialize_score")]
    pub liability_score: u8,
    /// Financial risk.
    #[serde(deserialize_with = "deserialize_score")]
    pub financial_risk: u8,
    /// One-sidedness.
    #[serde(deserialize_with = "deserialize_score")]
    pub unfairness_score: u8,
    /// Short description of the biggest red flag.
    #[serde(default)]
    pub summary: String,
}

/// Accept any JSON number and clamp it into 0..=100.
fn deserialize_score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    Ok(clamp_score(value))
}

fn clamp_score(value: f64) -> u8 {
    if value.is_nan() {
        return 0;
    }
    value.round().clamp(0.0, 100.0) as u8
}

impl RiskScores {
    /// Highest of the three scores.
    pub fn peak(&self) -> u8 {
        self.liability_score
            .max(self.financial_risk)
            .max(self.unfairness_score)
    }
}

/// Coarse reading of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskBand {
    /// Below 30.
    Low,
    /// 30 to 69.
    Elevated,
    /// 70 and above.
    High,
}

impl RiskBand {
    /// Band for a 0..=100 score.
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=29 => RiskBand::Low,
            30..=69 => RiskBand::Elevated,
            _ => RiskBand::High,
        }
    }

    /// Display label.
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskBand::Low => "low",
            RiskBand::Elevated => "elevated",
            RiskBand::High => "high",
        }
    }
}

impl std::fmt::Display for RiskBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Parties and risk of one contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAnalysis {
    /// Party roles.
    pub roles: PartyRoles,
    /// Risk scores.
    pub risk_scores: RiskScores,
}

impl ContractAnalysis {
    /// Record used whenever the classifier answer cannot be used.
    pub fn fallback() -> Self {
        Self {
            roles: PartyRoles {
                contract_type: "General Agreement".to_string(),
                user_role: "Service Provider".to_string(),
                counter_party: "Client".to_string(),
                user_name: default_user_name(),
                counter_party_name: default_counter_party_name(),
            },
            risk_scores: RiskScores {
                liability_score: 50,
                financial_risk: 50,
                unfairness_score: 50,
                summary: "Could not analyze risks.".to_string(),
            },
        }
    }

    /// The user party and the counter-party.
    pub fn parties(&self) -> (Party, Party) {
        (
            Party {
                role: self.roles.user_role.clone(),
                name: self.roles.user_name.clone(),
                side: PartySide::User,
            },
            Party {
                role: self.roles.counter_party.clone(),
                name: self.roles.counter_party_name.clone(),
                side: PartySide::CounterParty,
            },
        )
    }

    /// Band of the highest score.
    pub fn overall_band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_scores.peak())
    }
}

/// Pull a JSON payload out of a completion that may wrap it in fences.
pub(crate) fn extract_json_from_completion(completion: &str) -> Result<&str, String> {
    let trimmed = completion.trim();
    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    if completion.contains("```json") {
        return completion
            .split("```json")
            .nth(1)
            .and_then(|s| s.split("```").next())
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ```json block but content was empty or malformed".to_string());
    }

    if completion.contains("```") {
        return completion
            .split("```")
            .nth(1)
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| "Found ``` block but content was empty or malformed".to_string());
    }

    // Prose around a bare object.
    if let (Some(start), Some(end)) = (completion.find('{'), completion.rfind('}')) {
        if start < end {
            return Ok(&completion[start..=end]);
        }
    }

    Err(format!(
        "No JSON found in response. First 100 chars: '{}'",
        completion.chars().take(100).collect::<String>()
    ))
}

/// Parse a classifier completion.
pub fn parse_analysis(completion: &str) -> Result<ContractAnalysis, String> {
    let json = extract_json_from_completion(completion)?;
    serde_json::from_str(json).map_err(|e| format!("Failed to parse classifier JSON: {}", e))
}

fn classifier_role() -> RoleDescriptor {
    RoleDescriptor::new(CLASSIFIER_PERSONA, CLASSIFIER_GOAL, CLASSIFIER_BACKSTORY)
}

/// Classify a contract excerpt. Never fails; see [`ContractAnalysis::fallback`].
pub async fn classify(generator: &dyn Generator, excerpt: &str) -> ContractAnalysis {
    let task = classifier_task(excerpt);
    let completion = match generator.generate(&classifier_role(), &task, &[]).await {
        Ok(generation) => match generation.text() {
            Some(text) => text.to_string(),
            None => {
                warn!("Classifier returned no readable text, using fallback analysis");
                return ContractAnalysis::fallback();
            }
        },
        Err(e) => {
            warn!(error = %e, "Classifier call failed, using fallback analysis");
            return ContractAnalysis::fallback();
        }
    };

    match parse_analysis(&completion) {
        Ok(analysis) => {
            info!(
                contract_type = %analysis.roles.contract_type,
                user_role = %analysis.roles.user_role,
                counter_party = %analysis.roles.counter_party,
                risk = %analysis.overall_band(),
                "Contract classified"
            );
            analysis
        }
        Err(e) => {
            warn!(error = %e, "Classifier answer unusable, using fallback analysis");
            ContractAnalysis::fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GenerationError;
    use crate::generation::{Generation, MockGenerator};

    const ANSWER: &str = r#"{
        "roles": {
            "contract_type": "Lease",
            "user_role": "Tenant",
            "counter_party": "Landlord",
            "user_name": "Jane Doe",
            "counter_party_name": "Acme Properties"
        },
        "risk_scores": {
            "liability_score": 72,
            "financial_risk": 40,
            "unfairness_score": 15,
            "summary": "Landlord may terminate at will."
        }
    }"#;

    #[test]
    fn test_parse_plain_json() {
        let analysis = parse_analysis(ANSWER).unwrap();
        assert_eq!(analysis.roles.user_role, "Tenant");
        assert_eq!(analysis.risk_scores.liability_score, 72);
        assert_eq!(analysis.overall_band(), RiskBand::High);
    }

    #[test]
    fn test_parse_fenced_json() {
        let fenced = format!("Here you go:\n```json\n{}\n```", ANSWER);
        let analysis = parse_analysis(&fenced).unwrap();
        assert_eq!(analysis.roles.counter_party_name, "Acme Properties");
    }

    #[test]
    fn test_parse_json_in_prose() {
        let wrapped = format!("Sure. {} Hope this helps.", ANSWER);
        assert!(parse_analysis(&wrapped).is_ok());
    }

    #[test]
    fn test_scores_are_clamped() {
        let json = r#"{
            "roles": {"contract_type": "NDA", "user_role": "Receiving Party", "counter_party": "Disclosing Party"},
            "risk_scores": {"liability_score": 140, "financial_risk": -3, "unfairness_score": 49.6}
        }"#;
        let analysis = parse_analysis(json).unwrap();
        assert_eq!(analysis.risk_scores.liability_score, 100);
        assert_eq!(analysis.risk_scores.financial_risk, 0);
        assert_eq!(analysis.risk_scores.unfairness_score, 50);
        assert_eq!(analysis.roles.user_name, "The User");
        assert_eq!(analysis.roles.counter_party_name, "The Counterparty");
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_analysis("I could not read the contract.").is_err());
        assert!(parse_analysis("{\"roles\": {}}").is_err());
    }

    #[test]
    fn test_risk_bands() {
        assert_eq!(RiskBand::from_score(0), RiskBand::Low);
        assert_eq!(RiskBand::from_score(29), RiskBand::Low);
        assert_eq!(RiskBand::from_score(30), RiskBand::Elevated);
        assert_eq!(RiskBand::from_score(69), RiskBand::Elevated);
        assert_eq!(RiskBand::from_score(70), RiskBand::High);
        assert_eq!(RiskBand::from_score(100), RiskBand::High);
    }

    #[test]
    fn test_parties() {
        let (user, counter) = parse_analysis(ANSWER).unwrap().parties();
        assert_eq!(user.role, "Tenant");
        assert_eq!(user.side, PartySide::User);
        assert_eq!(counter.name, "Acme Properties");
        assert_eq!(counter.side, PartySide::CounterParty);
    }

    #[tokio::test]
    async fn test_classify_success() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .withf(|role, task, context| {
                role.persona == CLASSIFIER_PERSONA && task.contains("Rent is due") && context.is_empty()
            })
            .times(1)
            .returning(|_, _, _| Ok(Generation::RawText(ANSWER.to_string())));

        let analysis = classify(&generator, "Rent is due monthly.").await;
        assert_eq!(analysis.roles.contract_type, "Lease");
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_garbage() {
        let mut generator = MockGenerator::new();
        generator
            .expect_generate()
            .returning(|_, _, _| Ok(Generation::RawText("no json here".to_string())));

        assert_eq!(classify(&generator, "text").await, ContractAnalysis::fallback());
    }

    #[tokio::test]
    async fn test_classify_falls_back_on_error() {
        let mut generator = MockGenerator::new();
        generator.expect_generate().returning(|_, _, _| {
            Err(GenerationError::Timeout { timeout_ms: 10 })
        });

        let analysis = classify(&generator, "text").await;
        assert_eq!(analysis.risk_scores.summary, "Could not analyze risks.");
        assert_eq!(analysis.risk_scores.peak(), 50);
    }
}
