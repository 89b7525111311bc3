use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunable parameters of the memory model, priority scorer, and review
/// pipeline. All fields are required; `validate` must pass before the
/// config is used.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlgorithmConfig {
    /// Base forgetting rate per day, scaled per word by complexity and
    /// forgetting history.
    pub lambda_decay: f64,
    /// Strength penalty for an incorrect answer.
    pub beta_penalty: f64,
    /// Weight of the answer-speed reward.
    pub gamma_speed: f64,
    /// Response time cap for the speed reward, in milliseconds.
    pub t_max_ms: i64,

    /// Priority weight of the weakness term.
    pub w1_strength: f64,
    /// Priority weight of the overdue-urgency term.
    pub w2_urgency: f64,

    /// State thresholds, strictly increasing in (0, 1). The runtime floor
    /// for S1 is strength > 0; `threshold_s1` is kept on the surface and
    /// checked for ordering.
    pub threshold_s1: f64,
    pub threshold_s2: f64,
    pub threshold_s3: f64,

    /// Fallback reward when no per-state reward applies.
    pub alpha_reward: f64,
    pub alpha_reward_s0: f64,
    pub alpha_reward_s1: f64,
    pub alpha_reward_s2: f64,
    pub alpha_reward_s3: f64,

    /// Base reward of one effective reading.
    pub alpha_reading: f64,
    /// Readings shorter than this are ignored (fast-scroll noise).
    pub min_effective_reading_seconds: f64,
    /// Dwell time past which reading gain stops growing.
    pub optimal_reading_seconds: f64,
    /// Diminishing-returns coefficient for repeated readings.
    pub k_diminishing: f64,
    /// Decay-rate penalty coefficient for forgetting history.
    pub k_forgotten: f64,
    /// Base priority bonus for forgotten words.
    pub k_s1_bonus: f64,
}

impl Default for AlgorithmConfig {
    fn default() -> Self {
        Self {
            lambda_decay: 0.1,
            beta_penalty: 0.2,
            gamma_speed: 0.1,
            t_max_ms: 5000,
            w1_strength: 0.6,
            w2_urgency: 0.4,
            threshold_s1: 0.1,
            threshold_s2: 0.5,
            threshold_s3: 0.85,
            alpha_reward: 0.2,
            alpha_reward_s0: 0.3,
            alpha_reward_s1: 0.25,
            alpha_reward_s2: 0.15,
            alpha_reward_s3: 0.1,
            alpha_reading: 0.05,
            min_effective_reading_seconds: 5.0,
            optimal_reading_seconds: 30.0,
            k_diminishing: 0.3,
            k_forgotten: 0.1,
            k_s1_bonus: 50.0,
        }
    }
}

impl AlgorithmConfig {
    pub fn validate(&self) -> Result<(), EngineError> {
        let fields = [
            ("lambdaDecay", self.lambda_decay),
            ("betaPenalty", self.beta_penalty),
            ("gammaSpeed", self.gamma_speed),
            ("w1Strength", self.w1_strength),
            ("w2Urgency", self.w2_urgency),
            ("thresholdS1", self.threshold_s1),
            ("thresholdS2", self.threshold_s2),
            ("thresholdS3", self.threshold_s3),
            ("alphaReward", self.alpha_reward),
            ("alphaRewardS0", self.alpha_reward_s0),
            ("alphaRewardS1", self.alpha_reward_s1),
            ("alphaRewardS2", self.alpha_reward_s2),
            ("alphaRewardS3", self.alpha_reward_s3),
            ("alphaReading", self.alpha_reading),
            ("minEffectiveReadingSeconds", self.min_effective_reading_seconds),
            ("optimalReadingSeconds", self.optimal_reading_seconds),
            ("kDiminishing", self.k_diminishing),
            ("kForgotten", self.k_forgotten),
            ("kS1Bonus", self.k_s1_bonus),
        ];
        for (name, value) in fields {
            if !value.is_finite() {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be finite, got {value}"
                )));
            }
            if value < 0.0 {
                return Err(EngineError::InvalidConfig(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
        }

        if self.lambda_decay <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "lambdaDecay must be positive".to_string(),
            ));
        }
        if self.t_max_ms <= 0 {
            return Err(EngineError::InvalidConfig(
                "tMaxMs must be positive".to_string(),
            ));
        }
        if self.optimal_reading_seconds <= 0.0 {
            return Err(EngineError::InvalidConfig(
                "optimalReadingSeconds must be positive".to_string(),
            ));
        }
        if !(self.threshold_s1 > 0.0
            && self.threshold_s1 < self.threshold_s2
            && self.threshold_s2 < self.threshold_s3
            && self.threshold_s3 < 1.0)
        {
            return Err(EngineError::InvalidConfig(format!(
                "thresholds must satisfy 0 < s1 < s2 < s3 < 1, got {} / {} / {}",
                self.threshold_s1, self.threshold_s2, self.threshold_s3
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AlgorithmConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_finite() {
        let config = AlgorithmConfig {
            gamma_speed: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_threshold_disorder() {
        let config = AlgorithmConfig {
            threshold_s2: 0.9,
            threshold_s3: 0.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_lambda() {
        let config = AlgorithmConfig {
            lambda_decay: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_t_max() {
        let config = AlgorithmConfig {
            t_max_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_camel_case_wire_format() {
        let json = serde_json::to_value(AlgorithmConfig::default()).unwrap();
        assert!(json.get("lambdaDecay").is_some());
        assert!(json.get("tMaxMs").is_some());
        assert!(json.get("kS1Bonus").is_some());
        assert!(json.get("minEffectiveReadingSeconds").is_some());
    }
}
