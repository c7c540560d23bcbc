//! Logic synthesis parameters.

use serde::{Deserialize, Serialize};

/// Parameters for [`crate::synthesize_network`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LogicSynthesisParams {
    /// Reserve one extra ancilla per AND node during level batching, as
    /// needed by a T-depth-1 Toffoli implementation downstream.
    pub low_tdepth_and: bool,
    /// Log every interpreted action and the final statistics at `info`.
    pub verbose: bool,
}

impl LogicSynthesisParams {
    /// Create parameters with everything disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the T-depth-1 AND offset ancilla.
    #[must_use]
    pub fn with_low_tdepth_and(mut self, enabled: bool) -> Self {
        self.low_tdepth_and = enabled;
        self
    }

    /// Enable or disable verbose action reporting.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_defaults_from_empty_json() {
        let params: LogicSynthesisParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params, LogicSynthesisParams::default());

        let params: LogicSynthesisParams =
            serde_json::from_str(r#"{"low_tdepth_and": true}"#).unwrap();
        assert!(params.low_tdepth_and);
        assert!(!params.verbose);
    }

    #[test]
    fn test_builder() {
        let params = LogicSynthesisParams::new()
            .with_low_tdepth_and(true)
            .with_verbose(true);
        assert!(params.low_tdepth_and && params.verbose);
    }
}
