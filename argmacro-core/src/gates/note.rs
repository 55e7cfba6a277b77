//! Action notes attached to an evaluation.

use crate::domain::{DimensionStates, RiskState};

/// Percent with `decimals` places: `percent(0.6971, 1)` is `69.7%`.
pub fn percent(value: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, value * 100.0)
}

fn red_list(states: &DimensionStates) -> String {
    states
        .red_dimensions()
        .iter()
        .map(|d| d.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Recommendation text for an overall state, its dimensions and the macro
/// weight.
pub fn action_note(overall: RiskState, states: &DimensionStates, macro_weight: f64) -> String {
    match overall {
        RiskState::Green => {
            let sizing = if macro_weight > 0.7 {
                "High conviction position recommended."
            } else if macro_weight > 0.4 {
                "Moderate position size recommended."
            } else {
                "Conservative position size despite favorable conditions."
            };
            format!("GREEN: Favorable conditions across key dimensions. {sizing}")
        }
        RiskState::Yellow => {
            if states.red_dimensions().is_empty() {
                format!(
                    "YELLOW: Mixed signals. Cautious positioning recommended (weight: {}).",
                    percent(macro_weight, 1)
                )
            } else {
                format!(
                    "YELLOW: Monitor closely. Risk areas: {}. Position size: {}.",
                    red_list(states),
                    percent(macro_weight, 1)
                )
            }
        }
        RiskState::Red => format!(
            "RED: Elevated risks across {} dimension(s). Minimal or no position recommended. Risk areas: {}.",
            states.red_dimensions().len(),
            red_list(states)
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RiskState::*;

    fn states(fx: RiskState, res: RiskState, cpi: RiskState, embi: RiskState) -> DimensionStates {
        DimensionStates {
            fx_gap: fx,
            reserves_momentum: res,
            core_cpi: cpi,
            embi,
        }
    }

    #[test]
    fn percent_format() {
        assert_eq!(percent(0.697_1, 1), "69.7%");
        assert_eq!(percent(0.5, 0), "50%");
    }

    #[test]
    fn green_sizing_tiers() {
        let s = states(Green, Green, Green, Green);
        assert!(action_note(Green, &s, 0.8).ends_with("High conviction position recommended."));
        assert!(action_note(Green, &s, 0.5).ends_with("Moderate position size recommended."));
        assert!(action_note(Green, &s, 0.3).contains("Conservative"));
    }

    #[test]
    fn yellow_lists_red_dimensions() {
        let s = states(Red, Green, Yellow, Red);
        assert_eq!(
            action_note(Yellow, &s, 0.697_1),
            "YELLOW: Monitor closely. Risk areas: fx_gap, embi. Position size: 69.7%."
        );
        let s = states(Yellow, Green, Green, Green);
        assert_eq!(
            action_note(Yellow, &s, 0.5),
            "YELLOW: Mixed signals. Cautious positioning recommended (weight: 50.0%)."
        );
    }

    #[test]
    fn red_counts_dimensions() {
        let s = states(Red, Red, Red, Red);
        assert_eq!(
            action_note(Red, &s, 0.7),
            "RED: Elevated risks across 4 dimension(s). Minimal or no position recommended. \
             Risk areas: fx_gap, reserves_momentum, core_cpi, embi."
        );
    }
}
