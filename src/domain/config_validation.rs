//! Configuration validation.
//!
//! Reads the `[analysis]` section and every `[<strategy>.<sub_name>]`
//! parameter section, and builds an [`AnalysisConfig`].

use std::collections::{BTreeMap, HashSet};

use crate::domain::analysis::{AnalysisConfig, StrategyProfile};
use crate::domain::error::LongbiasError;
use crate::domain::strategy::{StrategyKind, StrategyParams};
use crate::ports::config_port::ConfigPort;

pub const ANALYSIS_SECTION: &str = "analysis";
const SUB_STRATEGY_SEPARATOR: char = '.';

pub fn validate_analysis_config(config: &dyn ConfigPort) -> Result<(), LongbiasError> {
    build_analysis_config(config).map(|_| ())
}

pub fn build_analysis_config(config: &dyn ConfigPort) -> Result<AnalysisConfig, LongbiasError> {
    let window = parse_window(config)?;
    let assets = parse_list(config, "cryptos")?;
    let kinds = parse_profiles(config)?;
    let mut sub_strategies = parse_sub_strategies(config)?;

    let profiles = kinds
        .into_iter()
        .map(|kind| StrategyProfile {
            kind,
            sub_strategies: sub_strategies.remove(&kind).unwrap_or_default(),
        })
        .collect();

    Ok(AnalysisConfig::new(window, assets, profiles)?
        .with_parallel(config.get_bool(ANALYSIS_SECTION, "parallel", true)))
}

fn parse_window(config: &dyn ConfigPort) -> Result<u32, LongbiasError> {
    let raw = config
        .get_string(ANALYSIS_SECTION, "window")
        .ok_or_else(|| LongbiasError::ConfigMissing {
            section: ANALYSIS_SECTION.to_string(),
            key: "window".to_string(),
        })?;
    match raw.trim().parse::<u32>() {
        Ok(years) if years >= 1 => Ok(years),
        _ => Err(LongbiasError::ConfigInvalid {
            section: ANALYSIS_SECTION.to_string(),
            key: "window".to_string(),
            reason: format!("window must be a positive number of years, got '{raw}'"),
        }),
    }
}

/// Comma separated, order preserving, no blanks or duplicates.
pub fn parse_list(config: &dyn ConfigPort, key: &str) -> Result<Vec<String>, LongbiasError> {
    let raw = config
        .get_string(ANALYSIS_SECTION, key)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| LongbiasError::ConfigMissing {
            section: ANALYSIS_SECTION.to_string(),
            key: key.to_string(),
        })?;

    let invalid = |reason: String| LongbiasError::ConfigInvalid {
        section: ANALYSIS_SECTION.to_string(),
        key: key.to_string(),
        reason,
    };

    let mut items = Vec::new();
    let mut seen = HashSet::new();
    for token in raw.split(',') {
        let item = token.trim();
        if item.is_empty() {
            return Err(invalid("empty entry in list".to_string()));
        }
        if !seen.insert(item.to_string()) {
            return Err(invalid(format!("duplicate entry: {item}")));
        }
        items.push(item.to_string());
    }
    Ok(items)
}

fn parse_profiles(config: &dyn ConfigPort) -> Result<Vec<StrategyKind>, LongbiasError> {
    let mut kinds = Vec::new();
    for name in parse_list(config, "strat_profiles")? {
        let kind: StrategyKind = name.parse()?;
        if kinds.contains(&kind) {
            return Err(LongbiasError::ConfigInvalid {
                section: ANALYSIS_SECTION.to_string(),
                key: "strat_profiles".to_string(),
                reason: format!("duplicate strategy: {}", kind.id()),
            });
        }
        kinds.push(kind);
    }
    Ok(kinds)
}

fn parse_sub_strategies(
    config: &dyn ConfigPort,
) -> Result<BTreeMap<StrategyKind, BTreeMap<String, StrategyParams>>, LongbiasError> {
    let mut out: BTreeMap<StrategyKind, BTreeMap<String, StrategyParams>> = BTreeMap::new();

    for section in config.sections() {
        let Some((kind_name, sub_name)) = section.split_once(SUB_STRATEGY_SEPARATOR) else {
            continue;
        };
        let kind: StrategyKind = kind_name.parse()?;
        let sub_name = sub_name.trim();
        if sub_name.is_empty() {
            return Err(LongbiasError::ConfigInvalid {
                section: section.clone(),
                key: String::new(),
                reason: "sub-strategy name is empty".to_string(),
            });
        }

        let mut params = StrategyParams::new();
        for key in config.keys(&section) {
            if !kind.param_names().contains(&key.as_str()) {
                return Err(LongbiasError::ConfigInvalid {
                    section: section.clone(),
                    key,
                    reason: format!("unknown parameter for {}", kind.id()),
                });
            }
            let raw = config.get_string(&section, &key).unwrap_or_default();
            let value = raw.trim().parse::<f64>().map_err(|_| LongbiasError::ConfigInvalid {
                section: section.clone(),
                key: key.clone(),
                reason: format!("expected a number, got '{raw}'"),
            })?;
            params.insert(key, value);
        }

        out.entry(kind)
            .or_default()
            .insert(sub_name.to_string(), params);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    const VALID: &str = r#"
[analysis]
window = 3
cryptos = BTC-USD, ETH-USD
strat_profiles = buy_and_hold, buy_every_week, cash_allocation, z_score

[cash_allocation.dip5]
threshold = 0.05
initial_invest = 0.2

[cash_allocation.dip10]
threshold = 0.10
initial_invest = 0.5

[z_score.two_sigma]
threshold = 2
initial_invest = 0.3
"#;

    #[test]
    fn valid_config_passes() {
        let config = make_config(VALID);
        assert!(validate_analysis_config(&config).is_ok());
    }

    #[test]
    fn valid_config_builds_instances() {
        let analysis = build_analysis_config(&make_config(VALID)).unwrap();
        assert_eq!(analysis.window_years(), 3);
        assert_eq!(analysis.assets(), ["BTC-USD", "ETH-USD"]);
        let names: Vec<String> = analysis.instances().iter().map(|i| i.name()).collect();
        assert_eq!(
            names,
            vec![
                "buy_and_hold",
                "buy_every_week",
                "cash_allocation_dip10",
                "cash_allocation_dip5",
                "z_score_two_sigma",
            ]
        );
        assert!(analysis.parallel());
    }

    #[test]
    fn parallel_can_be_disabled() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = hold\nparallel = false\n",
        );
        assert!(!build_analysis_config(&config).unwrap().parallel());
    }

    #[test]
    fn missing_window_fails() {
        let config = make_config("[analysis]\ncryptos = BTC-USD\nstrat_profiles = buy_and_hold\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigMissing { key, .. } if key == "window"));
    }

    #[test]
    fn non_numeric_window_fails() {
        let config = make_config(
            "[analysis]\nwindow = three\ncryptos = BTC-USD\nstrat_profiles = buy_and_hold\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn zero_window_fails() {
        let config = make_config(
            "[analysis]\nwindow = 0\ncryptos = BTC-USD\nstrat_profiles = buy_and_hold\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn huge_window_fails_when_resolved() {
        let config = make_config(
            "[analysis]\nwindow = 400000000\ncryptos = BTC-USD\nstrat_profiles = hold\n",
        );
        let analysis = build_analysis_config(&config).unwrap();
        let end = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let err = analysis.window(end).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "window"));
    }

    #[test]
    fn missing_cryptos_fails() {
        let config = make_config("[analysis]\nwindow = 1\nstrat_profiles = buy_and_hold\n");
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigMissing { key, .. } if key == "cryptos"));
    }

    #[test]
    fn duplicate_asset_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD, ETH-USD, BTC-USD\nstrat_profiles = hold\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "cryptos"));
    }

    #[test]
    fn empty_list_entry_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD,,ETH-USD\nstrat_profiles = hold\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "cryptos"));
    }

    #[test]
    fn unknown_strategy_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = moon_shot\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::UnknownStrategy { name } if name == "moon_shot"));
    }

    #[test]
    fn duplicate_strategy_via_alias_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = buy_and_hold, hold\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "strat_profiles"));
    }

    #[test]
    fn drop_strategy_without_sections_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = cash_allocation\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(
            matches!(err, LongbiasError::MissingParameter { param, .. } if param == "threshold")
        );
    }

    #[test]
    fn missing_initial_invest_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = z_score\n\n\
             [z_score.a]\nthreshold = 1.5\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        let LongbiasError::MissingParameter { param, .. } = err else {
            panic!("expected MissingParameter");
        };
        assert_eq!(param, "initial_invest");
    }

    #[test]
    fn out_of_range_parameter_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = cash_allocation\n\n\
             [cash_allocation.a]\nthreshold = 0.1\ninitial_invest = 1.2\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::InvalidParameter { .. }));
    }

    #[test]
    fn non_numeric_parameter_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = cash_allocation\n\n\
             [cash_allocation.a]\nthreshold = deep\ninitial_invest = 0.2\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "threshold"));
    }

    #[test]
    fn unknown_parameter_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = cash_allocation\n\n\
             [cash_allocation.a]\nthreshold = 0.1\ninitial_invest = 0.2\nleverage = 3\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::ConfigInvalid { key, .. } if key == "leverage"));
    }

    #[test]
    fn unknown_strategy_section_fails() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = hold\n\n\
             [martingale.a]\nthreshold = 0.1\n",
        );
        let err = validate_analysis_config(&config).unwrap_err();
        assert!(matches!(err, LongbiasError::UnknownStrategy { .. }));
    }

    #[test]
    fn sections_for_unlisted_strategies_are_ignored() {
        let config = make_config(
            "[analysis]\nwindow = 1\ncryptos = BTC-USD\nstrat_profiles = hold\n\n\
             [z_score.a]\nthreshold = 2\ninitial_invest = 0.1\n",
        );
        let analysis = build_analysis_config(&config).unwrap();
        assert_eq!(analysis.instances().len(), 1);
    }
}
