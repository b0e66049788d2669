//! Property tests over random price paths.

mod common;

use common::*;
use longbias::domain::accumulator::accumulate;
use longbias::domain::cash_flow::TOTAL_BUDGET;
use longbias::domain::portfolio::evaluate_asset;
use longbias::domain::strategy::Strategy as Deployment;
use longbias::domain::strategy::{StrategyConfig, StrategyKind, StrategyParams};
use proptest::prelude::*;

fn prices() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(1.0f64..10_000.0, 1..80)
}

fn any_deployment() -> impl Strategy<Value = Deployment> {
    (0usize..4, 0.01f64..3.0, 0.0f64..=1.0).prop_map(|(k, threshold, initial)| {
        let kind = StrategyKind::ALL[k];
        let params = if kind.requires_params() {
            drop_params(threshold, initial)
        } else {
            StrategyParams::new()
        };
        Deployment::from_params(kind, &params).unwrap()
    })
}

proptest! {
    #[test]
    fn schedule_deploys_exactly_the_budget(prices in prices(), deployment in any_deployment()) {
        let series = make_series("P", &prices);
        let schedule = deployment.cash_flows(&series);

        prop_assert_eq!(schedule.len(), series.len());
        prop_assert!(schedule.amounts.iter().all(|&a| a >= 0.0));
        prop_assert!((schedule.total() - TOTAL_BUDGET).abs() < 1e-9);
        let no_stake = matches!(
            deployment,
            Deployment::ThresholdDrop(p) | Deployment::ZScoreDrop(p) if p.initial_invest == 0.0
        );
        prop_assert!(schedule.amounts[0] > 0.0 || no_stake);
    }

    #[test]
    fn position_never_decreases(prices in prices(), deployment in any_deployment()) {
        let series = make_series("P", &prices);
        let acc = accumulate("p", &series, &deployment.cash_flows(&series)).unwrap();

        for pair in acc.points.windows(2) {
            prop_assert!(pair[1].position >= pair[0].position);
            prop_assert!(pair[1].cash_flow_acc >= pair[0].cash_flow_acc);
        }
        let last = acc.last().unwrap();
        prop_assert!((last.cash_flow_acc - TOTAL_BUDGET).abs() < 1e-9);
    }

    #[test]
    fn drawdown_is_bounded(prices in prices(), deployment in any_deployment()) {
        let series = make_series("P", &prices);
        let acc = accumulate("p", &series, &deployment.cash_flows(&series)).unwrap();

        for point in &acc.points {
            prop_assert!(point.drawdown <= 0.0);
            prop_assert!(point.drawdown >= -1.0);
        }
    }

    #[test]
    fn unreachable_threshold_behaves_like_hold(prices in prices(), initial in 0.0f64..=1.0) {
        let series = make_series("P", &prices);
        // A close-to-close change can never fall below -100%.
        let drop =
            Deployment::from_params(StrategyKind::ThresholdDrop, &drop_params(1.5, initial))
                .unwrap();

        prop_assert_eq!(drop.cash_flows(&series), Deployment::Hold.cash_flows(&series));
    }

    #[test]
    fn hold_pnl_tracks_price_ratio(prices in prices()) {
        let series = make_series("P", &prices);
        let acc = accumulate("hold", &series, &Deployment::Hold.cash_flows(&series)).unwrap();

        let first = prices[0];
        for (point, &price) in acc.points.iter().zip(&prices) {
            let expected = (price / first - 1.0) * 100.0;
            prop_assert!((point.pnl - expected).abs() < 1e-6 * expected.abs().max(1.0));
        }
    }

    #[test]
    fn evaluation_is_idempotent(prices in prices()) {
        let series = make_series("P", &prices);
        let instances = vec![
            StrategyConfig::plain(StrategyKind::Hold),
            StrategyConfig::plain(StrategyKind::Periodic),
            StrategyConfig::with_params(StrategyKind::ThresholdDrop, "a", drop_params(0.05, 0.3)),
            StrategyConfig::with_params(StrategyKind::ZScoreDrop, "b", drop_params(1.0, 0.3)),
        ];

        let first = evaluate_asset(&series, &instances).unwrap();
        let second = evaluate_asset(&series, &instances).unwrap();
        prop_assert_eq!(first, second);
    }
}
