//! Integration tests for holdwise-analytics.
//!
//! These tests run the engine end to end over small but realistic
//! multi-investor datasets.

use approx::assert_relative_eq;
use holdwise_analytics::prelude::*;
use holdwise_core::prelude::*;

// =============================================================================
// TEST FIXTURES
// =============================================================================

fn master() -> SecurityMaster {
    SecurityMaster::new(vec![
        SecurityRecord::new("037833100", "AAPL", "Apple Inc."),
        SecurityRecord::new("594918104", "MSFT", "Microsoft Corp"),
        SecurityRecord::new("191216100", "KO", "Coca-Cola Co"),
        SecurityRecord::new("166764100", "CVX", "Chevron Corp"),
        SecurityRecord::new("874039100", "TSM", "Taiwan Semiconductor Mfg"),
    ])
}

fn lot(name: &str, cusip: &str, shares: Decimal, value: Decimal) -> Position {
    Position::builder()
        .name(name)
        .identifier(cusip)
        .shares(shares)
        .value(value)
        .build()
        .unwrap()
}

fn filing(period: &str, filed: (i32, u32, u32), positions: Vec<Position>) -> Snapshot {
    Snapshot::new(
        period.parse().unwrap(),
        NaiveDate::from_ymd_opt(filed.0, filed.1, filed.2).unwrap(),
    )
    .with_positions(positions)
}

/// Two filings; Apple reported in two lots in the latest one.
fn harbor() -> Investor {
    Investor::new(
        "harbor",
        "Harbor Capital",
        vec![
            filing(
                "Q3 2024",
                (2024, 11, 14),
                vec![
                    lot("APPLE INC", "037833100", dec!(100), dec!(20_000)),
                    lot("COCA COLA CO", "191216100", dec!(200), dec!(14_000)),
                    lot("CHEVRON CORP NEW", "166764100", dec!(50), dec!(8_000)),
                ],
            ),
            filing(
                "Q4 2024",
                (2025, 2, 14),
                vec![
                    lot("APPLE INC", "037833100", dec!(100), dec!(20_000)),
                    lot("APPLE INC", "037833100", dec!(50), dec!(10_000)),
                    lot("COCA COLA CO", "191216100", dec!(200), dec!(15_000)),
                    lot("TAIWAN SEMICONDUCTOR MFG LTD", "874039100", dec!(40), dec!(8_000)),
                ],
            ),
        ],
    )
}

/// A single filing.
fn summit() -> Investor {
    Investor::new(
        "summit",
        "Summit Partners",
        vec![filing(
            "Q4 2024",
            (2025, 2, 10),
            vec![
                lot("APPLE INC", "037833100", dec!(80), dec!(16_000)),
                lot("MICROSOFT CORP", "594918104", dec!(40), dec!(16_000)),
                lot("COCA COLA CO", "191216100", dec!(100), dec!(8_000)),
            ],
        )],
    )
}

fn engine() -> HoldingsEngine {
    HoldingsEngine::new(
        MasterResolver::new(master()),
        ReferenceData::default(),
        EngineConfig::sequential(),
    )
    .unwrap()
}

fn ticker_investor(slug: &str, holdings: &[(&str, Decimal)]) -> Investor {
    let positions = holdings
        .iter()
        .map(|(ticker, value)| Position {
            name: format!("{ticker} INC"),
            identifier: format!("{ticker}-CUSIP"),
            shares: dec!(100),
            value: *value,
            ticker: Some((*ticker).to_string()),
        })
        .collect();
    Investor::new(
        slug,
        slug.to_uppercase(),
        vec![filing("Q4 2024", (2025, 2, 14), positions)],
    )
}

// =============================================================================
// DELTA SCENARIOS
// =============================================================================

#[test]
fn test_increased_position() {
    let report = engine().latest_deltas(&harbor()).unwrap();

    let apple = report.get("037833100").unwrap();
    assert_eq!(apple.class, DeltaClass::Increased);
    assert_eq!(apple.share_delta, dec!(50));
    assert_relative_eq!(apple.percent_change.unwrap(), 50.0, epsilon = 1e-9);
    assert_eq!(apple.security.key(), "AAPL");
    assert_eq!(apple.security.name, "Apple Inc.");

    let chevron = report.get("166764100").unwrap();
    assert_eq!(chevron.class, DeltaClass::Closed);
    assert_eq!(chevron.percent_change, Some(-100.0));

    let tsm = report.get("874039100").unwrap();
    assert_eq!(tsm.class, DeltaClass::New);

    assert_eq!(report.get("191216100").unwrap().class, DeltaClass::Unchanged);
    assert_eq!(report.deltas.len(), 4);
}

#[test]
fn test_first_snapshot_all_new() {
    let report = engine().latest_deltas(&summit()).unwrap();

    assert!(report.previous_period.is_none());
    assert_eq!(report.deltas.len(), 3);
    assert!(report.deltas.iter().all(|d| d.class == DeltaClass::New));
    assert!(report.closed().is_empty());
    assert!(report.deltas.iter().all(|d| d.weight_change_pct.is_none()));
}

// =============================================================================
// PORTFOLIO VIEW
// =============================================================================

#[test]
fn test_portfolio_view_merges_lots() {
    let view = engine().portfolio(&harbor()).unwrap();

    assert_eq!(view.total_value, dec!(53_000));
    assert_eq!(view.latest.len(), 3);

    let top = &view.top_positions[0];
    assert_eq!(top.security.key(), "AAPL");
    assert_eq!(top.position.shares, dec!(150));
    assert_eq!(top.position.lots, 2);
    assert_relative_eq!(top.weight_pct, 30_000.0 / 53_000.0 * 100.0, epsilon = 1e-9);

    assert_eq!(view.closed.len(), 1);
    assert_eq!(view.new_positions.len(), 1);

    // (30² + 15² + 8²) / 53²
    assert_relative_eq!(
        view.concentration.herfindahl_index,
        1189.0 / 2809.0,
        epsilon = 1e-12
    );
    assert_eq!(view.concentration.band, ConcentrationBand::Concentrated);

    let international = view
        .geography
        .iter()
        .find(|g| g.label == "International")
        .unwrap();
    assert_eq!(international.value, dec!(8_000));
}

#[test]
fn test_investor_without_snapshots() {
    let engine = engine();
    let empty = Investor::new("dormant", "Dormant Fund", vec![]);

    assert!(engine.portfolio(&empty).is_none());
    assert!(engine.latest_deltas(&empty).is_none());
    assert_eq!(engine.activity(&empty).comparisons, 0);
    assert!(engine.scoreboard(&[empty]).is_empty());
}

// =============================================================================
// CONSENSUS / CONTRARIAN
// =============================================================================

#[test]
fn test_consensus_scenario() {
    let investors = vec![
        ticker_investor("a", &[("ZZZ", dec!(5)), ("FILLA", dec!(95))]),
        ticker_investor("b", &[("ZZZ", dec!(5)), ("FILLB", dec!(95))]),
        ticker_investor("c", &[("ZZZ", dec!(1)), ("FILLC", dec!(99))]),
    ];
    let view = engine().consensus(&investors);

    let z = view
        .consensus
        .iter()
        .find(|r| r.security.key() == "ZZZ")
        .unwrap();
    assert_eq!(z.investor_count, 2);
    assert_relative_eq!(z.max_weight, 0.05, epsilon = 1e-12);
    assert!(z.weights.iter().all(|w| w.investor != "c"));

    assert!(view.contrarian.iter().all(|r| r.security.key() != "ZZZ"));
}

#[test]
fn test_contrarian_scenario() {
    let investors = vec![
        ticker_investor("d", &[("YYY", dec!(6)), ("FILLD", dec!(94))]),
        ticker_investor("e", &[("FILLE", dec!(100))]),
    ];
    let view = engine().consensus(&investors);

    let y = view
        .contrarian
        .iter()
        .find(|r| r.security.key() == "YYY")
        .unwrap();
    assert_eq!(y.investor_count, 1);
    assert_relative_eq!(y.max_weight, 0.06, epsilon = 1e-12);
    assert!(view.consensus.iter().all(|r| r.security.key() != "YYY"));
}

// =============================================================================
// RANKINGS
// =============================================================================

#[test]
fn test_scoreboard_zero_guard() {
    let investors = vec![
        Investor::new(
            "zero",
            "Zero Start",
            vec![
                filing("Q3 2024", (2024, 11, 14), vec![]),
                filing(
                    "Q4 2024",
                    (2025, 2, 14),
                    vec![lot("APPLE INC", "037833100", dec!(10), dec!(2_000))],
                ),
            ],
        ),
        harbor(),
    ];
    let board = engine().scoreboard(&investors);

    assert_eq!(board.len(), 2);
    let zero = board.iter().find(|e| e.investor == "zero").unwrap();
    assert_eq!(zero.change_pct, 0.0);
    assert_eq!(zero.previous_total, Decimal::ZERO);

    // harbor: 42_000 → 53_000
    assert_eq!(board[0].investor, "harbor");
    assert_relative_eq!(board[0].change_pct, 11_000.0 / 42_000.0, epsilon = 1e-9);
}

#[test]
fn test_aggregator_rankings() {
    let engine = engine();
    let investors = vec![harbor(), summit()];
    let q4 = PeriodSelection::single("Q4 2024".parse().unwrap());

    // harbor bought AAPL and TSM; summit's first filing counts every position
    let buys = engine.buys(&investors, &q4);
    assert_eq!(buys.entries[0].security.key(), "AAPL");
    assert_eq!(buys.entries[0].count, 2);
    assert_eq!(buys.unique_securities, 4);

    let owned = engine.owned(&investors, &q4);
    let counts: Vec<(&str, usize)> = owned
        .entries
        .iter()
        .map(|e| (e.security.key(), e.count))
        .collect();
    assert_eq!(
        counts,
        vec![("AAPL", 2), ("KO", 2), ("MSFT", 1), ("TSM", 1)]
    );

    let biggest = engine.biggest(&investors, &q4).top(2);
    assert_eq!(biggest.entries.len(), 2);
    assert_eq!(biggest.entries[0].security.key(), "AAPL");
    assert_eq!(biggest.entries[0].value, dec!(46_000));
    assert_eq!(biggest.entries[1].value, dec!(23_000));
    assert_eq!(biggest.unique_securities, 4);
}

#[test]
fn test_earlier_period_selection() {
    let engine = engine();
    let investors = vec![harbor(), summit()];
    let q3 = PeriodSelection::single("Q3 2024".parse().unwrap());

    let owned = engine.owned(&investors, &q3);
    assert_eq!(owned.unique_securities, 3);
    assert!(owned.entries.iter().all(|e| e.count == 1));
    assert!(owned.entries.iter().any(|e| e.security.key() == "CVX"));
}

#[test]
fn test_parallel_and_sequential_agree() {
    let investors: Vec<Investor> = (0..40)
        .map(|i| {
            let mut investor = if i % 2 == 0 { harbor() } else { summit() };
            investor.slug = format!("fund-{i:02}");
            investor
        })
        .collect();
    let selection = PeriodSelection::all();
    let resolver = MasterResolver::new(master());

    let sequential = EngineConfig::sequential();
    let parallel = EngineConfig::default().with_threshold(1);

    assert_eq!(
        aggregate_buys(&investors, &selection, &resolver, &sequential),
        aggregate_buys(&investors, &selection, &resolver, &parallel)
    );
    assert_eq!(
        aggregate_biggest(&investors, &selection, &resolver, &sequential),
        aggregate_biggest(&investors, &selection, &resolver, &parallel)
    );
    assert_eq!(
        calculate_consensus(&investors, &resolver, &sequential),
        calculate_consensus(&investors, &resolver, &parallel)
    );
}

// =============================================================================
// DATASET LOADING
// =============================================================================

const DATASET_JSON: &str = r#"{
  "securities": [
    {"cusip": "037833100", "ticker": "AAPL", "name": "Apple Inc.", "sector": "Technology"},
    {"cusip": "98956A105", "ticker": "ZETA", "name": "Zeta Global Holdings", "sector": "Software"}
  ],
  "investors": [
    {
      "slug": "harbor",
      "name": "Harbor Capital",
      "snapshots": [
        {
          "period": "Q3 2024",
          "filing_date": "2024-11-14",
          "positions": [
            {"name": "APPLE INC", "cusip": "037833100", "shares": 100, "value": 20000}
          ]
        },
        {
          "period": "Q4 2024",
          "filing_date": "2025-02-14",
          "total_value": 50000,
          "positions": [
            {"name": "APPLE INC", "cusip": "037833100", "shares": 150, "value": 30000},
            {"name": "ZETA GLOBAL HLDGS CORP", "cusip": "98956A105", "shares": 50, "value": 20000}
          ]
        }
      ]
    },
    {"slug": "dormant", "name": "Dormant Fund"}
  ]
}"#;

#[test]
fn test_engine_from_json_dataset() {
    let dataset: Dataset = serde_json::from_str(DATASET_JSON).unwrap();
    let engine = HoldingsEngine::from_dataset(&dataset, EngineConfig::default()).unwrap();
    let investors = collect_investors(&dataset);

    assert_eq!(investors.len(), 2);
    assert_eq!(investors[0].slug, "dormant");

    let harbor = &investors[1];
    let view = engine.portfolio(harbor).unwrap();
    assert_eq!(view.total_value, dec!(50_000));
    assert_eq!(view.new_positions[0].security.key(), "ZETA");
    assert_eq!(view.sectors[0].label, "Technology");

    // the master supplies a sector the default table does not know
    let software = view
        .sectors
        .iter()
        .find(|s| s.label == "Software")
        .unwrap();
    assert_eq!(software.value, dec!(20_000));

    let history = engine.ownership_history(harbor, "AAPL");
    assert_eq!(history.len(), 2);
    assert_eq!(history[1].shares, dec!(150));

    assert_eq!(
        engine.latest_covered_period(&investors).unwrap().to_string(),
        "Q4 2024"
    );
}

#[test]
fn test_config_from_toml() {
    let config = EngineConfig::from_toml_str(
        r#"
        parallel = false
        top_positions = 5

        [significance]
        min_share_delta = 1000

        [consensus]
        min_investors = 3
        "#,
    )
    .unwrap();

    assert!(!config.parallel);
    assert_eq!(config.top_positions, 5);
    assert_eq!(config.significance.min_share_delta, Some(dec!(1000)));
    assert_eq!(config.significance.min_weight_change_pct, Some(2.0));
    assert_eq!(config.consensus.min_investors, 3);
    assert_relative_eq!(config.consensus.min_weight, 0.03);
}
