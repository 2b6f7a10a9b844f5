mod common;
use common::*;

#[test]
fn defaults_are_valid() {
    let config = RefinementConfig::default();
    config.validate().unwrap();
    assert_eq!(config.confidence_cutoff, 0.5);
    assert_eq!(config.boundary_margin_px, 10);
    assert_eq!(config.strategy, Strategy::Natural);
    assert_eq!(config.edge_recovery_edges, vec![BorderEdge::Top]);
    assert_eq!(config.morphology_radius(), 2);
}

#[test]
fn presets_are_valid() {
    for strategy in [Strategy::Natural, Strategy::RotatedRect, Strategy::ConvexHull] {
        let config = RefinementConfig::for_strategy(strategy);
        config.validate().unwrap();
        assert_eq!(config.strategy, strategy);
    }
    assert!(RefinementConfig::for_strategy(Strategy::RotatedRect).keep_single_region);
}

#[test]
fn builder_rejects_out_of_range_values() {
    let cases = [
        RefinementConfig::builder().confidence_cutoff(1.2),
        RefinementConfig::builder().confidence_cutoff(f32::NAN),
        RefinementConfig::builder().min_area_fraction(-0.1),
        RefinementConfig::builder().edge_recovery_zone_fraction(0.6),
        RefinementConfig::builder().edge_recovery_edges(Vec::new()),
        RefinementConfig::builder().morphology_kernel_size(300),
        RefinementConfig::builder().edge_feather_sigma(-1.0),
        RefinementConfig::builder().alpha_gamma(0.0),
    ];
    for (i, builder) in cases.into_iter().enumerate() {
        assert!(
            matches!(builder.build(), Err(RefineError::ConfigurationInvalid(_))),
            "case {i} accepted"
        );
    }
}

#[test]
fn no_edges_is_fine_when_recovery_is_off() {
    RefinementConfig::builder()
        .edge_recovery(false)
        .edge_recovery_edges(Vec::new())
        .build()
        .unwrap();
}

#[test]
fn builder_sets_fields() {
    let config = RefinementConfig::builder()
        .strategy(Strategy::ConvexHull)
        .confidence_cutoff(0.4)
        .keep_single_region(true)
        .edge_recovery_edges(vec![BorderEdge::Top, BorderEdge::Left])
        .background_color(Some([240, 240, 240]))
        .boundary_margin_px(4)
        .build()
        .unwrap();
    assert_eq!(config.strategy, Strategy::ConvexHull);
    assert_eq!(config.confidence_cutoff, 0.4);
    assert!(config.keep_single_region);
    assert_eq!(config.background_color, Some([240, 240, 240]));
    assert_eq!(config.boundary_margin_px, 4);
}

#[test]
fn partial_json_fills_in_defaults() {
    let config = RefinementConfig::from_json_str(
        r#"{ "strategy": "rotated_rect", "boundary_margin_px": 4, "edge_recovery_edges": ["top", "bottom"] }"#,
    )
    .unwrap();
    assert_eq!(config.strategy, Strategy::RotatedRect);
    assert_eq!(config.boundary_margin_px, 4);
    assert_eq!(config.edge_recovery_edges, vec![BorderEdge::Top, BorderEdge::Bottom]);
    assert_eq!(config.confidence_cutoff, 0.5);
}

#[test]
fn negative_margin_is_a_configuration_error() {
    let result = RefinementConfig::from_json_str(r#"{ "boundary_margin_px": -5 }"#);
    assert!(matches!(result, Err(RefineError::ConfigurationInvalid(_))));
}

#[test]
fn out_of_range_json_is_rejected() {
    let result = RefinementConfig::from_json_str(r#"{ "confidence_cutoff": 2.0 }"#);
    assert!(matches!(result, Err(RefineError::ConfigurationInvalid(_))));
}

#[test]
fn reads_config_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("refine.json");
    std::fs::write(&path, r#"{ "strategy": "convex_hull", "alpha_gamma": 0.8 }"#).unwrap();

    let config = RefinementConfig::from_json_file(&path).unwrap();
    assert_eq!(config.strategy, Strategy::ConvexHull);
    assert_eq!(config.alpha_gamma, 0.8);

    assert!(matches!(
        RefinementConfig::from_json_file(tmp.path().join("missing.json")),
        Err(RefineError::Io(_))
    ));
}

#[test]
fn strategy_names_parse() {
    for (text, strategy) in [
        ("natural", Strategy::Natural),
        ("rotated-rect", Strategy::RotatedRect),
        ("rect", Strategy::RotatedRect),
        ("Convex_Hull", Strategy::ConvexHull),
        ("shrink-wrap", Strategy::ConvexHull),
    ] {
        assert_eq!(text.parse::<Strategy>().unwrap(), strategy);
    }
    assert!("lasso".parse::<Strategy>().is_err());
    assert_eq!(Strategy::RotatedRect.to_string(), "rotated_rect");
}
