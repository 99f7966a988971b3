use grit_remesh::prelude::*;

#[test]
fn parameters_survive_json() {
    let mut p = Parameters::default();
    p.add_label_pair(10, 1).add_label_pair(20, 2);
    p.number_of_subdomains = 4;
    p.set_max_iterations("algorithm", 0, 12)
        .set_max_iterations("refinement", 1, 2)
        .set_upper_threshold("refinement", 1, 0.08)
        .set_angle_threshold("interface_smoothing", 2, 165.0)
        .set_upper_threshold_attribute("refinement", "size");

    let json = serde_json::to_string(&p).unwrap();
    let back: Parameters = serde_json::from_str(&json).unwrap();
    assert_eq!(back, p);
    assert_eq!(back.get_upper_threshold("refinement", 1), 0.08);
    assert_eq!(back.upper_threshold_attribute("refinement"), Some("size"));
}

#[test]
fn partial_json_fills_in_defaults() {
    let json = r#"{
        "labels": [1, 2],
        "input_labels": [1, 2],
        "verbose": true,
        "operations": {
            "refinement": { "1": { "max_iterations": 3, "upper_threshold": 0.1 } }
        }
    }"#;
    let p: Parameters = serde_json::from_str(json).unwrap();
    let defaults = Parameters::default();
    assert!(p.verbose);
    assert_eq!(p.number_of_subdomains, defaults.number_of_subdomains);
    assert_eq!(p.use_manifold, defaults.use_manifold);
    assert_eq!(p.get_max_iterations("refinement", 1), 3);
    // unspecified fields of a configured entry keep their defaults
    assert_eq!(p.get_angle_threshold("refinement", 1), 180.0);
    assert_eq!(p.get_max_iterations("refinement", 2), 0);
    assert!(p.validate().is_ok());
}

#[test]
fn settings_default_to_the_neutral_entry() {
    let s: OperationSettings = serde_json::from_str("{}").unwrap();
    assert_eq!(s, OperationSettings::default());
}
