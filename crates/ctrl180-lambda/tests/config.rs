use std::collections::HashMap;
use std::path::PathBuf;

use ctrl180_lambda::config::{
    DEFAULT_CHART_MAX_BYTES, DEFAULT_CHART_TIMEOUT_MS, ServiceConfig, is_truthy,
};

fn from(vars: &[(&str, &str)]) -> ServiceConfig {
    let map: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServiceConfig::from_lookup(|key| map.get(key).cloned())
}

#[test]
fn defaults_apply_when_unset() {
    let config = from(&[]);
    assert_eq!(
        config.template_dirs,
        vec![
            PathBuf::from("public"),
            PathBuf::from("../public"),
            PathBuf::from("../../public"),
        ]
    );
    assert_eq!(config.chart_timeout_ms, DEFAULT_CHART_TIMEOUT_MS);
    assert_eq!(config.chart_max_bytes, DEFAULT_CHART_MAX_BYTES);
    assert!(!config.strict_template);
    assert_eq!(config, ServiceConfig::default());
}

#[test]
fn values_are_read_from_the_environment() {
    let config = from(&[
        ("CTRL_TEMPLATE_DIRS", "/opt/templates: :/srv/pdf"),
        ("CTRL_CHART_TIMEOUT_MS", "2500"),
        ("CTRL_CHART_MAX_BYTES", "1024"),
        ("CTRL_STRICT_TEMPLATE", "TRUE"),
    ]);
    assert_eq!(
        config.template_dirs,
        vec![PathBuf::from("/opt/templates"), PathBuf::from("/srv/pdf")]
    );
    assert_eq!(config.chart_timeout_ms, 2500);
    assert_eq!(config.chart_max_bytes, 1024);
    assert!(config.strict_template);
}

#[test]
fn unparsable_numbers_fall_back() {
    let config = from(&[
        ("CTRL_CHART_TIMEOUT_MS", "soon"),
        ("CTRL_CHART_MAX_BYTES", "0"),
    ]);
    assert_eq!(config.chart_timeout_ms, DEFAULT_CHART_TIMEOUT_MS);
    assert_eq!(config.chart_max_bytes, DEFAULT_CHART_MAX_BYTES);
}

#[test]
fn truthy_values() {
    for v in ["1", "true", "Yes", " on "] {
        assert!(is_truthy(v), "{v}");
    }
    for v in ["0", "false", "", "maybe"] {
        assert!(!is_truthy(v), "{v}");
    }
}
