use std::io::Write;
use std::sync::Arc;

use splice_core::{AppConfig, SpliceError, Value, ValueKind};
use splice_graph::{GraphBuilder, SiteFactory};
use splice_primitives::PrimitiveLibrary;

#[test]
fn test_load_full_config_from_file() {
    let toml_content = r#"
[engine]
default_cache = true
max_depth = 8

[library]
paths = ["lib/math.yaml", "lib/logic.json"]

[[types]]
signature = "celsius"
label = "degrees C"
kind = "float"

[log]
filter = "splice=debug"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");

    assert!(config.engine.default_cache);
    assert_eq!(config.engine.max_depth, 8);
    assert_eq!(config.library.paths.len(), 2);
    assert_eq!(config.types.len(), 1);
    assert_eq!(config.types[0].kind, ValueKind::Float);
    assert_eq!(config.log.filter, "splice=debug");

    let paths = config.library_paths(tmp.path());
    let dir = tmp.path().parent().expect("temp dir");
    assert_eq!(paths[0], dir.join("lib/math.yaml"));
}

#[test]
fn test_env_var_expansion_in_config() {
    std::env::set_var("SPLICE_TEST_LOG_FILTER", "splice=trace");

    let toml_content = r#"
[log]
filter = "${SPLICE_TEST_LOG_FILTER}"
"#;

    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(toml_content.as_bytes()).expect("write toml");

    let config = AppConfig::load(tmp.path()).expect("load config");
    assert_eq!(config.log.filter, "splice=trace");

    std::env::remove_var("SPLICE_TEST_LOG_FILTER");
}

#[test]
fn test_missing_config_file() {
    let err = AppConfig::load(std::path::Path::new("/nonexistent/splice.toml")).unwrap_err();
    assert!(matches!(err, SpliceError::ConfigNotFound(_)));
}

#[test]
fn test_malformed_config_file() {
    let mut tmp = tempfile::NamedTempFile::new().expect("create temp file");
    tmp.write_all(b"[engine\nmax_depth = ").expect("write toml");

    let err = AppConfig::load(tmp.path()).unwrap_err();
    assert!(matches!(err, SpliceError::Config(_)));
}

#[test]
fn test_configured_types_reach_builtin_site() {
    let toml_content = r#"
[[types]]
signature = "celsius"
kind = "float"
"#;
    let config: AppConfig = toml::from_str(toml_content).expect("parse config");
    let data = Arc::new(config.data_factory().expect("data factory"));
    let factory = SiteFactory::new(Arc::new(PrimitiveLibrary::with_builtins(data)));

    let builtin = factory.builtin_site();
    assert!(builtin.query_procedure("celsius:add", 0).is_some());
    assert!(builtin.query_procedure("celsius:div", 0).is_some());

    let mut site = factory.create("workspace", Vec::new());
    let yaml = r#"
- signature: warmer
  input_signatures: [celsius, celsius]
  output_signatures: [celsius]
  joints:
    add:
      procedure: celsius:add
      input_joints: [[null, 0], [null, 1]]
  output_joints: [[add, 0]]
"#;
    let descriptions =
        splice_graph::parse_description(yaml, splice_graph::DescriptionFormat::Yaml)
            .expect("parse");
    GraphBuilder::new(&mut site)
        .build(&descriptions)
        .expect("build");

    let data = factory.data_factory();
    let a = data.create("celsius", Some(Value::Float(20.5))).unwrap();
    let b = data.create("celsius", Some(Value::Float(1.5))).unwrap();
    let out = site
        .get_procedure("warmer")
        .unwrap()
        .run(vec![Some(a), Some(b)])
        .unwrap();
    let warmer = out[0].as_ref().expect("output present");
    assert_eq!(warmer.signature(), "celsius");
    assert_eq!(warmer.value(), &Value::Float(22.0));
}
