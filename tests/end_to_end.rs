use std::sync::atomic::Ordering;
use std::sync::Arc;

use serde_json::json;

use splice_core::{DataFactory, DataValue, SpliceError, Value};
use splice_graph::{
    parse_description, run_raw, DescriptionFormat, GraphBuilder, RunOptions, Site, SiteFactory,
    UNLIMITED,
};
use splice_primitives::PrimitiveLibrary;
use splice_test_utils::{
    float, int, CountingOperator, DIAMOND, SCENARIO_A, SCENARIO_B, SCENARIO_C,
};

fn workspace(factory: &SiteFactory, fixtures: &[&str]) -> Site {
    let mut site = factory.create("workspace", Vec::new());
    for yaml in fixtures {
        let descriptions = parse_description(yaml, DescriptionFormat::Yaml).expect("parse");
        GraphBuilder::new(&mut site)
            .build(&descriptions)
            .expect("build");
    }
    site
}

fn values(outputs: Vec<Option<DataValue>>) -> Vec<Value> {
    outputs
        .into_iter()
        .map(|o| o.expect("output present").into_value())
        .collect()
}

#[test]
fn test_scenario_a_add_and_sub() {
    let factory = SiteFactory::with_builtins();
    let site = workspace(&factory, &[SCENARIO_A]);
    let out = site
        .get_procedure("add_sub")
        .unwrap()
        .run(vec![Some(int(1)), Some(int(2))])
        .unwrap();
    assert_eq!(values(out), vec![Value::Int(3), Value::Int(-1)]);
}

#[test]
fn test_scenarios_b_and_c_differ_by_wiring() {
    let factory = SiteFactory::with_builtins();
    let site = workspace(&factory, &[SCENARIO_B, SCENARIO_C]);
    let inputs = || vec![Some(float(2.0)), Some(float(3.0)), Some(float(4.0))];

    let b = site.get_procedure("sum_times").unwrap();
    assert_eq!(b.docstring(), "(x + y) * z");
    assert_eq!(values(b.run(inputs()).unwrap()), vec![Value::Float(20.0)]);

    let c = site.get_procedure("sum_of_product").unwrap();
    assert_eq!(c.docstring(), "x + y * z");
    assert_eq!(values(c.run(inputs()).unwrap()), vec![Value::Float(14.0)]);
}

#[test]
fn test_type_rejection() {
    let factory = SiteFactory::with_builtins();
    let site = workspace(&factory, &[SCENARIO_A]);
    let add_sub = site.get_procedure("add_sub").unwrap();

    let err = add_sub
        .run(vec![Some(int(1)), Some(float(2.0))])
        .unwrap_err();
    assert!(matches!(err, SpliceError::SignatureMismatch { position: 1, .. }));

    let err = run_raw(
        &site,
        factory.data_factory(),
        "add_sub",
        &[json!(1), json!(2.5)],
        &RunOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, SpliceError::TypeMismatch { .. }));
}

#[test]
fn test_cache_transparency() {
    let counter = CountingOperator::new();
    let calls = counter.calls();
    let mut library = PrimitiveLibrary::with_builtins(Arc::new(DataFactory::with_builtins()));
    library.register_operator(counter).unwrap();
    let factory = SiteFactory::new(Arc::new(library));

    let cached = workspace(&factory, &[DIAMOND]);
    let uncached_yaml = DIAMOND.replace("use_cache: true", "use_cache: false");
    let uncached = workspace(&factory, &[uncached_yaml.as_str()]);

    let run = |site: &Site| {
        calls.store(0, Ordering::SeqCst);
        let out = site
            .get_procedure("diamond")
            .unwrap()
            .run(vec![Some(int(6))])
            .unwrap();
        (values(out), calls.load(Ordering::SeqCst))
    };

    let (with_cache, cached_calls) = run(&cached);
    let (without_cache, uncached_calls) = run(&uncached);
    assert_eq!(with_cache, vec![Value::Int(36), Value::Int(-36)]);
    assert_eq!(with_cache, without_cache);
    assert_eq!(cached_calls, 1);
    assert_eq!(uncached_calls, 2);
}

#[test]
fn test_site_lookup_respects_depth() {
    let factory = SiteFactory::with_builtins();
    let site = factory.create("workspace", Vec::new());
    assert!(site.query_procedure("int:add", 0).is_none());
    assert!(site.query_procedure("int:add", UNLIMITED).is_some());
}

#[test]
fn test_layered_sites() {
    let factory = SiteFactory::with_builtins();
    let library = Arc::new(workspace(&factory, &[SCENARIO_A]));

    let mut user = factory.create("user", vec![Arc::clone(&library)]);
    let yaml = r#"
- signature: add_sub_twice
  input_signatures: [int, int]
  output_signatures: [int]
  joints:
    first:
      procedure: add_sub
      input_joints: [[null, 0], [null, 1]]
    second:
      procedure: add_sub
      input_joints: [[first, 0], [first, 1]]
  output_joints: [[second, 0]]
"#;
    let descriptions = parse_description(yaml, DescriptionFormat::Yaml).unwrap();
    GraphBuilder::new(&mut user).build(&descriptions).unwrap();

    // (a + b) + (a - b) == 2a
    let out = run_raw(
        &user,
        factory.data_factory(),
        "add_sub_twice",
        &[json!(5), json!(3)],
        &RunOptions::default(),
    )
    .unwrap();
    assert_eq!(out, vec![json!(10)]);
    assert!(user.query_procedure("add_sub", 0).is_none());
    assert!(user.query_procedure("int:add", 1).is_none());
    assert!(user.query_procedure("int:add", 2).is_some());
}

#[test]
fn test_long_described_chain() {
    let mut yaml = String::from(
        "- signature: negate_chain\n  input_signatures: [int]\n  output_signatures: [int]\n  joints:\n",
    );
    yaml.push_str("    j0:\n      procedure: int:neg\n      input_joints: [[null, 0]]\n");
    for i in 1..3001 {
        yaml.push_str(&format!(
            "    j{i}:\n      procedure: int:neg\n      input_joints: [[j{}, 0]]\n",
            i - 1
        ));
    }
    yaml.push_str("  output_joints: [[j3000, 0]]\n");

    let factory = SiteFactory::with_builtins();
    let site = workspace(&factory, &[yaml.as_str()]);
    let out = run_raw(
        &site,
        factory.data_factory(),
        "negate_chain",
        &[json!(42)],
        &RunOptions::default(),
    )
    .unwrap();
    assert_eq!(out, vec![json!(-42)]);
}
