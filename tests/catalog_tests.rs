use std::collections::BTreeMap;

use skopt_ops::catalog::{BehavioralDefaults, FlagDecl, OperationCatalog, OperationDecl};
use skopt_ops::encoder::SearchSpace;
use skopt_ops::flag::FlagType;
use skopt_ops::value::FlagValue;
use skopt_ops::Error;

const TUNED: &str = r"
tuned:
  description: Operation with ranged flags
  exec: ${python_exe} -um tuned_main
  default-max-trials: 50
  flags:
    lr:
      default: 0.01
      min: 0.00001
      max: 0.1
      distribution: log-uniform
    layers:
      default: 2
      type: int
      min: 1
      max: 8
    optimizer:
      default: adam
      choices:
        - value: adam
        - value: sgd
          description: Plain gradient descent
    seed:
      default: 42
";

#[test]
fn every_builtin_operation_has_full_defaults() {
    let catalog = OperationCatalog::build().unwrap();
    assert_eq!(catalog.len(), 4);
    for op in catalog.iter() {
        let defaults = op.defaults();
        assert_eq!(defaults.flag_encoder, "skopt:encode_flag_for_optimizer");
        assert_eq!(defaults.default_max_trials, 20);
        assert_eq!(
            defaults.env,
            BTreeMap::from([("NO_OP_INTERRUPTED_MSG".to_owned(), "1".to_owned())])
        );
        assert!(!op.description().is_empty());
    }
}

#[test]
fn only_random_deletes_and_stages() {
    let catalog = OperationCatalog::build().unwrap();
    for op in catalog.iter() {
        let is_random = op.name() == "random";
        assert_eq!(op.defaults().delete_on_success, is_random, "{}", op.name());
        assert_eq!(op.defaults().can_stage_trials, is_random, "{}", op.name());
    }
}

#[test]
fn building_twice_gives_equal_defaults() {
    let first = OperationCatalog::build().unwrap();
    let second = OperationCatalog::build().unwrap();
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.name(), b.name());
        assert_eq!(a.defaults(), b.defaults());
    }
    assert_eq!(first, second);
}

#[test]
fn gp_flags_match_declaration() {
    let catalog = OperationCatalog::build().unwrap();
    let gp = catalog.lookup("gp").unwrap();
    let names: Vec<_> = gp.flags().keys().map(String::as_str).collect();
    assert_eq!(
        names,
        ["acq-func", "kappa", "noise", "prev-trials", "random-starts", "xi"]
    );

    let kappa = gp.flag("kappa").unwrap();
    assert_eq!(kappa.default_value(), Some(&FlagValue::Float(1.96)));
    assert_eq!(kappa.flag_type(), Some(FlagType::Float));

    let starts = gp.flag("random-starts").unwrap();
    assert_eq!(starts.default_value(), Some(&FlagValue::Int(3)));

    let acq = gp.flag("acq-func").unwrap();
    assert_eq!(acq.choices().len(), 6);
    assert_eq!(acq.choices()[3].value, FlagValue::from("gp_hedge"));
    assert!(gp.description().contains('\n'));
}

#[test]
fn tree_operations_share_flags() {
    let catalog = OperationCatalog::build().unwrap();
    let forest = catalog.lookup("forest").unwrap();
    let gbrt = catalog.lookup("gbrt").unwrap();
    assert_eq!(forest.flags(), gbrt.flags());
    assert!(forest.flag("acq-func").is_none());
    assert!(catalog.lookup("random").unwrap().flags().is_empty());
}

#[test]
fn declared_operation_encodes_its_flags() {
    let catalog = OperationCatalog::from_yaml(TUNED).unwrap();
    let op = catalog.lookup("tuned").unwrap();
    assert_eq!(op.defaults().default_max_trials, 50);
    assert!(!op.defaults().delete_on_success);
    assert_eq!(op.exec_with_interpreter("python"), "python -um tuned_main");

    let lr = op.encode_flag("lr", Some(&FlagValue::Float(0.01))).unwrap();
    assert_eq!(lr.to_string(), "log-uniform[1e-5:0.1:0.01]");

    let layers = op.encode_flag("layers", None).unwrap();
    assert_eq!(layers.to_string(), "uniform[1:8]");

    let optimizer = op.encode_flag("optimizer", None).unwrap();
    assert_eq!(optimizer.to_string(), "[adam, sgd]");

    let seed = op.encode_flag("seed", Some(&FlagValue::Int(7))).unwrap();
    assert_eq!(seed, SearchSpace::Fixed(Some(FlagValue::Int(7))));
}

#[test]
fn search_space_uses_values_then_defaults() {
    let catalog = OperationCatalog::from_yaml(TUNED).unwrap();
    let op = catalog.lookup("tuned").unwrap();
    let values = BTreeMap::from([("layers".to_owned(), FlagValue::Int(4))]);

    let space = op.search_space(&values).unwrap();
    assert_eq!(space.len(), 4);
    assert_eq!(space["layers"].to_string(), "uniform[1:8:4]");
    assert_eq!(space["lr"].to_string(), "log-uniform[1e-5:0.1:0.01]");
    assert_eq!(space["seed"], SearchSpace::Fixed(Some(FlagValue::Int(42))));
}

#[test]
fn search_space_rejects_undeclared_values() {
    let catalog = OperationCatalog::from_yaml(TUNED).unwrap();
    let op = catalog.lookup("tuned").unwrap();
    let values = BTreeMap::from([("epochs".to_owned(), FlagValue::Int(4))]);
    assert!(matches!(
        op.search_space(&values),
        Err(Error::UnknownFlag { ref flag, .. }) if flag == "epochs"
    ));
    assert!(matches!(
        op.encode_flag("epochs", None),
        Err(Error::UnknownFlag { ref operation, .. }) if operation == "tuned"
    ));
}

#[test]
fn partial_bounds_abort_the_catalog() {
    let source = "op:\n  exec: run\n  flags:\n    lr:\n      min: 0.1\n";
    let err = OperationCatalog::from_yaml(source).unwrap_err();
    assert!(matches!(
        err,
        Error::PartialBounds { ref operation, ref flag, present: "min", missing: "max" }
            if operation == "op" && flag == "lr"
    ));
    assert_eq!(
        err.to_string(),
        "flag 'lr' of operation 'op' declares min without max"
    );

    let source = "op:\n  exec: run\n  flags:\n    lr:\n      max: 0.1\n";
    assert!(matches!(
        OperationCatalog::from_yaml(source),
        Err(Error::PartialBounds { present: "max", missing: "min", .. })
    ));
}

#[test]
fn reversed_bounds_abort_the_catalog() {
    let source = "op:\n  exec: run\n  flags:\n    lr:\n      min: 1.0\n      max: 0.5\n";
    let err = OperationCatalog::from_yaml(source).unwrap_err();
    let Error::InvalidFlag { operation, flag, source } = err else {
        panic!("expected InvalidFlag");
    };
    assert_eq!(operation, "op");
    assert_eq!(flag, "lr");
    assert!(matches!(*source, Error::InvalidBounds { .. }));
}

#[test]
fn malformed_declarations_are_rejected() {
    for source in [
        "op:\n  description: no exec\n",
        "op:\n  exec: run\n  unknown-field: 1\n",
        "op:\n  exec: run\n  default-max-trials: 0\n",
        "op:\n  exec: run\n  flags:\n    x:\n      type: tensor\n",
    ] {
        assert!(
            matches!(OperationCatalog::from_yaml(source), Err(Error::Declaration(_))),
            "{source:?} should be rejected"
        );
    }
}

#[test]
fn declarations_can_be_built_in_code() {
    let mut flags = BTreeMap::new();
    flags.insert(
        "momentum".to_owned(),
        FlagDecl {
            min: Some(FlagValue::Float(0.0)),
            max: Some(FlagValue::Float(0.99)),
            ..FlagDecl::default()
        },
    );
    let decl = OperationDecl {
        exec: "run".to_owned(),
        flags,
        delete_on_success: Some(true),
        ..OperationDecl::default()
    };
    let catalog = OperationCatalog::from_declarations([("custom".to_owned(), decl)]).unwrap();
    let op = catalog.lookup("custom").unwrap();
    assert!(op.defaults().delete_on_success);
    assert_eq!(
        op.defaults(),
        &BehavioralDefaults {
            delete_on_success: true,
            ..BehavioralDefaults::default()
        }
    );
    assert_eq!(
        op.encode_flag("momentum", None).unwrap().to_string(),
        "uniform[0.0:0.99]"
    );
}

#[test]
fn lookup_distinguishes_unknown_operations() {
    let catalog = OperationCatalog::build().unwrap();
    let err = catalog.lookup("bayesian").unwrap_err();
    assert_eq!(err.to_string(), "unknown operation 'bayesian'");
}

#[test]
fn yaml_yes_no_set_behavioral_flags() {
    let source = "\
staged:
  exec: run
  delete-on-success: yes
  can-stage-trials: no
  flags:
    shuffle:
      default: yes
";
    let catalog = OperationCatalog::from_yaml(source).unwrap();
    let op = catalog.lookup("staged").unwrap();
    assert!(op.defaults().delete_on_success);
    assert!(!op.defaults().can_stage_trials);

    let shuffle = op.flag("shuffle").unwrap();
    assert_eq!(shuffle.default_value(), Some(&FlagValue::Bool(true)));
    assert_eq!(
        op.encode_flag("shuffle", shuffle.default_value()).unwrap().to_string(),
        "yes"
    );
}

#[test]
fn non_boolean_behavioral_flag_is_rejected() {
    for source in [
        "op:\n  exec: run\n  delete-on-success: maybe\n",
        "op:\n  exec: run\n  can-stage-trials: 1\n",
    ] {
        assert!(
            matches!(OperationCatalog::from_yaml(source), Err(Error::Declaration(_))),
            "{source:?} should be rejected"
        );
    }
}
