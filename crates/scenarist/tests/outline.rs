//! Scenario outlines expand before execution and run as plain scenarios.

use scenarist::{Runner, ScenarioStatus, StepRegistry, parse_feature_str};

const OUTLINE: &str = "\
Feature: Totals

  Scenario Outline: Adding <a> and <b>
    Given a calculator
    When I add <a> and <b>
    Then the total is <total>

    Examples:
      | a | b | total |
      | 1 | 2 | 3     |
      | 2 | 2 | 5     |
";

fn calculator_registry() -> StepRegistry {
    let mut registry = StepRegistry::new();
    registry
        .given("a calculator", |ctx, _| {
            ctx.insert("total", 0_i64);
            Ok(())
        })
        .unwrap_or_else(|err| panic!("registration should succeed: {err}"));
    registry
        .when("I add {a:i64} and {b:i64}", |ctx, args| {
            let sum = args.parse::<i64>(0)? + args.parse::<i64>(1)?;
            ctx.insert("total", sum);
            Ok(())
        })
        .unwrap_or_else(|err| panic!("registration should succeed: {err}"));
    registry
        .then("the total is {expected:i64}", |ctx, args| {
            let total = ctx.get::<i64>("total").copied().unwrap_or_default();
            scenarist::ensure_step!(total == args.parse::<i64>(0)?, "total was {total}");
            Ok(())
        })
        .unwrap_or_else(|err| panic!("registration should succeed: {err}"));
    registry
}

#[test]
fn each_examples_row_runs_as_its_own_scenario() {
    let doc = parse_feature_str(OUTLINE, "totals.feature")
        .unwrap_or_else(|err| panic!("feature should parse: {err}"));
    assert_eq!(doc.scenarios.len(), 2);

    let summary = Runner::new(calculator_registry()).run(vec![doc]);
    let statuses: Vec<ScenarioStatus> = summary.results.iter().map(|r| r.status).collect();
    // 1 + 2 = 3 passes; the second row expects the wrong total.
    assert_eq!(statuses, vec![ScenarioStatus::Passed, ScenarioStatus::Failed]);

    let rows: Vec<Option<usize>> = summary.results.iter().map(|r| r.id.example_row).collect();
    assert_eq!(rows, vec![Some(0), Some(1)]);
}

#[test]
fn expansions_share_the_outline_name_and_differ_by_row() {
    let doc = parse_feature_str(OUTLINE, "totals.feature")
        .unwrap_or_else(|err| panic!("feature should parse: {err}"));
    let names: Vec<&str> = doc.scenarios.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["Adding <a> and <b>", "Adding <a> and <b>"]);
    assert_eq!(
        doc.scenarios.first().map(|s| s.id.to_string()),
        Some("totals.feature:3#0".into())
    );
}
