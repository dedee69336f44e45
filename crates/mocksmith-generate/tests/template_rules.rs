use serde_json::{Value, json};

use mocksmith_core::Locale;
use mocksmith_generate::{MAX_REPEAT_LEN, MockOptions, TemplateEvaluator};

fn options(seed: u64) -> MockOptions {
    MockOptions::seeded(seed).with_locale(Locale::en_us())
}

fn render(template: Value, seed: u64) -> Value {
    TemplateEvaluator::new().evaluate(&template, &options(seed))
}

fn decimals_of(value: &Value) -> usize {
    let text = value.to_string();
    text.split('.').nth(1).map(str::len).unwrap_or(0)
}

#[test]
fn string_count_repeats_the_text() {
    let out = render(json!({"stars|3": "ab"}), 1);
    assert_eq!(out, json!({"stars": "ababab"}));
}

#[test]
fn string_range_repeats_within_bounds() {
    for seed in 0..50 {
        let out = render(json!({"stars|1-4": "*"}), seed);
        let len = out["stars"].as_str().expect("string").len();
        assert!((1..=4).contains(&len), "len {len}");
    }
}

#[test]
fn huge_repeat_counts_are_clamped() {
    let out = render(json!({"a|18446744073709551615": [1, 2]}), 1);
    let items = out["a"].as_array().expect("array");
    assert_eq!(items.len(), MAX_REPEAT_LEN);
    assert_eq!(items[..4], [json!(1), json!(2), json!(1), json!(2)]);

    let out = render(json!({"s|18446744073709551615": "ab"}), 1);
    assert_eq!(out["s"].as_str().expect("string").len(), MAX_REPEAT_LEN);
}

#[test]
fn empty_literals_under_huge_repeats_finish_immediately() {
    let out = render(json!({"a|100000000000": [], "s|100000000000": ""}), 1);
    assert_eq!(out, json!({"a": [], "s": ""}));
}

#[test]
fn string_repeats_resolve_each_time() {
    let out = render(json!({"digits|6": "@natural(0,9)"}), 3);
    let digits = out["digits"].as_str().expect("string");
    assert_eq!(digits.len(), 6);
    assert!(digits.chars().all(|c| c.is_ascii_digit()));
}

#[test]
fn number_ranges_accept_negative_and_swapped_bounds() {
    for seed in 0..100 {
        let out = render(
            json!({"age|18-65": 0, "temp|-10--1": 0, "swapped|9-2": 0}),
            seed,
        );
        let age = out["age"].as_i64().expect("int");
        let temp = out["temp"].as_i64().expect("int");
        let swapped = out["swapped"].as_i64().expect("int");
        assert!((18..=65).contains(&age));
        assert!((-10..=-1).contains(&temp));
        assert!((2..=9).contains(&swapped));
    }
}

#[test]
fn number_count_is_a_fixed_value() {
    assert_eq!(render(json!({"n|7": 100}), 1), json!({"n": 7}));
}

#[test]
fn decimal_rules_respect_range_and_precision() {
    for seed in 0..100 {
        let out = render(json!({"price|1-100.1-2": 0, "ratio|5.3": 0}), seed);
        let price = out["price"].as_f64().expect("float");
        assert!((1.0..=100.0).contains(&price), "{price}");
        assert!(decimals_of(&out["price"]) <= 2);

        let ratio = out["ratio"].as_f64().expect("float");
        assert!((5.0..6.0).contains(&ratio), "{ratio}");
        assert_eq!(decimals_of(&out["ratio"]), 3, "{}", out["ratio"]);
    }
}

#[test]
fn array_count_repeats_the_whole_array() {
    let out = render(json!({"list|2": [1, 2, 3]}), 1);
    assert_eq!(out, json!({"list": [1, 2, 3, 1, 2, 3]}));

    let out = render(json!({"none|0": [1, 2]}), 1);
    assert_eq!(out, json!({"none": []}));
}

#[test]
fn array_range_length_is_a_multiple_of_the_element_count() {
    for seed in 0..40 {
        let out = render(json!({"list|1-3": ["a", "b"]}), seed);
        let len = out["list"].as_array().expect("array").len();
        assert!([2, 4, 6].contains(&len), "len {len}");
    }
}

#[test]
fn array_count_of_one_picks_a_single_element() {
    for seed in 0..30 {
        let out = render(json!({"color|1": ["red", "green", "blue"]}), seed);
        let color = out["color"].as_str().expect("string");
        assert!(["red", "green", "blue"].contains(&color));
    }
    assert_eq!(render(json!({"empty|1": []}), 1), json!({"empty": ""}));
}

#[test]
fn increments_continue_across_repeated_elements() {
    let out = render(
        json!({"users|3": [{"id|+1": 1000, "name": "@first"}]}),
        11,
    );
    let users = out["users"].as_array().expect("array");
    let ids: Vec<i64> = users
        .iter()
        .map(|user| user["id"].as_i64().expect("id"))
        .collect();
    assert_eq!(ids, vec![1000, 1001, 1002]);
    for user in users {
        let name = user["name"].as_str().expect("name");
        assert!(!name.is_empty() && !name.starts_with('@'));
    }
}

#[test]
fn increments_honour_the_step_and_float_start() {
    let out = render(
        json!({"rows|3": [{"down|-5": 100, "score|+2": 1.5}]}),
        2,
    );
    let rows = out["rows"].as_array().expect("array");
    let down: Vec<i64> = rows.iter().map(|r| r["down"].as_i64().expect("int")).collect();
    let score: Vec<f64> = rows.iter().map(|r| r["score"].as_f64().expect("float")).collect();
    assert_eq!(down, vec![100, 95, 90]);
    assert_eq!(score, vec![1.5, 3.5, 5.5]);
}

#[test]
fn non_numeric_increments_count_from_zero() {
    let out = render(
        json!({"rows|3": [{"code|+5": "ignored", "flag|+1": true}]}),
        4,
    );
    let rows = out["rows"].as_array().expect("array");
    let codes: Vec<i64> = rows.iter().map(|r| r["code"].as_i64().expect("int")).collect();
    let flags: Vec<i64> = rows.iter().map(|r| r["flag"].as_i64().expect("int")).collect();
    assert_eq!(codes, vec![5, 10, 15]);
    assert_eq!(flags, vec![1, 2, 3]);
}

#[test]
fn sequential_array_pick_wraps_around() {
    let out = render(json!({"rows|4": [{"tier|+1": ["gold", "silver", "bronze"]}]}), 5);
    let tiers: Vec<&str> = out["rows"]
        .as_array()
        .expect("array")
        .iter()
        .map(|row| row["tier"].as_str().expect("tier"))
        .collect();
    assert_eq!(tiers, vec!["gold", "silver", "bronze", "gold"]);
}

#[test]
fn boolean_odds_follow_the_ratio() {
    let evaluator = TemplateEvaluator::new();
    let template = json!({"flag|1-3": true});
    let trials = 2000;
    let hits = (0..trials)
        .filter(|seed| {
            evaluator.evaluate(&template, &options(*seed))["flag"] == Value::Bool(true)
        })
        .count();
    let ratio = hits as f64 / trials as f64;
    assert!((0.2..0.3).contains(&ratio), "ratio {ratio}");
}

#[test]
fn boolean_with_zero_odds_is_a_fair_coin() {
    let evaluator = TemplateEvaluator::new();
    let template = json!({"flag|0-0": false});
    let hits = (0..1000)
        .filter(|seed| evaluator.evaluate(&template, &options(*seed))["flag"] == json!(true))
        .count();
    assert!((400..600).contains(&hits), "hits {hits}");
}

#[test]
fn object_count_picks_a_subset_in_template_order() {
    let template = json!({"pick|2": {"a": 1, "b": 2, "c": 3, "d": 4}});
    for seed in 0..30 {
        let out = render(template.clone(), seed);
        let keys: Vec<&str> = out["pick"]
            .as_object()
            .expect("object")
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(keys.len(), 2);
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    let out = render(json!({"all|9": {"a": 1, "b": 2}}), 1);
    assert_eq!(out, json!({"all": {"a": 1, "b": 2}}));
}

#[test]
fn object_range_bounds_the_number_of_keys() {
    let template = json!({"pick|1-2": {"a": 1, "b": 2, "c": 3}});
    for seed in 0..30 {
        let out = render(template.clone(), seed);
        let len = out["pick"].as_object().expect("object").len();
        assert!((1..=2).contains(&len));
    }
}

#[test]
fn malformed_rules_keep_the_key_verbatim() {
    let out = render(json!({"name|abc": "x", "plain": 3}), 1);
    assert_eq!(out, json!({"name|abc": "x", "plain": 3}));
}

#[test]
fn regex_literals_generate_matching_strings() {
    let check = regex::Regex::new(r"^[A-Z]{3}-\d{2}$").expect("regex");
    for seed in 0..20 {
        let out = render(json!({"code": "/[A-Z]{3}-\\d{2}/"}), seed);
        let code = out["code"].as_str().expect("string");
        assert!(check.is_match(code), "{code}");
    }
    let out = render(json!({"broken": "/[oops/"}), 1);
    assert_eq!(out, json!({"broken": "/[oops/"}));
}

#[test]
fn same_seed_gives_the_same_tree() {
    let template = json!({
        "list|2-5": [{"id|+1": 1, "name": "@name", "email": "@email"}],
        "score|1-100.2": 0
    });
    assert_eq!(render(template.clone(), 99), render(template, 99));
}

#[test]
fn non_object_templates_are_evaluated_directly() {
    assert_eq!(render(json!("@natural(4,4)"), 1), json!(4));
    assert_eq!(render(json!(["x", 2, null]), 1), json!(["x", 2, null]));
}
