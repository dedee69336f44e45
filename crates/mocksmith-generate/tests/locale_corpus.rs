use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde_json::json;

use mocksmith_core::Locale;
use mocksmith_generate::{
    AssetCorpus, MockOptions, TemplateEvaluator, WordSource, asset_corpus, current_locale,
    set_locale,
};

fn write_list(root: &Path, tag: &str, category: &str, lines: &[&str]) {
    let dir = root.join("locales").join(tag);
    fs::create_dir_all(&dir).expect("create locale dir");
    fs::write(dir.join(format!("{category}.txt")), lines.join("\n")).expect("write list");
}

#[test]
fn wordlists_walk_the_fallback_chain() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_list(dir.path(), "en", "cities", &["London", "Leeds"]);
    write_list(dir.path(), "fr", "cities", &["# comment", "Paris", "", "Lyon"]);
    write_list(dir.path(), "fr_CA", "cities", &["Montreal"]);
    let corpus = AssetCorpus::new(dir.path());

    let fr_ca = Locale::parse("fr_CA").expect("locale");
    let fr_fr = Locale::parse("fr_FR").expect("locale");
    let de = Locale::parse("de").expect("locale");

    assert_eq!(corpus.wordlist(&fr_ca, "cities"), vec!["Montreal"]);
    assert_eq!(corpus.wordlist(&fr_fr, "cities"), vec!["Paris", "Lyon"]);
    assert_eq!(corpus.wordlist(&de, "cities"), vec!["London", "Leeds"]);
    assert!(corpus.wordlist(&de, "volcanoes").is_empty());
}

#[test]
fn cache_survives_until_cleared() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_list(dir.path(), "en", "words", &["alpha"]);
    let corpus = AssetCorpus::new(dir.path());

    assert_eq!(corpus.wordlist(&Locale::en_us(), "words"), vec!["alpha"]);
    assert!(corpus.cached_len() >= 1);

    write_list(dir.path(), "en", "words", &["beta"]);
    assert_eq!(corpus.wordlist(&Locale::en_us(), "words"), vec!["alpha"]);

    corpus.clear_cache();
    assert_eq!(corpus.cached_len(), 0);
    assert_eq!(corpus.wordlist(&Locale::en_us(), "words"), vec!["beta"]);
}

#[test]
fn evaluator_draws_from_a_custom_corpus() {
    let dir = tempfile::tempdir().expect("tempdir");
    write_list(dir.path(), "fr", "cities", &["Paris", "Lyon"]);
    let evaluator = TemplateEvaluator::new().with_word_source(Arc::new(AssetCorpus::new(dir.path())));
    let options = MockOptions::seeded(5).with_locale(Locale::new("fr", None));

    for _ in 0..10 {
        let out = evaluator.evaluate(&json!({"city": "@city"}), &options);
        let city = out["city"].as_str().expect("city");
        assert!(["Paris", "Lyon"].contains(&city), "{city}");
    }
}

#[test]
fn missing_categories_fall_back_to_builtin_values() {
    let dir = tempfile::tempdir().expect("tempdir");
    let evaluator = TemplateEvaluator::new().with_word_source(Arc::new(AssetCorpus::new(dir.path())));
    let out = evaluator.evaluate(
        &json!({"tld": "@tld", "company": "@company"}),
        &MockOptions::seeded(1).with_locale(Locale::en_us()),
    );
    assert!(!out["tld"].as_str().expect("tld").is_empty());
    assert!(!out["company"].as_str().expect("company").is_empty());
}

#[test]
fn bundled_corpus_serves_chinese_names_family_first() {
    let surnames = asset_corpus().wordlist(&Locale::zh_cn(), "lastNames");
    assert!(!surnames.is_empty());

    let evaluator = TemplateEvaluator::new();
    let options = MockOptions::seeded(8).with_locale(Locale::zh_cn());
    for _ in 0..10 {
        let name = evaluator.resolve_str("@name", &options);
        let name = name.as_str().expect("name");
        assert!(!name.contains(' '), "{name}");
        assert!(surnames.iter().any(|surname| name.starts_with(surname.as_str())), "{name}");
    }

    // zh has no tld list of its own, so English applies
    let tlds = asset_corpus().wordlist(&Locale::zh_cn(), "tlds");
    assert_eq!(tlds, asset_corpus().wordlist(&Locale::en_us(), "tlds"));
}

#[test]
fn default_locale_applies_when_options_leave_it_unset() {
    let evaluator = TemplateEvaluator::new();
    let previous = current_locale();

    set_locale(Locale::zh_cn());
    assert_eq!(current_locale(), Locale::zh_cn());
    let sentence = evaluator.resolve_str("@sentence", &MockOptions::seeded(3));
    assert!(sentence.as_str().expect("sentence").ends_with('。'));

    let english = evaluator.resolve_str(
        "@sentence",
        &MockOptions::seeded(3).with_locale(Locale::en_us()),
    );
    assert!(english.as_str().expect("sentence").ends_with('.'));

    set_locale(previous);
}
