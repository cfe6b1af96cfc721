use std::fs;
use tempfile::TempDir;

use peds_core::config::{resolve_with_base, Config, SearchBackend, Settings};
use peds_core::reference::ReferenceLoader;

#[test]
fn load_dir_reads_pages_and_skips_bad_lines() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir_all(dir.join("nested")).unwrap();
    fs::write(
        dir.join("a.jsonl"),
        concat!(
            r#"{"title":"Fever Basics","page_number":3,"original_text":"Fever in infants under three months needs review."}"#,
            "\n",
            "not json\n",
            "\n",
            r#"{"title":"Fever Basics","page_number":4,"original_text":"   "}"#,
            "\n",
        ),
    )
    .unwrap();
    fs::write(
        dir.join("nested/b.jsonl"),
        r#"{"title":"Rashes","page_number":1,"original_text":"Most rashes are harmless.","relationships":[{"subject":"rash","predicate":"is","object":"common"}]}"#,
    )
    .unwrap();
    fs::write(dir.join("ignored.txt"), "plain text").unwrap();

    let pages = ReferenceLoader::new().load_dir(dir).expect("load");

    assert_eq!(pages.len(), 2, "bad and empty lines are skipped");
    assert_eq!(pages[0].title, "Fever Basics");
    assert_eq!(pages[1].relationships.len(), 1);
}

#[test]
fn load_dir_limited_to_one_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.jsonl"), r#"{"title":"A","page_number":1,"original_text":"alpha"}"#).unwrap();
    fs::write(dir.join("b.jsonl"), r#"{"title":"B","page_number":1,"original_text":"bravo"}"#).unwrap();

    let pages = ReferenceLoader::with_max_files(1).load_dir(dir).expect("load limited");

    assert_eq!(pages.len(), 1);
    assert_eq!(pages[0].title, "A");
}

#[test]
fn settings_merge_file_and_env() {
    figment::Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
                [search]
                backend = "local"
                top_k = 7

                [corpus]
                allowed_departments = []
            "#,
        )?;
        jail.set_env("APP_SEARCH__ALPHA", "0.5");
        jail.set_env("APP_GENERATION__ANALYZE_EXAMPLES", "false");
        jail.set_env("RUST_ENV", "test");

        let config = Config::load().map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.search.backend, SearchBackend::Local);
        assert_eq!(settings.search.top_k, 7);
        assert!((settings.search.alpha - 0.5).abs() < 1e-6);
        assert!(settings.corpus.allowed_departments.is_empty());
        assert_eq!(settings.generation.detailed.model, "grok-3-latest");
        assert!(settings.generation.analyze_query);
        assert!(!settings.generation.analyze_examples);
        let top_k: usize = config.get("search.top_k").map_err(|e| e.to_string())?;
        assert_eq!(top_k, 7);
        Ok(())
    });
}

#[test]
fn out_of_range_alpha_is_rejected() {
    let mut settings = Settings::default();
    settings.search.alpha = 1.5;
    assert!(settings.validate().is_err());
    settings.search.alpha = 0.2;
    settings.corpus.final_k = 9;
    assert!(settings.validate().is_err());
}

#[test]
fn relative_paths_resolve_against_base() {
    let base = std::path::Path::new("/srv/peds");
    assert_eq!(resolve_with_base(base, "data/x.jsonl"), base.join("data/x.jsonl"));
    assert_eq!(resolve_with_base(base, "/abs/x.jsonl"), std::path::PathBuf::from("/abs/x.jsonl"));
}
