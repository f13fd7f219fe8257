use serde_json::json;
use uuid::Uuid;

use opencfg::{
    BatchReplaceSpec, BuiltinCatalog, ConfigStore, Dimension, EditSession, ImportFragment,
    JsonFileStore, ModelCatalog, ReplaceOutcome, SessionState,
};

fn temp_store() -> JsonFileStore {
    let dir = std::env::temp_dir().join(format!("opencfg-it-{}", Uuid::new_v4()));
    JsonFileStore::new(dir.join("configs.json"))
}

fn models() -> ModelCatalog {
    ModelCatalog::new()
        .with_model("openai/gpt-5", &["low", "medium", "high"])
        .with_model("anthropic/claude-opus", &["max", "high"])
        .with_model("google/gemini-pro", &[])
}

fn session() -> EditSession {
    EditSession::new(BuiltinCatalog::standard(), models())
}

#[test]
fn full_edit_cycle_persists_and_reloads() {
    let store = temp_store();

    // Create a fresh profile with a mix of builtin, custom, and advanced
    // configuration plus extra root fields.
    let mut session = session();
    session.open_new("Team profile");
    session
        .set_model(Dimension::Agents, "explore", Some("openai/gpt-5"))
        .expect("bind explore");
    session
        .set_variant(Dimension::Agents, "explore", Some("high"))
        .expect("explore variant");
    session
        .add_custom_key(Dimension::Agents, "Sidekick")
        .expect("add custom");
    session
        .set_model(Dimension::Agents, "sidekick", Some("anthropic/claude-opus"))
        .expect("bind sidekick");
    session
        .set_advanced_raw(Dimension::Agents, "sidekick", r#"{ "temperature": 0.2 }"#)
        .expect("sidekick advanced");
    session
        .set_model(Dimension::Categories, "quick", Some("google/gemini-pro"))
        .expect("bind quick");
    session
        .set_other_fields_raw(r#"{ "theme": "dark" }"#)
        .expect("other fields");

    let saved = session.submit(&store).expect("submit");
    assert_eq!(session.state(), SessionState::Closed);

    // Reopen from disk: everything round-trips, including the custom key.
    let loaded = store
        .load(&saved.id)
        .expect("load")
        .expect("document stored");
    let mut session = self::session();
    session.load(&loaded);
    assert_eq!(session.name(), "Team profile");
    assert_eq!(session.custom_keys(Dimension::Agents), vec!["sidekick"]);
    assert_eq!(
        session.variant_of(Dimension::Agents, "explore").as_deref(),
        Some("high")
    );
    assert_eq!(
        session.model_of(Dimension::Categories, "quick").as_deref(),
        Some("google/gemini-pro")
    );
    assert!(session
        .advanced_text(Dimension::Agents, "sidekick")
        .contains("temperature"));
    assert_eq!(loaded.other_fields.get("theme"), Some(&json!("dark")));
}

#[test]
fn batch_replace_then_submit_updates_the_stored_document() {
    let store = temp_store();

    let mut session = session();
    session.open_new("Replace me");
    session
        .set_model(Dimension::Agents, "explore", Some("openai/gpt-5"))
        .expect("bind explore");
    session
        .set_variant(Dimension::Agents, "explore", Some("high"))
        .expect("explore variant");
    session
        .set_model(Dimension::Agents, "oracle", Some("openai/gpt-5"))
        .expect("bind oracle");
    session
        .set_model(Dimension::Categories, "writing", Some("google/gemini-pro"))
        .expect("bind writing");

    let outcome = session
        .replace_models(&BatchReplaceSpec {
            from_model: "openai/gpt-5".to_string(),
            from_variant: None,
            to_model: "anthropic/claude-opus".to_string(),
            to_variant: None,
        })
        .expect("replace");
    // "high" is valid for the target model, so nothing gets cleared.
    assert_eq!(
        outcome,
        ReplaceOutcome::Applied {
            rewritten: 2,
            variants_cleared: 0,
        }
    );

    let saved = session.submit(&store).expect("submit");
    assert_eq!(
        saved.agents.get("explore"),
        Some(&json!({ "model": "anthropic/claude-opus", "variant": "high" }))
    );
    assert_eq!(
        saved.agents.get("oracle"),
        Some(&json!({ "model": "anthropic/claude-opus" }))
    );
    assert_eq!(
        saved.categories.get("writing"),
        Some(&json!({ "model": "google/gemini-pro" }))
    );
}

#[test]
fn import_folds_into_a_stored_document_without_losing_state() {
    let store = temp_store();

    let mut session = session();
    session.open_new("Import target");
    session
        .set_model(Dimension::Agents, "oracle", Some("anthropic/claude-opus"))
        .expect("bind oracle");
    let saved = session.submit(&store).expect("first submit");

    let mut session = self::session();
    session.load(&store.load(&saved.id).expect("load").expect("present"));

    let fragment = ImportFragment::from_json(
        r#"{
            "agents": {
                "Explore": { "model": "openai/gpt-5", "variant": "low" },
                "imported-helper": { "maxTokens": 1024 },
                "__section__": { "model": "ignored" },
                "garbage": 42
            },
            "categories": { "quick": { "model": "google/gemini-pro" } }
        }"#,
    )
    .expect("parse fragment");
    let summary = session.import_fragment(&fragment).expect("import");
    assert_eq!(summary.agents_affected, 2);
    assert_eq!(summary.categories_affected, 1);

    let saved = session.submit(&store).expect("second submit");
    // Pre-existing binding untouched by the fragment.
    assert_eq!(
        saved.agents.get("oracle"),
        Some(&json!({ "model": "anthropic/claude-opus" }))
    );
    // Imported keys normalized and folded.
    assert_eq!(
        saved.agents.get("explore"),
        Some(&json!({ "model": "openai/gpt-5", "variant": "low" }))
    );
    assert_eq!(
        saved.agents.get("imported-helper"),
        Some(&json!({ "maxTokens": 1024 }))
    );
    assert!(!saved.agents.contains_key("__section__"));
    assert!(!saved.agents.contains_key("garbage"));
}

#[test]
fn validation_failure_saves_nothing() {
    let store = temp_store();

    let mut session = session();
    session.open_new("Broken");
    session
        .set_advanced_raw(Dimension::Agents, "explore", "{invalid")
        .expect("set raw");

    assert!(session.submit(&store).is_err());
    assert_eq!(session.state(), SessionState::Editing);
    assert!(store.list().expect("list").is_empty());
}
