//! Unit tests for the option schema and the JSON preference store.

use popup_bookmarks::services::preferences::{
    init_options, option_schema, reset_options, update_options, validate_option, JsonPreferenceStore,
    OptionKind, OptionSpec, PreferenceStore,
};
use popup_bookmarks::types::bookmark::BookmarkRecord;
use popup_bookmarks::types::errors::PreferencesError;
use popup_bookmarks::types::preferences::Options;
use serde_json::{json, Map, Value};
use tempfile::TempDir;

fn root_folder(id: &str, title: &str) -> BookmarkRecord {
    BookmarkRecord {
        id: id.to_string(),
        parent_id: Some("0".to_string()),
        title: title.to_string(),
        url: None,
        index: 0,
        date_added: 0,
        date_group_modified: None,
    }
}

fn setup() -> (TempDir, JsonPreferenceStore, Vec<OptionSpec>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = JsonPreferenceStore::new(Some(dir.path().join("prefs").join("preferences.json")));
    let schema = option_schema(&[root_folder("1", "Bookmarks bar"), root_folder("2", "Other bookmarks")]);
    (dir, store, schema)
}

fn changes(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

#[test]
fn test_schema_defaults_match_options_default() {
    let (_dir, _, schema) = setup();
    let defaults: Map<String, Value> = schema
        .iter()
        .map(|spec| (spec.name.to_string(), spec.default.clone()))
        .collect();
    let options: Options = serde_json::from_value(Value::Object(defaults)).unwrap();
    assert_eq!(options, Options::default());
}

#[test]
fn test_schema_folder_choices_come_from_root_folders() {
    let (_dir, _, schema) = setup();
    let def_expand = schema.iter().find(|spec| spec.name == "defExpand").unwrap();
    assert_eq!(def_expand.kind, OptionKind::Integer);
    let values: Vec<&Value> = def_expand.choices.iter().map(|c| &c.value).collect();
    assert_eq!(values, vec![&json!(1), &json!(2)]);
}

#[test]
fn test_validate_option() {
    let (_dir, _, schema) = setup();

    assert!(validate_option(&schema, "fontSize", &json!(14)).is_ok());
    assert!(validate_option(&schema, "hideRootFolder", &json!([2])).is_ok());
    assert!(validate_option(&schema, "fontFamily", &json!("Georgia")).is_ok());

    let rejected = [
        ("fontSize", json!(31)),
        ("fontSize", json!("12")),
        ("clickByLeft", json!(7)),
        ("defExpand", json!(3)),
        ("hideRootFolder", json!([9])),
        ("fontFamily", json!("Papyrus")),
        ("tooltip", json!(1)),
    ];
    for (name, value) in rejected {
        assert!(
            matches!(validate_option(&schema, name, &value), Err(PreferencesError::InvalidValue(_))),
            "{} accepted {}",
            name,
            value
        );
    }

    assert!(matches!(
        validate_option(&schema, "noSuchOption", &json!(true)),
        Err(PreferencesError::InvalidKey(_))
    ));
}

#[test]
fn test_missing_file_reads_empty() {
    let (_dir, store, _) = setup();
    assert!(store.get_all().unwrap().is_empty());
    assert!(store.clear_all().is_ok());
}

#[test]
fn test_init_writes_only_missing_defaults() {
    let (_dir, store, schema) = setup();
    store.set_all(changes(json!({ "fontSize": 20 }))).unwrap();

    let options = init_options(&store, &schema).unwrap();
    assert_eq!(options.font_size, 20);
    assert_eq!(options.max_results, 50);

    let stored = store.get_all().unwrap();
    assert_eq!(stored.len(), schema.len());
    assert_eq!(stored["fontSize"], json!(20));
}

#[test]
fn test_update_validates_before_writing() {
    let (_dir, store, schema) = setup();
    init_options(&store, &schema).unwrap();

    let result = update_options(&store, &schema, changes(json!({ "rememberPos": true, "setWidth": 5 })));
    assert!(result.is_err());
    assert_eq!(store.get_all().unwrap()["rememberPos"], json!(false));

    let options = update_options(&store, &schema, changes(json!({ "rememberPos": true, "defExpand": 2 }))).unwrap();
    assert!(options.remember_pos);
    assert_eq!(options.def_expand, 2);
    assert_eq!(options.default_root_id(), "2");
}

#[test]
fn test_reset_restores_defaults() {
    let (_dir, store, schema) = setup();
    update_options(&store, &schema, changes(json!({ "tooltip": true }))).unwrap();

    let options = reset_options(&store, &schema).unwrap();
    assert_eq!(options, Options::default());
    assert_eq!(store.get_all().unwrap()["tooltip"], json!(false));
}

#[test]
fn test_corrupt_file_is_an_error() {
    let (_dir, store, schema) = setup();
    std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
    std::fs::write(store.path(), "{ not json").unwrap();
    assert!(matches!(
        init_options(&store, &schema),
        Err(PreferencesError::SerializationError(_))
    ));
}
