//! RPC method handler for the popup-bookmarks JSON-RPC protocol.
//!
//! Extracted from `rpc_server.rs` so it can be unit-tested independently.
//! The `handle_method` function dispatches JSON-RPC method calls to the
//! `App` struct.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::app::{App, ArrowKey, MenuInput};
use crate::managers::bookmark_store::BookmarkStore;
use crate::services::context_menu::MenuAction;
use crate::services::preferences::{self, PreferenceStore};
use crate::types::bookmark::CreateDetails;
use crate::types::preferences::ClickType;
use crate::types::tree::TreeItem;

fn str_param<'a>(params: &'a Value, key: &str) -> Result<&'a str, String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("missing {}", key))
}

fn usize_param(params: &Value, key: &str) -> Result<usize, String> {
    let value = params
        .get(key)
        .and_then(|v| v.as_u64())
        .ok_or_else(|| format!("missing {}", key))?;
    usize::try_from(value).map_err(|_| format!("{} out of range: {}", key, value))
}

fn typed_param<T: DeserializeOwned>(params: &Value, key: &str) -> Result<T, String> {
    let value = params.get(key).cloned().ok_or_else(|| format!("missing {}", key))?;
    serde_json::from_value(value).map_err(|e| format!("invalid {}: {}", key, e))
}

fn to_json<T: Serialize>(value: T) -> Result<Value, String> {
    serde_json::to_value(value).map_err(|e| e.to_string())
}

/// Dispatch a JSON-RPC method call to the appropriate handler.
///
/// Returns `Ok(Value)` on success or `Err(String)` with an error message.
pub async fn handle_method(app: &App, method: &str, params: &Value) -> Result<Value, String> {
    match method {
        "ping" => Ok(json!({"pong": true})),

        // ─── Navigation ───
        "popup.state" => to_json(app.snapshot().await),
        "tree.open" => {
            let level_index = usize_param(params, "levelIndex")?;
            let folder_id = str_param(params, "folderId")?;
            to_json(app.open_folder(level_index, folder_id).await.map_err(|e| e.to_string())?)
        }
        "tree.close" => {
            let level_index = usize_param(params, "levelIndex")?;
            to_json(app.close_levels_after(level_index).await)
        }
        "tree.openRoot" => {
            let folder_id = str_param(params, "folderId")?;
            to_json(app.open_root_shortcut(folder_id).await.map_err(|e| e.to_string())?)
        }
        "key.arrow" => {
            let key: ArrowKey = typed_param(params, "key")?;
            to_json(app.press_arrow(key).await.map_err(|e| e.to_string())?)
        }
        "selection.set" => {
            let item: Option<TreeItem> = match params.get("item") {
                None | Some(Value::Null) => None,
                Some(_) => Some(typed_param(params, "item")?),
            };
            let mut state = app.state.lock().await;
            state.set_keyboard_target(item);
            to_json(state.snapshot())
        }
        "search" => {
            let keyword = params.get("keyword").and_then(|v| v.as_str()).unwrap_or("");
            to_json(app.search(keyword).await.map_err(|e| e.to_string())?)
        }

        // ─── Bookmarks ───
        "bookmark.get" => {
            let id = str_param(params, "id")?;
            to_json(app.store.get(id).await.map_err(|e| e.to_string())?)
        }
        "bookmark.create" => {
            let details: CreateDetails = serde_json::from_value(params.clone()).map_err(|e| format!("invalid params: {}", e))?;
            to_json(app.store.create(details).await.map_err(|e| e.to_string())?)
        }
        "bookmark.open" => {
            let id = str_param(params, "id")?;
            let click: ClickType = match params.get("click") {
                Some(_) => typed_param(params, "click")?,
                None => ClickType::Left,
            };
            to_json(app.open_bookmark(id, click).await.map_err(|e| e.to_string())?)
        }

        // ─── Context menu and editor ───
        "menu.open" => {
            let item: TreeItem = typed_param(params, "item")?;
            to_json(app.open_menu(item).await.map_err(|e| e.to_string())?)
        }
        "menu.close" => {
            app.close_menu().await;
            Ok(json!({"ok": true}))
        }
        "menu.action" => {
            let key = str_param(params, "key")?;
            let action = MenuAction::from_key(key).ok_or_else(|| format!("unknown menu entry: {}", key))?;
            let input: MenuInput = serde_json::from_value(params.clone()).unwrap_or_default();
            to_json(app.run_menu_action(action, input).await.map_err(|e| e.to_string())?)
        }
        "editor.submit" => {
            let title = str_param(params, "title")?;
            let url = params.get("url").and_then(|v| v.as_str());
            to_json(app.submit_editor(title, url).await.map_err(|e| e.to_string())?)
        }
        "editor.close" => {
            app.close_editor().await;
            Ok(json!({"ok": true}))
        }

        // ─── Options ───
        "options.schema" => to_json(app.option_schema().await.map_err(|e| e.to_string())?),
        "options.get" => to_json(app.preferences.get_all().map_err(|e| e.to_string())?),
        "options.set" => {
            let changes: Map<String, Value> = typed_param(params, "changes")?;
            let schema = app.option_schema().await.map_err(|e| e.to_string())?;
            let options = preferences::update_options(&app.preferences, &schema, changes).map_err(|e| e.to_string())?;
            app.apply_options(options.clone()).await.map_err(|e| e.to_string())?;
            to_json(options)
        }
        "options.reset" => {
            let schema = app.option_schema().await.map_err(|e| e.to_string())?;
            let options = preferences::reset_options(&app.preferences, &schema).map_err(|e| e.to_string())?;
            app.apply_options(options.clone()).await.map_err(|e| e.to_string())?;
            to_json(options)
        }

        _ => Err(format!("unknown method: {}", method)),
    }
}
