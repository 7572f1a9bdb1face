// Platform paths
// Where preferences and the bookmark database live on Linux, macOS and Windows.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "popup-bookmarks";

fn home_dir() -> PathBuf {
    PathBuf::from(env::var("HOME").unwrap_or_else(|_| String::from("/tmp")))
}

/// Directory for user preferences.
///
/// - **Linux**: `$XDG_CONFIG_HOME/popup-bookmarks` or `~/.config/popup-bookmarks`
/// - **macOS**: `~/Library/Application Support/popup-bookmarks`
/// - **Windows**: `%APPDATA%/popup-bookmarks`
pub fn get_config_dir() -> PathBuf {
    if cfg!(target_os = "windows") {
        let appdata = env::var("APPDATA").unwrap_or_else(|_| String::from("C:\\Users\\Default\\AppData\\Roaming"));
        PathBuf::from(appdata).join(APP_DIR)
    } else if cfg!(target_os = "macos") {
        home_dir().join("Library").join("Application Support").join(APP_DIR)
    } else {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".config").join(APP_DIR),
        }
    }
}

/// Directory for the bookmark database.
///
/// - **Linux**: `$XDG_DATA_HOME/popup-bookmarks` or `~/.local/share/popup-bookmarks`
/// - **macOS / Windows**: same as the config directory
pub fn get_data_dir() -> PathBuf {
    if cfg!(any(target_os = "windows", target_os = "macos")) {
        get_config_dir()
    } else {
        match env::var("XDG_DATA_HOME") {
            Ok(xdg) => PathBuf::from(xdg).join(APP_DIR),
            Err(_) => home_dir().join(".local").join("share").join(APP_DIR),
        }
    }
}
