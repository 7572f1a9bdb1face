use serde::{Deserialize, Serialize};

/// User options, keyed in storage by their camelCase names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub click_by_left: u8,
    pub click_by_left_ctrl: u8,
    pub click_by_left_shift: u8,
    pub click_by_middle: u8,
    /// Numeric id of the folder shown as level 0.
    pub def_expand: u64,
    pub font_family: String,
    pub font_size: u32,
    /// Numeric ids of top-level folders hidden from the root shortcuts.
    pub hide_root_folder: Vec<u64>,
    pub max_results: usize,
    pub op_folder_by: bool,
    pub remember_pos: bool,
    pub search_target: u8,
    pub set_width: u32,
    pub tooltip: bool,
    pub warn_open_many: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            click_by_left: 0,
            click_by_left_ctrl: 4,
            click_by_left_shift: 5,
            click_by_middle: 2,
            def_expand: 1,
            font_family: "sans-serif".to_string(),
            font_size: 12,
            hide_root_folder: Vec::new(),
            max_results: 50,
            op_folder_by: false,
            remember_pos: false,
            search_target: 0,
            set_width: 280,
            tooltip: false,
            warn_open_many: true,
        }
    }
}

impl Options {
    /// Folder id of level 0.
    pub fn default_root_id(&self) -> String {
        self.def_expand.to_string()
    }

    /// Search only matches titles when `searchTarget` is 1.
    pub fn search_title_only(&self) -> bool {
        self.search_target == 1
    }

    pub fn open_method(&self, click: ClickType) -> Option<OpenMethod> {
        let raw = match click {
            ClickType::Left => self.click_by_left,
            ClickType::LeftCtrl => self.click_by_left_ctrl,
            ClickType::LeftShift => self.click_by_left_shift,
            ClickType::Middle => self.click_by_middle,
        };
        OpenMethod::from_code(raw)
    }
}

/// Mouse gesture used to activate a bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ClickType {
    Left,
    LeftCtrl,
    LeftShift,
    Middle,
}

/// Where an activated bookmark opens. Codes match the stored option values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OpenMethod {
    CurrentTab,
    CurrentTabKeepPopup,
    NewTab,
    BackgroundTab,
    BackgroundTabKeepPopup,
    NewWindow,
    IncognitoWindow,
}

impl OpenMethod {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(OpenMethod::CurrentTab),
            1 => Some(OpenMethod::CurrentTabKeepPopup),
            2 => Some(OpenMethod::NewTab),
            3 => Some(OpenMethod::BackgroundTab),
            4 => Some(OpenMethod::BackgroundTabKeepPopup),
            5 => Some(OpenMethod::NewWindow),
            6 => Some(OpenMethod::IncognitoWindow),
            _ => None,
        }
    }

    /// The popup stays open only for the "keep popup" variants.
    pub fn closes_popup(self) -> bool {
        !matches!(
            self,
            OpenMethod::CurrentTabKeepPopup | OpenMethod::BackgroundTabKeepPopup
        )
    }
}
