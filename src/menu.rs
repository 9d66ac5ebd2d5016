pub const MENU_BUTTON: &str = "☰ 選單";
pub const GAME_ENTRY: &str = "分辨小遊戲";
pub const ANALYZE_ENTRY: &str = "影片辨識";
pub const FORUM_ENTRY: &str = "論壇";
pub const CREATE_ENTRY: &str = "製作";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEntry {
    Game,
    Analyze,
    Forum,
    Create,
}
impl MenuEntry {
    pub const ALL: [MenuEntry; 4] = [
        MenuEntry::Game,
        MenuEntry::Analyze,
        MenuEntry::Forum,
        MenuEntry::Create,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MenuEntry::Game => GAME_ENTRY,
            MenuEntry::Analyze => ANALYZE_ENTRY,
            MenuEntry::Forum => FORUM_ENTRY,
            MenuEntry::Create => CREATE_ENTRY,
        }
    }

    pub fn from_label(label: &str) -> Option<MenuEntry> {
        MenuEntry::ALL
            .into_iter()
            .find(|entry| entry.label() == label.trim())
    }
}

/// Side navigation menu of a chat, opened and closed by the menu button.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SideMenu {
    open: bool,
}

impl SideMenu {
    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    /// Anything other than the menu or its button closes it.
    pub fn dismiss(&mut self) {
        self.open = false;
    }

    pub fn aria_expanded(&self) -> &'static str {
        if self.open {
            "true"
        } else {
            "false"
        }
    }

    pub fn aria_hidden(&self) -> &'static str {
        if self.open {
            "false"
        } else {
            "true"
        }
    }
}
