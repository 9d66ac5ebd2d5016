pub mod bank;
pub mod game;
pub mod randomizer;

pub use bank::QuestionBank;
pub use game::{Game, GameEvent, GameState, Phase, RenderCommand};
pub use randomizer::{SideRandomizer, ThreadRandomizer};

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "real_video")]
    pub real_asset_ref: String,
    #[serde(rename = "fake_video")]
    pub fake_asset_ref: String,
    pub explanation: String,
}
impl Question {
    pub fn new(id: u32, real_asset_ref: &str, fake_asset_ref: &str, explanation: &str) -> Self {
        Self {
            id,
            real_asset_ref: real_asset_ref.to_string(),
            fake_asset_ref: fake_asset_ref.to_string(),
            explanation: explanation.to_string(),
        }
    }
}

/// One of the two slots a clip is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Side {
    Left,
    Right,
}
impl Side {
    pub fn to_chinese_string(&self) -> &'static str {
        match self {
            Side::Left => "左邊",
            Side::Right => "右邊",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Verdict {
    Correct,
    Incorrect,
}
impl Verdict {
    pub fn from_bool(is_correct: bool) -> Self {
        if is_correct {
            Verdict::Correct
        } else {
            Verdict::Incorrect
        }
    }
}
