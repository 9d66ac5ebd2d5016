use std::path::{Path, PathBuf};

use log::warn;
use teloxide::{
    prelude::*,
    types::{InputFile, KeyboardButton, KeyboardMarkup, KeyboardRemove, ReplyMarkup},
};

use crate::menu::{MenuEntry, SideMenu, MENU_BUTTON};
use crate::quiz::{GameEvent, Phase, RenderCommand, Side, Verdict};
use crate::HandlerResult;

pub const CHOOSE_LEFT: &str = "👈 左邊是假影片";
pub const CHOOSE_RIGHT: &str = "右邊是假影片 👉";
pub const NEXT_QUESTION: &str = "下一題";

/// Maps a keyboard press during a game to the event it stands for.
pub fn parse_game_input(text: &str) -> Option<GameEvent> {
    match text.trim() {
        CHOOSE_LEFT => Some(GameEvent::ChoiceSubmitted(Side::Left)),
        CHOOSE_RIGHT => Some(GameEvent::ChoiceSubmitted(Side::Right)),
        NEXT_QUESTION => Some(GameEvent::NextRequested),
        _ => None,
    }
}

pub fn choice_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(CHOOSE_LEFT),
        KeyboardButton::new(CHOOSE_RIGHT),
    ]])
}

pub fn next_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![KeyboardButton::new(NEXT_QUESTION)]])
}

/// Closed menu shows only the menu button, an open one lists every page.
pub fn menu_keyboard(menu: SideMenu) -> KeyboardMarkup {
    let mut rows = Vec::new();
    if menu.is_open() {
        rows.extend(
            MenuEntry::ALL
                .iter()
                .map(|entry| vec![KeyboardButton::new(entry.label())]),
        );
    }
    rows.push(vec![KeyboardButton::new(MENU_BUTTON)]);
    KeyboardMarkup::new(rows)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    Choices,
    Next,
    Menu,
    Remove,
}
impl Keyboard {
    pub fn markup(self) -> ReplyMarkup {
        match self {
            Keyboard::Choices => choice_keyboard().into(),
            Keyboard::Next => next_keyboard().into(),
            Keyboard::Menu => menu_keyboard(SideMenu::default()).into(),
            Keyboard::Remove => KeyboardRemove::new().into(),
        }
    }
}

/// A single thing to send to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outgoing {
    Text { text: String, keyboard: Keyboard },
    Clip { side: Side, asset: String },
}

fn highlight_line(side: Side, verdict: Verdict) -> String {
    match verdict {
        Verdict::Correct => format!("✅ {}的影片是 Deepfake", side.to_chinese_string()),
        Verdict::Incorrect => format!("❌ {}的影片是真實影片", side.to_chinese_string()),
    }
}

fn result_line(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Correct => "✅ 答對了！您成功辨識出 Deepfake 影片！",
        Verdict::Incorrect => "❌ 答錯了。這是真實影片。",
    }
}

/// Turns render commands into chat messages.
///
/// Lines produced by highlights, the result banner and the explanation are
/// collected into one message so the chat doesn't get spammed, and that
/// message carries whichever keyboard the commands asked for last.
pub fn plan(commands: &[RenderCommand]) -> Vec<Outgoing> {
    let mut out = Vec::new();
    let mut lines: Vec<String> = Vec::new();
    let mut keyboard = None;

    for command in commands {
        match command {
            RenderCommand::ResetRound => lines.clear(),
            RenderCommand::SetChoiceEnabled(true) => keyboard = Some(Keyboard::Choices),
            RenderCommand::SetChoiceEnabled(false) => keyboard = Some(Keyboard::Remove),
            RenderCommand::LoadRound {
                question_id,
                score,
                left,
                right,
            } => {
                out.push(Outgoing::Text {
                    text: format!("Q{}: 假影片是哪個？ (目前得分: {})", question_id, score),
                    keyboard: keyboard.take().unwrap_or(Keyboard::Choices),
                });
                out.push(Outgoing::Clip {
                    side: Side::Left,
                    asset: left.clone(),
                });
                out.push(Outgoing::Clip {
                    side: Side::Right,
                    asset: right.clone(),
                });
            }
            RenderCommand::HighlightSide { side, verdict } => {
                lines.push(highlight_line(*side, *verdict))
            }
            RenderCommand::ShowResult(verdict) => lines.push(result_line(*verdict).to_string()),
            RenderCommand::ShowExplanation(text) => lines.push(text.clone()),
            RenderCommand::ShowNextControl => keyboard = Some(Keyboard::Next),
            RenderCommand::ShowFinalSummary { score, total } => {
                lines.push(format!("遊戲結束！您的最終得分是 {}/{}。", score, total));
                lines.push("恭喜您完成所有挑戰！".to_string());
                keyboard = Some(Keyboard::Menu);
            }
        }
    }

    if !lines.is_empty() {
        out.push(Outgoing::Text {
            text: lines.join("\n\n"),
            keyboard: keyboard.unwrap_or(Keyboard::Remove),
        });
    }
    out
}

/// Where rendered messages end up.
pub trait ChatSink {
    async fn send_text(&self, text: String, keyboard: Keyboard) -> HandlerResult;
    async fn send_clip(&self, side: Side, asset: &str) -> HandlerResult;
}

/// Sends every planned message. Text failures are returned, clip failures
/// are only logged so the player can still answer.
pub async fn render<S: ChatSink>(sink: &S, commands: &[RenderCommand]) -> HandlerResult {
    for outgoing in plan(commands) {
        match outgoing {
            Outgoing::Text { text, keyboard } => sink.send_text(text, keyboard).await?,
            Outgoing::Clip { side, asset } => {
                if let Err(err) = sink.send_clip(side, &asset).await {
                    warn!(
                        "Unable to play {} clip {:?}: {}",
                        side.to_chinese_string(),
                        asset,
                        err
                    );
                }
            }
        }
    }
    Ok(())
}

/// The keyboard a player needs to keep going from `phase`.
pub fn keyboard_for_phase(phase: Phase) -> Keyboard {
    match phase {
        Phase::AwaitingChoice => Keyboard::Choices,
        Phase::ShowingResult => Keyboard::Next,
        Phase::Finished => Keyboard::Menu,
    }
}

/// Renders a game for one chat.
pub struct TelegramPresenter<'a> {
    bot: &'a Bot,
    chat_id: ChatId,
    video_root: &'a Path,
}

impl<'a> TelegramPresenter<'a> {
    pub fn new(bot: &'a Bot, chat_id: ChatId, video_root: &'a Path) -> Self {
        Self {
            bot,
            chat_id,
            video_root,
        }
    }

    fn asset_path(&self, asset: &str) -> PathBuf {
        self.video_root.join(asset)
    }

    pub async fn render(&self, commands: &[RenderCommand]) -> HandlerResult {
        render(self, commands).await
    }
}

impl ChatSink for TelegramPresenter<'_> {
    async fn send_text(&self, text: String, keyboard: Keyboard) -> HandlerResult {
        self.bot
            .send_message(self.chat_id, text)
            .reply_markup(keyboard.markup())
            .await?;
        Ok(())
    }

    async fn send_clip(&self, side: Side, asset: &str) -> HandlerResult {
        self.bot
            .send_video(self.chat_id, InputFile::file(self.asset_path(asset)))
            .caption(side.to_chinese_string())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_parse_game_input() {
        assert_eq!(
            parse_game_input(CHOOSE_LEFT),
            Some(GameEvent::ChoiceSubmitted(Side::Left))
        );
        assert_eq!(
            parse_game_input(CHOOSE_RIGHT),
            Some(GameEvent::ChoiceSubmitted(Side::Right))
        );
        assert_eq!(parse_game_input(" 下一題 "), Some(GameEvent::NextRequested));
        assert_eq!(parse_game_input("左"), None);
    }

    #[test]
    fn test_plan_round_start() {
        let commands = vec![
            RenderCommand::ResetRound,
            RenderCommand::SetChoiceEnabled(true),
            RenderCommand::LoadRound {
                question_id: 1,
                score: 0,
                left: "videos/q1_fake.mp4".to_string(),
                right: "videos/q1_real.mp4".to_string(),
            },
        ];
        assert_eq!(
            plan(&commands),
            vec![
                Outgoing::Text {
                    text: "Q1: 假影片是哪個？ (目前得分: 0)".to_string(),
                    keyboard: Keyboard::Choices,
                },
                Outgoing::Clip {
                    side: Side::Left,
                    asset: "videos/q1_fake.mp4".to_string(),
                },
                Outgoing::Clip {
                    side: Side::Right,
                    asset: "videos/q1_real.mp4".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_plan_wrong_answer() {
        let commands = vec![
            RenderCommand::SetChoiceEnabled(false),
            RenderCommand::HighlightSide {
                side: Side::Left,
                verdict: Verdict::Incorrect,
            },
            RenderCommand::HighlightSide {
                side: Side::Right,
                verdict: Verdict::Correct,
            },
            RenderCommand::ShowResult(Verdict::Incorrect),
            RenderCommand::ShowExplanation("看陰影".to_string()),
            RenderCommand::ShowNextControl,
        ];
        let planned = plan(&commands);
        assert_eq!(planned.len(), 1);
        let Outgoing::Text { text, keyboard } = &planned[0] else {
            panic!("expected a text message, got {:?}", planned[0]);
        };
        assert_eq!(*keyboard, Keyboard::Next);
        assert_eq!(
            text,
            "❌ 左邊的影片是真實影片\n\n✅ 右邊的影片是 Deepfake\n\n❌ 答錯了。這是真實影片。\n\n看陰影"
        );
    }

    #[test]
    fn test_plan_final_summary() {
        let commands = vec![
            RenderCommand::ResetRound,
            RenderCommand::ShowFinalSummary { score: 1, total: 2 },
        ];
        assert_eq!(
            plan(&commands),
            vec![Outgoing::Text {
                text: "遊戲結束！您的最終得分是 1/2。\n\n恭喜您完成所有挑戰！".to_string(),
                keyboard: Keyboard::Menu,
            }]
        );
    }

    #[test]
    fn test_plan_ignored_transition() {
        assert!(plan(&[]).is_empty());
    }

    #[test]
    fn test_keyboard_for_phase() {
        assert_eq!(keyboard_for_phase(Phase::AwaitingChoice), Keyboard::Choices);
        assert_eq!(keyboard_for_phase(Phase::ShowingResult), Keyboard::Next);
        assert_eq!(keyboard_for_phase(Phase::Finished), Keyboard::Menu);
    }

    /// Records texts, fails every clip.
    #[derive(Default)]
    struct BrokenPlayerSink {
        texts: Mutex<Vec<(String, Keyboard)>>,
        clip_attempts: Mutex<Vec<Side>>,
    }

    impl ChatSink for BrokenPlayerSink {
        async fn send_text(&self, text: String, keyboard: Keyboard) -> HandlerResult {
            self.texts.lock().unwrap().push((text, keyboard));
            Ok(())
        }

        async fn send_clip(&self, side: Side, _asset: &str) -> HandlerResult {
            self.clip_attempts.lock().unwrap().push(side);
            Err("file not found".into())
        }
    }

    #[tokio::test]
    async fn test_render_survives_failed_clips() {
        let sink = BrokenPlayerSink::default();
        let commands = vec![
            RenderCommand::ResetRound,
            RenderCommand::SetChoiceEnabled(true),
            RenderCommand::LoadRound {
                question_id: 2,
                score: 1,
                left: "videos/q2_real.mp4".to_string(),
                right: "videos/q2_fake.mp4".to_string(),
            },
        ];

        assert!(render(&sink, &commands).await.is_ok());
        assert_eq!(
            *sink.clip_attempts.lock().unwrap(),
            vec![Side::Left, Side::Right]
        );
        assert_eq!(
            *sink.texts.lock().unwrap(),
            vec![(
                "Q2: 假影片是哪個？ (目前得分: 1)".to_string(),
                Keyboard::Choices
            )]
        );
    }
}
