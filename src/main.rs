mod analyzer;
mod config;
mod menu;
mod presenter;
mod quiz;

use std::sync::Arc;

use analyzer::{MockAnalyzer, VideoSource};
use config::Config;
use dotenv::dotenv;
use log::{debug, error, info};
use menu::{MenuEntry, SideMenu, MENU_BUTTON};
use presenter::{keyboard_for_phase, menu_keyboard, parse_game_input, TelegramPresenter};
use quiz::{Game, GameState, Phase, QuestionBank, ThreadRandomizer};
use teloxide::{
    dispatching::dialogue::InMemStorage,
    prelude::*,
    types::{ChatAction, KeyboardButton, KeyboardMarkup},
};

type GameDialogue = Dialogue<State, InMemStorage<State>>;
pub type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

#[derive(Clone, Default, serde::Serialize, serde::Deserialize)]
pub enum State {
    #[default]
    Start,
    Idle {
        menu: SideMenu,
    },
    ReceiveVideo,
    ReviewAnalysis,
    Playing {
        game: GameState,
    },
}

#[tokio::main]
async fn main() {
    // A missing .env is fine, the variables may come from the environment
    dotenv().ok();
    pretty_env_logger::init();
    log::info!("Starting deepfake awareness bot...");

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    let bank = match &config.questions_path {
        Some(path) => match QuestionBank::load(path) {
            Ok(bank) => bank,
            Err(err) => {
                error!("Failed to load questions from {:?}: {}", path, err);
                std::process::exit(1);
            }
        },
        None => QuestionBank::builtin(),
    };
    if bank.is_empty() {
        log::warn!("Question bank is empty, every game ends right away");
    }
    info!("Question bank loaded with {} questions", bank.len());

    let analyzer = MockAnalyzer::new(config.analysis_delay, config.analysis_timeout);
    let bot = Bot::from_env();

    Dispatcher::builder(
        bot,
        Update::filter_message()
            .enter_dialogue::<Message, InMemStorage<State>, State>()
            .branch(dptree::case![State::Start].endpoint(start))
            .branch(dptree::case![State::Idle { menu }].endpoint(idle))
            .branch(dptree::case![State::ReceiveVideo].endpoint(receive_video))
            .branch(dptree::case![State::ReviewAnalysis].endpoint(review_analysis))
            .branch(dptree::case![State::Playing { game }].endpoint(playing)),
    )
    .dependencies(dptree::deps![
        InMemStorage::<State>::new(),
        Arc::new(bank),
        Arc::new(analyzer),
        Arc::new(config)
    ])
    .enable_ctrlc_handler()
    .build()
    .dispatch()
    .await;
}

const GREETING_TEXT: &str = "歡迎來到 Deepfake 辨識教室！一起學習如何分辨真假影片。點選「☰ 選單」開始探索。";
async fn start(bot: Bot, dialogue: GameDialogue, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, GREETING_TEXT)
        .reply_markup(menu_keyboard(SideMenu::default()))
        .await?;

    dialogue
        .update(State::Idle {
            menu: SideMenu::default(),
        })
        .await?;
    Ok(())
}

const FORUM_NOTICE: &str = "討論詳情頁面開發中";
const CREATE_NOTICE: &str = "製作功能開發中 — 僅供教學用途，請勿用於不法用途。";
const ANALYZE_PROMPT: &str = "請貼上影片網址，或直接上傳影片檔案。";
const BACK_TO_MENU: &str = "返回選單";

async fn idle(
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
    bot: Bot,
    dialogue: GameDialogue,
    mut menu: SideMenu,
    msg: Message,
) -> HandlerResult {
    let text = msg.text().unwrap_or_default();

    if text.trim() == MENU_BUTTON {
        menu.toggle();
        debug!(
            "Menu of chat {}: aria-expanded={} aria-hidden={}",
            msg.chat.id,
            menu.aria_expanded(),
            menu.aria_hidden()
        );
        let reply = if menu.is_open() { "選單已開啟" } else { "選單已關閉" };
        bot.send_message(msg.chat.id, reply)
            .reply_markup(menu_keyboard(menu))
            .await?;
        dialogue.update(State::Idle { menu }).await?;
        return Ok(());
    }

    // Picking a page or typing anything else closes the menu
    let entry = if menu.is_open() {
        MenuEntry::from_label(text)
    } else {
        None
    };
    menu.dismiss();

    match entry {
        Some(MenuEntry::Game) => {
            let (game, commands) = Game::start(&bank, ThreadRandomizer);
            finish_or_keep_playing(&dialogue, game.into_state()).await?;
            TelegramPresenter::new(&bot, msg.chat.id, &config.video_root)
                .render(&commands)
                .await?;
        }
        Some(MenuEntry::Analyze) => {
            let keyboard = KeyboardMarkup::new(vec![vec![KeyboardButton::new(BACK_TO_MENU)]]);
            bot.send_message(msg.chat.id, ANALYZE_PROMPT)
                .reply_markup(keyboard)
                .await?;
            dialogue.update(State::ReceiveVideo).await?;
        }
        Some(MenuEntry::Forum) => {
            bot.send_message(msg.chat.id, FORUM_NOTICE)
                .reply_markup(menu_keyboard(menu))
                .await?;
            dialogue.update(State::Idle { menu }).await?;
        }
        Some(MenuEntry::Create) => {
            bot.send_message(msg.chat.id, CREATE_NOTICE)
                .reply_markup(menu_keyboard(menu))
                .await?;
            dialogue.update(State::Idle { menu }).await?;
        }
        None => {
            bot.send_message(msg.chat.id, "請點選「☰ 選單」選擇功能")
                .reply_markup(menu_keyboard(menu))
                .await?;
            dialogue.update(State::Idle { menu }).await?;
        }
    }
    Ok(())
}

async fn back_to_menu(bot: &Bot, dialogue: &GameDialogue, msg: &Message) -> HandlerResult {
    let menu = SideMenu::default();
    bot.send_message(msg.chat.id, "已返回選單")
        .reply_markup(menu_keyboard(menu))
        .await?;
    dialogue.update(State::Idle { menu }).await?;
    Ok(())
}

async fn receive_video(
    analyzer: Arc<MockAnalyzer>,
    bot: Bot,
    dialogue: GameDialogue,
    msg: Message,
) -> HandlerResult {
    if msg.text().map(str::trim) == Some(BACK_TO_MENU) {
        return back_to_menu(&bot, &dialogue, &msg).await;
    }

    let file_name = msg
        .video()
        .map(|v| v.file_name.clone().unwrap_or_else(|| "video.mp4".to_string()))
        .or_else(|| msg.document().and_then(|d| d.file_name.clone()));
    let source = match VideoSource::from_input(msg.text(), file_name.as_deref()) {
        Ok(source) => source,
        Err(_) => {
            bot.send_message(msg.chat.id, ANALYZE_PROMPT).await?;
            return Ok(());
        }
    };

    bot.send_message(msg.chat.id, "分析中...").await?;
    // Only a nicety, the analysis goes on if this fails
    let _ = bot.send_chat_action(msg.chat.id, ChatAction::Typing).await;

    let keyboard = KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(REPORT_BUTTON), KeyboardButton::new(PLAY_BUTTON)],
        vec![KeyboardButton::new(BACK_TO_MENU)],
    ]);
    match analyzer.analyze(&source).await {
        Ok(analysis) => {
            info!(
                "Analyzed {:?}: fake={} confidence={:.1}",
                source.label(),
                analysis.is_fake,
                analysis.confidence
            );
            bot.send_message(msg.chat.id, analysis.summary()).await?;
            bot.send_message(msg.chat.id, analysis.details())
                .reply_markup(keyboard)
                .await?;
        }
        Err(err) => {
            error!("分析失敗：{}", err);
            bot.send_message(msg.chat.id, "分析失敗，請稍後再試。")
                .reply_markup(keyboard)
                .await?;
        }
    }

    dialogue.update(State::ReviewAnalysis).await?;
    Ok(())
}

const REPORT_BUTTON: &str = "檢舉";
const PLAY_BUTTON: &str = "播放";
async fn review_analysis(
    analyzer: Arc<MockAnalyzer>,
    bot: Bot,
    dialogue: GameDialogue,
    msg: Message,
) -> HandlerResult {
    match msg.text().map(str::trim) {
        Some(REPORT_BUTTON) => {
            bot.send_message(msg.chat.id, "檢舉功能開發中，感謝您的協助！")
                .await?;
            Ok(())
        }
        Some(PLAY_BUTTON) => {
            bot.send_message(msg.chat.id, "播放功能開發中").await?;
            Ok(())
        }
        Some(BACK_TO_MENU) => back_to_menu(&bot, &dialogue, &msg).await,
        // Anything else is a new video to look at
        _ => receive_video(analyzer, bot, dialogue, msg).await,
    }
}

async fn playing(
    bank: Arc<QuestionBank>,
    config: Arc<Config>,
    bot: Bot,
    dialogue: GameDialogue,
    game: GameState,
    msg: Message,
) -> HandlerResult {
    let text = msg.text().unwrap_or_default();
    if text.trim() == MENU_BUTTON || text.trim() == BACK_TO_MENU {
        info!("Chat {} left the game at question {}", msg.chat.id, game.current_index);
        return back_to_menu(&bot, &dialogue, &msg).await;
    }

    let event = match parse_game_input(text) {
        Some(event) => event,
        None => return send_answer_hint(&bot, &msg, game.phase).await,
    };

    let mut game = Game::resume(&bank, ThreadRandomizer, game);
    let commands = game.dispatch(event);
    if commands.is_empty() {
        // Ignored press, most likely a stale keyboard from a message that never arrived
        return send_answer_hint(&bot, &msg, game.state().phase).await;
    }
    // Store first, a failed send must not let the same round be scored again
    finish_or_keep_playing(&dialogue, game.into_state()).await?;

    TelegramPresenter::new(&bot, msg.chat.id, &config.video_root)
        .render(&commands)
        .await
}

async fn send_answer_hint(bot: &Bot, msg: &Message, phase: Phase) -> HandlerResult {
    bot.send_message(msg.chat.id, "請使用下方按鈕作答")
        .reply_markup(keyboard_for_phase(phase).markup())
        .await?;
    Ok(())
}

async fn finish_or_keep_playing(dialogue: &GameDialogue, game: GameState) -> HandlerResult {
    if game.phase == Phase::Finished {
        info!("Game finished with score {}", game.score);
        dialogue
            .update(State::Idle {
                menu: SideMenu::default(),
            })
            .await?;
    } else {
        dialogue.update(State::Playing { game }).await?;
    }
    Ok(())
}
