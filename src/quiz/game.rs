use log::{debug, info};

use crate::quiz::randomizer::SideRandomizer;
use crate::quiz::{QuestionBank, Side, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Phase {
    AwaitingChoice,
    ShowingResult,
    Finished,
}

/// Which slot got the fake clip in the round being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RoundAssignment {
    pub question_id: u32,
    pub fake_side: Side,
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GameState {
    pub current_index: usize,
    pub score: usize,
    pub phase: Phase,
    pub round: Option<RoundAssignment>,
}

impl Default for GameState {
    fn default() -> Self {
        Self {
            current_index: 0,
            score: 0,
            phase: Phase::AwaitingChoice,
            round: None,
        }
    }
}

/// Input coming from the player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ChoiceSubmitted(Side),
    NextRequested,
}

/// What the presentation layer has to do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCommand {
    /// Drop highlights, banners, explanation and the "next" control of the previous round.
    ResetRound,
    LoadRound {
        question_id: u32,
        score: usize,
        left: String,
        right: String,
    },
    SetChoiceEnabled(bool),
    HighlightSide {
        side: Side,
        verdict: Verdict,
    },
    ShowResult(Verdict),
    ShowExplanation(String),
    ShowNextControl,
    ShowFinalSummary {
        score: usize,
        total: usize,
    },
}

/// The "which clip is fake?" controller.
///
/// The game never talks to the chat directly: every transition mutates the
/// owned [`GameState`] and hands back the [`RenderCommand`]s describing what
/// changed on screen. Transitions called in the wrong phase are ignored and
/// return no commands, so repeated clicks cannot score twice.
pub struct Game<'a, R: SideRandomizer> {
    bank: &'a QuestionBank,
    randomizer: R,
    state: GameState,
}

impl<'a, R: SideRandomizer> Game<'a, R> {
    /// Fresh game, first round already loaded.
    pub fn start(bank: &'a QuestionBank, randomizer: R) -> (Self, Vec<RenderCommand>) {
        let mut game = Self::resume(bank, randomizer, GameState::default());
        let commands = game.start_round(0);
        (game, commands)
    }

    /// Picks up a game whose state was stored between two events.
    pub fn resume(bank: &'a QuestionBank, randomizer: R, state: GameState) -> Self {
        Self {
            bank,
            randomizer,
            state,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn dispatch(&mut self, event: GameEvent) -> Vec<RenderCommand> {
        match event {
            GameEvent::ChoiceSubmitted(side) => self.submit_choice(side),
            GameEvent::NextRequested => self.advance(),
        }
    }

    pub fn start_round(&mut self, index: usize) -> Vec<RenderCommand> {
        let mut commands = vec![RenderCommand::ResetRound];
        self.state.current_index = index.min(self.bank.len());

        let question = match self.bank.get(index) {
            Some(question) => question,
            None => {
                debug!(
                    "No question at index {}, finishing with {}/{}",
                    index,
                    self.state.score,
                    self.bank.len()
                );
                self.state.round = None;
                self.state.phase = Phase::Finished;
                commands.push(RenderCommand::ShowFinalSummary {
                    score: self.state.score,
                    total: self.bank.len(),
                });
                return commands;
            }
        };

        let fake_side = self.randomizer.assign_sides();
        let (left, right) = match fake_side {
            Side::Left => (&question.fake_asset_ref, &question.real_asset_ref),
            Side::Right => (&question.real_asset_ref, &question.fake_asset_ref),
        };
        self.state.round = Some(RoundAssignment {
            question_id: question.id,
            fake_side,
        });
        self.state.phase = Phase::AwaitingChoice;
        debug!("Question {} starts, fake clip on {:?}", question.id, fake_side);

        commands.push(RenderCommand::SetChoiceEnabled(true));
        commands.push(RenderCommand::LoadRound {
            question_id: question.id,
            score: self.state.score,
            left: left.clone(),
            right: right.clone(),
        });
        commands
    }

    pub fn submit_choice(&mut self, side: Side) -> Vec<RenderCommand> {
        let round = match (self.state.phase, self.state.round) {
            (Phase::AwaitingChoice, Some(round)) => round,
            (phase, _) => {
                debug!("Ignoring choice {:?} while {:?}", side, phase);
                return Vec::new();
            }
        };
        let Some(question) = self.bank.get(self.state.current_index) else {
            debug!("Ignoring choice {:?}, no active question", side);
            return Vec::new();
        };

        let verdict = Verdict::from_bool(side == round.fake_side);
        if verdict == Verdict::Correct {
            self.state.score += 1;
        }
        self.state.phase = Phase::ShowingResult;
        info!(
            "Question {}: picked {:?}, fake was {:?} ({:?}), score {}",
            round.question_id, side, round.fake_side, verdict, self.state.score
        );

        let mut commands = vec![
            RenderCommand::SetChoiceEnabled(false),
            RenderCommand::HighlightSide { side, verdict },
        ];
        if verdict == Verdict::Incorrect {
            commands.push(RenderCommand::HighlightSide {
                side: round.fake_side,
                verdict: Verdict::Correct,
            });
        }
        commands.push(RenderCommand::ShowResult(verdict));
        commands.push(RenderCommand::ShowExplanation(question.explanation.clone()));
        commands.push(RenderCommand::ShowNextControl);
        commands
    }

    pub fn advance(&mut self) -> Vec<RenderCommand> {
        if self.state.phase != Phase::ShowingResult {
            debug!("Ignoring next request while {:?}", self.state.phase);
            return Vec::new();
        }
        self.start_round(self.state.current_index + 1)
    }
}
