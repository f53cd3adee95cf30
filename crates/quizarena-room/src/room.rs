//! The battle room aggregate and its state machine.
//!
//! [`BattleRoom::apply`] is the only way a room changes. It takes a
//! command and a timestamp, works on a copy, and hands back the next
//! room plus the events the transition produced. A command that fails
//! leaves the original untouched, so callers can persist the result (or
//! not) as a unit.

use quizarena_protocol::{Millis, PlayerId, RoomId};
use serde::{Deserialize, Serialize};

use crate::{
    AnswerRecord, BattleError, BattleMode, BattleOutcome, BattlePlayer, CancelReason,
    MIN_PLAYERS, PlayerProfile, PlayerStatus, Question, RoomEvent, RoomSettings, RoomStatus,
    Teams, compute_teams, decide_outcome, score_answer,
};

/// A request to change a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomCommand {
    /// Add a player. The profile is snapshotted into the room.
    Join(PlayerProfile),
    /// Remove a player. Cancels the room if it empties or the creator leaves.
    Leave(PlayerId),
    /// Mark a player ready.
    Ready(PlayerId),
    /// Deal the question set and begin the battle.
    Start(Vec<Question>),
    /// Score one answer.
    Answer {
        player_id: PlayerId,
        question_index: usize,
        selected_answer: usize,
        time_spent_ms: u64,
    },
}

/// One battle room.
///
/// Fields are private so the invariants hold: `current_players` always
/// equals the member count, `teams` is always [`compute_teams`] over the
/// current members, and terminal rooms never change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleRoom {
    id: RoomId,
    mode: BattleMode,
    status: RoomStatus,
    max_players: usize,
    current_players: usize,
    players: Vec<BattlePlayer>,
    teams: Option<Teams>,
    questions: Vec<Question>,
    settings: RoomSettings,
    created_at: Millis,
    started_at: Option<Millis>,
    finished_at: Option<Millis>,
    winner: Option<BattleOutcome>,
    created_by: PlayerId,
    is_private: bool,
    invite_code: Option<String>,
}

impl BattleRoom {
    /// Creates an empty `waiting` room. A room is private exactly when it
    /// carries an invite code.
    pub fn new(
        id: RoomId,
        created_by: PlayerId,
        mode: BattleMode,
        settings: RoomSettings,
        invite_code: Option<String>,
        now: Millis,
    ) -> Self {
        Self {
            id,
            mode,
            status: RoomStatus::Waiting,
            max_players: mode.max_players(),
            current_players: 0,
            players: Vec::new(),
            teams: compute_teams(&[], mode),
            questions: Vec::new(),
            settings,
            created_at: now,
            started_at: None,
            finished_at: None,
            winner: None,
            created_by,
            is_private: invite_code.is_some(),
            invite_code,
        }
    }

    // ---- Accessors ----
    //
    // Read-only views. Every write goes through `apply`.

    /// Store-assigned id, unique for the life of the store.
    pub fn id(&self) -> RoomId {
        self.id
    }

    /// Fixed at creation; decides capacity and whether teams exist.
    pub fn mode(&self) -> BattleMode {
        self.mode
    }

    /// Where the room is in its lifecycle. See [`RoomStatus`] for the edges.
    pub fn status(&self) -> RoomStatus {
        self.status
    }

    /// Capacity from [`BattleMode::max_players`]: 2, 4 or 8.
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Always equal to `players().len()`. Kept as a field so the
    /// serialized room carries the count for list views.
    pub fn current_players(&self) -> usize {
        self.current_players
    }

    /// Members in join order.
    pub fn players(&self) -> &[BattlePlayer] {
        &self.players
    }

    /// `Some` for team modes (`2v2`, `group`), `None` for `1v1`.
    ///
    /// Recomputed from scratch on every membership change, so the two
    /// sides always partition exactly the current players.
    pub fn teams(&self) -> Option<&Teams> {
        self.teams.as_ref()
    }

    /// The dealt question set; empty until the battle starts.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Question count, time budget and difficulty chosen at creation.
    pub fn settings(&self) -> &RoomSettings {
        &self.settings
    }

    /// Creation time. `started_at` and `finished_at` are never earlier.
    pub fn created_at(&self) -> Millis {
        self.created_at
    }

    /// Set when questions are dealt.
    pub fn started_at(&self) -> Option<Millis> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<Millis> {
        self.finished_at
    }

    /// Set once, when the room finishes.
    pub fn winner(&self) -> Option<&BattleOutcome> {
        self.winner.as_ref()
    }

    /// The creator. Their departure cancels the room in any open status.
    pub fn created_by(&self) -> PlayerId {
        self.created_by
    }

    pub fn is_private(&self) -> bool {
        self.is_private
    }

    /// Present only on private rooms. Unique among open rooms when issued;
    /// a finished or cancelled room's code may be handed out again.
    pub fn invite_code(&self) -> Option<&str> {
        self.invite_code.as_deref()
    }

    // ---- Queries ----

    pub fn player(&self, player_id: PlayerId) -> Option<&BattlePlayer> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.player(player_id).is_some()
    }

    /// Member ids in join order.
    pub fn participants(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn is_full(&self) -> bool {
        self.current_players >= self.max_players
    }

    /// Returns `true` while the room can still change.
    pub fn is_open(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Public, waiting, and with a free slot.
    pub fn is_listed(&self) -> bool {
        self.status == RoomStatus::Waiting && !self.is_private && !self.is_full()
    }

    /// The readiness aggregate: enough members, all of them ready.
    pub fn all_ready(&self) -> bool {
        self.players.len() >= MIN_PLAYERS && self.players.iter().all(BattlePlayer::is_ready)
    }

    /// Members ranked by score (desc), then total answer time (asc), then
    /// join order.
    pub fn standings(&self) -> Vec<&BattlePlayer> {
        let mut ranked: Vec<_> = self.players.iter().collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then(a.total_time_ms().cmp(&b.total_time_ms()))
        });
        ranked
    }

    /// Checks everything a start needs except the questions, so the engine
    /// can refuse before calling the question source.
    ///
    /// A `Ready` room keeps its status when a member leaves, so the
    /// readiness aggregate is checked again here: a ready room left with a
    /// single player cannot start.
    ///
    /// # Errors
    /// [`BattleError::NotReady`] before the room is ready or while the
    /// aggregate does not hold, [`BattleError::RoomClosed`] once terminal.
    pub fn ensure_startable(&self) -> Result<(), BattleError> {
        match self.status {
            RoomStatus::Ready if self.all_ready() => Ok(()),
            status if status.is_terminal() => Err(self.closed()),
            status => Err(BattleError::NotReady {
                room_id: self.id,
                status,
            }),
        }
    }

    // ---- Transitions ----

    /// Applies `command` at time `now`.
    ///
    /// Returns the next room and the events produced, in order. On error
    /// `self` is unchanged and nothing should be persisted.
    pub fn apply(
        &self,
        command: RoomCommand,
        now: Millis,
    ) -> Result<(Self, Vec<RoomEvent>), BattleError> {
        let mut next = self.clone();
        let mut events = Vec::new();
        match command {
            RoomCommand::Join(profile) => next.join(profile, now, &mut events)?,
            RoomCommand::Leave(player_id) => next.leave(player_id, now, &mut events)?,
            RoomCommand::Ready(player_id) => next.mark_ready(player_id, now, &mut events)?,
            RoomCommand::Start(questions) => next.start(questions, now, &mut events)?,
            RoomCommand::Answer {
                player_id,
                question_index,
                selected_answer,
                time_spent_ms,
            } => next.answer(
                player_id,
                question_index,
                selected_answer,
                time_spent_ms,
                now,
                &mut events,
            )?,
        }
        if next.status != self.status {
            tracing::debug!(room_id = %self.id, from = %self.status, to = %next.status, "room status changed");
        }
        Ok((next, events))
    }

    fn join(
        &mut self,
        profile: PlayerProfile,
        now: Millis,
        events: &mut Vec<RoomEvent>,
    ) -> Result<(), BattleError> {
        if !self.status.is_joinable() {
            return Err(BattleError::RoomNotJoinable {
                room_id: self.id,
                status: self.status,
            });
        }
        if self.is_full() {
            return Err(BattleError::RoomFull(self.id));
        }
        if self.contains(profile.id) {
            return Err(BattleError::AlreadyJoined(profile.id, self.id));
        }

        let player_id = profile.id;
        let joined_at = self.clock(now);
        self.players.push(BattlePlayer::from_profile(profile, joined_at));
        self.sync_membership();
        events.push(RoomEvent::PlayerJoined {
            player_id,
            players: self.current_players,
        });
        Ok(())
    }

    fn leave(
        &mut self,
        player_id: PlayerId,
        now: Millis,
        events: &mut Vec<RoomEvent>,
    ) -> Result<(), BattleError> {
        if self.status.is_terminal() {
            return Err(self.closed());
        }
        let pos = self
            .players
            .iter()
            .position(|p| p.id == player_id)
            .ok_or(BattleError::PlayerNotInRoom(player_id, self.id))?;

        self.players.remove(pos);
        self.sync_membership();
        events.push(RoomEvent::PlayerLeft {
            player_id,
            players: self.current_players,
        });

        if self.players.is_empty() {
            self.cancel(CancelReason::Empty, events);
        } else if player_id == self.created_by {
            self.cancel(CancelReason::CreatorLeft, events);
        } else {
            match self.status {
                RoomStatus::Waiting => self.promote_if_ready(events),
                RoomStatus::InProgress if self.players.iter().all(BattlePlayer::is_finished) => {
                    self.complete(now, events);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn mark_ready(
        &mut self,
        player_id: PlayerId,
        now: Millis,
        events: &mut Vec<RoomEvent>,
    ) -> Result<(), BattleError> {
        match self.status {
            RoomStatus::Waiting | RoomStatus::Ready => {}
            RoomStatus::InProgress => return Err(BattleError::AlreadyStarted(self.id)),
            RoomStatus::Finished | RoomStatus::Cancelled => return Err(self.closed()),
        }
        let room_id = self.id;
        let stamp = self.clock(now);
        let player = self
            .player_mut(player_id)
            .ok_or(BattleError::PlayerNotInRoom(player_id, room_id))?;

        // Readying twice keeps the first timestamp.
        if !player.is_ready() {
            player.status = PlayerStatus::Ready;
            player.ready_at = Some(stamp);
            events.push(RoomEvent::PlayerReady { player_id });
        }
        self.promote_if_ready(events);
        Ok(())
    }

    fn start(
        &mut self,
        questions: Vec<Question>,
        now: Millis,
        events: &mut Vec<RoomEvent>,
    ) -> Result<(), BattleError> {
        self.ensure_startable()?;
        if questions.is_empty() {
            return Err(BattleError::NoQuestions(self.id));
        }

        let started_at = self.clock(now);
        self.questions = questions;
        self.status = RoomStatus::InProgress;
        self.started_at = Some(started_at);
        for player in &mut self.players {
            player.status = PlayerStatus::Playing;
        }
        events.push(RoomEvent::BattleStarted {
            questions: self.questions.len(),
        });
        Ok(())
    }

    fn answer(
        &mut self,
        player_id: PlayerId,
        question_index: usize,
        selected_answer: usize,
        time_spent_ms: u64,
        now: Millis,
        events: &mut Vec<RoomEvent>,
    ) -> Result<(), BattleError> {
        match self.status {
            RoomStatus::InProgress => {}
            status if status.is_terminal() => return Err(self.closed()),
            status => {
                return Err(BattleError::NotInProgress {
                    room_id: self.id,
                    status,
                });
            }
        }
        let room_id = self.id;
        let dealt = self.questions.len();
        let is_correct = self
            .questions
            .get(question_index)
            .ok_or(BattleError::QuestionNotFound {
                room_id,
                index: question_index,
            })?
            .is_correct(selected_answer);
        let points = score_answer(
            is_correct,
            self.settings.time_per_question_ms,
            time_spent_ms,
        );
        let stamp = self.clock(now);

        let player = self
            .player_mut(player_id)
            .ok_or(BattleError::PlayerNotInRoom(player_id, room_id))?;
        if player.has_answered(question_index) {
            return Err(BattleError::AlreadyAnswered {
                player_id,
                index: question_index,
            });
        }

        player.answers.push(AnswerRecord {
            question_index,
            selected_answer,
            is_correct,
            time_spent_ms,
            points,
        });
        player.score = player.score.saturating_add(points);
        events.push(RoomEvent::AnswerRecorded {
            player_id,
            question_index,
            is_correct,
            points,
            score: player.score,
        });

        if player.answers.len() >= dealt {
            player.status = PlayerStatus::Finished;
            player.finished_at = Some(stamp);
            events.push(RoomEvent::PlayerFinished {
                player_id,
                score: player.score,
            });
        }

        if self.players.iter().all(BattlePlayer::is_finished) {
            self.complete(now, events);
        }
        Ok(())
    }

    fn complete(&mut self, now: Millis, events: &mut Vec<RoomEvent>) {
        self.status = RoomStatus::Finished;
        self.finished_at = Some(self.clock(now));
        self.winner = decide_outcome(self.mode, &self.players, self.teams.as_ref());
        events.push(RoomEvent::BattleFinished {
            outcome: self.winner.clone(),
        });
    }

    fn cancel(&mut self, reason: CancelReason, events: &mut Vec<RoomEvent>) {
        self.status = RoomStatus::Cancelled;
        events.push(RoomEvent::RoomCancelled { reason });
    }

    fn promote_if_ready(&mut self, events: &mut Vec<RoomEvent>) {
        if self.status == RoomStatus::Waiting && self.all_ready() {
            self.status = RoomStatus::Ready;
            events.push(RoomEvent::RoomReady);
        }
    }

    /// Re-derives everything that depends on the member list.
    fn sync_membership(&mut self) {
        self.current_players = self.players.len();
        self.teams = compute_teams(&self.players, self.mode);
    }

    fn player_mut(&mut self, player_id: PlayerId) -> Option<&mut BattlePlayer> {
        self.players.iter_mut().find(|p| p.id == player_id)
    }

    /// `now`, clamped so room timestamps never run backwards.
    fn clock(&self, now: Millis) -> Millis {
        now.max(self.started_at.unwrap_or(self.created_at))
    }

    fn closed(&self) -> BattleError {
        BattleError::RoomClosed {
            room_id: self.id,
            status: self.status,
        }
    }
}
