//! The wagered game engine: join protocol, turn timers, settlement and
//! event fan-out around a [`GameState`].
//!
//! Every mutating entry point takes the same per-game lock, so timers,
//! joins and drops observe each other's effects in lock order. Timer tasks
//! keep the game alive until they resolve, so escrow is settled even after
//! every handle is dropped, and they check a generation number, so a firing
//! that lost the race to a move is a no-op.

mod coin;
mod events;
mod options;
mod rules;

pub use coin::{CoinFlip, FixedCoin, RandomCoin};
pub use events::{GameEvent, GameSnapshot};
pub use options::{GameOptions, DEFAULT_TURN_TIMER_SECS, MAX_TURN_TIMER_SECS, MIN_TURN_TIMER_SECS};
pub use rules::GameRules;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use crate::error::{CreateError, JoinError};
use crate::game::{
    DropError, DropResult, GameOutcome, GameState, Participant, ParticipantId,
};
use crate::ledger::{Ledger, BET_REASON, REFUND_REASON, WIN_REASON};
use events::Subscribers;

static NEXT_GAME_ID: AtomicU64 = AtomicU64::new(1);

/// Cloneable handle to one running game.
#[derive(Clone)]
pub struct GameEngine {
    shared: Arc<Shared>,
}

struct Shared {
    id: u64,
    options: GameOptions,
    rules: GameRules,
    ledger: Arc<dyn Ledger>,
    inner: Mutex<Inner>,
}

struct Inner {
    state: GameState,
    coin: Box<dyn CoinFlip>,
    subscribers: Subscribers,
    join_timer: Option<JoinHandle<()>>,
    turn_timer: Option<JoinHandle<()>>,
    /// Bumped on every arm and disarm; a firing with an older value is stale.
    turn_generation: u64,
    disposed: bool,
}

impl GameEngine {
    /// Open a game with a fair random coin. See [`GameEngine::create_with_coin`].
    pub async fn create(
        creator: Participant,
        options: GameOptions,
        rules: GameRules,
        ledger: Arc<dyn Ledger>,
    ) -> Result<Self, CreateError> {
        Self::create_with_coin(creator, options, rules, ledger, Box::new(RandomCoin::new())).await
    }

    /// Open a game, escrowing the creator's stake, and start the join window.
    ///
    /// Must be called inside a tokio runtime.
    pub async fn create_with_coin(
        creator: Participant,
        options: GameOptions,
        rules: GameRules,
        ledger: Arc<dyn Ledger>,
        coin: Box<dyn CoinFlip>,
    ) -> Result<Self, CreateError> {
        rules.validate()?;
        if options.bet() > 0 {
            ledger.debit(creator.id, BET_REASON, options.bet()).await?;
        }

        let id = NEXT_GAME_ID.fetch_add(1, Ordering::Relaxed);
        info!(
            game_id = id,
            creator = %creator.id,
            bet = options.bet(),
            turn_timer_secs = options.turn_timer_secs(),
            "Game created"
        );

        let engine = GameEngine {
            shared: Arc::new(Shared {
                id,
                options,
                rules,
                ledger,
                inner: Mutex::new(Inner {
                    state: GameState::initial(creator, rules.rows, rules.columns),
                    coin,
                    subscribers: Subscribers::default(),
                    join_timer: None,
                    turn_timer: None,
                    turn_generation: 0,
                    disposed: false,
                }),
            }),
        };

        {
            let mut inner = engine.shared.inner.lock().await;
            engine.arm_join_timer(&mut inner);
        }
        Ok(engine)
    }

    pub fn id(&self) -> u64 {
        self.shared.id
    }

    pub fn options(&self) -> GameOptions {
        self.shared.options
    }

    pub fn rules(&self) -> GameRules {
        self.shared.rules
    }

    /// Listen for events. A receiver obtained after disposal is already closed.
    pub async fn subscribe(&self) -> mpsc::UnboundedReceiver<GameEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut inner = self.shared.inner.lock().await;
        if !inner.disposed {
            inner.subscribers.add(tx);
        }
        rx
    }

    pub async fn snapshot(&self) -> GameSnapshot {
        let inner = self.shared.inner.lock().await;
        self.capture(&inner)
    }

    /// Take the free seat, escrowing `bet`, which must equal the game's bet.
    #[instrument(skip(self, participant), fields(game_id = self.shared.id, participant = %participant.id))]
    pub async fn join(&self, participant: Participant, bet: u64) -> Result<(), JoinError> {
        let mut inner = self.shared.inner.lock().await;
        if inner.disposed {
            return Err(JoinError::Disposed);
        }
        inner.state.check_join(participant.id)?;

        let required = self.shared.options.bet();
        if bet != required {
            return Err(JoinError::BetMismatch {
                offered: bet,
                required,
            });
        }
        if bet > 0 {
            self.shared
                .ledger
                .debit(participant.id, BET_REASON, bet)
                .await?;
        }

        let joiner = participant.id;
        let joiner_first = inner.coin.joiner_goes_first();
        if let Err(e) = inner.state.seat(participant, joiner_first) {
            self.credit(joiner, REFUND_REASON, bet).await;
            return Err(e);
        }

        if let Some(handle) = inner.join_timer.take() {
            handle.abort();
        }
        self.arm_turn_timer(&mut inner);

        info!(joiner_first, "Game started");
        let snapshot = self.capture(&inner);
        inner.subscribers.publish(GameEvent::StateUpdated(snapshot));
        Ok(())
    }

    /// Drop the caller's piece into a one-indexed column.
    #[instrument(skip(self), fields(game_id = self.shared.id))]
    pub async fn drop_piece(
        &self,
        participant: ParticipantId,
        column: usize,
    ) -> Result<DropResult, DropError> {
        let mut inner = self.shared.inner.lock().await;
        if inner.disposed {
            return Err(DropError::GameOver);
        }
        let result = inner.state.apply_drop(participant, column)?;
        debug!(mover = ?result.mover, row = result.row, "Piece dropped");

        let Some(outcome) = result.outcome else {
            self.arm_turn_timer(&mut inner);
            let snapshot = self.capture(&inner);
            inner.subscribers.publish(GameEvent::StateUpdated(snapshot));
            return Ok(result);
        };

        Self::disarm_turn_timer(&mut inner);
        info!(?outcome, "Game ended");
        for (to, reason, amount) in self.settlement(&inner.state) {
            self.credit(to, reason, amount).await;
        }

        let snapshot = self.capture(&inner);
        inner
            .subscribers
            .publish(GameEvent::StateUpdated(snapshot.clone()));
        inner
            .subscribers
            .publish(GameEvent::Ended { snapshot, outcome });
        Ok(result)
    }

    /// Detach every listener and stop both timers. Idempotent.
    pub async fn dispose(&self) {
        let mut inner = self.shared.inner.lock().await;
        if inner.disposed {
            return;
        }
        inner.disposed = true;
        if let Some(handle) = inner.join_timer.take() {
            handle.abort();
        }
        Self::disarm_turn_timer(&mut inner);
        inner.subscribers.clear();

        if inner.state.abandon() {
            debug!(game_id = self.shared.id, "Disposed before anyone joined, refunding creator");
            let creator = inner.state.creator().id;
            self.credit(creator, REFUND_REASON, self.shared.options.bet())
                .await;
        } else if inner.state.is_terminal() {
            debug!(game_id = self.shared.id, "Game disposed");
        } else {
            warn!(
                game_id = self.shared.id,
                phase = ?inner.state.phase(),
                "Disposed an unfinished game; escrowed stakes were not settled"
            );
        }
    }

    fn capture(&self, inner: &Inner) -> GameSnapshot {
        GameSnapshot::capture(self.shared.id, &inner.state, &self.shared.options)
    }

    /// Credits owed for a finished game.
    fn settlement(&self, state: &GameState) -> Vec<(ParticipantId, &'static str, u64)> {
        let bet = self.shared.options.bet();
        match state.outcome() {
            Some(GameOutcome::Draw) => state
                .players()
                .map(|players| {
                    players
                        .iter()
                        .map(|p| (p.id, REFUND_REASON, bet))
                        .collect()
                })
                .unwrap_or_default(),
            Some(GameOutcome::CurrentPlayerWon | GameOutcome::OtherPlayerWon) => state
                .winner_player()
                .map(|winner| vec![(winner.id, WIN_REASON, self.shared.rules.payout(bet))])
                .unwrap_or_default(),
            None => Vec::new(),
        }
    }

    /// Best-effort credit; failures are logged and never undo the transition.
    async fn credit(&self, to: ParticipantId, reason: &str, amount: u64) {
        if amount == 0 {
            return;
        }
        match self.shared.ledger.credit(to, reason, amount).await {
            Ok(()) => debug!(game_id = self.shared.id, participant = %to, amount, reason, "Credited"),
            Err(e) => error!(
                game_id = self.shared.id,
                participant = %to,
                amount,
                reason,
                error = %e,
                "Settlement credit failed"
            ),
        }
    }

    fn arm_join_timer(&self, inner: &mut Inner) {
        let engine = self.clone();
        let wait = self.shared.rules.join_timeout;
        inner.join_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(wait).await;
            engine.on_join_timeout().await;
        }));
    }

    fn arm_turn_timer(&self, inner: &mut Inner) {
        Self::disarm_turn_timer(inner);
        let generation = inner.turn_generation;
        let engine = self.clone();
        let period = self.shared.options.turn_timer();
        inner.turn_timer = Some(tokio::spawn(async move {
            tokio::time::sleep(period).await;
            engine.on_turn_timeout(generation).await;
        }));
    }

    fn disarm_turn_timer(inner: &mut Inner) {
        inner.turn_generation += 1;
        if let Some(handle) = inner.turn_timer.take() {
            handle.abort();
        }
    }

    async fn on_join_timeout(&self) {
        let mut inner = self.shared.inner.lock().await;
        // Runs on the timer task itself; detach rather than abort.
        inner.join_timer.take();
        if inner.disposed || !inner.state.abandon() {
            return;
        }

        info!(game_id = self.shared.id, "Nobody joined in time, game cancelled");
        let creator = inner.state.creator().id;
        self.credit(creator, REFUND_REASON, self.shared.options.bet())
            .await;

        let snapshot = self.capture(&inner);
        inner.subscribers.publish(GameEvent::FailedToStart(snapshot));
    }

    async fn on_turn_timeout(&self, generation: u64) {
        let mut inner = self.shared.inner.lock().await;
        if inner.disposed || inner.turn_generation != generation {
            return;
        }
        // Runs on the timer task itself; detach rather than abort.
        inner.turn_timer.take();
        inner.turn_generation += 1;
        let Some(winner) = inner.state.forfeit_turn() else {
            return;
        };

        info!(game_id = self.shared.id, winner = ?winner, "Turn timed out, game forfeited");
        for (to, reason, amount) in self.settlement(&inner.state) {
            self.credit(to, reason, amount).await;
        }

        let snapshot = self.capture(&inner);
        inner.subscribers.publish(GameEvent::Ended {
            snapshot,
            outcome: GameOutcome::OtherPlayerWon,
        });
    }
}
