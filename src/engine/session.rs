//! Shoe session: the single writer for the active shoe.
//!
//! One task owns the `CompositionTracker`. Mutations arrive as commands over
//! an mpsc channel and are applied strictly in arrival order; after each
//! successful mutation the task recomputes a `ShoeReport` and publishes it on
//! a watch channel. Readers never see a half-applied card.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::shoe::CompositionTracker;
use crate::strategy::hand::HandSpec;
use crate::strategy::{ShoeAnalyzer, ShoeReport};
use crate::types::{Decision, Rank, ShoeError};

/// Pending commands before `observe` callers start waiting.
const COMMAND_BUFFER: usize = 256;

type Reply = oneshot::Sender<Result<Arc<ShoeReport>, ShoeError>>;

#[derive(Debug)]
enum ShoeCommand {
    Observe { rank: Rank, reply: Reply },
    NewShoe { deck_count: u32, reply: Reply },
}

/// Cloneable front end to a running session.
#[derive(Clone)]
pub struct ShoeHandle {
    commands: mpsc::Sender<ShoeCommand>,
    reports: watch::Receiver<Arc<ShoeReport>>,
    analyzer: Arc<ShoeAnalyzer>,
}

/// Start the writer task. The task stops once every handle is dropped.
pub fn spawn_session(
    tracker: CompositionTracker,
    analyzer: ShoeAnalyzer,
) -> (ShoeHandle, JoinHandle<()>) {
    let analyzer = Arc::new(analyzer);
    let initial = Arc::new(analyzer.evaluate(tracker.snapshot()));
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (report_tx, report_rx) = watch::channel(initial);

    info!(
        deck_count = tracker.deck_count(),
        bankroll_units = %analyzer.bankroll_units(),
        "Shoe session started"
    );

    let task = tokio::spawn(run(tracker, Arc::clone(&analyzer), cmd_rx, report_tx));
    let handle = ShoeHandle {
        commands: cmd_tx,
        reports: report_rx,
        analyzer,
    };
    (handle, task)
}

async fn run(
    mut tracker: CompositionTracker,
    analyzer: Arc<ShoeAnalyzer>,
    mut commands: mpsc::Receiver<ShoeCommand>,
    reports: watch::Sender<Arc<ShoeReport>>,
) {
    while let Some(command) = commands.recv().await {
        let (outcome, reply) = match command {
            ShoeCommand::Observe { rank, reply } => (tracker.apply(rank), reply),
            ShoeCommand::NewShoe { deck_count, reply } => (tracker.new_shoe(deck_count), reply),
        };

        let result = outcome.map(|()| {
            let report = Arc::new(analyzer.evaluate(tracker.snapshot()));
            reports.send_replace(Arc::clone(&report));
            report
        });

        if reply.send(result).is_err() {
            debug!("Command caller went away before the reply");
        }
    }
    info!(cards_dealt = tracker.cards_dealt(), "Shoe session stopped");
}

impl ShoeHandle {
    /// Apply one observed card and return the report computed right after it.
    pub async fn observe(&self, rank: Rank) -> Result<Arc<ShoeReport>, ShoeError> {
        self.request(|reply| ShoeCommand::Observe { rank, reply }).await
    }

    /// Replace the active shoe with a full one of `deck_count` decks.
    pub async fn new_shoe(&self, deck_count: u32) -> Result<Arc<ShoeReport>, ShoeError> {
        self.request(|reply| ShoeCommand::NewShoe { deck_count, reply })
            .await
    }

    /// Latest published report.
    pub fn current(&self) -> Arc<ShoeReport> {
        Arc::clone(&self.reports.borrow())
    }

    /// Receiver that wakes on every published report.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ShoeReport>> {
        self.reports.clone()
    }

    /// Strategy advice against the latest report.
    pub fn advise(&self, hand: &HandSpec) -> Decision {
        self.analyzer.advise(hand, &self.current())
    }

    pub fn analyzer(&self) -> &ShoeAnalyzer {
        &self.analyzer
    }

    async fn request(
        &self,
        make: impl FnOnce(Reply) -> ShoeCommand,
    ) -> Result<Arc<ShoeReport>, ShoeError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(make(tx))
            .await
            .map_err(|_| ShoeError::SessionClosed)?;
        rx.await.map_err(|_| ShoeError::SessionClosed)?
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
