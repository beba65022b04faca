//! Card capture: turns an external stream of detections into session calls.
//!
//! The core accepts already-recognised rank events only. A `CardFeed` is
//! whatever produces them (stdin lines, a vision pipeline, a test script),
//! and `pump` drives one feed into a `ShoeHandle`.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tracing::{debug, info, warn};

use super::session::ShoeHandle;
use crate::shoe::ranks::MAX_DECKS;
use crate::strategy::hand::HandSpec;
use crate::strategy::ShoeReport;
use crate::types::{Rank, ShoeError};

/// One item from a capture source.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    /// A single newly dealt card.
    Card(Rank),
    /// Every card visible in one scan; only the new ones are applied.
    Frame(Vec<Rank>),
    /// The dealer shuffled in a new shoe.
    NewShoe(u32),
    /// A strategy question about a hand.
    Query(HandSpec),
}

/// Source of capture events.
#[async_trait]
pub trait CardFeed: Send {
    /// Next event, `None` once the source is exhausted. A malformed item
    /// yields `Some(Err(..))` and the feed stays usable.
    async fn next_event(&mut self) -> Option<Result<FeedEvent, ShoeError>>;

    /// Feed name for logging.
    fn name(&self) -> &str;
}

// ---------------------------------------------------------------------------
// Line feed
// ---------------------------------------------------------------------------

/// Text protocol, one event per line:
///
/// ```text
/// K                 a dealt card
/// frame 5,5,K       all cards visible in one scan
/// new 6             fresh 6-deck shoe
/// ? 10,6 vs 10      strategy query
/// ```
///
/// Blank lines and lines starting with `#` are skipped.
pub struct LineFeed<R> {
    name: String,
    lines: Lines<R>,
}

impl<R: AsyncBufRead + Unpin + Send> LineFeed<R> {
    pub fn new(name: impl Into<String>, reader: R) -> Self {
        Self {
            name: name.into(),
            lines: reader.lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> CardFeed for LineFeed<R> {
    async fn next_event(&mut self) -> Option<Result<FeedEvent, ShoeError>> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    warn!(feed = %self.name, error = %e, "Feed read failed, closing");
                    return None;
                }
            };
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            return Some(parse_line(line));
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Parse one non-empty protocol line.
pub fn parse_line(line: &str) -> Result<FeedEvent, ShoeError> {
    let line = line.trim();
    if let Some(query) = line.strip_prefix('?') {
        return HandSpec::parse_query(query).map(FeedEvent::Query);
    }

    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };

    match head.to_ascii_lowercase().as_str() {
        "new" => {
            let decks = rest.parse::<u32>().map_err(|_| {
                ShoeError::Parse(format!(
                    "expected 'new <decks>' with decks in 1..={MAX_DECKS}, got {line:?}"
                ))
            })?;
            Ok(FeedEvent::NewShoe(decks))
        }
        "frame" => {
            let cards = rest
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|t| !t.is_empty())
                .map(str::parse)
                .collect::<Result<Vec<Rank>, _>>()?;
            Ok(FeedEvent::Frame(cards))
        }
        _ if rest.is_empty() => head.parse().map(FeedEvent::Card),
        _ => Err(ShoeError::Parse(format!("unrecognised line {line:?}"))),
    }
}

// ---------------------------------------------------------------------------
// Frame de-duplication
// ---------------------------------------------------------------------------

/// Turns successive whole-table scans into new-card events.
///
/// Emits, per rank, how many more copies are visible now than in the
/// previous scan. Two fives appearing together are two events.
#[derive(Debug, Default, Clone)]
pub struct FrameDiffer {
    previous: [u32; 13],
}

impl FrameDiffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// New cards in `frame` relative to the last scan, in rank order.
    pub fn diff(&mut self, frame: &[Rank]) -> Vec<Rank> {
        let mut current = [0u32; 13];
        for rank in frame {
            current[rank.index()] += 1;
        }

        let mut fresh = Vec::new();
        for rank in Rank::ALL {
            let i = rank.index();
            let added = current[i].saturating_sub(self.previous[i]);
            fresh.extend(std::iter::repeat(rank).take(added as usize));
        }
        self.previous = current;
        fresh
    }

    /// Forget the last scan (table cleared or new shoe).
    pub fn reset(&mut self) {
        self.previous = [0; 13];
    }
}

// ---------------------------------------------------------------------------
// Pump
// ---------------------------------------------------------------------------

/// Counters for one `pump` run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpStats {
    pub cards_applied: u64,
    pub cards_rejected: u64,
    pub parse_errors: u64,
    pub shoes_started: u64,
    pub queries_answered: u64,
}

/// Drive `feed` into the session until it ends, writing one human-readable
/// line per event to `out`.
///
/// Rejected cards and malformed lines are reported and skipped; they never
/// stop the pump. A closed session does.
pub async fn pump<F, W>(
    feed: &mut F,
    handle: &ShoeHandle,
    out: &mut W,
) -> std::io::Result<PumpStats>
where
    F: CardFeed + ?Sized,
    W: AsyncWrite + Unpin + Send,
{
    let mut stats = PumpStats::default();
    let mut differ = FrameDiffer::new();
    info!(feed = feed.name(), "Capture started");

    'events: while let Some(event) = feed.next_event().await {
        let event = match event {
            Ok(event) => event,
            Err(e) => {
                stats.parse_errors += 1;
                warn!(feed = feed.name(), error = %e, "Skipping malformed input");
                write_line(out, &format!("! {e}")).await?;
                continue;
            }
        };

        let cards = match event {
            FeedEvent::Card(rank) => vec![rank],
            FeedEvent::Frame(frame) => differ.diff(&frame),
            FeedEvent::NewShoe(decks) => {
                match handle.new_shoe(decks).await {
                    Ok(report) => {
                        stats.shoes_started += 1;
                        differ.reset();
                        write_line(out, &format!("new shoe: {decks} decks")).await?;
                        write_line(out, &status_line(&report)).await?;
                    }
                    Err(ShoeError::SessionClosed) => {
                        warn!("Session closed, stopping capture");
                        break 'events;
                    }
                    Err(e) => write_line(out, &format!("! {e}")).await?,
                }
                continue;
            }
            FeedEvent::Query(hand) => {
                let decision = handle.advise(&hand);
                stats.queries_answered += 1;
                write_line(out, &format!("{hand}: {decision}")).await?;
                continue;
            }
        };

        for rank in cards {
            match handle.observe(rank).await {
                Ok(report) => {
                    stats.cards_applied += 1;
                    write_line(out, &format!("{rank:>2} | {}", status_line(&report))).await?;
                }
                Err(ShoeError::SessionClosed) => {
                    warn!("Session closed, stopping capture");
                    break 'events;
                }
                Err(e) => {
                    stats.cards_rejected += 1;
                    write_line(out, &format!("! {e}")).await?;
                }
            }
        }
    }

    out.flush().await?;
    info!(
        feed = feed.name(),
        applied = stats.cards_applied,
        rejected = stats.cards_rejected,
        parse_errors = stats.parse_errors,
        "Capture finished"
    );
    Ok(stats)
}

/// Run `pump` until the feed ends or `shutdown` resolves.
///
/// With `linger` set, an exhausted feed does not end the run: it keeps
/// waiting for `shutdown` so other readers of the session (the dashboard)
/// stay up. Returns `None` when interrupted before the feed ended.
pub async fn serve_feed<F, W, S>(
    feed: &mut F,
    handle: &ShoeHandle,
    out: &mut W,
    linger: bool,
    shutdown: S,
) -> std::io::Result<Option<PumpStats>>
where
    F: CardFeed + ?Sized,
    W: AsyncWrite + Unpin + Send,
    S: std::future::Future<Output = ()>,
{
    tokio::pin!(shutdown);

    tokio::select! {
        result = pump(feed, handle, out) => {
            let stats = result?;
            info!(
                applied = stats.cards_applied,
                rejected = stats.cards_rejected,
                parse_errors = stats.parse_errors,
                queries = stats.queries_answered,
                "Input closed"
            );
            if linger {
                info!("Still serving. Press Ctrl+C to stop.");
                shutdown.as_mut().await;
                info!("Shutdown signal received.");
            }
            Ok(Some(stats))
        }
        _ = &mut shutdown => {
            info!("Shutdown signal received.");
            Ok(None)
        }
    }
}

/// One-line summary of a report.
pub fn status_line(report: &ShoeReport) -> String {
    let bet = match report.bet {
        Some(bet) => bet.to_string(),
        None => "no bet".to_string(),
    };
    format!(
        "adv {:+.2}% | bust {:.1}% | {} | RC {:+} TC {:+.1} {} | {}/{} left",
        report.advantage,
        report.bust_probability * 100.0,
        bet,
        report.count.running_count,
        report.count.true_count,
        report.count.signal,
        report.snapshot.cards_remaining(),
        report.snapshot.total_initial(),
    )
}

async fn write_line<W: AsyncWrite + Unpin>(out: &mut W, line: &str) -> std::io::Result<()> {
    debug!(line, "Capture output");
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::session::spawn_session;
    use crate::shoe::CompositionTracker;
    use crate::strategy::advisor::StrategyAdvisor;
    use crate::strategy::bust::{BustConfig, BustProbabilityEstimator};
    use crate::strategy::edge::{AdvantageCalculator, AdvantageConfig};
    use crate::strategy::kelly::{KellyBetSizer, KellyConfig};
    use crate::strategy::ShoeAnalyzer;
    use rust_decimal_macros::dec;

    fn start_with_task(decks: u32) -> (ShoeHandle, tokio::task::JoinHandle<()>) {
        let analyzer = ShoeAnalyzer::new(
            AdvantageCalculator::new(AdvantageConfig::default()),
            BustProbabilityEstimator::new(BustConfig::default()),
            KellyBetSizer::new(KellyConfig::default()),
            StrategyAdvisor::default(),
            dec!(1000),
        );
        spawn_session(CompositionTracker::new(decks).unwrap(), analyzer)
    }

    fn start(decks: u32) -> ShoeHandle {
        start_with_task(decks).0
    }

    #[test]
    fn test_parse_line_variants() {
        assert_eq!(parse_line("K").unwrap(), FeedEvent::Card(Rank::King));
        assert_eq!(parse_line(" 10 ").unwrap(), FeedEvent::Card(Rank::Ten));
        assert_eq!(parse_line("new 6").unwrap(), FeedEvent::NewShoe(6));
        assert_eq!(parse_line("NEW 2").unwrap(), FeedEvent::NewShoe(2));
        assert_eq!(
            parse_line("frame 5, 5 K").unwrap(),
            FeedEvent::Frame(vec![Rank::Five, Rank::Five, Rank::King])
        );
        match parse_line("? 10,6 vs 10").unwrap() {
            FeedEvent::Query(hand) => assert_eq!(hand.to_string(), "10,6 vs 10"),
            other => panic!("expected query, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_line_errors() {
        assert!(matches!(parse_line("X"), Err(ShoeError::Parse(_))));
        assert!(matches!(parse_line("new six"), Err(ShoeError::Parse(_))));
        assert!(matches!(parse_line("frame 5,Z"), Err(ShoeError::Parse(_))));
        assert!(matches!(parse_line("K Q"), Err(ShoeError::Parse(_))));
        assert!(matches!(parse_line("? 10"), Err(ShoeError::Parse(_))));
    }

    #[test]
    fn test_frame_differ_multiset() {
        let mut d = FrameDiffer::new();
        assert_eq!(d.diff(&[Rank::Five, Rank::Five]), vec![Rank::Five, Rank::Five]);
        assert_eq!(d.diff(&[Rank::Five, Rank::Five, Rank::King]), vec![Rank::King]);
        assert!(d.diff(&[Rank::Five, Rank::Five, Rank::King]).is_empty());
        // a card leaving the table is not an event
        assert!(d.diff(&[Rank::King]).is_empty());
        assert_eq!(d.diff(&[Rank::King, Rank::Five]), vec![Rank::Five]);
        d.reset();
        assert_eq!(d.diff(&[Rank::King]), vec![Rank::King]);
    }

    #[tokio::test]
    async fn test_line_feed_skips_blanks_and_comments() {
        let input: &[u8] = b"# dealt\n\nK\n  \n5\n";
        let mut feed = LineFeed::new("test", input);
        assert_eq!(feed.next_event().await.unwrap().unwrap(), FeedEvent::Card(Rank::King));
        assert_eq!(feed.next_event().await.unwrap().unwrap(), FeedEvent::Card(Rank::Five));
        assert!(feed.next_event().await.is_none());
    }

    #[tokio::test]
    async fn test_pump_applies_and_survives_errors() {
        let handle = start(1);
        let input: &[u8] = b"A\nA\nbogus\nA\nA\nA\n? 10,6 vs 10\n";
        let mut feed = LineFeed::new("test", input);
        let mut out = Vec::new();

        let stats = pump(&mut feed, &handle, &mut out).await.unwrap();
        assert_eq!(stats.cards_applied, 4);
        assert_eq!(stats.cards_rejected, 1);
        assert_eq!(stats.parse_errors, 1);
        assert_eq!(stats.queries_answered, 1);
        assert_eq!(handle.current().snapshot.remaining(Rank::Ace), 0);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("No A cards remain"));
        assert!(text.contains("10,6 vs 10: "));
    }

    #[tokio::test]
    async fn test_pump_frames_and_new_shoe() {
        let handle = start(1);
        let input: &[u8] = b"frame 5,5\nframe 5,5,K\nnew 2\nframe 5\n";
        let mut feed = LineFeed::new("test", input);
        let mut out = Vec::new();

        let stats = pump(&mut feed, &handle, &mut out).await.unwrap();
        assert_eq!(stats.cards_applied, 4);
        assert_eq!(stats.shoes_started, 1);
        let snap = handle.current().snapshot.clone();
        assert_eq!(snap.deck_count, 2);
        assert_eq!(snap.cards_dealt, 1);
        assert_eq!(snap.remaining(Rank::Five), 7);
    }

    #[tokio::test]
    async fn test_pump_flushes_when_session_closes() {
        let (handle, task) = start_with_task(1);
        task.abort();
        let _ = task.await;

        let input: &[u8] = b"? 10,6 vs 10\nK\nQ\n";
        let mut feed = LineFeed::new("test", input);
        let mut out = tokio::io::BufWriter::new(Vec::new());

        let stats = pump(&mut feed, &handle, &mut out).await.unwrap();
        assert_eq!(stats.queries_answered, 1);
        assert_eq!(stats.cards_applied, 0);
        assert_eq!(stats.cards_rejected, 0);

        // the query line was buffered before the session closed
        let text = String::from_utf8(out.into_inner()).unwrap();
        assert!(text.contains("10,6 vs 10: "));
        // Q was never read
        assert!(feed.next_event().await.is_some());
    }

    #[tokio::test]
    async fn test_serve_feed_lingers_until_shutdown() {
        let handle = start(1);
        let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
        let worker = handle.clone();
        let task = tokio::spawn(async move {
            let mut feed = LineFeed::new("test", &b"K\n5\n"[..]);
            let mut out = Vec::new();
            let stop = async move {
                let _ = stop_rx.await;
            };
            serve_feed(&mut feed, &worker, &mut out, true, stop).await
        });

        let mut reports = handle.subscribe();
        tokio::time::timeout(std::time::Duration::from_secs(1), async {
            while reports.borrow().snapshot.cards_dealt < 2 {
                reports.changed().await.unwrap();
            }
        })
        .await
        .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!task.is_finished());

        stop_tx.send(()).unwrap();
        let stats = task.await.unwrap().unwrap().unwrap();
        assert_eq!(stats.cards_applied, 2);
    }

    #[tokio::test]
    async fn test_serve_feed_without_linger_ends_with_input() {
        let handle = start(1);
        let mut feed = LineFeed::new("test", &b"K\n"[..]);
        let mut out = Vec::new();
        let stats = serve_feed(&mut feed, &handle, &mut out, false, std::future::pending())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stats.cards_applied, 1);
    }

    #[tokio::test]
    async fn test_serve_feed_interrupted() {
        let handle = start(1);
        let (_keep_open, reader) = tokio::io::duplex(64);
        let mut feed = LineFeed::new("test", tokio::io::BufReader::new(reader));
        let mut out = Vec::new();
        let result = serve_feed(&mut feed, &handle, &mut out, true, async {}).await.unwrap();
        assert!(result.is_none());
    }
}
