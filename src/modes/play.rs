use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{Stderr, stderr};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tokio::time::interval;

use crate::game::{FinalSummary, FrameDecision, FrameTicket, GameEngine, TickScheduler};
use crate::input::{InputHandler, KeyAction};
use crate::leaderboard::{LeaderboardClient, NewLeaderboardEntry};
use crate::metrics::GameMetrics;
use crate::render::{Renderer, board_area};

/// Frame clock. Simulation steps are gated by the scheduler, not by this.
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// How long quitting waits for in-flight leaderboard submissions
const SUBMIT_DRAIN_TIMEOUT: Duration = Duration::from_secs(6);

/// Where finished runs are reported
pub struct LeaderboardSubmitter {
    client: LeaderboardClient,
    player: String,
    pending: JoinSet<()>,
}

impl LeaderboardSubmitter {
    pub fn new(client: LeaderboardClient, player: impl Into<String>) -> Self {
        Self {
            client,
            player: player.into(),
            pending: JoinSet::new(),
        }
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Wait up to `limit` for submissions still in flight. Returns how many were abandoned.
    pub async fn drain(&mut self, limit: Duration) -> usize {
        if self.pending.is_empty() {
            return 0;
        }
        tracing::info!(waiting = self.pending.len(), "waiting for leaderboard submissions");

        let pending = &mut self.pending;
        let joined = tokio::time::timeout(limit, async {
            while let Some(result) = pending.join_next().await {
                if let Err(e) = result {
                    tracing::warn!(error = %e, "leaderboard submission task failed");
                }
            }
        })
        .await;

        if joined.is_ok() {
            return 0;
        }
        let abandoned = self.pending.len();
        tracing::warn!(abandoned, "abandoning leaderboard submissions");
        self.pending.abort_all();
        abandoned
    }

    fn submit(&mut self, summary: &FinalSummary) {
        let entry = NewLeaderboardEntry::from_summary(self.player.clone(), summary);
        let client = self.client.clone();

        self.pending.spawn(async move {
            match client.submit(&entry).await {
                Ok(stored) => tracing::info!(
                    id = %stored.id,
                    player = %stored.player_name,
                    score = stored.score,
                    "leaderboard submission accepted"
                ),
                Err(e) => tracing::warn!(error = %e, "leaderboard submission failed"),
            }
        });
    }
}

pub struct PlayMode {
    engine: GameEngine,
    scheduler: TickScheduler,
    ticket: Option<FrameTicket>,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    leaderboard: Option<LeaderboardSubmitter>,
    board: Option<Rect>,
    should_quit: bool,
}

impl PlayMode {
    pub fn new(engine: GameEngine, leaderboard: Option<LeaderboardSubmitter>) -> Self {
        let scheduler = TickScheduler::new(engine.config().clone());

        Self {
            engine,
            scheduler,
            ticket: None,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            leaderboard,
            board: None,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen, EnableMouseCapture)
            .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;
        self.flush_leaderboard(SUBMIT_DRAIN_TIMEOUT).await;

        result
    }

    /// Give game-over submissions a bounded chance to land before the runtime goes away
    async fn flush_leaderboard(&mut self, limit: Duration) -> usize {
        match &mut self.leaderboard {
            Some(leaderboard) => leaderboard.drain(limit).await,
            None => 0,
        }
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut frame_timer = interval(FRAME_INTERVAL);

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => self.handle_event(event, Instant::now()),
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => self.should_quit = true,
                    }
                }

                _ = frame_timer.tick() => {
                    let now = Instant::now();
                    self.on_frame(now);
                    self.draw(terminal, now)?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn draw(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        now: Instant,
    ) -> Result<()> {
        let grid = self.engine.grid();
        let mut board = None;
        terminal
            .draw(|frame| {
                board = board_area(frame.area(), grid);
                self.renderer.render(frame, &self.engine, &self.metrics, now);
            })
            .context("Failed to draw frame")?;
        self.board = board;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, now: Instant) {
        let action = match event {
            // Only process key press events, not release
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                self.input_handler.handle_key_event(key)
            }
            Event::Mouse(mouse) => match self.board {
                Some(board) => self.input_handler.handle_mouse_event(mouse, board),
                None => KeyAction::None,
            },
            _ => KeyAction::None,
        };

        match action {
            KeyAction::Steer(direction) => {
                self.engine.set_pending_direction(direction);
            }
            KeyAction::Start => {
                if !self.engine.state().is_playing() {
                    self.start_run(now);
                }
            }
            KeyAction::Quit => self.should_quit = true,
            KeyAction::None => {}
        }
    }

    fn start_run(&mut self, now: Instant) {
        self.engine.start();
        self.ticket = Some(self.scheduler.arm());
        self.metrics.on_game_start(now);
    }

    /// Runs on every frame. Steps the engine when the scheduler says one is due.
    fn on_frame(&mut self, now: Instant) {
        if let Some(ticket) = self.ticket {
            match self.scheduler.poll(ticket, now, self.engine.state().score) {
                FrameDecision::Tick => {
                    let result = self.engine.tick(now);
                    if result.terminated {
                        self.finish_run(now);
                    }
                }
                FrameDecision::Wait => {}
                FrameDecision::Stale => self.ticket = None,
            }
        }
        self.metrics.update(now);
    }

    fn finish_run(&mut self, now: Instant) {
        self.scheduler.stop();
        self.ticket = None;

        let Some(summary) = self.engine.summary() else {
            return;
        };
        self.metrics.on_game_over(summary, now);
        if let Some(leaderboard) = &mut self.leaderboard {
            leaderboard.submit(summary);
        }
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, Phase};
    use crate::storage::MemoryHighScoreStore;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn mode() -> PlayMode {
        let engine = GameEngine::with_seed(
            GameConfig::default(),
            Box::new(MemoryHighScoreStore::default()),
            7,
        );
        PlayMode::new(engine, None)
    }

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_idle_until_started() {
        let mut mode = mode();
        let t0 = Instant::now();

        mode.on_frame(t0);
        mode.on_frame(t0 + Duration::from_secs(1));
        assert_eq!(mode.engine.state().phase, Phase::Idle);
        assert_eq!(mode.engine.state().ticks, 0);

        mode.handle_event(press(KeyCode::Enter), t0);
        assert_eq!(mode.engine.state().phase, Phase::Playing);
        assert!(mode.ticket.is_some());
    }

    #[test]
    fn test_frames_step_at_scheduler_interval() {
        let mut mode = mode();
        let t0 = Instant::now();
        mode.handle_event(press(KeyCode::Enter), t0);

        // first frame steps immediately, then every 250ms at level 1
        mode.on_frame(t0);
        mode.on_frame(t0 + Duration::from_millis(16));
        mode.on_frame(t0 + Duration::from_millis(249));
        assert_eq!(mode.engine.state().ticks, 1);

        mode.on_frame(t0 + Duration::from_millis(250));
        assert_eq!(mode.engine.state().ticks, 2);
    }

    #[test]
    fn test_start_ignored_while_playing() {
        let mut mode = mode();
        let t0 = Instant::now();
        mode.handle_event(press(KeyCode::Enter), t0);
        mode.on_frame(t0);
        let ticket = mode.ticket;

        mode.handle_event(press(KeyCode::Char('r')), t0);
        assert_eq!(mode.ticket, ticket);
        assert_eq!(mode.engine.state().ticks, 1);
    }

    #[test]
    fn test_reversal_key_ignored() {
        let mut mode = mode();
        let t0 = Instant::now();
        mode.handle_event(press(KeyCode::Enter), t0);

        mode.handle_event(press(KeyCode::Left), t0);
        assert_eq!(mode.engine.state().pending_direction, Direction::Right);

        mode.handle_event(press(KeyCode::Up), t0);
        assert_eq!(mode.engine.state().pending_direction, Direction::Up);
    }

    #[test]
    fn test_game_over_stops_scheduler() {
        let mut mode = mode();
        let t0 = Instant::now();
        mode.handle_event(press(KeyCode::Enter), t0);
        mode.handle_event(press(KeyCode::Up), t0);

        // head starts mid-board heading up, so it hits the top wall within rows/2 + 1 steps
        let mut now = t0;
        for _ in 0..30 {
            mode.on_frame(now);
            now += Duration::from_millis(250);
        }

        assert_eq!(mode.engine.state().phase, Phase::GameOver);
        assert!(mode.ticket.is_none());
        assert!(!mode.scheduler.is_armed());
        assert_eq!(mode.metrics.games_played, 1);

        mode.handle_event(press(KeyCode::Enter), now);
        assert_eq!(mode.engine.state().phase, Phase::Playing);
        assert!(mode.scheduler.is_armed());
    }

    fn submitter() -> LeaderboardSubmitter {
        let client = LeaderboardClient::new("http://127.0.0.1:9").unwrap();
        LeaderboardSubmitter::new(client, "ada")
    }

    #[tokio::test]
    async fn test_quit_waits_for_pending_submissions() {
        let engine = GameEngine::with_seed(
            GameConfig::default(),
            Box::new(MemoryHighScoreStore::default()),
            7,
        );
        let mut mode = PlayMode::new(engine, Some(submitter()));
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        let leaderboard = mode.leaderboard.as_mut().unwrap();
        leaderboard.pending.spawn(async move {
            let _ = rx.await;
        });
        assert_eq!(leaderboard.pending(), 1);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(());
        });

        mode.handle_event(press(KeyCode::Char('q')), Instant::now());
        assert!(mode.should_quit);
        assert_eq!(mode.flush_leaderboard(Duration::from_secs(5)).await, 0);
        assert_eq!(mode.leaderboard.as_ref().unwrap().pending(), 0);
    }

    #[tokio::test]
    async fn test_stuck_submission_is_abandoned() {
        let mut leaderboard = submitter();
        leaderboard.pending.spawn(std::future::pending::<()>());

        assert_eq!(leaderboard.drain(Duration::from_millis(10)).await, 1);
        assert_eq!(leaderboard.pending(), 0);
    }

    #[tokio::test]
    async fn test_failed_submission_is_drained() {
        let mut leaderboard = submitter();
        let summary = FinalSummary {
            score: 15,
            level: 1,
            portfolio: Vec::new(),
            collision: crate::game::CollisionType::Wall,
            previous_best: 0,
            new_record: true,
        };
        leaderboard.submit(&summary);
        assert_eq!(leaderboard.pending(), 1);

        assert_eq!(leaderboard.drain(Duration::from_secs(10)).await, 0);
        assert_eq!(leaderboard.pending(), 0);
    }

    #[test]
    fn test_quit_key() {
        let mut mode = mode();
        mode.handle_event(press(KeyCode::Char('q')), Instant::now());
        assert!(mode.should_quit);
    }
}
