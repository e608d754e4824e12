use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction as LayoutDirection, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::collections::HashMap;
use std::time::Instant;

use crate::game::{
    AcquiredRecord, Direction, FinalSummary, GameEngine, Grid, Item, Phase, Position, RunState,
    Tier, tier_counts,
};
use crate::metrics::GameMetrics;

const HEADER_HEIGHT: u16 = 3;
const FOOTER_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 30;
const BREAKDOWN_BAR_WIDTH: usize = 8;

pub fn tier_color(tier: Tier) -> Color {
    match tier {
        Tier::Seed => Color::Green,
        Tier::SeriesA => Color::Blue,
        Tier::SeriesB => Color::DarkGray,
        Tier::Unicorn => Color::Yellow,
    }
}

fn head_glyph(direction: Direction) -> &'static str {
    match direction {
        Direction::Up => "▲ ",
        Direction::Down => "▼ ",
        Direction::Left => "◀ ",
        Direction::Right => "▶ ",
    }
}

struct Screen {
    header: Rect,
    board: Rect,
    sidebar: Rect,
    footer: Rect,
}

fn screen_layout(area: Rect, grid: Grid) -> Option<Screen> {
    // two terminal columns per cell, plus the border
    let board_width = u16::try_from(grid.cols())
        .ok()?
        .checked_mul(2)?
        .checked_add(2)?;
    let board_height = u16::try_from(grid.rows()).ok()?.checked_add(2)?;

    let screen_height = board_height.saturating_add(HEADER_HEIGHT + FOOTER_HEIGHT);
    if area.width < board_width || area.height < screen_height {
        return None;
    }

    let rows = Layout::default()
        .direction(LayoutDirection::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Length(board_height),
            Constraint::Length(FOOTER_HEIGHT),
            Constraint::Min(0),
        ])
        .split(area);

    let columns = Layout::default()
        .direction(LayoutDirection::Horizontal)
        .constraints([
            Constraint::Length(board_width),
            Constraint::Length(SIDEBAR_WIDTH.min(area.width - board_width)),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    Some(Screen {
        header: rows[0],
        board: columns[0],
        sidebar: columns[1],
        footer: rows[2],
    })
}

/// Where the board lands on a terminal of the given size, if it fits
pub fn board_area(area: Rect, grid: Grid) -> Option<Rect> {
    screen_layout(area, grid).map(|screen| screen.board)
}

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    /// Draw the full frame. Skipped when the terminal cannot fit the board.
    pub fn render(
        &self,
        frame: &mut Frame,
        engine: &GameEngine,
        metrics: &GameMetrics,
        now: Instant,
    ) {
        let Some(screen) = screen_layout(frame.area(), engine.grid()) else {
            return;
        };
        let state = engine.state();

        frame.render_widget(self.render_stats(state, engine.high_score(), metrics), screen.header);

        match (state.phase, engine.summary()) {
            (Phase::Idle, _) => frame.render_widget(self.render_idle(), screen.board),
            (Phase::GameOver, Some(summary)) => {
                frame.render_widget(self.render_game_over(summary), screen.board)
            }
            _ => frame.render_widget(self.render_grid(state, engine.grid()), screen.board),
        }

        if let Some(text) = engine.notice(now) {
            let toast = Rect {
                x: screen.board.x + 1,
                y: screen.board.y + 1,
                width: screen.board.width.saturating_sub(2),
                height: 1,
            };
            frame.render_widget(Clear, toast);
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" {text} "),
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
                toast,
            );
        }

        if screen.sidebar.width > 0 {
            frame.render_widget(self.render_sidebar(state, screen.sidebar), screen.sidebar);
        }

        frame.render_widget(self.render_controls(), screen.footer);
    }

    fn render_grid(&self, state: &RunState, grid: Grid) -> Paragraph<'_> {
        let segments: HashMap<Position, usize> = state
            .snake
            .body
            .iter()
            .enumerate()
            .map(|(i, &pos)| (pos, i))
            .collect();
        let items: HashMap<Position, &Item> =
            state.items.iter().map(|item| (item.pos, item)).collect();

        let mut lines = Vec::with_capacity(grid.rows());

        for y in 0..grid.rows() {
            let mut spans = Vec::with_capacity(grid.cols());

            for x in 0..grid.cols() {
                let pos = Position::new(x as i32, y as i32);

                let cell = match (segments.get(&pos).copied(), items.get(&pos).copied()) {
                    (Some(0), _) => Span::styled(
                        head_glyph(state.direction()),
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    ),
                    // every third segment carries a dollar sign
                    (Some(i), _) if i % 3 == 1 => Span::styled(
                        "$ ",
                        Style::default()
                            .fg(Color::LightBlue)
                            .add_modifier(Modifier::BOLD),
                    ),
                    (Some(_), _) => Span::styled("■ ", Style::default().fg(Color::LightBlue)),
                    (None, Some(item)) => self.item_span(item),
                    (None, None) => Span::styled("· ", Style::default().fg(Color::DarkGray)),
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::White))
                .title(" VC Snake "),
        )
    }

    fn item_span(&self, item: &Item) -> Span<'static> {
        let initial = item.name.chars().next().unwrap_or('?');
        let mut style = Style::default().bg(tier_color(item.tier));
        style = if item.tier == Tier::Unicorn {
            style.fg(Color::Black).add_modifier(Modifier::BOLD)
        } else {
            style.fg(Color::White)
        };
        Span::styled(format!("{initial} "), style)
    }

    fn render_stats(&self, state: &RunState, best: u32, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        let mut text = vec![Line::from(vec![
            Span::styled("Portfolio Value: ", label),
            Span::styled(format!("${}M", state.score), value),
            Span::raw("    "),
            Span::styled("Deal Flow: ", label),
            Span::styled(format!("Level {}", state.level()), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(format!("${}M", best), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), Style::default().fg(Color::White)),
        ])];
        if metrics.games_played > 0 {
            text.push(Line::from(Span::styled(
                format!(
                    "Session: {} funds closed, {} deals, top ${}M",
                    metrics.games_played, metrics.startups_acquired, metrics.best_session_score
                ),
                Style::default().fg(Color::Gray),
            )));
        }

        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::BOTTOM))
    }

    fn tier_legend(&self) -> Vec<Line<'static>> {
        Tier::ALL
            .iter()
            .map(|&tier| {
                Line::from(vec![
                    Span::styled("  ", Style::default().bg(tier_color(tier))),
                    Span::raw(format!(" {:<9}", tier.label())),
                    Span::styled(format!("${}M", tier.value()), Style::default().fg(Color::Gray)),
                ])
            })
            .collect()
    }

    fn render_idle(&self) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Ready to Deploy Capital?",
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Navigate your fund to acquire startups.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                "Collect unicorns for maximum valuation!",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
        ];
        text.extend(self.tier_legend());
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to start investing", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Blue))
                .title(" VC Snake "),
        )
    }

    fn render_game_over(&self, summary: &FinalSummary) -> Paragraph<'_> {
        let mut text = vec![
            Line::from(""),
            Line::from(vec![Span::styled(
                "Fund Dissolved",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )]),
            Line::from(Span::styled(
                "Your LPs didn't survive that maneuver.",
                Style::default().fg(Color::Gray),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Final Portfolio: ", Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("${}M", summary.score),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        if summary.new_record {
            text.push(Line::from(Span::styled(
                "★ New Record! ★",
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )));
        }

        let counts: Vec<Span> = summary
            .tier_counts()
            .into_iter()
            .filter(|&(_, count)| count > 0)
            .map(|(tier, count)| {
                Span::styled(
                    format!(" {} {} ", count, tier.label()),
                    Style::default().fg(tier_color(tier)),
                )
            })
            .collect();
        text.push(Line::from(""));
        text.push(Line::from(counts));
        text.push(Line::from(""));
        text.push(Line::from(vec![
            Span::styled("Press ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Enter",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to raise a new fund or ", Style::default().fg(Color::Gray)),
            Span::styled(
                "Q",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(" to quit", Style::default().fg(Color::Gray)),
        ]));

        Paragraph::new(text).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::Red)),
        )
    }

    fn render_sidebar(&self, state: &RunState, area: Rect) -> Paragraph<'_> {
        let mut text = vec![Line::from(Span::styled(
            "Startup Tiers",
            Style::default().add_modifier(Modifier::BOLD),
        ))];
        text.extend(self.tier_legend());
        if !state.portfolio.is_empty() {
            text.push(Line::from(""));
            text.extend(self.fund_breakdown(&state.portfolio));
        }
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(
            format!("Portfolio ({})", state.portfolio.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));

        // newest first, two lines per deal, as many as fit inside the border
        let room = (area.height as usize).saturating_sub(text.len() + 2) / 2;
        if state.portfolio.is_empty() {
            text.push(Line::from(Span::styled(
                "No deals yet",
                Style::default().fg(Color::DarkGray),
            )));
        }
        for record in state.portfolio.iter().rev().take(room) {
            text.push(Line::from(vec![
                Span::styled("● ", Style::default().fg(tier_color(record.tier))),
                Span::raw(format!("{:<12}", record.name)),
                Span::styled(format!("+${}M", record.value), Style::default().fg(Color::Green)),
            ]));
            text.push(Line::from(Span::styled(
                format!("  {}", record.sector),
                Style::default().fg(Color::DarkGray),
            )));
        }

        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(Color::DarkGray)),
        )
    }

    /// Value held per tier, highest tier first, with a bar for its share of deals
    fn fund_breakdown(&self, portfolio: &[AcquiredRecord]) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(Span::styled(
            "Fund Breakdown",
            Style::default().add_modifier(Modifier::BOLD),
        ))];

        for (tier, count) in tier_counts(portfolio).into_iter().rev() {
            if count == 0 {
                continue;
            }
            let filled = (count * BREAKDOWN_BAR_WIDTH).div_ceil(portfolio.len());
            let filled = filled.min(BREAKDOWN_BAR_WIDTH);
            lines.push(Line::from(vec![
                Span::raw(format!("{:<9}", tier.label())),
                Span::styled("█".repeat(filled), Style::default().fg(tier_color(tier))),
                Span::styled(
                    "░".repeat(BREAKDOWN_BAR_WIDTH - filled),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::styled(
                    format!(" ${}M", count as u32 * tier.value()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]));
        }
        lines
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" or click to move | "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" to start | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" to quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
