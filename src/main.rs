use std::io;
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use ddragon_terminal::config::ClientConfig;
use ddragon_terminal::ddragon_fetch::DdragonClient;
use ddragon_terminal::fetch::HttpFetcher;
use ddragon_terminal::format::{ability_text, difficulty_stars, join_tags, skin_choices, strip_markup};
use ddragon_terminal::locale::format_locale_name;
use ddragon_terminal::persist::{self, Theme};
use ddragon_terminal::pipeline::Pipeline;
use ddragon_terminal::provider::spawn_provider;
use ddragon_terminal::state::{
    Delta, MediaSlot, PipelineEvent, PipelinePhase, ProviderCommand, SubResourceTag,
};

struct App {
    pipeline: Pipeline,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
    events: mpsc::Receiver<PipelineEvent>,
    cursor: usize,
    search_active: bool,
    theme: Theme,
    help_overlay: bool,
    should_quit: bool,
}

impl App {
    fn new(mut pipeline: Pipeline, cmd_tx: Option<mpsc::Sender<ProviderCommand>>, theme: Theme) -> Self {
        let events = pipeline.subscribe();
        Self {
            pipeline,
            cmd_tx,
            events,
            cursor: 0,
            search_active: false,
            theme,
            help_overlay: false,
            should_quit: false,
        }
    }

    fn dispatch(&mut self, cmd: Option<ProviderCommand>) {
        let Some(cmd) = cmd else {
            return;
        };
        let Some(tx) = &self.cmd_tx else {
            self.pipeline.push_log("[INFO] Data fetch unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.pipeline.push_log("[WARN] Provider request failed");
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.search_active {
            self.on_search_key(key);
            return;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Enter => self.select_under_cursor(),
            KeyCode::Char('1') => self.pipeline.select_sub_resource(SubResourceTag::Passive),
            KeyCode::Char('2') => self.pipeline.select_sub_resource(SubResourceTag::Q),
            KeyCode::Char('3') => self.pipeline.select_sub_resource(SubResourceTag::W),
            KeyCode::Char('4') => self.pipeline.select_sub_resource(SubResourceTag::E),
            KeyCode::Char('5') => self.pipeline.select_sub_resource(SubResourceTag::R),
            KeyCode::Char('v') => self.pipeline.open_media(),
            KeyCode::Char('x') => self.pipeline.close_media(),
            KeyCode::Char('l') => {
                let cmd = self.pipeline.cycle_locale(1);
                self.dispatch(cmd);
            }
            KeyCode::Char('L') => {
                let cmd = self.pipeline.cycle_locale(-1);
                self.dispatch(cmd);
            }
            KeyCode::Char('/') => self.search_active = true,
            KeyCode::Char('s') => self.pipeline.next_skin(),
            KeyCode::Char('t') => self.toggle_theme(),
            KeyCode::Char('?') => self.help_overlay = !self.help_overlay,
            KeyCode::Esc => self.help_overlay = false,
            _ => {}
        }
    }

    fn on_search_key(&mut self, key: KeyEvent) {
        let mut query = self.pipeline.state().search().to_string();
        match key.code {
            KeyCode::Enter => {
                self.search_active = false;
                return;
            }
            KeyCode::Esc => {
                self.search_active = false;
                query.clear();
            }
            KeyCode::Backspace => {
                query.pop();
            }
            KeyCode::Char(c) => query.push(c),
            _ => return,
        }
        self.pipeline.set_search(&query);
        self.cursor = 0;
    }

    fn move_cursor(&mut self, step: isize) {
        let total = self.pipeline.state().filtered_entries().len();
        if total == 0 {
            self.cursor = 0;
            return;
        }
        let next = (self.cursor as isize + step).clamp(0, total as isize - 1);
        self.cursor = next as usize;
    }

    fn select_under_cursor(&mut self) {
        let Some(id) = self
            .pipeline
            .state()
            .filtered_entries()
            .get(self.cursor)
            .map(|entry| entry.id.clone())
        else {
            return;
        };
        let cmd = self.pipeline.select_entity(&id);
        self.dispatch(cmd);
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Err(err) = persist::save_theme(self.theme) {
            self.pipeline.push_log(format!("[WARN] Could not save theme: {err}"));
        }
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                PipelineEvent::CatalogueLoaded { .. } => self.cursor_to_selection(),
                PipelineEvent::LocaleChanged { .. } => {
                    self.search_active = false;
                    self.cursor_to_selection();
                }
                _ => {}
            }
        }
    }

    fn cursor_to_selection(&mut self) {
        let state = self.pipeline.state();
        let selected = state.selected_entity();
        self.cursor = state
            .filtered_entries()
            .iter()
            .position(|entry| Some(entry.id.as_str()) == selected)
            .unwrap_or(0);
    }
}

fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let config = ClientConfig::from_env();
    let fetcher = HttpFetcher::new(config.timeout)?;
    let client = DdragonClient::new(config.base_url.clone(), Arc::new(fetcher));
    let theme = persist::load_theme();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(client, tx, cmd_rx);

    let mut app = App::new(Pipeline::new(&config), Some(cmd_tx), theme);
    let first = app.pipeline.start();
    app.dispatch(first);
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(100);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            let next = app.pipeline.apply(delta);
            app.dispatch(next);
        }
        app.drain_events();

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

#[derive(Clone, Copy)]
struct Palette {
    base: Style,
    accent: Style,
    muted: Style,
    highlight: Style,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            base: Style::default().fg(Color::Gray).bg(Color::Black),
            accent: Style::default().fg(Color::Yellow).bg(Color::Black),
            muted: Style::default().fg(Color::DarkGray).bg(Color::Black),
            highlight: Style::default().fg(Color::Black).bg(Color::Yellow),
        },
        Theme::Light => Palette {
            base: Style::default().fg(Color::Black).bg(Color::White),
            accent: Style::default().fg(Color::Blue).bg(Color::White),
            muted: Style::default().fg(Color::DarkGray).bg(Color::White),
            highlight: Style::default().fg(Color::White).bg(Color::Blue),
        },
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let pal = palette(app.theme);
    frame.render_widget(Block::default().style(pal.base), frame.size());

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.pipeline))
        .style(pal.accent)
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(26),
            Constraint::Min(30),
            Constraint::Length(44),
        ])
        .split(rows[1]);

    render_roster(frame, columns[0], app, pal);
    render_detail(frame, columns[1], &app.pipeline, pal);
    render_abilities(frame, columns[2], &app.pipeline, pal);

    let console = Paragraph::new(console_text(&app.pipeline))
        .style(pal.muted)
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, rows[2]);

    let footer = Paragraph::new(footer_text(app)).style(pal.muted);
    frame.render_widget(footer, rows[3]);

    if app.help_overlay {
        render_help_overlay(frame, frame.size(), pal);
    }
    if let Some(notice) = app.pipeline.fatal_notice() {
        render_fatal_overlay(frame, frame.size(), notice, pal);
    }
}

fn header_text(pipeline: &Pipeline) -> String {
    let state = pipeline.state();
    let version = state.version().unwrap_or("-");
    let locale = state.locale();
    format!(
        "DDRAGON TERMINAL | v{version} | {} [{locale}] | {}",
        format_locale_name(locale),
        phase_label(pipeline.phase())
    )
}

fn phase_label(phase: PipelinePhase) -> &'static str {
    match phase {
        PipelinePhase::Idle => "IDLE",
        PipelinePhase::ResolvingVersion => "RESOLVING VERSION",
        PipelinePhase::ResolvingLocales => "RESOLVING LANGUAGES",
        PipelinePhase::LoadingCatalogue => "LOADING CHAMPIONS",
        PipelinePhase::LoadingDetail => "LOADING DETAILS",
        PipelinePhase::Ready => "READY",
        PipelinePhase::LocaleChanging => "CHANGING LANGUAGE",
        PipelinePhase::Failed => "ERROR",
    }
}

fn footer_text(app: &App) -> String {
    if app.search_active {
        return "Type to filter | Backspace Delete | Enter Done | Esc Clear".to_string();
    }
    "j/k Move | Enter Select | 1-5 Ability | v Video | x Close | l/L Language | / Search | s Skin | t Theme | ? Help | q Quit".to_string()
}

fn render_roster(frame: &mut Frame, area: Rect, app: &App, pal: Palette) {
    let state = app.pipeline.state();
    let title = if app.search_active || !state.search().is_empty() {
        format!("Champions /{}", state.search())
    } else {
        "Champions".to_string()
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.height == 0 {
        return;
    }

    if state.entries().is_empty() {
        let text = if app.pipeline.phase().is_startup() {
            "Loading champions..."
        } else {
            "No champions"
        };
        frame.render_widget(Paragraph::new(text).style(pal.muted), inner);
        return;
    }
    let filtered = state.filtered_entries();
    if filtered.is_empty() {
        frame.render_widget(Paragraph::new("No champions found").style(pal.muted), inner);
        return;
    }

    let visible = inner.height as usize;
    let (start, end) = visible_range(app.cursor, filtered.len(), visible);
    let selected = state.selected_entity();
    let lines: Vec<Line> = filtered[start..end]
        .iter()
        .enumerate()
        .map(|(offset, entry)| {
            let idx = start + offset;
            let marker = if Some(entry.id.as_str()) == selected { "* " } else { "  " };
            let style = if idx == app.cursor { pal.highlight } else { pal.base };
            Line::styled(format!("{marker}{}", entry.display_name), style)
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn render_detail(frame: &mut Frame, area: Rect, pipeline: &Pipeline, pal: Palette) {
    let block = Block::default().title("Champion").borders(Borders::ALL);
    let state = pipeline.state();
    let Some(active) = state.active_detail() else {
        let text = if pipeline.is_detail_loading() {
            "Loading details..."
        } else {
            "No champion selected"
        };
        frame.render_widget(Paragraph::new(text).style(pal.muted).block(block), area);
        return;
    };
    let detail = &active.detail;

    let skins = skin_choices(detail);
    let skin_line = skins
        .iter()
        .map(|skin| {
            if skin.num == state.active_skin() {
                format!("[{}]", skin.name)
            } else {
                skin.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join("  ");

    let mut lines = vec![
        Line::styled(detail.display_name.clone(), pal.accent.add_modifier(Modifier::BOLD)),
        Line::styled(detail.title.clone(), pal.base),
        Line::raw(""),
        Line::styled(format!("Roles: {}", join_tags(&detail.tags)), pal.base),
        Line::styled(format!("Difficulty: {}", difficulty_stars(detail.difficulty)), pal.base),
        Line::raw(""),
    ];
    push_text(&mut lines, &strip_markup(&detail.blurb), pal.base);
    lines.push(Line::raw(""));
    lines.push(Line::styled(format!("Skins: {skin_line}"), pal.base));
    lines.push(Line::styled(
        format!(
            "Splash: {}",
            pipeline.locator().splash_url(&detail.id, state.active_skin())
        ),
        pal.muted,
    ));
    if pipeline.is_detail_loading() {
        lines.push(Line::styled("Loading details...", pal.muted));
    }
    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn render_abilities(frame: &mut Frame, area: Rect, pipeline: &Pipeline, pal: Palette) {
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(6), Constraint::Length(5)])
        .split(area);

    let state = pipeline.state();
    let ability_block = Block::default().title("Abilities").borders(Borders::ALL);
    let Some(active) = state.active_detail() else {
        frame.render_widget(Paragraph::new("").block(ability_block), sections[0]);
        frame.render_widget(
            Paragraph::new("").block(Block::default().title("Video").borders(Borders::ALL)),
            sections[1],
        );
        return;
    };
    let detail = &active.detail;
    let current = state.active_sub_resource();
    let version = state.version().unwrap_or_default();

    let tabs = SubResourceTag::ALL
        .iter()
        .enumerate()
        .map(|(idx, tag)| {
            let label = format!(" {} {} ", idx + 1, tag.as_str().to_uppercase());
            if *tag == current {
                Span::styled(label, pal.highlight)
            } else {
                Span::styled(label, pal.base)
            }
        })
        .collect::<Vec<_>>();

    let mut lines = vec![Line::from(tabs), Line::raw("")];
    match ability_text(detail, current) {
        Some((name, description)) => {
            lines.push(Line::styled(name, pal.accent));
            push_text(&mut lines, &description, pal.base);
        }
        None => lines.push(Line::styled("No ability data", pal.muted)),
    }
    let icon = match current.spell_index() {
        None => Some(pipeline.locator().passive_icon_url(version, &detail.passive.image_ref)),
        Some(idx) => detail
            .spells
            .get(idx)
            .map(|spell| pipeline.locator().spell_icon_url(version, &spell.image_ref)),
    };
    if let Some(icon) = icon {
        lines.push(Line::raw(""));
        lines.push(Line::styled(format!("Icon: {icon}"), pal.muted));
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(ability_block)
            .wrap(Wrap { trim: false }),
        sections[0],
    );

    let video_text = match state.media() {
        MediaSlot::Closed => Line::styled("Press v to watch ability video", pal.muted),
        MediaSlot::Open { locator, .. } => Line::styled(locator.clone(), pal.accent),
        MediaSlot::Unavailable { notice } => Line::styled(notice.clone(), pal.muted),
    };
    frame.render_widget(
        Paragraph::new(video_text)
            .block(Block::default().title("Video").borders(Borders::ALL))
            .wrap(Wrap { trim: false }),
        sections[1],
    );
}

fn push_text(lines: &mut Vec<Line<'static>>, text: &str, style: Style) {
    for part in text.lines() {
        lines.push(Line::styled(part.to_string(), style));
    }
}

fn console_text(pipeline: &Pipeline) -> String {
    let console = pipeline.console();
    if console.is_empty() {
        return "No messages yet".to_string();
    }
    let skip = console.len().saturating_sub(3);
    console
        .lines()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect, pal: Palette) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "DDragon Terminal - Help",
        "",
        "Roster:",
        "  j/k or ↑/↓   Move",
        "  Enter        Show champion",
        "  /            Search by name",
        "",
        "Champion:",
        "  1-5          Passive, Q, W, E, R",
        "  v / x        Watch / close ability video",
        "  s            Next skin",
        "",
        "Global:",
        "  l / L        Next / previous language",
        "  t            Toggle theme",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(pal.base);
    frame.render_widget(help, popup_area);
}

fn render_fatal_overlay(frame: &mut Frame, area: Rect, notice: &str, pal: Palette) {
    let popup_area = centered_rect(50, 20, area);
    frame.render_widget(Clear, popup_area);
    let text = format!("{notice}\n\nPress q to quit.");
    let popup = Paragraph::new(text)
        .block(Block::default().title("Error").borders(Borders::ALL))
        .style(pal.accent)
        .wrap(Wrap { trim: true });
    frame.render_widget(popup, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
