use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event as TermEvent, KeyCode, KeyEvent,
        KeyEventKind, KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use std::io::{self, Stdout};
use std::time::Duration;

use palm_core::{
    ACADEMIC_FRAMEWORK, Action, BranchCode, Command, Confidence, Event, FlowContext,
    FlowController, FlowError, InsightResult, InsightSource, MatchLevel, ShareMessage, Stage,
};
use palm_oracle::InsightAdapter;

use crate::share::Sharer;
use crate::worker::Worker;

const SPINNER: [&str; 4] = ["|", "/", "-", "\\"];

pub fn branch_color(code: BranchCode) -> Color {
    match code {
        BranchCode::Cse => Color::Blue,
        BranchCode::It => Color::Cyan,
        BranchCode::Ece => Color::Green,
        BranchCode::Me => Color::Yellow,
        BranchCode::Ce => Color::Gray,
        BranchCode::Eee => Color::Magenta,
    }
}

fn level_color(level: MatchLevel) -> Color {
    match level {
        MatchLevel::High => Color::Green,
        MatchLevel::Medium => Color::Yellow,
        MatchLevel::Low => Color::DarkGray,
    }
}

/// What the run loop has to do after a key press.
#[derive(Debug, PartialEq)]
pub enum Effect {
    None,
    Run(Vec<Command>),
    Restarted,
    Share,
    Quit,
}

pub struct App {
    controller: FlowController,
    name_input: String,
    cursor: usize,
    notice: Option<String>,
    faculty_view: bool,
    spinner: usize,
}

impl App {
    pub fn new(ctx: FlowContext) -> Self {
        Self {
            controller: FlowController::new(ctx),
            name_input: String::new(),
            cursor: 0,
            notice: None,
            faculty_view: false,
            spinner: 0,
        }
    }

    pub fn controller(&self) -> &FlowController {
        &self.controller
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn tick(&mut self) {
        self.spinner = (self.spinner + 1) % SPINNER.len();
    }

    pub fn apply_event(&mut self, event: Event) -> Vec<Command> {
        match self.controller.handle(event) {
            Ok(commands) => commands,
            Err(e) => {
                tracing::warn!(error = %e, "flow event rejected");
                Vec::new()
            }
        }
    }

    fn dispatch(&mut self, action: Action) -> Effect {
        let restart = action == Action::Restart;
        match self.controller.dispatch(action) {
            Ok(commands) => {
                self.notice = None;
                self.cursor = 0;
                if restart {
                    self.name_input.clear();
                    self.faculty_view = false;
                    Effect::Restarted
                } else {
                    Effect::Run(commands)
                }
            }
            Err(FlowError::Busy) => Effect::None,
            Err(FlowError::EmptyName) => {
                self.notice = Some("Please enter your name to continue.".to_string());
                Effect::None
            }
            Err(e) => {
                tracing::debug!(error = %e, "action rejected");
                Effect::None
            }
        }
    }

    fn option_count(&self) -> usize {
        let session = self.controller.session();
        match session.stage() {
            Stage::Questioning { .. } => session
                .current_question(self.controller.context())
                .map(|(_, _, q)| q.options.len())
                .unwrap_or(0),
            Stage::ConfidenceCheck => Confidence::ALL.len(),
            _ => 0,
        }
    }

    fn choose(&mut self, index: usize) -> Effect {
        match self.controller.session().stage() {
            Stage::Questioning { .. } => self.dispatch(Action::Answer(index)),
            Stage::ConfidenceCheck => match Confidence::ALL.get(index) {
                Some(c) => self.dispatch(Action::Confirm(*c)),
                None => Effect::None,
            },
            _ => Effect::None,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Effect {
        if key.kind != KeyEventKind::Press {
            return Effect::None;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Effect::Quit;
        }
        if key.code == KeyCode::Esc {
            return self.dispatch(Action::Restart);
        }

        match self.controller.session().stage() {
            Stage::Welcome => match key.code {
                KeyCode::Enter | KeyCode::Char(' ') => self.dispatch(Action::Begin),
                KeyCode::Char('q') => Effect::Quit,
                _ => Effect::None,
            },
            Stage::NameInput => match key.code {
                KeyCode::Enter => {
                    let effect = self.dispatch(Action::SubmitName(self.name_input.clone()));
                    if matches!(effect, Effect::Run(_)) {
                        self.name_input.clear();
                    }
                    effect
                }
                KeyCode::Backspace => {
                    self.name_input.pop();
                    Effect::None
                }
                KeyCode::Char(c) => {
                    self.name_input.push(c);
                    Effect::None
                }
                _ => Effect::None,
            },
            Stage::Questioning { .. } | Stage::ConfidenceCheck => {
                let count = self.option_count();
                match key.code {
                    KeyCode::Up | KeyCode::Char('k') => {
                        self.cursor = self.cursor.saturating_sub(1);
                        Effect::None
                    }
                    KeyCode::Down | KeyCode::Char('j') => {
                        if self.cursor + 1 < count {
                            self.cursor += 1;
                        }
                        Effect::None
                    }
                    KeyCode::Enter => self.choose(self.cursor),
                    KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                        let index = c as usize - '1' as usize;
                        self.choose(index)
                    }
                    _ => Effect::None,
                }
            }
            Stage::Interpreting => Effect::None,
            Stage::Result => match key.code {
                KeyCode::Char('s') => Effect::Share,
                KeyCode::Char('f') => {
                    self.faculty_view = !self.faculty_view;
                    Effect::None
                }
                KeyCode::Char('r') => self.dispatch(Action::Restart),
                KeyCode::Char('q') => Effect::Quit,
                _ => Effect::None,
            },
        }
    }

    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4),
                Constraint::Min(8),
                Constraint::Length(3),
            ])
            .split(f.area());

        let session = self.controller.session();
        let ctx = self.controller.context();
        let accent = session
            .result()
            .map(|r| branch_color(r.color_theme()))
            .unwrap_or(Color::Yellow);

        let mut header = vec![Line::from(Span::styled(
            "Palm Insight",
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ))];
        header.push(Line::from(Span::styled(
            format!("Engineering branch discovery for {}", ctx.institution),
            Style::default().fg(Color::Gray),
        )));
        let splash = Paragraph::new(Text::from(header))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(splash, chunks[0]);

        let (title, body) = match session.stage() {
            Stage::Welcome => ("welcome".to_string(), self.welcome_lines()),
            Stage::NameInput => ("identity profile".to_string(), self.name_lines()),
            Stage::Questioning { .. } => self.question_view(),
            Stage::ConfidenceCheck => ("self-reflection".to_string(), self.confidence_lines()),
            Stage::Interpreting => ("analysis".to_string(), self.interpreting_lines()),
            Stage::Result => ("analysis results".to_string(), self.result_lines()),
        };
        let main = Paragraph::new(Text::from(body))
            .block(Block::default().borders(Borders::ALL).title(title))
            .wrap(Wrap { trim: false });
        f.render_widget(main, chunks[1]);

        let footer_text = match &self.notice {
            Some(n) => n.clone(),
            None => self.key_hints().to_string(),
        };
        let footer = Paragraph::new(footer_text)
            .style(Style::default().fg(Color::Gray))
            .block(Block::default().borders(Borders::ALL))
            .wrap(Wrap { trim: true });
        f.render_widget(footer, chunks[2]);
    }

    fn key_hints(&self) -> &'static str {
        match self.controller.session().stage() {
            Stage::Welcome => "Enter=begin  q=quit",
            Stage::NameInput => "type your name  Enter=continue  Esc=restart",
            Stage::Questioning { .. } | Stage::ConfidenceCheck => {
                "1-9 or Up/Down+Enter=choose  Esc=restart"
            }
            Stage::Interpreting => "analysing...  Esc=restart",
            Stage::Result => "s=share  f=faculty view  r=restart  q=quit",
        }
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::raw(""),
            Line::from(Span::styled(
                "Discover the engineering branch that matches how you think.",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
            Line::raw("Fourteen short scenarios about how you reason, learn and build."),
            Line::raw("Your answers are weighed against six engineering branches."),
            Line::raw(""),
            Line::from(Span::styled("Press Enter to begin", Style::default().fg(Color::Cyan))),
        ]
    }

    fn name_lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::raw(""),
            Line::raw("What should we call you?"),
            Line::raw(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::raw(self.name_input.clone()),
                Span::styled("_", Style::default().fg(Color::DarkGray)),
            ]),
        ]
    }

    fn option_line(&self, index: usize, label: &str) -> Line<'static> {
        let selected = index == self.cursor;
        let marker = if selected { ">" } else { " " };
        let style = if selected {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(Span::styled(format!("{marker} {}. {label}", index + 1), style))
    }

    fn question_view(&self) -> (String, Vec<Line<'static>>) {
        let session = self.controller.session();
        let Some((index, total, q)) = session.current_question(self.controller.context()) else {
            return ("questioning".to_string(), Vec::new());
        };
        let mut lines = vec![
            Line::from(vec![
                Span::styled(
                    q.phase.title().to_uppercase(),
                    Style::default().fg(Color::DarkGray),
                ),
                Span::raw(format!("   Profile: {}", session.first_name())),
            ]),
            Line::raw(""),
            Line::from(Span::styled(
                q.prompt.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];
        for (i, o) in q.options.iter().enumerate() {
            lines.push(self.option_line(i, &o.label));
        }
        (format!("question {} / {}", index + 1, total), lines)
    }

    fn confidence_lines(&self) -> Vec<Line<'static>> {
        let mut lines = vec![
            Line::raw(""),
            Line::from(Span::styled(
                format!(
                    "{}, does the data captured so far reflect your true problem-solving nature?",
                    self.controller.session().first_name()
                ),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::raw(""),
        ];
        for (i, c) in Confidence::ALL.iter().enumerate() {
            lines.push(self.option_line(i, c.prompt_label()));
        }
        lines
    }

    fn interpreting_lines(&self) -> Vec<Line<'static>> {
        let status = self
            .controller
            .session()
            .status_message(self.controller.context())
            .unwrap_or_default()
            .to_string();
        vec![
            Line::raw(""),
            Line::from(vec![
                Span::styled(
                    format!("{} ", SPINNER[self.spinner]),
                    Style::default().fg(Color::Cyan),
                ),
                Span::styled(status, Style::default().add_modifier(Modifier::ITALIC)),
            ]),
        ]
    }

    fn result_lines(&self) -> Vec<Line<'static>> {
        let Some(r) = self.controller.session().result() else {
            return Vec::new();
        };
        let accent = branch_color(r.color_theme());
        let heading = Style::default().fg(Color::DarkGray).add_modifier(Modifier::BOLD);

        let mut lines = vec![
            Line::from(vec![
                Span::raw(format!("{}, you are a ", r.user_name)),
                Span::styled(
                    r.content.personality_summary.clone(),
                    Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
                ),
            ]),
            Line::raw(""),
            Line::from(vec![
                Span::raw("Best fit: "),
                Span::styled(
                    r.suggested_branch.clone(),
                    Style::default().fg(accent).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  at {}", self.controller.context().institution),
                    Style::default().fg(Color::Gray),
                ),
            ]),
            Line::raw(""),
            Line::from(Span::styled("WHY THIS BRANCH FITS YOU", heading)),
        ];
        for b in r.content.reasoning_bullets.iter().filter(|b| !b.trim().is_empty()) {
            lines.push(Line::raw(format!("  * {b}")));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("CONTEXTUAL SUMMARY", heading)));
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", r.content.reasoning),
            Style::default().add_modifier(Modifier::ITALIC),
        )));
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("PALM INSIGHTS", heading)));
        let p = &r.content.palm_insights;
        let palm = [
            ("Head line", &p.head_line),
            ("Life line", &p.life_line),
            ("Palm shape", &p.palm_shape),
        ];
        for (label, text) in palm {
            lines.push(Line::from(vec![
                Span::styled(format!("  {label:<11}"), Style::default().fg(Color::Gray)),
                Span::raw(text.clone()),
            ]));
        }
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled("BRANCH MATCH", heading)));
        for m in &r.comparisons {
            lines.push(Line::from(vec![
                Span::styled(
                    format!("  {:<5}", m.code.as_str()),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("{:<8}", m.level.as_str()),
                    Style::default().fg(level_color(m.level)),
                ),
                Span::raw(m.label.clone()),
            ]));
        }
        if !r.secondary_branches.is_empty() {
            lines.push(Line::raw(""));
            lines.push(Line::raw(format!("Also consider: {}", r.secondary_branches.join(", "))));
        }
        lines.push(Line::raw(""));
        let mut footer = format!("Generated {}", r.date);
        if r.source == InsightSource::Fallback {
            footer.push_str(" (offline analysis)");
        }
        lines.push(Line::from(Span::styled(footer, Style::default().fg(Color::DarkGray))));

        if self.faculty_view {
            lines.push(Line::raw(""));
            lines.push(Line::from(Span::styled("FACULTY VIEW", heading)));
            lines.push(Line::raw(r.content.academic_explanation.clone()));
            lines.push(Line::from(Span::styled(
                format!("Framework: {ACADEMIC_FRAMEWORK}"),
                Style::default().fg(Color::Gray),
            )));
        }
        lines
    }
}

fn share_result(result: &InsightResult, institution: &str, url: &str, sharer: &Sharer) -> String {
    let message = ShareMessage::for_result(result, institution, url);
    sharer.share(&message).notice()
}

pub fn run_app(
    ctx: FlowContext,
    adapter: InsightAdapter,
    sharer: Sharer,
    share_url: String,
) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app_loop(&mut terminal, ctx, adapter, &sharer, &share_url);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

fn app_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ctx: FlowContext,
    adapter: InsightAdapter,
    sharer: &Sharer,
    share_url: &str,
) -> Result<()> {
    let (mut worker, events) = Worker::new(tokio::runtime::Handle::current(), adapter);
    let mut app = App::new(ctx);
    tracing::info!("tui session started");

    loop {
        while let Ok(ev) = events.try_recv() {
            let commands = app.apply_event(ev);
            worker.execute(commands);
        }

        terminal.draw(|f| app.render(f))?;

        if !event::poll(Duration::from_millis(80))? {
            app.tick();
            continue;
        }
        let TermEvent::Key(key) = event::read()? else {
            continue;
        };
        match app.on_key(key) {
            Effect::None => {}
            Effect::Run(commands) => worker.execute(commands),
            Effect::Restarted => worker.cancel_all(),
            Effect::Share => {
                if let Some(result) = app.controller().session().result().cloned() {
                    let institution = app.controller().context().institution.clone();
                    let notice = share_result(&result, &institution, share_url, sharer);
                    app.set_notice(notice);
                }
            }
            Effect::Quit => break,
        }
    }

    worker.cancel_all();
    tracing::info!("tui session ended");
    Ok(())
}
