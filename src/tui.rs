use anyhow::Result;
use crossterm::{
    ExecutableCommand,
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::form::{Field, FormController, Mode, Submit};
use crate::models::{ApplicationRecord, Status};
use crate::view_model::ViewModel;

#[derive(PartialEq)]
enum InputMode {
    Browse,
    Search,
    Form,
}

struct UiState {
    selected: usize,
    scroll_offset: u16,
    input: InputMode,
    form: FormController,
    form_field: usize,
    message: Option<String>,
}

impl UiState {
    fn new() -> Self {
        Self {
            selected: 0,
            scroll_offset: 0,
            input: InputMode::Browse,
            form: FormController::new(),
            form_field: 0,
            message: None,
        }
    }

    fn clamp_selection(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    fn next(&mut self, len: usize) {
        if len > 0 && self.selected < len - 1 {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }
}

pub fn run_browse(vm: &mut ViewModel) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, vm);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, vm: &mut ViewModel) -> Result<()> {
    let mut state = UiState::new();
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        let visible = vm.visible();
        state.clamp_selection(visible.len());
        list_state.select(if visible.is_empty() { None } else { Some(state.selected) });

        terminal.draw(|frame| draw(frame, vm, &visible, &state, &mut list_state))?;

        let Event::Key(key) = event::read()? else { continue };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match state.input {
            InputMode::Browse => {
                match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    KeyCode::Down | KeyCode::Char('j') => state.next(visible.len()),
                    KeyCode::Up | KeyCode::Char('k') => state.prev(),
                    KeyCode::Char('J') | KeyCode::PageDown => {
                        state.scroll_offset = state.scroll_offset.saturating_add(3)
                    }
                    KeyCode::Char('K') | KeyCode::PageUp => {
                        state.scroll_offset = state.scroll_offset.saturating_sub(3)
                    }
                    KeyCode::Char('/') => state.input = InputMode::Search,
                    KeyCode::Char('f') => vm.set_filter(vm.filter().next()),
                    KeyCode::Char('s') => vm.set_sort(vm.sort().next()),
                    KeyCode::Char('r') => {
                        state.message = vm.load().err().map(|e| e.to_string());
                    }
                    KeyCode::Char('a') => {
                        state.form.open_create();
                        state.form_field = 0;
                        state.input = InputMode::Form;
                    }
                    KeyCode::Char('e') => {
                        if let Some(id) = selected_id(&visible, state.selected) {
                            state.form.open_edit(vm, &id);
                            if state.form.is_open() {
                                state.form_field = 0;
                                state.input = InputMode::Form;
                            }
                        }
                    }
                    KeyCode::Char('d') => {
                        if let Some(id) = selected_id(&visible, state.selected) {
                            state.message = vm.remove(&id).err().map(|e| e.to_string());
                        }
                    }
                    _ => {}
                }
            }

            InputMode::Search => match key.code {
                KeyCode::Enter | KeyCode::Esc => state.input = InputMode::Browse,
                KeyCode::Backspace => {
                    let mut term = vm.search_term().to_string();
                    term.pop();
                    vm.set_search_term(&term);
                }
                KeyCode::Char(c) => {
                    let mut term = vm.search_term().to_string();
                    term.push(c);
                    vm.set_search_term(&term);
                }
                _ => {}
            },

            InputMode::Form => {
                let field = Field::ALL[state.form_field];
                match key.code {
                    KeyCode::Esc => {
                        state.form.cancel();
                        state.input = InputMode::Browse;
                    }
                    KeyCode::Tab | KeyCode::Down => {
                        state.form_field = (state.form_field + 1) % Field::ALL.len();
                    }
                    KeyCode::BackTab | KeyCode::Up => {
                        state.form_field =
                            (state.form_field + Field::ALL.len() - 1) % Field::ALL.len();
                    }
                    KeyCode::Enter => match state.form.submit(vm) {
                        Ok(Submit::Saved) => {
                            state.message = None;
                            state.input = InputMode::Browse;
                        }
                        Ok(Submit::Blocked) => {
                            state.message =
                                Some("Company and position are required".to_string());
                        }
                        // Form stays open; the draft is not lost.
                        Err(e) => state.message = Some(e.to_string()),
                    },
                    KeyCode::Left | KeyCode::Right if field == Field::Status => {
                        state.form.cycle_status();
                    }
                    KeyCode::Backspace => {
                        if field != Field::Status {
                            let mut value = state.form.get(field);
                            value.pop();
                            state.form.set(field, &value);
                        }
                    }
                    KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                        if field == Field::Status {
                            state.form.cycle_status();
                        } else {
                            let mut value = state.form.get(field);
                            value.push(c);
                            state.form.set(field, &value);
                        }
                    }
                    _ => {}
                }
            }
        }
    }
    Ok(())
}

fn selected_id(visible: &[ApplicationRecord], selected: usize) -> Option<String> {
    visible.get(selected).and_then(|r| r.id.clone())
}

fn status_color(status: Status) -> Color {
    match status {
        Status::Pending => Color::Yellow,
        Status::Interview => Color::Blue,
        Status::Offer => Color::Green,
        Status::Rejected => Color::Red,
        Status::Unknown => Color::DarkGray,
    }
}

fn draw(
    frame: &mut Frame,
    vm: &ViewModel,
    visible: &[ApplicationRecord],
    state: &UiState,
    list_state: &mut ListState,
) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_stats_bar(frame, vm, rows[0]);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(rows[1]);

    // Left panel: application list
    let items: Vec<ListItem> = visible
        .iter()
        .map(|rec| {
            let line = Line::from(vec![
                Span::styled(
                    format!("{:<10}", rec.status.label()),
                    Style::default().fg(status_color(rec.status)),
                ),
                Span::raw(format!("{} - {}", rec.company, rec.position)),
            ]);
            ListItem::new(line)
        })
        .collect();

    let title = format!(
        " Applications ({})  filter:{}  sort:{}  search:{} ",
        visible.len(),
        vm.filter().label(),
        vm.sort().name(),
        if vm.search_term().is_empty() { "-" } else { vm.search_term() },
    );
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, panes[0], list_state);

    // Right panel: detail
    let detail = Paragraph::new(build_detail(visible.get(state.selected)))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((state.scroll_offset, 0));
    frame.render_widget(detail, panes[1]);

    // Footer: error or help
    let footer = if let Some(message) = &state.message {
        Paragraph::new(format!(" {}", message)).style(Style::default().fg(Color::Red))
    } else if state.input == InputMode::Search {
        Paragraph::new(format!(" search: {}_", vm.search_term()))
            .style(Style::default().fg(Color::Cyan))
    } else {
        Paragraph::new(
            " j/k:navigate  /:search  f:filter  s:sort  a:add  e:edit  d:delete  r:reload  q:quit",
        )
        .style(Style::default().fg(Color::DarkGray))
    };
    frame.render_widget(footer, rows[2]);

    if state.input == InputMode::Form {
        draw_form(frame, state);
    }
}

fn draw_stats_bar(frame: &mut Frame, vm: &ViewModel, area: Rect) {
    let stats = vm.stats();
    let line = Line::from(vec![
        Span::raw(format!(" Total {}  ", stats.total)),
        Span::styled(
            format!("Pending {}  ", stats.pending),
            Style::default().fg(Color::Yellow),
        ),
        Span::styled(
            format!("Interview {}  ", stats.interview),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(
            format!("Offers {}  ", stats.offer),
            Style::default().fg(Color::Green),
        ),
        Span::styled(
            format!("Rejected {}  ", stats.rejected),
            Style::default().fg(Color::Red),
        ),
        Span::raw(format!("Response rate {}%", stats.response_rate)),
    ]);
    let bar = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(bar, area);
}

fn build_detail<'a>(record: Option<&'a ApplicationRecord>) -> Text<'a> {
    let Some(rec) = record else {
        return Text::raw("No applications match the current view");
    };

    let mut lines: Vec<Line> = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("{} - {}", rec.company, rec.position),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(Span::styled(
        format!("Status: {}", rec.status.label()),
        Style::default().fg(status_color(rec.status)),
    )));
    if !rec.location.is_empty() {
        lines.push(Line::from(format!("Location: {}", rec.location)));
    }
    lines.push(Line::from(format!("Date: {}", rec.date_only())));
    if !rec.salary.is_empty() {
        lines.push(Line::from(format!("Salary: {}", rec.salary)));
    }

    if !rec.notes.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Notes",
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for line in textwrap::fill(&rec.notes, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
    }

    Text::from(lines)
}

fn draw_form(frame: &mut Frame, state: &UiState) {
    let area = centered_rect(60, 13, frame.area());
    frame.render_widget(Clear, area);

    let title = match state.form.mode() {
        Mode::Editing(_) => " Edit Application ",
        _ => " Add Application ",
    };

    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in Field::ALL.iter().enumerate() {
        let value = state.form.get(*field);
        let shown = if *field == Field::Status {
            state.form.draft().status.label().to_string()
        } else {
            value
        };
        let style = if i == state.form_field {
            Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!(" {:<9} {}", field.label(), shown),
            style,
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        " Tab:next field  Left/Right:status  Enter:save  Esc:cancel",
        Style::default().fg(Color::DarkGray),
    )));

    let form = Paragraph::new(Text::from(lines))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(form, area);
}

fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}
