use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{
        Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Scrollbar, ScrollbarOrientation,
        Wrap,
    },
};

use super::app::App;
use super::models::{Focus, FormField, ProcessingStatus};

pub fn ui(f: &mut Frame, app: &App) {
    let size = f.area();

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(size);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(3),
        ])
        .split(chunks[0]);

    render_header(f, left[0], app);
    render_file_list(f, left[1], app);
    render_status_bar(f, left[2], app);

    if app.show_preview {
        let right = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(FormField::ALL.len() as u16 + 2), Constraint::Min(4)])
            .split(chunks[1]);
        render_form(f, right[0], app);
        render_preview_panel(f, right[1], app);
    } else {
        render_form(f, chunks[1], app);
    }

    if app.show_help {
        render_help_popup(f);
    }
}

fn border_style(active: bool) -> Style {
    if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Blue)
    }
}

pub fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let title = if app.store.is_processing() {
        "Video Rename - Processing...".to_string()
    } else if app.finished {
        "Video Rename - Completed!".to_string()
    } else {
        format!(
            "Video Rename - {} file(s), {} selected",
            app.store.total_files(),
            app.store.selected_count()
        )
    };

    let header = Paragraph::new(title)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(header, area);
}

pub fn render_file_list(f: &mut Frame, area: Rect, app: &App) {
    let items: Vec<ListItem> = app
        .store
        .files()
        .iter()
        .map(|file| {
            let mark = if file.selected { "[x]" } else { "[ ]" };
            let (badge, color) = match app.statuses.get(&file.id).map(|s| &s.status) {
                Some(ProcessingStatus::Success) => ("[DONE]", Color::Green),
                Some(ProcessingStatus::Error) => ("[ERROR]", Color::Red),
                Some(ProcessingStatus::Skipped) => ("[SKIP]", Color::Gray),
                Some(ProcessingStatus::Pending) | None => ("", Color::Yellow),
            };
            let episode = app
                .store
                .record(file.id)
                .and_then(|r| r.episode)
                .map(|e| format!("E{e:02} "))
                .unwrap_or_default();

            ListItem::new(Line::from(vec![
                Span::styled(format!("{mark} "), Style::default().fg(Color::Cyan)),
                Span::styled(episode, Style::default().fg(Color::DarkGray)),
                Span::styled(file.name.clone(), Style::default().fg(Color::White)),
                Span::styled(format!(" {badge}"), Style::default().fg(color)),
            ]))
        })
        .collect();

    let title = if items.is_empty() {
        "Files (none - pass paths on the command line)"
    } else {
        "Files"
    };

    let list = List::new(items)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(border_style(app.focus == Focus::Files)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.list_state.clone());

    if app.store.total_files() > area.height.saturating_sub(2) as usize {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        f.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut app.scroll_state.clone(),
        );
    }
}

pub fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let editing = app.focus == Focus::Form;
    let lines: Vec<Line> = FormField::ALL
        .iter()
        .map(|&field| {
            let active = editing && field == app.form_field;
            let value = app.form_value(field);
            let custom = match field {
                FormField::EncoderGroup if app.form.encoder_group_custom => " (custom)",
                FormField::SubtitleGroup if app.form.subtitle_group_custom => " (custom)",
                _ => "",
            };
            let label_style = if active {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let cursor = if active { "_" } else { "" };
            Line::from(vec![
                Span::styled(format!("{:<16}", field.label()), label_style),
                Span::styled(format!("{value}{cursor}"), Style::default().fg(Color::White)),
                Span::styled(custom, Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let form = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .title("Rename settings")
            .borders(Borders::ALL)
            .border_style(border_style(editing)),
    );
    f.render_widget(form, area);
}

pub fn render_preview_panel(f: &mut Frame, area: Rect, app: &App) {
    let mut lines = Vec::new();

    if let Some(file) = app.highlighted() {
        lines.push(Line::from("Original:"));
        lines.push(Line::from(Span::styled(file.name.clone(), Style::default().fg(Color::Red))));
        lines.push(Line::from("New:"));
        let new_name = app.preview_name(file.id).unwrap_or_default();
        lines.push(Line::from(Span::styled(new_name, Style::default().fg(Color::Green))));

        if let Some(error) = app.statuses.get(&file.id).and_then(|s| s.error_message.as_ref()) {
            lines.push(Line::from(Span::styled(
                format!("Error: {error}"),
                Style::default().fg(Color::Red),
            )));
        }

        if let Some((_, summary)) = app.analysis.as_ref().filter(|(id, _)| *id == file.id) {
            lines.push(Line::from(""));
            lines.push(Line::from(format!(
                "{} {} {} {}",
                summary.container, summary.resolution, summary.duration, summary.file_size
            )));
            lines.push(Line::from(format!(
                "Video: {} {} {}",
                summary.video_format, summary.frame_rate, summary.video_bit_rate
            )));
            for audio in &summary.audio {
                lines.push(Line::from(format!(
                    "Audio: {} {} {} {}",
                    audio.format, audio.channels, audio.sample_rate, audio.language
                )));
            }
        }
    }

    if !app.validation_errors.is_empty() {
        lines.push(Line::from(""));
        for error in &app.validation_errors {
            lines.push(Line::from(Span::styled(
                format!("! {error}"),
                Style::default().fg(Color::Red),
            )));
        }
    }

    let preview = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title("Preview")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Green)),
        )
        .wrap(Wrap { trim: true });
    f.render_widget(preview, area);
}

pub fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let label = if let Some(message) = &app.status_message {
        message.clone()
    } else if app.finished {
        format!(
            "Complete! {} renamed, {} failed",
            app.stats.successful, app.stats.failed
        )
    } else {
        format!("Ready to rename {} file(s)", app.target_ids().len())
    };

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title("Progress"))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(app.processing_progress.clamp(0.0, 1.0))
        .label(label);
    f.render_widget(gauge, chunks[0]);

    let controls = match app.focus {
        Focus::Form => "Tab back, Enter apply, h help",
        Focus::Files if app.finished && !app.undo_operations.is_empty() => {
            "u undo, h help, q quit"
        }
        Focus::Files => "Tab edit, r rename, h help, q quit",
    };
    let controls = Paragraph::new(controls)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Controls"));
    f.render_widget(controls, chunks[1]);
}

pub fn render_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 70, f.area());

    let help_text = vec![
        Line::from(Span::styled("Video Rename - Help", Style::default().add_modifier(Modifier::BOLD))),
        Line::from(""),
        Line::from("File list:"),
        Line::from("  Up/k Down/j  - Move"),
        Line::from("  Space        - Toggle selection"),
        Line::from("  a            - Select / deselect all"),
        Line::from("  K / J        - Move file up / down"),
        Line::from("  d/Delete     - Remove file"),
        Line::from("  c            - Clear list"),
        Line::from("  i            - Analyze file and fill the form"),
        Line::from("  e            - Apply form to this file only"),
        Line::from("  o            - Load this file's settings into the form"),
        Line::from("  Enter/r      - Rename selected (or all) files"),
        Line::from("  u            - Undo last rename run"),
        Line::from("  p            - Toggle preview"),
        Line::from(""),
        Line::from("Form:"),
        Line::from("  Up/Down      - Change field"),
        Line::from("  Left/Right   - Cycle presets"),
        Line::from("  Enter        - Apply form to all files"),
        Line::from("  Tab/Esc      - Back to file list"),
        Line::from(""),
        Line::from(Span::styled("Press Esc or h to close", Style::default().fg(Color::Gray))),
    ];

    let paragraph = Paragraph::new(help_text)
        .block(
            Block::default()
                .title("Help")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow)),
        )
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RenamerConfig;
    use crate::error::ProbeError;
    use crate::probe::{MediaProbe, ProbeReport};
    use crate::record::RenameField;
    use crate::store::RawFileEntry;
    use ratatui::{Terminal, backend::TestBackend};
    use std::path::Path;
    use std::sync::Arc;

    struct NoProbe;

    impl MediaProbe for NoProbe {
        fn name(&self) -> &'static str {
            "none"
        }

        fn probe(&self, path: &Path) -> Result<ProbeReport, ProbeError> {
            Err(ProbeError::ToolFailed {
                tool: "none".into(),
                status: "exit status: 1".into(),
                stderr: path.display().to_string(),
            })
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut text = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                text.push_str(buffer[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_files_and_preview() {
        let mut app = App::with_selected_files(
            vec![RawFileEntry::new("/videos/a.mp4", 10)],
            RenamerConfig::default(),
            Arc::new(NoProbe),
        );
        app.store.update_all_files_rename_data([
            RenameField::WorkName("Demo".into()),
            RenameField::Resolution("1080p".into()),
        ]);

        let mut terminal = Terminal::new(TestBackend::new(140, 30)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();
        let text = buffer_text(&terminal);

        assert!(text.contains("a.mp4"));
        assert!(text.contains("[Demo][1080p][S01E01].mp4"));
        assert!(text.contains("Rename settings"));
    }

    #[test]
    fn renders_help_popup() {
        let mut app = App::new(RenamerConfig::default(), Arc::new(NoProbe));
        app.toggle_help();

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|f| ui(f, &app)).unwrap();

        assert!(buffer_text(&terminal).contains("Video Rename - Help"));
    }
}
