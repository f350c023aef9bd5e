use ratatui::{
    Frame,
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span, Text},
    widgets::{Block, Cell, Clear, Paragraph, Row, Table, Widget, Wrap},
};

use crate::catalog::StickySide;
use crate::model::{HeaderView, Model, UIData};

pub const STATUSLINE_HEIGHT: usize = 1;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const COLUMN_WIDTH_MARGIN: usize = 2;
pub const MAX_COLUMN_WIDTH: usize = 40;

#[derive(Debug, Default)]
pub struct TableUI {}

impl TableUI {
    pub fn new() -> Self {
        Self {}
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        render_table(&uidata, table_area, frame.buffer_mut());
        render_statusline(&uidata, status_area, frame.buffer_mut());

        if uidata.show_settings {
            render_settings(&uidata, centered_rect(50, 70, frame.area()), frame.buffer_mut());
        }
        if uidata.show_popup {
            render_popup(&uidata, centered_rect(70, 70, frame.area()), frame.buffer_mut());
        }
    }
}

fn header_label(header: &HeaderView) -> String {
    match header.sticky {
        Some(StickySide::Left) => format!("{} ⇤", header.label),
        Some(StickySide::Right) => format!("⇥ {}", header.label),
        None => header.label.clone(),
    }
}

fn render_table(uidata: &UIData, area: Rect, buf: &mut Buffer) {
    let header = Row::new(uidata.headers.iter().enumerate().map(|(idx, h)| {
        let mut style = Style::default().add_modifier(Modifier::BOLD);
        if idx == uidata.selected_column {
            style = style.add_modifier(Modifier::REVERSED);
        }
        if h.dragged {
            style = style.add_modifier(Modifier::DIM | Modifier::ITALIC);
        }
        if h.hovered {
            style = style.on_blue();
        }
        Cell::from(header_label(h)).style(style)
    }))
    .height(TABLE_HEADER_HEIGHT as u16);

    let rows = uidata.rows.iter().enumerate().map(|(ridx, row)| {
        let cells = row.iter().enumerate().map(|(cidx, value)| {
            let cell = Cell::from(value.as_str());
            if ridx == uidata.selected_row && cidx == uidata.selected_column {
                cell.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                cell
            }
        });
        let row = Row::new(cells);
        if ridx == uidata.selected_row {
            row.style(Style::default().add_modifier(Modifier::UNDERLINED))
        } else {
            row
        }
    });

    let widths = uidata
        .headers
        .iter()
        .map(|h| Constraint::Length(h.width as u16));

    Widget::render(Table::new(rows, widths).header(header).column_spacing(1), area, buf);
}

fn render_statusline(uidata: &UIData, area: Rect, buf: &mut Buffer) {
    let line = Line::from(vec![
        Span::from(format!(" {} ", uidata.name)).bold().reversed(),
        Span::from(format!(" {} ", uidata.column_indicator)).yellow(),
        Span::from(format!(
            " row {}/{} ",
            uidata.abs_selected_row + 1,
            uidata.nrows
        )),
        Span::from(format!(" v: {} ", uidata.quick_toggle)).blue(),
        Span::from(format!(" {} ", uidata.status_message)),
        Span::from(" ?: help ").blue().bold(),
    ]);
    Paragraph::new(line).render(area, buf);
}

fn render_settings(uidata: &UIData, area: Rect, buf: &mut Buffer) {
    let lines: Vec<Line> = uidata
        .settings
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mark = if entry.visible { "[x]" } else { "[ ]" };
            let line = Line::from(format!(" {mark} {}", entry.label));
            if idx == uidata.settings_cursor {
                line.reversed()
            } else if entry.visible {
                line
            } else {
                line.dim()
            }
        })
        .collect();

    let block = Block::bordered()
        .title(Line::from(" Toggle Columns ".bold()).centered())
        .title_bottom(
            Line::from(vec![
                " space ".blue().bold(),
                "toggle ".into(),
                " a ".blue().bold(),
                "all ".into(),
                " c ".blue().bold(),
                "compact ".into(),
                " r ".blue().bold(),
                "reset ".into(),
                " esc ".blue().bold(),
                "close ".into(),
            ])
            .centered(),
        )
        .border_set(border::THICK);

    Clear.render(area, buf);
    Paragraph::new(Text::from(lines)).block(block).render(area, buf);
}

fn render_popup(uidata: &UIData, area: Rect, buf: &mut Buffer) {
    let block = Block::bordered()
        .title(Line::from(" Help ".bold()).centered())
        .border_set(border::THICK);
    Clear.render(area, buf);
    Paragraph::new(uidata.popup_message.as_str())
        .wrap(Wrap { trim: false })
        .block(block)
        .render(area, buf);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
