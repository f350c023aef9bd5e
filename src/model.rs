use std::time::Instant;
use tracing::{debug, info, trace};

use crate::catalog::StickySide;
use crate::columns::ColumnVisibilityController;
use crate::data::DataSet;
use crate::domain::{HELP_TEXT, Message};
use crate::drag::{DragOutcome, DragState};
use crate::ui::{COLUMN_WIDTH_MARGIN, MAX_COLUMN_WIDTH, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT};

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    SETTINGS,
    POPUP,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeaderView {
    pub id: String,
    pub label: String,
    pub width: usize,
    pub sticky: Option<StickySide>,
    pub dragged: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SettingsEntry {
    pub label: String,
    pub visible: bool,
}

/// Everything the ui needs to draw one frame.
pub struct UIData {
    pub name: String,
    pub headers: Vec<HeaderView>,
    pub rows: Vec<Vec<String>>,
    pub nrows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub column_indicator: String,
    pub quick_toggle: &'static str,
    pub show_popup: bool,
    pub popup_message: String,
    pub show_settings: bool,
    pub settings: Vec<SettingsEntry>,
    pub settings_cursor: usize,
    pub status_message: String,
    pub last_status_message_update: Instant,
}

#[derive(Default, Clone, Debug)]
pub struct UILayout {
    pub width: usize,
    pub height: usize,
    pub table_height: usize,
}

impl UILayout {
    pub fn from_values(ui_width: usize, ui_height: usize) -> Self {
        let layout = UILayout {
            width: ui_width,
            height: ui_height,
            table_height: ui_height.saturating_sub(STATUSLINE_HEIGHT + TABLE_HEADER_HEIGHT),
        };
        trace!("Build UILayout: {:?}", layout);
        layout
    }
}

pub struct Model {
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    data: DataSet,
    columns: ColumnVisibilityController,
    selected_id: Option<String>,
    curser_row: usize,
    offset_row: usize,
    settings_cursor: usize,
    uilayout: UILayout,
    status_message: String,
    last_status_message_update: Instant,
}

impl Model {
    pub fn init(
        data: DataSet,
        columns: ColumnVisibilityController,
        ui_width: usize,
        ui_height: usize,
    ) -> Self {
        let mut model = Self {
            status: Status::READY,
            modus: Modus::TABLE,
            previous_modus: Modus::TABLE,
            data,
            columns,
            selected_id: None,
            curser_row: 0,
            offset_row: 0,
            settings_cursor: 0,
            uilayout: UILayout::from_values(ui_width, ui_height),
            status_message: String::new(),
            last_status_message_update: Instant::now(),
        };
        model.fix_selection(0);
        let message = format!(
            "Loaded {} rows, {}",
            model.data.nrows(),
            model.column_indicator()
        );
        model.set_status_message(message);
        model
    }

    pub fn columns(&self) -> &ColumnVisibilityController {
        &self.columns
    }

    pub fn selected_column(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.last_status_message_update = Instant::now();
    }

    fn column_indicator(&self) -> String {
        format!(
            "Showing {} of {} columns",
            self.columns.visible_count(),
            self.columns.total_count()
        )
    }

    fn visible_ids(&self) -> Vec<String> {
        self.columns
            .ordered_visible_columns()
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    fn selected_index(&self) -> Option<usize> {
        let id = self.selected_id.as_deref()?;
        self.visible_ids().iter().position(|v| v == id)
    }

    // Keep the selection on a visible column, close to where it was.
    fn fix_selection(&mut self, previous_index: usize) {
        let visible = self.visible_ids();
        if self
            .selected_id
            .as_ref()
            .is_some_and(|id| visible.contains(id))
        {
            return;
        }
        self.selected_id = visible
            .get(previous_index.min(visible.len().saturating_sub(1)))
            .cloned();
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn ui_resize(&mut self, width: usize, height: usize) {
        trace!(
            "UI was resized! w:{}->{}, h:{}->{}",
            self.uilayout.width, width, self.uilayout.height, height
        );
        self.uilayout = UILayout::from_values(width, height);
        self.curser_row = self
            .curser_row
            .min(self.uilayout.table_height.saturating_sub(1));
    }

    pub fn update(&mut self, message: Option<Message>) {
        let Some(msg) = message else {
            return;
        };
        match self.modus {
            Modus::TABLE => match msg {
                Message::Quit => self.quit(),
                Message::Help => self.show_help(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::MoveLeft => self.move_column_selection(-1),
                Message::MoveRight => self.move_column_selection(1),
                Message::MoveUp => self.move_table_selection_up(1),
                Message::MoveDown => self.move_table_selection_down(1),
                Message::ToggleColumn => self.toggle_selected_column(),
                Message::ShowAllColumns => self.show_all_columns(),
                Message::CompactView => self.show_compact_view(),
                Message::QuickToggle => self.quick_toggle(),
                Message::ResetColumns => self.reset_columns(),
                Message::MoveColumnLeft => self.move_selected_column(-1),
                Message::MoveColumnRight => self.move_selected_column(1),
                Message::StartDrag => self.start_drag(),
                Message::Enter => self.enter(),
                Message::Exit => self.exit(),
                Message::Settings => self.open_settings(),
            },
            Modus::SETTINGS => match msg {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::MoveUp => self.move_settings_selection(-1),
                Message::MoveDown => self.move_settings_selection(1),
                Message::ToggleColumn | Message::Enter => self.toggle_settings_column(),
                Message::ShowAllColumns => self.show_all_columns(),
                Message::CompactView => self.show_compact_view(),
                Message::QuickToggle => self.quick_toggle(),
                Message::ResetColumns => self.reset_columns(),
                Message::Exit | Message::Settings => self.exit(),
                _ => (),
            },
            Modus::POPUP => match msg {
                Message::Quit => self.quit(),
                Message::Resize(width, height) => self.ui_resize(width, height),
                Message::Exit | Message::Enter | Message::Help => self.exit(),
                _ => (),
            },
        }
    }

    // -------------------- Control handling functions ---------------------- //

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::POPUP;
    }

    fn open_settings(&mut self) {
        if self.columns.drag_state() != &DragState::Idle {
            self.columns.drag_end();
        }
        self.previous_modus = self.modus;
        self.modus = Modus::SETTINGS;
        self.settings_cursor = self
            .settings_cursor
            .min(self.columns.total_count().saturating_sub(1));
    }

    fn enter(&mut self) {
        let Some(id) = self.selected_id.clone() else {
            return;
        };
        match self.columns.drop_on(&id) {
            DragOutcome::Committed { source, .. } => {
                self.selected_id = Some(source.clone());
                self.set_status_message(format!("Moved column {source}"));
            }
            DragOutcome::Cancelled => self.set_status_message("Drag cancelled"),
            _ => (),
        }
    }

    fn exit(&mut self) {
        match self.modus {
            Modus::TABLE => {
                if self.columns.drag_end() == DragOutcome::Cancelled {
                    self.set_status_message("Drag cancelled");
                }
            }
            Modus::SETTINGS | Modus::POPUP => {
                trace!("Close {:?} ...", self.modus);
                self.modus = self.previous_modus;
                self.previous_modus = Modus::TABLE;
            }
        }
    }

    fn column_command<F>(&mut self, command: F, message: &str)
    where
        F: FnOnce(&mut ColumnVisibilityController) -> bool,
    {
        let previous = self.selected_index().unwrap_or(0);
        if command(&mut self.columns) {
            info!("{message}");
            self.fix_selection(previous);
        }
        let status = format!("{message}: {}", self.column_indicator());
        self.set_status_message(status);
    }

    fn show_all_columns(&mut self) {
        self.column_command(|c| c.show_all_columns(), "All columns shown");
    }

    fn show_compact_view(&mut self) {
        self.column_command(|c| c.show_compact_view(), "Compact view");
    }

    fn reset_columns(&mut self) {
        self.column_command(|c| c.reset_to_defaults(), "Columns reset to defaults");
    }

    fn quick_toggle(&mut self) {
        let label = self.columns.quick_toggle_label();
        self.column_command(|c| c.toggle_show_all_or_compact(), label);
    }

    fn toggle_selected_column(&mut self) {
        let Some(id) = self.selected_id.clone() else {
            return;
        };
        if self.columns.catalog().get(&id).is_some_and(|c| !c.can_hide) {
            self.set_status_message(format!("Column {id} cannot be hidden"));
            return;
        }
        self.column_command(|c| c.toggle(&id), &format!("Toggled {id}"));
    }

    fn toggle_settings_column(&mut self) {
        let Some(id) = self
            .columns
            .hideable_columns()
            .get(self.settings_cursor)
            .map(|c| c.id.clone())
        else {
            return;
        };
        self.column_command(|c| c.toggle(&id), &format!("Toggled {id}"));
    }

    fn move_settings_selection(&mut self, step: isize) {
        let last = self.columns.total_count().saturating_sub(1) as isize;
        self.settings_cursor = (self.settings_cursor as isize + step).clamp(0, last) as usize;
    }

    fn move_column_selection(&mut self, step: isize) {
        let visible = self.visible_ids();
        if visible.is_empty() {
            return;
        }
        let current = self.selected_index().unwrap_or(0) as isize;
        let next = (current + step).clamp(0, visible.len() as isize - 1) as usize;
        let id = visible[next].clone();
        if self.columns.drag_state() != &DragState::Idle {
            self.columns.drag_enter(&id);
        }
        self.selected_id = Some(id);
    }

    // Swap places with the neighbouring visible column.
    fn move_selected_column(&mut self, step: isize) {
        let Some(current) = self.selected_index() else {
            return;
        };
        let visible = self.visible_ids();
        let neighbour = current as isize + step;
        if neighbour < 0 || neighbour as usize >= visible.len() {
            return;
        }
        let pref = self.columns.preference();
        let (Some(from), Some(to)) = (
            pref.position(&visible[current]),
            pref.position(&visible[neighbour as usize]),
        ) else {
            return;
        };
        if self.columns.move_column(from, to) {
            debug!("Moved {} by {step}", visible[current]);
            self.set_status_message(format!("Moved column {}", visible[current]));
        } else {
            self.set_status_message(format!("Column {} is pinned", visible[current]));
        }
    }

    fn start_drag(&mut self) {
        let Some(id) = self.selected_id.clone() else {
            return;
        };
        match self.columns.drag_start(&id) {
            DragOutcome::Pending => self.set_status_message(format!(
                "Dragging {id}: ←/→ pick target, enter to drop, esc to cancel"
            )),
            _ => self.set_status_message(format!("Column {id} is pinned")),
        }
    }

    fn move_table_selection_up(&mut self, size: usize) {
        if self.curser_row > 0 {
            self.curser_row = self.curser_row.saturating_sub(size);
        } else if self.offset_row > 0 {
            self.offset_row = self.offset_row.saturating_sub(size);
        }
    }

    fn move_table_selection_down(&mut self, size: usize) {
        let nrows = self.data.nrows();
        if self.curser_row + self.offset_row + 1 >= nrows {
            return;
        }
        if self.curser_row + 1 < self.uilayout.table_height {
            self.curser_row += size;
        } else {
            self.offset_row += size;
        }
    }

    // -------------------- Rendering data ---------------------- //

    fn column_width(&self, id: &str, label: &str) -> usize {
        let data_width = self.data.column(id).map(|c| c.max_width).unwrap_or(1);
        std::cmp::min(
            std::cmp::max(label.chars().count(), data_width) + COLUMN_WIDTH_MARGIN,
            MAX_COLUMN_WIDTH,
        )
    }

    pub fn get_uidata(&self) -> UIData {
        let drag = self.columns.drag_state();
        let headers: Vec<HeaderView> = self
            .columns
            .ordered_visible_columns()
            .into_iter()
            .map(|c| HeaderView {
                id: c.id.clone(),
                label: c.label.clone(),
                width: self.column_width(&c.id, &c.label),
                sticky: c.sticky,
                dragged: drag.source() == Some(c.id.as_str()),
                hovered: drag.target() == Some(c.id.as_str()),
            })
            .collect();

        let nrows = self.data.nrows();
        let rbegin = self.offset_row.min(nrows);
        let rend = std::cmp::min(rbegin + self.uilayout.table_height, nrows);
        let rows = (rbegin..rend)
            .map(|r| {
                headers
                    .iter()
                    .map(|h| {
                        self.data
                            .column(&h.id)
                            .and_then(|c| c.data.get(r).cloned())
                            .unwrap_or_else(|| "-".to_string())
                    })
                    .collect()
            })
            .collect();

        UIData {
            name: self.data.name.clone(),
            headers,
            rows,
            nrows,
            selected_row: self.curser_row,
            selected_column: self.selected_index().unwrap_or(0),
            abs_selected_row: self.offset_row + self.curser_row,
            column_indicator: self.column_indicator(),
            quick_toggle: self.columns.quick_toggle_label(),
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
            show_settings: self.modus == Modus::SETTINGS,
            settings: self
                .columns
                .hideable_columns()
                .into_iter()
                .map(|c| SettingsEntry {
                    label: c.label.clone(),
                    visible: self.columns.is_visible(&c.id),
                })
                .collect(),
            settings_cursor: self.settings_cursor,
            status_message: self.status_message.clone(),
            last_status_message_update: self.last_status_message_update,
        }
    }
}
