//! Drag-to-reorder protocol for column headers.
//!
//! The machine only tracks which header is dragged and which one is hovered. It never
//! touches the column order itself: a successful drop reports a [`DragOutcome::Committed`]
//! and the owner performs the move.

use tracing::trace;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        source: String,
    },
    HoverTarget {
        source: String,
        target: String,
    },
}

impl DragState {
    pub fn source(&self) -> Option<&str> {
        match self {
            DragState::Idle => None,
            DragState::Dragging { source } | DragState::HoverTarget { source, .. } => Some(source),
        }
    }

    pub fn target(&self) -> Option<&str> {
        match self {
            DragState::HoverTarget { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragOutcome {
    /// The drag is still in flight.
    Pending,
    Committed { source: String, target: String },
    Cancelled,
    /// The event did not apply to the current state.
    Ignored,
}

#[derive(Debug, Default)]
pub struct DragReorder {
    state: DragState,
}

impl DragReorder {
    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_dragging(&self) -> bool {
        self.state != DragState::Idle
    }

    /// `draggable` is false for pinned or unknown headers; such a start leaves the machine idle.
    /// Starting while another drag is in flight replaces it.
    pub fn drag_start(&mut self, id: &str, draggable: bool) -> DragOutcome {
        if !draggable {
            trace!("Drag start on non draggable column {id}");
            self.state = DragState::Idle;
            return DragOutcome::Ignored;
        }
        self.state = DragState::Dragging {
            source: id.to_string(),
        };
        DragOutcome::Pending
    }

    pub fn drag_enter(&mut self, id: &str) -> DragOutcome {
        let Some(source) = self.state.source().map(str::to_string) else {
            return DragOutcome::Ignored;
        };
        self.state = if source == id {
            DragState::Dragging { source }
        } else {
            DragState::HoverTarget {
                source,
                target: id.to_string(),
            }
        };
        DragOutcome::Pending
    }

    pub fn drag_leave(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::HoverTarget { source, .. } => {
                self.state = DragState::Dragging { source };
                DragOutcome::Pending
            }
            other => {
                let outcome = if other == DragState::Idle {
                    DragOutcome::Ignored
                } else {
                    DragOutcome::Pending
                };
                self.state = other;
                outcome
            }
        }
    }

    pub fn drop_on(&mut self, id: &str) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragOutcome::Ignored,
            DragState::Dragging { source } | DragState::HoverTarget { source, .. } => {
                if source == id {
                    DragOutcome::Cancelled
                } else {
                    DragOutcome::Committed {
                        source,
                        target: id.to_string(),
                    }
                }
            }
        }
    }

    pub fn drag_end(&mut self) -> DragOutcome {
        match std::mem::take(&mut self.state) {
            DragState::Idle => DragOutcome::Ignored,
            _ => DragOutcome::Cancelled,
        }
    }
}
