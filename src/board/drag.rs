//! Drag interaction state machine.
//!
//! The interaction layer reports session-scoped wrapper ids, not domain
//! ids, so every transition re-derives domain identity through a lookup
//! rebuilt per drag session. A raw target may be a registered wrapper
//! id, a composite `prefix:wrapped` string, a bare column name, or a
//! bare job UUID; anything else clears the hover state or cancels the
//! drop, silently — an unresolvable target is indistinguishable from no
//! drop at all.

use std::collections::HashMap;
use std::str::FromStr;

use uuid::Uuid;

use super::models::{BoardColumn, JobId};

/// A raw target resolved down to domain terms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedTarget {
    Column(BoardColumn),
    Card { id: JobId, column: BoardColumn },
}

/// Where the drag currently stands.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragState {
    Idle,
    Dragging { picked: JobId },
    Hovering {
        picked: JobId,
        over: Option<ResolvedTarget>,
    },
}

/// The settled result of a drop: which column, and which card to insert
/// before (`None` appends).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropPlan {
    pub picked: JobId,
    pub column: BoardColumn,
    pub insert_before: Option<JobId>,
}

/// Outcome of ending a drag. A cancelled gesture never reaches the
/// network layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DragOutcome {
    Cancelled,
    Dropped(DropPlan),
}

/// One drag gesture's worth of state. Construct fresh per session and
/// register the board's current cards and columns before picking.
#[derive(Debug, Default)]
pub struct DragSession {
    lookup: HashMap<String, ResolvedTarget>,
    state: DragState,
}

impl Default for DragState {
    fn default() -> Self {
        Self::Idle
    }
}

impl DragSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    /// Map a wrapper id onto a card.
    pub fn register_card(&mut self, raw_id: impl Into<String>, id: JobId, column: BoardColumn) {
        self.lookup
            .insert(raw_id.into(), ResolvedTarget::Card { id, column });
    }

    /// Map a wrapper id onto a column.
    pub fn register_column(&mut self, raw_id: impl Into<String>, column: BoardColumn) {
        self.lookup
            .insert(raw_id.into(), ResolvedTarget::Column(column));
    }

    /// Normalize a raw target down to a domain target.
    pub fn resolve(&self, raw: &str) -> Option<ResolvedTarget> {
        if let Some(target) = self.resolve_exact(raw) {
            return Some(target);
        }
        // Composite ids keep the domain part after the last separator.
        for sep in [':', '/'] {
            if let Some((_, suffix)) = raw.rsplit_once(sep) {
                if let Some(target) = self.resolve_exact(suffix) {
                    return Some(target);
                }
            }
        }
        None
    }

    fn resolve_exact(&self, raw: &str) -> Option<ResolvedTarget> {
        if let Some(target) = self.lookup.get(raw) {
            return Some(*target);
        }
        if let Ok(column) = BoardColumn::from_str(raw) {
            return Some(ResolvedTarget::Column(column));
        }
        // A bare UUID counts only if it names a card registered this
        // session; raw ids are never trusted to be domain ids.
        if let Ok(uuid) = Uuid::parse_str(raw) {
            return self
                .lookup
                .values()
                .find(|t| matches!(t, ResolvedTarget::Card { id, .. } if *id == uuid))
                .copied();
        }
        None
    }

    /// Start a drag. Resolving the raw id to a card moves the session to
    /// `Dragging`; anything else leaves it idle and returns `None`.
    pub fn pick(&mut self, raw_id: &str) -> Option<JobId> {
        match self.resolve(raw_id) {
            Some(ResolvedTarget::Card { id, .. }) => {
                self.state = DragState::Dragging { picked: id };
                Some(id)
            }
            _ => {
                self.state = DragState::Idle;
                None
            }
        }
    }

    /// Update the hovered target. Unrecognized targets clear the hover
    /// rather than carrying a stale one into the drop.
    pub fn hover(&mut self, raw_id: &str) {
        let picked = match self.state {
            DragState::Dragging { picked } | DragState::Hovering { picked, .. } => picked,
            DragState::Idle => return,
        };
        self.state = DragState::Hovering {
            picked,
            over: self.resolve(raw_id),
        };
    }

    /// End the drag on the given raw target. Always returns the session
    /// to `Idle`.
    pub fn drop_on(&mut self, raw_id: &str) -> DragOutcome {
        let picked = match self.state {
            DragState::Dragging { picked } | DragState::Hovering { picked, .. } => picked,
            DragState::Idle => return DragOutcome::Cancelled,
        };
        self.state = DragState::Idle;

        match self.resolve(raw_id) {
            Some(ResolvedTarget::Column(column)) => DragOutcome::Dropped(DropPlan {
                picked,
                column,
                insert_before: None,
            }),
            Some(ResolvedTarget::Card { id, column }) => {
                if id == picked {
                    // Dropping a card on itself is a no-op gesture.
                    DragOutcome::Cancelled
                } else {
                    DragOutcome::Dropped(DropPlan {
                        picked,
                        column,
                        insert_before: Some(id),
                    })
                }
            }
            None => DragOutcome::Cancelled,
        }
    }

    /// Abort the drag with no network effect.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_board() -> (DragSession, JobId, JobId) {
        let mut session = DragSession::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        session.register_card("wrap-101", a, BoardColumn::Monday);
        session.register_card("wrap-102", b, BoardColumn::Friday);
        session.register_column("lane-mon", BoardColumn::Monday);
        session.register_column("lane-fri", BoardColumn::Friday);
        (session, a, b)
    }

    #[test]
    fn test_resolve_wrapper_composite_and_bare_forms() {
        let (session, a, _) = session_with_board();
        assert_eq!(
            session.resolve("wrap-101"),
            Some(ResolvedTarget::Card {
                id: a,
                column: BoardColumn::Monday
            })
        );
        assert_eq!(
            session.resolve("sortable:wrap-101"),
            Some(ResolvedTarget::Card {
                id: a,
                column: BoardColumn::Monday
            })
        );
        assert_eq!(
            session.resolve("friday"),
            Some(ResolvedTarget::Column(BoardColumn::Friday))
        );
        assert_eq!(
            session.resolve(&a.to_string()),
            Some(ResolvedTarget::Card {
                id: a,
                column: BoardColumn::Monday
            })
        );
        assert_eq!(session.resolve("garbage-999"), None);
        // Unregistered UUIDs are never trusted as domain ids.
        assert_eq!(session.resolve(&Uuid::new_v4().to_string()), None);
    }

    #[test]
    fn test_pick_requires_a_card() {
        let (mut session, a, _) = session_with_board();
        assert_eq!(session.pick("lane-mon"), None);
        assert_eq!(session.state(), DragState::Idle);
        assert_eq!(session.pick("wrap-101"), Some(a));
        assert_eq!(session.state(), DragState::Dragging { picked: a });
    }

    #[test]
    fn test_unrecognized_hover_clears_target() {
        let (mut session, a, b) = session_with_board();
        session.pick("wrap-101");
        session.hover("wrap-102");
        assert_eq!(
            session.state(),
            DragState::Hovering {
                picked: a,
                over: Some(ResolvedTarget::Card {
                    id: b,
                    column: BoardColumn::Friday
                })
            }
        );
        session.hover("placeholder-xyz");
        assert_eq!(
            session.state(),
            DragState::Hovering {
                picked: a,
                over: None
            }
        );
    }

    #[test]
    fn test_drop_on_column_appends() {
        let (mut session, a, _) = session_with_board();
        session.pick("wrap-101");
        let outcome = session.drop_on("lane-fri");
        assert_eq!(
            outcome,
            DragOutcome::Dropped(DropPlan {
                picked: a,
                column: BoardColumn::Friday,
                insert_before: None
            })
        );
        assert_eq!(session.state(), DragState::Idle);
    }

    #[test]
    fn test_drop_on_card_inserts_before_it() {
        let (mut session, a, b) = session_with_board();
        session.pick("wrap-101");
        let outcome = session.drop_on("wrap-102");
        assert_eq!(
            outcome,
            DragOutcome::Dropped(DropPlan {
                picked: a,
                column: BoardColumn::Friday,
                insert_before: Some(b)
            })
        );
    }

    #[test]
    fn test_drop_on_self_cancels() {
        let (mut session, _, _) = session_with_board();
        session.pick("wrap-101");
        assert_eq!(session.drop_on("wrap-101"), DragOutcome::Cancelled);
        assert_eq!(session.state(), DragState::Idle);
    }

    #[test]
    fn test_drop_outside_board_cancels() {
        let (mut session, _, _) = session_with_board();
        session.pick("wrap-101");
        assert_eq!(session.drop_on("overlay-root"), DragOutcome::Cancelled);
    }

    #[test]
    fn test_drop_without_pick_cancels() {
        let (mut session, _, _) = session_with_board();
        assert_eq!(session.drop_on("lane-mon"), DragOutcome::Cancelled);
    }
}
