//! Pointer-driven edit sessions: press opens one, drag previews it, release
//! turns it into an [`Edit`] (or nothing) and always returns to idle.

use chrono::NaiveDate;
use uuid::Uuid;

use super::layout::{HitZone, Point, RowLayout};
use crate::config::Role;
use crate::model::TimelineMapper;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Move,
    ResizeStart,
    ResizeEnd,
    CreateLink,
}

impl From<HitZone> for InteractionKind {
    fn from(zone: HitZone) -> Self {
        match zone {
            HitZone::Body => InteractionKind::Move,
            HitZone::StartHandle => InteractionKind::ResizeStart,
            HitZone::EndHandle => InteractionKind::ResizeEnd,
            HitZone::LinkKnob => InteractionKind::CreateLink,
        }
    }
}

/// Snapshot taken on press. Geometry is chart-local pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InteractionSession {
    pub kind: InteractionKind,
    pub subject: Uuid,
    pub origin_pointer_x: f32,
    pub origin_start_x: f32,
    pub origin_width: f32,
    pub link_origin: Option<Point>,
    /// Latest pointer position seen.
    pub pointer: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionState {
    #[default]
    Idle,
    Active(InteractionSession),
}

/// Transient overlay for an in-progress session. Never written to tasks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Preview {
    Bar {
        task_id: Uuid,
        x_start: f32,
        width: f32,
    },
    Link {
        from: Uuid,
        start: Point,
        end: Point,
    },
}

/// A validated edit produced by a released session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Reschedule {
        task_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },
    /// Make `to` depend on `from`.
    Link { from: Uuid, to: Uuid },
}

#[derive(Debug, Default)]
pub struct Interaction {
    state: InteractionState,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, InteractionState::Idle)
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        match &self.state {
            InteractionState::Active(session) => Some(session),
            InteractionState::Idle => None,
        }
    }

    /// Whether `role` may start `kind` on `row`. Milestones can only be
    /// linked.
    pub fn may_start(kind: InteractionKind, row: &RowLayout, role: Role) -> bool {
        role.can_edit_schedule() && (kind == InteractionKind::CreateLink || !row.is_milestone)
    }

    /// Open a session. Ignored (returns `false`) while another session is
    /// active or when the role/milestone gate refuses.
    pub fn press(
        &mut self,
        kind: InteractionKind,
        row: &RowLayout,
        pointer: Point,
        link_origin: Point,
        role: Role,
    ) -> bool {
        if !self.is_idle() {
            tracing::debug!("press ignored: a session is already active");
            return false;
        }
        if !Self::may_start(kind, row, role) {
            tracing::debug!(?kind, task = %row.task_id, ?role, "press refused");
            return false;
        }

        self.state = InteractionState::Active(InteractionSession {
            kind,
            subject: row.task_id,
            origin_pointer_x: pointer.x,
            origin_start_x: row.position.x_start,
            origin_width: row.position.width,
            link_origin: (kind == InteractionKind::CreateLink).then_some(link_origin),
            pointer,
        });
        true
    }

    /// Track the pointer and return the snapped candidate geometry.
    pub fn drag(&mut self, pointer: Point, mapper: &TimelineMapper) -> Option<Preview> {
        match &mut self.state {
            InteractionState::Active(session) => {
                session.pointer = pointer;
            }
            InteractionState::Idle => return None,
        }
        self.preview(mapper)
    }

    pub fn preview(&self, mapper: &TimelineMapper) -> Option<Preview> {
        let session = self.session()?;
        if session.kind == InteractionKind::CreateLink {
            return Some(Preview::Link {
                from: session.subject,
                start: session.link_origin.unwrap_or(session.pointer),
                end: session.pointer,
            });
        }
        let (x_start, width) = candidate(session, mapper);
        Some(Preview::Bar {
            task_id: session.subject,
            x_start,
            width: width.max(0.0),
        })
    }

    /// Close the session. `target` is the task under the release point, if
    /// any; it only matters for links. Returns `None` when the edit is
    /// rejected or changes nothing.
    pub fn release(
        &mut self,
        pointer: Point,
        target: Option<Uuid>,
        mapper: &TimelineMapper,
    ) -> Option<Edit> {
        let InteractionState::Active(mut session) = std::mem::take(&mut self.state) else {
            return None;
        };
        session.pointer = pointer;

        if session.kind == InteractionKind::CreateLink {
            return match target {
                Some(to) if to != session.subject => Some(Edit::Link {
                    from: session.subject,
                    to,
                }),
                _ => {
                    tracing::debug!(task = %session.subject, "link released without a target");
                    None
                }
            };
        }

        let origin_start = mapper.x_to_date(session.origin_start_x);
        let origin_end = mapper.x_to_date(session.origin_start_x + session.origin_width);
        let (x_start, width) = candidate(&session, mapper);
        let new_start = mapper.x_to_date(x_start);
        let new_end = mapper.x_to_date(x_start + width);

        let (start, end) = match session.kind {
            InteractionKind::Move => (new_start, new_start + (origin_end - origin_start)),
            InteractionKind::ResizeStart => {
                if new_start >= origin_end {
                    tracing::debug!(task = %session.subject, "resize rejected: start not before end");
                    return None;
                }
                (new_start, origin_end)
            }
            InteractionKind::ResizeEnd => {
                if new_end <= origin_start {
                    tracing::debug!(task = %session.subject, "resize rejected: end not after start");
                    return None;
                }
                (origin_start, new_end)
            }
            InteractionKind::CreateLink => return None,
        };

        if start == origin_start && end == origin_end {
            return None;
        }
        Some(Edit::Reschedule {
            task_id: session.subject,
            start,
            end,
        })
    }
}

/// Snapped `(x_start, width)` for a bar session.
fn candidate(session: &InteractionSession, mapper: &TimelineMapper) -> (f32, f32) {
    let dx = mapper.snap_x(session.pointer.x - session.origin_pointer_x);
    match session.kind {
        InteractionKind::Move => (session.origin_start_x + dx, session.origin_width),
        InteractionKind::ResizeStart => (session.origin_start_x + dx, session.origin_width - dx),
        InteractionKind::ResizeEnd => (session.origin_start_x, session.origin_width + dx),
        InteractionKind::CreateLink => (session.origin_start_x, session.origin_width),
    }
}
