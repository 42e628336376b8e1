//! Translation of system events into admin-facing notification text.

use super::{SystemEvent, SystemEventKind};
use crate::tracker::domain::NotificationKind;
use minijinja::{Environment, context};

/// How an admin alert message is phrased.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageStyle {
    /// Localized sentence rendered from the event details; used right after
    /// the event is recorded.
    Localized,
    /// Bracketed tag, actor and action text; used by the periodic sweep.
    SweepDigest,
}

/// Notification kind used for admin alerts about `kind`.
///
/// Returns `None` for kinds without a dedicated notification; callers fall
/// back to [`NotificationKind::CommentAdded`] and the raw action text.
#[must_use]
pub const fn mapped_notification_kind(kind: SystemEventKind) -> Option<NotificationKind> {
    match kind {
        SystemEventKind::ProjectCreated => Some(NotificationKind::ProjectCreated),
        SystemEventKind::ProjectDeleted => Some(NotificationKind::ProjectDeleted),
        SystemEventKind::TaskCreated => Some(NotificationKind::TaskCreated),
        SystemEventKind::TaskDeleted => Some(NotificationKind::TaskDeleted),
        SystemEventKind::TaskUpdated => Some(NotificationKind::TaskStatusChanged),
        SystemEventKind::CommentAdded => Some(NotificationKind::CommentAdded),
        SystemEventKind::ProjectUpdated => None,
    }
}

/// Notification kind for `kind`, with the default bucket applied.
#[must_use]
pub const fn alert_notification_kind(kind: SystemEventKind) -> NotificationKind {
    match mapped_notification_kind(kind) {
        Some(mapped) => mapped,
        None => NotificationKind::CommentAdded,
    }
}

const fn localized_template(kind: SystemEventKind) -> Option<&'static str> {
    match kind {
        SystemEventKind::ProjectCreated => Some(r#"{{ actor }} creó el proyecto "{{ project_name }}""#),
        SystemEventKind::ProjectDeleted => {
            Some(r#"{{ actor }} eliminó el proyecto "{{ project_name }}""#)
        }
        SystemEventKind::TaskCreated => Some(r#"{{ actor }} creó la tarea "{{ task_title }}""#),
        SystemEventKind::TaskUpdated => {
            Some(r#"{{ actor }} actualizó la tarea "{{ task_title }}""#)
        }
        SystemEventKind::TaskDeleted => Some(r#"{{ actor }} eliminó la tarea "{{ task_title }}""#),
        SystemEventKind::CommentAdded => {
            Some(r#"{{ actor }} comentó en la tarea "{{ task_title }}""#)
        }
        SystemEventKind::ProjectUpdated => None,
    }
}

const fn sweep_tag(kind: SystemEventKind) -> Option<&'static str> {
    match kind {
        SystemEventKind::ProjectCreated => Some("[PROYECTO CREADO]"),
        SystemEventKind::ProjectDeleted => Some("[PROYECTO ELIMINADO]"),
        SystemEventKind::TaskCreated => Some("[TAREA CREADA]"),
        SystemEventKind::TaskUpdated => Some("[TAREA ACTUALIZADA]"),
        SystemEventKind::TaskDeleted => Some("[TAREA ELIMINADA]"),
        SystemEventKind::CommentAdded => Some("[COMENTARIO AGREGADO]"),
        SystemEventKind::ProjectUpdated => None,
    }
}

/// Renders admin alert messages for system events.
#[derive(Debug)]
pub struct AlertRenderer {
    env: Environment<'static>,
    unknown_actor_label: String,
    missing_detail_label: String,
}

impl AlertRenderer {
    /// Creates a renderer with the given fallback labels.
    #[must_use]
    pub fn new(
        unknown_actor_label: impl Into<String>,
        missing_detail_label: impl Into<String>,
    ) -> Self {
        Self {
            env: Environment::new(),
            unknown_actor_label: unknown_actor_label.into(),
            missing_detail_label: missing_detail_label.into(),
        }
    }

    /// Renders the alert text for `event`.
    ///
    /// Rendering never fails: kinds without a template, and templates that
    /// fail to render, produce the raw action text.
    #[must_use]
    pub fn render(&self, event: &SystemEvent, style: MessageStyle) -> String {
        match style {
            MessageStyle::Localized => self.localized(event),
            MessageStyle::SweepDigest => self.digest(event),
        }
    }

    fn actor<'a>(&'a self, event: &'a SystemEvent) -> &'a str {
        event
            .user_name
            .as_deref()
            .unwrap_or(self.unknown_actor_label.as_str())
    }

    fn localized(&self, event: &SystemEvent) -> String {
        let Some(template) = localized_template(event.kind) else {
            return event.action.clone();
        };
        let fallback = self.missing_detail_label.as_str();
        let ctx = context! {
            actor => self.actor(event),
            project_name => event.details.get("project_name").display_or(fallback),
            task_title => event.details.get("task_title").display_or(fallback),
        };
        match self.env.render_str(template, ctx) {
            Ok(rendered) => rendered,
            Err(err) => {
                tracing::warn!(
                    event_id = %event.id,
                    kind = %event.kind,
                    error = %err,
                    "alert template failed to render; using raw action"
                );
                event.action.clone()
            }
        }
    }

    fn digest(&self, event: &SystemEvent) -> String {
        let actor = self.actor(event);
        match sweep_tag(event.kind) {
            Some(tag) => format!("{tag} {actor} {}", event.action),
            None => format!("{actor} {}", event.action),
        }
    }
}

impl Default for AlertRenderer {
    fn default() -> Self {
        Self::new("Unknown User", "N/A")
    }
}
