//! Diesel schema for the system event log.

diesel::table! {
    /// Audit events awaiting or past admin notification.
    system_events (id) {
        /// Event identifier.
        id -> Uuid,
        /// Mutation type.
        #[max_length = 30]
        kind -> Varchar,
        /// Acting user.
        user_id -> Uuid,
        /// Acting user's display name.
        #[max_length = 255]
        user_name -> Nullable<Varchar>,
        /// Affected project.
        project_id -> Nullable<Uuid>,
        /// Affected task.
        task_id -> Nullable<Uuid>,
        /// Human readable description.
        action -> Text,
        /// Free-form payload.
        details -> Jsonb,
        /// Whether admins have been notified.
        processed -> Bool,
        /// When the event was marked processed.
        processed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}
