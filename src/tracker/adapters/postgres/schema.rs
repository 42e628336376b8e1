//! Diesel schema for the tracker tables.

diesel::table! {
    /// Registered users.
    users (id) {
        /// User identifier.
        id -> Uuid,
        /// Optional display name.
        #[max_length = 255]
        name -> Nullable<Varchar>,
        /// Optional e-mail address.
        #[max_length = 255]
        email -> Nullable<Varchar>,
        /// Authorization role.
        #[max_length = 20]
        role -> Varchar,
    }
}

diesel::table! {
    /// Projects owned by their creator.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Project name.
        #[max_length = 255]
        name -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Creator and owner.
        created_by -> Uuid,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Tasks within projects.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 500]
        title -> Varchar,
        /// Optional description.
        description -> Nullable<Text>,
        /// Workflow status.
        #[max_length = 20]
        status -> Varchar,
        /// Priority.
        #[max_length = 20]
        priority -> Varchar,
        /// Owning project.
        project_id -> Uuid,
        /// Optional assignee.
        assigned_to -> Nullable<Uuid>,
        /// Creator and owner.
        created_by -> Uuid,
        /// Optional due date.
        due_date -> Nullable<Timestamptz>,
        /// Estimated effort in hours.
        estimated_hours -> Float8,
        /// Actual effort in hours.
        actual_hours -> Float8,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Task comments.
    comments (id) {
        /// Comment identifier.
        id -> Uuid,
        /// Commented task.
        task_id -> Uuid,
        /// Author.
        user_id -> Uuid,
        /// Comment body.
        text -> Text,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Field-level task history.
    task_history (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Changed task.
        task_id -> Uuid,
        /// User who made the change.
        user_id -> Uuid,
        /// Kind of change.
        #[max_length = 30]
        action -> Varchar,
        /// Value before the change.
        old_value -> Text,
        /// Value after the change.
        new_value -> Text,
        /// Time of the change.
        timestamp -> Timestamptz,
        /// Insertion order, breaking timestamp ties.
        seq -> Int8,
    }
}

diesel::table! {
    /// Per-user notifications.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Recipient.
        user_id -> Uuid,
        /// Display message.
        message -> Text,
        /// Category tag.
        #[max_length = 30]
        kind -> Varchar,
        /// Read flag.
        read -> Bool,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Optional idempotency key.
        #[max_length = 255]
        dedupe_key -> Nullable<Varchar>,
    }
}

diesel::joinable!(tasks -> projects (project_id));
diesel::joinable!(comments -> tasks (task_id));
diesel::joinable!(task_history -> tasks (task_id));
diesel::joinable!(notifications -> users (user_id));

diesel::allow_tables_to_appear_in_same_query!(
    users,
    projects,
    tasks,
    comments,
    task_history,
    notifications,
);
