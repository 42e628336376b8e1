//! Application services for the tracker context.

mod comments;
mod error;
mod inbox;
mod projects;
mod requests;
mod tasks;
mod tracker;

pub use error::{Resource, TrackerServiceError, TrackerServiceResult};
pub use requests::{
    AddCommentRequest, CreateProjectRequest, TaskDraft, UpdateProjectRequest, UpdateTaskRequest,
};
pub use tracker::TrackerService;
