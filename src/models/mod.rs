pub mod task;
pub mod user;

pub use task::{Task, TaskInput, TaskPriority, TaskQuery, TaskStatus, TaskUpdate};
pub use user::{Role, User, UserView};
