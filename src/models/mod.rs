pub mod task;
pub mod user;

pub use task::{NewTask, Task, TaskListQuery, TaskUpdate};
pub use user::{NewUser, User, UserRecord};
