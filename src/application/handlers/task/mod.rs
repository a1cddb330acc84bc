//! Task command handlers.

mod add_task;
mod delete_task;

pub use add_task::{AddTaskCommand, AddTaskHandler};
pub use delete_task::{DeleteTaskCommand, DeleteTaskHandler};
