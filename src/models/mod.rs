pub mod page;
pub mod task;
pub mod user;

pub use page::Page;
pub use task::{SearchParams, Task, TaskInput, TaskResponse};
pub use user::{RecordStatus, Role, User, UserResponse};
