pub mod check;
pub mod comment_ops;
pub mod tag_ops;
pub mod task_ops;
pub mod view;
