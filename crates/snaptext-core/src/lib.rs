pub mod error;
pub mod pipeline;
pub mod preprocess;
pub mod selection;
pub mod shell;
