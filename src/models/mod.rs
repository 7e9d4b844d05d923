pub mod cli;
pub mod reference;

pub use cli::{Cli, Target};
pub use reference::{ChapterRef, ImageRef};
