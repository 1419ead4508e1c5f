//! Request handlers.

pub mod health;
pub mod jobs;
pub mod results;
pub mod summarize;
pub mod video_info;

pub use health::*;
pub use jobs::*;
pub use results::*;
pub use summarize::*;
pub use video_info::*;
