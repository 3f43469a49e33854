pub mod builders;
pub mod logs;

pub use builders::{enabled, AudioSystemBuilder};
pub use logs::{capture_logs, lines_at};
