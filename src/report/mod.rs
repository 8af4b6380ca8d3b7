pub mod fanout;
pub mod render;
pub mod transform;
pub mod window;

pub use fanout::{run_all, run_all_with_cancel, AggregateError, RunResult};
pub use render::{Document, HtmlRenderer, DISTANCE_FLAG_THRESHOLD_KM};
pub use transform::{convert, ConvertedReport};
pub use window::{TimeWindow, WindowError};
