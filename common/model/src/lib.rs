pub mod batch;
pub mod event;
pub mod labels;
pub mod processor;
pub mod url;
pub mod util;

pub use batch::{Batch, BatchProcessor, ProcessBatchFn};
pub use event::ApmEvent;
pub use labels::{LabelData, LabelSet, LabelValue, Labels, NumericLabels};
pub use processor::Processor;
pub use crate::url::{parse_url, Url};
