pub mod record;
pub mod tag;

pub use record::AttendanceRecord;
pub use tag::{TagDescriptor, TagTech};
