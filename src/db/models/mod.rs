pub mod summary_record;

pub use summary_record::SummaryRecordInfo;
