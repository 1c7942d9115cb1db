pub mod applications;
pub mod meetings;
pub mod startups;
pub mod summary_blocks;
