//! sea-orm entities for the hiring pipeline tables.

pub mod apply;
pub mod apply_activity;
pub mod apply_activity_history;
pub mod job_request;
pub mod process_step;
pub mod process_template;
