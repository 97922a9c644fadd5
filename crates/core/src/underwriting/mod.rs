pub mod bonity;
pub mod checklist;
