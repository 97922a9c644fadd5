pub mod activity;
pub mod assignment;
pub mod checklist;
pub mod contract;
pub mod quote;
pub mod variant;
