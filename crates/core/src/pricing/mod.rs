pub mod formula;
pub mod variants;
