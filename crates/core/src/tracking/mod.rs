pub mod hash;
pub mod recalc;
