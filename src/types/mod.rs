pub mod date_range;
pub mod glm_table;
pub mod lifecycle;
pub mod location;
pub mod raw_met;
pub mod variables;
