//! SeaORM entity definitions.

pub mod spec_run;
pub mod suite_run;
pub mod test_run;
