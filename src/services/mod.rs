//! Services layered over the data-access layer.

pub mod report_view;
