//! Business rules on top of the repositories. Each service reports expected
//! outcomes through its own error enum, converted to `AppError` at the edge.

pub mod attendance;
pub mod directory;
pub mod schedule;
pub mod shift;
