pub mod expense;
pub mod tag;
