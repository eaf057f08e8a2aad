pub mod expense;
pub mod role;
pub mod tag;
pub mod user;
