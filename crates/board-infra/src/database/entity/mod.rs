//! SeaORM entities for the board tables.

pub mod attachment;
pub mod member;
pub mod post;
