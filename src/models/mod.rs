//! Domain model module declarations.

pub mod feed;
