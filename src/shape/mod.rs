//! Shapes supported by rbvh.

pub use self::triangle::Triangle;

pub mod generators;
mod triangle;
