pub mod emit;
pub mod metadata;
pub mod sheet;
pub mod strain;
