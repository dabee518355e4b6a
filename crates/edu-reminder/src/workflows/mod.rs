pub mod classes;
pub mod portal;
pub mod roster;
pub mod validation;
