pub mod cases;
pub mod compare;
pub mod extract;
