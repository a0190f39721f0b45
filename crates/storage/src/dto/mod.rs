pub mod result;
pub mod series;
