pub mod fields;
pub mod id;
pub mod track;
