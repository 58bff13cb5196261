#![doc = include_str!("../../../README.MD")]

pub mod bucket;
pub mod comparison;
pub mod csv;
pub mod report;
pub mod segregate;
pub mod suite;
