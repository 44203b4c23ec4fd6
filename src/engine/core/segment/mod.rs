pub mod builder;
pub mod cursor;
pub mod key_filter;
pub mod segment_id;

#[cfg(test)]
mod segment_id_test;
