pub mod config;
pub mod hash;
pub mod storage_header;

#[cfg(test)]
pub mod storage_header_tests;
