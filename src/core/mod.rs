pub mod batch;
pub mod cache;
pub mod error;
pub mod matcher;
pub mod scorer;
pub mod signature;

#[cfg(test)]
pub mod testing;
