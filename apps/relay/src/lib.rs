// Library exports for testing
// The binaries in src/bin import these as well

pub mod console;
pub mod error;
pub mod logger;
pub mod paths;

#[cfg(test)]
mod tests;
