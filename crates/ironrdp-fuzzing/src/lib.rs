pub mod generators;
pub mod oracles;
