pub mod walker;

pub use walker::GraphBuilder;
