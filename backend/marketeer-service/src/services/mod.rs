/// Business logic layer
pub mod generation;
pub mod session;
