pub mod memory;
pub mod planet;
