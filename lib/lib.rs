pub mod chain;
pub mod math;
pub mod node;
pub mod projector;
pub mod reporting_fees;
pub mod state;
pub mod types;

pub use heed;
pub use sneed;
