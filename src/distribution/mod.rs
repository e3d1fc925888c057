// Distribution module - THE ENGINE
// Sends each recipient its tokens exactly once, in order, resuming safely after restarts

mod amount;
mod cancel;
mod orchestrator;
mod report;
mod sequence;

pub use amount::*;
pub use cancel::*;
pub use orchestrator::*;
pub use report::*;
pub use sequence::*;
