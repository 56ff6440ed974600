pub mod block;
pub mod cache;
pub mod functions;
pub mod graph;
pub mod util;
pub mod workspace;

pub use block::*;
pub use cache::*;
pub use functions::*;
pub use graph::*;
pub use util::*;
pub use workspace::*;
