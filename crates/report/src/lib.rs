mod feed;
mod utils;

pub use feed::*;
pub use utils::*;
