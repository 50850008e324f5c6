mod batch;

pub use batch::*;
