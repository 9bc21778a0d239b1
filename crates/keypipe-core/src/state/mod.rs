// Keypipe State Layer
// Latch bookkeeping for the injection engine

mod latch;

pub use latch::LatchTable;
