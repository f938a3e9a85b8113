pub mod classify;
pub mod cli;
pub mod preprocess;
pub mod train;
pub mod util;
