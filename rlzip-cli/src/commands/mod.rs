//! Command implementations for the rlzip CLI.

pub mod compress;
pub mod decompress;
pub mod list;
pub mod test;

pub use compress::cmd_compress;
pub use decompress::cmd_decompress;
pub use list::cmd_list;
pub use test::cmd_test;
