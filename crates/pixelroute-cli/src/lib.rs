//! pixelroute CLI library.
//!
//! Output formatting shared by the `pixelroute-cli` subcommands.

pub mod output;
