pub mod config;
pub mod convert;
pub mod crop;
pub mod filter;
pub mod info;
pub mod morpho;
pub mod pipeline;
