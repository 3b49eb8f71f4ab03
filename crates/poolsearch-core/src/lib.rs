#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod cancel;
pub mod chunker;
pub mod config;
pub mod defaults;
pub mod discovery;
pub mod error;
pub mod extract;
pub mod types;
