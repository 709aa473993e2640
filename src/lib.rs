#![allow(dead_code)]

pub mod agent;
pub mod btp_server;
pub mod core_breach;
pub mod host;
pub mod search;
pub mod wire;

pub mod utils {
    pub mod prelude {
        pub use anyhow::{anyhow, Context, Error};
        pub type Result<T> = anyhow::Result<T, Error>;
    }
}

pub mod prelude {
    pub use super::agent::*;
    pub use super::btp_server::*;
    pub use super::core_breach::prelude::*;
    pub use super::host::*;
    pub use super::search::*;
    pub use super::utils::prelude::*;
    pub use super::wire::*;
}
