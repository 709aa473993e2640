/*
 *  An implementation of Core Breach in Rust.
 */

pub(crate) mod consts;
pub mod coords;
pub(crate) mod moves;
pub mod notation;
pub(crate) mod packing;
pub(crate) mod state;

pub mod prelude {
    pub(crate) use crate::utils::prelude::*;

    pub use super::{
        consts::*,
        coords::{self, *},
        moves::*,
        notation::*,
        state::{Cell, GameState}
    };
}
