//! The eight-stage analyzer pipeline (spec §4.C): each module
//! advances through `SemaStage::{Name, Interface, Body, Resources}` in
//! lockstep with every other module in the same `Unit` — every stage is a
//! barrier (spec §5).

pub mod body;
pub mod interface;
pub mod meta;
pub mod name;
pub mod preamble;
pub mod resources;
pub mod type_alias;
pub mod use_resolution;
