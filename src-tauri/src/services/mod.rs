pub mod anchor_layout;
pub mod bubble;
pub mod chat;
pub mod config;
pub(crate) mod paths;
pub mod pet;
pub mod subtitle;
