//! User interface layer.

pub mod components;
