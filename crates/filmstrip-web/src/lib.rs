//! Browser binding for the filmstrip scroll engine
//!
//! `mount` looks up the page's rows, scrollbars, parallax layers and lightbox
//! by id, hands whatever exists to a [`filmstrip_core::ScrollEngine`] and
//! keeps the DOM listeners alive for as long as the returned handle lives.
//! Frames are driven by `requestAnimationFrame`.

#![forbid(unsafe_code)]

pub mod console;

#[cfg(target_arch = "wasm32")]
mod app;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod frames;

#[cfg(target_arch = "wasm32")]
pub use app::{mount, FilmstripPage};
