//! Platform bindings
//!
//! The simulation core is host-agnostic. On `wasm32` the [`web`] module exposes
//! a session to JavaScript, which owns the canvas, input events and the frame
//! loop.

#[cfg(target_arch = "wasm32")]
pub mod web;
