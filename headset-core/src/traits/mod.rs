//! Capability traits for the headset's external collaborators.
//!
//! The main loop is written against these three seams so the whole control
//! flow can be exercised on the host with scripted implementations.

pub mod input;
pub mod radio;
pub mod surface;

pub use input::{Button, ButtonInput, InputError};
pub use radio::{RadioError, RadioTransport};
pub use surface::{DisplaySurface, ElementId, SurfaceError};
