//! Study dashboard core: the streamed study-assistant client.
//!
//! Scheduling lives in the `srs` crate and stream decoding in `chatstream`;
//! this crate wires them to the backend and the command line.

pub mod assistant;
pub mod error;
