//! Building and running converter commands
//!
//! A [`ConversionRequest`] collects the parameters, [`geometry`] turns crop
//! and resize settings into converter arguments, [`ConvertCommand`] holds the
//! composed invocation and a [`CommandRunner`] executes it.

pub mod command;
pub mod geometry;
pub mod probe;
pub mod request;
pub mod runner;

pub use command::ConvertCommand;
pub use geometry::{CropSpec, Gravity, ResizeSpec};
pub use probe::{converter_version, source_dimensions};
pub use request::{Conversion, ConversionRequest, DEFAULT_CONVERTER, DEFAULT_QUALITY};
pub use runner::{CommandRunner, RunStatus, SystemRunner};
