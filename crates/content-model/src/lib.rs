//! threadreel Content Model
//!
//! Defines the core data contracts for threadreel content:
//! - **Segments:** Ordered narrated units (title, body, replies) with paired
//!   audio and image artifacts
//! - **Background:** The background footage spec (source, credit, overlay
//!   position, music bed)
//! - **Timeline:** The computed absolute-time schedule of included segments
//!
//! Segment identity is its position in the manifest's ordered sequence;
//! segments are immutable once produced upstream.

pub mod background;
pub mod segment;
pub mod timeline;

pub use background::*;
pub use segment::*;
pub use timeline::*;
