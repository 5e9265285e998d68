//! # Scrollwrap Shell - Presentation Projection
//!
//! A pure projection from gate state to presentable output. The shell holds
//! no state of its own and depends only on the types crate: equal snapshots
//! always project to equal frames, which is what lets the state machine be
//! tested headlessly and rendered by any host.
//!
//! A host renders one [`ShellFrame`] per state change:
//!
//! - [`HelperText`]: live-region status copy (keep reading, check the box,
//!   ready, processing, released)
//! - [`ProgressIndicator`]: the continuous scroll ratio, separate from the
//!   boolean completion flag
//! - [`OverlayTreatment`]: blur kept on the protected content until the
//!   commit begins
//! - [`ActionControl`]: the primary action's enabled flag and brand colors

#![deny(unsafe_code)]
#![cfg_attr(feature = "strict-docs", warn(missing_docs))]
#![cfg_attr(not(feature = "strict-docs"), allow(missing_docs))]
#![warn(rust_2018_idioms)]

mod frame;

pub use frame::{ActionControl, HelperText, OverlayTreatment, ProgressIndicator, ShellFrame};
