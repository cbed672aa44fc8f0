//! Pipeline stages for the screenshot-to-PDF run.
//!
//! Each submodule implements exactly one stage, taking the [`crate::config::JobConfig`]
//! as an explicit argument and returning a `Result`. Keeping stages separate
//! makes each independently testable against temporary directories and a
//! mock HTTP server.
//!
//! ## Data Flow
//!
//! ```text
//! fetch ──▶ extract ──▶ assemble
//! (API+ZIP)  (unzip)    (images → PDF pages)
//! ```
//!
//! 1. [`fetch`]    — resolve the signed archive URL, stream the ZIP to disk;
//!    returns a drop guard that removes the ZIP when the run ends
//! 2. [`extract`]  — unpack into the session directory; runs in
//!    `spawn_blocking` because the ZIP reader is synchronous
//! 3. [`assemble`] — decode each image, append a page per image sized to
//!    its pixel dimensions, write the document

pub mod assemble;
pub mod extract;
pub mod fetch;
