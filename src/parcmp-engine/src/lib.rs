//! Block-parallel equality comparison of two files.
//!
//! # Design
//!
//! Both inputs are split into fixed-size blocks. A single coordinator
//! on the calling thread hands out block indices to a pool of worker
//! threads, one job at a time and only on request:
//!
//! 1. An idle worker announces itself on the shared result channel.
//! 2. The coordinator answers on that worker's job queue with either
//!    the next unassigned block or a stop instruction.
//! 3. The worker compares the block in both inputs and either asks
//!    for more work or sends its terminal outcome and stops.
//!
//! All comparison state lives in the coordinator and is only ever
//! mutated there. Workers share nothing but the two read-only inputs,
//! which are read with positioned I/O and never through a shared
//! cursor.
//!
//! Once a mismatch has been observed, every further request for work
//! is answered with a stop instruction. Workers are never interrupted
//! mid-block, so at most one in-flight block per worker is compared
//! after the outcome is already known.

#![deny(rust_2018_idioms, rustdoc::broken_intra_doc_links)]

use std::path::Path;

pub mod channel;

mod config;
pub use config::*;

mod coordinator;
pub use coordinator::*;

mod error;
pub use error::*;

mod memory;

pub mod message;

mod report;
pub use report::*;

mod source;
pub use source::*;

mod worker;

/// Compares the files at `left` and `right` block by block.
///
/// Failing to open either input is an error; everything that happens
/// after both inputs were opened is described by the returned
/// [`Report`].
pub fn compare<P, Q>(left: P, right: Q, config: &Config) -> Result<Report, CompareError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let left = BlockSource::open(left)?;
    let right = BlockSource::open(right)?;

    Ok(Coordinator::new(left, right, *config).run())
}
