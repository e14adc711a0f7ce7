use std::{collections::BTreeMap, fmt};

use crate::message::WorkerId;

/// The overall result of a comparison.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Verdict {
    /// Both inputs hold identical bytes.
    Success,
    /// The inputs differ in at least one block.
    Mismatch,
    /// The inputs differ in length; no blocks were compared.
    SizeMismatch,
    /// An I/O failure made it impossible to decide equality.
    IoError,
}

impl Verdict {
    /// The process exit code for this verdict.
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Mismatch | Self::SizeMismatch => 1,
            Self::IoError => 3,
        }
    }
}

/// The summary of a finished comparison.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Report {
    pub outcome: Verdict,
    /// The mismatching block that was observed first.
    ///
    /// This is `-1` when the sizes of the inputs differ.
    pub mismatch_block: Option<i64>,
    /// The absolute offset of the first differing byte in
    /// [`Report::mismatch_block`].
    pub mismatch_offset: Option<u64>,
    pub total_blocks: i64,
    pub block_size: u32,
    pub left_len: u64,
    pub right_len: u64,
    /// The number of blocks every launched worker compared.
    pub per_worker_blocks_processed: BTreeMap<WorkerId, u64>,
    /// The first I/O error that was observed, if any.
    pub io_error: Option<String>,
}

impl Report {
    /// Creates the report for inputs of different lengths.
    pub fn size_mismatch(left_len: u64, right_len: u64, block_size: u32) -> Self {
        Self {
            outcome: Verdict::SizeMismatch,
            mismatch_block: Some(-1),
            mismatch_offset: None,
            total_blocks: 0,
            block_size,
            left_len,
            right_len,
            per_worker_blocks_processed: BTreeMap::new(),
            io_error: None,
        }
    }

    /// Whether the inputs were found to be identical.
    #[inline]
    pub fn is_equal(&self) -> bool {
        self.outcome == Verdict::Success
    }

    /// The number of blocks compared by all workers together.
    pub fn blocks_processed(&self) -> u64 {
        self.per_worker_blocks_processed.values().sum()
    }

    /// The process exit code for this report.
    #[inline]
    pub fn exit_code(&self) -> u8 {
        self.outcome.exit_code()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.outcome {
            Verdict::Success => writeln!(f, "Result: SUCCESS (files identical)")?,

            Verdict::Mismatch => {
                write!(f, "Result: FAILURE (mismatch at block index ")?;
                match self.mismatch_block {
                    Some(block) => write!(f, "{block}")?,
                    None => write!(f, "?")?,
                }
                if let Some(offset) = self.mismatch_offset {
                    write!(f, ", byte offset {offset}")?;
                }
                writeln!(f, ")")?;
            }

            Verdict::SizeMismatch => {
                writeln!(
                    f,
                    "Result: FAILURE (file sizes differ: {} vs {} bytes)",
                    self.left_len, self.right_len
                )?;
                return writeln!(f, "No workers were launched.");
            }

            Verdict::IoError => {
                let reason = self.io_error.as_deref().unwrap_or("unknown error");
                writeln!(f, "Result: ERROR ({reason})")?;
            }
        }

        writeln!(
            f,
            "Blocks total: {} (block size {})",
            self.total_blocks, self.block_size
        )?;
        writeln!(f, "Per-worker blocks processed:")?;
        for (worker, blocks) in &self.per_worker_blocks_processed {
            writeln!(f, "  Worker {worker} : {blocks} blocks")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(Verdict::Success.exit_code(), 0);
        assert_eq!(Verdict::Mismatch.exit_code(), 1);
        assert_eq!(Verdict::SizeMismatch.exit_code(), 1);
        assert_eq!(Verdict::IoError.exit_code(), 3);
    }

    #[test]
    fn size_mismatch_summary() {
        let report = Report::size_mismatch(10_000, 9_999, 4096);
        assert_eq!(report.mismatch_block, Some(-1));
        assert!(report.per_worker_blocks_processed.is_empty());

        let text = report.to_string();
        assert!(text.contains("10000 vs 9999 bytes"));
        assert!(text.contains("No workers were launched."));
    }

    #[test]
    fn mismatch_summary() {
        let report = Report {
            outcome: Verdict::Mismatch,
            mismatch_block: Some(5),
            mismatch_offset: Some(55),
            total_blocks: 10,
            block_size: 10,
            left_len: 100,
            right_len: 100,
            per_worker_blocks_processed: [(0, 2), (1, 3)].into_iter().collect(),
            io_error: None,
        };

        assert_eq!(report.blocks_processed(), 5);
        assert_eq!(
            report.to_string(),
            "Result: FAILURE (mismatch at block index 5, byte offset 55)\n\
             Blocks total: 10 (block size 10)\n\
             Per-worker blocks processed:\n  \
             Worker 0 : 2 blocks\n  \
             Worker 1 : 3 blocks\n"
        );
    }
}
