use std::{path::PathBuf, process::ExitCode};

use clap::{CommandFactory, Parser, error::ErrorKind};
use parcmp_engine::{CompareError, Config, DEFAULT_BLOCK_SIZE, PARCMP_WORKER_THREADS, UsageError};

use crate::utils;

mod args;

/// Exit code for I/O failures on the inputs.
const EXIT_IO_ERROR: u8 = 3;

/// Compares two files block by block using a pool of workers.
///
/// Exits with 0 when the files are identical, 1 when they differ in
/// size or contents, 2 on usage errors and 3 on I/O errors.
#[derive(Debug, Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// The first input file.
    pub file1: PathBuf,

    /// The second input file.
    pub file2: PathBuf,

    /// The number of worker threads to compare blocks with.
    ///
    /// Defaults to the number of logical CPUs.
    #[clap(short = 'j', long, env = PARCMP_WORKER_THREADS)]
    pub workers: Option<usize>,

    /// The size of a block in bytes.
    #[clap(short, long, default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: u32,

    /// Prints the report as JSON instead of a summary.
    #[clap(long)]
    pub json: bool,

    /// An optional file to write the report to instead of stdout.
    #[clap(short, long)]
    pub output: Option<PathBuf>,

    #[clap(flatten)]
    pub verbosity: args::Verbosity,
}

impl Cli {
    fn config(&self) -> Result<Config, UsageError> {
        match self.workers {
            Some(workers) => Config::new(workers, self.block_size),
            None => Config::from_env()?.with_block_size(self.block_size),
        }
    }

    /// Runs the comparison and reports the result.
    pub fn run(self) -> eyre::Result<ExitCode> {
        let config = self
            .config()
            .unwrap_or_else(|e| Self::command().error(ErrorKind::ValueValidation, e).exit());

        let report = match parcmp_engine::compare(&self.file1, &self.file2, &config) {
            Ok(report) => report,

            Err(CompareError::Usage(e)) => {
                Self::command().error(ErrorKind::ValueValidation, e).exit()
            }

            Err(CompareError::Source(e)) => {
                log::error!("{e}");
                return Ok(ExitCode::from(EXIT_IO_ERROR));
            }
        };

        if let Some(e) = &report.io_error {
            log::error!("{e}");
        }

        if let Err(e) = utils::write_report(self.output, &report, self.json) {
            log::error!("{e:#}");
            return Ok(ExitCode::from(EXIT_IO_ERROR));
        }

        Ok(ExitCode::from(report.exit_code()))
    }
}
