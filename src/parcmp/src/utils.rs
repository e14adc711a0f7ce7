use std::{
    fs,
    io::{self, BufWriter, IsTerminal, Write},
    path::PathBuf,
};

use eyre::Context;
use parcmp_engine::Report;

/// Writes `report` to the given file or to stdout.
///
/// JSON reports are minified when written to a file or piped to
/// another application, and pretty-printed on a terminal.
pub fn write_report(out: Option<PathBuf>, report: &Report, json: bool) -> eyre::Result<()> {
    if let Some(out) = out {
        let file = fs::File::create(&out)
            .with_context(|| format!("failed to create '{}'", out.display()))?;
        let mut writer = BufWriter::new(file);

        if json {
            serde_json::to_writer(&mut writer, report)?;
        } else {
            write!(writer, "{report}")?;
        }
        writer.flush()?;
    } else {
        let mut stdout = io::stdout().lock();

        match (json, stdout.is_terminal()) {
            (true, true) => {
                serde_json::to_writer_pretty(&mut stdout, report)?;
                writeln!(stdout)?;
            }
            (true, false) => serde_json::to_writer(&mut stdout, report)?,
            (false, _) => write!(stdout, "{report}")?,
        }
        stdout.flush()?;
    }

    Ok(())
}
