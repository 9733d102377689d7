//! Main entry point for the runtar CLI application.
//!
//! This binary is a thin driver over the library: it opens the archive
//! (local file or HTTP URL), dispatches one navigation operation and
//! renders the result, mapping structural and lookup failures onto the
//! conventional codes (-1 bad magic, -2 bad version, -3 bad checksum for
//! validation; -1 not found, -2 offset out of range for reads).

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use runtar::{Cli, FileRead, HttpRangeReader, LocalFileReader, ReadAt, TarError, TarExtractor};

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("runtar: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode> {
    if cli.is_http_url() {
        let reader = HttpRangeReader::new(cli.file.clone())
            .with_context(|| format!("failed to open {}", cli.file))?;
        let transferred_before = reader.transferred_bytes();
        let reader = Arc::new(reader);

        let code = navigate(reader.clone(), cli)?;

        // Display network transfer statistics for HTTP sources
        if !cli.quiet {
            let transferred = reader.transferred_bytes() - transferred_before;
            eprintln!("\nTotal bytes transferred: {}", format_size(transferred));
        }
        Ok(code)
    } else {
        let reader = Arc::new(
            LocalFileReader::new(Path::new(&cli.file))
                .with_context(|| format!("failed to open {}", cli.file))?,
        );
        navigate(reader, cli)
    }
}

/// Dispatch one navigation operation based on CLI options.
fn navigate<R: ReadAt + 'static>(reader: Arc<R>, cli: &Cli) -> Result<ExitCode> {
    let extractor = TarExtractor::new(reader);

    if cli.type_of {
        return show_type(&extractor, cli);
    }
    if cli.list {
        return list_children(&extractor, cli);
    }
    if cli.print {
        return print_file(&extractor, cli);
    }

    // Default mode: structural validation
    match extractor.check() {
        Ok(count) => {
            if !cli.quiet {
                println!("ok: {count} headers");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            let code = match err {
                TarError::BadMagic { .. } => -1,
                TarError::BadVersion { .. } => -2,
                TarError::BadChecksum { .. } => -3,
                other => return Err(other.into()),
            };
            eprintln!("invalid archive ({code}): {err}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Report whether the entry exists and what it is.
fn show_type<R: ReadAt>(extractor: &TarExtractor<R>, cli: &Cli) -> Result<ExitCode> {
    let path = required_path(cli)?;

    if extractor.is_dir(path)? {
        println!("{path}: directory");
    } else if extractor.is_file(path)? {
        println!("{path}: regular file");
    } else if extractor.is_symlink(path)? {
        let target = extractor
            .parser()
            .find(path.as_bytes())?
            .map(|located| located.header.linkname_lossy().into_owned())
            .unwrap_or_default();
        println!("{path}: symlink -> {target}");
    } else if extractor.exists(path)? {
        println!("{path}: other");
    } else {
        println!("{path}: not found");
        return Ok(ExitCode::FAILURE);
    }

    Ok(ExitCode::SUCCESS)
}

/// List the direct children of a directory entry.
fn list_children<R: ReadAt>(extractor: &TarExtractor<R>, cli: &Cli) -> Result<ExitCode> {
    let path = required_path(cli)?;

    match extractor.list(path, cli.limit)? {
        Some(entries) => {
            for entry in &entries {
                println!("{entry}");
            }
            if !cli.quiet {
                eprintln!("{} entries", entries.len());
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("no directory at {path}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Copy a file's contents to stdout, advancing the offset until the
/// remaining count reaches zero.
fn print_file<R: ReadAt>(extractor: &TarExtractor<R>, cli: &Cli) -> Result<ExitCode> {
    let path = required_path(cli)?;
    let mut offset = cli.offset;
    let mut buf = [0u8; 64 * 1024];
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    loop {
        match extractor.read_file(path, offset, &mut buf)? {
            FileRead::Read {
                bytes_written,
                remaining,
            } => {
                out.write_all(&buf[..bytes_written])?;
                if remaining == 0 {
                    out.flush()?;
                    return Ok(ExitCode::SUCCESS);
                }
                offset += bytes_written as u64;
            }
            FileRead::NotFound => {
                eprintln!("no file at {path} (-1)");
                return Ok(ExitCode::FAILURE);
            }
            FileRead::OffsetOutOfRange => {
                eprintln!("offset {offset} out of range for {path} (-2)");
                return Ok(ExitCode::FAILURE);
            }
        }
    }
}

fn required_path(cli: &Cli) -> Result<&str> {
    cli.path
        .as_deref()
        .context("this mode requires an entry PATH argument")
}

/// Format a byte size into a human-readable string.
fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} bytes", size)
    }
}
