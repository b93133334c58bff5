#![allow(clippy::missing_inline_in_public_items)]
use crate::{TraversalError, util::BytePath as _};
use compile_time_ls_colours::file_type_colour;

use std::{
    io::{self, BufWriter, IsTerminal as _, Write, stdout},
    path::Path,
};
const NEWLINE: &[u8] = b"\n";
const NEWLINE_RESET: &[u8] = b"\x1b[0m\n";
const NULL_TERMINATED: &[u8] = b"\0";

const RESET: &[u8] = b"\x1b[0m";

/**
 Writes scan results, one path per line.

 Colour is only used when writing to a terminal and neither `--nocolour` nor the
 `NO_COLOUR`/`NO_COLOR` environment variables ask otherwise.
*/
pub struct PrinterBuilder<'a, I>
where
    I: Iterator<Item = &'a Path>,
{
    limit: usize,
    nocolour: bool,
    null_terminated: bool,
    errors: &'a [TraversalError],
    paths: I,
}

impl<'a, I> PrinterBuilder<'a, I>
where
    I: Iterator<Item = &'a Path>,
{
    #[inline]
    pub const fn new(paths: I) -> Self {
        Self {
            limit: usize::MAX,
            nocolour: false,
            null_terminated: false,
            errors: &[],
            paths,
        }
    }

    #[must_use]
    /// Limit the values to print to `limit`
    pub const fn limit(mut self, limit: Option<usize>) -> Self {
        self.limit = match limit {
            Some(lim) => lim,
            None => usize::MAX,
        };
        self
    }

    #[must_use]
    /// Print with no colour
    pub const fn nocolour(mut self, nocolour: bool) -> Self {
        self.nocolour = nocolour;
        self
    }

    #[must_use]
    /// Terminate results with NUL instead of a newline (useful for xargs -0), never coloured
    pub const fn null_terminated(mut self, null_terminated: bool) -> Self {
        self.null_terminated = null_terminated;
        self
    }

    #[must_use]
    /// Errors to report on stderr after the results
    pub const fn errors(mut self, errors: &'a [TraversalError]) -> Self {
        self.errors = errors;
        self
    }

    #[allow(clippy::print_stderr)] //only enabled if requested
    /// Print the results to stdout and any errors to stderr
    ///
    /// # Errors
    /// Returns the IO error if stdout can't be written to.
    pub fn print(self) -> io::Result<()> {
        let std_out = stdout();
        let is_terminal = std_out.is_terminal();
        let use_colour = is_terminal && !self.null_terminated && !colour_disabled(self.nocolour);

        let mut writer = if is_terminal {
            BufWriter::new(std_out)
        } else {
            BufWriter::with_capacity(16 * 4096, std_out)
        };

        let errors = self.errors;
        self.write_to(&mut writer, use_colour)?;
        writer.flush()?;

        for error in errors {
            eprintln!("{error}");
        }

        Ok(())
    }

    /// Write the results to `writer`
    ///
    /// # Errors
    /// Returns the first IO error from `writer`.
    pub fn write_to<W: Write>(self, writer: &mut W, use_colour: bool) -> io::Result<()> {
        let paths = self.paths.take(self.limit);
        if use_colour {
            write_coloured(writer, paths)
        } else {
            let terminator = if self.null_terminated {
                NULL_TERMINATED
            } else {
                NEWLINE
            };
            write_nocolour(writer, paths, terminator)
        }
    }
}

fn colour_disabled(nocolour: bool) -> bool {
    nocolour
        || std::env::var("NO_COLOUR").is_ok_and(|x| x.eq_ignore_ascii_case("TRUE"))
        || std::env::var("NO_COLOR").is_ok_and(|x| x.eq_ignore_ascii_case("TRUE"))
}

#[inline]
fn extension_colour(path: &Path) -> &[u8] {
    path.extension_bytes()
        .map_or(RESET, |pos| file_type_colour!(pos))
}

#[inline]
fn write_nocolour<'a, W, I>(writer: &mut W, paths: I, terminator: &[u8]) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        writer.write_all(path.as_bytes())?;
        writer.write_all(terminator)?;
    }
    Ok(())
}

#[inline]
fn write_coloured<'a, W, I>(writer: &mut W, paths: I) -> io::Result<()>
where
    W: Write,
    I: IntoIterator<Item = &'a Path>,
{
    for path in paths {
        writer.write_all(extension_colour(path))?;
        writer.write_all(path.as_bytes())?;
        writer.write_all(NEWLINE_RESET)?;
    }
    Ok(())
}
