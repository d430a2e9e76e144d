use std::io::Write;

use kernelcfg_common::Element;

use crate::{UnitPos, defaults::SizeT};

/// Whether the debug print helper is compiled in.
pub trait DebugMode {
    /// `true` only for [Enabled].
    const ENABLED: bool;

    /// Writes `array[..len]` to `sink` when `pos` is the leader lane.
    fn print_array_to<W: Write, E: Element>(sink: &mut W, pos: UnitPos, array: &[E], len: SizeT);
}

/// The helper is compiled in.
#[derive(Debug, Clone, Copy, Default)]
pub struct Enabled;

/// The helper compiles to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disabled;

impl DebugMode for Enabled {
    const ENABLED: bool = true;

    #[inline]
    fn print_array_to<W: Write, E: Element>(sink: &mut W, pos: UnitPos, array: &[E], len: SizeT) {
        if !pos.is_leader() {
            return;
        }

        // Best effort, there is nobody to report a failed write to.
        let _ = write_array(sink, array, len);
    }
}

impl DebugMode for Disabled {
    const ENABLED: bool = false;

    #[inline(always)]
    fn print_array_to<W: Write, E: Element>(
        _sink: &mut W,
        _pos: UnitPos,
        _array: &[E],
        _len: SizeT,
    ) {
    }
}

cfg_if::cfg_if! {
    if #[cfg(kernel_debug)] {
        /// The mode selected at build time.
        pub type ActiveMode = Enabled;
    } else {
        /// The mode selected at build time.
        pub type ActiveMode = Disabled;
    }
}

/// Prints the first `len` elements of `array` to the diagnostic stream, from the leader lane only.
///
/// Compiles to nothing unless the crate is built with `cfg(kernel_debug)` (the `debug` feature or
/// `KERNELCFG_DEBUG=1`). The output is `[a, b, c, ]` followed by a newline, each element with one
/// decimal. Lanes other than local index 0 print nothing, and no ordering is promised between
/// work-groups.
#[inline(always)]
pub fn print_array<E: Element>(pos: UnitPos, array: &[E], len: SizeT) {
    cfg_if::cfg_if! {
        if #[cfg(all(kernel_debug, host_stderr))] {
            ActiveMode::print_array_to(&mut std::io::stderr().lock(), pos, array, len);
        } else if #[cfg(kernel_debug)] {
            let mut buffer = Vec::new();
            ActiveMode::print_array_to(&mut buffer, pos, array, len);
            if !buffer.is_empty() {
                log::info!("{}", String::from_utf8_lossy(&buffer).trim_end());
            }
        } else {
            let _ = (pos, array, len);
        }
    }
}

/// Same as [print_array], writing to `sink` instead of the diagnostic stream.
#[inline(always)]
pub fn print_array_to<W: Write, E: Element>(sink: &mut W, pos: UnitPos, array: &[E], len: SizeT) {
    ActiveMode::print_array_to(sink, pos, array, len);
}

/// Formats `array[..len]` as `[a, b, ]\n` with one decimal per element.
///
/// A `len` past the end of `array` is clamped: the host can't read beyond the slice.
pub fn write_array<W: Write, E: Element>(
    sink: &mut W,
    array: &[E],
    len: SizeT,
) -> std::io::Result<()> {
    let requested = usize::try_from(len).unwrap_or(usize::MAX);
    let len = requested.min(array.len());

    if len < requested {
        log::debug!(
            "print_array: {requested} elements requested, the buffer only holds {}",
            array.len()
        );
    }

    let mut line = String::with_capacity(2 + len * 6);
    line.push('[');
    for value in &array[..len] {
        let value = value.to_f64();
        if value.is_nan() {
            line.push_str("nan, ");
        } else {
            line.push_str(&format!("{value:.1}, "));
        }
    }
    line.push_str("]\n");

    sink.write_all(line.as_bytes())
}
