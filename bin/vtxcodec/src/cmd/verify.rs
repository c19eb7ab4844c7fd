use vtx_codec::kind::max_int_value;
use vtx_codec::{FormatDescriptor, NumericKind};

use crate::CommonArgs;
use crate::prelude::*;
use crate::util::{item_count, read_input};

#[derive(clap::Args, Debug)]
pub struct VerifyArgs {
    #[command(flatten)]
    sarg: crate::StreamArgs,
    #[command(flatten)]
    inpath: crate::InputPath,
}

/// Largest difference a decode/encode/decode cycle may introduce per channel.
fn tolerance(fmt: &FormatDescriptor, channel: usize) -> f32 {
    let bits = fmt.layout.channel_bits(channel);
    let kind = match fmt.layout {
        vtx_codec::Layout::Packed(p) => p.field_kind(channel, fmt.kind),
        _ => fmt.kind,
    };
    match kind {
        NumericKind::Snorm => 1.0 / max_int_value(bits, true) as f32,
        NumericKind::Unorm => 1.0 / max_int_value(bits, false) as f32,
        _ => 0.0,
    }
}

pub fn run(
    args_common: &CommonArgs,
    args_cmd: &VerifyArgs,
) -> AnyResult<()> {
    let sarg = &args_cmd.sarg;
    let fmt = FormatDescriptor::resolve(&sarg.format)
        .context("Cannot resolve vertex format")?;
    let buf = read_input(Some(args_cmd.inpath.in_file.as_path()))?;
    let items = item_count(&fmt, buf.len(), sarg.stride, sarg.offset, sarg.count);
    let decoded = fmt
        .decode(&buf, items, sarg.stride, sarg.offset)
        .context("Cannot decode vertex buffer")?;
    if args_common.verbose {
        eprintln!("Decoded {items} items as {fmt}.");
    }
    if let Some(i) = fmt.find_overflow(&decoded) {
        eprintln!("Warning! Decoded value at index {i} would not re-encode in range.");
    }
    let fresh = fmt.encode(&decoded);
    let again = fmt
        .decode(&fresh, items, 0, 0)
        .context("Cannot decode re-encoded buffer")?;

    let channels = fmt.channel_count();
    let mut worst = 0.0f32;
    let mut failures = 0usize;
    for (i, (a, b)) in decoded.iter().zip(&again).enumerate() {
        // NaN bit patterns survive unchanged, compare those by bits
        if a.to_bits() == b.to_bits() {
            continue;
        }
        let diff = (a - b).abs();
        worst = worst.max(diff);
        if !(diff <= tolerance(&fmt, i % channels) * 1.0001) {
            failures += 1;
            if args_common.verbose {
                eprintln!("Item {} channel {}: {a} became {b}", i / channels, i % channels);
            }
        }
    }
    eprintln!("Largest deviation after re-encoding: {worst}");
    if failures > 0 {
        bail!("{failures} values drifted beyond the {} tolerance", fmt.kind);
    }
    eprintln!("{items} items OK.");
    Ok(())
}
