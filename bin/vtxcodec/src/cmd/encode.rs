use std::io::Write;

use vtx_codec::FormatDescriptor;

use crate::CommonArgs;
use crate::prelude::*;
use crate::util::{open_output, parse_floats, read_input};

#[derive(clap::Args, Debug)]
pub struct EncodeArgs {
    #[command(flatten)]
    sarg: crate::StreamArgs,
    #[command(flatten)]
    farg: crate::FloatArgs,
    #[command(flatten)]
    oarg: crate::OutputArgs,
    /// Existing vertex buffer to write into (stride/offset apply to it)
    ///
    /// Without a base, a new tightly packed buffer is produced.
    #[arg(short, long)]
    base: Option<PathBuf>,
    /// Fail if the floats do not divide into whole items
    #[arg(long)]
    strict: bool,
    /// Input floats (stdin if unspecified)
    #[arg(short, long)]
    input: Option<PathBuf>,
    /// Path to the output buffer
    out_file: PathBuf,
}

pub fn run(
    args_common: &CommonArgs,
    args_cmd: &EncodeArgs,
) -> AnyResult<()> {
    let sarg = &args_cmd.sarg;
    let fmt = FormatDescriptor::resolve(&sarg.format)
        .context("Cannot resolve vertex format")?;
    let data = read_input(args_cmd.input.as_deref())?;
    let mut values = parse_floats(&data, args_cmd.farg.raw)?;
    if args_cmd.strict {
        fmt.checked_item_count(values.len())
            .context("Input does not divide into whole items")?;
    }
    if let Some(count) = sarg.count {
        values.truncate(count * fmt.channel_count());
    }
    if let Some(i) = fmt.find_overflow(&values) {
        eprintln!(
            "Warning! Value {} at index {i} does not fit {fmt} and will wrap.",
            values[i]
        );
    }

    let buf = match &args_cmd.base {
        Some(base) => {
            let mut buf = read_input(Some(base.as_path()))?;
            let items = fmt
                .update(&mut buf, &values, sarg.stride, sarg.offset)
                .context("Cannot encode into base buffer")?;
            if args_common.verbose {
                eprintln!("Updated {items} items in place.");
            }
            buf
        }
        None => {
            let buf = fmt.encode(&values);
            if args_common.verbose {
                eprintln!(
                    "Encoded {} items into {} bytes.",
                    fmt.item_count(values.len()),
                    buf.len()
                );
            }
            buf
        }
    };

    let mut out = open_output(Some(args_cmd.out_file.as_path()), args_cmd.oarg.overwrite)?;
    out.write_all(&buf).context("Cannot write output buffer")?;
    out.flush()?;
    Ok(())
}
