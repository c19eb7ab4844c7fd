use vtx_codec::FormatDescriptor;

use crate::CommonArgs;
use crate::prelude::*;
use crate::util::{item_count, open_output, read_input, write_floats};

#[derive(clap::Args, Debug)]
pub struct DecodeArgs {
    #[command(flatten)]
    sarg: crate::StreamArgs,
    #[command(flatten)]
    farg: crate::FloatArgs,
    #[command(flatten)]
    oarg: crate::OutputArgs,
    #[command(flatten)]
    inpath: crate::InputPath,
    #[command(flatten)]
    outpath: crate::OptOutputPath,
}

pub fn run(
    args_common: &CommonArgs,
    args_cmd: &DecodeArgs,
) -> AnyResult<()> {
    let sarg = &args_cmd.sarg;
    let fmt = FormatDescriptor::resolve(&sarg.format)
        .context("Cannot resolve vertex format")?;
    let buf = read_input(Some(args_cmd.inpath.in_file.as_path()))?;
    let items = item_count(&fmt, buf.len(), sarg.stride, sarg.offset, sarg.count);
    let values = fmt
        .decode(&buf, items, sarg.stride, sarg.offset)
        .context("Cannot decode vertex buffer")?;
    if args_common.verbose {
        eprintln!("Decoded {items} items ({} floats) as {fmt}.", values.len());
    }
    let mut out =
        open_output(args_cmd.outpath.out_file.as_deref(), args_cmd.oarg.overwrite)?;
    write_floats(&mut *out, &values, fmt.channel_count(), args_cmd.farg.raw)
        .context("Cannot write decoded floats")?;
    Ok(())
}
