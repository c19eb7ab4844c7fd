use vtx_codec::FormatDescriptor;
use vtx_codec::octahedral::frames_to_normals;

use crate::CommonArgs;
use crate::prelude::*;
use crate::util::{item_count, open_output, read_input, write_floats};

#[derive(clap::Args, Debug)]
pub struct NormalsArgs {
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
    args_cmd: &NormalsArgs,
) -> AnyResult<()> {
    let sarg = &args_cmd.sarg;
    let fmt = FormatDescriptor::resolve(&sarg.format)
        .context("Cannot resolve vertex format")?;
    if fmt.channel_count() < 2 {
        bail!("{fmt} has fewer than two channels to hold octahedral normals");
    }
    let buf = read_input(Some(args_cmd.inpath.in_file.as_path()))?;
    let items = item_count(&fmt, buf.len(), sarg.stride, sarg.offset, sarg.count);
    let frames = fmt
        .decode(&buf, items, sarg.stride, sarg.offset)
        .context("Cannot decode tangent frames")?;
    let normals = frames_to_normals(&fmt, &frames);
    if args_common.verbose {
        eprintln!("Decoded {} normals from {fmt}.", normals.len() / 3);
    }
    let mut out =
        open_output(args_cmd.outpath.out_file.as_deref(), args_cmd.oarg.overwrite)?;
    write_floats(&mut *out, &normals, 3, args_cmd.farg.raw)
        .context("Cannot write normals")?;
    Ok(())
}
