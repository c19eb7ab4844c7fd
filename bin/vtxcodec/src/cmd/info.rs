use vtx_codec::{FormatDescriptor, Layout};

use crate::CommonArgs;
use crate::prelude::*;

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Vertex format names to describe
    #[arg(required = true)]
    formats: Vec<String>,
}

pub fn run(
    _args_common: &CommonArgs,
    args_cmd: &InfoArgs,
) -> AnyResult<()> {
    for name in args_cmd.formats.iter() {
        let fmt = FormatDescriptor::resolve(name)
            .with_context(|| format!("Cannot resolve {name:?}"))?;
        println!("{name}:");
        println!("  resolved:  {fmt}");
        println!("  kind:      {}", fmt.kind);
        println!("  channels:  {}", fmt.channel_count());
        println!("  item size: {} bytes", fmt.item_size());
        if let Layout::Packed(packed) = fmt.layout {
            let fields: Vec<String> =
                packed.fields().iter().map(|b| b.to_string()).collect();
            println!("  fields:    {} (LSB first)", fields.join("-"));
        }
    }
    Ok(())
}
