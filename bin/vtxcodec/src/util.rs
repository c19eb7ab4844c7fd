use std::io::{BufWriter, Read, Write};

use vtx_codec::FormatDescriptor;

use crate::prelude::*;

pub fn read_input(path: Option<&Path>) -> AnyResult<Vec<u8>> {
    let mut data = vec![];
    match path {
        None => {
            std::io::stdin()
                .lock()
                .read_to_end(&mut data)
                .context("Could not read from stdin")?;
        }
        Some(path) => {
            data = std::fs::read(path).context("Could not read input file")?;
        }
    }
    Ok(data)
}

pub fn open_output(
    path: Option<&Path>,
    overwrite: bool,
) -> AnyResult<Box<dyn Write>> {
    let out: Box<dyn Write> = match path {
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
        Some(path) => {
            let file = if overwrite {
                std::fs::File::create(path)
            } else {
                std::fs::File::create_new(path)
            }
            .context("Could not open output file")?;
            Box::new(BufWriter::new(file))
        }
    };
    Ok(out)
}

/// Parse floats from raw little-endian f32 bytes or whitespace-separated text.
pub fn parse_floats(data: &[u8], raw: bool) -> AnyResult<Vec<f32>> {
    if raw {
        if data.len() % 4 != 0 {
            bail!("Raw float data length {} is not a multiple of 4", data.len());
        }
        return Ok(data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect());
    }
    let text = std::str::from_utf8(data).context("Float text is not valid UTF-8")?;
    text.split_whitespace()
        .map(|t| t.parse::<f32>().with_context(|| format!("Invalid float {t:?}")))
        .collect()
}

/// Write floats as raw little-endian f32 bytes, or as text with one item
/// of `channels` values per line.
pub fn write_floats(
    out: &mut dyn Write,
    values: &[f32],
    channels: usize,
    raw: bool,
) -> AnyResult<()> {
    if raw {
        let words: Vec<u32> = values.iter().map(|v| v.to_bits().to_le()).collect();
        out.write_all(bytemuck::cast_slice(&words))?;
    } else {
        for item in values.chunks(channels.max(1)) {
            let line: Vec<String> = item.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(" "))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// Number of items to process: the requested count, or as many as fit.
pub fn item_count(
    fmt: &FormatDescriptor,
    buf_len: usize,
    stride: usize,
    offset: usize,
    count: Option<usize>,
) -> usize {
    if let Some(count) = count {
        return count;
    }
    let stride = if stride == 0 { fmt.item_size() } else { stride };
    let first_end = offset + fmt.item_size();
    if buf_len < first_end {
        return 0;
    }
    (buf_len - first_end) / stride + 1
}
