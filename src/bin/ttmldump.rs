use anyhow::bail;
use clap::{ArgAction, Parser};
use mp4ttml::{
    Analysis, AnalyzeError, BufferSource, FileSource, FourCC, analyze,
    render::{ImageSink, NullSink, PngDirSink},
    util::hex_dump,
};
use std::path::PathBuf;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(version, about = "Walk fragmented MP4 boxes and extract SMPTE-TT images")]
struct Args {
    /// Input file path
    path: Option<PathBuf>,

    /// Fetch the input over HTTP instead of reading a file
    #[arg(long, conflicts_with = "path")]
    url: Option<String>,

    /// Emit JSON instead of the human-readable listing
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,

    /// Decode images and write them as PNG files into this directory
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Hex-dump the body of every box of this 4CC (e.g. --raw mdat)
    #[arg(long, conflicts_with = "json")]
    raw: Option<String>,

    /// Bytes to dump per box with --raw (0 means the entire body)
    #[arg(long, default_value_t = 0)]
    bytes: usize,

    /// Increase log verbosity (-v shows every box, -vv everything)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .compact()
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let raw = match args.raw.as_deref() {
        Some(sel) => match FourCC::from_str(sel) {
            Some(cc) => Some(cc),
            None => bail!("--raw expects a four-character box type, got {sel:?}"),
        },
        None => None,
    };

    let source = input_source(&args)?;
    let buf = source.get_buffer().map_err(AnalyzeError::from)?;

    let mut sink: Box<dyn ImageSink> = match &args.out_dir {
        Some(dir) => Box::new(PngDirSink::new(dir)?),
        None => Box::new(NullSink),
    };
    let analysis = analyze(&buf, sink.as_mut())?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    print_listing(&analysis);

    if let Some(cc) = raw {
        dump_raw(&buf, &analysis, cc, args.bytes);
    }

    Ok(())
}

fn input_source(args: &Args) -> anyhow::Result<Box<dyn BufferSource>> {
    if let Some(url) = &args.url {
        #[cfg(feature = "http")]
        return Ok(Box::new(mp4ttml::source::HttpSource::new(url.clone())));
        #[cfg(not(feature = "http"))]
        bail!("cannot fetch {url}: built without the `http` feature");
    }
    match &args.path {
        Some(path) => Ok(Box::new(FileSource::new(path))),
        None => bail!("no input given; pass a file path or --url"),
    }
}

// ---------- Human-readable listing ----------

fn print_listing(analysis: &Analysis) {
    for b in &analysis.boxes {
        println!(
            "{:>8} {:>10} {} ({})",
            format!("{:#x}", b.offset),
            b.size,
            b.typ,
            b.full_name
        );
        if let Some(images) = &b.images {
            for (i, img) in images.iter().enumerate() {
                println!(
                    "           -> image {i}: {} ({} chars)",
                    img.encoding,
                    img.encoded_data.len()
                );
            }
        }
    }
    println!(
        "{} boxes, {} bytes, {} images",
        analysis.boxes.len(),
        analysis.consumed,
        analysis.rendered
    );
}

// ---------- Raw dump ----------

fn dump_raw(buf: &[u8], analysis: &Analysis, cc: FourCC, limit: usize) {
    let matches = analysis.boxes.iter().filter(|b| b.typ == cc);
    for (i, b) in matches.enumerate() {
        let len = if limit == 0 { b.body_size } else { limit.min(b.body_size) };
        let data = &buf[b.body_offset..b.body_offset + len];
        println!(
            "\n== Dump {} ({}) payload: offset={:#x}, len={} ==",
            i, b.typ, b.body_offset, len
        );
        print!("{}", hex_dump(data, b.body_offset as u64));
    }
}
