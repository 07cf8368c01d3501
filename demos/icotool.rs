use clap::{App, Arg, SubCommand};
use icocodec::{BuildOptions, IconBuilder, IconDir, PngCompression};
use std::path::{Path, PathBuf};
use std::process;

//===========================================================================//

fn main() {
    env_logger::init();
    let matches = App::new("icotool")
        .version("0.1")
        .about("Inspects, splits, and builds ICO files")
        .subcommand(
            SubCommand::with_name("create")
                .about("Creates an ICO file from BMP and PNG files")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(
                    Arg::with_name("fast")
                        .long("fast")
                        .help("Recompresses PNG images quickly"),
                )
                .arg(
                    Arg::with_name("keep-png")
                        .long("keep-png")
                        .help("Stores PNG images without recompressing them"),
                )
                .arg(Arg::with_name("image").multiple(true).required(true)),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Extracts images from an ICO file as BMP or PNG files")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("DIR")
                        .short("o")
                        .long("output")
                        .help("Sets output directory"),
                )
                .arg(Arg::with_name("ico").required(true))
                .arg(Arg::with_name("index")),
        )
        .subcommand(
            SubCommand::with_name("split")
                .about("Copies one image of an ICO file into its own ICO file")
                .arg(
                    Arg::with_name("output")
                        .takes_value(true)
                        .value_name("PATH")
                        .short("o")
                        .long("output")
                        .help("Sets output path"),
                )
                .arg(Arg::with_name("ico").required(true))
                .arg(Arg::with_name("index").required(true)),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("Lists images in an ICO file")
                .arg(Arg::with_name("ico").required(true)),
        )
        .get_matches();
    let result = if let Some(submatches) = matches.subcommand_matches("create")
    {
        let out_path = match submatches.value_of("output") {
            Some(path) => PathBuf::from(path),
            None => unused_path("out", "ico"),
        };
        let options = BuildOptions {
            png_compression: if submatches.is_present("fast") {
                PngCompression::Fast
            } else {
                PngCompression::Best
            },
            recompress_png: !submatches.is_present("keep-png"),
        };
        let images: Vec<&str> = submatches
            .values_of("image")
            .map(|values| values.collect())
            .unwrap_or_default();
        create(&out_path, &images, options)
    } else if let Some(submatches) = matches.subcommand_matches("extract") {
        let path = submatches.value_of("ico").unwrap_or_default();
        let out_dir =
            PathBuf::from(submatches.value_of("output").unwrap_or("."));
        extract(Path::new(path), &out_dir, submatches.value_of("index"))
    } else if let Some(submatches) = matches.subcommand_matches("split") {
        let path = submatches.value_of("ico").unwrap_or_default();
        let index = submatches.value_of("index").unwrap_or_default();
        let out_path = match submatches.value_of("output") {
            Some(out) => PathBuf::from(out),
            None => PathBuf::from(format!("{}.{}.ico", path, index)),
        };
        split(Path::new(path), index, &out_path)
    } else if let Some(submatches) = matches.subcommand_matches("list") {
        list(Path::new(submatches.value_of("ico").unwrap_or_default()))
    } else {
        Ok(())
    };
    if let Err(error) = result {
        eprintln!("icotool: {}", error);
        process::exit(1);
    }
}

//===========================================================================//

fn create(
    out_path: &Path,
    images: &[&str],
    options: BuildOptions,
) -> icocodec::Result<()> {
    let mut builder = IconBuilder::with_options(options);
    for path in images {
        println!("Adding {:?}", path);
        builder.add_path(path)?;
    }
    builder.build()?.write_to_path(out_path)?;
    println!("Wrote {}", out_path.display());
    Ok(())
}

fn extract(
    path: &Path,
    out_dir: &Path,
    index: Option<&str>,
) -> icocodec::Result<()> {
    let icon_dir = IconDir::open(path)?;
    let prefix = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "icon".to_string());
    match index {
        Some(index) => {
            let index = parse_index(index)?;
            let name = icon_dir.entry(index)?.file_name(&prefix);
            let out_path = out_dir.join(name);
            icon_dir.export_image(index, &out_path)?;
            println!("Wrote {}", out_path.display());
        }
        None => {
            for out_path in icon_dir.extract_to_dir(out_dir, &prefix)? {
                println!("Wrote {}", out_path.display());
            }
        }
    }
    Ok(())
}

fn split(path: &Path, index: &str, out_path: &Path) -> icocodec::Result<()> {
    let icon_dir = IconDir::open(path)?;
    icon_dir.export_icon(parse_index(index)?, out_path)?;
    println!("Wrote {}", out_path.display());
    Ok(())
}

fn list(path: &Path) -> icocodec::Result<()> {
    let icon_dir = IconDir::open(path)?;
    for (index, entry) in icon_dir.entries().iter().enumerate() {
        println!(
            "{:5}: {}x{} {}, {} bpp, {} bytes",
            index,
            entry.width(),
            entry.height(),
            entry.format().extension().to_uppercase(),
            entry.bits_per_pixel(),
            entry.data().len()
        );
    }
    Ok(())
}

fn parse_index(index: &str) -> icocodec::Result<usize> {
    index.parse::<usize>().map_err(|_| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("Invalid image index {:?}", index),
        )
        .into()
    })
}

fn unused_path(stem: &str, extension: &str) -> PathBuf {
    let mut path = PathBuf::from(format!("{}.{}", stem, extension));
    let mut index: i32 = 0;
    while path.exists() {
        index += 1;
        path = PathBuf::from(format!("{}{}.{}", stem, index, extension));
    }
    path
}

//===========================================================================//
