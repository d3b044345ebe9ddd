use clap::{crate_authors, crate_description, crate_version, value_parser, Arg, ArgMatches, Command};
use dialoguer::Password;

use std::fs;
use std::path::Path;

use lowkey_core::commands::{estimate_capacity, hide, recommend_depth, unveil};
use lowkey_core::*;

fn main() -> Result<()> {
    env_logger::init();

    let matches = Command::new("Lowkey CLI")
        .version(crate_version!())
        .author(crate_authors!())
        .about(crate_description!())
        .arg_required_else_help(true)
        .subcommand(
            Command::new("hide")
                .about("Hides a file in an image, WAV audio file or video first frame")
                .arg(
                    Arg::new("media")
                        .short('i')
                        .long("in")
                        .value_name("carrier file")
                        .required(true)
                        .help("Carrier media file such as a PNG image or WAV audio file, used readonly."),
                )
                .arg(
                    Arg::new("data_file")
                        .short('d')
                        .long("data")
                        .value_name("data file")
                        .required(true)
                        .help("File to hide in the carrier"),
                )
                .arg(key_arg("Secret key that scatters the data; prompted for when omitted"))
                .arg(depth_arg())
                .arg(region_arg()),
        )
        .subcommand(
            Command::new("unveil")
                .about("Unveils a hidden file from a stego carrier")
                .arg(
                    Arg::new("media")
                        .short('i')
                        .long("in")
                        .value_name("stego file")
                        .required(true)
                        .help("Stego file that contains hidden data"),
                )
                .arg(key_arg("Secret key the data was hidden with; prompted for when omitted"))
                .arg(depth_arg()),
        )
        .subcommand(
            Command::new("capacity")
                .about("Estimates how many bytes a carrier can hold")
                .arg(
                    Arg::new("media")
                        .short('i')
                        .long("in")
                        .value_name("carrier file")
                        .required(true)
                        .help("Carrier media file to measure"),
                )
                .arg(
                    Arg::new("data_file")
                        .short('d')
                        .long("data")
                        .value_name("data file")
                        .required(false)
                        .help("Also recommend the smallest depth that would fit this file"),
                )
                .arg(depth_arg())
                .arg(region_arg()),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("hide", m)) => {
            let media = Path::new(m.get_one::<String>("media").unwrap());
            let data_file = Path::new(m.get_one::<String>("data_file").unwrap());
            let depth = *m.get_one::<u8>("lsb_depth").unwrap();
            let region = get_region(m);
            log::debug!("hide: depth {depth}, region {region:?}");
            let key = get_key(m, true)?;

            let stego = hide(media, data_file, &key, depth, region)?;
            println!("Hidden {} in {}", data_file.display(), stego.display());
        }
        Some(("unveil", m)) => {
            let media = Path::new(m.get_one::<String>("media").unwrap());
            let depth = *m.get_one::<u8>("lsb_depth").unwrap();
            let key = get_key(m, false)?;

            let unveiled = unveil(media, &key, depth)?;
            println!("Extracted to {}", unveiled.path.display());

            if unveiled.is_text {
                let text = fs::read_to_string(&unveiled.path)
                    .map_err(|source| LowkeyError::ReadError { source })?;
                println!("---\n{text}");
            }
        }
        Some(("capacity", m)) => {
            let media = Path::new(m.get_one::<String>("media").unwrap());
            let depth = *m.get_one::<u8>("lsb_depth").unwrap();
            let region = get_region(m);

            let bytes = estimate_capacity(media, depth, region)?;
            println!("{} holds {bytes} bytes at depth {depth}", media.display());

            if let Some(data_file) = m.get_one::<String>("data_file") {
                let data_file = Path::new(data_file);
                let payload_bytes = fs::metadata(data_file)
                    .map_err(|source| LowkeyError::ReadError { source })?
                    .len();
                let name_len = data_file.file_name().map(|n| n.len()).unwrap_or(0);

                let fits_at = recommend_depth(media, payload_bytes, name_len, region)?;
                println!(
                    "{} ({payload_bytes} bytes) needs at least depth {fits_at}",
                    data_file.display()
                );
            }
        }
        _ => {}
    }

    Ok(())
}

fn key_arg(help: &str) -> Arg {
    Arg::new("key")
        .short('k')
        .long("key")
        .value_name("key")
        .required(false)
        .help(help.to_string())
}

fn depth_arg() -> Arg {
    Arg::new("lsb_depth")
        .short('l')
        .long("lsb-depth")
        .value_name("bits per unit")
        .value_parser(value_parser!(u8).range(1..=8))
        .default_value("1")
        .required(false)
        .help("Least significant bits used per carrier unit for the hidden body")
}

fn region_arg() -> Arg {
    Arg::new("region")
        .long("region")
        .value_names(["x1", "y1", "x2", "y2"])
        .num_args(4)
        .value_parser(value_parser!(u16))
        .required(false)
        .help("Confine image embedding to the pixel rectangle (x1,y1) to (x2,y2)")
}

fn get_region(args: &ArgMatches) -> Option<Region> {
    args.get_many::<u16>("region").map(|values| {
        let bounds: Vec<u16> = values.copied().collect();
        Region::new(bounds[0], bounds[1], bounds[2], bounds[3])
    })
}

fn get_key(args: &ArgMatches, confirm: bool) -> Result<String> {
    if let Some(key) = args.get_one::<String>("key") {
        return Ok(key.clone());
    }

    let mut prompt = Password::new().with_prompt("Key");
    if confirm {
        prompt = prompt.with_confirmation("Confirm key", "The keys do not match");
    }
    prompt
        .interact()
        .map_err(|e| LowkeyError::IoError(std::io::Error::new(std::io::ErrorKind::Other, e)))
}
