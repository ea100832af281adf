use agires::logic::{decode_logic, LogicDisassembler};
use agires::picture::{decode_picture, render, PicturePrinter, Raster};
use agires::{DirectoryStorage, FileAccess, GameDescriptor, ResourceKind, ResourceStore};
use log::{debug, info};
use std::env;
use std::fs::{self, File};
use std::io::BufWriter;

fn usage(program: &str) {
    eprintln!("Usage: {} [options] <game-dir> <command>", program);
    eprintln!("\nOptions:");
    eprintln!("  -d <descriptor.toml>  Describe the game files instead of scanning the directory");
    eprintln!("  -x                    Show encoded bytes in picture listings");
    eprintln!("  -h                    Show this help message");
    eprintln!("\nCommands:");
    eprintln!("  info                                   Descriptor, layout and index summary");
    eprintln!("  list                                   Every indexed resource");
    eprintln!("  logic <id>                             Disassemble a logic resource");
    eprintln!("  picture <id> [screen.ppm [priority.ppm]]  List and render a picture");
    eprintln!("  dump <kind> <id> <out>                 Write an unpacked resource to a file");
}

fn parse_id(text: &str) -> Result<u8, String> {
    let parsed = match text.strip_prefix("0x") {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => text.parse::<u8>(),
    };
    parsed.map_err(|_| format!("Invalid resource id: {}", text))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();

    let mut descriptor_path = None;
    let mut show_bytes = false;
    let mut positional = Vec::new();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-d" => {
                i += 1;
                match args.get(i) {
                    Some(path) => descriptor_path = Some(path.clone()),
                    None => {
                        eprintln!("-d needs a descriptor file");
                        std::process::exit(1);
                    }
                }
            }
            "-x" => show_bytes = true,
            "-h" | "--help" => {
                usage(&args[0]);
                std::process::exit(0);
            }
            arg if !arg.starts_with('-') => positional.push(arg.to_string()),
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                std::process::exit(1);
            }
        }
        i += 1;
    }

    if positional.len() < 2 {
        usage(&args[0]);
        std::process::exit(1);
    }
    let game_dir = &positional[0];
    let command = positional[1].as_str();
    let rest = &positional[2..];

    let storage = DirectoryStorage::new(game_dir);
    let descriptor = match &descriptor_path {
        Some(path) => GameDescriptor::load(path)?,
        None => GameDescriptor::scan(storage.list()?),
    };
    debug!("Descriptor: {}", descriptor);

    let store = ResourceStore::open(descriptor, storage)?;
    info!(
        "Opened {} with {} indexed resources",
        game_dir,
        store.index().len()
    );

    match (command, rest) {
        ("info", []) => {
            print!("{}", store.descriptor());
            println!("layout: {:?}", store.layout());
            for kind in ResourceKind::DIRECTORY_KINDS {
                println!("  {:<10} {} resources", kind.to_string(), store.ids(kind).len());
            }
            println!("dropped entries: {}", store.index().dropped());
            for name in store.descriptor().files.values() {
                if store.storage().exists(name) {
                    println!("  {:<12} {}", name, store.storage().content_hash(name)?);
                }
            }
        }
        ("list", []) => {
            for (kind, id, entry) in store.index().iter() {
                println!("{:<8} {:3}  {}", kind.to_string(), id, entry);
            }
            for kind in [ResourceKind::Objects, ResourceKind::Words] {
                if store.exists(kind, 0) {
                    println!("{:<8} {:3}", kind.to_string(), 0);
                }
            }
        }
        ("logic", [id]) => {
            let data = store.extract(ResourceKind::Logic, parse_id(id)?)?;
            let mut disassembler = LogicDisassembler::new();
            decode_logic(&data, &mut disassembler)?;
            print!("{}", disassembler);
        }
        ("picture", [id, outputs @ ..]) if outputs.len() <= 2 => {
            let data = store.extract(ResourceKind::Picture, parse_id(id)?)?;
            let mut printer = if show_bytes {
                PicturePrinter::with_bytes()
            } else {
                PicturePrinter::new()
            };
            decode_picture(&data, &mut printer);
            print!("{}", printer);

            let raster = render(store.descriptor().archive_version, &data);
            if let Some(path) = outputs.first() {
                Raster::write_ppm(raster.screen(), &mut BufWriter::new(File::create(path)?))?;
                info!("Wrote screen plane to {}", path);
            }
            if let Some(path) = outputs.get(1) {
                let (priority, _) = raster.split_priority_and_control();
                Raster::write_ppm(&priority, &mut BufWriter::new(File::create(path)?))?;
                info!("Wrote priority plane to {}", path);
            }
        }
        ("dump", [kind, id, out]) => {
            let kind: ResourceKind = kind.parse()?;
            let data = store.extract(kind, parse_id(id)?)?;
            fs::write(out, &data)?;
            info!("Wrote {} bytes of {} {} to {}", data.len(), kind, id, out);
        }
        _ => {
            eprintln!("Unknown command or wrong arguments: {}", positional[1..].join(" "));
            usage(&args[0]);
            std::process::exit(1);
        }
    }

    Ok(())
}
