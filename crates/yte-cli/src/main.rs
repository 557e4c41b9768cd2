use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use yte_core::{Config, Session};

#[derive(Parser, Debug)]
#[command(
    name = "yte-cli",
    about = "List, search and edit string values across a folder of YAML files",
    version
)]
struct Cli {
    /// Config file (JSON); defaults to ./yte.json when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// More logging (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List every string value in a folder as `file :: path :: preview`
    List(ListArgs),
    /// Print the string value at a path
    Get(GetArgs),
    /// Set the string value at a path and write the file back
    Set(SetArgs),
    /// List every occurrence of a term
    Find(FindArgs),
    /// Replace every occurrence of a term in all files of a folder
    Replace(ReplaceArgs),
}

#[derive(ClapArgs, Debug)]
struct ListArgs {
    /// Folder containing .yaml/.yml files
    folder: PathBuf,
    /// Emit the items as JSON instead of rows
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[derive(ClapArgs, Debug)]
struct GetArgs {
    /// YAML file to read
    file: PathBuf,
    /// Dotted path, e.g. menu.items[0].label
    #[arg(long)]
    path: String,
}

#[derive(ClapArgs, Debug)]
struct SetArgs {
    /// YAML file to edit
    file: PathBuf,
    /// Dotted path, e.g. menu.items[0].label
    #[arg(long)]
    path: String,
    /// New string value
    #[arg(long)]
    value: String,
    /// Print the resulting document instead of writing it
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[derive(ClapArgs, Debug)]
struct FindArgs {
    /// Folder containing .yaml/.yml files
    folder: PathBuf,
    /// Literal search term
    #[arg(long)]
    term: String,
    #[arg(long, default_value_t = false)]
    case_sensitive: bool,
}

#[derive(ClapArgs, Debug)]
struct ReplaceArgs {
    /// Folder containing .yaml/.yml files
    folder: PathBuf,
    /// Literal search term
    #[arg(long)]
    term: String,
    /// Replacement text (literal)
    #[arg(long = "with")]
    replacement: String,
    #[arg(long, default_value_t = false)]
    case_sensitive: bool,
    /// Zip the folder's YAML files before writing
    #[arg(long, default_value_t = false)]
    backup: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = load_config(cli.config.as_deref());
    match cli.cmd {
        Cmd::List(a) => cmd_list(a, config),
        Cmd::Get(a) => cmd_get(a),
        Cmd::Set(a) => cmd_set(a, config),
        Cmd::Find(a) => cmd_find(a, config),
        Cmd::Replace(a) => cmd_replace(a, config),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Config {
    let path = path.unwrap_or(Path::new(yte_core::config::CONFIG_FILENAME));
    Config::load(path).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    })
}

fn open_session(folder: &Path, config: Config) -> Session {
    let mut session = Session::new(config);
    match session.open(folder) {
        Ok(report) => {
            for f in &report.failures {
                eprintln!("warning: {}", f);
            }
            tracing::info!("{}", report);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    }
    session
}

fn cmd_list(args: ListArgs, config: Config) {
    let session = open_session(&args.folder, config);
    if args.json {
        match serde_json::to_string_pretty(session.items()) {
            Ok(s) => println!("{}", s),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(4);
            }
        }
        return;
    }
    for row in session.rows() {
        println!("{}", row);
    }
}

fn cmd_get(args: GetArgs) {
    let doc = yte_core::codec::load_file(&args.file).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    match yte_core::get_str(&doc, &args.path) {
        Some(s) => println!("{}", s),
        None => {
            eprintln!("not found: {}", args.path);
            std::process::exit(3);
        }
    }
}

fn cmd_set(args: SetArgs, config: Config) {
    let mut doc = yte_core::codec::load_file(&args.file).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(2);
    });
    if !yte_core::set_str(&mut doc, &args.path, &args.value, config.missing_key) {
        eprintln!("cannot set: {}", args.path);
        std::process::exit(3);
    }
    if args.dry_run {
        match yte_core::codec::to_text(&args.file, &doc) {
            Ok(s) => print!("{}", s),
            Err(e) => {
                eprintln!("error: {}", e);
                std::process::exit(4);
            }
        }
    } else if let Err(e) = yte_core::codec::write_file(&args.file, &doc) {
        eprintln!("error writing: {}", e);
        std::process::exit(4);
    }
}

fn cmd_find(args: FindArgs, config: Config) {
    let session = open_session(&args.folder, config);
    let matcher = yte_core::Matcher::new(&args.term, args.case_sensitive).unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        std::process::exit(3);
    });
    let hits = yte_core::find_all(session.items(), &matcher);
    if hits.is_empty() {
        eprintln!("'{}' not found", args.term);
        std::process::exit(3);
    }
    for h in &hits {
        let item = &session.items()[h.item];
        println!(
            "{} :: {} :: {}..{} :: {}",
            item.file_name(),
            item.path,
            h.start,
            h.end,
            yte_core::preview(&item.value, session.config().preview_chars)
        );
    }
}

fn cmd_replace(args: ReplaceArgs, mut config: Config) {
    config.backup_before_replace_all |= args.backup;
    let mut session = open_session(&args.folder, config);
    match session.replace_all(&args.term, &args.replacement, args.case_sensitive) {
        Ok(report) => {
            if let Some(zip) = &report.backup {
                println!("Backup: {}", zip.display());
            }
            println!("{}", report);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(4);
        }
    }
}
