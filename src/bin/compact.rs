use std::{env, process};

use genomicsqlite::{utils, GenomicSQLiteConfig};

use getopts::Options;

//-----------------------------------------------------------------------------

// Emits the SQL script that copies a SQLite database into a compressed file.
// The script is meant to be piped into a shell with the zstd VFS loaded,
// e.g. `sqlite3 input.db < script.sql`.

fn main() -> Result<(), String> {
    let config = Config::new();

    if !utils::file_exists(&config.db_file) {
        return Err(format!("Input database {} does not exist", config.db_file));
    }
    if utils::file_exists(&config.dest_file) {
        return Err(format!("Output file {} already exists", config.dest_file));
    }

    let script = genomicsqlite::vacuum_into_sql(&config.dest_file, &config.options)
        .map_err(|x| x.to_string())?;
    println!("{};", script);

    let size = utils::file_size(&config.db_file).unwrap_or(String::from("unknown"));
    eprintln!("Input database size: {}", size);
    eprintln!("Writing compressed copy to {}", config.dest_file);

    Ok(())
}

//-----------------------------------------------------------------------------

struct Config {
    pub db_file: String,
    pub dest_file: String,
    pub options: GenomicSQLiteConfig,
}

impl Config {
    pub fn new() -> Config {
        let args: Vec<String> = env::args().collect();
        let program = args[0].clone();

        let mut opts = Options::new();
        opts.optflag("h", "help", "print this help");
        opts.optopt("o", "output", "output file name (default: <input>.compact)", "FILE");
        opts.optopt("l", "level", "zstd compression level (default: 6)", "INT");
        opts.optopt("", "inner-page", "SQLite page size in KiB (default: 16)", "KIB");
        opts.optopt("", "outer-page", "compressed block size in KiB (default: 32)", "KIB");
        let matches = match opts.parse(&args[1..]) {
            Ok(m) => m,
            Err(f) => {
                eprintln!("{}", f);
                process::exit(1);
            }
        };

        if matches.opt_present("h") {
            let header = format!("Usage: {} [options] input.db", program);
            eprint!("{}", opts.usage(&header));
            process::exit(0);
        }

        let db_file = if let Some(s) = matches.free.first() {
            s.clone()
        } else {
            let header = format!("Usage: {} [options] input.db", program);
            eprint!("{}", opts.usage(&header));
            process::exit(1);
        };
        let dest_file = matches
            .opt_str("o")
            .unwrap_or_else(|| format!("{}.compact", db_file));

        let mut options = GenomicSQLiteConfig::default();
        options.unsafe_load = true;
        if let Some(level) = Self::int_option(&matches, "level") {
            options.zstd_level = level;
        }
        if let Some(kib) = Self::int_option(&matches, "inner-page") {
            options.inner_page_kib = kib;
        }
        if let Some(kib) = Self::int_option(&matches, "outer-page") {
            options.outer_page_kib = kib;
        }

        Config {
            db_file,
            dest_file,
            options,
        }
    }

    fn int_option(matches: &getopts::Matches, name: &str) -> Option<i64> {
        let value = matches.opt_str(name)?;
        match value.parse::<i64>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                eprintln!("Invalid value for --{}: {}", name, value);
                process::exit(1);
            }
        }
    }
}

//-----------------------------------------------------------------------------
