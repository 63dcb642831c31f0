use clap_mangen::Man;
use std::fs::File;
use std::path::Path;

use clap::CommandFactory;
use runbeacon::cli::Cli;

fn main() -> std::io::Result<()> {
    let out_path = std::env::args().nth(1).unwrap_or_else(|| "runbeacon.1".to_string());
    let path = Path::new(&out_path);
    let mut file = File::create(path)?;
    Man::new(Cli::command()).render(&mut file)?;
    eprintln!("Generated man page at {}", path.display());
    Ok(())
}
