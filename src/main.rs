use clap::Parser;
use std::process;
use taf_processor::cli::{args::Args, commands};

fn main() {
    let args = Args::parse();

    // If no subcommand was provided, show help and available commands
    if args.command.is_none() {
        show_help_and_commands();
        process::exit(0);
    }

    match commands::run(args) {
        Ok(stats) if stats.all_files_failed() => {
            eprintln!("Error: none of the {} input files could be read", stats.files_found);
            process::exit(1);
        }
        Ok(_stats) => {
            // Stats have already been reported by the command
            process::exit(0);
        }
        Err(error) => {
            eprintln!("Error: {:#}", anyhow::Error::new(error));
            process::exit(1);
        }
    }
}

/// Show help information and available commands when no subcommand is provided
fn show_help_and_commands() {
    println!("TAF Processor - Terminal Aerodrome Forecast Decoder");
    println!("===================================================");
    println!();
    println!("Decode TAF bulletins into structured forecast records and store them,");
    println!("with the raw message text, in a time-indexed chunk store.");
    println!();
    println!("USAGE:");
    println!("    taf-processor <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    process     Ingest bulletin files into the chunk store (main command)");
    println!("    decode      Decode a file or message and print the records as JSON");
    println!("    help        Show this help message or help for specific commands");
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Show help information");
    println!("    -V, --version    Show version information");
    println!();
    println!("EXAMPLES:");
    println!("    # Ingest an archive window:");
    println!("    taf-processor process --mode archive --input raw/taf \\");
    println!("                          --start 2024-03-26 --end 2024-03-27");
    println!();
    println!("    # Ingest specific files, keeping only two stations:");
    println!("    taf-processor process --files 'raw/taf/20240326/*.txt' --accept KDEN,KBOU");
    println!();
    println!("    # Decode a single message:");
    println!("    taf-processor decode --text 'TAF KDEN 261130Z 2612/2712 09008KT P6SM SKC'");
    println!();
    println!("For detailed help on any command, use:");
    println!("    taf-processor <COMMAND> --help");
}
