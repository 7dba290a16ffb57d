use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info};

use nesverify::cartridge::Cartridge;
use nesverify::diagnostics::ErrorQueue;
use nesverify::trace::{SessionConfig, TraceVerifier, VerifierState};

#[derive(Parser, Debug)]
#[command(
    name = "nesverify",
    version,
    about = "Run a NES cartridge against a nestest-style reference trace"
)]
struct Args {
    /// iNES image to load
    #[arg(value_name = "ROM")]
    rom: PathBuf,

    /// Reference trace log to verify execution against
    #[arg(long, value_name = "LOG")]
    verify: Option<PathBuf>,

    /// Print the decoded iNES header
    #[arg(long, default_value_t = false)]
    print_header: bool,

    /// Address of the first traced instruction (hex, e.g. C000)
    #[arg(long, value_name = "HEX", value_parser = parse_hex_address)]
    entry: Option<u16>,

    /// Disable coloured mismatch output
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

fn parse_hex_address(text: &str) -> Result<u16, String> {
    let digits = text
        .trim_start_matches('$')
        .trim_start_matches("0x")
        .trim_start_matches("0X");
    u16::from_str_radix(digits, 16).map_err(|e| format!("invalid address {:?}: {}", text, e))
}

fn report(errors: &mut ErrorQueue) {
    for message in errors.drain() {
        error!("{}", message);
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let cartridge = match Cartridge::load(&args.rom) {
        Ok(cartridge) => cartridge,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    info!(
        "Loaded {}: {} KB PRG, {} KB CHR, mapper {}",
        args.rom.display(),
        cartridge.prg_rom().len() / 1024,
        cartridge.chr_rom().len() / 1024,
        cartridge.mapper_id()
    );

    if args.print_header {
        println!("{}", cartridge.header());
    }

    let Some(log_path) = args.verify else {
        return ExitCode::SUCCESS;
    };

    let mut config = SessionConfig::default();
    if let Some(entry) = args.entry {
        config.entry = entry;
    }

    let mut verifier = TraceVerifier::new(&cartridge, config);
    let outcome = verifier.verify_file(&log_path);

    if let Some(mismatch) = verifier.mismatch() {
        println!("{}", mismatch.render(!args.no_color));
    }
    report(verifier.errors_mut());

    match outcome {
        Ok(VerifierState::Passed) => {
            info!(
                "Trace matches: {} instructions, {} cycles",
                verifier.lines_checked(),
                verifier.cycles()
            );
            ExitCode::SUCCESS
        }
        _ => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_address() {
        assert_eq!(parse_hex_address("C000"), Ok(0xC000));
        assert_eq!(parse_hex_address("$c5f5"), Ok(0xC5F5));
        assert_eq!(parse_hex_address("0x8000"), Ok(0x8000));
        assert!(parse_hex_address("G000").is_err());
        assert!(parse_hex_address("10000").is_err());
    }

    #[test]
    fn test_args_require_rom() {
        assert!(Args::try_parse_from(["nesverify"]).is_err());
    }

    #[test]
    fn test_args_verify_mode() {
        let args = Args::try_parse_from([
            "nesverify",
            "nestest.nes",
            "--verify",
            "nestest.log",
            "--entry",
            "C000",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(args.rom, PathBuf::from("nestest.nes"));
        assert_eq!(args.verify, Some(PathBuf::from("nestest.log")));
        assert_eq!(args.entry, Some(0xC000));
        assert!(args.no_color);
        assert!(!args.print_header);
    }
}
