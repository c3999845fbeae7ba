//! m6502 runner - executes a 6502 test image and reports how it ended.

use std::cell::Cell;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use log::{LevelFilter, Metadata, Record};
use m6502::cpu::table;
use m6502::{AnyMapper, Cpu, CpuConfig, Event, FullRw, Mapper, RunOutcome, cartridge};

/// 6502 test-image runner
#[derive(Parser, Debug)]
#[command(name = "m6502")]
#[command(about = "Run a 6502 program image", long_about = None)]
struct Args {
    /// Path to an iNES ROM, or a raw 64 KiB image with --flat
    image: Option<PathBuf>,

    /// Treat the image as a flat 64 KiB memory dump
    #[arg(long)]
    flat: bool,

    /// Start address for flat images (hex, e.g. 0400)
    #[arg(long, value_parser = parse_hex, default_value = "0400")]
    pc: u16,

    /// Address whose execution means the program passed (hex)
    #[arg(long, value_parser = parse_hex)]
    success: Option<u16>,

    /// Stop after this many instructions
    #[arg(short, long)]
    limit: Option<u64>,

    /// Opcode that ends the run cleanly (hex, e.g. DB)
    #[arg(long, value_parser = parse_hex_byte)]
    stop: Option<u8>,

    /// Fail when an instruction jumps to itself
    #[arg(long)]
    check_stuck: bool,

    /// Keep a per-instruction trace for fault reports
    #[arg(short, long)]
    trace: bool,

    /// Write the code/data log (one flag byte per ROM offset) here
    #[arg(long)]
    cdl: Option<PathBuf>,

    /// Write the listing of executed instructions here
    #[arg(long)]
    visited: Option<PathBuf>,

    /// Print every implemented opcode and exit
    #[arg(long)]
    list_opcodes: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn parse_hex(s: &str) -> Result<u16, String> {
    let digits = s.trim_start_matches('$').trim_start_matches("0x");
    u16::from_str_radix(digits, 16).map_err(|e| format!("bad address {s:?}: {e}"))
}

fn parse_hex_byte(s: &str) -> Result<u8, String> {
    let digits = s.trim_start_matches('$').trim_start_matches("0x");
    u8::from_str_radix(digits, 16).map_err(|e| format!("bad opcode {s:?}: {e}"))
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{:<5}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

fn load_mapper(args: &Args, bytes: Vec<u8>) -> Result<AnyMapper, String> {
    if args.flat {
        let mem = FullRw::new(bytes).map_err(|e| format!("Failed to load flat image: {e}"))?;
        return Ok(mem.into());
    }
    cartridge::load(&bytes).map_err(|e| format!("Failed to load cartridge: {e}"))
}

fn run(args: &Args) -> Result<bool, String> {
    let Some(path) = &args.image else {
        return Err("no image given (see --help)".to_string());
    };
    let bytes = fs::read(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let mapper = load_mapper(args, bytes)?;
    println!("Loaded {}: {}", mapper.name(), mapper.describe());

    let config = CpuConfig {
        check_stuck: args.check_stuck,
        trace: args.trace,
        instruction_limit: args.limit,
        stop_opcode: args.stop,
        cdl: args.cdl.is_some() || args.visited.is_some(),
        ..CpuConfig::default()
    };
    let mut cpu = Cpu::with_config(mapper, config).map_err(|e| e.to_string())?;
    if args.flat {
        cpu.state_mut().pc = args.pc;
    }

    let interrupt = cpu.halt_handle();
    if let Err(e) = ctrlc::set_handler(move || interrupt.halt()) {
        log::warn!("Ctrl-C will not stop the run: {e}");
    }

    let passed = Rc::new(Cell::new(false));
    if let Some(address) = args.success {
        let flag = Rc::clone(&passed);
        cpu.register_breakpoint(Event::EXECUTE, "success", address, move |ctx| {
            flag.set(true);
            ctx.request_halt();
        });
    }

    let result = cpu.run();
    write_logs(args, &cpu)?;
    let outcome = match result {
        Ok(outcome) => outcome,
        Err(fault) => {
            for line in &fault.trace {
                println!("{line}");
            }
            println!("{}", cpu.registers());
            return Err(format!("Fault after {} instructions: {fault}", cpu.ticks()));
        }
    };

    println!("{outcome:?} after {} instructions", cpu.ticks());
    println!("  PC:   ${:04X}", cpu.state().pc);
    println!("  {}", cpu.registers());

    Ok(match args.success {
        Some(_) => passed.get(),
        None => matches!(outcome, RunOutcome::Stopped | RunOutcome::Returned),
    })
}

fn write_logs(args: &Args, cpu: &Cpu<AnyMapper>) -> Result<(), String> {
    let log = cpu.code_data_log();
    if let Some(path) = &args.cdl {
        let file = File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
        log.write_cdl(BufWriter::new(file))
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }
    if let Some(path) = &args.visited {
        let file = File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
        log.write_visited(BufWriter::new(file))
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if args.list_opcodes {
        for line in table::listing() {
            println!("{line}");
        }
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("Program did not reach its success condition");
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
