use std::error::Error;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use log::{debug, error, info};

use prbs::ber::{BerConfig, BerCounter};
use prbs::{Poly, PrbsGenerator};

use crate::poly_selector::{parse_word, PolySelector};

mod poly_selector;

/// Pseudo random binary sequence generator, noise source and checker.
#[derive(Parser, Debug)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the catalogued maximum length polynomials.
    List,
    /// Print bits of the sequence as 0s and 1s.
    Bits {
        /// Catalogue degree (`g8`, `8`) or raw polynomial in hex (`0x8e`).
        #[arg(short, long, default_value_t)]
        poly: PolySelector,
        /// Number of bits to print.
        #[arg(short, long, default_value_t = 64)]
        count: u64,
        /// Initial register state (defaults to all ones).
        #[arg(short, long, value_parser = parse_word)]
        state: Option<u32>,
        /// Start so that the first `degree` bits printed are these, first bit in the LSB.
        #[arg(long, value_parser = parse_word, conflicts_with = "state")]
        sync_back: Option<u32>,
    },
    /// Write noise as raw little-endian 16 bit PCM, one sequence bit per sample.
    Noise {
        #[arg(short, long, default_value_t)]
        poly: PolySelector,
        /// Number of samples to produce.
        #[arg(short = 'n', long, default_value_t = 48000)]
        samples: u64,
        /// Sample magnitude.
        #[arg(short, long, default_value_t = 8192)]
        amplitude: i16,
        /// File to write to. Writes to stdout if not given.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Compute the remainder of a file, each byte fed LSB first.
    Crc {
        #[arg(short, long, default_value_t)]
        poly: PolySelector,
        /// Initial register state (defaults to all ones).
        #[arg(short, long, value_parser = parse_word)]
        init: Option<u32>,
        file: PathBuf,
    },
    /// Count bit errors in a file that should contain the sequence, each byte LSB first.
    Ber {
        #[arg(short, long, default_value_t)]
        poly: PolySelector,
        /// Number of bits per error-counting window.
        #[arg(short, long, default_value_t = BerConfig::default().window)]
        window: u32,
        /// Errors within one window after which sync is considered lost.
        #[arg(short, long, default_value_t = BerConfig::default().max_errors)]
        max_errors: u32,
        file: PathBuf,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    debug!("{:?}", args);

    if let Err(err) = run(args.command) {
        error!("{}", err);
        process::exit(1);
    }
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::List => {
            for poly in Poly::ALL {
                println!("{}  period {}", poly, poly.period());
            }
        }
        Command::Bits {
            poly,
            count,
            state,
            sync_back,
        } => {
            let mut gen = generator(poly)?;
            if let Some(state) = state {
                gen.set_state(state)?;
            }
            if let Some(bits) = sync_back {
                gen.sync_back(bits);
            }
            write_bits(&mut gen, count, io::stdout().lock())?;
        }
        Command::Noise {
            poly,
            samples,
            amplitude,
            output,
        } => {
            let mut gen = generator(poly)?;
            match output {
                Some(path) => {
                    info!("Writing {} samples to {}", samples, path.display());
                    write_noise(&mut gen, samples, amplitude, File::create(path)?)?;
                }
                None => write_noise(&mut gen, samples, amplitude, io::stdout().lock())?,
            }
        }
        Command::Crc { poly, init, file } => {
            let mut gen = generator(poly)?;
            if let Some(init) = init {
                gen.set_state(init)?;
            }
            let data = fs::read(&file)?;
            info!("Computing remainder of {} bytes", data.len());
            gen.crc_in_bytes(&data);
            let digits = ((gen.degree() + 3) / 4) as usize;
            println!("{:0digits$X}", gen.crc_remainder(), digits = digits);
        }
        Command::Ber {
            poly,
            window,
            max_errors,
            file,
        } => {
            let config = BerConfig { window, max_errors };
            let mut counter = BerCounter::new(poly.bits(), config)?;
            info!("Counting errors with {:?}", counter.config());
            let data = fs::read(&file)?;
            counter.push_bytes(&data);
            let stats = counter.stats();
            println!("bits:        {}", stats.bits);
            println!("errors:      {}", stats.errors);
            println!("rate:        {:e}", stats.rate());
            println!("sync losses: {}", stats.sync_losses);
            println!("locked:      {}", counter.is_locked());
        }
    }
    Ok(())
}

fn generator(poly: PolySelector) -> Result<PrbsGenerator, Box<dyn Error>> {
    info!("Using polynomial {}", poly);
    Ok(PrbsGenerator::with_poly(poly.bits())?)
}

/// Print `count` bits, 64 to a line.
fn write_bits(gen: &mut PrbsGenerator, count: u64, dest: impl Write) -> io::Result<()> {
    let mut dest = BufWriter::new(dest);
    for i in 0..count {
        dest.write_all(if gen.step() { b"1" } else { b"0" })?;
        if i % 64 == 63 {
            dest.write_all(b"\n")?;
        }
    }
    if count % 64 != 0 {
        dest.write_all(b"\n")?;
    }
    dest.flush()
}

/// Write `samples` samples of `+amplitude` or `-amplitude`.
fn write_noise(
    gen: &mut PrbsGenerator,
    samples: u64,
    amplitude: i16,
    dest: impl Write,
) -> io::Result<()> {
    let mut dest = BufWriter::new(dest);
    let low = amplitude.saturating_neg();
    for _ in 0..samples {
        let sample = if gen.step() { amplitude } else { low };
        dest.write_all(&sample.to_le_bytes())?;
    }
    dest.flush()
}
