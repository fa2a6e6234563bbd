use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use libgolo::core::samples::{f64_to_i16, i16_to_f64};
use libgolo::{
    AudioDecoder, AudioEncoder, BitReader, BitWriter, Golomb, ImageDecoder, ImageEncoder,
    ImagePredictor, SignMode, TransformDecoder, TransformEncoder,
};

mod audio_io;
mod ppm;

#[derive(Parser)]
#[command(name = "regolo")]
#[command(version = "0.1.0")]
#[command(about = "Golomb-coded predictive codecs", long_about = None)]
struct Cli {
    /// Print per-block diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lossless PCM audio compression
    Audio {
        #[command(subcommand)]
        command: AudioCommands,
    },
    /// Lossless grayscale image compression
    Image {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Lossy DCT audio compression (mono)
    Lossy {
        #[command(subcommand)]
        command: LossyCommands,
    },
    /// Golomb-code individual integers
    Golomb {
        #[command(subcommand)]
        command: GolombCommands,
    },
}

#[derive(Subcommand)]
enum AudioCommands {
    /// Encode a WAV file to .gblk
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Frames per block
        #[arg(long, default_value = "4096")]
        block: u32,
        /// Golomb parameter (0 = adaptive per block)
        #[arg(short, long, default_value = "0")]
        m: u32,
        /// Predictor order (0-3)
        #[arg(short, long, default_value = "2")]
        order: u8,
    },
    /// Decode a .gblk file to WAV
    Decode { input: PathBuf, output: PathBuf },
}

#[derive(Subcommand)]
enum ImageCommands {
    /// Encode a PPM P5 image to .gimg
    Encode {
        input: PathBuf,
        output: PathBuf,
        /// Predictor index (0-8), or -1 to search all of them
        #[arg(short, long, default_value = "8", allow_hyphen_values = true)]
        predictor: i32,
        /// Try every predictor and keep the smallest output
        #[arg(long)]
        auto: bool,
        /// Golomb parameter (0 = adaptive per block)
        #[arg(short, long, default_value = "0")]
        m: u32,
        /// Block size in pixels (0 = one row)
        #[arg(long, default_value = "0")]
        block: u32,
    },
    /// Decode a .gimg file to PPM P5
    Decode { input: PathBuf, output: PathBuf },
}

#[derive(Subcommand)]
enum LossyCommands {
    /// Encode a mono WAV file with the DCT codec
    Encode { input: PathBuf, output: PathBuf },
    /// Decode a DCT stream to WAV
    Decode { input: PathBuf, output: PathBuf },
}

#[derive(Subcommand)]
enum GolombCommands {
    /// Print the codewords for one or more integers
    Encode {
        #[arg(short, long, default_value = "4")]
        m: u32,
        /// interleaving or sign-magnitude
        #[arg(long, default_value = "interleaving")]
        mode: String,
        #[arg(required = true, allow_hyphen_values = true)]
        values: Vec<i32>,
    },
    /// Decode one or more bit strings (e.g. "00110")
    Decode {
        #[arg(short, long, default_value = "4")]
        m: u32,
        /// interleaving or sign-magnitude
        #[arg(long, default_value = "interleaving")]
        mode: String,
        #[arg(required = true)]
        bits: Vec<String>,
    },
}

fn main() {
    // Exit codes: 0 success, 1 usage error, 2 runtime failure.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version come through this path and exit 0.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("Error: {err:#}");
        std::process::exit(2);
    }
}

fn run(cli: Cli) -> Result<()> {
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_target(false)
            .init();
    }

    match cli.command {
        Commands::Audio { command } => match command {
            AudioCommands::Encode {
                input,
                output,
                block,
                m,
                order,
            } => audio_encode(&input, &output, block, m, order),
            AudioCommands::Decode { input, output } => audio_decode(&input, &output),
        },
        Commands::Image { command } => match command {
            ImageCommands::Encode {
                input,
                output,
                predictor,
                auto,
                m,
                block,
            } => image_encode(&input, &output, predictor, auto, m, block),
            ImageCommands::Decode { input, output } => image_decode(&input, &output),
        },
        Commands::Lossy { command } => match command {
            LossyCommands::Encode { input, output } => lossy_encode(&input, &output),
            LossyCommands::Decode { input, output } => lossy_decode(&input, &output),
        },
        Commands::Golomb { command } => match command {
            GolombCommands::Encode { m, mode, values } => golomb_encode(m, &mode, &values),
            GolombCommands::Decode { m, mode, bits } => golomb_decode(m, &mode, &bits),
        },
    }
}

fn audio_encode(input: &PathBuf, output: &PathBuf, block: u32, m: u32, order: u8) -> Result<()> {
    println!("Reading {}...", input.display());
    let (samples, sample_rate, channels) = audio_io::read_audio_i16(input)?;

    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Channels: {}", channels);
    println!("  Frames: {}", samples.len() / channels.max(1) as usize);
    if m == 0 {
        println!("Encoding (block {block} frames, adaptive m, order {order})...");
    } else {
        println!("Encoding (block {block} frames, m = {m}, order {order})...");
    }

    let encoder = AudioEncoder::new(block, m, order)?;
    let sink = BufWriter::new(fs::File::create(output).context("Failed to create output file")?);
    encoder.encode(&samples, sample_rate, channels, sink)?;

    let original_size = samples.len() * 2;
    let compressed_size = fs::metadata(output)?.len() as usize;
    println!("Done!");
    println!(
        "  Size: {} bytes ({:.1}x compression)",
        compressed_size,
        original_size as f64 / compressed_size.max(1) as f64
    );
    Ok(())
}

fn audio_decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());
    let source = BufReader::new(fs::File::open(input).context("Failed to open input file")?);
    let decoded = AudioDecoder::new().decode(source)?;

    println!("  Sample rate: {} Hz", decoded.sample_rate);
    println!("  Channels: {}", decoded.channels);
    println!("Writing WAV...");
    audio_io::write_wav_i16(output, &decoded.samples, decoded.sample_rate, decoded.channels)?;
    println!("Done!");
    Ok(())
}

fn image_encode(
    input: &PathBuf,
    output: &PathBuf,
    predictor: i32,
    auto: bool,
    m: u32,
    block: u32,
) -> Result<()> {
    println!("Reading {}...", input.display());
    let image = ppm::read_ppm(input)?;
    println!("  Image: {}x{} (8-bit grayscale)", image.width, image.height);

    let chosen = if auto || predictor < 0 {
        println!("Encoding (searching all predictors)...");
        None
    } else {
        if predictor > 8 {
            bail!("Predictor index {predictor} out of range -1..=8");
        }
        let p = ImagePredictor::from_index(predictor as u8)?;
        println!("Encoding (predictor {p:?})...");
        Some(p)
    };

    let encoder = ImageEncoder::new(chosen, m, block)?;
    let sink = BufWriter::new(fs::File::create(output).context("Failed to create output file")?);
    encoder.encode(&image, sink)?;

    let original_size = image.pixels.len();
    let compressed_size = fs::metadata(output)?.len() as usize;
    println!("Done!");
    println!(
        "  Size: {} bytes ({:.1}% of original)",
        compressed_size,
        100.0 * compressed_size as f64 / original_size.max(1) as f64
    );
    Ok(())
}

fn image_decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());
    let source = BufReader::new(fs::File::open(input).context("Failed to open input file")?);
    let image = ImageDecoder::new().decode(source)?;
    println!("  Image: {}x{}", image.width, image.height);
    ppm::write_ppm(output, &image)?;
    println!("Done!");
    Ok(())
}

fn lossy_encode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());
    let (samples, sample_rate, channels) = audio_io::read_audio_i16(input)?;
    if channels != 1 {
        bail!("Only mono audio is supported by the lossy codec (got {channels} channels)");
    }

    println!("  Sample rate: {} Hz", sample_rate);
    println!("  Frames: {}", samples.len());
    println!("Encoding (DCT, adaptive quantization)...");

    let samples_f64: Vec<f64> = samples.iter().map(|&s| i16_to_f64(s)).collect();
    let sink = BufWriter::new(fs::File::create(output).context("Failed to create output file")?);
    TransformEncoder::new().encode(&samples_f64, sample_rate, sink)?;

    let compressed_size = fs::metadata(output)?.len() as usize;
    println!("Done!");
    println!(
        "  Size: {} bytes ({:.1}x compression)",
        compressed_size,
        (samples.len() * 2) as f64 / compressed_size.max(1) as f64
    );
    Ok(())
}

fn lossy_decode(input: &PathBuf, output: &PathBuf) -> Result<()> {
    println!("Reading {}...", input.display());
    let source = BufReader::new(fs::File::open(input).context("Failed to open input file")?);
    let decoded = TransformDecoder::new().decode(source)?;

    println!("  Sample rate: {} Hz", decoded.sample_rate);
    println!("  Frames: {}", decoded.samples.len());
    let samples: Vec<i16> = decoded.samples.iter().map(|&s| f64_to_i16(s)).collect();
    audio_io::write_wav_i16(output, &samples, decoded.sample_rate, 1)?;
    println!("Done!");
    Ok(())
}

fn parse_sign_mode(mode: &str) -> Result<SignMode> {
    match mode {
        "interleaving" => Ok(SignMode::Interleaving),
        "sign-magnitude" => Ok(SignMode::SignMagnitude),
        other => bail!("Invalid mode '{other}'. Use 'interleaving' or 'sign-magnitude'"),
    }
}

fn golomb_encode(m: u32, mode: &str, values: &[i32]) -> Result<()> {
    let coder = Golomb::new(m, parse_sign_mode(mode)?)?;
    for &value in values {
        let mut bits = BitWriter::new(Vec::new());
        coder.encode(value, &mut bits)?;
        let bytes = bits.finish()?;
        let len = coder.encoded_len(value);

        let codeword: String = (0..len)
            .map(|i| {
                let bit = (bytes[(i / 8) as usize] >> (7 - i % 8)) & 1;
                char::from(b'0' + bit)
            })
            .collect();
        println!("{value} -> {codeword}");
    }
    Ok(())
}

fn golomb_decode(m: u32, mode: &str, bit_strings: &[String]) -> Result<()> {
    let coder = Golomb::new(m, parse_sign_mode(mode)?)?;
    for bit_string in bit_strings {
        let mut bytes = Vec::new();
        let mut current = 0u8;
        for (i, c) in bit_string.chars().enumerate() {
            match c {
                '0' => {}
                '1' => current |= 1 << (7 - i % 8),
                other => bail!("Invalid bit '{other}' in '{bit_string}'"),
            }
            if i % 8 == 7 {
                bytes.push(current);
                current = 0;
            }
        }
        if bit_string.len() % 8 != 0 {
            bytes.push(current);
        }

        let mut reader = BitReader::new(&bytes[..]);
        let value = coder.decode(&mut reader)?;
        println!("{bit_string} -> {value}");
    }
    Ok(())
}
