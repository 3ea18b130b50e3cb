use anyhow::{Context, Result};
use bute::{BlockCodec, ButeFile};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "butetool")]
#[command(about = "Inspect, round-trip and (de)crypt attribute files", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a file and print its groups, attributes and checksum
    Dump {
        /// Attribute file to read
        file: PathBuf,

        /// Decryption key for encrypted files
        #[arg(short, long)]
        key: Option<String>,
    },
    /// Parse a file and write it back out in canonical form
    Roundtrip {
        /// Attribute file to read
        input: PathBuf,

        /// Destination path
        output: PathBuf,
    },
    /// Encrypt a plain-text attribute file
    Encrypt {
        input: PathBuf,
        output: PathBuf,

        /// Cipher key (4 to 56 bytes)
        #[arg(short, long)]
        key: String,
    },
    /// Decrypt an encrypted attribute file
    Decrypt {
        input: PathBuf,
        output: PathBuf,

        /// Cipher key (4 to 56 bytes)
        #[arg(short, long)]
        key: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dump { file, key } => {
            let table = match key {
                Some(key) => ButeFile::from_encrypted_file(&file, key.as_bytes()),
                None => ButeFile::from_file(&file),
            }
            .with_context(|| format!("loading {}", file.display()))?;

            for tag in table.tags() {
                println!("[{}]", tag);
                for (name, value) in table.attrs(tag)? {
                    println!("  {} = {}  ({})", name, value, value.type_name());
                }
            }
            println!("checksum: {:#010x}", table.checksum());
        }
        Commands::Roundtrip { input, output } => {
            let table = ButeFile::from_file(&input)
                .with_context(|| format!("loading {}", input.display()))?;
            table
                .save_file(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("wrote {}", output.display());
        }
        Commands::Encrypt { input, output, key } => {
            let plain = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let cipher_text = BlockCodec::new(key.as_bytes())?.encrypt(&plain);
            std::fs::write(&output, cipher_text)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("encrypted {} -> {}", input.display(), output.display());
        }
        Commands::Decrypt { input, output, key } => {
            let cipher_text = std::fs::read(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let plain = BlockCodec::new(key.as_bytes())?.decrypt(&cipher_text)?;
            std::fs::write(&output, plain)
                .with_context(|| format!("writing {}", output.display()))?;
            println!("decrypted {} -> {}", input.display(), output.display());
        }
    }

    Ok(())
}
