use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "notes",
    about = concat!(
        "Universal URL → Detailed Notes Generator - ",
        "bullet-point notes from YouTube videos and web articles"
    ),
    version,
    long_about = concat!(
        "Turns a YouTube link or any article URL into detailed bullet-point notes. ",
        "Videos are read through their captions; articles through their main text ",
        "plus OCR of the first few page images. ",
        "Summaries come from a Groq-hosted LLM and can be exported as PDF."
    )
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Groq API key (overrides llm.api_key from the config file)
    #[arg(long, global = true, env = "GROQ_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate notes for a URL
    Notes {
        /// YouTube or article URL
        #[arg(value_name = "URL")]
        url: String,

        /// Output file path (prints to console if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Also export the notes as a PDF
        #[arg(long, value_name = "FILE", num_args = 0..=1, default_missing_value = "notes.pdf")]
        pdf: Option<PathBuf>,
    },

    /// Run the browser interface
    Serve {
        /// Address to listen on (defaults to server.bind from the config file)
        #[arg(short, long, value_name = "ADDR")]
        bind: Option<SocketAddr>,
    },

    /// Show or initialize the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },

    /// List supported sources
    Sources,
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Plain text
    Text,
    /// Markdown document
    Markdown,
    /// JSON report with metadata
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notes_arguments() {
        let cli = Cli::try_parse_from([
            "notes", "notes", "https://example.com", "-f", "markdown", "--pdf", "out.pdf", "-q",
        ])
        .unwrap();
        assert!(cli.quiet);
        match cli.command {
            Commands::Notes { url, format, pdf, output } => {
                assert_eq!(url, "https://example.com");
                assert!(matches!(format, OutputFormat::Markdown));
                assert_eq!(pdf, Some(PathBuf::from("out.pdf")));
                assert_eq!(output, None);
            }
            _ => panic!("expected notes command"),
        }
    }

    #[test]
    fn test_bare_pdf_flag_uses_default_name() {
        let args = ["notes", "notes", "--pdf", "--", "https://example.com"];
        let cli = Cli::try_parse_from(args).unwrap();
        match cli.command {
            Commands::Notes { pdf, .. } => assert_eq!(pdf, Some(PathBuf::from("notes.pdf"))),
            _ => panic!("expected notes command"),
        }
    }

    #[test]
    fn test_serve_bind_parses_socket_address() {
        let cli = Cli::try_parse_from(["notes", "serve", "--bind", "0.0.0.0:9000"]).unwrap();
        match cli.command {
            Commands::Serve { bind } => assert_eq!(bind.unwrap().port(), 9000),
            _ => panic!("expected serve command"),
        }
        assert!(Cli::try_parse_from(["notes", "serve", "--bind", "nope"]).is_err());
    }
}
