//! Command-line arguments

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "seal-cli")]
#[command(version, about = "Generate seal images and stamp them onto contract PDFs")]
pub struct Cli {
    /// TOML configuration file; built-in defaults when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Render a seal image to PNG
    Seal(SealArgs),
    /// Render a personal signature to PNG
    Signature(SignatureArgs),
    /// List fonts available for signatures
    Fonts,
    /// Stamp seals or signatures onto a contract (JSON request file)
    Stamp(RequestArgs),
    /// Apply a perforation seal across every page (JSON request file)
    Perforate(RequestArgs),
    /// Render page previews of a contract's current version
    Preview(PreviewArgs),
    /// Convert a preview pixel position to PDF points
    Locate(LocateArgs),
}

#[derive(Args, Debug)]
pub struct SealArgs {
    /// Text set along the seal's edge
    #[arg(long)]
    pub company: String,

    /// Optional line in the middle of the seal
    #[arg(long)]
    pub center: Option<String>,

    /// standard_circle, oval_finance or square_legal
    #[arg(long)]
    pub template: Option<String>,

    /// Hex color, e.g. "#DC2828"
    #[arg(long)]
    pub color: Option<String>,

    /// Overrides the template's base size, in pixels
    #[arg(long)]
    pub size: Option<u32>,

    /// Pixel density multiplier
    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    #[arg(short, long)]
    pub output: PathBuf,
}

#[derive(Args, Debug)]
pub struct SignatureArgs {
    /// Typed signature text
    #[arg(long, conflicts_with_all = ["image", "data_url"])]
    pub text: Option<String>,

    /// Handwritten signature image (PNG or JPEG)
    #[arg(long, conflicts_with = "data_url")]
    pub image: Option<PathBuf>,

    /// File holding a base64 data URL from a drawing pad
    #[arg(long)]
    pub data_url: Option<PathBuf>,

    #[arg(long, default_value = "KaiTi")]
    pub font: String,

    #[arg(long)]
    pub color: Option<String>,

    #[arg(long, default_value = "48")]
    pub font_size: f32,

    /// Render typed text at preview size and print a data URL instead of
    /// writing a file
    #[arg(long, requires = "text")]
    pub preview: bool,

    #[arg(short, long, required_unless_present = "preview")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct RequestArgs {
    /// JSON request file
    pub request: PathBuf,

    /// Write the updated contract back into the request file
    #[arg(long)]
    pub update: bool,
}

#[derive(Args, Debug)]
pub struct PreviewArgs {
    /// JSON contract file
    pub contract: PathBuf,

    /// 1-based page; every page when omitted
    #[arg(long)]
    pub page: Option<u32>,

    /// Overrides the configured DPI
    #[arg(long)]
    pub dpi: Option<u32>,
}

#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Page width in points
    #[arg(long)]
    pub page_width: f64,

    /// Page height in points
    #[arg(long)]
    pub page_height: f64,

    #[arg(long)]
    pub pixel_width: u32,

    #[arg(long)]
    pub pixel_height: u32,

    /// Pixel column, from the left
    #[arg(long)]
    pub x: f64,

    /// Pixel row, from the top
    #[arg(long)]
    pub y: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_seal() {
        let cli = Cli::try_parse_from([
            "seal-cli",
            "seal",
            "--company",
            "Acme Trading Co",
            "--template",
            "oval_finance",
            "-o",
            "seal.png",
        ])
        .unwrap();
        match cli.command {
            Command::Seal(args) => {
                assert_eq!(args.company, "Acme Trading Co");
                assert_eq!(args.template.as_deref(), Some("oval_finance"));
                assert_eq!(args.scale, 1.0);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_signature_sources_conflict() {
        let result = Cli::try_parse_from([
            "seal-cli",
            "signature",
            "--text",
            "Li",
            "--image",
            "sig.png",
            "-o",
            "out.png",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_signature_preview_needs_no_output() {
        let cli =
            Cli::try_parse_from(["seal-cli", "signature", "--text", "Li", "--preview"]).unwrap();
        assert!(matches!(cli.command, Command::Signature(ref a) if a.preview && a.output.is_none()));
    }
}
