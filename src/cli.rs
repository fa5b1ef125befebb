// File: ./src/cli.rs
//! Command-line arguments.
use crate::controller::RunRequest;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "docboard")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create Trello cards from a heading-structured DOCX or Markdown document", long_about = None)]
pub struct Args {
    /// Document to read (.docx, .md, .markdown or .txt)
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Board URL, e.g. https://trello.com/b/AbCd1234/my-board
    #[arg(short, long, value_name = "URL")]
    pub board: Option<String>,

    /// List for cards that name none or an unknown one
    #[arg(long, value_name = "NAME")]
    pub default_list: Option<String>,

    /// Write the sample template to PATH (ignored with --file)
    #[arg(long, value_name = "PATH")]
    pub template: Option<PathBuf>,

    /// Parse and print the cards without contacting the board
    #[arg(long)]
    pub dry_run: bool,

    /// Never prompt; missing inputs are errors
    #[arg(long)]
    pub non_interactive: bool,

    /// Do not save credentials or the board URL
    #[arg(long)]
    pub no_save: bool,

    /// Use a different directory for config and logs
    #[arg(short, long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Debug output on the terminal
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn to_request(&self) -> RunRequest {
        RunRequest {
            document: self.file.clone(),
            board_url: self.board.clone(),
            default_list: self.default_list.clone(),
            template_path: self.template.clone(),
            dry_run: self.dry_run,
            save_config: !self.no_save,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags_into_a_request() {
        let args = Args::try_parse_from([
            "docboard",
            "--file",
            "cards.md",
            "--board",
            "https://trello.com/b/AbCd1234/x",
            "--default-list",
            "Backlog",
            "--dry-run",
            "--no-save",
        ])
        .unwrap();
        let req = args.to_request();
        assert_eq!(req.document, Some(PathBuf::from("cards.md")));
        assert_eq!(req.default_list.as_deref(), Some("Backlog"));
        assert!(req.dry_run);
        assert!(!req.save_config);
    }

    #[test]
    fn saving_is_on_by_default() {
        let args = Args::try_parse_from(["docboard"]).unwrap();
        assert!(args.to_request().save_config);
        assert!(!args.non_interactive);
    }
}
