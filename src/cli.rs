use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "sb3js-rs",
    about = "Compile a Scratch 3 project (.sb3) into a standalone JavaScript page."
)]
pub struct Args {
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    #[arg(
        value_name = "OUTPUT",
        default_value = "output",
        help = "Directory that receives index.html and the project assets."
    )]
    pub output: PathBuf,

    #[arg(
        long,
        help = "HTML template to use instead of the built-in page. Every ##code## marker is replaced."
    )]
    pub template: Option<PathBuf>,

    #[arg(long, help = "Also write the generated JavaScript on its own to this path.")]
    pub emit_js: Option<PathBuf>,

    #[arg(short, long, help = "Log debug diagnostics (overridden by RUST_LOG).")]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_defaults_to_output_directory() {
        let args = Args::try_parse_from(["sb3js-rs", "game.sb3"]).unwrap();
        assert_eq!(args.output, PathBuf::from("output"));
        assert!(args.template.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn parses_all_options() {
        let args = Args::try_parse_from([
            "sb3js-rs", "game.sb3", "site", "--template", "page.html", "--emit-js", "game.js", "-v",
        ])
        .unwrap();
        assert_eq!(args.output, PathBuf::from("site"));
        assert_eq!(args.template, Some(PathBuf::from("page.html")));
        assert_eq!(args.emit_js, Some(PathBuf::from("game.js")));
        assert!(args.verbose);
    }
}
