use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process;

use splitdiff::{
    RenderConfig, SplitDiffView, SyntectHighlighter, Theme, language_from_path, plain_summary,
    target_path,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_WIDTH: usize = 120;

#[derive(Debug, Default)]
struct Args {
    file: Option<PathBuf>,
    width: Option<usize>,
    lang: Option<String>,
    theme: Option<Theme>,
    config: Option<PathBuf>,
}

fn print_usage() {
    println!("splitdiff - side-by-side diffs in the terminal");
    println!("\nUsage: splitdiff [options] [file]");
    println!("\nReads a numbered diff (or plain `git diff` output) from file or stdin.");
    println!("\nOptions:");
    println!("  --width N        Render width (default: terminal width)");
    println!("  --lang L         Syntax for highlighting, e.g. rs, py");
    println!("  --theme T        dark or light");
    println!("  --config PATH    Config file (default: ~/.config/splitdiff/config.toml)");
    println!("  -h, --help       Show this help");
}

/// `Ok(None)` means help was requested.
fn parse_args(mut raw: impl Iterator<Item = String>) -> Result<Option<Args>, String> {
    let mut args = Args::default();
    while let Some(arg) = raw.next() {
        let mut value = |flag: &str| raw.next().ok_or_else(|| format!("{flag} needs a value"));
        match arg.as_str() {
            "-h" | "--help" => return Ok(None),
            "--width" => {
                let width = value("--width")?;
                args.width = Some(
                    width
                        .parse()
                        .map_err(|_| format!("invalid width `{width}`"))?,
                );
            }
            "--lang" => args.lang = Some(value("--lang")?),
            "--theme" => args.theme = Some(value("--theme")?.parse()?),
            "--config" => args.config = Some(PathBuf::from(value("--config")?)),
            flag if flag.starts_with("--") => return Err(format!("unknown option `{flag}`")),
            path => {
                if args.file.is_some() {
                    return Err("only one input file is supported".to_string());
                }
                args.file = Some(PathBuf::from(path));
            }
        }
    }
    Ok(Some(args))
}

fn init_logging() {
    let filter =
        EnvFilter::try_from_env("SPLITDIFF_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn read_input(file: Option<&PathBuf>) -> io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut input = String::new();
            io::stdin().read_to_string(&mut input)?;
            Ok(input)
        }
    }
}

fn main() -> io::Result<()> {
    let args = match parse_args(std::env::args().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return Ok(());
        }
        Err(message) => {
            eprintln!("Error: {message}");
            eprintln!("Usage: splitdiff [options] [file]");
            process::exit(2);
        }
    };

    init_logging();

    let loaded = match &args.config {
        Some(path) => RenderConfig::load(path),
        None => RenderConfig::load_default(),
    };
    let mut config = match loaded {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err}");
            process::exit(1);
        }
    };
    if let Some(theme) = args.theme {
        config.theme = theme;
    }

    let input = match read_input(args.file.as_ref()) {
        Ok(input) => input,
        Err(err) => {
            let source = args
                .file
                .as_ref()
                .map_or_else(|| "stdin".to_string(), |p| p.display().to_string());
            eprintln!("Error: failed to read {source}: {err}");
            process::exit(1);
        }
    };

    let language = args
        .lang
        .clone()
        .or_else(|| target_path(&input).and_then(|path| language_from_path(&path)));

    let width = args.width.unwrap_or_else(|| {
        crossterm::terminal::size()
            .map(|(columns, _)| usize::from(columns))
            .unwrap_or(DEFAULT_WIDTH)
    });

    let theme = config.theme;
    let lines = match SplitDiffView::new(
        &input,
        Box::new(theme),
        Box::new(SyntectHighlighter::new(theme)),
        language,
        &config,
    ) {
        Ok(mut view) => view.render(width),
        Err(too_large) => plain_summary(&input, &too_large.to_string(), &theme, width),
    };

    let mut stdout = io::stdout().lock();
    for line in lines {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Result<Option<Args>, String> {
        parse_args(list.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_all_flags() {
        let parsed = args(&[
            "--width", "100", "--lang", "py", "--theme", "light", "--config", "c.toml", "d.diff",
        ])
        .unwrap()
        .unwrap();
        assert_eq!(parsed.width, Some(100));
        assert_eq!(parsed.lang.as_deref(), Some("py"));
        assert_eq!(parsed.theme, Some(Theme::Light));
        assert_eq!(parsed.config, Some(PathBuf::from("c.toml")));
        assert_eq!(parsed.file, Some(PathBuf::from("d.diff")));
    }

    #[test]
    fn test_help() {
        assert!(args(&["--help"]).unwrap().is_none());
    }

    #[test]
    fn test_bad_arguments() {
        assert!(args(&["--width"]).is_err());
        assert!(args(&["--width", "wide"]).is_err());
        assert!(args(&["--theme", "blue"]).is_err());
        assert!(args(&["--frobnicate"]).is_err());
        assert!(args(&["a", "b"]).is_err());
    }
}
