//! Subcommand implementations.

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use myst_nb_config::Config;
use myst_nb_engine::{Cell, ConvertOptions, Notebook, io, to_ipynb_string};

use crate::cli::{Cli, Command, ConfigAction};

/// Settings shared by every subcommand.
pub struct Context {
    /// `None` when the default config location is used.
    pub explicit_config_path: Option<PathBuf>,
    pub config: Config,
}

impl Context {
    /// Loads the config file and applies command-line overrides on top.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let loaded = match &cli.config {
            Some(path) => Config::load_from_path(path)?,
            None => Config::load()?,
        };
        if loaded.is_none() {
            let path = config_path(cli.config.as_deref());
            log::debug!("No config file found at {}", path.display());
        }

        let mut config = loaded.unwrap_or_default();
        if let Some(directive) = &cli.code_directive {
            config.code_directive = directive.clone();
        }
        if let Some(directive) = &cli.raw_directive {
            config.raw_directive = directive.clone();
        }
        if cli.line_numbers {
            config.store_line_numbers = true;
        }

        Ok(Self {
            explicit_config_path: cli.config.clone(),
            config,
        })
    }

    pub fn config_path(&self) -> PathBuf {
        config_path(self.explicit_config_path.as_deref())
    }

    pub fn convert_options(&self) -> ConvertOptions {
        ConvertOptions {
            code_directive: self.config.code_directive.clone(),
            raw_directive: self.config.raw_directive.clone(),
            store_line_numbers: self.config.store_line_numbers,
        }
    }
}

fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit.map_or_else(Config::config_path, Path::to_path_buf)
}

pub fn run(cli: Cli) -> Result<()> {
    let context = Context::from_cli(&cli)?;

    match cli.command {
        Command::Convert {
            inputs,
            output,
            out_dir,
        } => convert(&context, &inputs, output, out_dir),
        Command::Check { inputs } => check(&context, &inputs),
        Command::Inspect { input } => inspect(&context, &input),
        Command::Config { action } => config(&context, action),
    }
}

/// A file to process, with the path its output should mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputFile {
    pub path: PathBuf,
    /// Path relative to the directory given on the command line, or just the
    /// file name for files given directly.
    pub relative: PathBuf,
}

/// Expands directories into the notebook files below them.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<InputFile>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for path in io::scan_notebook_files(input)? {
                let relative = path.strip_prefix(input).unwrap_or(&path).to_path_buf();
                files.push(InputFile { path, relative });
            }
        } else {
            let relative = input
                .file_name()
                .map_or_else(|| input.clone(), PathBuf::from);
            files.push(InputFile {
                path: input.clone(),
                relative,
            });
        }
    }
    Ok(files)
}

/// Where the notebook converted from `input` is written.
pub fn output_path(input: &InputFile, out_dir: Option<&Path>) -> PathBuf {
    match out_dir {
        Some(dir) => dir.join(&input.relative).with_extension("ipynb"),
        None => input.path.with_extension("ipynb"),
    }
}

fn is_ipynb(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "ipynb")
}

fn convert(
    context: &Context,
    inputs: &[PathBuf],
    output: Option<PathBuf>,
    out_dir: Option<PathBuf>,
) -> Result<()> {
    let options = context.convert_options();
    let out_dir = out_dir.or_else(|| context.config.output_dir.clone());
    let files = expand_inputs(inputs)?;

    if let Some(output) = output {
        let [file] = files.as_slice() else {
            bail!("--output needs exactly one input file, got {}", files.len());
        };
        let notebook = read(&file.path, &options)?;
        io::write_ipynb(&output, &notebook)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        log::info!("Wrote {}", output.display());
        return Ok(());
    }

    // A single file with nowhere else to go is printed.
    if let ([file], None) = (files.as_slice(), &out_dir)
        && inputs.len() == 1
        && !inputs[0].is_dir()
    {
        let notebook = read(&file.path, &options)?;
        print!("{}", to_ipynb_string(&notebook)?);
        return Ok(());
    }

    for file in &files {
        if is_ipynb(&file.path) {
            log::debug!("Skipping {}, already a notebook", file.path.display());
            continue;
        }
        let target = output_path(file, out_dir.as_deref());
        let notebook = read(&file.path, &options)?;
        io::write_ipynb(&target, &notebook)
            .with_context(|| format!("Failed to write {}", target.display()))?;
        log::info!("{} -> {}", file.path.display(), target.display());
    }
    Ok(())
}

fn read(path: &Path, options: &ConvertOptions) -> Result<Notebook> {
    io::read_notebook(path, options)
        .with_context(|| format!("Failed to read {}", path.display()))
}

fn check(context: &Context, inputs: &[PathBuf]) -> Result<()> {
    let options = context.convert_options();
    let mut failures = 0;

    for file in expand_inputs(inputs)? {
        let result = io::read_file(&file.path)
            .and_then(|text| io::string_to_notebook(&text, &file.path, &options));
        match result {
            Ok(Some(notebook)) => {
                println!("{}: notebook, {} cells", file.path.display(), notebook.len());
            }
            Ok(None) => println!("{}: plain markdown", file.path.display()),
            Err(err) => {
                failures += 1;
                log::error!("{}: {err}", file.path.display());
            }
        }
    }

    if failures > 0 {
        bail!("{failures} file(s) failed to parse");
    }
    Ok(())
}

fn inspect(context: &Context, input: &Path) -> Result<()> {
    let options = ConvertOptions {
        store_line_numbers: true,
        ..context.convert_options()
    };
    let notebook = read(input, &options)?;

    if let Some(kernel) = notebook.kernel_name() {
        println!("kernel: {kernel}");
    }
    for (index, cell) in notebook.cells.iter().enumerate() {
        println!("{}", summarize_cell(index, cell));
    }
    Ok(())
}

const PREVIEW_CHARS: usize = 50;

/// One line describing a cell: position, kind, source lines, metadata keys and
/// the start of its first non-blank line.
pub fn summarize_cell(index: usize, cell: &Cell) -> String {
    let lines = cell
        .source_lines
        .map(|span| format!("{}-{}", span.first_line_number(), span.end))
        .unwrap_or_else(|| "-".to_string());

    let mut summary = format!("{index:>3} {:<8} {lines:<9}", cell.kind.as_str());

    if !cell.metadata.is_empty() {
        let keys: Vec<&str> = cell.metadata.keys().map(String::as_str).collect();
        summary.push_str(&format!(" [{}]", keys.join(", ")));
    }

    if let Some(first) = cell.source.lines().find(|line| !line.trim().is_empty()) {
        let first = first.trim();
        let preview: String = first.chars().take(PREVIEW_CHARS).collect();
        summary.push(' ');
        summary.push_str(&preview);
        if first.chars().count() > PREVIEW_CHARS {
            summary.push('…');
        }
    }

    summary.trim_end().to_string()
}

fn config(context: &Context, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Path => println!("{}", context.config_path().display()),
        ConfigAction::Show => print!("{}", toml::to_string_pretty(&context.config)?),
        ConfigAction::Init { force } => {
            let path = context.config_path();
            if path.exists() && !force {
                bail!(
                    "{} already exists; pass --force to overwrite it",
                    path.display()
                );
            }
            let config = Config::default();
            match &context.explicit_config_path {
                Some(path) => config.save_to_path(path)?,
                None => config.save()?,
            }
            log::info!("Wrote default config to {}", path.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use myst_nb_engine::{LineSpan, Metadata};
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::TempDir;

    fn context_for(args: &[&str]) -> Context {
        let cli = Cli::try_parse_from(args).unwrap();
        Context::from_cli(&cli).unwrap()
    }

    #[test]
    fn flags_override_config_file() {
        let dir = TempDir::new().unwrap();
        let config_file = dir.path().join("config.toml");
        std::fs::write(&config_file, "code_directive = \"{code}\"\nraw_directive = \"{raw}\"\n")
            .unwrap();
        let config_arg = config_file.to_string_lossy().to_string();

        let context = context_for(&[
            "myst-nb",
            "--config",
            &config_arg,
            "--raw-directive",
            "{passthrough}",
            "--line-numbers",
            "config",
            "show",
        ]);

        assert_eq!(
            context.convert_options(),
            ConvertOptions {
                code_directive: "{code}".to_string(),
                raw_directive: "{passthrough}".to_string(),
                store_line_numbers: true,
            }
        );
        assert_eq!(context.config_path(), config_file);
    }

    #[test]
    fn missing_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config_arg = dir.path().join("none.toml").to_string_lossy().to_string();
        let context = context_for(&["myst-nb", "-c", &config_arg, "config", "path"]);
        assert_eq!(context.convert_options(), ConvertOptions::default());
    }

    #[test]
    fn expand_inputs_walks_directories() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.md"), "# A").unwrap();
        std::fs::write(dir.path().join("sub/b.md"), "# B").unwrap();
        let single = dir.path().join("a.md");

        let files = expand_inputs(&[dir.path().to_path_buf(), single.clone()]).unwrap();

        let relative: Vec<_> = files.iter().map(|f| f.relative.clone()).collect();
        assert_eq!(
            relative,
            vec![
                PathBuf::from("a.md"),
                PathBuf::from("sub/b.md"),
                PathBuf::from("a.md"),
            ]
        );
        assert_eq!(files[2].path, single);
    }

    #[rstest]
    #[case(Some("out"), "out/sub/nb.ipynb")]
    #[case(None, "notes/sub/nb.ipynb")]
    fn output_paths(#[case] out_dir: Option<&str>, #[case] expected: &str) {
        let input = InputFile {
            path: PathBuf::from("notes/sub/nb.md"),
            relative: PathBuf::from("sub/nb.md"),
        };
        assert_eq!(
            output_path(&input, out_dir.map(Path::new)),
            PathBuf::from(expected)
        );
    }

    #[test]
    fn convert_directory_writes_notebooks() {
        let dir = TempDir::new().unwrap();
        let notes = dir.path().join("notes");
        let out = dir.path().join("out");
        std::fs::create_dir_all(notes.join("sub")).unwrap();
        std::fs::write(notes.join("sub/nb.md"), "Text\n```{code-cell}\nx = 1\n```\n").unwrap();
        std::fs::write(notes.join("existing.ipynb"), "{}").unwrap();

        let context = context_for(&["myst-nb", "-c", "/nonexistent/config.toml", "config", "path"]);
        convert(&context, &[notes.clone()], None, Some(out.clone())).unwrap();

        let written = io::read_notebook(&out.join("sub/nb.ipynb"), &ConvertOptions::default()).unwrap();
        assert_eq!(written.cells, vec![Cell::markdown("Text"), Cell::code("x = 1")]);
        assert!(!out.join("existing.ipynb").exists());
    }

    #[test]
    fn output_requires_single_input() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.md"), "a").unwrap();
        std::fs::write(dir.path().join("b.md"), "b").unwrap();

        let context = context_for(&["myst-nb", "-c", "/nonexistent/config.toml", "config", "path"]);
        let result = convert(
            &context,
            &[dir.path().to_path_buf()],
            Some(dir.path().join("out.ipynb")),
            None,
        );
        assert!(result.is_err());
    }

    #[test]
    fn check_fails_on_bad_metadata() {
        let dir = TempDir::new().unwrap();
        let bad = dir.path().join("bad.md");
        std::fs::write(
            &bad,
            "---\njupytext:\n  text_representation:\n    format_name: myst\n---\n",
        )
        .unwrap();

        let context = context_for(&["myst-nb", "-c", "/nonexistent/config.toml", "config", "path"]);
        assert!(check(&context, &[bad]).is_err());
    }

    #[test]
    fn summarize_cells() {
        let mut metadata = Metadata::new();
        metadata.insert("tags".to_string(), serde_json::json!(["hide"]));
        let code = Cell::code("\nimport os\nprint(os.name)")
            .with_metadata(metadata)
            .with_source_lines(LineSpan::new(4, 8));
        assert_eq!(summarize_cell(2, &code), "  2 code     5-8       [tags] import os");

        let empty = Cell::code("");
        assert_eq!(summarize_cell(0, &empty), "  0 code     -");

        let long = Cell::markdown("x".repeat(60));
        assert!(summarize_cell(1, &long).ends_with(&format!("{}…", "x".repeat(50))));
    }
}
