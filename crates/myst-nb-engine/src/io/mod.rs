use crate::interchange::{from_ipynb_str, to_ipynb_string};
use crate::models::Notebook;
use crate::parsing::{ConvertOptions, MetadataParsingError, is_myst_notebook, myst_to_notebook};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid notes directory: {0}")]
    InvalidNotesDir(String),
    #[error("{0}")]
    Metadata(#[from] MetadataParsingError),
    #[error("Invalid notebook JSON: {0}")]
    Interchange(#[from] serde_json::Error),
}

const IPYNB_EXTENSION: &str = "ipynb";
const MARKDOWN_EXTENSION: &str = "md";

/// Read a text file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Write content to a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

fn is_ipynb(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == IPYNB_EXTENSION)
}

/// Read a notebook from disk.
///
/// `.ipynb` files are parsed as JSON; anything else is converted as MyST text,
/// whether or not its front matter declares the MyST format.
pub fn read_notebook(path: &Path, options: &ConvertOptions) -> Result<Notebook, IoError> {
    let text = read_file(path)?;
    if is_ipynb(path) {
        return Ok(from_ipynb_str(&text)?);
    }
    Ok(myst_to_notebook(&text, options)?)
}

/// Turn file content into a notebook, using `path` to pick the format.
///
/// Returns `None` for markdown that is not a MyST notebook.
pub fn string_to_notebook(
    text: &str,
    path: &Path,
    options: &ConvertOptions,
) -> Result<Option<Notebook>, IoError> {
    if is_ipynb(path) {
        return Ok(Some(from_ipynb_str(text)?));
    }
    if !is_myst_notebook(text)? {
        log::debug!("{} is plain markdown", path.display());
        return Ok(None);
    }
    Ok(Some(myst_to_notebook(text, options)?))
}

/// Write a notebook to disk as nbformat v4 JSON
pub fn write_ipynb(path: &Path, notebook: &Notebook) -> Result<(), IoError> {
    let json = to_ipynb_string(notebook)?;
    write_file(path, &json)
}

/// Scan for `.md` and `.ipynb` files below `root`, sorted by path
pub fn scan_notebook_files(root: &Path) -> Result<Vec<PathBuf>, IoError> {
    if !root.is_dir() {
        return Err(IoError::InvalidNotesDir(format!(
            "{} is not a directory",
            root.display()
        )));
    }

    let mut files = Vec::new();
    scan_directory_recursive(root, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            scan_directory_recursive(&path, files)?;
        } else if let Some(ext) = path.extension()
            && (ext == MARKDOWN_EXTENSION || ext == IPYNB_EXTENSION)
        {
            files.push(path);
        }
    }

    Ok(())
}
