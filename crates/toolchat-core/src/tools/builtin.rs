//! Built-in file tools
//!
//! Paths are taken as given, relative to the working directory of the process.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use ignore::WalkBuilder;
use serde::Deserialize;
use serde_json::{json, Value};

use super::registry::{LocalTool, ToolError, ToolOutput};

#[derive(Debug, Deserialize)]
struct ReadFileInput {
    path: String,
}

#[derive(Debug, Default, Deserialize)]
struct ListFilesInput {
    #[serde(default)]
    path: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EditFileInput {
    path: String,
    old_str: String,
    new_str: String,
}

fn require_path(path: &str) -> Result<(), ToolError> {
    if path.trim().is_empty() {
        return Err(ToolError::InvalidInput("path must not be empty".to_string()));
    }
    Ok(())
}

/// Returns the contents of a file
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadFile;

impl LocalTool for ReadFile {
    fn name(&self) -> &str {
        "read_file"
    }

    fn description(&self) -> &str {
        "Read the contents of a given relative file path. Use this when you want to see what's inside a file. Do not use this with directory names."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The relative path of a file in the working directory."
                }
            },
            "required": ["path"]
        })
    }

    fn execute(&self, input: Value) -> ToolOutput {
        let input: ReadFileInput = serde_json::from_value(input)?;
        require_path(&input.path)?;
        Ok(fs::read_to_string(&input.path)?)
    }
}

/// Lists files and directories below a path
#[derive(Debug, Clone, Copy, Default)]
pub struct ListFiles;

impl LocalTool for ListFiles {
    fn name(&self) -> &str {
        "list_files"
    }

    fn description(&self) -> &str {
        "List files and directories at a given path. If no path is provided, lists files in the current directory."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Optional relative path to list files from. Defaults to current directory if not provided."
                }
            }
        })
    }

    fn execute(&self, input: Value) -> ToolOutput {
        let input: ListFilesInput = if input.is_null() {
            ListFilesInput::default()
        } else {
            serde_json::from_value(input)?
        };
        let root = match input.path.as_deref() {
            Some(p) if !p.trim().is_empty() => p.to_string(),
            _ => ".".to_string(),
        };

        let root_path = Path::new(&root);
        if !root_path.is_dir() {
            return Err(ToolError::InvalidInput(format!("not a directory: {}", root)));
        }

        let mut entries = Vec::new();
        let walker = WalkBuilder::new(root_path)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = entry.map_err(|e| ToolError::Failed(e.to_string()))?;
            if entry.depth() == 0 {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(root_path)
                .unwrap_or_else(|_| entry.path());
            let mut name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if entry.file_type().is_some_and(|t| t.is_dir()) {
                name.push('/');
            }
            entries.push(name);
        }

        Ok(serde_json::to_string(&entries).map_err(|e| ToolError::Failed(e.to_string()))?)
    }
}

/// Replaces text in a file, or creates it
#[derive(Debug, Clone, Copy, Default)]
pub struct EditFile;

impl LocalTool for EditFile {
    fn name(&self) -> &str {
        "edit_file"
    }

    fn description(&self) -> &str {
        "Make edits to a text file. Replaces 'old_str' with 'new_str' in the given file. 'old_str' and 'new_str' MUST be different from each other. If the file specified with path doesn't exist, it will be created."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "The path to the file"
                },
                "old_str": {
                    "type": "string",
                    "description": "Text to search for - must match exactly and must only have one match exactly"
                },
                "new_str": {
                    "type": "string",
                    "description": "Text to replace old_str with"
                }
            },
            "required": ["path", "old_str", "new_str"]
        })
    }

    fn execute(&self, input: Value) -> ToolOutput {
        let input: EditFileInput = serde_json::from_value(input)?;
        require_path(&input.path)?;
        if input.old_str == input.new_str {
            return Err(ToolError::InvalidInput(
                "old_str and new_str must be different".to_string(),
            ));
        }

        let path = Path::new(&input.path);
        let current = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound && input.old_str.is_empty() => {
                return create_file(path, &input.new_str);
            }
            Err(e) => return Err(e.into()),
        };

        if input.old_str.is_empty() {
            return Err(ToolError::InvalidInput(
                "old_str must not be empty when editing an existing file".to_string(),
            ));
        }
        if !current.contains(&input.old_str) {
            return Err(ToolError::Failed("old_str not found in file".to_string()));
        }

        fs::write(path, current.replace(&input.old_str, &input.new_str))?;
        Ok("OK".to_string())
    }
}

fn create_file(path: &Path, content: &str) -> ToolOutput {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, content)?;
    Ok(format!("Successfully created file {}", path.display()))
}
