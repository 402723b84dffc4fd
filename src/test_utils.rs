#[cfg(test)]
pub mod fixtures {
    use std::fs;
    use std::path::Path;

    /// A structurally valid document with every optional section and a
    /// single harmless usage snippet (`ls -la`).
    pub const COMPLETE_DOC: &str = r#"---
name: init
description: Prepare a fresh workspace
---
# Init

<role>
Workspace bootstrapper.
</role>

<activation>
Run when a new project is opened.
</activation>

<instructions>
Create the scaffolding and report what changed.
</instructions>

## Description

Prepares a fresh workspace with the default layout.

## Usage

```bash
ls -la
```

## Parameters

- `path` (optional): directory to initialise
- `template`: layout template name

## Examples

Initialise the current directory:

```bash
/init .
```
"#;

    /// Write `content` to `root/relative`, creating parent directories.
    pub fn write_doc(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }
}

#[cfg(test)]
pub use fixtures::*;
