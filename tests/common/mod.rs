#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const CATEGORIES: &[&str] = &[
    "setup",
    "planning",
    "development",
    "testing",
    "security",
    "deployment",
    "documentation",
    "maintenance",
    "misc",
];

/// A structurally valid command document whose usage block is `code`.
pub fn command_doc(title: &str, code: &str) -> String {
    format!(
        r#"# {title}

<role>
Assistant for {title}.
</role>

<activation>
Invoked as /{title}.
</activation>

<instructions>
Follow the usage below and report the result.
</instructions>

## Description

Runs the {title} workflow.

## Usage

```bash
{code}
```

## Parameters

- `target` (optional): what to run against

## Examples

Default run:

```bash
/{title}
```
"#
    )
}

pub fn write_doc(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

/// `count` well-formed, harmless documents spread over every category.
pub fn write_corpus(root: &Path, count: usize) {
    for i in 0..count {
        let category = CATEGORIES[i % CATEGORIES.len()];
        let title = format!("cmd-{i:02}");
        write_doc(
            root,
            &format!("{category}/{title}.md"),
            &command_doc(&title, &format!("echo step {i}")),
        );
    }
}
