//! Navigation scripts replayed by the emulator.
//!
//! ```toml
//! [[step]]
//! op = "push"
//! view = "Library"
//!
//! [[step]]
//! op = "push"
//! view = "Book"
//! surface = "reader"
//! transition = "slide"
//!
//! [[step]]
//! op = "pop-back"
//! count = 1
//! ```

use anyhow::{Context, Error};
use serde::Deserialize;
use std::path::Path;

const DEMO_SCRIPT: &str = r#"
[[step]]
op = "push"
view = "Library"

[[step]]
op = "push"
view = "Shelf"
transition = "slide"

[[step]]
op = "push"
view = "Book"

[[step]]
op = "push"
view = "Chapter"
load-msg-delay-ms = 250

[[step]]
op = "pop-back"
count = 2

[[step]]
op = "replace"
view = "Another shelf"
transition = "fade"

[[step]]
op = "push"
view = "Footnote"
surface = "sidebar"

[[step]]
op = "pop"

[[step]]
op = "pop-to-first"

[[step]]
op = "pop"

[[step]]
op = "replace-all"
view = "Settings"
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Op {
    Push,
    Pop,
    PopBack,
    PopToFirst,
    Replace,
    ReplaceAll,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Step {
    pub op: Op,
    /// Title of the view to create, for operations that show a new view.
    pub view: Option<String>,
    /// For `pop-back`.
    pub count: Option<usize>,
    /// Surface name. Unset targets the navigator's default resolution.
    pub surface: Option<String>,
    pub transition: Option<String>,
    pub reverse: Option<bool>,
    pub load_msg_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Script, Error> {
        navstack_core::helpers::load_toml(path)
    }

    pub fn demo() -> Result<Script, Error> {
        toml::from_str(DEMO_SCRIPT).context("can't parse built-in demo script")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn demo_script_parses() -> Result<(), Error> {
        let script = Script::demo()?;
        assert_eq!(script.steps.len(), 11);
        assert_eq!(script.steps[0].op, Op::Push);
        assert_eq!(script.steps[3].load_msg_delay_ms, Some(250));
        assert_eq!(script.steps[4].count, Some(2));
        assert_eq!(script.steps[6].surface.as_deref(), Some("sidebar"));
        Ok(())
    }

    #[test]
    fn script_loads_from_file() -> Result<(), Error> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("script.toml");
        fs::write(&path, "[[step]]\nop = \"push\"\nview = \"Home\"\nreverse = true\n")?;

        let script = Script::load(&path)?;

        assert_eq!(
            script.steps,
            vec![Step {
                op: Op::Push,
                view: Some("Home".to_string()),
                count: None,
                surface: None,
                transition: None,
                reverse: Some(true),
                load_msg_delay_ms: None,
            }]
        );
        Ok(())
    }

    #[test]
    fn unknown_operation_is_rejected() {
        assert!(toml::from_str::<Script>("[[step]]\nop = \"jump\"\n").is_err());
    }
}
