use crate::engine::ConsoleEngine;
use crate::script::{Op, Script, Step};
use anyhow::{bail, Context, Error};
use navstack_core::navigator::{NavigationOptions, Navigator, TransitionOptions};
use navstack_core::settings::NavigatorSettings;
use navstack_core::surface::Surface;
use navstack_core::view::{ElementId, View, ID_FEEDER};
use std::collections::BTreeMap;
use std::time::Duration;

/// A titled page that reports its lifecycle to the log.
struct Page {
    element: ElementId,
    title: String,
}

impl View for Page {
    fn element(&self) -> ElementId {
        self.element
    }

    fn render(&mut self) {
        tracing::debug!(element = %self.element, title = %self.title, "rendered");
    }

    fn remove(&mut self) {
        tracing::debug!(element = %self.element, title = %self.title, "removed");
    }
}

/// Replays scripts against a navigator driven by a [`ConsoleEngine`].
pub struct Session {
    navigator: Navigator<ConsoleEngine>,
    surfaces: BTreeMap<String, Surface>,
    titles: BTreeMap<ElementId, String>,
}

impl Session {
    pub fn new(settings: &NavigatorSettings) -> Self {
        let navigator = Navigator::with_settings(ConsoleEngine::default(), settings);
        let mut surfaces = BTreeMap::new();
        let root = navigator.root_surface().clone();
        surfaces.insert(root.name().to_string(), root);

        Session {
            navigator,
            surfaces,
            titles: BTreeMap::new(),
        }
    }

    pub fn run(&mut self, script: &Script) -> Result<(), Error> {
        for (index, step) in script.steps.iter().enumerate() {
            let advisory = self
                .apply(step)
                .with_context(|| format!("step {} ({:?}) failed", index + 1, step.op))?;
            if let Some(advisory) = advisory {
                println!("    {advisory}");
            }
            self.navigator.dispatch_pending();
            println!("{:>3} {:<13} {}", index + 1, format!("{:?}", step.op), self.describe());
        }

        Ok(())
    }

    /// Runs one step. A navigation the navigator rejected is not a failure;
    /// its reason comes back as an advisory line.
    fn apply(&mut self, step: &Step) -> Result<Option<String>, Error> {
        let options = self.options(step);

        let outcome = match step.op {
            Op::Push => {
                let view = self.page(step)?;
                self.navigator.push_view(view, options, None)
            }
            Op::Pop => {
                if self.navigator.pop_view(options) {
                    return Ok(None);
                }
                return Ok(Some("nothing to pop".to_string()));
            }
            Op::PopBack => {
                let Some(count) = step.count else {
                    bail!("pop-back needs a count");
                };
                self.navigator.pop_back_n_views(count, options)
            }
            Op::PopToFirst => self.navigator.pop_to_first(options),
            Op::Replace => {
                let view = self.page(step)?;
                self.navigator.replace_view(view, options, None)
            }
            Op::ReplaceAll => {
                let view = self.page(step)?;
                self.navigator.replace_all(view, options)
            }
        };

        Ok(outcome.err().map(|err| err.to_string()))
    }

    fn options(&mut self, step: &Step) -> NavigationOptions {
        let surface = step.surface.as_ref().map(|name| {
            self.surfaces
                .entry(name.clone())
                .or_insert_with(|| Surface::new(name.as_str()))
                .clone()
        });

        NavigationOptions {
            surface,
            transition: TransitionOptions {
                transition: step.transition.clone(),
                reverse: step.reverse,
                show_load_msg: step.load_msg_delay_ms.map(|_| true),
                load_msg_delay: step.load_msg_delay_ms.map(Duration::from_millis),
            },
        }
    }

    fn page(&mut self, step: &Step) -> Result<Box<dyn View>, Error> {
        let Some(title) = step.view.clone() else {
            bail!("{:?} needs a view title", step.op);
        };

        let element = ID_FEEDER.next();
        self.titles.insert(element, title.clone());
        Ok(Box::new(Page { element, title }))
    }

    /// Titles on `surface`, bottom first.
    pub fn stack(&self, surface: &str) -> Vec<String> {
        let Some(surface) = self.surfaces.get(surface) else {
            return Vec::new();
        };

        self.navigator
            .get_views(Some(surface))
            .map(|views| {
                views
                    .iter()
                    .map(|view| {
                        self.titles
                            .get(&view.element())
                            .cloned()
                            .unwrap_or_else(|| view.element().to_string())
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn pending_teardowns(&self) -> usize {
        self.navigator.pending_teardowns()
    }

    fn describe(&self) -> String {
        self.surfaces
            .keys()
            .map(|name| format!("{}: [{}]", name, self.stack(name).join(" > ")))
            .collect::<Vec<_>>()
            .join("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(op: Op) -> Step {
        Step {
            op,
            view: None,
            count: None,
            surface: None,
            transition: None,
            reverse: None,
            load_msg_delay_ms: None,
        }
    }

    fn push(title: &str) -> Step {
        Step {
            view: Some(title.to_string()),
            ..step(Op::Push)
        }
    }

    #[test]
    fn demo_session_ends_on_settings() -> Result<(), Error> {
        let mut session = Session::new(&NavigatorSettings::default());
        session.run(&Script::demo()?)?;

        assert_eq!(session.stack("body"), vec!["Settings".to_string()]);
        assert_eq!(session.stack("sidebar"), vec!["Footnote".to_string()]);
        assert_eq!(session.pending_teardowns(), 0);
        Ok(())
    }

    #[test]
    fn pop_back_lands_below_discarded_views() -> Result<(), Error> {
        let mut session = Session::new(&NavigatorSettings::default());
        let script = Script {
            steps: vec![
                push("A"),
                push("B"),
                push("C"),
                push("D"),
                Step {
                    count: Some(2),
                    ..step(Op::PopBack)
                },
            ],
        };

        session.run(&script)?;

        assert_eq!(session.stack("body"), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(session.pending_teardowns(), 0);
        Ok(())
    }

    #[test]
    fn rejected_steps_come_back_as_advisories() -> Result<(), Error> {
        let mut session = Session::new(&NavigatorSettings::default());

        assert_eq!(session.apply(&push("A"))?, None);
        assert_eq!(
            session.apply(&step(Op::Pop))?,
            Some("nothing to pop".to_string())
        );

        let advisory = session.apply(&Step {
            count: Some(3),
            ..step(Op::PopBack)
        })?;
        assert_eq!(
            advisory.as_deref(),
            Some("cannot pop 3 view(s) off a stack of 1; replace the first view instead")
        );

        let advisory = session.apply(&Step {
            view: Some("B".to_string()),
            surface: Some("sidebar".to_string()),
            ..step(Op::Replace)
        })?;
        assert_eq!(advisory.as_deref(), Some("no view to replace on surface 'sidebar'"));

        assert_eq!(session.stack("body"), vec!["A".to_string()]);
        Ok(())
    }

    #[test]
    fn missing_view_title_fails_the_step() {
        let mut session = Session::new(&NavigatorSettings::default());
        let script = Script {
            steps: vec![step(Op::Push)],
        };

        assert!(session.run(&script).is_err());
    }

    #[test]
    fn missing_count_fails_the_step() {
        let mut session = Session::new(&NavigatorSettings::default());
        let script = Script {
            steps: vec![push("A"), step(Op::PopBack)],
        };

        assert!(session.run(&script).is_err());
        assert_eq!(session.stack("body"), vec!["A".to_string()]);
    }
}
