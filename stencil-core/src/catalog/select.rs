//! Interactive drill-down over the catalog tree
//!
//! The walker shows one level of the tree at a time to a [`Chooser`] and
//! follows the choice until it lands on a template. Categories with a single
//! child are descended into without asking. There is no way back up.

use tracing::{debug, trace};

use super::entry::{EntryKind, ManifestEntry, TemplateRef};
use super::CatalogError;

/// One prompt presented to a [`Chooser`]
#[derive(Debug, Clone, Copy)]
pub struct SelectionStep<'a> {
    /// Category being browsed, `None` at the root
    pub context: Option<&'a ManifestEntry>,
    /// Entries to choose from, in catalog order
    pub candidates: &'a [ManifestEntry],
}

impl SelectionStep<'_> {
    /// Heading for the prompt: the category title, or `Templates` at the root
    pub fn heading(&self) -> &str {
        self.context
            .map(|category| category.title.as_str())
            .unwrap_or("Templates")
    }
}

/// Source of the user's choices
///
/// Implementations return a 1-based index into `step.candidates`. Re-prompting
/// on bad input is the chooser's job; the walker rejects out-of-range answers.
pub trait Chooser {
    fn choose(&mut self, step: &SelectionStep<'_>) -> std::io::Result<usize>;
}

impl<F> Chooser for F
where
    F: FnMut(&SelectionStep<'_>) -> usize,
{
    fn choose(&mut self, step: &SelectionStep<'_>) -> std::io::Result<usize> {
        Ok(self(step))
    }
}

/// Walk `tree` with `chooser` until a template is picked
///
/// Returns `Ok(None)` without prompting when the tree is empty.
pub fn select<'a, C>(
    tree: &'a [ManifestEntry],
    chooser: &mut C,
) -> Result<Option<TemplateRef<'a>>, CatalogError>
where
    C: Chooser + ?Sized,
{
    if tree.is_empty() {
        debug!("No templates to select from");
        return Ok(None);
    }

    let mut context: Option<&'a ManifestEntry> = None;
    let mut candidates = tree;

    loop {
        let step = SelectionStep {
            context,
            candidates,
        };
        let index = chooser.choose(&step)?;

        if index == 0 || index > candidates.len() {
            return Err(CatalogError::SelectionIndexOutOfRange {
                index,
                len: candidates.len(),
            });
        }

        let mut chosen = &candidates[index - 1];
        trace!(path = %chosen.path, "Entry chosen");

        // Single-child categories are skipped over
        loop {
            match &chosen.kind {
                EntryKind::Category(category) if category.children.len() == 1 => {
                    chosen = &category.children[0];
                    trace!(path = %chosen.path, "Descending into only child");
                }
                _ => break,
            }
        }

        match &chosen.kind {
            EntryKind::Template(template) => {
                debug!(path = %chosen.path, package = %template.package, "Template selected");
                return Ok(Some(TemplateRef {
                    entry: chosen,
                    template,
                }));
            }
            EntryKind::Category(category) if category.children.is_empty() => {
                return Err(CatalogError::EmptyCategory {
                    path: chosen.path.clone(),
                });
            }
            EntryKind::Category(category) => {
                context = Some(chosen);
                candidates = &category.children;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::entry::{Category, PackageId};

    fn template(path: &str, parent: Option<&str>) -> ManifestEntry {
        ManifestEntry::template(
            path,
            format!("Title of {path}"),
            parent.map(str::to_string),
            vec![],
            PackageId::new("A", "1.0"),
        )
    }

    fn category(path: &str, parent: Option<&str>, children: Vec<ManifestEntry>) -> ManifestEntry {
        ManifestEntry::category(path, format!("Title of {path}"), parent.map(str::to_string), children)
            .unwrap()
    }

    fn answer(index: usize) -> impl FnMut(&SelectionStep<'_>) -> usize {
        move |_| index
    }

    /// Chooser that replays fixed answers and records every prompt
    struct Scripted {
        answers: Vec<usize>,
        prompts: Vec<(Option<String>, Vec<String>)>,
    }

    impl Scripted {
        fn new(answers: &[usize]) -> Self {
            Self {
                answers: answers.iter().rev().copied().collect(),
                prompts: Vec::new(),
            }
        }
    }

    impl Chooser for Scripted {
        fn choose(&mut self, step: &SelectionStep<'_>) -> std::io::Result<usize> {
            self.prompts.push((
                step.context.map(|c| c.path.clone()),
                step.candidates.iter().map(|c| c.path.clone()).collect(),
            ));
            Ok(self.answers.pop().expect("chooser asked more often than scripted"))
        }
    }

    #[test]
    fn test_empty_tree_never_prompts() {
        let mut chooser = Scripted::new(&[]);
        let selected = select(&[], &mut chooser).unwrap();
        assert!(selected.is_none());
        assert!(chooser.prompts.is_empty());
    }

    #[test]
    fn test_template_at_root() {
        let tree = vec![template("console", None), template("classlib", None)];
        let mut chooser = Scripted::new(&[2]);

        let selected = select(&tree, &mut chooser).unwrap().unwrap();

        assert_eq!(selected.path(), "classlib");
        assert_eq!(chooser.prompts.len(), 1);
        assert_eq!(chooser.prompts[0].0, None);
    }

    #[test]
    fn test_single_child_category_is_auto_descended() {
        let tree = vec![category("web", None, vec![template("web/empty", Some("web"))])];
        let mut chooser = Scripted::new(&[1]);

        let selected = select(&tree, &mut chooser).unwrap().unwrap();

        assert_eq!(selected.path(), "web/empty");
        // Only the root list was shown
        assert_eq!(chooser.prompts.len(), 1);
    }

    #[test]
    fn test_auto_descend_chains_through_nested_singletons() {
        let tree = vec![category(
            "web",
            None,
            vec![category(
                "web/mvc",
                Some("web"),
                vec![category(
                    "web/mvc/csharp",
                    Some("web/mvc"),
                    vec![template("web/mvc/csharp/app", Some("web/mvc/csharp"))],
                )],
            )],
        )];
        let mut chooser = Scripted::new(&[1]);

        let selected = select(&tree, &mut chooser).unwrap().unwrap();

        assert_eq!(selected.path(), "web/mvc/csharp/app");
        assert_eq!(chooser.prompts.len(), 1);
    }

    #[test]
    fn test_category_with_two_children_prompts_once_more() {
        let tree = vec![category(
            "web",
            None,
            vec![template("web/empty", Some("web")), template("web/mvc", Some("web"))],
        )];
        let mut chooser = Scripted::new(&[1, 2]);

        let selected = select(&tree, &mut chooser).unwrap().unwrap();

        assert_eq!(selected.path(), "web/mvc");
        assert_eq!(chooser.prompts.len(), 2);
        assert_eq!(chooser.prompts[1].0.as_deref(), Some("web"));
        assert_eq!(chooser.prompts[1].1, vec!["web/empty", "web/mvc"]);
    }

    #[test]
    fn test_singleton_lands_on_multi_child_category() {
        let tree = vec![category(
            "web",
            None,
            vec![category(
                "web/mvc",
                Some("web"),
                vec![
                    template("web/mvc/csharp", Some("web/mvc")),
                    template("web/mvc/fsharp", Some("web/mvc")),
                ],
            )],
        )];
        let mut chooser = Scripted::new(&[1, 1]);

        let selected = select(&tree, &mut chooser).unwrap().unwrap();

        assert_eq!(selected.path(), "web/mvc/csharp");
        assert_eq!(chooser.prompts[1].0.as_deref(), Some("web/mvc"));
    }

    #[test]
    fn test_empty_category_is_rejected_without_prompting() {
        assert!(matches!(
            ManifestEntry::category("web", "Web", None, vec![]),
            Err(CatalogError::EmptyCategory { ref path }) if path == "web"
        ));

        // Built by hand, bypassing the constructor
        let empty = ManifestEntry {
            path: "web".into(),
            title: "Web".into(),
            parent: None,
            kind: EntryKind::Category(Category { children: vec![] }),
        };
        let tree = vec![empty, template("console", None)];
        let mut chooser = Scripted::new(&[1]);

        let err = select(&tree, &mut chooser).unwrap_err();

        assert!(matches!(err, CatalogError::EmptyCategory { ref path } if path == "web"));
        assert_eq!(chooser.prompts.len(), 1);
        assert!(chooser.prompts.iter().all(|(_, candidates)| !candidates.is_empty()));
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let tree = vec![template("console", None)];

        let err = select(&tree, &mut answer(2)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::SelectionIndexOutOfRange { index: 2, len: 1 }
        ));

        let err = select(&tree, &mut answer(0)).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::SelectionIndexOutOfRange { index: 0, len: 1 }
        ));
    }

    #[test]
    fn test_chooser_io_error_is_propagated() {
        struct Closed;
        impl Chooser for Closed {
            fn choose(&mut self, _: &SelectionStep<'_>) -> std::io::Result<usize> {
                Err(std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "closed"))
            }
        }

        let tree = vec![template("console", None)];
        let err = select(&tree, &mut Closed).unwrap_err();
        assert!(matches!(err, CatalogError::Input(_)));
    }

    #[test]
    fn test_heading() {
        let web = category("web", None, vec![template("web/empty", Some("web"))]);
        let root = SelectionStep {
            context: None,
            candidates: std::slice::from_ref(&web),
        };
        assert_eq!(root.heading(), "Templates");

        let nested = SelectionStep {
            context: Some(&web),
            candidates: web.children(),
        };
        assert_eq!(nested.heading(), "Title of web");
    }
}
