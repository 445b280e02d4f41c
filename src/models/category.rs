use std::collections::{HashMap, HashSet, VecDeque};

use crate::error::{Error, Result};
use crate::repository::{Entity, Filter, Repository, Value};

/// Expense category. `parent == None` marks a root of the category tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Category {
    pub(crate) pk: Option<i64>,
    pub(crate) name: String,
    pub(crate) parent: Option<i64>,
}

impl Category {
    pub(crate) fn new(name: impl Into<String>, parent: Option<i64>) -> Self {
        Self {
            pk: None,
            name: name.into(),
            parent,
        }
    }

    /// Find a category by name (case-insensitive) in a slice.
    pub(crate) fn find_by_name<'a>(
        categories: &'a [Category],
        name: &str,
    ) -> Option<&'a Category> {
        let lower = name.to_lowercase();
        categories.iter().find(|c| c.name.to_lowercase() == lower)
    }

    /// Find a category by pk in a slice.
    pub(crate) fn find_by_id(categories: &[Category], pk: i64) -> Option<&Category> {
        categories.iter().find(|c| c.pk == Some(pk))
    }

    pub(crate) fn get_parent<R>(&self, repo: &R) -> Result<Option<Category>>
    where
        R: Repository<Category> + ?Sized,
    {
        match self.parent {
            Some(pk) => repo.get(pk),
            None => Ok(None),
        }
    }

    /// Ancestors from the direct parent up to the root. Stops at a missing
    /// parent or at a cycle.
    pub(crate) fn get_all_parents<R>(&self, repo: &R) -> Result<Vec<Category>>
    where
        R: Repository<Category> + ?Sized,
    {
        let mut seen: HashSet<i64> = self.pk.into_iter().collect();
        let mut out = Vec::new();
        let mut current = self.get_parent(repo)?;
        while let Some(parent) = current {
            if parent.pk.map_or(true, |pk| !seen.insert(pk)) {
                break;
            }
            current = parent.get_parent(repo)?;
            out.push(parent);
        }
        Ok(out)
    }

    /// All descendants, breadth-first.
    pub(crate) fn get_subcategories<R>(&self, repo: &R) -> Result<Vec<Category>>
    where
        R: Repository<Category> + ?Sized,
    {
        let Some(root) = self.pk else {
            return Ok(Vec::new());
        };
        let mut seen = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        let mut out = Vec::new();
        while let Some(pk) = queue.pop_front() {
            for child in repo.get_all(&Filter::new().eq("parent", pk))? {
                if let Some(child_pk) = child.pk {
                    if seen.insert(child_pk) {
                        queue.push_back(child_pk);
                        out.push(child);
                    }
                }
            }
        }
        Ok(out)
    }

    /// Store a `(name, parent_name)` outline as produced by [`read_tree`].
    /// Parents must appear before their children.
    pub(crate) fn create_from_tree<R>(
        tree: &[(String, Option<String>)],
        repo: &mut R,
    ) -> Result<Vec<Category>>
    where
        R: Repository<Category> + ?Sized,
    {
        let mut created: HashMap<&str, i64> = HashMap::new();
        let mut out = Vec::with_capacity(tree.len());
        for (name, parent) in tree {
            let parent_pk = match parent {
                Some(parent) => Some(*created.get(parent.as_str()).ok_or_else(|| {
                    Error::invalid(
                        Self::KIND,
                        format!("parent '{parent}' of '{name}' is not defined before it"),
                    )
                })?),
                None => None,
            };
            let mut cat = Category::new(name.clone(), parent_pk);
            let pk = repo.add(&mut cat)?;
            created.insert(name.as_str(), pk);
            out.push(cat);
        }
        Ok(out)
    }

    /// Depth-first rendering order of a category slice as `(depth, category)`.
    /// Categories whose parent is not in the slice are shown as roots.
    pub(crate) fn outline(categories: &[Category]) -> Vec<(usize, &Category)> {
        let known: HashSet<i64> = categories.iter().filter_map(|c| c.pk).collect();
        let mut children: HashMap<Option<i64>, Vec<&Category>> = HashMap::new();
        for cat in categories {
            let parent = cat.parent.filter(|p| known.contains(p) && Some(*p) != cat.pk);
            children.entry(parent).or_default().push(cat);
        }

        let mut out = Vec::with_capacity(categories.len());
        let mut visited = HashSet::new();
        let mut stack: Vec<(usize, &Category)> = children
            .get(&None)
            .map(|roots| roots.iter().rev().map(|c| (0, *c)).collect())
            .unwrap_or_default();
        while let Some((depth, cat)) = stack.pop() {
            if let Some(pk) = cat.pk {
                if !visited.insert(pk) {
                    continue;
                }
                if let Some(kids) = children.get(&Some(pk)) {
                    stack.extend(kids.iter().rev().map(|c| (depth + 1, *c)));
                }
            }
            out.push((depth, cat));
        }
        out
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Entity for Category {
    const KIND: &'static str = "category";
    const FIELDS: &'static [&'static str] = &["name", "parent"];

    fn pk(&self) -> Option<i64> {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = Some(pk);
    }

    fn field(&self, name: &str) -> Option<Value> {
        Some(match name {
            "pk" => self.pk.into(),
            "name" => self.name.clone().into(),
            "parent" => self.parent.into(),
            _ => return None,
        })
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::invalid(Self::KIND, "name is empty"));
        }
        match self.parent {
            Some(parent) if parent <= 0 => {
                Err(Error::invalid(Self::KIND, format!("parent {parent} is not a pk")))
            }
            Some(parent) if Some(parent) == self.pk => {
                Err(Error::invalid(Self::KIND, "category cannot be its own parent"))
            }
            _ => Ok(()),
        }
    }
}

/// Parse an indented outline into `(name, parent_name)` pairs.
///
/// Blank lines are skipped. A line indented deeper than the previous one is
/// its child; an unindent must return to an indentation level seen before.
pub(crate) fn read_tree<'a, I>(lines: I) -> Result<Vec<(String, Option<String>)>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut parents: Vec<(Option<String>, isize)> = Vec::new();
    let mut last_indent: isize = -1;
    let mut last_name: Option<String> = None;
    let mut out = Vec::new();

    for (idx, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let indent = line.chars().take_while(|c| c.is_whitespace()).count() as isize;
        let name = line.trim().to_string();

        if indent > last_indent {
            parents.push((last_name.take(), last_indent));
        } else if indent < last_indent {
            while indent < last_indent {
                match parents.pop() {
                    Some((_, level)) => last_indent = level,
                    None => return Err(Error::Indentation { line: idx + 1 }),
                }
            }
            if indent != last_indent {
                return Err(Error::Indentation { line: idx + 1 });
            }
        }

        let parent = parents.last().and_then(|(name, _)| name.clone());
        out.push((name.clone(), parent));
        last_name = Some(name);
        last_indent = indent;
    }
    Ok(out)
}
