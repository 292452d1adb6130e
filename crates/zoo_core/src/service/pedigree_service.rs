//! Pedigree resolution over offspring/parent links.
//!
//! # Responsibility
//! - Build an animal's ancestry tree, mother before father, depth first.
//! - Render the tree as indented text lines.
//!
//! # Invariants
//! - Recursion never goes deeper than `max_depth` generations; parents past
//!   the limit become truncation lines.
//! - A missing lineage row or a null parent ends that branch silently.
//! - The root is located by animal name; no match is `NameNotFound`.

use crate::model::{Animal, Kind, RecordId};
use crate::repo::zoo_repo::{RepoError, RepoResult, ZooRepository};
use std::fmt::{Display, Formatter};

/// Generations resolved when the caller does not pick a limit.
pub const DEFAULT_PEDIGREE_DEPTH: usize = 5;

const INDENT: &str = "  ";
const TRUNCATION_MARKER: &str = "...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentRole {
    Mother,
    Father,
}

impl Display for ParentRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mother => f.write_str("Mother"),
            Self::Father => f.write_str("Father"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PedigreeEntry {
    Animal { id: RecordId, name: String },
    /// Ancestor exists but lies beyond the depth limit.
    Truncated,
}

/// One line of the rendered tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PedigreeLine {
    /// Generations above the root; the root is 0.
    pub depth: usize,
    /// `None` only for the root line.
    pub role: Option<ParentRole>,
    pub entry: PedigreeEntry,
}

impl Display for PedigreeLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for _ in 0..self.depth {
            f.write_str(INDENT)?;
        }
        if let Some(role) = self.role {
            write!(f, "{role}: ")?;
        }
        match &self.entry {
            PedigreeEntry::Animal { name, .. } => f.write_str(name),
            PedigreeEntry::Truncated => f.write_str(TRUNCATION_MARKER),
        }
    }
}

/// Resolved ancestry of one animal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pedigree {
    pub root_id: RecordId,
    pub max_depth: usize,
    /// Depth-first, mother before father.
    pub lines: Vec<PedigreeLine>,
}

impl Pedigree {
    /// Indented text lines, one per tree entry.
    pub fn render(&self) -> Vec<String> {
        self.lines.iter().map(ToString::to_string).collect()
    }

    /// Resolved ancestors, excluding the root and truncation lines.
    pub fn ancestor_count(&self) -> usize {
        self.lines
            .iter()
            .filter(|line| line.role.is_some() && line.entry != PedigreeEntry::Truncated)
            .count()
    }

    pub fn is_truncated(&self) -> bool {
        self.lines
            .iter()
            .any(|line| line.entry == PedigreeEntry::Truncated)
    }
}

/// Pedigree resolver facade over repository implementations.
pub struct PedigreeService<R: ZooRepository> {
    repo: R,
}

impl<R: ZooRepository> PedigreeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Resolves the pedigree of the animal named `name`.
    pub fn pedigree(&self, name: &str, max_depth: usize) -> RepoResult<Pedigree> {
        let root = self
            .repo
            .find_animal_by_name(name)?
            .ok_or_else(|| RepoError::NameNotFound {
                kind: Kind::Animal,
                name: name.trim().to_string(),
            })?;
        self.pedigree_of(&root, max_depth)
    }

    /// Resolves the pedigree of an already loaded animal.
    pub fn pedigree_of(&self, root: &Animal, max_depth: usize) -> RepoResult<Pedigree> {
        let mut lines = Vec::new();
        self.walk(root, 0, None, max_depth, &mut lines)?;
        Ok(Pedigree {
            root_id: root.id,
            max_depth,
            lines,
        })
    }

    fn walk(
        &self,
        animal: &Animal,
        depth: usize,
        role: Option<ParentRole>,
        max_depth: usize,
        lines: &mut Vec<PedigreeLine>,
    ) -> RepoResult<()> {
        lines.push(PedigreeLine {
            depth,
            role,
            entry: PedigreeEntry::Animal {
                id: animal.id,
                name: animal.name.clone(),
            },
        });

        let Some(lineage) = self.repo.lineage_of(animal)? else {
            return Ok(());
        };

        let parents = [
            (ParentRole::Mother, lineage.mother_id),
            (ParentRole::Father, lineage.father_id),
        ];
        for (parent_role, parent_id) in parents {
            let Some(parent_id) = parent_id else {
                continue;
            };
            if depth >= max_depth {
                lines.push(PedigreeLine {
                    depth: depth + 1,
                    role: Some(parent_role),
                    entry: PedigreeEntry::Truncated,
                });
                continue;
            }
            let parent: Animal = self.repo.get(parent_id)?;
            self.walk(&parent, depth + 1, Some(parent_role), max_depth, lines)?;
        }

        Ok(())
    }
}
